//! Best-effort save/restore of a half-filled form.
//!
//! Persistence fails open: a missing, corrupt or unwritable draft never
//! reaches the user, it only shows up in debug/warn logs.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DraftParseError;
use crate::ports::FormFields;
use crate::storage::KeyValueStore;

/// Storage key of the registration draft.
pub const DRAFT_KEY: &str = "customer_reg_draft";

/// Never captured and never written back.
pub const EXCLUDED_FIELDS: &[&str] = &["csrfmiddlewaretoken", "step"];

/// Wizard step tracker.
pub const STEP_FIELD: &str = "step";

fn is_excluded(name: &str) -> bool {
    EXCLUDED_FIELDS.contains(&name)
}

/// Field name → value snapshot.
///
/// Stored scalars that are not strings are read back as their text; nested
/// values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DraftRecord(BTreeMap<String, String>);

impl<'de> Deserialize<'de> for DraftRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(name, value)| Some((name, scalar_text(value)?)))
                .collect(),
        ))
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl DraftRecord {
    /// Snapshot every named field except the excluded ones. A repeated name
    /// keeps its last value.
    pub fn capture<F: FormFields + ?Sized>(form: &F) -> Self {
        Self(
            form.named_values()
                .into_iter()
                .filter(|(name, _)| !is_excluded(name))
                .collect(),
        )
    }

    pub fn parse(raw: &str) -> Result<Self, DraftParseError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> String {
        // A map of strings always serialises.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write values back into fields that exist. Returns how many were set.
    pub fn apply_to<F: FormFields + ?Sized>(&self, form: &mut F) -> usize {
        self.0
            .iter()
            .filter(|(name, _)| !is_excluded(name))
            .filter(|(name, value)| form.set_value(name, value))
            .count()
    }
}

/// Serialise the form under [`DRAFT_KEY`], replacing any previous draft.
pub fn save_draft<F: FormFields + ?Sized>(form: &F, store: &mut dyn KeyValueStore) {
    let record = DraftRecord::capture(form);
    match store.set(DRAFT_KEY, &record.to_json()) {
        Ok(()) => debug!(fields = record.len(), "draft saved"),
        Err(e) => warn!(error = %e, "could not save draft"),
    }
}

/// Restore the stored draft into `form`. Absent or corrupt drafts are a no-op.
pub fn restore_draft<F: FormFields + ?Sized>(form: &mut F, store: &dyn KeyValueStore) -> usize {
    let Some(raw) = store.get(DRAFT_KEY) else {
        return 0;
    };
    match DraftRecord::parse(&raw) {
        Ok(record) => {
            let restored = record.apply_to(form);
            debug!(restored, "draft restored");
            restored
        }
        Err(e) => {
            debug!(error = %e, "ignoring draft");
            0
        }
    }
}

pub fn clear_draft(store: &mut dyn KeyValueStore) {
    if let Err(e) = store.remove(DRAFT_KEY) {
        warn!(error = %e, "could not clear draft");
    }
}

/// Point the wizard at step `n` before submitting.
pub fn set_next_step<F: FormFields + ?Sized>(form: &mut F, n: u32) -> bool {
    form.set_value(STEP_FIELD, &n.to_string())
}
