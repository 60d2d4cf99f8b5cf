//! Discriminant-driven form controller.
//!
//! A [`FormSchema`] describes, for one selector control, which sections each
//! value shows, which fields it makes required and what it checks at submit
//! time. [`DynamicForm`] applies a schema to a [`FormPort`].

pub mod customer;
pub mod order;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::error::ValidationError;
use crate::popup::Popup;
use crate::ports::{FormPort, PopupSink};

pub use customer::CustomerSchema;
pub use order::OrderSchema;

// ─── FormSchema ─────────────────────────────────────────────

pub trait FormSchema {
    type Kind: Copy + Eq + fmt::Debug;

    /// Name of the control holding the discriminant.
    const SELECTOR: &'static str;

    /// Every section container the schema controls.
    const SECTIONS: &'static [&'static str];

    /// Every field whose `required` flag the schema toggles.
    const TOGGLED_FIELDS: &'static [&'static str] = &[];

    fn parse(value: &str) -> Option<Self::Kind>;

    fn visible_sections(kind: Self::Kind) -> &'static [&'static str];

    fn required_fields(_kind: Self::Kind) -> &'static [&'static str] {
        &[]
    }

    /// `(field, floor)` pairs installed as a `min` constraint.
    fn numeric_floors(_kind: Self::Kind) -> &'static [(&'static str, i64)] {
        &[]
    }

    /// Structural checks that single-field requiredness cannot express.
    fn check_submit<F: FormPort + ?Sized>(
        _kind: Self::Kind,
        _form: &F,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

// ─── FieldRequirement ───────────────────────────────────────

/// Required flag of every toggled field, derived from a discriminant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRequirement(BTreeMap<&'static str, bool>);

impl FieldRequirement {
    pub fn derive<S: FormSchema>(kind: Option<S::Kind>) -> Self {
        let required = kind.map(S::required_fields).unwrap_or(&[]);
        Self(
            S::TOGGLED_FIELDS
                .iter()
                .map(|name| (*name, required.contains(name)))
                .collect(),
        )
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(false)
    }

    pub fn required(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().filter(|(_, on)| **on).map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.0.iter().map(|(name, on)| (*name, *on))
    }
}

// ─── DynamicForm ────────────────────────────────────────────

/// Per-form controller state. One instance per form on the page.
#[derive(Debug)]
pub struct DynamicForm<S: FormSchema> {
    current: Option<S::Kind>,
    requirements: FieldRequirement,
    _schema: PhantomData<S>,
}

impl<S: FormSchema> Default for DynamicForm<S> {
    fn default() -> Self {
        Self {
            current: None,
            requirements: FieldRequirement::derive::<S>(None),
            _schema: PhantomData,
        }
    }
}

impl<S: FormSchema> DynamicForm<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller and immediately apply the pre-selected value.
    pub fn attach<F: FormPort + ?Sized>(form: &mut F) -> Self {
        let mut controller = Self::new();
        controller.apply(form);
        controller
    }

    /// Re-read the selector and bring sections and requirements in line.
    ///
    /// Every toggled requirement is cleared before the new set is applied.
    pub fn apply<F: FormPort + ?Sized>(&mut self, form: &mut F) -> Option<S::Kind> {
        let kind = Self::read_kind(form);

        for section in S::SECTIONS {
            form.set_section_visible(section, false);
        }
        for field in S::TOGGLED_FIELDS {
            form.set_required(field, false);
        }

        if let Some(kind) = kind {
            for section in S::visible_sections(kind) {
                form.set_section_visible(section, true);
            }
            for field in S::required_fields(kind) {
                form.set_required(field, true);
            }
            for (field, floor) in S::numeric_floors(kind) {
                install_floor(form, field, *floor);
            }
        }

        debug!(selector = S::SELECTOR, ?kind, "applied form discriminant");
        self.current = kind;
        self.requirements = FieldRequirement::derive::<S>(kind);
        kind
    }

    /// Validate structural constraints before submission.
    ///
    /// On violation an error popup is shown, the offending field (if any)
    /// receives focus and the submission must be cancelled.
    pub fn submit<F: FormPort + ?Sized>(
        &self,
        form: &mut F,
        popups: &dyn PopupSink,
    ) -> Result<(), ValidationError> {
        let Some(kind) = Self::read_kind(form) else {
            return Ok(());
        };
        if let Err(err) = S::check_submit(kind, form) {
            debug!(selector = S::SELECTOR, ?kind, message = %err.message, "submit blocked");
            popups.show(Popup::error(err.message.clone()));
            if let Some(field) = err.field.as_deref() {
                form.focus(field);
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<S::Kind> {
        self.current
    }

    pub fn requirements(&self) -> &FieldRequirement {
        &self.requirements
    }

    fn read_kind<F: FormPort + ?Sized>(form: &F) -> Option<S::Kind> {
        form.value(S::SELECTOR).as_deref().and_then(S::parse)
    }
}

/// Set `min` unless an equal or stronger one is already present.
fn install_floor<F: FormPort + ?Sized>(form: &mut F, field: &str, floor: i64) {
    if !form.has_field(field) {
        return;
    }
    let current = form.min(field).and_then(|m| m.trim().parse::<f64>().ok());
    if current.is_none_or(|m| m < floor as f64) {
        form.set_min(field, &floor.to_string());
    }
}
