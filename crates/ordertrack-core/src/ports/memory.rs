use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::form::customer::{
    CUSTOMER_TYPE_FIELD, ORGANIZATION_SECTION, PERSONAL_SECTION, REGISTRATION_FIELDS,
};
use crate::form::order::{
    CONSULTATION_SECTION, ORDER_FIELDS, SALES_SECTION, SERVICE_SECTION, SERVICE_SELECTION_GROUP,
    VEHICLE_SECTION,
};
use crate::models::ServiceOption;
use crate::popup::Popup;
use crate::ports::{FormFields, FormPort, Navigator, PopupSink};

// ─── MemoryForm ─────────────────────────────────────────────

/// State of one value-bearing control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    pub name: String,
    pub value: String,
    pub required: bool,
    pub min: Option<String>,
}

/// In-memory form document.
///
/// Checkbox groups are kept apart from value fields: they answer
/// [`FormPort::checked_count`] but are not part of [`FormFields::named_values`].
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    fields: Vec<FieldState>,
    groups: BTreeMap<String, Vec<(String, bool)>>,
    sections: BTreeMap<String, bool>,
    focused: Option<String>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.push(FieldState {
            name: name.to_string(),
            value: value.to_string(),
            required: false,
            min: None,
        });
        self
    }

    /// Sections start out visible, like an unstyled container.
    pub fn with_section(mut self, name: &str) -> Self {
        self.sections.insert(name.to_string(), true);
        self
    }

    pub fn with_checkbox_group(mut self, group: &str, values: &[&str]) -> Self {
        self.groups.insert(
            group.to_string(),
            values.iter().map(|v| (v.to_string(), false)).collect(),
        );
        self
    }

    /// Order form with every field, section and service checkbox.
    pub fn order_form() -> Self {
        let services: Vec<&str> = ServiceOption::ALL.iter().map(|o| o.value()).collect();
        let mut form = ORDER_FIELDS
            .iter()
            .fold(Self::new(), |form, name| form.with_field(name, ""))
            .with_checkbox_group(SERVICE_SELECTION_GROUP, &services);
        for section in [SERVICE_SECTION, SALES_SECTION, CONSULTATION_SECTION, VEHICLE_SECTION] {
            form = form.with_section(section);
        }
        form
    }

    /// Customer registration wizard form.
    pub fn registration_form() -> Self {
        REGISTRATION_FIELDS
            .iter()
            .fold(Self::new(), |form, name| form.with_field(name, ""))
            .with_section(ORGANIZATION_SECTION)
            .with_section(PERSONAL_SECTION)
    }

    /// Customer edit form: only the type selector and its two sections.
    pub fn customer_form() -> Self {
        Self::new()
            .with_field(CUSTOMER_TYPE_FIELD, "")
            .with_section(ORGANIZATION_SECTION)
            .with_section(PERSONAL_SECTION)
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.field(name).is_some_and(|f| f.required)
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn section_visible(&self, name: &str) -> Option<bool> {
        self.sections.get(name).copied()
    }

    pub fn visible_sections(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Tick or untick one box. Returns `false` if the box does not exist.
    pub fn set_checked(&mut self, group: &str, value: &str, checked: bool) -> bool {
        let Some(boxes) = self.groups.get_mut(group) else {
            return false;
        };
        match boxes.iter_mut().find(|(v, _)| v == value) {
            Some((_, state)) => {
                *state = checked;
                true
            }
            None => false,
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }
}

impl FormFields for MemoryForm {
    fn named_values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    fn value(&self, name: &str) -> Option<String> {
        self.field(name).map(|f| f.value.clone())
    }

    fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.field_mut(name) {
            Some(field) => {
                field.value = value.to_string();
                true
            }
            None => false,
        }
    }
}

impl FormPort for MemoryForm {
    fn set_section_visible(&mut self, section: &str, visible: bool) {
        if let Some(state) = self.sections.get_mut(section) {
            *state = visible;
        }
    }

    fn set_required(&mut self, name: &str, required: bool) {
        if let Some(field) = self.field_mut(name) {
            field.required = required;
        }
    }

    fn min(&self, name: &str) -> Option<String> {
        self.field(name).and_then(|f| f.min.clone())
    }

    fn set_min(&mut self, name: &str, min: &str) {
        if let Some(field) = self.field_mut(name) {
            field.min = Some(min.to_string());
        }
    }

    fn checked_count(&self, group: &str) -> usize {
        self.groups
            .get(group)
            .map(|boxes| boxes.iter().filter(|(_, checked)| *checked).count())
            .unwrap_or(0)
    }

    fn focus(&mut self, name: &str) {
        if self.has_field(name) {
            self.focused = Some(name.to_string());
        }
    }
}

// ─── Recording sinks ────────────────────────────────────────

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Popup sink that keeps every popup it was asked to show.
#[derive(Debug, Default)]
pub struct PopupLog {
    shown: Mutex<Vec<Popup>>,
}

impl PopupLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popups(&self) -> Vec<Popup> {
        lock(&self.shown).clone()
    }

    pub fn last(&self) -> Option<Popup> {
        lock(&self.shown).last().cloned()
    }
}

impl PopupSink for PopupLog {
    fn show(&self, popup: Popup) {
        lock(&self.shown).push(popup);
    }
}

/// Navigator that records redirect targets instead of following them.
#[derive(Debug, Default)]
pub struct NavigationLog {
    targets: Mutex<Vec<String>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> Vec<String> {
        lock(&self.targets).clone()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, target: &str) {
        lock(&self.targets).push(target.to_string());
    }
}
