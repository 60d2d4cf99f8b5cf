//! Typed contract between the controllers and whatever renders the page.
//!
//! Each trait names the handful of elements a controller needs. A host binds
//! them to a real document; tests and the CLI use the in-memory versions from
//! [`memory`].

pub mod memory;

use crate::popup::Popup;

pub use memory::{MemoryForm, NavigationLog, PopupLog};

/// Named value-bearing controls of a form (inputs, selects, textareas).
pub trait FormFields {
    /// Every named control with its current value, in document order.
    fn named_values(&self) -> Vec<(String, String)>;

    /// Current value of the first control with this name.
    fn value(&self, name: &str) -> Option<String>;

    /// Write a value into the named control. Returns `false` if absent.
    fn set_value(&mut self, name: &str, value: &str) -> bool;

    fn has_field(&self, name: &str) -> bool {
        self.value(name).is_some()
    }
}

/// Everything the dynamic form controller touches.
pub trait FormPort: FormFields {
    /// Show or hide a section container. Missing sections are ignored.
    fn set_section_visible(&mut self, section: &str, visible: bool);

    /// Toggle the `required` flag of a control. Missing controls are ignored.
    fn set_required(&mut self, name: &str, required: bool);

    /// Raw `min` attribute of a numeric control.
    fn min(&self, name: &str) -> Option<String>;

    fn set_min(&mut self, name: &str, min: &str);

    /// Number of checked boxes in a checkbox group.
    fn checked_count(&self, group: &str) -> usize;

    /// Move input focus to the named control.
    fn focus(&mut self, name: &str);
}

/// Renders transient success/error notifications.
pub trait PopupSink: Send + Sync {
    fn show(&self, popup: Popup);
}

/// Client-side redirect to another page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}
