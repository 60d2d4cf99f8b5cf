pub mod config;
pub mod draft;
pub mod error;
pub mod form;
pub mod models;
pub mod popup;
pub mod ports;
pub mod storage;

pub use config::{AppConfig, LookupConfig, SearchConfig, StorageConfig};
pub use draft::{DraftRecord, clear_draft, restore_draft, save_draft, set_next_step};
pub use error::{DraftParseError, Result, TrackerError, ValidationError};
pub use form::{CustomerSchema, DynamicForm, FieldRequirement, FormSchema, OrderSchema};
pub use models::*;
pub use popup::{FlashMessage, Popup, PopupKind};
pub use ports::{FormFields, FormPort, MemoryForm, NavigationLog, Navigator, PopupLog, PopupSink};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Theme};
