//! ordertrack lookup: remote search client and the debounced live-search
//! controller built on it.

pub mod client;
pub mod error;
pub mod live_search;
pub mod recent;
pub mod session;

pub use client::{Lookup, LookupClient};
pub use error::{LookupError, Result};
pub use live_search::{KeyOutcome, LiveSearch, PanelRenderer, SearchKey, SearchPorts};
pub use recent::{RecentOrdersPanel, RecentOrdersView};
pub use session::{PanelRow, PanelView, SearchPhase, SearchSession};
