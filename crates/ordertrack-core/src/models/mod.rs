pub mod customer;
pub mod order;
pub mod search;

pub use customer::CustomerType;
pub use order::{OrderType, RecentOrder, RecentOrderRow, ServiceOption};
pub use search::{FALLBACK_RESULT_TYPE, SearchResult, customer_path};
