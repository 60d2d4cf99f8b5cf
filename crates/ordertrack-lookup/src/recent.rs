use serde::Serialize;
use tracing::warn;

use ordertrack_core::RecentOrderRow;

use crate::client::Lookup;

pub const RECENT_FAILED_MESSAGE: &str = "Failed to load recent orders.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecentOrdersView {
    /// Skeleton rows while the request is out.
    Loading,
    Loaded { rows: Vec<RecentOrderRow> },
    Failed { message: String },
}

/// Dashboard table of the most recent orders.
#[derive(Debug)]
pub struct RecentOrdersPanel {
    view: RecentOrdersView,
}

impl Default for RecentOrdersPanel {
    fn default() -> Self {
        Self {
            view: RecentOrdersView::Loading,
        }
    }
}

impl RecentOrdersPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &RecentOrdersView {
        &self.view
    }

    /// Reload the table. A failed request leaves an inline failure notice.
    pub async fn refresh(&mut self, lookup: &dyn Lookup) -> &RecentOrdersView {
        self.view = RecentOrdersView::Loading;
        self.view = match lookup.fetch_recent().await {
            Ok(orders) => RecentOrdersView::Loaded {
                rows: orders.iter().map(|o| o.row()).collect(),
            },
            Err(e) => {
                warn!(error = %e, "recent orders unavailable");
                RecentOrdersView::Failed {
                    message: RECENT_FAILED_MESSAGE.to_string(),
                }
            }
        };
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mockito::Server;

    use crate::client::LookupClient;

    #[tokio::test]
    async fn test_refresh_loads_rows() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/orders/recent/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"orders": [
                    {"order_number": "ORD-2", "status": "in_progress", "type": "service",
                     "priority": "urgent", "customer": "Jane", "vehicle": "XYZ-9",
                     "created_at": "2024-06-02T09:15:00+00:00"},
                    {"order_number": "ORD-1", "status": "completed", "type": "consultation",
                     "priority": "low", "customer": "Acme",
                     "created_at": "2024-06-01T17:45:00+00:00"}
                ]}"#,
            )
            .create_async()
            .await;

        let client =
            LookupClient::with_params(&server.url(), Duration::from_secs(2), "test").unwrap();
        let mut panel = RecentOrdersPanel::new();
        assert_eq!(panel.view(), &RecentOrdersView::Loading);

        let RecentOrdersView::Loaded { rows } = panel.refresh(&client).await else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, "IN PROGRESS");
        assert_eq!(rows[0].vehicle, "XYZ-9");
        assert_eq!(rows[1].order_type, "CONSULTATION");
        assert_eq!(rows[1].vehicle, "-");
    }

    #[tokio::test]
    async fn test_refresh_failure_is_inline_notice() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/orders/recent/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client =
            LookupClient::with_params(&server.url(), Duration::from_secs(2), "test").unwrap();
        let mut panel = RecentOrdersPanel::new();
        panel.refresh(&client).await;
        assert_eq!(
            panel.view(),
            &RecentOrdersView::Failed {
                message: RECENT_FAILED_MESSAGE.to_string()
            }
        );
    }
}
