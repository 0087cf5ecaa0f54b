//! Query preparation for warehouse-backed workflow tools.
//!
//! Steps never execute warehouse queries themselves: they prepare a
//! ready-to-run payload that an external toolset executes, or report a
//! status message explaining why no query could be built.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Order rows start in this status and move out of it once handled.
pub const PLACED_STATUS: &str = "order_placed";

/// Fully-qualified location of the orders table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseTarget {
    pub project_id: String,
    pub dataset_id: String,
    pub table: String,
}

impl WarehouseTarget {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table: table.into(),
        }
    }

    fn qualified_table(&self) -> String {
        format!("`{}.{}.{}`", self.project_id, self.dataset_id, self.table)
    }
}

/// A prepared query payload, or the status message for a request that
/// could not be turned into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryPrep {
    #[serde(rename = "query_ready")]
    Ready { query: String, instruction: String },
    #[serde(rename = "error")]
    Failed { message: String },
}

/// Prepare the query fetching the most recent orders still in the
/// placed status.
pub fn latest_order_query(target: &WarehouseTarget) -> QueryPrep {
    info!(table = %target.table, "preparing latest-order query");
    let query = format!(
        "SELECT *\nFROM {}\nWHERE order_status = '{PLACED_STATUS}'\nORDER BY created_at DESC\nLIMIT 5",
        target.qualified_table(),
    );
    QueryPrep::Ready {
        query,
        instruction: "Execute this query against the warehouse to fetch the latest placed orders"
            .to_string(),
    }
}

/// Prepare the query moving one order to a new status.
///
/// Values are embedded as SQL string literals, so anything that could
/// break out of a literal is refused rather than escaped.
pub fn order_status_update_query(
    target: &WarehouseTarget,
    order_number: &str,
    new_status: &str,
) -> QueryPrep {
    if !is_safe_literal(order_number) {
        warn!(order_number, "refusing unsafe order number");
        return QueryPrep::Failed {
            message: format!("invalid order number: {order_number:?}"),
        };
    }
    if !is_safe_literal(new_status) {
        warn!(new_status, "refusing unsafe status value");
        return QueryPrep::Failed {
            message: format!("invalid status value: {new_status:?}"),
        };
    }

    info!(order_number, new_status, "preparing order-status update query");
    let query = format!(
        "UPDATE {}\nSET order_status = '{new_status}', updated_at = CURRENT_TIMESTAMP()\nWHERE order_number = '{order_number}'",
        target.qualified_table(),
    );
    QueryPrep::Ready {
        query,
        instruction: format!(
            "Execute this query to move order {order_number} to status {new_status}"
        ),
    }
}

fn is_safe_literal(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
