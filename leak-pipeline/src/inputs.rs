//! Concurrent loading of the six input tables.

use std::path::PathBuf;

use leak_engine::{LeakInputs, Table};
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::table_loader::read_optional_table;

/// Where to find each input. Only the orders path must be given; a path that
/// does not exist reads as an empty table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePaths {
    pub orders: PathBuf,
    pub order_lines: Option<PathBuf>,
    pub refunds: Option<PathBuf>,
    pub payments: Option<PathBuf>,
    pub tickets: Option<PathBuf>,
    pub discounts: Option<PathBuf>,
}

impl TablePaths {
    pub fn new(orders: impl Into<PathBuf>) -> Self {
        Self {
            orders: orders.into(),
            ..Self::default()
        }
    }
}

async fn load_optional(name: &'static str, path: Option<PathBuf>) -> PipelineResult<Table> {
    tokio::task::spawn_blocking(move || read_optional_table(name, path.as_deref())).await?
}

/// Load all six tables on the blocking pool. The first failure wins.
pub async fn load_inputs(paths: &TablePaths) -> PipelineResult<LeakInputs> {
    let (orders, order_lines, refunds, payments, tickets, discounts) = tokio::try_join!(
        load_optional("orders", Some(paths.orders.clone())),
        load_optional("order_lines", paths.order_lines.clone()),
        load_optional("refunds", paths.refunds.clone()),
        load_optional("payments", paths.payments.clone()),
        load_optional("tickets", paths.tickets.clone()),
        load_optional("discounts", paths.discounts.clone()),
    )?;

    Ok(LeakInputs {
        orders,
        order_lines,
        refunds,
        payments,
        tickets,
        discounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[tokio::test]
    async fn missing_optional_tables_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let orders = dir.path().join("orders.csv");
        std::fs::write(&orders, "order_id,net_revenue\nO-1,10.00\n").unwrap();

        let mut paths = TablePaths::new(&orders);
        paths.refunds = Some(dir.path().join("refunds.csv"));

        let inputs = load_inputs(&paths).await.unwrap();
        assert_eq!(inputs.orders.len(), 1);
        assert!(inputs.refunds.is_empty());
        assert_eq!(inputs.refunds.name(), "refunds");
        assert!(inputs.discounts.is_empty());
    }

    #[tokio::test]
    async fn missing_orders_file_is_an_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = TablePaths::new(dir.path().join("orders.csv"));
        let refunds = dir.path().join("refunds.csv");
        std::fs::write(&refunds, "order_id,refund_amount\nO-1,5.00\n").unwrap();
        paths.refunds = Some(refunds);

        let inputs = load_inputs(&paths).await.unwrap();
        assert!(inputs.orders.is_empty());
        assert_eq!(inputs.orders.name(), "orders");
        assert_eq!(inputs.refunds.len(), 1);
    }

    #[tokio::test]
    async fn unsupported_orders_format_is_still_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let orders = dir.path().join("orders.parquet");
        std::fs::write(&orders, b"PAR1").unwrap();
        let err = load_inputs(&TablePaths::new(&orders)).await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }
}
