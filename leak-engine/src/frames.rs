//! Typed views of the six input tables.
//!
//! Each frame pulls the columns the heuristics read out of its table once,
//! coercing monetary columns up front. Coercion runs over whole columns in a
//! fixed order so a bad batch always reports the same first failure.

use chrono::{DateTime, Utc};

use crate::error::EngineResult;
use crate::table::Table;

type Timestamps = Option<Vec<Option<DateTime<Utc>>>>;
type Keys = Vec<Option<String>>;

/// Keys of a column that must be present for a join or group-by.
fn required_keys(table: &Table, column: &str) -> Option<Keys> {
    table
        .has_column(column)
        .then(|| table.text_column(column))
}

pub struct OrdersFrame {
    pub len: usize,
    pub order_ts: Timestamps,
    pub customer_id: Option<Keys>,
    pub gross_revenue: Vec<f64>,
    pub discount_amount: Vec<f64>,
    pub net_revenue: Vec<f64>,
    pub shipping_cost: Vec<f64>,
    pub cogs_total: Vec<f64>,
}

impl OrdersFrame {
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        Ok(Self {
            len: table.len(),
            order_ts: table.timestamp_column("order_ts"),
            customer_id: required_keys(table, "customer_id"),
            gross_revenue: table.numeric_column("gross_revenue")?,
            discount_amount: table.numeric_column("discount_amount")?,
            net_revenue: table.numeric_column("net_revenue")?,
            shipping_cost: table.numeric_column("shipping_cost")?,
            cogs_total: table.numeric_column("cogs_total")?,
        })
    }
}

pub struct OrderLinesFrame {
    pub len: usize,
    pub order_id: Option<Keys>,
    pub sku_id: Option<Keys>,
    pub line_net: Vec<f64>,
}

impl OrderLinesFrame {
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        Ok(Self {
            len: table.len(),
            order_id: required_keys(table, "order_id"),
            sku_id: required_keys(table, "sku_id"),
            line_net: table.numeric_column("line_net")?,
        })
    }
}

pub struct RefundsFrame {
    pub len: usize,
    pub refund_ts: Timestamps,
    pub order_id: Option<Keys>,
    pub refund_amount: Vec<f64>,
}

impl RefundsFrame {
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        Ok(Self {
            len: table.len(),
            refund_ts: table.timestamp_column("refund_ts"),
            order_id: required_keys(table, "order_id"),
            refund_amount: table.numeric_column("refund_amount")?,
        })
    }
}

pub struct PaymentsFrame {
    pub len: usize,
    pub payment_ts: Timestamps,
    pub status: Keys,
    pub amount: Vec<f64>,
    pub dispute_amount: Vec<f64>,
}

impl PaymentsFrame {
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        Ok(Self {
            len: table.len(),
            payment_ts: table.timestamp_column("payment_ts"),
            status: table.text_column("status"),
            amount: table.numeric_column("amount")?,
            dispute_amount: table.numeric_column("dispute_amount")?,
        })
    }

    pub fn has_status(&self, idx: usize, status: &str) -> bool {
        self.status[idx].as_deref() == Some(status)
    }
}

pub struct TicketsFrame {
    pub len: usize,
    pub created_ts: Timestamps,
}

impl TicketsFrame {
    pub fn from_table(table: &Table) -> Self {
        Self {
            len: table.len(),
            created_ts: table.timestamp_column("created_ts"),
        }
    }
}

pub struct DiscountsFrame {
    pub len: usize,
    pub coupon_code: Option<Keys>,
    pub customer_id: Option<Keys>,
    pub discount_value: Option<Vec<f64>>,
}

impl DiscountsFrame {
    pub fn from_table(table: &Table) -> EngineResult<Self> {
        let discount_value = if table.has_column("discount_value") {
            Some(table.numeric_column("discount_value")?)
        } else {
            None
        };
        Ok(Self {
            len: table.len(),
            coupon_code: required_keys(table, "coupon_code"),
            customer_id: required_keys(table, "customer_id"),
            discount_value,
        })
    }
}

/// All six frames, built in coercion order.
pub struct Frames {
    pub orders: OrdersFrame,
    pub order_lines: OrderLinesFrame,
    pub refunds: RefundsFrame,
    pub payments: PaymentsFrame,
    pub tickets: TicketsFrame,
    pub discounts: DiscountsFrame,
}

impl Frames {
    pub fn build(
        orders: &Table,
        order_lines: &Table,
        refunds: &Table,
        payments: &Table,
        tickets: &Table,
        discounts: &Table,
    ) -> EngineResult<Self> {
        Ok(Self {
            orders: OrdersFrame::from_table(orders)?,
            order_lines: OrderLinesFrame::from_table(order_lines)?,
            refunds: RefundsFrame::from_table(refunds)?,
            payments: PaymentsFrame::from_table(payments)?,
            tickets: TicketsFrame::from_table(tickets),
            discounts: DiscountsFrame::from_table(discounts)?,
        })
    }
}
