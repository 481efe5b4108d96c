//! Order processing: mandatory sequential steps around a parallel branch.
//!
//! Stock is validated first; costs and recommendations then run side by
//! side; the invoice is sent last, for the amount the cost step computed.

use serde_json::json;

use crate::core::{Pipeline, StageSpec};
use crate::domain::Task;

use super::FailurePlan;

pub const PIPELINE_NAME: &str = "order-processing";

pub const ORDER_ID: &str = "ORD-456";

pub const STOCK_MS: u64 = 1500;
pub const COSTS_MS: u64 = 2000;
pub const RECOMMENDATIONS_MS: u64 = 800;
pub const INVOICE_MS: u64 = 1000;

pub const ORDER_AMOUNT: u64 = 150_000;

pub const STOCK: &str = "1 Validate stock";
pub const COSTS: &str = "2 Calculate final costs";
pub const RECOMMENDATIONS: &str = "3 Generate recommendations";

const FAILURE_REASON: &str = "inventory system is not responding";

pub fn pipeline(failures: &FailurePlan) -> Pipeline {
    let invoice_failures = failures.clone();

    Pipeline::new(PIPELINE_NAME)
        .with_description(format!("Process order {}", ORDER_ID))
        .task(failures.apply(
            Task::succeed(STOCK, STOCK_MS, json!({ "order": ORDER_ID, "in_stock": true })),
            FAILURE_REASON,
        ))
        .group(vec![
            failures.apply(
                Task::succeed(
                    COSTS,
                    COSTS_MS,
                    json!({ "order": ORDER_ID, "amount": ORDER_AMOUNT }),
                ),
                FAILURE_REASON,
            ),
            failures.apply(
                Task::succeed(
                    RECOMMENDATIONS,
                    RECOMMENDATIONS_MS,
                    json!({ "order": ORDER_ID, "optional": true }),
                ),
                FAILURE_REASON,
            ),
        ])
        .derived("4 Send electronic invoice", move |ctx| {
            let amount = ctx.u64(COSTS, "amount")?;
            let task = Task::succeed(
                format!("4 Send electronic invoice (amount {})", amount),
                INVOICE_MS,
                json!({ "order": ORDER_ID, "invoiced_amount": amount }),
            );
            Ok(StageSpec::Task(invoice_failures.apply(task, FAILURE_REASON)))
        })
}
