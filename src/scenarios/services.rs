//! Service integration: parallel fan-out, then a dependent recommendation.
//!
//! Services A, B and C are queried together. Service D starts only after
//! all three answered, and builds its recommendation from B's user data
//! and C's purchase history.

use serde_json::json;

use crate::core::{Pipeline, StageSpec};
use crate::domain::Task;

use super::FailurePlan;

pub const PIPELINE_NAME: &str = "service-integration";

pub const USER_ID: u64 = 998;

pub const AVAILABILITY_MS: u64 = 1000;
pub const USER_DATA_MS: u64 = 1500;
pub const HISTORY_MS: u64 = 2500;
pub const RECOMMENDATIONS_MS: u64 = 1200;

pub const AVAILABILITY: &str = "A Availability";
pub const USER_DATA: &str = "B User data";
pub const HISTORY: &str = "C Action history";

/// Purchases above this earn the premium recommendation
pub const PREMIUM_THRESHOLD: u64 = 10;

const FAILURE_REASON: &str = "could not connect";

/// Recommendation for a customer with `purchases` past purchases
pub fn recommend(purchases: u64) -> &'static str {
    if purchases > PREMIUM_THRESHOLD {
        "Premium product"
    } else {
        "Basic product"
    }
}

pub fn pipeline(failures: &FailurePlan) -> Pipeline {
    pipeline_with_history(failures, 15)
}

/// Same pipeline with a chosen purchase count in the history service
pub fn pipeline_with_history(failures: &FailurePlan, purchases: u64) -> Pipeline {
    let recommendation_failures = failures.clone();

    Pipeline::new(PIPELINE_NAME)
        .with_description(format!("Integrate services for user {}", USER_ID))
        .group(
            vec![
                Task::succeed(AVAILABILITY, AVAILABILITY_MS, json!({ "available": true })),
                Task::succeed(
                    USER_DATA,
                    USER_DATA_MS,
                    json!({ "name": "Juan Perez", "email": "juperez@example.com" }),
                ),
                Task::succeed(
                    HISTORY,
                    HISTORY_MS,
                    json!({ "purchases": purchases, "views": 450 }),
                ),
            ]
            .into_iter()
            .map(|task| failures.apply(task, FAILURE_REASON))
            .collect(),
        )
        .derived("D Recommendations", move |ctx| {
            let name = ctx.str(USER_DATA, "name")?;
            let purchases = ctx.u64(HISTORY, "purchases")?;
            let task = Task::succeed(
                format!("D Recommendations for {}", name),
                RECOMMENDATIONS_MS,
                json!({
                    "recommendation": recommend(purchases),
                    "based_on_purchases": purchases,
                }),
            );
            Ok(StageSpec::Task(recommendation_failures.apply(task, FAILURE_REASON)))
        })
}
