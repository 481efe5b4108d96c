//! Form validation: three external checks run in parallel.
//!
//! The slowest check (availability) decides the total time; any failing
//! check rejects the whole form without waiting for the others.

use serde_json::json;

use crate::core::Pipeline;
use crate::domain::Task;

use super::FailurePlan;

pub const PIPELINE_NAME: &str = "form-validation";

pub const EMAIL_MS: u64 = 1800;
pub const DOCUMENT_MS: u64 = 1200;
pub const AVAILABILITY_MS: u64 = 2500;

const FAILURE_REASON: &str = "external service returned an error";

/// Applicant whose form is validated
pub struct FormData {
    pub name: &'static str,
    pub email: &'static str,
    pub document: &'static str,
}

pub const SAMPLE: FormData = FormData {
    name: "Sofia Ramirez",
    email: "sofia.ramirez@example.com",
    document: "102456789",
};

fn check(name: &str, duration_ms: u64, subject: &str) -> Task {
    Task::succeed(
        name,
        duration_ms,
        json!({
            "check": name,
            "subject": subject,
            "status": "OK",
            "message": format!("{} completed successfully", name),
        }),
    )
}

pub fn pipeline(failures: &FailurePlan) -> Pipeline {
    let checks = vec![
        check("Validate email", EMAIL_MS, SAMPLE.email),
        check("Validate document", DOCUMENT_MS, SAMPLE.document),
        check("Validate availability", AVAILABILITY_MS, SAMPLE.name),
    ];

    Pipeline::new(PIPELINE_NAME)
        .with_description(format!("Validate the registration form of {}", SAMPLE.name))
        .group(
            checks
                .into_iter()
                .map(|task| failures.apply(task, FAILURE_REASON))
                .collect(),
        )
}
