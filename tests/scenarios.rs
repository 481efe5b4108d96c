//! Scenario Integration Tests
//!
//! Runs the built-in demonstration pipelines end to end.

use asyncflow::scenarios::{order, services, FailurePlan, Scenario};
use asyncflow::{Orchestrator, RunReport};
use serde_json::json;

fn assert_elapsed(actual_ms: u64, expected_ms: u64) {
    assert!(
        actual_ms >= expected_ms && actual_ms < expected_ms + 50,
        "elapsed {}ms, expected about {}ms",
        actual_ms,
        expected_ms
    );
}

async fn run(scenario: Scenario, failures: FailurePlan) -> RunReport {
    Orchestrator::new()
        .run_pipeline(&scenario.pipeline(&failures))
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_form_validation_success() {
    let report = run(Scenario::FormValidation, FailurePlan::none()).await;

    assert!(report.is_success());
    assert_elapsed(report.elapsed_ms, 2500);
    let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["Validate email", "Validate document", "Validate availability"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_form_validation_rejected_by_document() {
    let report = run(Scenario::FormValidation, FailurePlan::new(["document"])).await;

    let error = report.task_error().unwrap();
    assert_eq!(error.task_name, "Validate document");
    assert_eq!(error.reason, "external service returned an error");
    assert_elapsed(report.elapsed_ms, 1200);
}

#[tokio::test(start_paused = true)]
async fn test_order_processing_timeline() {
    let report = run(Scenario::OrderProcessing, FailurePlan::none()).await;

    assert!(report.is_success());
    assert_eq!(report.stages_completed, 3);
    assert_elapsed(report.elapsed_ms, 4500);

    let invoice = report
        .result("4 Send electronic invoice (amount 150000)")
        .unwrap();
    assert_eq!(
        invoice.payload.as_ref().unwrap()["invoiced_amount"],
        json!(order::ORDER_AMOUNT)
    );

    // Recommendations ran alongside costs and finished first
    let costs = report.result(order::COSTS).unwrap();
    let recommendations = report.result(order::RECOMMENDATIONS).unwrap();
    assert!(recommendations.elapsed_seconds < costs.elapsed_seconds);
}

#[tokio::test(start_paused = true)]
async fn test_order_processing_stock_failure() {
    let report = run(Scenario::OrderProcessing, FailurePlan::new(["stock"])).await;

    assert_eq!(report.stages_completed, 0);
    assert_elapsed(report.elapsed_ms, 1500);
    assert_eq!(
        report.task_error().unwrap().reason,
        "inventory system is not responding"
    );
    assert_eq!(report.results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_order_processing_invoice_failure() {
    let report = run(Scenario::OrderProcessing, FailurePlan::new(["invoice"])).await;

    assert_eq!(report.stages_completed, 2);
    assert_elapsed(report.elapsed_ms, 4500);
    assert_eq!(
        report.task_error().unwrap().task_name,
        "4 Send electronic invoice (amount 150000)"
    );
}

#[tokio::test(start_paused = true)]
async fn test_service_integration_premium() {
    let report = run(Scenario::ServiceIntegration, FailurePlan::none()).await;

    assert!(report.is_success());
    assert_elapsed(report.elapsed_ms, 3700);

    let recommendation = report.result("D Recommendations for Juan Perez").unwrap();
    assert_eq!(
        recommendation.payload,
        Some(json!({ "recommendation": "Premium product", "based_on_purchases": 15 }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_service_integration_basic() {
    let pipeline = services::pipeline_with_history(&FailurePlan::none(), 4);
    let report = Orchestrator::new().run_pipeline(&pipeline).await.unwrap();

    let recommendation = report.result("D Recommendations for Juan Perez").unwrap();
    assert_eq!(
        recommendation.payload.as_ref().unwrap()["recommendation"],
        "Basic product"
    );
}

#[tokio::test(start_paused = true)]
async fn test_service_integration_history_failure() {
    let report = run(Scenario::ServiceIntegration, FailurePlan::new(["history"])).await;

    assert_elapsed(report.elapsed_ms, services::HISTORY_MS);
    assert_eq!(report.stages_completed, 0);
    assert_eq!(report.task_error().unwrap().reason, "could not connect");
    assert!(report.result("D Recommendations for Juan Perez").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_report_serializes_to_json() {
    let report = run(Scenario::FormValidation, FailurePlan::new(["email"])).await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["pipeline_name"], "form-validation");
    assert_eq!(value["state"]["status"], "failed");
    assert_eq!(value["state"]["error"]["kind"], "task");
    assert_eq!(value["state"]["error"]["task_name"], "Validate email");
}
