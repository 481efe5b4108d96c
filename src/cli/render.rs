//! Human-readable rendering of run reports.

use serde_json::Value;

use crate::domain::{RunReport, RunState, TaskResult};

/// Widest payload summary shown in the table
const PAYLOAD_WIDTH: usize = 60;

/// Render a report as a table followed by the run outcome
pub fn render_report(report: &RunReport) -> String {
    let mut out = format!(
        "Pipeline: {}  (run {}, started {})\n\n",
        report.pipeline_name,
        report.id,
        report.started_at.with_timezone(&chrono::Local).format("%H:%M:%S")
    );

    if !report.results.is_empty() {
        out.push_str(&render_table(&report.results));
        out.push('\n');
    }

    match &report.state {
        RunState::Completed => {
            out.push_str(&format!(
                "RESULT: completed ({} stages)\n",
                report.stages_completed
            ));
            out.push_str(&format!(
                "TOTAL TIME: {:.3} s\n",
                report.elapsed_seconds()
            ));
        }
        RunState::Failed { error } => {
            out.push_str(&format!(
                "RESULT: failed after {} stages\n",
                report.stages_completed
            ));
            out.push_str(&format!("ERROR: {}\n", error));
            out.push_str(&format!(
                "TIME UNTIL FAILURE: {:.3} s\n",
                report.elapsed_seconds()
            ));
        }
    }

    out
}

/// Render task results as a fixed-width table
pub fn render_table(results: &[TaskResult]) -> String {
    let name_width = results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("TASK".len());

    let header = format!(
        "{:<name_width$}  {:<10}  {:>10}  {}",
        "TASK", "STATUS", "FINISHED", "PAYLOAD"
    );
    let rule = "-".repeat(name_width + 36 + PAYLOAD_WIDTH / 2);

    let mut lines = vec![header, rule];
    lines.extend(results.iter().map(|result| {
        format!(
            "{:<name_width$}  {:<10}  {:>9.3}s  {}",
            result.name,
            result.status.to_string(),
            result.elapsed_seconds,
            summarize_payload(result.payload.as_ref())
        )
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// One-line payload summary, truncated to the table width
pub fn summarize_payload(payload: Option<&Value>) -> String {
    let text = match payload {
        None => "-".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(value) => value.to_string(),
    };

    if text.chars().count() <= PAYLOAD_WIDTH {
        text
    } else {
        let cut: String = text.chars().take(PAYLOAD_WIDTH - 3).collect();
        format!("{}...", cut)
    }
}
