//! Plain-text rendering of inference output for the CLI.

use std::fmt::Write;

use crate::routing::Downstream;
use crate::types::{ConnectionStatus, InferenceResult, InstanceId};

fn status_marker(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Valid => "ok",
        ConnectionStatus::Pending => "!!",
        ConnectionStatus::Invalid => "xx",
    }
}

pub fn render_inference(result: &InferenceResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Connections ({})", result.connections.len());
    for conn in &result.connections {
        let _ = writeln!(
            out,
            "  [{}] {}.{} → {}.{} ({})",
            status_marker(conn.status),
            conn.from.device_label(),
            conn.from.port_name.as_deref().unwrap_or(&conn.from.port_id),
            conn.to.device_label(),
            conn.to.port_name.as_deref().unwrap_or(&conn.to.port_id),
            conn.status
        );
        for issue in &conn.issues {
            let _ = writeln!(out, "       - {}", issue);
        }
    }

    if !result.workflows.is_empty() {
        let _ = writeln!(out, "\nWorkflow");
        for line in &result.workflows {
            let _ = writeln!(out, "  {}", line);
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings");
        for warning in &result.warnings {
            let _ = writeln!(out, "  ⚠ {}", warning);
        }
    }

    out
}

pub fn render_recommendations(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return "No compatible connections found.\n".to_string();
    }
    suggestions.iter().map(|s| format!("{}\n", s)).collect()
}

pub fn render_route(source: &InstanceId, downstream: &Downstream, test_tone: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Audio downstream of {}", source);
    if downstream.instances.is_empty() {
        let _ = writeln!(out, "  (nothing)");
    }
    for instance in &downstream.instances {
        let _ = writeln!(out, "  → {}", instance);
    }
    let _ = writeln!(
        out,
        "Test tone: {}",
        if test_tone { "available" } else { "unavailable" }
    );
    out
}
