//! Text summary builder for CLI output.
//!
//! Formats the per-run metrics into human-readable lines for text mode.

use crate::metrics;
use crate::model::Run;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

pub fn build_text_summary(runs: &[&Run]) -> TextSummary {
    let mut lines = Vec::new();

    if runs.is_empty() {
        lines.push("No runs loaded.".to_string());
        return TextSummary { lines };
    }

    for (i, run) in runs.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        let s = metrics::summarize(run);
        lines.push(format!(
            "Run {}: {} samples, {:.2} s @ dt {:.1} ms",
            s.name,
            s.samples,
            s.duration_s,
            s.dt_s * 1e3
        ));
        let peaks = s
            .peak_torque_nm
            .iter()
            .enumerate()
            .map(|(j, t)| format!("J{} {:.2}", j + 1, t))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(format!("  peak |torque| (Nm): {}", peaks));
        lines.push(format!(
            "  tracking error: rms angular {:.4} linear {:.4}, final angular {:.4} linear {:.4}",
            s.rms_angular_error, s.rms_linear_error, s.final_angular_error, s.final_linear_error
        ));
    }

    TextSummary { lines }
}
