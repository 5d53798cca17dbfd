//! Derived per-run statistics shared by the TUI run table and the
//! text/JSON summary modes.

use crate::model::{Run, RunSummary, JOINTS};

/// Root mean square of a sample slice; 0 when empty.
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

pub fn summarize(run: &Run) -> RunSummary {
    let s = &run.samples;
    let n = s.len();

    let duration_s = match (s.timestamps.first(), s.timestamps.last()) {
        (Some(first), Some(last)) if n > 1 => last - first,
        _ => 0.0,
    };

    let mut peak_torque_nm: [f64; JOINTS] = [0.0; JOINTS];
    for tau in &s.torques {
        for (peak, t) in peak_torque_nm.iter_mut().zip(tau.iter()) {
            *peak = peak.max(t.abs());
        }
    }

    let angular: Vec<f64> = s.errors.iter().map(|e| e[0]).collect();
    let linear: Vec<f64> = s.errors.iter().map(|e| e[1]).collect();
    let last_error = s.errors.last().copied().unwrap_or([0.0, 0.0]);

    RunSummary {
        name: run.name.clone(),
        samples: n,
        duration_s,
        dt_s: s.sample_interval(),
        peak_torque_nm,
        rms_angular_error: rms(&angular),
        rms_linear_error: rms(&linear),
        final_angular_error: last_error[0],
        final_linear_error: last_error[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SampleSequence;

    #[test]
    fn rms_of_known_values() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[3.0]), 3.0);
        assert!((rms(&[3.0, 4.0]) - (12.5_f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summary_of_known_run() {
        let run = Run {
            name: "k".into(),
            samples: SampleSequence {
                configurations: vec![[0.0; JOINTS]; 3],
                torques: vec![
                    [1.0, -5.0, 0.0, 0.0, 0.0, 2.0],
                    [-3.0, 4.0, 0.0, 0.0, 0.0, 1.0],
                    [2.0, 1.0, 0.0, 0.0, 0.0, -6.0],
                ],
                errors: vec![[0.4, 0.1], [0.2, 0.1], [0.1, 0.0]],
                timestamps: vec![0.0, 0.1, 0.2],
            },
        };
        let summary = summarize(&run);
        assert_eq!(summary.samples, 3);
        assert!((summary.duration_s - 0.2).abs() < 1e-12);
        assert!((summary.dt_s - 0.1).abs() < 1e-12);
        assert_eq!(summary.peak_torque_nm[0], 3.0);
        assert_eq!(summary.peak_torque_nm[1], 5.0);
        assert_eq!(summary.peak_torque_nm[5], 6.0);
        assert_eq!(summary.final_angular_error, 0.1);
        assert_eq!(summary.final_linear_error, 0.0);
        assert!(summary.rms_angular_error > summary.final_angular_error);
    }

    #[test]
    fn summary_of_empty_run_is_zeroed() {
        let run = Run {
            name: "empty".into(),
            samples: SampleSequence {
                configurations: vec![],
                torques: vec![],
                errors: vec![],
                timestamps: vec![],
            },
        };
        let summary = summarize(&run);
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.duration_s, 0.0);
        assert_eq!(summary.rms_angular_error, 0.0);
        assert_eq!(summary.final_linear_error, 0.0);
    }
}
