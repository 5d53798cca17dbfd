use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Joint count of the arm; every configuration and torque vector has this arity.
pub const JOINTS: usize = 6;

/// Sample interval substituted when a run is too short to derive one.
pub const DEFAULT_DT: f64 = 0.01;

/// Four parallel series recorded by the simulator, one entry per sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSequence {
    pub configurations: Vec<[f64; JOINTS]>,
    pub torques: Vec<[f64; JOINTS]>,
    /// Per-sample (angular-error norm, linear-error norm).
    pub errors: Vec<[f64; 2]>,
    /// Seconds, non-decreasing; `timestamps[0]` is the run's start time.
    pub timestamps: Vec<f64>,
}

impl SampleSequence {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Seconds between consecutive samples, or `DEFAULT_DT` when the run has
    /// fewer than two samples.
    pub fn sample_interval(&self) -> f64 {
        if self.timestamps.len() > 1 {
            self.timestamps[1] - self.timestamps[0]
        } else {
            DEFAULT_DT
        }
    }

    /// Check the parallel-series invariant: all four series equal length,
    /// timestamps non-decreasing.
    pub fn validate(&self) -> Result<()> {
        let n = self.timestamps.len();
        ensure!(
            self.configurations.len() == n && self.torques.len() == n && self.errors.len() == n,
            "sample series lengths differ: {} configurations, {} torques, {} errors, {} timestamps",
            self.configurations.len(),
            self.torques.len(),
            self.errors.len(),
            n
        );
        ensure!(
            self.timestamps.windows(2).all(|w| w[1] >= w[0]),
            "timestamps are not non-decreasing"
        );
        Ok(())
    }
}

/// One named, immutable recorded trajectory with its derived series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub name: String,
    pub samples: SampleSequence,
}

/// One-way instructions emitted by the playback core to presentation and
/// export collaborators. Not queries; no reply is expected.
#[derive(Debug, Clone)]
pub enum Directive {
    /// Apply this configuration as the current robot pose.
    Pose {
        index: usize,
        configuration: [f64; JOINTS],
    },
    /// Redraw the three time-series charts for this run. Consumers must
    /// tolerate redundant redraws and replace previous datasets wholesale.
    PlotData { run: Arc<Run> },
    /// Play/pause indicator update, including the auto-stop at end of run.
    PlayState { playing: bool },
    /// Speed multiplier changed.
    Speed { speed: f64 },
    /// Write plot images and the tabular dump for this run into `dir`.
    Export { run: Arc<Run>, dir: PathBuf },
    /// The set of known runs changed; refresh the run selector.
    RunListChanged {
        names: Vec<String>,
        active: Option<String>,
    },
    /// Status message for the UI/CLI status line.
    Info(String),
}

/// Derived per-run statistics, shared by the TUI run table and the
/// text/JSON summary modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub samples: usize,
    pub duration_s: f64,
    pub dt_s: f64,
    pub peak_torque_nm: [f64; JOINTS],
    pub rms_angular_error: f64,
    pub rms_linear_error: f64,
    pub final_angular_error: f64,
    pub final_linear_error: f64,
}
