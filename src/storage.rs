//! Run-file loading and synthetic demo runs.
//!
//! The simulator side is a separate process; completed runs arrive as JSON
//! files holding the four parallel sample series. Loading validates the
//! parallel-series invariant before a run is ever admitted to the store.

use crate::model::{Run, SampleSequence, JOINTS};
use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location scanned for run files when none are given on the
/// command line: `<platform data dir>/trajscope/runs`.
pub fn default_runs_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("trajscope").join("runs"))
}

/// Parse and validate a single run file.
pub fn load_run_file(path: &Path) -> Result<Run> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read run file {}", path.display()))?;
    let run: Run =
        serde_json::from_str(&raw).with_context(|| format!("parse run file {}", path.display()))?;
    run.samples
        .validate()
        .with_context(|| format!("invalid run file {}", path.display()))?;
    Ok(run)
}

/// Load every `*.json` run in a directory, lexical order. Unreadable or
/// malformed files are skipped and reported as warnings rather than
/// aborting the whole load.
pub fn load_run_dir(dir: &Path) -> Result<(Vec<Run>, Vec<String>)> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read runs directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut runs = Vec::new();
    let mut warnings = Vec::new();
    for path in paths {
        match load_run_file(&path) {
            Ok(run) => runs.push(run),
            Err(e) => warnings.push(format!("skipped {}: {e:#}", path.display())),
        }
    }
    Ok((runs, warnings))
}

/// Two synthetic runs so the tool is explorable without a simulator: a
/// loosely tuned PD controller and a computed-torque controller tracking
/// the same joint-space reference.
pub fn demo_runs() -> Vec<Run> {
    vec![
        synth_run("pd_tracking", 0.25, 0.8),
        synth_run("computed_torque", 0.04, 0.2),
    ]
}

/// Reference trajectory with controller-dependent lag and noise. `lag`
/// scales the tracking error, `noise` the torque jitter.
fn synth_run(name: &str, lag: f64, noise: f64) -> Run {
    const N: usize = 400;
    const DT: f64 = 0.01;
    let mut rng = rand::thread_rng();

    let mut configurations = Vec::with_capacity(N);
    let mut torques = Vec::with_capacity(N);
    let mut errors = Vec::with_capacity(N);
    let mut timestamps = Vec::with_capacity(N);

    for i in 0..N {
        let t = i as f64 * DT;
        let mut q = [0.0; JOINTS];
        let mut tau = [0.0; JOINTS];
        for (j, (qj, tj)) in q.iter_mut().zip(tau.iter_mut()).enumerate() {
            let phase = j as f64 * 0.7;
            let reference = (t * (1.0 + j as f64 * 0.15) + phase).sin();
            *qj = reference - lag * (t * 2.0 + phase).cos() * (-t).exp();
            *tj = -(2.0 + j as f64) * reference + noise * rng.gen_range(-1.0..1.0);
        }
        // Error norms decay as the controller converges on the reference.
        let settle = (-t * 1.5).exp();
        errors.push([lag * settle * 2.0, lag * settle * 0.5]);
        configurations.push(q);
        torques.push(tau);
        timestamps.push(t);
    }

    Run {
        name: name.into(),
        samples: SampleSequence {
            configurations,
            torques,
            errors,
            timestamps,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let run = demo_runs().remove(0);
        let path = dir.path().join("pd.json");
        fs::write(&path, serde_json::to_string(&run).unwrap()).unwrap();

        let loaded = load_run_file(&path).unwrap();
        assert_eq!(loaded.name, run.name);
        assert_eq!(loaded.samples.len(), run.samples.len());
        assert_eq!(loaded.samples.timestamps, run.samples.timestamps);
    }

    #[test]
    fn dir_load_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let run = demo_runs().remove(0);
        fs::write(
            dir.path().join("a.json"),
            serde_json::to_string(&run).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), "not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (runs, warnings) = load_run_dir(dir.path()).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("b.json"));
    }

    #[test]
    fn dir_load_rejects_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut run = demo_runs().remove(0);
        run.samples.torques.pop();
        fs::write(
            dir.path().join("bad.json"),
            serde_json::to_string(&run).unwrap(),
        )
        .unwrap();

        let (runs, warnings) = load_run_dir(dir.path()).unwrap();
        assert!(runs.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn demo_runs_are_valid_and_distinct() {
        let runs = demo_runs();
        assert_eq!(runs.len(), 2);
        for run in &runs {
            run.samples.validate().unwrap();
            assert!(run.samples.len() >= 2);
            assert!((run.samples.sample_interval() - 0.01).abs() < 1e-12);
        }
        assert_ne!(runs[0].name, runs[1].name);
    }
}
