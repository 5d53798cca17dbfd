//! Export collaborator: static plots and the tabular dump for one run.
//!
//! Writes four files with fixed names into the requested directory:
//! `joint_angles.png`, `joint_torques.png`, `tracking_errors.png` and
//! `simulation.csv` (one row per sample, one column per joint angle).

use crate::model::{Run, JOINTS};
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

pub const JOINT_ANGLES_FILE: &str = "joint_angles.png";
pub const JOINT_TORQUES_FILE: &str = "joint_torques.png";
pub const TRACKING_ERRORS_FILE: &str = "tracking_errors.png";
pub const TABLE_FILE: &str = "simulation.csv";

const PLOT_SIZE: (u32, u32) = (1000, 600);

/// Export the run, creating `dir` if needed. Returns the written paths.
pub fn export_run(run: &Run, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create export directory {}", dir.display()))?;

    let s = &run.samples;
    let joint_series = |per_sample: &[[f64; JOINTS]]| -> Vec<(String, Vec<f64>)> {
        (0..JOINTS)
            .map(|j| {
                (
                    format!("J{}", j + 1),
                    per_sample.iter().map(|v| v[j]).collect(),
                )
            })
            .collect()
    };

    let angles = dir.join(JOINT_ANGLES_FILE);
    render_time_series(
        &angles,
        &format!("{}: Joint Angles", run.name),
        "Angle (rad)",
        &s.timestamps,
        &joint_series(&s.configurations),
    )
    .map_err(|e| anyhow!("render {}: {e}", angles.display()))?;

    let torques = dir.join(JOINT_TORQUES_FILE);
    render_time_series(
        &torques,
        &format!("{}: Joint Torques", run.name),
        "Torque (Nm)",
        &s.timestamps,
        &joint_series(&s.torques),
    )
    .map_err(|e| anyhow!("render {}: {e}", torques.display()))?;

    let errors = dir.join(TRACKING_ERRORS_FILE);
    let error_series = vec![
        (
            "angular".to_string(),
            s.errors.iter().map(|e| e[0]).collect::<Vec<f64>>(),
        ),
        (
            "linear".to_string(),
            s.errors.iter().map(|e| e[1]).collect::<Vec<f64>>(),
        ),
    ];
    render_time_series(
        &errors,
        &format!("{}: Tracking Errors", run.name),
        "Error",
        &s.timestamps,
        &error_series,
    )
    .map_err(|e| anyhow!("render {}: {e}", errors.display()))?;

    let table = dir.join(TABLE_FILE);
    write_table(run, &table)?;

    Ok(vec![angles, torques, errors, table])
}

/// The configuration sequence as CSV: N rows, one column per joint angle.
pub fn write_table(run: &Run, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in &run.samples.configurations {
        writer
            .serialize(row)
            .with_context(|| format!("write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// One labeled line chart over time. Degenerate inputs (no samples, flat
/// ranges) still produce a readable empty chart rather than an error.
fn render_time_series(
    path: &Path,
    title: &str,
    y_desc: &str,
    times: &[f64],
    series: &[(String, Vec<f64>)],
) -> Result<(), Box<dyn Error>> {
    let x_max = times.last().copied().unwrap_or(1.0).max(1e-9);
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, values) in series {
        for v in values {
            y_min = y_min.min(*v);
            y_max = y_max.max(*v);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if (y_max - y_min).abs() < 1e-9 {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let margin = (y_max - y_min) * 0.05;

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, (y_min - margin)..(y_max + margin))?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(y_desc)
        .draw()?;

    for (i, (label, values)) in series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        let points: Vec<(f64, f64)> = times.iter().copied().zip(values.iter().copied()).collect();
        chart
            .draw_series(LineSeries::new(points, &color))?
            .label(label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SampleSequence;

    fn run_fixture(n: usize) -> Run {
        Run {
            name: "test".into(),
            samples: SampleSequence {
                configurations: (0..n).map(|i| [i as f64 * 0.1; JOINTS]).collect(),
                torques: vec![[1.0; JOINTS]; n],
                errors: vec![[0.1, 0.2]; n],
                timestamps: (0..n).map(|i| i as f64 * 0.01).collect(),
            },
        }
    }

    #[test]
    fn table_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_fixture(25);
        let path = dir.path().join(TABLE_FILE);
        write_table(&run, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = raw.lines().collect();
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0].split(',').count(), JOINTS);
    }

    #[test]
    fn table_for_empty_run_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_fixture(0);
        let path = dir.path().join(TABLE_FILE);
        write_table(&run, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
