use crate::model::{Run, RunSummary};
use crate::{export, metrics, storage, text_summary};
use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "trajscope",
    version,
    about = "Playback inspector for recorded robot-arm simulation runs"
)]
pub struct Cli {
    /// Run files (JSON) to load at startup
    pub run_files: Vec<PathBuf>,

    /// Load every *.json run file from this directory
    #[arg(long)]
    pub runs_dir: Option<PathBuf>,

    /// Add two synthetic demo runs (no simulator required)
    #[arg(long)]
    pub demo: bool,

    /// Print per-run text summaries and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print per-run JSON summaries and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Export the selected run into this directory and exit (no TUI)
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Run to select at startup (defaults to the first loaded)
    #[arg(long)]
    pub run: Option<String>,

    /// Initial playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// Start playback as soon as the TUI opens
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub autoplay: bool,

    /// Scheduler idle poll interval
    #[arg(long, default_value_t = crate::playback::DEFAULT_POLL_INTERVAL.into())]
    pub poll_interval: humantime::Duration,
}

pub async fn run(args: Cli) -> Result<()> {
    ensure!(
        args.speed > 0.0 && args.speed.is_finite(),
        "--speed must be a positive number"
    );

    let runs = load_runs(&args)?;

    if let Some(dir) = args.export.as_deref() {
        return match select_initial(&runs, args.run.as_deref()) {
            Some(run) => {
                let paths = export::export_run(run, dir)
                    .with_context(|| format!("export run {}", run.name))?;
                for p in paths {
                    println!("Wrote {}", p.display());
                }
                Ok(())
            }
            None => {
                eprintln!("No runs loaded; nothing to export.");
                Ok(())
            }
        };
    }

    if args.json {
        let summaries: Vec<RunSummary> = runs.iter().map(metrics::summarize).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if args.text {
        return run_text(&runs);
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args, runs).await
    }
    #[cfg(not(feature = "tui"))]
    {
        // Fallback when built without TUI support.
        run_text(&runs)
    }
}

fn run_text(runs: &[Run]) -> Result<()> {
    let refs: Vec<&Run> = runs.iter().collect();
    for line in text_summary::build_text_summary(&refs).lines {
        println!("{line}");
    }
    Ok(())
}

/// The run named by `--run`, or the first loaded one. An unknown name falls
/// back to the first run, matching the selector's not-found-is-no-op rule.
fn select_initial<'a>(runs: &'a [Run], name: Option<&str>) -> Option<&'a Run> {
    name.and_then(|n| runs.iter().find(|r| r.name == n))
        .or_else(|| runs.first())
}

/// Gather runs from explicit files, a directory, the default runs
/// directory, and the demo generator. Explicit files must parse; directory
/// scans skip bad files with a warning on stderr.
fn load_runs(args: &Cli) -> Result<Vec<Run>> {
    let mut runs = Vec::new();

    for path in &args.run_files {
        runs.push(storage::load_run_file(path)?);
    }

    let scan_dir = args.runs_dir.clone().or_else(|| {
        // Only fall back to the data dir when nothing was asked for
        // explicitly, and only if it exists.
        if args.run_files.is_empty() && !args.demo {
            storage::default_runs_dir().filter(|d| d.is_dir())
        } else {
            None
        }
    });
    if let Some(dir) = scan_dir {
        let (found, warnings) = storage::load_run_dir(&dir)?;
        for w in warnings {
            eprintln!("{w}");
        }
        runs.extend(found);
    }

    if args.demo {
        runs.extend(storage::demo_runs());
    }

    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_selection_prefers_named_run() {
        let runs = storage::demo_runs();
        let picked = select_initial(&runs, Some("computed_torque")).unwrap();
        assert_eq!(picked.name, "computed_torque");
    }

    #[test]
    fn initial_selection_falls_back_to_first() {
        let runs = storage::demo_runs();
        assert_eq!(select_initial(&runs, None).unwrap().name, runs[0].name);
        assert_eq!(
            select_initial(&runs, Some("ghost")).unwrap().name,
            runs[0].name
        );
        assert!(select_initial(&[], Some("ghost")).is_none());
    }
}
