//! Playback state and the action transition function.
//!
//! All operator input is an enumerated [`Action`] applied through [`apply`],
//! which mutates the state and returns the directives to emit. Keeping the
//! transition pure of channels and clocks makes every invariant unit-testable.

use crate::model::{Directive, Run, DEFAULT_DT};
use crate::store::RunStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Operator actions delivered to the playback controller.
#[derive(Debug, Clone)]
pub enum Action {
    /// Register a completed run. The first run ever added becomes active.
    AddRun(Run),
    /// Make the named run active, stopping playback and rewinding to sample 0.
    SelectRun(String),
    /// Move the cursor to an absolute sample index, clamped to the run.
    /// Ignored while playing so the scheduler and the operator never race.
    Seek(isize),
    TogglePlay,
    /// Rewind to sample 0 without touching the play state.
    Restart,
    /// Set the speed multiplier; non-positive values are rejected.
    SetSpeed(f64),
    /// Export the active run into the given directory.
    Export(PathBuf),
    Quit,
}

/// Mutable playback state, owned exclusively by the controller task.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Active run, pinned at selection time. Replacing a run in the store
    /// does not retarget playback until the run is selected again.
    pub active: Option<Arc<Run>>,
    /// Index of the displayed sample. Operator mutations clamp it to
    /// `[0, N-1]`; the scheduler may step it to N, the exhausted position.
    pub cursor: usize,
    /// Sample interval of the active run, seconds.
    pub dt: f64,
    /// Playback speed multiplier, > 0.
    pub speed: f64,
    pub playing: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            active: None,
            cursor: 0,
            dt: DEFAULT_DT,
            speed: 1.0,
            playing: false,
        }
    }
}

impl PlaybackState {
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref().map(|r| r.name.as_str())
    }
}

/// Apply one action, returning the directives to emit. Unknown run names,
/// seeks without an active run, and invalid speeds are silent no-ops;
/// UI events can legitimately race with store mutation.
pub fn apply(state: &mut PlaybackState, store: &mut RunStore, action: Action) -> Vec<Directive> {
    let mut out = Vec::new();
    match action {
        Action::AddRun(run) => {
            let name = run.name.clone();
            let first = store.add(run);
            if first {
                activate(state, store, &name, &mut out);
            }
            out.push(Directive::RunListChanged {
                names: store.names(),
                active: state.active_name().map(str::to_owned),
            });
        }
        Action::SelectRun(name) => {
            if activate(state, store, &name, &mut out) {
                out.push(Directive::RunListChanged {
                    names: store.names(),
                    active: Some(name),
                });
            }
        }
        Action::Seek(idx) => {
            if state.playing {
                return out;
            }
            if let Some(run) = state.active.clone() {
                let n = run.samples.len();
                if n == 0 {
                    return out;
                }
                state.cursor = idx.clamp(0, n as isize - 1) as usize;
                out.push(Directive::Pose {
                    index: state.cursor,
                    configuration: run.samples.configurations[state.cursor],
                });
            }
        }
        Action::TogglePlay => {
            if state.active.is_some() {
                state.playing = !state.playing;
                out.push(Directive::PlayState {
                    playing: state.playing,
                });
            }
        }
        Action::Restart => {
            if let Some(run) = state.active.clone() {
                state.cursor = 0;
                if !run.samples.is_empty() {
                    out.push(Directive::Pose {
                        index: 0,
                        configuration: run.samples.configurations[0],
                    });
                }
            }
        }
        Action::SetSpeed(s) => {
            if s > 0.0 && s.is_finite() {
                state.speed = s;
                out.push(Directive::Speed { speed: s });
            }
        }
        Action::Export(dir) => match state.active.clone() {
            Some(run) => out.push(Directive::Export { run, dir }),
            None => out.push(Directive::Info("no active run to export".into())),
        },
        Action::Quit => {}
    }
    out
}

/// Make `name` active: stop playback, recompute dt, rewind, re-emit pose and
/// plot data. Returns false (leaving everything untouched) when the name is
/// not in the store.
fn activate(
    state: &mut PlaybackState,
    store: &RunStore,
    name: &str,
    out: &mut Vec<Directive>,
) -> bool {
    let Some(run) = store.get(name) else {
        return false;
    };
    if state.playing {
        state.playing = false;
        out.push(Directive::PlayState { playing: false });
    }
    state.dt = run.samples.sample_interval();
    state.cursor = 0;
    if !run.samples.is_empty() {
        out.push(Directive::Pose {
            index: 0,
            configuration: run.samples.configurations[0],
        });
    }
    out.push(Directive::PlotData { run: run.clone() });
    state.active = Some(run);
    true
}
