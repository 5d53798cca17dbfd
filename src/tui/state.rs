use crate::model::{Directive, Run, RunSummary, JOINTS};
use std::sync::Arc;

pub const TAB_PLAYBACK: usize = 0;
pub const TAB_RUNS: usize = 1;
pub const TAB_HELP: usize = 2;
pub const TAB_COUNT: usize = 3;

/// UI-side mirror of the playback core, updated only from directives.
/// Owned by the UI thread; no cross-thread mutation.
pub struct UiState {
    pub tab: usize,
    pub playing: bool,
    pub speed: f64,
    pub info: String,

    pub run_names: Vec<String>,
    pub active: Option<String>,
    /// Selector highlight; independent of the active run until Enter.
    pub selected: usize,

    pub cursor: usize,
    pub pose: [f64; JOINTS],
    /// Chart data pinned by the last plot-refresh directive.
    pub plot_run: Option<Arc<Run>>,

    pub summaries: Vec<RunSummary>,
    pub last_exported_path: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: TAB_PLAYBACK,
            playing: false,
            speed: 1.0,
            info: String::new(),
            run_names: Vec::new(),
            active: None,
            selected: 0,
            cursor: 0,
            pose: [0.0; JOINTS],
            plot_run: None,
            summaries: Vec::new(),
            last_exported_path: None,
        }
    }
}

/// Fold one directive into the UI mirror. Export directives are handled by
/// the caller before this point; they reach collaborators, not state.
pub fn apply_directive(state: &mut UiState, directive: Directive) {
    match directive {
        Directive::Pose {
            index,
            configuration,
        } => {
            state.cursor = index;
            state.pose = configuration;
        }
        Directive::PlotData { run } => {
            // Idempotent wholesale replacement of the chart datasets.
            state.active = Some(run.name.clone());
            if let Some(pos) = state.run_names.iter().position(|n| *n == run.name) {
                state.selected = pos;
            }
            state.plot_run = Some(run);
        }
        Directive::PlayState { playing } => state.playing = playing,
        Directive::Speed { speed } => state.speed = speed,
        Directive::RunListChanged { names, active } => {
            state.run_names = names;
            if let Some(active) = active {
                if let Some(pos) = state.run_names.iter().position(|n| *n == active) {
                    state.selected = pos;
                }
                state.active = Some(active);
            }
            if state.selected >= state.run_names.len() {
                state.selected = state.run_names.len().saturating_sub(1);
            }
        }
        Directive::Info(msg) => state.info = msg,
        Directive::Export { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SampleSequence;

    fn run(name: &str) -> Arc<Run> {
        Arc::new(Run {
            name: name.into(),
            samples: SampleSequence {
                configurations: vec![[1.0; JOINTS]; 2],
                torques: vec![[0.0; JOINTS]; 2],
                errors: vec![[0.0; 2]; 2],
                timestamps: vec![0.0, 0.1],
            },
        })
    }

    #[test]
    fn plot_refresh_pins_run_and_syncs_selector() {
        let mut state = UiState::default();
        apply_directive(
            &mut state,
            Directive::RunListChanged {
                names: vec!["a".into(), "b".into()],
                active: Some("a".into()),
            },
        );
        apply_directive(&mut state, Directive::PlotData { run: run("b") });
        assert_eq!(state.active.as_deref(), Some("b"));
        assert_eq!(state.selected, 1);
        assert!(state.plot_run.is_some());
    }

    #[test]
    fn selector_is_clamped_when_run_list_shrinks() {
        let mut state = UiState {
            selected: 5,
            ..Default::default()
        };
        apply_directive(
            &mut state,
            Directive::RunListChanged {
                names: vec!["only".into()],
                active: None,
            },
        );
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn pose_updates_cursor_and_joints() {
        let mut state = UiState::default();
        apply_directive(
            &mut state,
            Directive::Pose {
                index: 7,
                configuration: [0.5; JOINTS],
            },
        );
        assert_eq!(state.cursor, 7);
        assert_eq!(state.pose, [0.5; JOINTS]);
    }
}
