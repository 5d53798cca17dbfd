//! Playback scheduler task.
//!
//! A single tokio task owns the run store and playback state; operator
//! actions arrive over a command channel and render directives leave over an
//! event channel, so no field is ever mutated from two threads.

use super::state::{apply, Action, PlaybackState};
use crate::model::Directive;
use crate::store::RunStore;
use anyhow::Result;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep, Duration};

/// Idle poll interval: how long a stop request can wait before the loop
/// observes it while nothing is playing.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wall-clock wait per half step, derived from the live dt and speed so a
/// speed change takes effect at the very next wait.
fn step_interval(state: &PlaybackState) -> Duration {
    Duration::from_secs_f64((state.dt / state.speed).max(0.0))
}

/// Drive playback until `Quit` arrives or the command channel closes.
///
/// While playing, each sample is displayed for two step intervals: emit the
/// pose at the cursor, wait, increment, wait again. The double wait matches
/// the recorded visualizer timing and must not be collapsed to a single
/// wait, which would double the effective playback rate. When the cursor
/// runs off the end of the sequence playback halts without wrapping.
pub async fn run_controller(
    mut store: RunStore,
    mut state: PlaybackState,
    event_tx: UnboundedSender<Directive>,
    mut action_rx: UnboundedReceiver<Action>,
    poll_interval: Duration,
) -> Result<()> {
    loop {
        // Drain queued actions first so a pause or run switch issued during
        // the previous step cycle lands before the next pose is emitted.
        loop {
            match action_rx.try_recv() {
                Ok(Action::Quit) | Err(TryRecvError::Disconnected) => return Ok(()),
                Ok(action) => emit_all(&event_tx, apply(&mut state, &mut store, action)),
                Err(TryRecvError::Empty) => break,
            }
        }

        let run = match (state.playing, state.active.clone()) {
            (true, Some(run)) => run,
            _ => {
                // Nothing advancing: wait for the next action, with a short
                // poll tick as an upper bound on reaction latency.
                tokio::select! {
                    action = action_rx.recv() => match action {
                        Some(Action::Quit) | None => return Ok(()),
                        Some(action) => emit_all(&event_tx, apply(&mut state, &mut store, action)),
                    },
                    _ = sleep(poll_interval) => {}
                }
                continue;
            }
        };

        if state.cursor >= run.samples.len() {
            // Sequence exhausted: revert to idle, no wrap, no auto-restart.
            state.playing = false;
            let _ = event_tx.send(Directive::PlayState { playing: false });
            continue;
        }

        let _ = event_tx.send(Directive::Pose {
            index: state.cursor,
            configuration: run.samples.configurations[state.cursor],
        });
        sleep(step_interval(&state)).await;
        state.cursor += 1;
        sleep(step_interval(&state)).await;
    }
}

fn emit_all(event_tx: &UnboundedSender<Directive>, directives: Vec<Directive>) {
    for d in directives {
        let _ = event_tx.send(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Run, SampleSequence, JOINTS};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    fn run_fixture(name: &str, n: usize) -> Run {
        Run {
            name: name.into(),
            samples: SampleSequence {
                configurations: (0..n).map(|i| [i as f64; JOINTS]).collect(),
                torques: vec![[0.0; JOINTS]; n],
                errors: vec![[0.0; 2]; n],
                timestamps: (0..n).map(|i| i as f64 * 0.1).collect(),
            },
        }
    }

    struct Harness {
        action_tx: mpsc::UnboundedSender<Action>,
        event_rx: mpsc::UnboundedReceiver<Directive>,
        handle: tokio::task::JoinHandle<Result<()>>,
    }

    fn spawn_controller() -> Harness {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(
            RunStore::new(),
            PlaybackState::default(),
            event_tx,
            action_rx,
            DEFAULT_POLL_INTERVAL,
        ));
        Harness {
            action_tx,
            event_rx,
            handle,
        }
    }

    async fn drain_for(h: &mut Harness, window: Duration) -> Vec<Directive> {
        let mut out = Vec::new();
        let deadline = Instant::now() + window;
        loop {
            tokio::select! {
                d = h.event_rx.recv() => match d {
                    Some(d) => out.push(d),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
        out
    }

    async fn shutdown(h: Harness) {
        let _ = h.action_tx.send(Action::Quit);
        let _ = h.handle.await;
    }

    #[tokio::test(start_paused = true)]
    async fn plays_through_and_auto_stops() {
        let mut h = spawn_controller();
        h.action_tx.send(Action::AddRun(run_fixture("a", 3))).unwrap();
        h.action_tx.send(Action::TogglePlay).unwrap();

        // dt 0.1 at speed 1 with the double wait: 0.2 s per sample; a full
        // second is ample for all three plus the auto-stop.
        let events = drain_for(&mut h, Duration::from_secs(1)).await;

        let poses: Vec<usize> = events
            .iter()
            .filter_map(|d| match d {
                Directive::Pose { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        // Pose 0 once at activation, then the played-back sequence.
        assert_eq!(poses, vec![0, 0, 1, 2]);

        let last_play_state = events
            .iter()
            .rev()
            .find_map(|d| match d {
                Directive::PlayState { playing } => Some(*playing),
                _ => None,
            })
            .expect("auto-stop must emit a play-state directive");
        assert!(!last_play_state);

        // Idle after exhaustion: no further poses show up.
        let quiet = drain_for(&mut h, Duration::from_secs(1)).await;
        assert!(quiet
            .iter()
            .all(|d| !matches!(d, Directive::Pose { .. })));
        shutdown(h).await;
    }

    #[tokio::test(start_paused = true)]
    async fn resuming_an_exhausted_run_stops_without_advancing() {
        let mut h = spawn_controller();
        h.action_tx.send(Action::AddRun(run_fixture("a", 2))).unwrap();
        h.action_tx.send(Action::TogglePlay).unwrap();
        drain_for(&mut h, Duration::from_secs(1)).await;

        h.action_tx.send(Action::TogglePlay).unwrap();
        let events = drain_for(&mut h, Duration::from_secs(1)).await;
        assert!(events.iter().all(|d| !matches!(d, Directive::Pose { .. })));
        let last_play_state = events.iter().rev().find_map(|d| match d {
            Directive::PlayState { playing } => Some(*playing),
            _ => None,
        });
        assert_eq!(last_play_state, Some(false));
        shutdown(h).await;
    }

    #[tokio::test(start_paused = true)]
    async fn doubling_speed_halves_time_per_sample() {
        let mut h = spawn_controller();
        h.action_tx
            .send(Action::AddRun(run_fixture("a", 50)))
            .unwrap();

        let mut elapsed = Vec::new();
        for speed in [1.0, 2.0] {
            h.action_tx.send(Action::Restart).unwrap();
            h.action_tx.send(Action::SetSpeed(speed)).unwrap();
            h.action_tx.send(Action::TogglePlay).unwrap();
            let start = Instant::now();
            // Wait for the pose at index 8 to be emitted.
            loop {
                match h.event_rx.recv().await {
                    Some(Directive::Pose { index: 8, .. }) => break,
                    Some(_) => {}
                    None => panic!("controller ended early"),
                }
            }
            elapsed.push(start.elapsed().as_secs_f64());
            h.action_tx.send(Action::TogglePlay).unwrap();
            drain_for(&mut h, Duration::from_millis(500)).await;
        }

        // Virtual time: 8 samples of 2 * dt / speed each, so the ratio is 2
        // up to one poll interval of slack.
        let ratio = elapsed[0] / elapsed[1];
        assert!(
            (ratio - 2.0).abs() < 0.2,
            "expected halved step time, got {:?}",
            elapsed
        );
        shutdown(h).await;
    }

    #[tokio::test(start_paused = true)]
    async fn recorded_scenario_plays_back_verbatim() {
        // Run "A": timestamps [0.0, 0.1, 0.2], configurations 0/1/2 across
        // all joints. Select, play, and let the scheduler run to exhaustion.
        let mut h = spawn_controller();
        h.action_tx.send(Action::AddRun(run_fixture("A", 3))).unwrap();
        h.action_tx.send(Action::SelectRun("A".into())).unwrap();
        h.action_tx.send(Action::TogglePlay).unwrap();

        let events = drain_for(&mut h, Duration::from_secs(1)).await;
        let last_pose = events
            .iter()
            .rev()
            .find_map(|d| match d {
                Directive::Pose { configuration, .. } => Some(*configuration),
                _ => None,
            })
            .expect("poses were emitted");
        assert_eq!(last_pose, [2.0; JOINTS]);
        let final_play_state = events.iter().rev().find_map(|d| match d {
            Directive::PlayState { playing } => Some(*playing),
            _ => None,
        });
        assert_eq!(final_play_state, Some(false));
        shutdown(h).await;
    }
}
