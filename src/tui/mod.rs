mod charts;
mod export;
mod help;
mod state;

use crate::cli::Cli;
use crate::metrics;
use crate::model::{Directive, Run, RunSummary};
use crate::playback::{self, Action, PlaybackState};
use crate::store::RunStore;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};
use self::state::{apply_directive, UiState, TAB_COUNT, TAB_HELP, TAB_RUNS};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli, runs: Vec<Run>) -> Result<()> {
    // Unbounded channels avoid backpressure between the scheduler and the UI.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Directive>();
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

    // Runs are immutable after load, so their metrics are computed once here.
    let summaries: Vec<RunSummary> = runs.iter().map(metrics::summarize).collect();

    // Queue the startup sequence before either side runs: the first AddRun
    // auto-activates, so the UI opens with a run already on screen.
    for run in runs {
        let _ = action_tx.send(Action::AddRun(run));
    }
    if let Some(name) = args.run.clone() {
        let _ = action_tx.send(Action::SelectRun(name));
    }
    if (args.speed - 1.0).abs() > f64::EPSILON {
        let _ = action_tx.send(Action::SetSpeed(args.speed));
    }
    if args.autoplay {
        let _ = action_tx.send(Action::TogglePlay);
    }

    // TUI runs in a dedicated thread to keep all blocking I/O out of the
    // Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(summaries, event_rx, action_tx));

    let res = playback::run_controller(
        RunStore::new(),
        PlaybackState::default(),
        event_tx,
        action_rx,
        args.poll_interval.into(),
    )
    .await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    summaries: Vec<RunSummary>,
    mut event_rx: UnboundedReceiver<Directive>,
    action_tx: UnboundedSender<Action>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState {
        summaries,
        ..Default::default()
    };

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain directives without blocking to keep the UI responsive.
        while let Ok(d) = event_rx.try_recv() {
            match d {
                Directive::Export { run, dir } => match crate::export::export_run(&run, &dir) {
                    Ok(paths) => {
                        state.last_exported_path = Some(dir.display().to_string());
                        state.info = format!(
                            "Exported {} files to {} (press 'y' to copy path)",
                            paths.len(),
                            dir.display()
                        );
                    }
                    Err(e) => state.info = format!("Export failed: {e:#}"),
                },
                other => apply_directive(&mut state, other),
            }
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = action_tx.send(Action::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char(' ')) => {
                        let _ = action_tx.send(Action::TogglePlay);
                    }
                    (_, KeyCode::Left) | (_, KeyCode::Char('h')) => {
                        seek_relative(&state, &action_tx, -1);
                    }
                    (_, KeyCode::Right) | (_, KeyCode::Char('l')) => {
                        seek_relative(&state, &action_tx, 1);
                    }
                    (_, KeyCode::PageUp) => seek_relative(&state, &action_tx, -25),
                    (_, KeyCode::PageDown) => seek_relative(&state, &action_tx, 25),
                    (_, KeyCode::Home) => {
                        let _ = action_tx.send(Action::Restart);
                    }
                    (_, KeyCode::Char('+')) | (_, KeyCode::Char('=')) => {
                        let _ = action_tx.send(Action::SetSpeed(state.speed * 1.25));
                    }
                    (_, KeyCode::Char('-')) => {
                        let _ = action_tx.send(Action::SetSpeed(state.speed / 1.25));
                    }
                    (_, KeyCode::Up) | (_, KeyCode::Char('k')) => {
                        if state.selected > 0 {
                            state.selected -= 1;
                        }
                    }
                    (_, KeyCode::Down) | (_, KeyCode::Char('j')) => {
                        if state.selected + 1 < state.run_names.len() {
                            state.selected += 1;
                        }
                    }
                    (_, KeyCode::Enter) => {
                        if let Some(name) = state.run_names.get(state.selected) {
                            let _ = action_tx.send(Action::SelectRun(name.clone()));
                        }
                    }
                    (_, KeyCode::Char(c @ '1'..='9')) => {
                        let idx = c as usize - '1' as usize;
                        if let Some(name) = state.run_names.get(idx) {
                            let _ = action_tx.send(Action::SelectRun(name.clone()));
                        }
                    }
                    (_, KeyCode::Char('e')) => match state.active.as_deref() {
                        Some(name) => match export::export_destination(name) {
                            Ok(dir) => {
                                let _ = action_tx.send(Action::Export(dir));
                            }
                            Err(e) => state.info = format!("Export failed: {e:#}"),
                        },
                        None => state.info = "No active run to export.".into(),
                    },
                    (_, KeyCode::Char('y')) => {
                        if let Some(ref path) = state.last_exported_path {
                            match export::copy_to_clipboard(path) {
                                Ok(_) => state.info = format!("Copied to clipboard: {path}"),
                                Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
                            }
                        } else {
                            state.info = "No exported path to copy. Export first (e).".into();
                        }
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % TAB_COUNT;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = TAB_HELP;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

/// Seeks resolve to absolute indices; the core drops them while playing so
/// the scheduler and the operator never race on the cursor.
fn seek_relative(state: &UiState, action_tx: &UnboundedSender<Action>, delta: isize) {
    let _ = action_tx.send(Action::Seek(state.cursor as isize + delta));
}

fn draw(area: Rect, f: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let tabs = Tabs::new(vec!["Playback", "Runs", "Help"])
        .select(state.tab)
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_RUNS => draw_runs_tab(chunks[1], f, state),
        TAB_HELP => help::draw_help(chunks[1], f),
        _ => draw_playback_tab(chunks[1], f, state),
    }

    draw_status_line(chunks[2], f, state);
}

fn draw_playback_tab(area: Rect, f: &mut Frame, state: &UiState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)].as_ref())
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(35),
                Constraint::Percentage(40),
                Constraint::Percentage(25),
            ]
            .as_ref(),
        )
        .split(cols[0]);

    charts::draw_run_list(f, left[0], state);
    charts::draw_pose_panel(f, left[1], state);
    draw_transport(f, left[2], state);
    charts::draw_run_charts(f, cols[1], state);
}

/// Cursor, timing, and play-state readout.
fn draw_transport(f: &mut Frame, area: Rect, state: &UiState) {
    let run = state.plot_run.as_deref();
    let n = run.map(|r| r.samples.len()).unwrap_or(0);
    let shown = state.cursor.min(n.saturating_sub(1));
    let t = run
        .and_then(|r| r.samples.timestamps.get(shown).copied())
        .unwrap_or(0.0);
    let dt = run.map(|r| r.samples.sample_interval());

    let play_state = if state.playing {
        Span::styled("Playing", Style::default().fg(Color::Green))
    } else if run.is_some() {
        Span::styled("Paused", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("No run", Style::default().fg(Color::Gray))
    };

    let lines = vec![
        Line::from(vec![Span::raw("State:  "), play_state]),
        Line::from(format!(
            "Sample: {}/{} (t = {:.2} s)",
            if n == 0 { 0 } else { shown + 1 },
            n,
            t
        )),
        Line::from(format!("Speed:  {:.2}x", state.speed)),
        Line::from(match dt {
            Some(dt) => format!("dt:     {:.1} ms", dt * 1e3),
            None => "dt:     -".to_string(),
        }),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Transport"));
    f.render_widget(p, area);
}

/// Per-run metrics table for comparing controllers side by side.
fn draw_runs_tab(area: Rect, f: &mut Frame, state: &UiState) {
    let mut lines = Vec::new();
    if state.summaries.is_empty() {
        lines.push(Line::from("No runs loaded."));
    }
    for s in &state.summaries {
        let is_active = state.active.as_deref() == Some(s.name.as_str());
        let name_style = if is_active {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(s.name.clone(), name_style),
            Span::styled(
                format!("  {} samples, {:.2} s @ dt {:.1} ms", s.samples, s.duration_s, s.dt_s * 1e3),
                Style::default().fg(Color::Gray),
            ),
        ]));
        let peaks = s
            .peak_torque_nm
            .iter()
            .enumerate()
            .map(|(j, t)| format!("J{} {:.1}", j + 1, t))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(format!("  peak |torque| (Nm): {peaks}")));
        lines.push(Line::from(format!(
            "  error rms: angular {:.4} linear {:.4}, final: angular {:.4} linear {:.4}",
            s.rms_angular_error, s.rms_linear_error, s.final_angular_error, s.final_linear_error
        )));
        lines.push(Line::from(""));
    }
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Runs"));
    f.render_widget(p, area);
}

fn draw_status_line(area: Rect, f: &mut Frame, state: &UiState) {
    let hint = "space play/pause · ←/→ step · enter select · e export · ? help · q quit";
    let line = if state.info.is_empty() {
        Line::from(Span::styled(hint, Style::default().fg(Color::Gray)))
    } else {
        Line::from(vec![
            Span::raw(state.info.clone()),
            Span::styled(format!("   {hint}"), Style::default().fg(Color::Gray)),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}
