use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::state::UiState;
use crate::model::JOINTS;

pub const JOINT_COLORS: [Color; JOINTS] = [
    Color::Blue,
    Color::Yellow,
    Color::Green,
    Color::Red,
    Color::Magenta,
    Color::Cyan,
];

/// Three stacked time-series charts for the pinned run, with a vertical
/// cursor marker at the displayed sample.
pub fn draw_run_charts(f: &mut Frame, area: Rect, state: &UiState) {
    let Some(run) = state.plot_run.as_deref() else {
        let empty = Paragraph::new("No run selected.")
            .block(Block::default().borders(Borders::ALL).title("Charts"));
        f.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(area);

    let s = &run.samples;
    let times = &s.timestamps;
    let cursor_t = times.get(state.cursor.min(s.len().saturating_sub(1))).copied();

    let joint_series = |per_sample: &[[f64; JOINTS]]| -> Vec<(String, Vec<f64>, Color)> {
        (0..JOINTS)
            .map(|j| {
                (
                    format!("J{}", j + 1),
                    per_sample.iter().map(|v| v[j]).collect(),
                    JOINT_COLORS[j],
                )
            })
            .collect()
    };

    draw_time_series(
        f,
        chunks[0],
        &format!("{}: Joint Angles (rad)", run.name),
        times,
        &joint_series(&s.configurations),
        cursor_t,
    );
    draw_time_series(
        f,
        chunks[1],
        &format!("{}: Joint Torques (Nm)", run.name),
        times,
        &joint_series(&s.torques),
        cursor_t,
    );
    let error_series = vec![
        (
            "angular".to_string(),
            s.errors.iter().map(|e| e[0]).collect::<Vec<f64>>(),
            Color::LightBlue,
        ),
        (
            "linear".to_string(),
            s.errors.iter().map(|e| e[1]).collect::<Vec<f64>>(),
            Color::LightRed,
        ),
    ];
    draw_time_series(
        f,
        chunks[2],
        &format!("{}: Tracking Errors", run.name),
        times,
        &error_series,
        cursor_t,
    );
}

fn draw_time_series(
    f: &mut Frame,
    area: Rect,
    title: &str,
    times: &[f64],
    series: &[(String, Vec<f64>, Color)],
    cursor_t: Option<f64>,
) {
    if times.is_empty() {
        let empty = Paragraph::new("Waiting for data...")
            .block(Block::default().borders(Borders::ALL).title(title.to_string()));
        f.render_widget(empty, area);
        return;
    }

    let x_min = times.first().copied().unwrap_or(0.0);
    let x_max = times.last().copied().unwrap_or(1.0).max(x_min + 1e-9);
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, values, _) in series {
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

    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|(_, values, _)| {
            times
                .iter()
                .copied()
                .zip(values.iter().copied())
                .collect::<Vec<(f64, f64)>>()
        })
        .collect();
    let marker_points: Vec<(f64, f64)> = cursor_t
        .map(|t| vec![(t, y_min), (t, y_max)])
        .unwrap_or_default();

    let mut datasets: Vec<Dataset> = series
        .iter()
        .zip(points.iter())
        .map(|((label, _, color), pts)| {
            Dataset::default()
                .name(label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(pts)
        })
        .collect();
    if !marker_points.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Bar)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::White))
                .data(&marker_points),
        );
    }

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format!("{x_min:.1}s")),
                    Span::raw(format!("{:.1}s", (x_min + x_max) / 2.0)),
                    Span::raw(format!("{x_max:.1}s")),
                ])
                .style(Style::default().fg(Color::Gray)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.2}")),
                    Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{y_max:.2}")),
                ])
                .style(Style::default().fg(Color::Gray)),
        );
    f.render_widget(chart, area);
}

/// Current joint configuration as labeled, signed bars around zero.
pub fn draw_pose_panel(f: &mut Frame, area: Rect, state: &UiState) {
    let mut lines = Vec::with_capacity(JOINTS + 1);
    // Bar spans [-pi, pi]; wider excursions saturate.
    let half = (area.width.saturating_sub(16) / 2).max(4) as f64;
    for (j, angle) in state.pose.iter().enumerate() {
        let frac = (angle / std::f64::consts::PI).clamp(-1.0, 1.0);
        let cells = (frac.abs() * half).round() as usize;
        let (neg, pos) = if frac < 0.0 {
            (
                format!("{:>width$}", "▆".repeat(cells), width = half as usize),
                " ".repeat(half as usize),
            )
        } else {
            (
                " ".repeat(half as usize),
                format!("{:<width$}", "▆".repeat(cells), width = half as usize),
            )
        };
        lines.push(Line::from(vec![
            Span::styled(format!("J{} ", j + 1), Style::default().fg(JOINT_COLORS[j])),
            Span::styled(neg, Style::default().fg(JOINT_COLORS[j])),
            Span::raw("|"),
            Span::styled(pos, Style::default().fg(JOINT_COLORS[j])),
            Span::styled(format!(" {angle:+.3}"), Style::default().fg(Color::Gray)),
        ]));
    }
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Pose (rad, ±π)"),
    );
    f.render_widget(p, area);
}

/// Run selector list with the active run and selector highlight marked.
pub fn draw_run_list(f: &mut Frame, area: Rect, state: &UiState) {
    let mut lines = Vec::new();
    if state.run_names.is_empty() {
        lines.push(Line::from("<no runs loaded>"));
    }
    for (i, name) in state.run_names.iter().enumerate() {
        let is_active = state.active.as_deref() == Some(name.as_str());
        let is_selected = i == state.selected;
        let marker = if is_active { "▶ " } else { "  " };
        let style = match (is_selected, is_active) {
            (true, _) => Style::default().fg(Color::Black).bg(Color::Gray),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default(),
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}. {name}", i + 1),
            style,
        )));
    }
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Runs (↑/↓ + Enter)"),
    );
    f.render_widget(p, area);
}
