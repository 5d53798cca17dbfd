use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn bind(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{key:<12}"), Style::default().fg(Color::Magenta)),
        Span::raw(desc.to_string()),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        bind("q / Ctrl-C", "Quit"),
        bind("space", "Play / Pause"),
        bind("←/→ or h/l", "Step one sample (paused only)"),
        bind("PgUp/PgDn", "Jump 25 samples (paused only)"),
        bind("Home", "Restart from sample 0"),
        bind("+ / -", "Speed up / slow down"),
        bind("tab", "Switch tabs"),
        bind("?", "Show this help"),
        Line::from(""),
        Line::from("Run selection:"),
        bind("↑/↓ or j/k", "Move highlight"),
        bind("Enter", "Activate highlighted run"),
        bind("1..9", "Activate run by number"),
        Line::from(""),
        Line::from("Export:"),
        bind("e", "Export active run (plots + CSV)"),
        bind("y", "Copy exported path to clipboard"),
        Line::from(""),
        Line::from(vec![Span::raw(
            "Seeks issued while playing are ignored; pause first.",
        )]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
