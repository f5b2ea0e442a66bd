//! Terminal rendering

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use stretto_audio::Control;
use stretto_input::{InputHandler, Mode};

use crate::app::{display_name, format_time, App};

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;
const DANGER: Color = Color::Red;

pub fn render(frame: &mut Frame, app: &App, input: &InputHandler) {
    let [header, tempo, progress, controls, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(2),
    ])
    .areas(frame.area());

    render_header(frame, header, app);
    render_tempo(frame, tempo, app);
    render_progress(frame, progress, app);
    render_controls(frame, controls, app);
    render_footer(frame, footer, app, input);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let track = match (&app.pending, &app.track) {
        (Some(path), _) => format!("{} (loading)", display_name(path)),
        (None, Some(path)) => display_name(path),
        (None, None) => "No track".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(" STRETTO ");
    let line = Line::from(vec![
        Span::styled(track, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(app.status.clone(), Style::default().fg(DIM)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_tempo(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Tempo ");
    let lines = vec![
        Line::from(vec![
            Span::raw("Speed: "),
            Span::styled(
                app.tempo.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Pitch correction: "),
            Span::styled(app.pitch_correction.clone(), Style::default().fg(ACCENT)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);
    let (ratio, label) = match app.transport {
        Some(t) => {
            let ratio = if t.length_ms == 0 {
                0.0
            } else {
                (t.position_ms as f64 / t.length_ms as f64).clamp(0.0, 1.0)
            };
            let state = if t.paused { "paused" } else { "playing" };
            (
                ratio,
                format!(
                    "{} / {}  {}",
                    format_time(t.position_ms),
                    format_time(t.length_ms),
                    state
                ),
            )
        }
        None => (0.0, "--:-- / --:--".to_string()),
    };
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(ACCENT))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Controls ");
    let keys = [
        (Control::FileInput, ":load"),
        (Control::Play, "space"),
        (Control::PitchCorrection, "p"),
        (Control::Rewind, "\u{2190}"),
        (Control::Forward, "\u{2192}"),
        (Control::RewindLarge, "H"),
        (Control::ForwardLarge, "L"),
        (Control::Slower, "["),
        (Control::Faster, "]"),
        (Control::SlowerLarge, "{"),
        (Control::FasterLarge, "}"),
        (Control::ResetTempo, "0"),
    ];
    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(control, key)| {
            let style = if app.enabled.contains(control) {
                Style::default()
            } else {
                Style::default().fg(DIM)
            };
            [
                Span::styled(format!("[{}] {}", key, control.label()), style),
                Span::raw("  "),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, input: &InputHandler) {
    let mode = Span::styled(
        format!(" {} ", input.mode().display_name()),
        Style::default().fg(Color::Black).bg(ACCENT),
    );
    let second = match input.mode() {
        Mode::Command => Line::from(format!(":{}", input.command_buffer())),
        Mode::Normal => match (&app.error, &app.message) {
            (Some(error), _) => Line::from(Span::styled(error.clone(), Style::default().fg(DANGER))),
            (None, Some(message)) => Line::from(message.clone()),
            (None, None) => Line::from(Span::styled(
                "q quit  : command",
                Style::default().fg(DIM),
            )),
        },
    };
    frame.render_widget(Paragraph::new(vec![Line::from(mode), second]), area);
}
