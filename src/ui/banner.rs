// Banner rendering module
//
// Renders the top banner with the title, the live indicator and the
// headline counters.

use crate::app::AppState;
use crate::feed::ConnectionState;
use crate::stats::StatsSnapshot;
use crate::theme::{connection_state_color, interpolate_color, BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub fn render_banner(f: &mut Frame, area: Rect, app: &AppState, stats: &StatsSnapshot) {
    let state = app.feed.state();

    let mut spans = vec![
        Span::styled(
            " ◉ ATTACKMAP ",
            Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(BONE_WHITE)),
        live_indicator(state, app.pulse_phase),
        Span::styled(" │ ", Style::default().fg(BONE_WHITE)),
        Span::styled(
            format!("session: {} ", stats.total),
            Style::default().fg(BONE_WHITE),
        ),
        Span::styled(
            format!("({:.1}/min)", stats.events_per_minute),
            Style::default().fg(PUMPKIN_ORANGE),
        ),
    ];

    if let Some(today) = &stats.today {
        spans.push(Span::styled(" │ ", Style::default().fg(BONE_WHITE)));
        spans.push(Span::styled(
            format!("today: {}", today.total),
            Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
        ));
    }

    let banner = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(banner, area);
}

/// "● LIVE" pulses while connected; other states are shown steady
fn live_indicator(state: ConnectionState, pulse_phase: f32) -> Span<'static> {
    let color = if state.is_live() {
        // Triangle wave 0 -> 1 -> 0 over one pulse period
        let ratio = 1.0 - (pulse_phase * 2.0 - 1.0).abs();
        interpolate_color((90, 120, 60), (158, 206, 106), ratio)
    } else {
        connection_state_color(state)
    };
    Span::styled(
        format!("● {}", state.label().to_uppercase()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}
