// Status Bar rendering module
//
// Renders the bottom status bar with the connection state, the last
// error, keyboard shortcuts and toggle indicators.

use super::fit_width;
use crate::app::config::DEFAULT_REFRESH_MS;
use crate::app::{AppState, CHANGE_HIGHLIGHT_DURATION};
use crate::feed::ConnectionState;
use crate::theme::{
    connection_state_color, refresh_color, BLOOD_RED, BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE,
    TOXIC_GREEN,
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Connection summary, e.g. "Connecting (attempt 3/10)"
pub fn connection_summary(state: ConnectionState, retry_count: u32, max_retries: u32) -> String {
    match state {
        ConnectionState::Connecting if retry_count > 0 => {
            format!("{} (attempt {}/{})", state.label(), retry_count, max_retries)
        }
        ConnectionState::Disconnected if retry_count < max_retries => {
            format!("{} (retry {}/{} pending)", state.label(), retry_count + 1, max_retries)
        }
        _ => state.label().to_string(),
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let available_width = area.width.saturating_sub(2) as usize;
    let state = app.feed.state();

    let summary = connection_summary(state, app.feed.retry_count(), app.feed.max_retries());
    let mut spans = vec![
        Span::styled(
            format!(" ● {} ", summary),
            Style::default()
                .fg(connection_state_color(state))
                .add_modifier(Modifier::BOLD),
        ),
    ];
    let mut current_length = summary.chars().count() + 4;

    // Hints, dropped from the right when the bar gets narrow
    let hints: [(&str, &str); 5] = [
        ("Q:", "Quit "),
        ("R:", "Reconnect "),
        ("A:", "Anim "),
        ("T:", "Labels "),
        ("+/-:", "Speed "),
    ];
    let toggles = build_toggle_indicators(app);
    let toggles_length: usize = toggles.iter().map(|s| s.content.chars().count()).sum();

    let mut hint_spans = Vec::new();
    for (key, desc) in hints {
        let hint_length = key.len() + desc.len();
        if current_length + hint_length + toggles_length > available_width {
            break;
        }
        hint_spans.push(Span::styled(
            key,
            Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
        ));
        hint_spans.push(Span::raw(desc));
        current_length += hint_length;
    }
    spans.extend(hint_spans);
    spans.extend(toggles);
    current_length += toggles_length;

    let counters = app.feed.counters();
    if counters.rejected + counters.decode_errors > 0 {
        let dropped = format!(" rej:{} dec:{}", counters.rejected, counters.decode_errors);
        if current_length + dropped.len() <= available_width {
            current_length += dropped.len();
            spans.push(Span::styled(dropped, Style::default().fg(PUMPKIN_ORANGE)));
        }
    }

    // Last error fills whatever space is left
    if let Some(error) = app.feed.last_error() {
        let room = available_width.saturating_sub(current_length + 3);
        if room > 8 {
            spans.push(Span::styled(" ⚠ ", Style::default().fg(BLOOD_RED)));
            spans.push(Span::styled(
                fit_width(error, room).trim_end().to_string(),
                Style::default().fg(BLOOD_RED),
            ));
        }
    }

    let status_bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

/// Build toggle status indicator spans for the status bar
/// Shows [A:ON/OFF] [T:ON/OFF] [Nms] with appropriate colors
/// Toxic Green for ON, Bone White for OFF
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let settings = &app.map.settings;

    for (key, enabled) in [("[A:", settings.animations_enabled), ("[T:", settings.labels_enabled)] {
        let (text, color) = if enabled {
            ("ON", TOXIC_GREEN)
        } else {
            ("OFF", BONE_WHITE)
        };
        spans.push(Span::styled(key, Style::default().fg(BONE_WHITE)));
        spans.push(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled("] ", Style::default().fg(BONE_WHITE)));
    }

    // Frame interval [33ms], highlighted right after a change
    let recently_changed = app
        .refresh_config
        .last_change
        .is_some_and(|at| at.elapsed() < CHANGE_HIGHLIGHT_DURATION);
    spans.push(Span::styled("[", Style::default().fg(BONE_WHITE)));
    spans.push(Span::styled(
        format!("{}ms", app.refresh_config.refresh_ms),
        Style::default()
            .fg(refresh_color(
                app.refresh_config.refresh_ms,
                DEFAULT_REFRESH_MS,
                recently_changed,
            ))
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("]", Style::default().fg(BONE_WHITE)));

    spans
}
