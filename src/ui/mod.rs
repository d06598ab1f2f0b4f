// UI rendering module
//
// This module contains all UI rendering components for attackmap.
// The main draw() function orchestrates rendering of all UI panels.

mod attack_map;
mod banner;
mod live_feed;
mod stats_panel;
mod status_bar;

use crate::app::AppState;
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use attack_map::render_attack_map;
use banner::render_banner;
use live_feed::render_live_feed;
use stats_panel::render_stats_panel;
use status_bar::render_status_bar;

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let size = f.area();
    // One snapshot per frame, shared by the banner and the stats panel
    let now = Utc::now();
    let stats = app.stats(now);

    // Main layout: banner, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Banner
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_banner(f, chunks[0], app, &stats);

    // Body: attack map + right panels
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(68), // Attack map
            Constraint::Percentage(32), // Right panels
        ])
        .split(chunks[1]);

    render_attack_map(f, body_chunks[0], app);

    // Right side: statistics + live feed
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body_chunks[1]);

    render_stats_panel(f, right_chunks[0], app, &stats, now);
    render_live_feed(f, right_chunks[1], app);

    render_status_bar(f, chunks[2], app);
}

/// Pad or truncate `text` to exactly `width` terminal cells
///
/// Truncated text ends with an ellipsis. Wide characters are measured
/// with their display width, not their byte or char count.
pub(crate) fn fit_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
