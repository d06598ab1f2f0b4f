// Live feed rendering module
//
// Renders the most recent buffered attacks, newest first.

use super::fit_width;
use crate::app::config::LIVE_FEED_ROWS;
use crate::app::AppState;
use crate::feed::AttackEvent;
use crate::stats::UNKNOWN_GROUP;
use crate::theme::{attack_type_color, BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE};
use chrono::DateTime;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

/// Width reserved for the attack type column
const TYPE_WIDTH: usize = 10;

/// Event time as HH:MM:SS, or the raw text when it is not RFC 3339
fn format_time(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(time) => time.format("%H:%M:%S").to_string(),
            Err(_) => fit_width(raw, 8),
        },
        None => "--:--:--".to_string(),
    }
}

/// "src → dst" route text built from the place names
fn route(event: &AttackEvent) -> String {
    format!("{} → {}", event.src.place(), event.dst.place())
}

pub fn render_live_feed(f: &mut Frame, area: Rect, app: &AppState) {
    let inner_width = area.width.saturating_sub(2) as usize;
    // time + type columns with their separators
    let route_width = inner_width.saturating_sub(8 + TYPE_WIDTH + 3);

    let items: Vec<ListItem> = app
        .feed
        .buffer()
        .recent(LIVE_FEED_ROWS)
        .map(|event| {
            let kind = event.attack_type.as_deref().unwrap_or(UNKNOWN_GROUP);
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", format_time(event.timestamp.as_deref())),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{} ", fit_width(kind, TYPE_WIDTH)),
                    Style::default().fg(attack_type_color(kind)),
                ),
                Span::styled(
                    fit_width(&route(event), route_width),
                    Style::default().fg(BONE_WHITE),
                ),
            ]))
        })
        .collect();

    let title = format!(" Live Feed ({}) ", app.feed.buffer().len());
    let list = List::new(items).block(
        Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(NEON_PURPLE)),
    );

    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::GeoPoint;

    fn point(country: &str) -> GeoPoint {
        GeoPoint {
            lon: 0.0,
            lat: 0.0,
            country: Some(country.to_string()),
            city: None,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Some("2024-05-01T12:34:56Z")), "12:34:56");
        assert_eq!(format_time(Some("2024-05-01T12:34:56+02:00")), "12:34:56");
        assert_eq!(format_time(None), "--:--:--");
        assert_eq!(format_time(Some("yesterday")), "yesterd…");
    }

    #[test]
    fn test_route_uses_places() {
        let mut event = AttackEvent {
            id: String::new(),
            timestamp: None,
            src_ip: Some("1.2.3.4".to_string()),
            dst_ip: None,
            src: point("A"),
            dst: point("B"),
            attack_type: None,
        };
        assert_eq!(route(&event), "A → B");
        event.src.city = Some("Alpha".to_string());
        event.dst.country = None;
        assert_eq!(route(&event), "Alpha, A → ?");
    }
}
