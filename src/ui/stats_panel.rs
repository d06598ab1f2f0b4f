// Stats panel rendering module
//
// Renders the session statistics: totals, the rate, and the rankings of
// countries and attack types. When the feed has pushed a daily aggregate,
// its per-country counts replace the session's source-country ranking.

use super::fit_width;
use crate::app::config::TOP_GROUPS;
use crate::app::AppState;
use crate::feed::FeedCounters;
use crate::stats::{GroupCount, StatsSnapshot};
use crate::theme::{attack_type_color, BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE, TOXIC_GREEN};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

// ============================================================================
// Stats Panel View Model
// ============================================================================

/// One ranking section of the panel
#[derive(Debug, Clone, PartialEq)]
pub struct RankingView {
    pub title: &'static str,
    pub rows: Vec<GroupCount>,
    /// Largest count in the section, used to scale the bars
    pub max: u64,
    /// Color rows by attack type instead of a flat color
    pub colored_by_type: bool,
}

impl RankingView {
    fn new(title: &'static str, groups: &[GroupCount], colored_by_type: bool) -> Self {
        let rows: Vec<GroupCount> = groups.iter().take(TOP_GROUPS).cloned().collect();
        let max = rows.iter().map(|g| g.count).max().unwrap_or(0);
        Self {
            title,
            rows,
            max,
            colored_by_type,
        }
    }
}

/// Everything the stats panel shows, extracted from AppState
#[derive(Debug, Clone, PartialEq)]
pub struct StatsPanelView {
    pub session_total: usize,
    pub events_per_minute: f64,
    pub today_total: Option<u64>,
    pub rankings: Vec<RankingView>,
    pub messages: u64,
    pub accepted: u64,
    /// Candidate events dropped by validation plus undecodable messages
    pub dropped: u64,
    /// Well-formed messages of an unknown shape
    pub ignored: u64,
    /// Seconds since the last message, if one arrived
    pub quiet_secs: Option<i64>,
}

impl StatsPanelView {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let country_title = if snapshot.today.is_some() {
            "Today by country"
        } else {
            "Top sources"
        };
        Self {
            session_total: snapshot.total,
            events_per_minute: snapshot.events_per_minute,
            today_total: snapshot.today.as_ref().map(|t| t.total),
            rankings: vec![
                RankingView::new(country_title, &snapshot.country_ranking(), false),
                RankingView::new("Top targets", &snapshot.top_destination_countries, false),
                RankingView::new("Attack types", &snapshot.attack_types, true),
            ],
            messages: 0,
            accepted: 0,
            dropped: 0,
            ignored: 0,
            quiet_secs: None,
        }
    }

    /// Add feed health: dropped input and time since the last message
    pub fn with_feed_health(
        mut self,
        counters: &FeedCounters,
        last_message_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        self.messages = counters.messages;
        self.accepted = counters.accepted;
        self.dropped = counters.rejected + counters.decode_errors;
        self.ignored = counters.ignored;
        self.quiet_secs = last_message_at.map(|at| (now - at).num_seconds().max(0));
        self
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Width of the count bars, in cells
const BAR_WIDTH: usize = 10;

pub fn render_stats_panel(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    stats: &StatsSnapshot,
    now: DateTime<Utc>,
) {
    let view = StatsPanelView::from_snapshot(stats).with_feed_health(
        app.feed.counters(),
        app.feed.last_message_at(),
        now,
    );
    let inner_width = area.width.saturating_sub(2) as usize;
    // label | count | bar
    let label_width = inner_width.saturating_sub(BAR_WIDTH + 9).max(6);

    let mut lines = vec![Line::from(vec![
        Span::styled(" Session ", Style::default().fg(BONE_WHITE)),
        Span::styled(
            view.session_total.to_string(),
            Style::default().fg(TOXIC_GREEN).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {:.1}/min", view.events_per_minute),
            Style::default().fg(PUMPKIN_ORANGE),
        ),
    ])];
    if let Some(total) = view.today_total {
        lines.push(Line::from(vec![
            Span::styled(" Today   ", Style::default().fg(BONE_WHITE)),
            Span::styled(
                total.to_string(),
                Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    let quiet = match view.quiet_secs {
        Some(secs) => format!("last msg {}s ago", secs),
        None => "no messages yet".to_string(),
    };
    lines.push(Line::from(Span::styled(
        format!(" {}", quiet),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(vec![
        Span::styled(
            format!(" msgs {}  ok {}", view.messages, view.accepted),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("  dropped {}", view.dropped),
            Style::default().fg(if view.dropped > 0 { PUMPKIN_ORANGE } else { Color::DarkGray }),
        ),
        Span::styled(
            format!("  ignored {}", view.ignored),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    for ranking in &view.rankings {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(" {}", ranking.title),
            Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
        )));
        if ranking.rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (none yet)",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
            continue;
        }
        for row in &ranking.rows {
            let color = if ranking.colored_by_type {
                attack_type_color(&row.label)
            } else {
                BONE_WHITE
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", fit_width(&row.label, label_width)),
                    Style::default().fg(color),
                ),
                Span::styled(format!("{:>5} ", row.count), Style::default().fg(TOXIC_GREEN)),
                Span::styled(bar(row.count, ranking.max, BAR_WIDTH), Style::default().fg(color)),
            ]));
        }
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                " Statistics ",
                Style::default().fg(PUMPKIN_ORANGE).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(NEON_PURPLE)),
    );

    f.render_widget(panel, area);
}

/// Horizontal bar proportional to count / max
fn bar(count: u64, max: u64, width: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{CountryCount, TodayStats};

    fn group(label: &str, count: u64) -> GroupCount {
        GroupCount {
            label: label.to_string(),
            count,
        }
    }

    fn snapshot() -> StatsSnapshot {
        StatsSnapshot {
            total: 3,
            events_per_minute: 1.5,
            top_source_countries: vec![group("A", 2), group("C", 1)],
            top_destination_countries: vec![group("B", 3)],
            attack_types: vec![group("ddos", 3)],
            today: None,
        }
    }

    #[test]
    fn test_view_without_overlay() {
        let view = StatsPanelView::from_snapshot(&snapshot());
        assert_eq!(view.session_total, 3);
        assert_eq!(view.today_total, None);
        assert_eq!(view.rankings[0].title, "Top sources");
        assert_eq!(view.rankings[0].rows, vec![group("A", 2), group("C", 1)]);
        assert_eq!(view.rankings[0].max, 2);
    }

    #[test]
    fn test_view_with_overlay_replaces_countries() {
        let snapshot = snapshot().with_today(Some(TodayStats {
            total: 42,
            countries: vec![CountryCount {
                country: "A".to_string(),
                count: 42,
            }],
        }));
        let view = StatsPanelView::from_snapshot(&snapshot);
        assert_eq!(view.today_total, Some(42));
        assert_eq!(view.rankings[0].title, "Today by country");
        assert_eq!(view.rankings[0].rows, vec![group("A", 42)]);
        // Session total is untouched by the overlay
        assert_eq!(view.session_total, 3);
    }

    #[test]
    fn test_feed_health() {
        let counters = FeedCounters {
            messages: 5,
            accepted: 3,
            rejected: 2,
            decode_errors: 1,
            ignored: 0,
        };
        let now = Utc::now();
        let view = StatsPanelView::from_snapshot(&snapshot()).with_feed_health(
            &counters,
            Some(now - chrono::Duration::seconds(7)),
            now,
        );
        assert_eq!(view.messages, 5);
        assert_eq!(view.accepted, 3);
        assert_eq!(view.dropped, 3);
        assert_eq!(view.quiet_secs, Some(7));

        let view = StatsPanelView::from_snapshot(&snapshot()).with_feed_health(&counters, None, now);
        assert_eq!(view.quiet_secs, None);
    }

    #[test]
    fn test_rankings_are_capped() {
        let mut snap = snapshot();
        snap.attack_types = (0..20).map(|i| group(&format!("t{}", i), 20 - i)).collect();
        let view = StatsPanelView::from_snapshot(&snap);
        assert_eq!(view.rankings[2].rows.len(), TOP_GROUPS);
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10, 10, 10).chars().count(), 10);
        assert_eq!(bar(5, 10, 10).chars().count(), 5);
        // Non-zero counts always get at least one cell
        assert_eq!(bar(1, 1000, 10).chars().count(), 1);
        assert_eq!(bar(0, 0, 10), "");
        // Zero entries from a daily aggregate draw nothing
        assert_eq!(bar(0, 42, 10), "");
    }
}
