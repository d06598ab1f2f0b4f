// Attack map rendering module
//
// Draws the projected world graticule and every live animated attack on a
// braille canvas. The canvas area is measured in braille dots (2x4 per
// cell) and reported to the app, which keeps the animation viewport in
// sync with it.

use crate::app::AppState;
use crate::app::config::ProjectionConfig;
use crate::feed::ConnectionState;
use crate::geo::{project, PlotPoint, Viewport};
use crate::theme::{
    attack_type_color, connection_state_color, faded_attack_color, BONE_WHITE, DEEP_SEA,
    NEON_PURPLE,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, BorderType, Borders,
    },
    Frame,
};
use std::time::Instant;

/// Spacing of meridians and parallels, in degrees
const GRATICULE_STEP: i32 = 30;

/// Sampling step along each graticule line, in degrees
const SAMPLE_STEP: i32 = 5;

/// Braille dots per terminal cell
const DOTS_PER_CELL: (f64, f64) = (2.0, 4.0);

/// One straight segment of the base map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSegment {
    pub from: PlotPoint,
    pub to: PlotPoint,
}

/// Projected graticule: meridians, parallels and the outline of the globe
pub fn graticule(viewport: Viewport, projection: &ProjectionConfig) -> Vec<MapSegment> {
    let mut segments = Vec::new();

    // Meridians, including the ±180 outline
    for lon in (-180..=180).step_by(GRATICULE_STEP as usize) {
        let points = (-90..=90)
            .step_by(SAMPLE_STEP as usize)
            .filter_map(|lat| project(lon as f64, lat as f64, viewport, projection));
        push_polyline(&mut segments, points);
    }

    // Parallels (the poles are single points in Equal Earth's outline)
    for lat in (-90 + GRATICULE_STEP..90).step_by(GRATICULE_STEP as usize) {
        let points = (-180..=180)
            .step_by(SAMPLE_STEP as usize)
            .filter_map(|lon| project(lon as f64, lat as f64, viewport, projection));
        push_polyline(&mut segments, points);
    }

    // Pole lines close the outline
    for lat in [-90, 90] {
        let west = project(-180.0, lat as f64, viewport, projection);
        let east = project(180.0, lat as f64, viewport, projection);
        if let (Some(from), Some(to)) = (west, east) {
            segments.push(MapSegment { from, to });
        }
    }

    segments
}

fn push_polyline(segments: &mut Vec<MapSegment>, points: impl Iterator<Item = PlotPoint>) {
    let mut previous: Option<PlotPoint> = None;
    for point in points {
        if let Some(from) = previous {
            segments.push(MapSegment { from, to: point });
        }
        previous = Some(point);
    }
}

/// Plot coordinates grow downwards; the canvas grows upwards
fn to_canvas(point: PlotPoint, viewport: Viewport) -> (f64, f64) {
    (point.x, viewport.height - point.y)
}

/// Drawable state of one attack, detached from the app for the paint closure
struct AttackSprite {
    attack_type: String,
    src_label: String,
    dst_label: String,
    start: (f64, f64),
    head: (f64, f64),
    end: (f64, f64),
    opacity: f64,
    source_radius: f64,
    destination_radius: f64,
}

pub fn render_attack_map(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = Block::default()
        .title(" Attack Map ")
        .title_style(Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(NEON_PURPLE));
    let inner = block.inner(area);

    app.observe_map_area(
        inner.width as f64 * DOTS_PER_CELL.0,
        inner.height as f64 * DOTS_PER_CELL.1,
    );

    let viewport = app.map.scheduler.viewport();
    let base_map = graticule(viewport, app.map.scheduler.projection());
    let now = Instant::now();
    let sprites: Vec<AttackSprite> = app
        .map
        .scheduler
        .frames(now)
        .map(|(element, frame)| AttackSprite {
            attack_type: element.attack_type.clone(),
            src_label: element.src_label.clone(),
            dst_label: element.dst_label.clone(),
            start: to_canvas(frame.start, viewport),
            head: to_canvas(frame.head, viewport),
            end: to_canvas(frame.end, viewport),
            opacity: frame.opacity,
            source_radius: frame.source_radius,
            destination_radius: frame.destination_radius,
        })
        .collect();

    let labels_enabled = app.map.settings.labels_enabled;
    let animations_enabled = app.map.settings.animations_enabled;
    let state = app.feed.state();
    let idle_message = idle_message(state, animations_enabled, sprites.is_empty());

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(move |ctx| {
            for segment in &base_map {
                let (x1, y1) = to_canvas(segment.from, viewport);
                let (x2, y2) = to_canvas(segment.to, viewport);
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: DEEP_SEA,
                });
            }
            ctx.layer();

            for sprite in &sprites {
                let line_color = faded_attack_color(&sprite.attack_type, sprite.opacity);
                ctx.draw(&CanvasLine {
                    x1: sprite.start.0,
                    y1: sprite.start.1,
                    x2: sprite.head.0,
                    y2: sprite.head.1,
                    color: line_color,
                });

                let marker_color = attack_type_color(&sprite.attack_type);
                if sprite.source_radius > 0.0 {
                    ctx.draw(&Circle {
                        x: sprite.start.0,
                        y: sprite.start.1,
                        radius: sprite.source_radius,
                        color: marker_color,
                    });
                }
                if sprite.destination_radius > 0.0 {
                    ctx.draw(&Circle {
                        x: sprite.end.0,
                        y: sprite.end.1,
                        radius: sprite.destination_radius,
                        color: marker_color,
                    });
                }
            }

            if labels_enabled {
                for sprite in &sprites {
                    let style = Style::default().fg(faded_attack_color(&sprite.attack_type, sprite.opacity));
                    if sprite.source_radius > 0.0 {
                        ctx.print(sprite.start.0, sprite.start.1, Span::styled(sprite.src_label.clone(), style));
                    }
                    if sprite.destination_radius > 0.0 {
                        ctx.print(sprite.end.0, sprite.end.1, Span::styled(sprite.dst_label.clone(), style));
                    }
                }
            }

            if let Some((message, color)) = idle_message {
                let offset = message.chars().count() as f64 * DOTS_PER_CELL.0 / 2.0;
                ctx.print(
                    viewport.width / 2.0 - offset,
                    DOTS_PER_CELL.1 * 2.0,
                    Span::styled(message, Style::default().fg(color).add_modifier(Modifier::ITALIC)),
                );
            }
        });

    f.render_widget(canvas, area);
}

/// Message shown at the bottom of an empty map
fn idle_message(
    state: ConnectionState,
    animations_enabled: bool,
    nothing_drawn: bool,
) -> Option<(&'static str, ratatui::style::Color)> {
    if !animations_enabled {
        return Some(("animations paused (press a)", BONE_WHITE));
    }
    if !nothing_drawn {
        return None;
    }
    let message = match state {
        ConnectionState::Connected => "waiting for attacks...",
        ConnectionState::Connecting => "connecting to feed...",
        ConnectionState::Disconnected => "feed lost, reconnecting...",
        ConnectionState::Exhausted => "feed offline (press r to retry)",
        ConnectionState::Idle => "feed closed",
    };
    Some((message, connection_state_color(state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{live_app, ONE_ATTACK};
    use crate::feed::connection::TransportEvent;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn viewport() -> Viewport {
        Viewport::new(240.0, 160.0)
    }

    #[test]
    fn test_graticule_stays_inside_viewport() {
        let segments = graticule(viewport(), &ProjectionConfig::default());
        assert!(!segments.is_empty());
        for segment in segments {
            for p in [segment.from, segment.to] {
                assert!(p.x >= 0.0 && p.x <= 240.0, "x out of range: {:?}", p);
                assert!(p.y >= 0.0 && p.y <= 160.0, "y out of range: {:?}", p);
            }
        }
    }

    #[test]
    fn test_graticule_unmeasurable_viewport() {
        let segments = graticule(Viewport::new(0.0, 0.0), &ProjectionConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn test_to_canvas_flips_y() {
        let (x, y) = to_canvas(PlotPoint { x: 10.0, y: 20.0 }, viewport());
        assert_eq!((x, y), (10.0, 140.0));
    }

    #[test]
    fn test_idle_messages() {
        assert!(idle_message(ConnectionState::Connected, true, false).is_none());
        assert_eq!(
            idle_message(ConnectionState::Exhausted, true, true).map(|(m, _)| m),
            Some("feed offline (press r to retry)")
        );
        assert!(idle_message(ConnectionState::Connected, false, false).is_some());
    }

    #[test]
    fn test_render_measures_viewport() {
        let (mut app, connector) = live_app();
        app.on_transport_event(
            connector.last_session.get(),
            TransportEvent::Text(ONE_ATTACK.to_string()),
            Instant::now(),
            Utc::now(),
        );

        let mut terminal = Terminal::new(TestBackend::new(62, 22)).unwrap();
        terminal
            .draw(|f| render_attack_map(f, f.area(), &mut app))
            .unwrap();

        // 60x20 cells inside the border
        assert_eq!(app.map.scheduler.viewport(), Viewport::new(120.0, 80.0));
        assert_eq!(app.map.scheduler.active().len(), 1);
    }
}
