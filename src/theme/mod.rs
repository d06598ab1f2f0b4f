// Theme module - Color palette and color helpers
//
// This module provides the color palette for the attack map, plus the
// functions that pick colors for connection states, attack types,
// fading animations and the frame interval indicator.

use crate::feed::ConnectionState;
use ratatui::style::Color;

/// Primary accent color - used for borders, titles
/// RGB: (187, 154, 247)
pub const NEON_PURPLE: Color = Color::Rgb(187, 154, 247);

/// Warning indicator - used for connecting/disconnected states
/// RGB: (255, 158, 100)
pub const PUMPKIN_ORANGE: Color = Color::Rgb(255, 158, 100);

/// Danger indicator - used for errors and the offline state
/// RGB: (247, 118, 142)
pub const BLOOD_RED: Color = Color::Rgb(247, 118, 142);

/// Healthy indicator - used for the live state
/// RGB: (158, 206, 106)
pub const TOXIC_GREEN: Color = Color::Rgb(158, 206, 106);

/// Neutral text
/// RGB: (169, 177, 214)
pub const BONE_WHITE: Color = Color::Rgb(169, 177, 214);

/// Graticule and coastline of the base map
/// RGB: (65, 72, 104)
pub const DEEP_SEA: Color = Color::Rgb(65, 72, 104);

/// Background the animations fade into
pub const MAP_BACKGROUND: (u8, u8, u8) = (26, 27, 38);

/// Colors cycled through for attack types without a fixed color
const TYPE_PALETTE: [(u8, u8, u8); 6] = [
    (125, 207, 255),
    (224, 175, 104),
    (187, 154, 247),
    (115, 218, 202),
    (255, 117, 127),
    (192, 202, 245),
];

/// Color of an attack type label
///
/// A few well-known types have fixed colors; anything else gets a stable
/// color derived from the label text.
pub fn attack_type_rgb(attack_type: &str) -> (u8, u8, u8) {
    match attack_type.to_ascii_lowercase().as_str() {
        "ddos" | "dos" => (247, 118, 142),
        "malware" | "ransomware" => (255, 158, 100),
        "phishing" => (224, 175, 104),
        "scan" | "portscan" | "recon" => (125, 207, 255),
        "bruteforce" | "brute-force" => (187, 154, 247),
        other => {
            let hash = other
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            TYPE_PALETTE[hash % TYPE_PALETTE.len()]
        }
    }
}

pub fn attack_type_color(attack_type: &str) -> Color {
    let (r, g, b) = attack_type_rgb(attack_type);
    Color::Rgb(r, g, b)
}

/// Color of an attack type faded towards the map background
///
/// # Arguments
/// * `attack_type` - Attack type label
/// * `opacity` - 1.0 = full color, 0.0 = background
pub fn faded_attack_color(attack_type: &str, opacity: f64) -> Color {
    interpolate_color(
        MAP_BACKGROUND,
        attack_type_rgb(attack_type),
        opacity as f32,
    )
}

/// Indicator color for a connection state
pub fn connection_state_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => TOXIC_GREEN,
        ConnectionState::Connecting | ConnectionState::Disconnected => PUMPKIN_ORANGE,
        ConnectionState::Exhausted => BLOOD_RED,
        ConnectionState::Idle => BONE_WHITE,
    }
}

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
///
/// # Arguments
/// * `color1` - Starting color as (r, g, b) tuple
/// * `color2` - Ending color as (r, g, b) tuple
/// * `ratio` - Interpolation ratio (0.0 = color1, 1.0 = color2)
///
/// # Returns
/// Interpolated Color::Rgb value
pub fn interpolate_color(color1: (u8, u8, u8), color2: (u8, u8, u8), ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Get color for the frame interval relative to its default
///
/// Green at or above the default interval, orange when faster, red when
/// more than twice as fast. A recent change brightens the color.
pub fn refresh_color(interval_ms: u64, default_ms: u64, recently_changed: bool) -> Color {
    let base = if interval_ms >= default_ms {
        TOXIC_GREEN
    } else if interval_ms * 2 < default_ms {
        BLOOD_RED
    } else {
        PUMPKIN_ORANGE
    };

    match base {
        Color::Rgb(r, g, b) if recently_changed => Color::Rgb(
            (r as f32 * 1.2).min(255.0) as u8,
            (g as f32 * 1.2).min(255.0) as u8,
            (b as f32 * 1.2).min(255.0) as u8,
        ),
        _ => base,
    }
}
