// Keyboard event handling
//
// This module contains the keyboard event handler that processes
// user input and updates the application state accordingly.

use super::AppState;
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Arguments
/// * `app` - Mutable reference to the application state
/// * `key` - The key code that was pressed
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `r`, `R` - Reconnect the feed (resets the retry budget)
/// - `a`, `A` - Toggle animations
/// - `t`, `T` - Toggle marker labels
/// - `+`, `=` - Faster frame rate
/// - `-`, `_` - Slower frame rate
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        // Quit on 'q', 'Q', or Esc
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.shutdown();
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.reconnect();
            true
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.map.toggle_animations();
            true
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.map.toggle_labels();
            true
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.increase_refresh_rate();
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.decrease_refresh_rate();
            true
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{live_app, test_app};
    use crate::feed::ConnectionState;

    #[test]
    fn test_quit_keys() {
        for key in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            let (mut app, _) = live_app();
            assert!(app.running);
            assert!(!handle_key_event(&mut app, key));
            assert!(!app.running);
            assert_eq!(app.feed.state(), ConnectionState::Idle);
        }
    }

    #[test]
    fn test_reconnect_key() {
        let (mut app, connector) = live_app();
        let before = connector.last_session.get();
        assert!(handle_key_event(&mut app, KeyCode::Char('r')));
        assert_eq!(app.feed.state(), ConnectionState::Connecting);
        assert_ne!(connector.last_session.get(), before);
    }

    #[test]
    fn test_toggle_animations() {
        let (mut app, _) = test_app();

        // Default: animations enabled
        assert!(app.map.settings.animations_enabled);

        handle_key_event(&mut app, KeyCode::Char('a'));
        assert!(!app.map.settings.animations_enabled);

        handle_key_event(&mut app, KeyCode::Char('A'));
        assert!(app.map.settings.animations_enabled);
    }

    #[test]
    fn test_toggle_labels() {
        let (mut app, _) = test_app();

        // Default: labels enabled
        assert!(app.map.settings.labels_enabled);

        handle_key_event(&mut app, KeyCode::Char('t'));
        assert!(!app.map.settings.labels_enabled);

        handle_key_event(&mut app, KeyCode::Char('T'));
        assert!(app.map.settings.labels_enabled);
    }

    #[test]
    fn test_refresh_rate_controls() {
        let (mut app, _) = test_app();
        let initial = app.refresh_config.refresh_ms;

        // Faster (shorter interval)
        handle_key_event(&mut app, KeyCode::Char('+'));
        assert!(app.refresh_config.refresh_ms < initial);
        assert!(app.refresh_config.last_change.is_some());

        // Back again
        handle_key_event(&mut app, KeyCode::Char('-'));
        assert_eq!(app.refresh_config.refresh_ms, initial);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let (mut app, _) = test_app();
        assert!(handle_key_event(&mut app, KeyCode::Char('x')));
        assert!(handle_key_event(&mut app, KeyCode::Tab));
        assert!(app.running);
    }
}
