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
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Stop the engine and quit
/// - `a`, `A` - Toggle animations (off clears every token)
/// - `l`, `L` - Toggle node labels
/// - `d`, `D` - Toggle distance labels
/// - `g`, `G` - Toggle glow
/// - `r`, `R` - Reset the animation overlay
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.quit();
            false
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            let enabled = !app.frame_loop.settings().animations_enabled;
            app.frame_loop.set_animations_enabled(enabled);
            true
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            let settings = app.frame_loop.settings_mut();
            settings.labels_enabled = !settings.labels_enabled;
            true
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            let settings = app.frame_loop.settings_mut();
            settings.distance_labels_enabled = !settings.distance_labels_enabled;
            true
        }
        KeyCode::Char('g') | KeyCode::Char('G') => {
            let settings = app.frame_loop.settings_mut();
            settings.glow_enabled = !settings.glow_enabled;
            // A manual choice overrides the slow-frame fallback
            app.reset_glow_reduction();
            true
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.frame_loop.reset_overlay();
            true
        }
        _ => true,
    }
}
