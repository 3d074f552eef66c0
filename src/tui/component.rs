use crate::tui::action::Action;
use crate::tui::theme::Theme;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Base trait for all TUI components
///
/// Form rows, popups and dialogs implement this so the app can route
/// actions and draw them the same way.
pub trait Component {
    /// Handle an action
    ///
    /// Returns Ok(true) if the action was handled and consumed.
    /// Returns Ok(false) if the action was not handled and should propagate.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Raw key input, offered before keybindings are consulted.
    ///
    /// Text-entry components consume printable keys here. Default: not handled.
    fn handle_key(&mut self, _key: KeyEvent) -> Result<bool> {
        Ok(false)
    }

    /// Render the component within the given area
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Get list of actions this component supports
    ///
    /// Used for the key hint line and the help screen.
    fn supported_actions(&self) -> &[Action];

    /// Get component name for debugging/logging
    fn name(&self) -> &str;

    /// Update component state (called on every tick)
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Components that can receive keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}
