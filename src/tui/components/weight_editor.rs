use arboard::Clipboard;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};
use tracing::debug;
use tui_textarea::{Input, TextArea};

use crate::tui::{Action, Component, Theme};

pub const WEIGHTS_PLACEHOLDER: &str = "[1, 0.8. 0.6, 0.4, 0.2]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightEditorOutcome {
    Committed(String),
    Cancelled,
}

const SUPPORTED: &[Action] = &[Action::Confirm, Action::Cancel];

/// Free-text editor for the facility weight list. The text is kept verbatim.
#[derive(Debug)]
pub struct WeightEditor {
    textarea: TextArea<'static>,
    outcome: Option<WeightEditorOutcome>,
}

impl WeightEditor {
    pub fn new(initial: &str) -> Self {
        let mut textarea = TextArea::from(initial.lines().map(str::to_string).collect::<Vec<_>>());
        textarea.set_placeholder_text(WEIGHTS_PLACEHOLDER);
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        Self {
            textarea,
            outcome: None,
        }
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn take_outcome(&mut self) -> Option<WeightEditorOutcome> {
        self.outcome.take()
    }

    fn paste(&mut self) {
        match Clipboard::new().and_then(|mut c| c.get_text()) {
            Ok(text) => {
                // Single line field
                let flat = text.lines().collect::<Vec<_>>().join(" ");
                self.textarea.insert_str(flat);
            }
            Err(e) => debug!("Clipboard unavailable: {}", e),
        }
    }
}

impl Component for WeightEditor {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Confirm => self.outcome = Some(WeightEditorOutcome::Committed(self.text())),
            Action::Cancel => self.outcome = Some(WeightEditorOutcome::Cancelled),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Every key is consumed while editing
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Enter => {
                self.handle_action(Action::Confirm)?;
            }
            KeyCode::Esc => {
                self.handle_action(Action::Cancel)?;
            }
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => self.paste(),
            _ => {
                let input: Input = key.into();
                self.textarea.input(input);
            }
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Clear, area);
        self.textarea.set_block(
            Block::default()
                .title("Relative weight for the nth facility of the same category")
                .title_bottom("Enter: save  Esc: cancel  Ctrl+V: paste")
                .borders(Borders::ALL)
                .border_style(theme.focused_border_style()),
        );
        self.textarea.set_style(theme.normal_style());
        self.textarea.set_placeholder_style(theme.value_style(false));
        frame.render_widget(&self.textarea, area);
    }

    fn supported_actions(&self) -> &[Action] {
        SUPPORTED
    }

    fn name(&self) -> &str {
        "WeightEditor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_then_commit() {
        let mut editor = WeightEditor::new("");
        for ch in "1, 0.5".chars() {
            editor.handle_key(key(KeyCode::Char(ch))).unwrap();
        }
        editor.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            editor.take_outcome(),
            Some(WeightEditorOutcome::Committed("1, 0.5".to_string()))
        );
    }

    #[test]
    fn test_escape_discards() {
        let mut editor = WeightEditor::new("1, 1");
        editor.handle_key(key(KeyCode::Backspace)).unwrap();
        editor.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(editor.take_outcome(), Some(WeightEditorOutcome::Cancelled));
    }

    #[test]
    fn test_starts_with_existing_text() {
        let editor = WeightEditor::new("\"Hospitals\": 1, 0.5");
        assert_eq!(editor.text(), "\"Hospitals\": 1, 0.5");
    }
}
