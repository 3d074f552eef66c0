use color_eyre::Result;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear};

use crate::core::info::{InfoDialogState, InfoTopic};
use crate::tui::{Action, Component, Theme};

/// Modal explaining one form field.
///
/// Overlays the form; showing another topic while open swaps title and body.
#[derive(Debug, Clone, Default)]
pub struct InfoDialog {
    state: InfoDialogState,
    scroll: u16,
}

const SUPPORTED: &[Action] = &[
    Action::Confirm,
    Action::Cancel,
    Action::ShowInfo,
    Action::MoveUp,
    Action::MoveDown,
];

impl InfoDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, topic: InfoTopic) {
        self.state.open(topic);
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn topic(&self) -> Option<InfoTopic> {
        self.state.current()
    }

    fn modal_area(&self, area: Rect, body: &str) -> Rect {
        let max_width = area.width.clamp(20, 72);
        let wrap_width = max_width.saturating_sub(4) as usize;
        let content_lines = textwrap::wrap(body, wrap_width).len() as u16;
        let height = content_lines
            .saturating_add(4) // borders + padding + hint
            .clamp(5, area.height.saturating_sub(2).max(5));
        let width = max_width;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect { x, y, width, height: height.min(area.height) }
    }
}

impl Component for InfoDialog {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        if !self.is_open() {
            return Ok(false);
        }
        match action {
            Action::Confirm | Action::Cancel | Action::ShowInfo => self.state.close(),
            Action::MoveUp => self.scroll = self.scroll.saturating_sub(1),
            Action::MoveDown => self.scroll = self.scroll.saturating_add(1),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(topic) = self.state.current() else {
            return;
        };
        let modal = self.modal_area(area, topic.body());
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .title(topic.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme.focused_border_style());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let buf = frame.buffer_mut();
        let wrap_width = inner.width.saturating_sub(2) as usize;
        let wrapped = textwrap::wrap(topic.body(), wrap_width.max(1));
        let visible = inner.height.saturating_sub(1);
        let max_scroll = (wrapped.len() as u16).saturating_sub(visible);
        self.scroll = self.scroll.min(max_scroll);

        for (i, line) in wrapped.iter().skip(self.scroll as usize).enumerate() {
            if i as u16 >= visible {
                break;
            }
            buf.set_string(inner.x + 1, inner.y + i as u16, line, theme.normal_style());
        }

        let hint = "Enter/Esc to close";
        let hint_x = inner.x + inner.width.saturating_sub(hint.len() as u16 + 1);
        let hint_y = inner.y + inner.height.saturating_sub(1);
        buf.set_string(hint_x, hint_y, hint, theme.border_style());
    }

    fn supported_actions(&self) -> &[Action] {
        SUPPORTED
    }

    fn name(&self) -> &str {
        "InfoDialog"
    }
}
