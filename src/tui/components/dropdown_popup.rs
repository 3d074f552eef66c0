use color_eyre::Result;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};

use crate::core::dropdown::{Dropdown, MultiSelect};
use crate::core::types::{Side, SlotRole};
use crate::tui::{Action, Component, Theme};

/// Which control the popup edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupTarget {
    Slot(Side, SlotRole),
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupOutcome {
    Chosen(PopupTarget, usize),
    Toggled(PopupTarget, usize),
    Closed,
}

const SUPPORTED: &[Action] = &[
    Action::MoveUp,
    Action::MoveDown,
    Action::PageUp,
    Action::PageDown,
    Action::Home,
    Action::End,
    Action::ToggleSelection,
    Action::Confirm,
    Action::Cancel,
];

/// Option list opened from a dropdown row.
///
/// Single-select popups close on Enter with the highlighted option; the
/// category popup toggles with Space and stays open until Enter or Esc.
#[derive(Debug, Clone)]
pub struct DropdownPopup {
    title: String,
    target: PopupTarget,
    labels: Vec<String>,
    chosen: Option<Vec<bool>>,
    cursor: usize,
    scroll_offset: usize,
    page_size: usize,
    outcome: Option<PopupOutcome>,
}

impl DropdownPopup {
    pub fn single(title: impl Into<String>, target: PopupTarget, dropdown: &Dropdown) -> Self {
        Self {
            title: title.into(),
            target,
            labels: dropdown.options().iter().map(|o| o.label.clone()).collect(),
            chosen: None,
            cursor: dropdown.selected_index().unwrap_or(0),
            scroll_offset: 0,
            page_size: 8,
            outcome: None,
        }
    }

    pub fn multi(title: impl Into<String>, multi: &MultiSelect) -> Self {
        Self {
            title: title.into(),
            target: PopupTarget::Categories,
            labels: multi.options().to_vec(),
            chosen: Some((0..multi.len()).map(|i| multi.is_chosen(i)).collect()),
            cursor: 0,
            scroll_offset: 0,
            page_size: 8,
            outcome: None,
        }
    }

    pub fn target(&self) -> PopupTarget {
        self.target
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn take_outcome(&mut self) -> Option<PopupOutcome> {
        self.outcome.take()
    }

    /// Rows needed to show every option, plus borders
    pub fn preferred_height(&self) -> u16 {
        (self.labels.len() as u16).saturating_add(2).max(3)
    }

    fn move_by(&mut self, delta: isize) {
        if self.labels.is_empty() {
            return;
        }
        let last = self.labels.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }
}

impl Component for DropdownPopup {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveUp => self.move_by(-1),
            Action::MoveDown => self.move_by(1),
            Action::PageUp => self.move_by(-(self.page_size as isize)),
            Action::PageDown => self.move_by(self.page_size as isize),
            Action::Home => self.cursor = 0,
            Action::End => self.cursor = self.labels.len().saturating_sub(1),
            Action::ToggleSelection => match self.chosen.as_mut() {
                Some(chosen) => {
                    if let Some(flag) = chosen.get_mut(self.cursor) {
                        *flag = !*flag;
                        self.outcome = Some(PopupOutcome::Toggled(self.target, self.cursor));
                    }
                }
                None => return Ok(false),
            },
            Action::Confirm => {
                self.outcome = match self.chosen {
                    Some(_) => Some(PopupOutcome::Closed),
                    None if self.labels.is_empty() => Some(PopupOutcome::Closed),
                    None => Some(PopupOutcome::Chosen(self.target, self.cursor)),
                };
            }
            Action::Cancel => self.outcome = Some(PopupOutcome::Closed),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(theme.focused_border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visible = inner.height as usize;
        self.page_size = visible.max(1);
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if visible > 0 && self.cursor >= self.scroll_offset + visible {
            self.scroll_offset = self.cursor + 1 - visible;
        }

        let buf = frame.buffer_mut();
        if self.labels.is_empty() {
            buf.set_stringn(inner.x + 1, inner.y, "(no values)", inner.width as usize, theme.value_style(false));
            return;
        }
        for (row, (index, label)) in self
            .labels
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible)
            .enumerate()
        {
            let text = match &self.chosen {
                Some(chosen) => {
                    let mark = if chosen.get(index).copied().unwrap_or(false) { "[x]" } else { "[ ]" };
                    format!("{} {}", mark, label)
                }
                None => label.clone(),
            };
            let style = if index == self.cursor {
                theme.selected_style()
            } else {
                theme.normal_style()
            };
            buf.set_stringn(inner.x + 1, inner.y + row as u16, text, inner.width.saturating_sub(1) as usize, style);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        SUPPORTED
    }

    fn name(&self) -> &str {
        "DropdownPopup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_select_starts_on_current() {
        let mut dropdown = Dropdown::new();
        dropdown.populate(&["id", "lat", "lon"]);
        dropdown.select(1).unwrap();
        let target = PopupTarget::Slot(Side::Origin, SlotRole::Latitude);
        let mut popup = DropdownPopup::single("Latitude", target, &dropdown);
        assert_eq!(popup.cursor(), 1);
        popup.handle_action(Action::MoveDown).unwrap();
        popup.handle_action(Action::MoveDown).unwrap();
        popup.handle_action(Action::Confirm).unwrap();
        assert_eq!(popup.take_outcome(), Some(PopupOutcome::Chosen(target, 2)));
    }

    #[test]
    fn test_multi_select_toggles_without_closing() {
        let mut multi = MultiSelect::new();
        multi.populate(&["clinic", "school"]);
        let mut popup = DropdownPopup::multi("Categories", &multi);
        popup.handle_action(Action::MoveDown).unwrap();
        popup.handle_action(Action::ToggleSelection).unwrap();
        assert_eq!(
            popup.take_outcome(),
            Some(PopupOutcome::Toggled(PopupTarget::Categories, 1))
        );
        popup.handle_action(Action::Confirm).unwrap();
        assert_eq!(popup.take_outcome(), Some(PopupOutcome::Closed));
    }

    #[test]
    fn test_space_ignored_for_single_select() {
        let dropdown = Dropdown::new();
        let mut popup = DropdownPopup::single("x", PopupTarget::Categories, &dropdown);
        assert!(!popup.handle_action(Action::ToggleSelection).unwrap());
    }
}
