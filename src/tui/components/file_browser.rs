//! FileBrowser: popup for picking the origin or destination file
use color_eyre::Result;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::types::Side;
use crate::core::upload::UploadedFile;
use crate::tui::{Action, Component, Theme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBrowserAction {
    Selected(Side, PathBuf),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

const SUPPORTED: &[Action] = &[
    Action::MoveUp,
    Action::MoveDown,
    Action::PageUp,
    Action::PageDown,
    Action::Home,
    Action::End,
    Action::MoveLeft,
    Action::Confirm,
    Action::Cancel,
];

/// Directory listing with a ".." entry. Every file is listed; ones that
/// are not text are dimmed but can still be picked so the form can refuse them.
#[derive(Debug)]
pub struct FileBrowser {
    side: Side,
    current_dir: PathBuf,
    entries: Vec<BrowserEntry>,
    selected: usize,
    scroll_offset: usize,
    page_size: usize,
    error: Option<String>,
    outcome: Option<FileBrowserAction>,
}

impl FileBrowser {
    pub fn new(side: Side, start_dir: Option<PathBuf>) -> Self {
        let dir = start_dir
            .filter(|d| d.is_dir())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let mut browser = Self {
            side,
            current_dir: dir,
            entries: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            page_size: 10,
            error: None,
            outcome: None,
        };
        browser.refresh();
        browser
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn entries(&self) -> &[BrowserEntry] {
        &self.entries
    }

    /// The selection made, if any; taking it resets the browser's outcome
    pub fn take_outcome(&mut self) -> Option<FileBrowserAction> {
        self.outcome.take()
    }

    fn read_dir(dir: &Path) -> std::io::Result<Vec<BrowserEntry>> {
        let mut entries: Vec<BrowserEntry> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| BrowserEntry {
                name: e.file_name().to_string_lossy().to_string(),
                path: e.path(),
                is_dir: e.file_type().map(|ft| ft.is_dir()).unwrap_or(false),
            })
            .collect();
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    fn refresh(&mut self) {
        match Self::read_dir(&self.current_dir) {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                warn!("Cannot list {}: {}", self.current_dir.display(), e);
                self.entries.clear();
                self.error = Some(format!("Cannot read directory: {}", e));
            }
        }
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn has_parent(&self) -> bool {
        self.current_dir.parent().is_some()
    }

    fn total_items(&self) -> usize {
        self.entries.len() + usize::from(self.has_parent())
    }

    fn entry_at(&self, index: usize) -> Option<&BrowserEntry> {
        if self.has_parent() {
            index.checked_sub(1).and_then(|i| self.entries.get(i))
        } else {
            self.entries.get(index)
        }
    }

    fn go_parent(&mut self) {
        if let Some(parent) = self.current_dir.parent() {
            let previous = self.current_dir.clone();
            self.current_dir = parent.to_path_buf();
            self.refresh();
            // Land on the directory we just left
            if let Some(pos) = self.entries.iter().position(|e| e.path == previous) {
                self.selected = pos + usize::from(self.has_parent());
            }
        }
    }

    fn activate(&mut self) {
        if self.has_parent() && self.selected == 0 {
            self.go_parent();
            return;
        }
        let Some(entry) = self.entry_at(self.selected).cloned() else {
            return;
        };
        if entry.is_dir {
            self.current_dir = entry.path;
            self.refresh();
        } else {
            self.outcome = Some(FileBrowserAction::Selected(self.side, entry.path));
        }
    }

    fn move_by(&mut self, delta: isize) {
        let total = self.total_items();
        if total == 0 {
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, total as isize - 1);
        self.selected = next as usize;
    }

    fn clamp_scroll(&mut self, visible_rows: usize) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if visible_rows > 0 && self.selected >= self.scroll_offset + visible_rows {
            self.scroll_offset = self.selected + 1 - visible_rows;
        }
        if self.total_items() <= visible_rows {
            self.scroll_offset = 0;
        }
    }
}

impl Component for FileBrowser {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveUp => self.move_by(-1),
            Action::MoveDown => self.move_by(1),
            Action::PageUp => self.move_by(-(self.page_size as isize)),
            Action::PageDown => self.move_by(self.page_size as isize),
            Action::Home => self.selected = 0,
            Action::End => self.selected = self.total_items().saturating_sub(1),
            Action::MoveLeft => self.go_parent(),
            Action::Confirm => self.activate(),
            Action::Cancel => self.outcome = Some(FileBrowserAction::Cancelled),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(format!(
                "{}: {}",
                self.side.file_label(),
                self.current_dir.display()
            ))
            .borders(Borders::ALL)
            .border_style(theme.focused_border_style());
        let inner = block.inner(area).inner(Margin {
            vertical: 0,
            horizontal: 1,
        });
        frame.render_widget(block, area);

        // Last line is reserved for the hint / error
        let visible_rows = inner.height.saturating_sub(1) as usize;
        self.page_size = visible_rows.max(1);
        self.clamp_scroll(visible_rows);

        let buf = frame.buffer_mut();
        let parent_offset = usize::from(self.has_parent());
        for row in 0..visible_rows {
            let index = self.scroll_offset + row;
            if index >= self.total_items() {
                break;
            }
            let (text, style) = if parent_offset == 1 && index == 0 {
                ("[..]".to_string(), theme.normal_style())
            } else {
                let Some(entry) = self.entries.get(index - parent_offset) else {
                    break;
                };
                if entry.is_dir {
                    (format!("[{}]/", entry.name), theme.normal_style())
                } else {
                    let supported = UploadedFile::from_path(&entry.path).is_text_like();
                    (entry.name.clone(), theme.value_style(supported))
                }
            };
            let style = if index == self.selected {
                theme.selected_style()
            } else {
                style
            };
            buf.set_stringn(inner.x, inner.y + row as u16, text, inner.width as usize, style);
        }

        let footer_y = inner.y + inner.height.saturating_sub(1);
        match &self.error {
            Some(err) => {
                buf.set_stringn(inner.x, footer_y, err, inner.width as usize, theme.error_style());
            }
            None => {
                let hint = "Enter: open/select  Left: parent  Esc: cancel";
                buf.set_stringn(inner.x, footer_y, hint, inner.width as usize, theme.border_style());
            }
        }
    }

    fn supported_actions(&self) -> &[Action] {
        SUPPORTED
    }

    fn name(&self) -> &str {
        "FileBrowser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.csv"), "id\n").unwrap();
        fs::write(dir.path().join("a.pdf"), "%PDF").unwrap();
        fs::write(dir.path().join("nested").join("inner.csv"), "id\n").unwrap();
        dir
    }

    #[test]
    fn test_directories_listed_first() {
        let dir = fixture();
        let browser = FileBrowser::new(Side::Origin, Some(dir.path().to_path_buf()));
        let names: Vec<&str> = browser.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["nested", "a.pdf", "b.csv"]);
    }

    #[test]
    fn test_select_file_reports_side() {
        let dir = fixture();
        let mut browser = FileBrowser::new(Side::Destination, Some(dir.path().to_path_buf()));
        browser.handle_action(Action::End).unwrap();
        browser.handle_action(Action::Confirm).unwrap();
        assert_eq!(
            browser.take_outcome(),
            Some(FileBrowserAction::Selected(Side::Destination, dir.path().join("b.csv")))
        );
        assert_eq!(browser.take_outcome(), None);
    }

    #[test]
    fn test_enter_and_leave_directory() {
        let dir = fixture();
        let mut browser = FileBrowser::new(Side::Origin, Some(dir.path().to_path_buf()));
        browser.handle_action(Action::MoveDown).unwrap(); // past ".."
        browser.handle_action(Action::Confirm).unwrap();
        assert_eq!(browser.current_dir(), dir.path().join("nested").as_path());
        assert_eq!(browser.entries().len(), 1);

        browser.handle_action(Action::MoveLeft).unwrap();
        assert_eq!(browser.current_dir(), dir.path());
        assert_eq!(browser.entry_at(browser.selected).map(|e| e.name.as_str()), Some("nested"));
    }

    #[test]
    fn test_cancel() {
        let dir = fixture();
        let mut browser = FileBrowser::new(Side::Origin, Some(dir.path().to_path_buf()));
        browser.handle_action(Action::Cancel).unwrap();
        assert_eq!(browser.take_outcome(), Some(FileBrowserAction::Cancelled));
    }
}
