use crate::core::error::FormError;
use crate::core::form::{FormSettings, FormState, LoadOutcome, Notice, NoticeLevel};
use crate::core::submission::FormSubmission;
use crate::core::types::Side;
use crate::core::upload::UploadedFile;
use crate::services::{FileLoader, LoadEvent};
use crate::tui::components::{
    Activation, DropdownPopup, FileBrowser, FileBrowserAction, FormRow, FormView, InfoDialog,
    PopupOutcome, PopupTarget, WeightEditor, WeightEditorOutcome,
};
use crate::tui::{Action, ActionCategory, Component, KeyBindings, Theme};
use color_eyre::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, BorderType, Borders, Clear},
    Frame,
};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Application state
///
/// Owns the form view, routes key events to whichever popup is on top and
/// hands file reads to the loader.
pub struct App {
    /// The form and its state
    form_view: FormView,

    /// Background file reader
    loader: FileLoader,

    /// Popups (at most one of these is open at a time)
    file_browser: Option<FileBrowser>,
    dropdown_popup: Option<DropdownPopup>,
    weight_editor: Option<WeightEditor>,

    /// Field explanations
    info_dialog: InfoDialog,

    show_help: bool,

    /// Directory the last file was picked from
    last_dir: Option<PathBuf>,

    /// Set once the form validated and was submitted
    submission: Option<FormSubmission>,

    keybindings: KeyBindings,
    theme: Theme,
    should_quit: bool,
}

impl App {
    pub fn new(settings: &FormSettings, loader: FileLoader) -> Self {
        Self {
            form_view: FormView::new(FormState::new(settings)),
            loader,
            file_browser: None,
            dropdown_popup: None,
            weight_editor: None,
            info_dialog: InfoDialog::new(),
            show_help: false,
            last_dir: None,
            submission: None,
            keybindings: KeyBindings::default(),
            theme: Theme::default(),
            should_quit: false,
        }
    }

    pub fn form(&self) -> &FormState {
        self.form_view.form()
    }

    /// Select a file for one side and start reading it in the background.
    /// Returns None when the file was refused.
    pub fn open_file(&mut self, side: Side, path: impl AsRef<Path>) -> Option<JoinHandle<()>> {
        let file = UploadedFile::from_path(path.as_ref());
        self.last_dir = path.as_ref().parent().map(Path::to_path_buf);
        let ticket = self.form_view.form_mut().select_file(side, file.clone()).ok()?;
        Some(self.loader.spawn_load(ticket, file))
    }

    /// Apply a finished read. An open popup listing that side's options is
    /// closed, since its indices refer to the replaced header.
    pub fn handle_load_event(&mut self, event: LoadEvent) -> LoadOutcome {
        let LoadEvent { ticket, result } = event;
        let side = ticket.side;
        let outcome = self.form_view.form_mut().complete_load(ticket, result);
        if outcome == LoadOutcome::Applied {
            let stale = self.dropdown_popup.as_ref().is_some_and(|popup| match popup.target() {
                PopupTarget::Slot(popup_side, _) => popup_side == side,
                PopupTarget::Categories => side == Side::Destination,
            });
            if stale {
                debug!("Closing popup after {} reload", side);
                self.dropdown_popup = None;
            }
        }
        outcome
    }

    /// Handle a key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // The weight editor takes raw text, so it sees keys before bindings do
        if let Some(editor) = &mut self.weight_editor {
            editor.handle_key(key)?;
            match editor.take_outcome() {
                Some(WeightEditorOutcome::Committed(text)) => {
                    debug!("Facility weights set to {:?}", text);
                    self.form_view.form_mut().set_weights(text);
                    self.weight_editor = None;
                }
                Some(WeightEditorOutcome::Cancelled) => self.weight_editor = None,
                None => {}
            }
            return Ok(());
        }

        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }
        Ok(())
    }

    /// Handle an action
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        if self.show_help {
            if matches!(action, Action::ToggleHelp | Action::Cancel | Action::Confirm) {
                self.show_help = false;
            } else if action == Action::Quit {
                self.should_quit = true;
            }
            return Ok(());
        }

        if self.info_dialog.is_open() {
            self.info_dialog.handle_action(action)?;
            return Ok(());
        }

        if let Some(browser) = &mut self.file_browser {
            browser.handle_action(action)?;
            match browser.take_outcome() {
                Some(FileBrowserAction::Selected(side, path)) => {
                    self.file_browser = None;
                    self.open_file(side, path);
                }
                Some(FileBrowserAction::Cancelled) => self.file_browser = None,
                None => {}
            }
            return Ok(());
        }

        if let Some(popup) = &mut self.dropdown_popup {
            popup.handle_action(action)?;
            match popup.take_outcome() {
                Some(PopupOutcome::Chosen(PopupTarget::Slot(side, role), index)) => {
                    self.dropdown_popup = None;
                    let result = self.form_view.form_mut().select_slot(side, role, index);
                    self.warn_on_error(result);
                }
                Some(PopupOutcome::Toggled(PopupTarget::Categories, index)) => {
                    let result = self.form_view.form_mut().toggle_category_value(index);
                    if result.is_err() {
                        self.dropdown_popup = None;
                    }
                    self.warn_on_error(result);
                }
                Some(PopupOutcome::Closed) => self.dropdown_popup = None,
                Some(other) => {
                    debug!("Ignoring popup outcome {:?}", other);
                    self.dropdown_popup = None;
                }
                None => {}
            }
            return Ok(());
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                return Ok(());
            }
            Action::ToggleHelp => {
                self.show_help = true;
                return Ok(());
            }
            Action::ShowInfo => {
                if let Some(topic) = self.form_view.info_topic() {
                    self.info_dialog.show(topic);
                }
                return Ok(());
            }
            Action::Submit => {
                self.submit();
                return Ok(());
            }
            Action::OpenFileBrowser => {
                let side = match self.form_view.current_row() {
                    Some(FormRow::File(side)) | Some(FormRow::Slot(side, _)) => side,
                    Some(FormRow::Categories) => Side::Destination,
                    _ => Side::Origin,
                };
                self.activate(Activation::BrowseFile(side));
                return Ok(());
            }
            Action::Cancel => {
                self.form_view.form_mut().dismiss_notice();
                return Ok(());
            }
            _ => {}
        }

        if self.form_view.handle_action(action)? {
            return Ok(());
        }

        if action == Action::Confirm {
            if let Some(activation) = self.form_view.activation() {
                self.activate(activation);
            }
        }
        Ok(())
    }

    /// Form edits never end the session; a refused edit becomes a warning
    fn warn_on_error(&mut self, result: std::result::Result<(), FormError>) {
        if let Err(e) = result {
            warn!("Form edit refused: {}", e);
            self.form_view.form_mut().notice = Some(Notice::warning(e.to_string()));
        }
    }

    fn activate(&mut self, activation: Activation) {
        let form = self.form_view.form();
        match activation {
            Activation::BrowseFile(side) => {
                let start = form
                    .group(side)
                    .file()
                    .and_then(|f| f.path.parent().map(Path::to_path_buf))
                    .or_else(|| self.last_dir.clone());
                self.file_browser = Some(FileBrowser::new(side, start));
            }
            Activation::OpenSlot(side, role) => {
                if let Some(slot) = form.group(side).slot(role) {
                    let popup =
                        DropdownPopup::single(role.label(), PopupTarget::Slot(side, role), &slot.dropdown);
                    self.dropdown_popup = Some(popup);
                }
            }
            Activation::OpenCategories => {
                self.dropdown_popup = Some(DropdownPopup::multi(
                    "Categories (Space to toggle)",
                    form.categories(),
                ));
            }
            Activation::EditWeights => {
                self.weight_editor = Some(WeightEditor::new(&form.weights));
            }
            Activation::Submit => self.submit(),
        }
    }

    fn submit(&mut self) {
        let form = self.form_view.form_mut();
        match form.submission() {
            Ok(submission) => {
                info!(
                    "Form submitted: origin {}, destination {}",
                    submission.origin_file.display(),
                    submission.destination_file.display()
                );
                self.submission = Some(submission);
                self.should_quit = true;
            }
            Err(errors) => {
                let message = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                debug!("Submission refused: {}", message);
                form.notice = Some(Notice::warning(message));
            }
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn submission(&self) -> Option<&FormSubmission> {
        self.submission.as_ref()
    }

    pub fn take_submission(&mut self) -> Option<FormSubmission> {
        self.submission.take()
    }

    /// Update (called on every tick)
    pub fn update(&mut self) -> Result<()> {
        self.form_view.update()
    }

    /// Render the application
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1), // notice
                Constraint::Length(1), // key hints
            ])
            .split(area);

        self.form_view.render(frame, chunks[0], &self.theme);
        self.render_notice(frame, chunks[1]);
        self.render_hints(frame, chunks[2]);

        if let Some(browser) = &mut self.file_browser {
            browser.render(frame, Self::centered_rect(70, 70, area), &self.theme);
        }
        if let Some(popup) = &mut self.dropdown_popup {
            let popup_area = Self::centered_rect(50, 100, area);
            let height = popup.preferred_height().min(area.height.saturating_sub(4));
            let popup_area = Rect {
                y: area.y + area.height.saturating_sub(height) / 2,
                height,
                ..popup_area
            };
            popup.render(frame, popup_area, &self.theme);
        }
        if let Some(editor) = &mut self.weight_editor {
            let editor_area = Self::centered_rect(70, 100, area);
            let editor_area = Rect {
                y: area.y + area.height.saturating_sub(5) / 2,
                height: 5.min(area.height),
                ..editor_area
            };
            editor.render(frame, editor_area, &self.theme);
        }
        self.info_dialog.render(frame, area, &self.theme);
        if self.show_help {
            self.render_help(frame, Self::centered_rect(70, 80, area));
        }
    }

    fn render_notice(&self, frame: &mut Frame, area: Rect) {
        let Some(notice) = &self.form().notice else {
            return;
        };
        let style = match notice.level {
            NoticeLevel::Info => self.theme.info_style(),
            NoticeLevel::Warning => self.theme.warning_style(),
        };
        frame
            .buffer_mut()
            .set_stringn(area.x + 1, area.y, &notice.message, area.width.saturating_sub(1) as usize, style);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let hint = [
            Action::Confirm,
            Action::ToggleSelection,
            Action::ShowInfo,
            Action::ToggleAdvanced,
            Action::Submit,
            Action::ToggleHelp,
            Action::Quit,
        ]
        .iter()
        .filter_map(|action| {
            self.keybindings
                .get_keys_for_action(*action)
                .first()
                .map(|key| format!("{}: {}", key, short_name(*action)))
        })
        .collect::<Vec<_>>()
        .join("  ");
        frame
            .buffer_mut()
            .set_stringn(area.x + 1, area.y, hint, area.width.saturating_sub(1) as usize, self.theme.border_style());
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title("Keys")
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(self.theme.focused_border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<(String, bool)> = Vec::new();
        for category in ActionCategory::all() {
            lines.push((category.to_string(), true));
            for action in Action::all().into_iter().filter(|a| a.category() == category) {
                let keys = self.keybindings.get_keys_for_action(action).join(", ");
                lines.push((format!("  {:<24} {}", keys, action.description()), false));
            }
        }
        let buf = frame.buffer_mut();
        for (i, (text, is_header)) in lines.iter().take(inner.height as usize).enumerate() {
            let style = if *is_header {
                self.theme.section_style()
            } else {
                self.theme.normal_style()
            };
            buf.set_stringn(inner.x + 1, inner.y + i as u16, text, inner.width.saturating_sub(2) as usize, style);
        }
    }

    /// Helper to create a centered rectangle
    fn centered_rect(percent_w: u16, percent_h: u16, area: Rect) -> Rect {
        let width = (area.width * percent_w) / 100;
        let height = (area.height * percent_h) / 100;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }
}

fn short_name(action: Action) -> &'static str {
    match action {
        Action::Confirm => "Open",
        Action::ToggleSelection => "Toggle",
        Action::ShowInfo => "Info",
        Action::ToggleAdvanced => "Advanced",
        Action::Submit => "Submit",
        Action::ToggleHelp => "Help",
        Action::Quit => "Quit",
        other => other.description(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dropdown::Dropdown;
    use crate::core::info::InfoTopic;
    use crate::core::types::SlotRole;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::io::Write;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn create_test_app() -> (App, mpsc::UnboundedReceiver<LoadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(&FormSettings::default(), FileLoader::new(tx)), rx)
    }

    fn write_csv(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_action() {
        let (mut app, _rx) = create_test_app();
        assert!(!app.should_quit());
        app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit());
        assert!(app.submission().is_none());
    }

    #[tokio::test]
    async fn test_open_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "blocks.csv", &["geoid10,lat,lon,pop", "1,41.8,-87.6,10"]);
        let (mut app, mut rx) = create_test_app();

        let handle = app.open_file(Side::Origin, &path).unwrap();
        handle.await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(app.handle_load_event(event), LoadOutcome::Applied);
        let group = app.form().group(Side::Origin);
        assert!(group.is_loaded());
        assert_eq!(group.header().columns(), &["geoid10", "lat", "lon", "pop"]);
    }

    #[tokio::test]
    async fn test_unsupported_file_is_not_read() {
        let (mut app, mut rx) = create_test_app();
        assert!(app.open_file(Side::Destination, "/tmp/map.pdf").is_none());
        assert!(rx.try_recv().is_err());
        assert_eq!(
            app.form().notice.as_ref().map(|n| n.level),
            Some(NoticeLevel::Warning)
        );
    }

    #[test]
    fn test_submit_with_missing_files_shows_notice() {
        let (mut app, _rx) = create_test_app();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(!app.should_quit());
        let notice = app.form().notice.clone().unwrap();
        assert!(notice.message.contains("Please specify an origin file."));
    }

    #[test]
    fn test_info_dialog_from_focused_row() {
        let (mut app, _rx) = create_test_app();
        app.handle_key_event(key(KeyCode::Char('i'))).unwrap();
        assert_eq!(app.info_dialog.topic(), Some(InfoTopic::HssaScore));
        // Quit is swallowed while the dialog is up
        app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit());
        app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(!app.info_dialog.is_open());
    }

    #[test]
    fn test_weight_editor_takes_text() {
        let (mut app, _rx) = create_test_app();
        app.handle_key_event(key(KeyCode::Char('a'))).unwrap();
        assert!(app.form_view.focus_row(FormRow::Weights));
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        for ch in "1, 0.5 q".chars() {
            app.handle_key_event(key(KeyCode::Char(ch))).unwrap();
        }
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(!app.should_quit());
        assert_eq!(app.form().weights, "1, 0.5 q");
    }

    #[tokio::test]
    async fn test_slot_popup_selects_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "sites.csv", &["ID,lat,lon,kind", "A,1,2,school"]);
        let (mut app, mut rx) = create_test_app();
        app.open_file(Side::Destination, &path).unwrap().await.unwrap();
        let event = rx.recv().await.unwrap();
        app.handle_load_event(event);

        assert!(app.form_view.focus_row(FormRow::Slot(Side::Destination, SlotRole::Category)));
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        app.handle_key_event(key(KeyCode::End)).unwrap();
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(app.dropdown_popup.is_none());
        assert_eq!(app.form().categories().options(), &["school"]);
    }

    #[tokio::test]
    async fn test_reload_closes_open_slot_popup() {
        let dir = TempDir::new().unwrap();
        let wide = write_csv(&dir, "a.csv", &["ID,lat,lon,target,kind", "A,1,2,3,school"]);
        let narrow = write_csv(&dir, "b.csv", &["ID,kind", "A,clinic"]);
        let (mut app, mut rx) = create_test_app();
        app.open_file(Side::Destination, &wide).unwrap().await.unwrap();
        let event = rx.recv().await.unwrap();
        app.handle_load_event(event);

        let pending = app.open_file(Side::Destination, &narrow).unwrap();
        assert!(app.form_view.focus_row(FormRow::Slot(Side::Destination, SlotRole::Category)));
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(app.dropdown_popup.is_some());

        pending.await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(app.handle_load_event(event), LoadOutcome::Applied);
        assert!(app.dropdown_popup.is_none());

        // Keys now go to the form again and nothing fails
        app.handle_key_event(key(KeyCode::End)).unwrap();
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn test_out_of_range_choice_becomes_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "b.csv", &["ID,kind", "A,clinic"]);
        let (mut app, mut rx) = create_test_app();
        app.open_file(Side::Destination, &path).unwrap().await.unwrap();
        let event = rx.recv().await.unwrap();
        app.handle_load_event(event);

        // A list built from a wider header than the one now loaded
        let mut wide = Dropdown::with_sentinel();
        wide.populate(&["ID", "lat", "lon", "target", "kind"]);
        let target = PopupTarget::Slot(Side::Destination, SlotRole::Category);
        app.dropdown_popup = Some(DropdownPopup::single("Category", target, &wide));

        app.handle_key_event(key(KeyCode::End)).unwrap();
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(app.dropdown_popup.is_none());
        assert!(!app.should_quit());
        let notice = app.form().notice.clone().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Option index 5 is out of range for a list of 3");
    }

    #[test]
    fn test_render_smoke() {
        let (mut app, _rx) = create_test_app();
        app.handle_action(Action::ToggleAdvanced).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Access measures"));
        assert!(content.contains("Origin file"));
        assert!(content.contains("[1, 0.8. 0.6, 0.4, 0.2]"));
    }

    #[test]
    fn test_theme_management() {
        let (mut app, _rx) = create_test_app();
        app.set_theme(Theme::light());
        assert_eq!(app.theme().name, "Light");
    }

    #[test]
    fn test_keybindings_management() {
        let (mut app, _rx) = create_test_app();
        app.set_keybindings(KeyBindings::default());
        assert!(!app.keybindings().get_keys_for_action(Action::Quit).is_empty());
    }
}
