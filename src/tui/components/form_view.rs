use color_eyre::Result;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};

use crate::core::form::{FormState, Slider};
use crate::core::info::InfoTopic;
use crate::core::types::{Side, SlotRole};
use crate::tui::components::weight_editor::WEIGHTS_PLACEHOLDER;
use crate::tui::{Action, Component, Focusable, Theme};

pub const CATEGORIES_LABEL: &str = "Choose categories to calculate measures for (Optional)";

/// One focusable line of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Access,
    Coverage,
    TravelMode,
    MaxTravelTime,
    File(Side),
    Slot(Side, SlotRole),
    Categories,
    AdvancedToggle,
    DecayFunction,
    Epsilon,
    WalkSpeed,
    Weights,
    Submit,
}

impl FormRow {
    pub fn info_topic(&self) -> Option<InfoTopic> {
        match self {
            FormRow::Access | FormRow::Coverage => Some(InfoTopic::HssaScore),
            FormRow::DecayFunction => Some(InfoTopic::DecayFunction),
            FormRow::Epsilon => Some(InfoTopic::EpsilonValue),
            FormRow::Weights => Some(InfoTopic::FacilityWeights),
            _ => None,
        }
    }
}

/// What Enter on the focused row asks the app to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    BrowseFile(Side),
    OpenSlot(Side, SlotRole),
    OpenCategories,
    EditWeights,
    Submit,
}

enum LayoutLine {
    Section(&'static str),
    Row(FormRow),
}

const SUPPORTED: &[Action] = &[
    Action::MoveUp,
    Action::MoveDown,
    Action::MoveLeft,
    Action::MoveRight,
    Action::Home,
    Action::End,
    Action::NextField,
    Action::PrevField,
    Action::ToggleSelection,
    Action::ClearField,
    Action::ToggleAdvanced,
    Action::Confirm,
];

const LABEL_WIDTH: u16 = 34;
const BAR_WIDTH: usize = 20;

/// The whole form, drawn from `FormState`
pub struct FormView {
    form: FormState,
    cursor: usize,
    scroll_offset: usize,
    focused: bool,
}

impl FormView {
    pub fn new(form: FormState) -> Self {
        Self {
            form,
            cursor: 0,
            scroll_offset: 0,
            focused: true,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    /// Rows currently shown; hidden slots and the collapsed panel are skipped
    pub fn rows(&self) -> Vec<FormRow> {
        self.layout()
            .into_iter()
            .filter_map(|l| match l {
                LayoutLine::Row(row) => Some(row),
                LayoutLine::Section(_) => None,
            })
            .collect()
    }

    fn layout(&self) -> Vec<LayoutLine> {
        let mut lines = vec![
            LayoutLine::Section("Measures"),
            LayoutLine::Row(FormRow::Access),
            LayoutLine::Row(FormRow::Coverage),
            LayoutLine::Row(FormRow::TravelMode),
            LayoutLine::Row(FormRow::MaxTravelTime),
        ];
        for side in [Side::Origin, Side::Destination] {
            lines.push(LayoutLine::Section(match side {
                Side::Origin => "Origins",
                Side::Destination => "Destinations",
            }));
            lines.push(LayoutLine::Row(FormRow::File(side)));
            for slot in self.form.visible_slots(side) {
                lines.push(LayoutLine::Row(FormRow::Slot(side, slot.role)));
            }
        }
        lines.push(LayoutLine::Row(FormRow::Categories));
        lines.push(LayoutLine::Row(FormRow::AdvancedToggle));
        if self.form.advanced.is_expanded() {
            lines.push(LayoutLine::Row(FormRow::DecayFunction));
            lines.push(LayoutLine::Row(FormRow::Epsilon));
            lines.push(LayoutLine::Row(FormRow::WalkSpeed));
            lines.push(LayoutLine::Row(FormRow::Weights));
        }
        lines.push(LayoutLine::Row(FormRow::Submit));
        lines
    }

    pub fn current_row(&self) -> Option<FormRow> {
        self.rows().get(self.cursor).copied()
    }

    /// Move focus to `row` if it is shown
    pub fn focus_row(&mut self, row: FormRow) -> bool {
        match self.rows().iter().position(|r| *r == row) {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    pub fn activation(&self) -> Option<Activation> {
        match self.current_row()? {
            FormRow::File(side) => Some(Activation::BrowseFile(side)),
            FormRow::Slot(side, role) if self.form.group(side).is_loaded() => {
                Some(Activation::OpenSlot(side, role))
            }
            FormRow::Categories if self.form.categories().is_enabled() => {
                Some(Activation::OpenCategories)
            }
            FormRow::Weights => Some(Activation::EditWeights),
            FormRow::Submit => Some(Activation::Submit),
            _ => None,
        }
    }

    pub fn info_topic(&self) -> Option<InfoTopic> {
        self.current_row().and_then(|r| r.info_topic())
    }

    /// Keep focus on `previous` after rows appear or vanish, else on `fallback`
    fn refocus(&mut self, previous: Option<FormRow>, fallback: FormRow) {
        if previous.is_some_and(|row| self.focus_row(row)) || self.focus_row(fallback) {
            return;
        }
        self.cursor = self.cursor.min(self.rows().len().saturating_sub(1));
    }

    fn step_slot(&mut self, side: Side, role: SlotRole, delta: isize) -> Result<()> {
        let group = self.form.group(side);
        let Some(slot) = group.slot(role) else {
            return Ok(());
        };
        if !group.is_loaded() || slot.dropdown.is_empty() {
            return Ok(());
        }
        let last = slot.dropdown.len() as isize - 1;
        let current = slot.dropdown.selected_index().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, last) as usize;
        self.form.select_slot(side, role, next)?;
        Ok(())
    }

    fn adjust(&mut self, row: FormRow, delta: isize) -> Result<bool> {
        let up = delta > 0;
        match row {
            FormRow::Access => self.form.set_access(!self.form.access),
            FormRow::Coverage => {
                self.form.set_coverage(!self.form.coverage);
                self.refocus(Some(row), FormRow::Coverage);
            }
            FormRow::TravelMode => self.form.cycle_travel_mode(),
            FormRow::MaxTravelTime => step(&mut self.form.max_travel_time, up),
            FormRow::Slot(side, role) => self.step_slot(side, role, delta)?,
            FormRow::DecayFunction => {
                self.form.decay_function = if up {
                    self.form.decay_function.next()
                } else {
                    self.form.decay_function.prev()
                };
            }
            FormRow::Epsilon => step(&mut self.form.epsilon, up),
            FormRow::WalkSpeed => step(&mut self.form.walk_speed, up),
            FormRow::AdvancedToggle => {
                self.form.advanced.toggle();
                self.refocus(Some(row), FormRow::AdvancedToggle);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn row_label(&self, row: FormRow) -> (String, bool) {
        match row {
            FormRow::Access => ("Access measures".into(), true),
            FormRow::Coverage => ("Coverage measures".into(), true),
            FormRow::TravelMode => ("Travel mode".into(), true),
            FormRow::MaxTravelTime => ("Maximum travel time".into(), true),
            FormRow::File(side) => (side.file_label().into(), true),
            FormRow::Slot(side, role) => {
                let active = self
                    .form
                    .group(side)
                    .slot(role)
                    .map(|s| s.label_active)
                    .unwrap_or(false);
                (role.label().into(), active)
            }
            FormRow::Categories => (CATEGORIES_LABEL.into(), self.form.categories_label_active()),
            FormRow::AdvancedToggle => {
                let arrow = if self.form.advanced.is_expanded() { "v" } else { ">" };
                (format!("{} Advanced settings", arrow), true)
            }
            FormRow::DecayFunction => ("Distance decay function".into(), true),
            FormRow::Epsilon => ("Epsilon value".into(), true),
            FormRow::WalkSpeed => ("Walk speed".into(), true),
            FormRow::Weights => ("Facility weights".into(), true),
            FormRow::Submit => (String::new(), true),
        }
    }

    /// Value text and whether it is enabled
    fn row_value(&self, row: FormRow) -> (String, bool) {
        let form = &self.form;
        match row {
            FormRow::Access => (checkbox(form.access), true),
            FormRow::Coverage => (checkbox(form.coverage), true),
            FormRow::TravelMode => (format!("< {} >", form.travel_mode.label()), true),
            FormRow::MaxTravelTime => (slider_text(&form.max_travel_time, "min"), true),
            FormRow::File(side) => {
                let group = form.group(side);
                let text = match (group.pending(), group.file()) {
                    (Some(p), _) => format!("reading {}...", p.name),
                    (None, Some(f)) => f.name.clone(),
                    (None, None) => "(no file chosen)".to_string(),
                };
                (text, true)
            }
            FormRow::Slot(side, role) => {
                let group = form.group(side);
                match group.slot(role) {
                    Some(slot) if slot.dropdown.is_enabled() => {
                        let text = slot.dropdown.selected_label().unwrap_or("(no columns)");
                        (format!("< {} >", text), true)
                    }
                    _ => ("-".to_string(), false),
                }
            }
            FormRow::Categories => {
                let categories = form.categories();
                if !categories.is_enabled() {
                    return ("-".to_string(), false);
                }
                let chosen = categories.chosen_values();
                let text = if chosen.is_empty() {
                    format!("(all {} values)", categories.len())
                } else {
                    chosen.join(", ")
                };
                (text, true)
            }
            FormRow::AdvancedToggle => (String::new(), true),
            FormRow::DecayFunction => (format!("< {} >", form.decay_function.label()), true),
            FormRow::Epsilon => (slider_text(&form.epsilon, ""), true),
            FormRow::WalkSpeed => (slider_text(&form.walk_speed, "mph"), true),
            FormRow::Weights => {
                if form.weights.trim().is_empty() {
                    (WEIGHTS_PLACEHOLDER.to_string(), false)
                } else {
                    (form.weights.clone(), true)
                }
            }
            FormRow::Submit => ("[ Submit ]".to_string(), true),
        }
    }
}

fn step(slider: &mut Slider, up: bool) {
    if up {
        slider.increment();
    } else {
        slider.decrement();
    }
}

fn checkbox(checked: bool) -> String {
    if checked { "[x]".to_string() } else { "[ ]".to_string() }
}

fn slider_text(slider: &Slider, unit: &str) -> String {
    let filled = (slider.fraction() * BAR_WIDTH as f64).round() as usize;
    let bar: String = (0..BAR_WIDTH)
        .map(|i| if i < filled { '=' } else { '-' })
        .collect();
    if unit.is_empty() {
        format!("[{}] {}", bar, slider.display())
    } else {
        format!("[{}] {} {}", bar, slider.display(), unit)
    }
}

impl Component for FormView {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        let rows = self.rows();
        let Some(row) = rows.get(self.cursor).copied() else {
            return Ok(false);
        };
        match action {
            Action::MoveUp => self.cursor = self.cursor.saturating_sub(1),
            Action::MoveDown => self.cursor = (self.cursor + 1).min(rows.len() - 1),
            Action::NextField => self.cursor = (self.cursor + 1) % rows.len(),
            Action::PrevField => self.cursor = (self.cursor + rows.len() - 1) % rows.len(),
            Action::Home => self.cursor = 0,
            Action::End => self.cursor = rows.len() - 1,
            Action::MoveLeft => return self.adjust(row, -1),
            Action::MoveRight => return self.adjust(row, 1),
            Action::ToggleSelection => match row {
                FormRow::Access
                | FormRow::Coverage
                | FormRow::TravelMode
                | FormRow::AdvancedToggle => return self.adjust(row, 1),
                _ => return Ok(false),
            },
            Action::Confirm => match row {
                FormRow::Access | FormRow::Coverage | FormRow::AdvancedToggle => {
                    return self.adjust(row, 1);
                }
                _ => return Ok(false),
            },
            Action::ClearField => match row {
                FormRow::File(side) => self.form.clear_file(side),
                _ => return Ok(false),
            },
            Action::ToggleAdvanced => {
                self.form.advanced.toggle();
                self.refocus(Some(row), FormRow::AdvancedToggle);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title("Travel time analysis")
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(area).inner(Margin {
            vertical: 0,
            horizontal: 1,
        });
        frame.render_widget(block, area);

        let lines = self.layout();
        let current = self.current_row();
        let cursor_line = lines
            .iter()
            .position(|l| matches!(l, LayoutLine::Row(r) if Some(*r) == current))
            .unwrap_or(0);
        let visible = inner.height as usize;
        if cursor_line < self.scroll_offset {
            // Keep the section header above the first row in view
            self.scroll_offset = cursor_line.saturating_sub(1);
        } else if visible > 0 && cursor_line >= self.scroll_offset + visible {
            self.scroll_offset = cursor_line + 1 - visible;
        }

        let label_width = LABEL_WIDTH.min(inner.width / 2);
        let value_x = inner.x + label_width + 1;
        let value_width = inner.width.saturating_sub(label_width + 1) as usize;
        for (i, line) in lines.iter().skip(self.scroll_offset).take(visible).enumerate() {
            let y = inner.y + i as u16;
            match line {
                LayoutLine::Section(title) => {
                    frame
                        .buffer_mut()
                        .set_stringn(inner.x, y, *title, inner.width as usize, theme.section_style());
                }
                LayoutLine::Row(row) => {
                    let (label, label_active) = self.row_label(*row);
                    let (value, enabled) = self.row_value(*row);
                    let focused_row = self.focused && Some(*row) == current;
                    let label_style = if focused_row {
                        theme.selected_style()
                    } else {
                        theme.label_style(label_active)
                    };
                    let buf = frame.buffer_mut();
                    let label_text = format!(" {}", label);
                    buf.set_stringn(inner.x, y, label_text, label_width as usize, label_style);
                    let value_style = if focused_row && *row == FormRow::Submit {
                        theme.selected_style()
                    } else {
                        theme.value_style(enabled)
                    };
                    buf.set_stringn(value_x, y, value, value_width, value_style);
                }
            }
        }
    }

    fn supported_actions(&self) -> &[Action] {
        SUPPORTED
    }

    fn name(&self) -> &str {
        "FormView"
    }
}

impl Focusable for FormView {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
