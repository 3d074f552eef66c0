use ratatui::style::{Color, Modifier, Style};

/// Color scheme for the form and its popups
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // General UI colors
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Form colors
    pub label_fg: Color,
    pub label_inactive_fg: Color,
    pub disabled_fg: Color,
    pub section_fg: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,

    // Status/feedback colors
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Theme {
    /// Default dark theme
    pub fn default() -> Self {
        Self {
            name: "Default Dark".to_string(),
            background: Color::Reset,
            foreground: Color::Gray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            label_fg: Color::White,
            label_inactive_fg: Color::DarkGray,
            disabled_fg: Color::Rgb(90, 90, 100),
            section_fg: Color::Cyan,
            selected_fg: Color::Black,
            selected_bg: Color::Cyan,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            background: Color::White,
            foreground: Color::Black,
            border: Color::Gray,
            border_focused: Color::Blue,
            label_fg: Color::Black,
            label_inactive_fg: Color::Gray,
            disabled_fg: Color::Rgb(170, 170, 170),
            section_fg: Color::Blue,
            selected_fg: Color::White,
            selected_bg: Color::Blue,
            error: Color::Red,
            warning: Color::Rgb(200, 150, 0), // Darker yellow for light bg
            info: Color::Blue,
        }
    }

    /// Look up a theme by config name; unknown names fall back to the dark theme
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::default(),
        }
    }

    pub fn label_style(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.label_fg)
        } else {
            Style::default()
                .fg(self.label_inactive_fg)
                .add_modifier(Modifier::ITALIC)
        }
    }

    pub fn value_style(&self, enabled: bool) -> Style {
        if enabled {
            self.normal_style()
        } else {
            Style::default().fg(self.disabled_fg)
        }
    }

    pub fn section_style(&self) -> Style {
        Style::default()
            .fg(self.section_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }
}
