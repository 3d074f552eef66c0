use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    Home,
    End,
    NextField,
    PrevField,

    // Editing
    ToggleSelection,
    ClearField,
    OpenFileBrowser,

    // Form
    ToggleAdvanced,
    ShowInfo,
    Submit,

    // View
    ToggleHelp,

    // Application
    Quit,
    Confirm,
    Cancel,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move up",
            Action::MoveDown => "Move down",
            Action::MoveLeft => "Previous value",
            Action::MoveRight => "Next value",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::Home => "Go to first entry",
            Action::End => "Go to last entry",
            Action::NextField => "Next field",
            Action::PrevField => "Previous field",
            Action::ToggleSelection => "Toggle checkbox or value",
            Action::ClearField => "Clear file selection",
            Action::OpenFileBrowser => "Choose a file",
            Action::ToggleAdvanced => "Show or hide advanced settings",
            Action::ShowInfo => "Explain the current field",
            Action::Submit => "Submit the form",
            Action::ToggleHelp => "Toggle help screen",
            Action::Quit => "Quit application",
            Action::Confirm => "Confirm action",
            Action::Cancel => "Cancel action",
        }
    }

    /// Get category for grouping in help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::PageUp
            | Action::PageDown
            | Action::Home
            | Action::End
            | Action::NextField
            | Action::PrevField => ActionCategory::Navigation,

            Action::ToggleSelection | Action::ClearField | Action::OpenFileBrowser => {
                ActionCategory::Editing
            }

            Action::ToggleAdvanced | Action::ShowInfo | Action::Submit => ActionCategory::Form,

            Action::ToggleHelp => ActionCategory::View,

            Action::Quit | Action::Confirm | Action::Cancel => ActionCategory::Application,
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
            Action::MoveUp,
            Action::MoveDown,
            Action::MoveLeft,
            Action::MoveRight,
            Action::PageUp,
            Action::PageDown,
            Action::Home,
            Action::End,
            Action::NextField,
            Action::PrevField,
            Action::ToggleSelection,
            Action::ClearField,
            Action::OpenFileBrowser,
            Action::ToggleAdvanced,
            Action::ShowInfo,
            Action::Submit,
            Action::ToggleHelp,
            Action::Quit,
            Action::Confirm,
            Action::Cancel,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Editing,
    Form,
    View,
    Application,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 5] {
        [
            ActionCategory::Navigation,
            ActionCategory::Editing,
            ActionCategory::Form,
            ActionCategory::View,
            ActionCategory::Application,
        ]
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Editing => write!(f, "Editing"),
            ActionCategory::Form => write!(f, "Form"),
            ActionCategory::View => write!(f, "View"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_actions_have_descriptions() {
        for action in Action::all() {
            assert!(!action.description().is_empty());
        }
    }

    #[test]
    fn test_every_category_is_used() {
        for category in ActionCategory::all() {
            assert!(Action::all().iter().any(|a| a.category() == category));
        }
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::ToggleAdvanced;
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, "\"ToggleAdvanced\"");

        let restored: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, action);
    }
}
