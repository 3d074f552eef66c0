#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod core;
pub mod logging;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use crate::core::{FormSettings, FormState, FormSubmission, Side, SlotRole};
pub use crate::services::{FileLoader, LoadEvent};
pub use crate::tui::{Action, ActionCategory, App};
