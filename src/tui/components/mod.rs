pub mod dropdown_popup;
pub mod file_browser;
pub mod form_view;
pub mod info_dialog;
pub mod weight_editor;

pub use dropdown_popup::{DropdownPopup, PopupOutcome, PopupTarget};
pub use file_browser::{FileBrowser, FileBrowserAction};
pub use form_view::{Activation, FormRow, FormView};
pub use info_dialog::InfoDialog;
pub use weight_editor::{WeightEditor, WeightEditorOutcome};
