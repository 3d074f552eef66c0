pub mod category;
pub mod dropdown;
pub mod error;
pub mod form;
pub mod header;
pub mod info;
pub mod submission;
pub mod types;
pub mod upload;

pub use category::CategoryValueSet;
pub use dropdown::{Dropdown, DropdownOption, MultiSelect};
pub use error::{FormError, SubmissionError};
pub use form::{
    ColumnPresets, FieldSlot, FormSettings, FormState, LoadOutcome, LoadTicket, Notice,
    NoticeLevel, SlotGroup, SlotState, Slider, SliderSpec,
};
pub use header::{HeaderRow, IngestedFile};
pub use info::{InfoDialogState, InfoTopic};
pub use submission::FormSubmission;
pub use types::*;
pub use upload::UploadedFile;
