//! Check lifecycle view model: everything the pages and terminal commands
//! need to turn proxy replies into what the user sees.

pub mod detail;
pub mod format;
pub mod listing;
pub mod poll;
pub mod status;
pub mod upload;
