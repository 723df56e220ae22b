//! Feature slices for the TUI (state/update/render per slice).

pub mod api_key;
pub mod login;
pub mod repos;
