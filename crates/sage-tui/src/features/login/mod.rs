//! Login view: browser sign-in flow and pasted redirect handling.

pub mod render;
pub mod state;
pub mod update;

pub use state::{LoginFlow, LoginState};
