//! API key view: workflow key display, generation, and snippet copying.

pub mod render;
pub mod state;
pub mod update;

pub use state::ApiKeyState;
