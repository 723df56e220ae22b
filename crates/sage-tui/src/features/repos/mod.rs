//! Repository view: failing-repo list and latest recommendations.

pub mod render;
pub mod state;
pub mod update;

pub use state::ReposState;
