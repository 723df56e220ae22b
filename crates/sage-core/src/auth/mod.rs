//! Auth state: session lifecycle, persistence, and protected navigation.

pub mod cache;
pub mod callback;
pub mod guard;
pub mod resolver;
pub mod session;
pub mod store;

pub use guard::{GuardDecision, RouteIntent};
pub use resolver::Resolution;
pub use session::{AuthSnapshot, Identity, Session};
pub use store::SessionStore;
