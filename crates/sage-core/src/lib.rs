//! Core Sage library (session store, route guard, identity and API clients).

pub mod api;
pub mod auth;
pub mod config;
pub mod highlight;
pub mod identity;
pub mod logging;
pub mod snippet;
