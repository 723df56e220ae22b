//! API key view state.

#[derive(Debug, Clone, Default)]
pub struct ApiKeyState {
    /// Key fetch in flight.
    pub loading: bool,
    /// Key generation in flight.
    pub generating: bool,
    pub key: Option<String>,
    /// Show the key itself instead of the masked form.
    pub revealed: bool,
    pub error: Option<String>,
}

impl ApiKeyState {
    pub fn is_busy(&self) -> bool {
        self.loading || self.generating
    }
}
