//! Login view state.

/// Where the login flow currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoginFlow {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Browser opened; listening for the redirect.
    AwaitingRedirect { url: String },
    /// A redirect URL is being validated.
    Resolving,
}

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub flow: LoginFlow,
    /// Why the last attempt failed, shown under the instructions.
    pub error: Option<String>,
    /// A loopback listener is still waiting for a redirect. Kept separate
    /// from `flow` so Esc can reset the view without letting a second
    /// listener fight over the port.
    pub listener_active: bool,
}

impl LoginState {
    pub fn is_busy(&self) -> bool {
        !matches!(self.flow, LoginFlow::Idle)
    }
}
