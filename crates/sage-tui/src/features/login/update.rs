//! Login view reducer.
//!
//! Starts the browser flow (authorize URL + loopback listener) and accepts
//! pasted redirect URLs as a fallback when the listener cannot be used.

use crossterm::event::{KeyCode, KeyEvent};
use sage_core::identity;

use crate::effects::UiEffect;
use crate::state::AppState;

use super::state::LoginFlow;

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter => start_login(app),
        KeyCode::Esc => {
            // Reset the view; a still-running listener times out on its own.
            app.login.flow = LoginFlow::Idle;
            app.login.error = None;
            vec![]
        }
        KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}

/// Opens the provider page in the browser and starts the redirect listener.
pub fn start_login(app: &mut AppState) -> Vec<UiEffect> {
    if app.login.is_busy() {
        return vec![];
    }

    let Some(base_url) = app.config.identity.effective_base_url() else {
        app.login.error = Some(
            "Identity service is not configured. Run `sage config init` and set \
             [identity] base_url and anon_key."
                .to_string(),
        );
        return vec![];
    };

    let oauth = &app.config.oauth;
    let url = identity::authorize_url(
        base_url,
        &oauth.provider,
        &oauth.scopes,
        &oauth.redirect_uri(),
    );

    app.login.error = None;
    app.login.flow = LoginFlow::AwaitingRedirect { url: url.clone() };

    let mut effects = vec![UiEffect::OpenBrowser { url }];
    if !app.login.listener_active {
        app.login.listener_active = true;
        effects.push(UiEffect::StartLoginListener);
    }
    effects
}

/// Treats pasted text as a redirect URL and resolves it.
pub fn handle_paste(app: &mut AppState, text: &str) -> Vec<UiEffect> {
    let input = text.trim();
    if input.is_empty() || matches!(app.login.flow, LoginFlow::Resolving) {
        return vec![];
    }

    app.login.error = None;
    app.login.flow = LoginFlow::Resolving;
    vec![UiEffect::ResolveRedirect {
        input: input.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    #[test]
    fn test_start_login_requires_identity_config() {
        let mut app = AppState::for_tests();

        let effects = start_login(&mut app);

        assert!(effects.is_empty());
        assert!(app.login.error.is_some());
        assert_eq!(app.login.flow, LoginFlow::Idle);
    }

    #[test]
    fn test_start_login_opens_browser_and_listens() {
        let mut app = AppState::for_tests();
        app.config.identity.base_url = Some("http://127.0.0.1:9999/auth/v1".to_string());
        app.config.identity.anon_key = Some("anon".to_string());

        let effects = start_login(&mut app);

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::OpenBrowser { .. }, UiEffect::StartLoginListener]
        ));
        assert!(app.login.listener_active);
        match &app.login.flow {
            LoginFlow::AwaitingRedirect { url } => {
                assert!(url.contains("provider=github"));
                assert!(url.contains("redirect_to="));
            }
            other => panic!("expected AwaitingRedirect, got {other:?}"),
        }
    }

    #[test]
    fn test_start_login_does_not_double_listen() {
        let mut app = AppState::for_tests();
        app.config.identity.base_url = Some("http://127.0.0.1:9999/auth/v1".to_string());
        app.config.identity.anon_key = Some("anon".to_string());

        start_login(&mut app);
        // Esc resets the view but the listener stays alive until timeout.
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
        );
        let effects = start_login(&mut app);

        // Browser reopens, but no second listener on the same port.
        assert!(matches!(effects.as_slice(), [UiEffect::OpenBrowser { .. }]));
    }

    #[test]
    fn test_empty_paste_is_ignored() {
        let mut app = AppState::for_tests();
        let effects = handle_paste(&mut app, "   \n");
        assert!(effects.is_empty());
        assert_eq!(app.login.flow, LoginFlow::Idle);
    }
}
