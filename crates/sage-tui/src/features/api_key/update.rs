//! API key view reducer.

use crossterm::event::{KeyCode, KeyEvent};
use sage_core::auth::RouteIntent;
use sage_core::snippet;

use crate::effects::UiEffect;
use crate::state::AppState;
use crate::update::navigate;

/// Called when the view becomes visible. Fetches the key unless it is
/// already loaded or being worked on.
pub fn enter(app: &mut AppState) -> Vec<UiEffect> {
    if app.api_key.key.is_some() || app.api_key.is_busy() {
        return vec![];
    }
    app.api_key.loading = true;
    app.api_key.error = None;
    vec![UiEffect::LoadApiKey]
}

pub fn handle_loaded(app: &mut AppState, result: Result<Option<String>, String>) -> Vec<UiEffect> {
    app.api_key.loading = false;
    match result {
        Ok(Some(key)) => {
            app.api_key.key = Some(key);
            vec![]
        }
        Ok(None) => {
            // First visit: provision a key right away.
            app.api_key.generating = true;
            vec![UiEffect::GenerateApiKey]
        }
        Err(e) => {
            app.api_key.error = Some(e);
            vec![]
        }
    }
}

pub fn handle_generated(app: &mut AppState, result: Result<String, String>) -> Vec<UiEffect> {
    app.api_key.generating = false;
    match result {
        Ok(key) => {
            app.api_key.key = Some(key);
            app.set_status("API key ready.");
            vec![]
        }
        Err(e) => {
            app.api_key.error = Some(e);
            vec![]
        }
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('c') => {
            if let Some(key) = &app.api_key.key {
                return vec![UiEffect::CopyToClipboard { text: key.clone() }];
            }
            vec![]
        }
        KeyCode::Char('w') => {
            if let Some(key) = &app.api_key.key {
                return vec![UiEffect::CopyToClipboard {
                    text: snippet::workflow_snippet(key),
                }];
            }
            vec![]
        }
        KeyCode::Char('r') => {
            app.api_key.revealed = !app.api_key.revealed;
            vec![]
        }
        KeyCode::Char('g') => {
            if app.api_key.is_busy() {
                return vec![];
            }
            app.api_key.generating = true;
            app.api_key.error = None;
            vec![UiEffect::GenerateApiKey]
        }
        KeyCode::Char('2') => navigate(app, RouteIntent::Repos),
        KeyCode::Char('s') => vec![UiEffect::SignOut],
        KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_skips_fetch_when_key_cached() {
        let mut app = AppState::for_tests();
        app.api_key.key = Some("sage-key-1".to_string());
        assert!(enter(&mut app).is_empty());
    }

    #[test]
    fn test_copy_workflow_embeds_key() {
        let mut app = AppState::for_tests();
        app.api_key.key = Some("sage-key-1".to_string());

        let effects = handle_key(&mut app, key(KeyCode::Char('w')));

        match effects.as_slice() {
            [UiEffect::CopyToClipboard { text }] => {
                assert!(text.contains("api_key: sage-key-1"));
                assert!(text.contains("- name: Debug with SaaS Debugging"));
            }
            other => panic!("expected copy effect, got {other:?}"),
        }
    }

    #[test]
    fn test_copy_without_key_is_noop() {
        let mut app = AppState::for_tests();
        assert!(handle_key(&mut app, key(KeyCode::Char('c'))).is_empty());
    }

    #[test]
    fn test_regenerate_is_single_flight() {
        let mut app = AppState::for_tests();
        let effects = handle_key(&mut app, key(KeyCode::Char('g')));
        assert!(matches!(effects.as_slice(), [UiEffect::GenerateApiKey]));
        assert!(app.api_key.generating);

        // A second press while in flight does nothing.
        assert!(handle_key(&mut app, key(KeyCode::Char('g'))).is_empty());
    }

    #[test]
    fn test_generation_failure_surfaces() {
        let mut app = AppState::for_tests();
        app.api_key.generating = true;

        handle_generated(&mut app, Err("Key generation failed (HTTP 500)".to_string()));

        assert!(!app.api_key.generating);
        assert!(
            app.api_key
                .error
                .as_deref()
                .is_some_and(|e| e.contains("500"))
        );
    }
}
