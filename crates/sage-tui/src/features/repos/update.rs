//! Repository view reducer.

use crossterm::event::{KeyCode, KeyEvent};
use sage_core::api::Recommendation;
use sage_core::auth::RouteIntent;

use crate::effects::UiEffect;
use crate::state::AppState;
use crate::update::navigate;

/// Called when the view becomes visible. Fetches the list unless it is
/// already loaded or loading.
pub fn enter(app: &mut AppState) -> Vec<UiEffect> {
    if !app.repos.repos.is_empty() || app.repos.loading {
        return vec![];
    }
    app.repos.loading = true;
    app.repos.error = None;
    vec![UiEffect::LoadRepos]
}

pub fn handle_loaded(app: &mut AppState, result: Result<Vec<String>, String>) -> Vec<UiEffect> {
    app.repos.loading = false;
    match result {
        Ok(repos) => {
            app.repos.selected = app
                .repos
                .selected
                .min(repos.len().saturating_sub(1));
            app.repos.repos = repos;
            vec![]
        }
        Err(e) => {
            app.repos.error = Some(e);
            vec![]
        }
    }
}

pub fn handle_recommendation(
    app: &mut AppState,
    repo: String,
    result: Result<Option<Recommendation>, String>,
) -> Vec<UiEffect> {
    app.repos.recommendation_loading = false;
    match result {
        Ok(recommendation) => {
            app.repos.recommendation = recommendation;
            app.repos.recommendation_repo = Some(repo);
            vec![]
        }
        Err(e) => {
            app.repos.error = Some(e);
            vec![]
        }
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.repos.selected + 1 < app.repos.repos.len() {
                app.repos.selected += 1;
            }
            vec![]
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.repos.selected = app.repos.selected.saturating_sub(1);
            vec![]
        }
        KeyCode::Enter => {
            if app.repos.recommendation_loading {
                return vec![];
            }
            let Some(repo) = app.repos.selected_repo() else {
                return vec![];
            };
            let repo = repo.to_string();
            app.repos.recommendation_loading = true;
            app.repos.error = None;
            vec![UiEffect::LoadRecommendation { repo }]
        }
        KeyCode::Char('c') => {
            if let Some(rec) = &app.repos.recommendation {
                return vec![UiEffect::CopyToClipboard {
                    text: rec.new_code.clone(),
                }];
            }
            vec![]
        }
        KeyCode::Char('1') => navigate(app, RouteIntent::ApiKey),
        KeyCode::Char('s') => vec![UiEffect::SignOut],
        KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}
