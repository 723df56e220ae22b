//! Repository view state.

use sage_core::api::Recommendation;

#[derive(Debug, Clone, Default)]
pub struct ReposState {
    /// List fetch in flight.
    pub loading: bool,
    pub repos: Vec<String>,
    /// Index into `repos` of the highlighted entry.
    pub selected: usize,
    /// Last loaded recommendation, shown in the detail pane.
    pub recommendation: Option<Recommendation>,
    /// Repo the loaded recommendation (or confirmed absence) belongs to.
    pub recommendation_repo: Option<String>,
    pub recommendation_loading: bool,
    pub error: Option<String>,
}

impl ReposState {
    pub fn is_busy(&self) -> bool {
        self.loading || self.recommendation_loading
    }

    /// The highlighted repository, if the list is non-empty.
    pub fn selected_repo(&self) -> Option<&str> {
        self.repos.get(self.selected).map(String::as_str)
    }
}
