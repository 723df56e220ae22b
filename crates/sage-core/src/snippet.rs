//! GitHub Actions workflow snippet shown alongside the API key.

/// Instruction shown with the snippet.
pub const WORKFLOW_NOTE: &str =
    "Add this step to your GitHub workflow file (.github/workflows/your-workflow.yml)";

/// Renders the workflow step with the user's API key filled in.
pub fn workflow_snippet(api_key: &str) -> String {
    format!(
        "- name: Debug with SaaS Debugging\n  \
         if: ${{{{ failure() || steps.build.outcome == 'failure' }}}}\n  \
         uses: ConorJones05/githubactionschatbot@main\n  \
         with:\n    \
         api_key: {api_key}"
    )
}
