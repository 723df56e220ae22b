//! File-name to language labels for presenting recommendation code.

use std::path::Path;

/// Maps a file name to the language label shown with its code.
pub fn language_for_file(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "json" => "json",
        "md" => "markdown",
        "yml" | "yaml" => "yaml",
        "sh" => "bash",
        "java" => "java",
        "c" => "c",
        "cpp" => "cpp",
        "rb" => "ruby",
        "php" => "php",
        "go" => "go",
        "rs" => "rust",
        _ => "text",
    }
}
