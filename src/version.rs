// Version information for the embedding node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-deterministic-embeddings-2026-08-06";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-08-06";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Embed Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
