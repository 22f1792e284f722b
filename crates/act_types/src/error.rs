use std::path::PathBuf;

use thiserror::Error;

/// The narrow set of conditions that are genuinely fatal to a build (§7:
/// "Nothing in the core raises to the top of the build... Only failure to
/// acquire the source root... is fatal"). Everything else — malformed
/// declarations, unresolved callees, cache misses, qualified-name collisions
/// — is collected as data (`parse_errors`, `AnalysisResult.errors`), never
/// raised.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("source root does not exist: {0}")]
    SourceRootNotFound(PathBuf),

    #[error("source root is not a directory: {0}")]
    SourceRootNotADirectory(PathBuf),
}
