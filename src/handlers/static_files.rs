use crate::config::ServerConfig;
use tower_http::services::{ServeDir, ServeFile};

/// Service answering `/` with the configured default document.
pub fn index_service(config: &ServerConfig) -> ServeFile {
    // ---
    let index_path = config.index_path();
    if !index_path.is_file() {
        tracing::warn!(
            "Default document {:?} not found, `/` will answer 404",
            index_path
        );
    }
    ServeFile::new(index_path)
}

/// Service resolving every other path against the static root.
///
/// Missing files answer `404 Not Found`.
pub fn static_dir_service(config: &ServerConfig) -> ServeDir {
    // ---
    if !config.static_dir.is_dir() {
        tracing::warn!("Static directory {:?} does not exist", config.static_dir);
    }
    ServeDir::new(&config.static_dir)
}
