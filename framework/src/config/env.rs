use std::path::{Path, PathBuf};

/// Load environment variables from `.env` files under `project_root`
///
/// `.env.local` is read before `.env`. `dotenvy` never overwrites a variable
/// that is already set, so the real environment wins over both files and
/// `.env.local` wins over `.env`.
///
/// Returns the files that were found and loaded.
pub fn load_dotenv(project_root: &Path) -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    for name in [".env.local", ".env"] {
        let path = project_root.join(name);
        match dotenvy::from_path(&path) {
            Ok(()) => loaded.push(path),
            Err(err) if err.not_found() => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load env file")
            }
        }
    }

    loaded
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use wirekit::config::env;
///
/// let depth: usize = env("CONTAINER_MAX_RESOLVE_DEPTH", 64);
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_optional(key).unwrap_or(default)
}

/// Get an environment variable, `None` when unset or unparsable
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_falls_back_to_default() {
        let value: usize = env("WIREKIT_TEST_SURELY_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
        assert_eq!(env_optional::<usize>("WIREKIT_TEST_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn test_load_dotenv_ignores_missing_files() {
        let dir = std::env::temp_dir().join("wirekit-no-env-files-here");
        assert!(load_dotenv(&dir).is_empty());
    }
}
