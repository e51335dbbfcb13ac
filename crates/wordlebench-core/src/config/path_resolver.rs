use std::path::{Component, Path, PathBuf};

/// Rebases paths written in a config file onto that file's directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config_path: &Path) -> Self {
        Self {
            config_dir: config_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    /// Rewrites `s` in place when [`PathResolver::resolve`] yields a new path.
    pub fn resolve_str(&self, s: &mut String) {
        if let Some(resolved) = self.resolve(s) {
            *s = resolved;
        }
    }

    /// `None` for blank and absolute paths, which are used as written.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() || Path::new(raw).is_absolute() {
            return None;
        }
        let joined = lexical_normalize(&self.config_dir.join(raw));
        Some(joined.to_string_lossy().into_owned())
    }
}

/// Drops `.` and folds `..` into its parent without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    path.components().fold(PathBuf::new(), |mut acc, c| {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                if acc.file_name().is_some() {
                    acc.pop();
                } else if !acc.has_root() {
                    acc.push("..");
                }
            }
            other => acc.push(other),
        }
        acc
    })
}
