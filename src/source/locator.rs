//! Resource location against an ordered list of search roots.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ResourceLocator {
    roots: Vec<PathBuf>,
}

impl ResourceLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Locator searching only the current working directory.
    pub fn current_dir() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }

    /// Find a resource by name.
    ///
    /// Absolute names are used as they are. Relative names are looked up next to
    /// `relative_to` first (the directory of an including file), then in each
    /// search root in order. Returns `None` when nothing exists.
    pub fn locate(&self, name: &str, relative_to: Option<&Path>) -> Option<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }

        relative_to
            .into_iter()
            .chain(self.roots.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(candidate))
            .find(|path| path.is_file())
    }
}
