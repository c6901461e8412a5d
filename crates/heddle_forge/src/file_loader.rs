// SPDX-License-Identifier: Apache-2.0

//! Template file loaders.

use std::path::{Path, PathBuf};
use std::{fs, io};

use walkdir::WalkDir;

use crate::error::Error;
use crate::error::Error::TargetNotSupported;

/// An abstraction for loading template files from a target directory.
pub trait FileLoader: Send + Sync {
    /// Returns the root path of the loader, for diagnostics.
    fn root(&self) -> &Path;

    /// Returns all files under the loader's root, as root-relative paths.
    fn all_files(&self) -> Vec<PathBuf>;

    /// Loads the content of a file by its root-relative name. Returns
    /// `Ok(None)` when the file does not exist, matching the loader
    /// semantics of the template engine.
    fn load_file(&self, name: &str) -> Result<Option<String>, Error>;
}

/// A loader reading template files from the file system.
pub struct FileSystemFileLoader {
    dir: PathBuf,
}

impl FileSystemFileLoader {
    /// Creates a file system loader rooted at `<templates_dir>/<target>`.
    ///
    /// # Errors
    ///
    /// Fails when the target directory does not exist or escapes the
    /// templates root.
    pub fn try_new(templates_dir: PathBuf, target: &str) -> Result<Self, Error> {
        let dir = safe_join(&templates_dir, target).map_err(|e| TargetNotSupported {
            root_path: templates_dir.to_string_lossy().to_string(),
            target: target.to_owned(),
            error: e,
        })?;
        Ok(Self { dir })
    }
}

impl FileLoader for FileSystemFileLoader {
    fn root(&self) -> &Path {
        self.dir.as_path()
    }

    fn all_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .map(|entry| {
                entry
                    .into_path()
                    .strip_prefix(&self.dir)
                    .expect("walked entries always live under the loader root")
                    .to_owned()
            })
            .collect()
    }

    fn load_file(&self, name: &str) -> Result<Option<String>, Error> {
        let Ok(path) = safe_join(&self.dir, name) else {
            return Ok(None);
        };
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::FileLoaderError {
                file: path,
                error: err.to_string(),
            }),
        }
    }
}

// Combines a root path and a file name, ensuring the combined path stays
// under the root.
fn safe_join(root: &Path, name: &str) -> Result<PathBuf, String> {
    let combined = root.join(name);
    let canonical_root = root
        .canonicalize()
        .map_err(|e| format!("failed to canonicalize root path: {e}"))?;
    let canonical_combined = combined
        .canonicalize()
        .map_err(|e| format!("failed to canonicalize `{}`: {e}", combined.display()))?;
    if canonical_combined.starts_with(&canonical_root) {
        Ok(canonical_combined)
    } else {
        Err(format!(
            "`{}` is not under `{}`",
            canonical_combined.display(),
            canonical_root.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_lists_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rust");
        fs::create_dir_all(target.join("sub")).unwrap();
        fs::write(target.join("a.j2"), "A").unwrap();
        fs::write(target.join("sub/b.j2"), "B").unwrap();

        let loader = FileSystemFileLoader::try_new(dir.path().to_path_buf(), "rust").unwrap();
        let files = loader.all_files();
        assert_eq!(files, vec![PathBuf::from("a.j2"), PathBuf::from("sub/b.j2")]);
        assert_eq!(loader.load_file("a.j2").unwrap().as_deref(), Some("A"));
        assert_eq!(loader.load_file("missing.j2").unwrap(), None);
    }

    #[test]
    fn test_unknown_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileSystemFileLoader::try_new(dir.path().to_path_buf(), "ghost").is_err());
    }

    #[test]
    fn test_escaping_name_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rust");
        fs::create_dir_all(&target).unwrap();
        fs::write(dir.path().join("secret.txt"), "S").unwrap();
        let loader = FileSystemFileLoader::try_new(dir.path().to_path_buf(), "rust").unwrap();
        assert_eq!(loader.load_file("../secret.txt").unwrap(), None);
    }
}
