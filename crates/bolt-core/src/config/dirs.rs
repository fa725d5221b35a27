use directories::ProjectDirs;
use std::path::PathBuf;

/// Application directories following the XDG layout
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/bolt)
    pub config: PathBuf,

    /// Config file path
    pub config_file: PathBuf,
}

impl Directories {
    /// Resolve the standard XDG paths, or `None` when no home directory is known.
    #[must_use]
    pub fn new() -> Option<Self> {
        let project = ProjectDirs::from("", "", "bolt")?;
        Some(Self::with_base(project.config_dir().to_path_buf()))
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            config: base,
        }
    }

    /// Ensure the config directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_exists(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_sets_all_paths() {
        let base = PathBuf::from("/tmp/test-bolt");
        let dirs = Directories::with_base(base.clone());

        assert_eq!(dirs.config, base);
        assert_eq!(dirs.config_file, base.join("config.json"));
    }

    #[test]
    fn test_ensure_exists_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base = temp_dir.path().join("bolt-test-subdir");
        let dirs = Directories::with_base(base.clone());

        assert!(!base.exists());
        dirs.ensure_exists().unwrap();
        dirs.ensure_exists().unwrap();
        assert!(base.exists());
    }

    #[test]
    fn test_new_returns_bolt_paths() {
        if let Some(dirs) = Directories::new() {
            assert!(dirs.config.to_string_lossy().contains("bolt"));
            assert!(dirs.config_file.to_string_lossy().ends_with("config.json"));
        }
    }
}
