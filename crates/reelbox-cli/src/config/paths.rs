//! Config and data locations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Config file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Per-application directory name under the config root.
const APP_DIR_NAME: &str = "reelbox";

/// Config file and data directory for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    config_file: PathBuf,
    data_dir: Option<PathBuf>,
}

impl AppPaths {
    /// Resolves paths from `--dir` and the environment.
    ///
    /// - `--dir` holds both `config.toml` and the database.
    /// - Otherwise the config is `$XDG_CONFIG_HOME/reelbox/config.toml`
    ///   (default `~/.config/reelbox/config.toml`) and the database uses the
    ///   default data location of [`reelbox_db::resolve_db_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if no config root can be determined (when `dir` is `None`).
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        Self::resolve_from(
            dir,
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
    }

    fn resolve_from(
        dir: Option<&Path>,
        xdg_config_home: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(d) = dir {
            return Ok(Self {
                config_file: d.join(CONFIG_FILE_NAME),
                data_dir: Some(d.to_path_buf()),
            });
        }

        // XDG paths must be absolute; relative values are ignored.
        let config_root = match xdg_config_home.filter(|p| p.is_absolute()) {
            Some(root) => root,
            None => home
                .context("HOME environment variable is not set")?
                .join(".config"),
        };

        Ok(Self {
            config_file: config_root.join(APP_DIR_NAME).join(CONFIG_FILE_NAME),
            data_dir: None,
        })
    }

    /// Path of `config.toml`.
    #[must_use]
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Data directory override, `None` for the default location.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Database file the store opens.
    ///
    /// # Errors
    ///
    /// Returns an error if the default data location cannot be determined.
    pub fn db_path(&self) -> Result<PathBuf> {
        reelbox_db::resolve_db_path(self.data_dir())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_dir_holds_config_and_database() {
        // Arrange
        let dir = PathBuf::from("/tmp/reelbox-home");

        // Act
        let paths = AppPaths::resolve_from(Some(&dir), None, None).unwrap();

        // Assert
        assert_eq!(
            paths.config_file(),
            Path::new("/tmp/reelbox-home/config.toml")
        );
        assert_eq!(
            paths.db_path().unwrap(),
            PathBuf::from("/tmp/reelbox-home/reelbox.db")
        );
    }

    #[test]
    fn test_xdg_config_home_wins_over_home() {
        // Arrange
        let xdg = Some(PathBuf::from("/xdg/config"));
        let home = Some(PathBuf::from("/home/ada"));

        // Act
        let paths = AppPaths::resolve_from(None, xdg, home).unwrap();

        // Assert
        assert_eq!(
            paths.config_file(),
            Path::new("/xdg/config/reelbox/config.toml")
        );
        assert!(paths.data_dir().is_none());
    }

    #[test]
    fn test_relative_xdg_falls_back_to_home() {
        // Arrange
        let xdg = Some(PathBuf::from("relative/config"));
        let home = Some(PathBuf::from("/home/ada"));

        // Act
        let paths = AppPaths::resolve_from(None, xdg, home).unwrap();

        // Assert
        assert_eq!(
            paths.config_file(),
            Path::new("/home/ada/.config/reelbox/config.toml")
        );
    }

    #[test]
    fn test_missing_home_is_an_error() {
        // Arrange & Act
        let result = AppPaths::resolve_from(None, None, None);

        // Assert
        assert!(result.is_err());
    }
}
