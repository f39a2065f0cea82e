use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use regex::Regex;
use crate::error::{ManagerError, Result};
use crate::manager::{Manager, VERSION_PREFIX};
use crate::util::path_exists;
use crate::version::VersionNumber;

/// `go1.15.2.linux-amd64.tar.gz`, `go1.16rc1.src.tar.gz`, ...
static ARCHIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{VERSION_PREFIX}(\d+(?:\.\d+)*(?:[a-z]+\d*)?)\.[a-z]")).expect("valid archive name regex")
});

/// The version a downloaded SDK archive name refers to.
fn archive_version(file_name: &str) -> Option<VersionNumber> {
    let captures = ARCHIVE_NAME.captures(file_name)?;
    captures[1].parse().ok()
}

impl Manager {
    /// Deletes the installation of `version`, unselecting it first if needed.
    /// Archives of the same version left directly in the root are removed too.
    ///
    /// # Errors
    /// - [`ManagerError::NotInstalled`] if the version directory doesn't exist.
    ///   Nothing is changed in that case, not even the selection.
    /// - Link and IO errors.
    pub fn uninstall(&mut self, version: &VersionNumber) -> Result<()> {
        self.task.print(format!("Uninstalling {version}"));
        let task = self.task.step();

        let version_dir = self.version_directory(version);
        if !path_exists(&version_dir) {
            return Err(ManagerError::NotInstalled(version.clone()));
        }
        if self.selected.as_ref() == Some(version) {
            self.unselect_with(&task)?;
        }

        task.track(
            format!("Deleting installation directory: {}", version_dir.display()),
            || {
                fs::remove_dir_all(&version_dir)
                    .map_err(|e| ManagerError::io(format!("could not delete {}", version_dir.display()), e))
            },
        )?;
        self.installed.retain(|installed| installed != version);

        for archive in self.residual_archives(version)? {
            task.track(format!("Removing SDK archive: {}", archive.display()), || {
                fs::remove_file(&archive)
                    .map_err(|e| ManagerError::io(format!("could not delete {}", archive.display()), e))
            })?;
        }
        Ok(())
    }

    /// Uninstalls every installed version, stopping at the first failure.
    pub fn uninstall_all(&mut self) -> Result<()> {
        let versions = self.installed.clone();
        if versions.is_empty() {
            self.task.print("No versions installed");
        }
        for version in &versions {
            self.uninstall(version)?;
        }
        Ok(())
    }

    fn residual_archives(&self, version: &VersionNumber) -> Result<Vec<PathBuf>> {
        let read_error = |e: std::io::Error| ManagerError::io(format!("could not read {}", self.root.display()), e);
        let mut archives = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            if !entry.file_type().map_err(read_error)?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if archive_version(&name.to_string_lossy()).as_ref() == Some(version) {
                archives.push(entry.path());
            }
        }
        archives.sort();
        Ok(archives)
    }
}
