use std::collections::HashSet;
use std::fs;
use log::warn;
use crate::error::{ManagerError, Result};
use crate::manager::{Manager, STAGING_PREFIX};
use crate::release::{Release, ReleaseType};
use crate::task::Task;
use crate::version::VersionNumber;

impl Manager {
    /// Uninstalls every installed version the catalog no longer lists as stable,
    /// then removes staging directories left behind by interrupted installs.
    ///
    /// Nothing is removed if the stable list can't be fetched. Removal stops at
    /// the first failed uninstall.
    pub fn cleanup(&mut self) -> Result<()> {
        self.task.print("Scanning for non-stable versions");
        let task = self.task.step();

        let stable: HashSet<VersionNumber> = self
            .resolver
            .list_all(ReleaseType::Stable)?
            .iter()
            .filter_map(Release::version_number)
            .collect();
        let outdated: Vec<VersionNumber> = self
            .installed
            .iter()
            .filter(|version| !stable.contains(*version))
            .cloned()
            .collect();

        if outdated.is_empty() {
            task.print("Nothing to remove");
        }
        for version in &outdated {
            task.print(format!("Marked {version} for removal"));
        }
        for version in &outdated {
            self.uninstall(version)?;
        }

        self.sweep_staging(&task)
    }

    fn sweep_staging(&self, task: &Task) -> Result<()> {
        let read_error = |e: std::io::Error| ManagerError::io(format!("could not read {}", self.root.display()), e);
        for entry in fs::read_dir(&self.root).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
                continue;
            }
            let path = entry.path();
            task.print(format!("Removing staging leftovers: {}", path.display()));
            let removed = if entry.file_type().map_err(read_error)?.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                warn!("could not remove {}: {e}", path.display());
            }
        }
        Ok(())
    }
}
