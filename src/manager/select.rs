use crate::error::{ManagerError, Result};
use crate::manager::{Manager, SELECTED_NAME};
use crate::task::Task;
use crate::version::{VersionNumber, insert_sorted};

impl Manager {
    /// Points the selection link at the installed `version`, replacing any previous selection.
    ///
    /// # Errors
    /// - [`ManagerError::NotInstalled`] if the version directory doesn't exist.
    /// - Link errors; if removing the previous link fails, no new link is created.
    pub fn select(&mut self, version: &VersionNumber) -> Result<()> {
        self.task.print(format!("Selecting version as active: {version}"));
        let task = self.task.step();

        let version_dir = self.version_directory(version);
        if !version_dir.is_dir() {
            return Err(ManagerError::NotInstalled(version.clone()));
        }
        if self.selected.is_some() {
            self.unselect_with(&task)?;
        }

        let link = self.selected_path();
        task.print(format!("Linking {} to {SELECTED_NAME} ({})", version_dir.display(), self.linker.name()));
        self.linker
            .create_link(&version_dir, &link)
            .map_err(|source| ManagerError::LinkCreation {
                source_dir: version_dir,
                link,
                source,
            })?;
        self.selected = Some(version.clone());
        insert_sorted(&mut self.installed, version.clone());
        Ok(())
    }

    /// Removes the selection link.
    ///
    /// # Errors
    /// [`ManagerError::NothingSelected`] if no version is selected.
    pub fn unselect(&mut self) -> Result<()> {
        self.task.print("Unselecting current selected version");
        let task = self.task.step();
        self.unselect_with(&task)
    }

    pub(crate) fn unselect_with(&mut self, task: &Task) -> Result<()> {
        if self.selected.is_none() {
            return Err(ManagerError::NothingSelected);
        }
        let link = self.selected_path();
        task.print(format!("Unlinking directory: {}", link.display()));
        self.linker
            .remove_link(&link)
            .map_err(|source| ManagerError::Unlink { link, source })?;
        self.selected = None;
        Ok(())
    }
}
