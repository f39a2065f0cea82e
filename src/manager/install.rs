use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, warn};
use crate::detect::detect_version;
use crate::error::{ManagerError, Result};
use crate::manager::{Manager, STAGING_PREFIX};
use crate::release::{FileKind, ReleaseFile, ReleaseType};
use crate::task::Task;
use crate::util::path_exists;
use crate::version::{VersionNumber, insert_sorted};

impl Manager {
    /// Downloads, verifies and installs `version` for `os`/`arch`.
    ///
    /// Everything happens in a staging directory inside the root. The version
    /// directory only appears, through a single rename, once the archive digest and
    /// the extracted tree's own version have both been checked. On any failure the
    /// root is left as it was.
    ///
    /// # Errors
    /// - [`ManagerError::ReleaseNotFound`] if `filter` doesn't list `version`.
    /// - [`ManagerError::ArtifactNotFound`] unless exactly one archive matches the platform.
    /// - [`ManagerError::AlreadyInstalled`] if the version directory already exists.
    /// - Transfer, integrity, extraction and verification errors of the pipeline.
    pub fn install(&mut self, version: &VersionNumber, os: &str, arch: &str, filter: ReleaseType) -> Result<()> {
        self.task.print(format!("Installing {version} {os}-{arch}:"));
        let task = self.task.step();

        let release = self
            .resolver
            .get_for_version(filter, version)?
            .ok_or_else(|| ManagerError::ReleaseNotFound {
                version: version.clone(),
                filter,
            })?;
        let files = release.find_files(os, arch, FileKind::Archive);
        let [file] = files.as_slice() else {
            return Err(ManagerError::ArtifactNotFound {
                version: version.clone(),
                os: os.to_string(),
                arch: arch.to_string(),
                count: files.len(),
            });
        };

        if !is_plain_file_name(&file.filename) {
            return Err(ManagerError::InvalidArtifactName {
                filename: file.filename.clone(),
            });
        }

        let destination = self.version_directory(version);
        if path_exists(&destination) {
            return Err(ManagerError::AlreadyInstalled(version.clone()));
        }

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(|e| ManagerError::io(format!("could not create a staging directory in {}", self.root.display()), e))?;
        debug!("staging {version} in {}", staging.path().display());

        let result = self.stage_and_commit(&task, version, file, staging.path(), &destination);
        let staging_path = staging.path().to_path_buf();
        if let Err(e) = staging.close() {
            warn!("could not remove staging directory {}: {e}", staging_path.display());
        }
        result?;

        insert_sorted(&mut self.installed, version.clone());
        task.print(format!("Installed {version} to {}", destination.display()));
        Ok(())
    }

    /// Installs the newest release visible under `filter` and returns its version.
    pub fn install_latest(&mut self, os: &str, arch: &str, filter: ReleaseType) -> Result<VersionNumber> {
        let release = self.resolver.get_latest(filter)?;
        let version = release.version_number().ok_or_else(|| ManagerError::NoReleases { filter })?;
        self.install(&version, os, arch, filter)?;
        Ok(version)
    }

    fn stage_and_commit(
        &self,
        task: &Task,
        version: &VersionNumber,
        file: &ReleaseFile,
        staging: &Path,
        destination: &Path,
    ) -> Result<()> {
        let archive = staging.join(&file.filename);
        let url = self.resolver.file_url(file);
        task.print(format!("Downloading: {url}"));
        self.transfer.download_file(&url, &archive, true)?;

        task.print(format!("Verifying integrity: {}", file.sha256));
        file.verify(&archive)?;

        task.print(format!("Extracting: {}", file.filename));
        let extracted = staging.join("extract");
        self.transfer.extract_archive(&archive, &extracted, true)?;
        let sdk_root = sdk_root_in(&extracted);

        task.print(format!("Verifying installation: {version}"));
        let detected = detect_version(&sdk_root).map_err(|e| ManagerError::Verification {
            expected: version.clone(),
            reason: e.to_string(),
        })?;
        if detected != *version {
            return Err(ManagerError::Verification {
                expected: version.clone(),
                reason: format!("the extracted SDK reports {detected}"),
            });
        }

        task.print(format!("Committing: {}", destination.display()));
        fs::rename(&sdk_root, destination).map_err(|e| {
            ManagerError::io(
                format!("could not move {} to {}", sdk_root.display(), destination.display()),
                e,
            )
        })
    }
}

/// Catalog file names end up inside the staging directory, so they must not
/// contain separators or name a parent directory.
fn is_plain_file_name(filename: &str) -> bool {
    !filename.contains(['/', '\\'])
        && Path::new(filename).file_name().is_some_and(|name| name == filename)
}

/// Official archives wrap the tree in a top-level `go/` directory; others may not.
fn sdk_root_in(extracted: &Path) -> PathBuf {
    let nested = extracted.join("go");
    if nested.is_dir() { nested } else { extracted.to_path_buf() }
}
