//! The state store: which SDKs are installed under the root and which one is selected.
//!
//! The filesystem is the only persistent record. A [`Manager`] rebuilds its view
//! by scanning the root when it is created and keeps that view in step with every
//! mutation it performs afterwards.

mod cleanup;
mod install;
mod select;
mod uninstall;

#[cfg(test)]
pub(crate) mod testing;

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use log::{debug, warn};
use crate::config::Config;
use crate::detect::detect_version;
use crate::error::{ManagerError, Result, TransferError};
use crate::http::{HttpClient, HttpTransfer, ReqwestClient, Transfer};
use crate::link::{Linker, default_linker};
use crate::release::ReleaseType;
use crate::resolver::{GoReleaseClient, ReleaseResolver};
use crate::task::Task;
use crate::version::{VersionNumber, insert_sorted};

/// Name of the link pointing at the selected SDK, directly inside the root.
pub const SELECTED_NAME: &str = "go-selected";
/// Installed SDKs live in `<root>/go<version>`.
pub const VERSION_PREFIX: &str = "go";
/// Prefix of the per-install staging directories. Never treated as installations.
pub const STAGING_PREFIX: &str = ".gman-staging-";

/// Everything the manager talks to besides the filesystem under its root.
pub struct Collaborators {
    pub resolver: Box<dyn ReleaseResolver>,
    pub transfer: Box<dyn Transfer>,
    pub linker: Box<dyn Linker>,
    pub task: Task,
}

impl Collaborators {
    /// Collaborators that reach the configured release catalog over HTTPS.
    pub fn online(config: &Config) -> std::result::Result<Self, TransferError> {
        let client: Rc<dyn HttpClient> = Rc::new(ReqwestClient::new()?);
        Ok(Self::with_client(client, config))
    }

    /// Same as [`Collaborators::online`], but over any [`HttpClient`].
    pub fn with_client(client: Rc<dyn HttpClient>, config: &Config) -> Self {
        Self {
            resolver: Box::new(GoReleaseClient::new(
                client.clone(),
                config.release_list_url.clone(),
                config.download_url.clone(),
            )),
            transfer: Box::new(HttpTransfer::new(client)),
            linker: default_linker(),
            task: Task::stdout(),
        }
    }
}

/// One row of [`Manager::list_releases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseListing {
    pub version: VersionNumber,
    pub stable: bool,
    pub installed: bool,
    pub selected: bool,
}

pub struct Manager {
    root: PathBuf,
    installed: Vec<VersionNumber>,
    selected: Option<VersionNumber>,
    resolver: Box<dyn ReleaseResolver>,
    transfer: Box<dyn Transfer>,
    linker: Box<dyn Linker>,
    task: Task,
}

impl Manager {
    /// Opens the root directory and reconstructs the installed and selected state.
    ///
    /// # Errors
    /// - [`ManagerError::Scan`] if the root can't be read.
    /// - [`ManagerError::InconsistentSelection`] if the selection link exists but its
    ///   target does not.
    /// - [`ManagerError::UnidentifiedSelection`] if the selection target exists but its
    ///   version can't be read.
    pub fn new(root: impl Into<PathBuf>, collaborators: Collaborators) -> Result<Self> {
        let root = root.into();
        let (installed, selected) = scan(&root)?;
        debug!(
            "scanned {}: {} installed, selected {:?}",
            root.display(),
            installed.len(),
            selected.as_ref().map(ToString::to_string)
        );
        Ok(Self {
            root,
            installed,
            selected,
            resolver: collaborators.resolver,
            transfer: collaborators.transfer,
            linker: collaborators.linker,
            task: collaborators.task,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Installed versions in ascending order.
    pub fn installed_versions(&self) -> &[VersionNumber] {
        &self.installed
    }

    pub fn selected_version(&self) -> Option<&VersionNumber> {
        self.selected.as_ref()
    }

    pub fn is_installed(&self, version: &VersionNumber) -> bool {
        self.installed.binary_search(version).is_ok()
    }

    /// Where `version` is, or would be, installed.
    pub fn version_directory(&self, version: &VersionNumber) -> PathBuf {
        self.root.join(version_dir_name(version))
    }

    pub fn selected_path(&self) -> PathBuf {
        self.root.join(SELECTED_NAME)
    }

    pub fn resolver(&self) -> &dyn ReleaseResolver {
        self.resolver.as_ref()
    }

    /// The catalog under `filter`, oldest first, annotated with the local state.
    /// Catalog entries with unparsable versions are skipped.
    pub fn list_releases(&self, filter: ReleaseType) -> Result<Vec<ReleaseListing>> {
        let mut listings: Vec<ReleaseListing> = self
            .resolver
            .list_all(filter)?
            .into_iter()
            .filter_map(|release| {
                let version = release.version_number()?;
                Some(ReleaseListing {
                    installed: self.is_installed(&version),
                    selected: self.selected.as_ref() == Some(&version),
                    stable: release.stable,
                    version,
                })
            })
            .collect();
        listings.sort_by(|a, b| a.version.cmp(&b.version));
        listings.dedup_by(|a, b| a.version == b.version);
        Ok(listings)
    }
}

fn version_dir_name(version: &VersionNumber) -> String {
    format!("{VERSION_PREFIX}{}", version.canonical_name())
}

fn scan(root: &Path) -> Result<(Vec<VersionNumber>, Option<VersionNumber>)> {
    let scan_error = |source: std::io::Error| ManagerError::Scan {
        root: root.to_path_buf(),
        source,
    };

    let mut installed = Vec::new();
    let mut selected = None;
    for entry in fs::read_dir(root).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(STAGING_PREFIX) {
            continue;
        }
        let file_type = entry.file_type().map_err(scan_error)?;
        if !file_type.is_dir() && !file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        if name == SELECTED_NAME {
            fs::metadata(&path).map_err(|source| ManagerError::InconsistentSelection {
                link: path.clone(),
                source,
            })?;
            let version = detect_version(&path).map_err(|source| ManagerError::UnidentifiedSelection {
                link: path.clone(),
                source,
            })?;
            selected = Some(version);
            continue;
        }

        match detect_version(&path) {
            Ok(version) => {
                if name != version_dir_name(&version) {
                    warn!("{} contains {version}, expected it in {}", path.display(), version_dir_name(&version));
                }
                if !insert_sorted(&mut installed, version) {
                    warn!("{} duplicates an installed version", path.display());
                }
            }
            Err(e) => debug!("skipping {}: {e}", path.display()),
        }
    }

    if let Some(version) = &selected {
        if installed.binary_search(version).is_err() {
            warn!("selected version {version} is not among the installed versions");
        }
    }
    Ok((installed, selected))
}
