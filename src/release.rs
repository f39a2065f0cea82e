use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::error::{ManagerError, Result};
use crate::util::format_hash;
use crate::version::VersionNumber;

/// Which releases a catalog query should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Only the releases the catalog currently marks as stable.
    Stable,
    /// Every release ever published, including pre-releases.
    All,
}

impl ReleaseType {
    /// Maps an "include unstable releases" switch to a filter.
    pub fn select(unstable: bool) -> Self {
        if unstable {
            Self::All
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nature of a file distributed with a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Source archive of the SDK.
    Source,
    /// Binary distribution archive.
    Archive,
    /// Platform installer executable.
    Installer,
}

/// A released Go version as listed by the download catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// The version name, e.g. `go1.15.2`.
    pub version: String,
    /// Whether the catalog currently considers the release stable.
    pub stable: bool,
    /// All files distributed with the release.
    #[serde(default)]
    pub files: Vec<ReleaseFile>,
}

impl Release {
    /// Parses the release's version name, `None` if the catalog entry is malformed.
    pub fn version_number(&self) -> Option<VersionNumber> {
        self.version.parse().ok()
    }

    /// Returns all files matching the platform and kind.
    /// Files without an OS or architecture match any OS or architecture.
    pub fn find_files(&self, os: &str, arch: &str, kind: FileKind) -> Vec<&ReleaseFile> {
        self.files
            .iter()
            .filter(|file| file.os.is_empty() || file.os == os)
            .filter(|file| file.arch.is_empty() || file.arch == arch)
            .filter(|file| file.kind == kind)
            .collect()
    }
}

/// A single downloadable artifact of a [`Release`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFile {
    /// File name on the download mirror, including the extension.
    pub filename: String,
    /// Target operating system, empty if not applicable.
    #[serde(default)]
    pub os: String,
    /// Target architecture, empty if not applicable.
    #[serde(default)]
    pub arch: String,
    /// Version name of the owning release.
    pub version: String,
    /// Hex encoded SHA-256 of the file.
    pub sha256: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    pub kind: FileKind,
}

impl ReleaseFile {
    /// The URL the file can be downloaded from, relative to `download_base`.
    pub fn url(&self, download_base: &str) -> String {
        format!("{}/{}", download_base.trim_end_matches('/'), self.filename)
    }

    /// Verifies the file at `path` against the expected size and SHA-256 digest.
    ///
    /// The file is read back from disk, so this never relies on whatever the
    /// transfer reported.
    pub fn verify(&self, path: &Path) -> Result<()> {
        let actual_size = std::fs::metadata(path)
            .map_err(|e| ManagerError::io(format!("could not stat {}", path.display()), e))?
            .len();
        if self.size > 0 && actual_size != self.size {
            return Err(ManagerError::SizeMismatch {
                path: path.to_path_buf(),
                expected: self.size,
                actual: actual_size,
            });
        }

        let actual = sha256_file(path)?;
        let expected = format_hash(&self.sha256).to_ascii_lowercase();
        if actual != expected {
            return Err(ManagerError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Hex encoded SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| ManagerError::io(format!("could not open {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|e| ManagerError::io(format!("could not read {}", path.display()), e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
