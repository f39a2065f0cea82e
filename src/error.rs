use std::path::PathBuf;
use thiserror::Error;
use crate::release::ReleaseType;
use crate::version::VersionNumber;

/// Result type used throughout the manager.
pub type Result<T, E = ManagerError> = std::result::Result<T, E>;

/// Coarse classification of a [`ManagerError`].
///
/// Callers that only care about *what went wrong* (e.g. to choose an exit code)
/// match on this instead of on the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Release or artifact not found, or ambiguous.
    Resolution,
    /// Network or IO failure while fetching bytes.
    Transfer,
    /// Checksum or size mismatch of a downloaded artifact.
    Integrity,
    /// Archive malformed or extraction IO failure.
    Extraction,
    /// Extracted tree reports a different version than requested.
    Verification,
    /// Already installed, not installed, nothing selected, link already present.
    StateConflict,
    /// Platform-level link creation or removal failure.
    Link,
    /// Root directory unreadable or selection inconsistent during the scan.
    Scan,
    /// Any other filesystem failure.
    Io,
}

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("release {version} is not available ({filter} releases)")]
    ReleaseNotFound {
        version: VersionNumber,
        filter: ReleaseType,
    },

    #[error("no {filter} releases are available")]
    NoReleases { filter: ReleaseType },

    #[error("release {version} has {count} archives for {os}-{arch}, expected exactly one")]
    ArtifactNotFound {
        version: VersionNumber,
        os: String,
        arch: String,
        count: usize,
    },

    #[error("release file name {filename:?} is not a plain file name")]
    InvalidArtifactName { filename: String },

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("downloaded file {} could not be verified: expected sha256 {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("downloaded file {} has {actual} bytes, expected {expected}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("could not extract {}: {details}", archive.display())]
    Extraction { archive: PathBuf, details: String },

    #[error("could not verify installation of {expected}: {reason}")]
    Verification {
        expected: VersionNumber,
        reason: String,
    },

    #[error("version {0} is already installed")]
    AlreadyInstalled(VersionNumber),

    #[error("version {0} is not installed")]
    NotInstalled(VersionNumber),

    #[error("could not unselect because no version is selected")]
    NothingSelected,

    #[error("could not link {} to {}: {source}", source_dir.display(), link.display())]
    LinkCreation {
        source_dir: PathBuf,
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not unlink {}: {source}", link.display())]
    Unlink {
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read root directory {}: {source}", root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("selection {} points to a missing or unreadable target: {source}", link.display())]
    InconsistentSelection {
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("selection {} points to a directory that is not a recognizable SDK: {source}", link.display())]
    UnidentifiedSelection {
        link: PathBuf,
        #[source]
        source: DetectionError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReleaseNotFound { .. }
            | Self::NoReleases { .. }
            | Self::ArtifactNotFound { .. }
            | Self::InvalidArtifactName { .. } => {
                ErrorKind::Resolution
            }
            Self::Transfer(_) => ErrorKind::Transfer,
            Self::ChecksumMismatch { .. } | Self::SizeMismatch { .. } => ErrorKind::Integrity,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Verification { .. } => ErrorKind::Verification,
            Self::AlreadyInstalled(_) | Self::NotInstalled(_) | Self::NothingSelected => {
                ErrorKind::StateConflict
            }
            Self::LinkCreation { .. } | Self::Unlink { .. } => ErrorKind::Link,
            Self::Scan { .. } | Self::InconsistentSelection { .. } | Self::UnidentifiedSelection { .. } => {
                ErrorKind::Scan
            }
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failures of the HTTP transfer primitive.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("request to {url} failed: {details}")]
    Request { url: String, details: String },

    #[error("unexpected status {status} while retrieving {url}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {details}")]
    Decode { url: String, details: String },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a directory could not be identified as an SDK installation.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("no version marker or go binary found in {}", root.display())]
    MissingMarker { root: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected version output {output:?}")]
    UnexpectedOutput { output: String },

    #[error(transparent)]
    Parse(#[from] VersionParseError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,

    #[error("invalid version {input:?}, expected dot-separated numbers like 1.15.2")]
    InvalidFormat { input: String },

    #[error("version segment {segment:?} in {input:?} is out of range")]
    SegmentOutOfRange { input: String, segment: String },
}
