//! Figuring out which Go version lives in a directory.

use std::path::{Path, PathBuf};
use std::process::Command;
use log::trace;
use crate::error::DetectionError;
use crate::util::is_executable;
use crate::version::VersionNumber;

/// Name of the plain-text marker at the root of every Go SDK tree.
pub const VERSION_MARKER: &str = "VERSION";

#[cfg(windows)]
const GO_BINARY: &str = "go.exe";
#[cfg(not(windows))]
const GO_BINARY: &str = "go";

/// Detects the version of the SDK rooted at `sdk_root`.
///
/// The `VERSION` marker is preferred; if it is absent the SDK's own `go version`
/// is asked. Directories that are not SDKs at all produce an error, never a panic,
/// so callers can use this as a filter.
pub fn detect_version(sdk_root: &Path) -> Result<VersionNumber, DetectionError> {
    let marker = sdk_root.join(VERSION_MARKER);
    if marker.is_file() {
        return read_marker(&marker);
    }

    let binary = go_binary(sdk_root);
    if is_executable(&binary) {
        return ask_binary(&binary);
    }

    Err(DetectionError::MissingMarker {
        root: sdk_root.to_path_buf(),
    })
}

fn go_binary(sdk_root: &Path) -> PathBuf {
    sdk_root.join("bin").join(GO_BINARY)
}

fn read_marker(marker: &Path) -> Result<VersionNumber, DetectionError> {
    let content = std::fs::read_to_string(marker).map_err(|source| DetectionError::Unreadable {
        path: marker.to_path_buf(),
        source,
    })?;
    let first_line = content.lines().next().unwrap_or_default();
    trace!("{} reads {first_line:?}", marker.display());
    Ok(first_line.parse()?)
}

fn ask_binary(binary: &Path) -> Result<VersionNumber, DetectionError> {
    let output = Command::new(binary)
        .arg("version")
        .output()
        .map_err(|source| DetectionError::Unreadable {
            path: binary.to_path_buf(),
            source,
        })?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        return Err(DetectionError::UnexpectedOutput {
            output: stdout.trim().to_string(),
        });
    }
    parse_version_output(&stdout)
}

/// Parses `go version go1.15.2 linux/amd64`.
pub fn parse_version_output(output: &str) -> Result<VersionNumber, DetectionError> {
    let unexpected = || DetectionError::UnexpectedOutput {
        output: output.trim().to_string(),
    };
    let mut words = output.split_whitespace();
    if words.next() != Some("go") || words.next() != Some("version") {
        return Err(unexpected());
    }
    let version = words.next().ok_or_else(unexpected)?;
    let _platform = words.next().ok_or_else(unexpected)?;
    Ok(version.parse()?)
}
