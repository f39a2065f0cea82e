use std::fs::File;
use std::path::Path;
use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;
use zip::ZipArchive;
use crate::error::{ManagerError, Result};
use crate::util::path_exists;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    TarGz,
    Zip,
}

fn detect_format(archive: &Path) -> Option<ArchiveFormat> {
    let name = archive.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(ArchiveFormat::TarGz)
    } else if name.ends_with(".zip") {
        Some(ArchiveFormat::Zip)
    } else {
        None
    }
}

/// Extracts a `.tar.gz`, `.tgz` or `.zip` archive into `destination`.
///
/// If `destination` already exists and `overwrite` is false, nothing happens and
/// `false` is returned. With `overwrite`, the existing destination is removed first.
pub fn extract(archive: &Path, destination: &Path, overwrite: bool) -> Result<bool> {
    if path_exists(destination) {
        if !overwrite {
            return Ok(false);
        }
        std::fs::remove_dir_all(destination)
            .map_err(|e| extraction_error(archive, format!("could not clear {}: {e}", destination.display())))?;
    }

    let format = detect_format(archive)
        .ok_or_else(|| extraction_error(archive, "unsupported archive format".to_string()))?;
    let file = File::open(archive).map_err(|e| extraction_error(archive, e.to_string()))?;
    std::fs::create_dir_all(destination).map_err(|e| extraction_error(archive, e.to_string()))?;

    debug!("extracting {} ({format:?}) into {}", archive.display(), destination.display());
    match format {
        ArchiveFormat::TarGz => {
            let mut tar = Archive::new(GzDecoder::new(file));
            tar.set_preserve_permissions(true);
            tar.unpack(destination)
                .map_err(|e| extraction_error(archive, e.to_string()))?;
        }
        ArchiveFormat::Zip => {
            let mut zip = ZipArchive::new(file).map_err(|e| extraction_error(archive, e.to_string()))?;
            zip.extract(destination)
                .map_err(|e| extraction_error(archive, e.to_string()))?;
        }
    }
    Ok(true)
}

fn extraction_error(archive: &Path, details: String) -> ManagerError {
    ManagerError::Extraction {
        archive: archive.to_path_buf(),
        details,
    }
}
