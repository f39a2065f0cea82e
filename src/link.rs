use std::io;
use std::path::Path;
use walkdir::WalkDir;
use crate::util::path_exists;

/// Creates and removes the filesystem indirection that marks the selected SDK.
///
/// The manager never cares which flavour of link it gets, it only relies on
/// these two guarantees:
/// - `create_link` fails if anything already exists at `link`.
/// - `remove_link` fails if nothing exists at `link`.
pub trait Linker {
    fn create_link(&self, source: &Path, link: &Path) -> io::Result<()>;
    fn remove_link(&self, link: &Path) -> io::Result<()>;
    fn name(&self) -> &'static str;
}

/// Picks the best available linker for this host.
///
/// On Unix this is always a symlink. On Windows, creating symlinks needs
/// elevated privileges or developer mode, so a junction is used when a test
/// symlink cannot be created, and a plain copy when junctions fail as well.
pub fn default_linker() -> Box<dyn Linker> {
    #[cfg(windows)]
    {
        choose_linker(can_symlink(), can_junction())
    }
    #[cfg(not(windows))]
    {
        choose_linker(true, false)
    }
}

fn choose_linker(can_symlink: bool, can_junction: bool) -> Box<dyn Linker> {
    if can_symlink {
        return Box::new(SymlinkLinker);
    }
    if can_junction {
        #[cfg(windows)]
        {
            log::debug!("symlinks unavailable, falling back to junctions");
            return Box::new(JunctionLinker);
        }
    }
    log::warn!("no link type available, selected versions will be copied");
    Box::new(CopyLinker)
}

#[cfg(windows)]
fn can_symlink() -> bool {
    let Ok(scratch) = tempfile::tempdir() else {
        return false;
    };
    let target = scratch.path().join("target");
    let link = scratch.path().join("link");
    std::fs::create_dir(&target).is_ok() && std::os::windows::fs::symlink_dir(&target, &link).is_ok()
}

#[cfg(windows)]
fn can_junction() -> bool {
    let Ok(scratch) = tempfile::tempdir() else {
        return false;
    };
    let target = scratch.path().join("target");
    std::fs::create_dir(&target).is_ok() && JunctionLinker.create_link(&target, &scratch.path().join("link")).is_ok()
}

fn ensure_vacant(link: &Path) -> io::Result<()> {
    if path_exists(link) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{}: file or directory already exists", link.display()),
        ));
    }
    Ok(())
}

/// A true symbolic link.
pub struct SymlinkLinker;

impl Linker for SymlinkLinker {
    fn create_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        ensure_vacant(link)?;
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(source, link)
        }
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_dir(source, link)
        }
    }

    fn remove_link(&self, link: &Path) -> io::Result<()> {
        let metadata = std::fs::symlink_metadata(link)?;
        if !metadata.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a symbolic link", link.display()),
            ));
        }
        #[cfg(unix)]
        {
            std::fs::remove_file(link)
        }
        #[cfg(windows)]
        {
            std::fs::remove_dir(link)
        }
    }

    fn name(&self) -> &'static str {
        "symlink"
    }
}

/// An NTFS directory junction, created through `mklink /J`.
#[cfg(windows)]
pub struct JunctionLinker;

#[cfg(windows)]
impl Linker for JunctionLinker {
    fn create_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        ensure_vacant(link)?;
        let status = std::process::Command::new("cmd")
            .arg("/c")
            .arg("mklink")
            .arg("/J")
            .arg(link)
            .arg(source)
            .status()?;
        if !status.success() {
            return Err(io::Error::other(format!("mklink /J exited with {status}")));
        }
        Ok(())
    }

    fn remove_link(&self, link: &Path) -> io::Result<()> {
        std::fs::symlink_metadata(link)?;
        std::fs::remove_dir(link)
    }

    fn name(&self) -> &'static str {
        "junction"
    }
}

/// A full copy of the source tree. Works everywhere, at the cost of disk space.
pub struct CopyLinker;

impl Linker for CopyLinker {
    fn create_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        ensure_vacant(link)?;
        if let Err(e) = copy_tree(source, link) {
            let _ = std::fs::remove_dir_all(link);
            return Err(e);
        }
        Ok(())
    }

    fn remove_link(&self, link: &Path) -> io::Result<()> {
        std::fs::symlink_metadata(link)?;
        std::fs::remove_dir_all(link)
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", source.display()),
        ));
    }
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    let points_to = std::fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)
}

#[cfg(windows)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::fs::copy(link, target).map(|_| ())
}
