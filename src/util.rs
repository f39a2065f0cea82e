use std::path::Path;

/// Strips the `sha256:` prefix from a hash if present.
/// This is useful for formatting hashes uniformly.
pub fn format_hash(hash: &str) -> String {
    if let Some(hash) = hash.strip_prefix("sha256:") {
        hash.to_string()
    } else {
        hash.to_string()
    }
}

/// Returns the Go name of the host operating system (e.g. `linux`, `darwin`).
pub fn host_os() -> String {
    go_os_name(std::env::consts::OS)
}

/// Returns the Go name of the host architecture (e.g. `amd64`, `arm64`).
pub fn host_arch() -> String {
    go_arch_name(std::env::consts::ARCH)
}

fn go_os_name(os: &str) -> String {
    match os {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    }
}

fn go_arch_name(arch: &str) -> String {
    match arch {
        "x86_64" => "amd64".to_string(),
        "x86" => "386".to_string(),
        "aarch64" => "arm64".to_string(),
        "arm" => "armv6l".to_string(),
        "powerpc64" => "ppc64".to_string(),
        other => other.to_string(),
    }
}

/// Like `Path::exists`, but also true for dangling symlinks.
pub fn path_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Checks if a given path is an executable file on Unix.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Checks if a given path has a Windows executable extension (.exe, .bat, .cmd).
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_ascii_lowercase();
        path.is_file() && matches!(ext.as_str(), "exe" | "bat" | "cmd")
    } else {
        false
    }
}
