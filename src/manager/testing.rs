//! Offline fixtures: a fake catalog served through [`RoutedClient`] with real archives.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use crate::config::Config;
use crate::http::{HttpClient, RoutedClient};
use crate::link::{CopyLinker, Linker};
use crate::manager::{Collaborators, Manager};
use crate::task::{Task, TaskLog};

pub(crate) const LIST_URL: &str = "https://go.test/dl/?mode=json";
pub(crate) const DOWNLOAD_URL: &str = "https://go.test/dl";
pub(crate) const OS: &str = "linux";
pub(crate) const ARCH: &str = "amd64";

/// Writes a minimal SDK tree identifying itself as `version_name`.
pub(crate) fn write_sdk(dir: &Path, version_name: &str) {
    fs::create_dir_all(dir.join("bin")).unwrap();
    fs::write(dir.join("VERSION"), format!("{version_name}\ntime 2020-09-09T16:38:12Z\n")).unwrap();
    fs::write(dir.join("bin").join("gofmt"), "#!/bin/sh\n").unwrap();
}

/// A `.tar.gz` laid out like the official downloads, everything under `go/`.
pub(crate) fn sdk_archive(version_name: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append(
        &mut builder,
        "go/VERSION",
        format!("{version_name}\ntime 2020-09-09T16:38:12Z\n").as_bytes(),
    );
    append(&mut builder, "go/bin/gofmt", b"#!/bin/sh\n");
    append(&mut builder, "go/src/runtime/extern.go", b"package runtime\n");
    builder.into_inner().unwrap().finish().unwrap()
}

fn append<W: Write>(builder: &mut tar::Builder<W>, path: &str, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, path, data).unwrap();
}

pub(crate) fn archive_name(version_name: &str) -> String {
    format!("{version_name}.{OS}-{ARCH}.tar.gz")
}

pub(crate) fn download_url(filename: &str) -> String {
    format!("{DOWNLOAD_URL}/{filename}")
}

/// Sorted names of everything directly inside `root`.
pub(crate) fn root_entries(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

struct CatalogRelease {
    version: String,
    stable: bool,
    files: Vec<Value>,
}

/// Builder for the catalog and downloads a test [`Manager`] sees.
pub(crate) struct Catalog {
    releases: Vec<CatalogRelease>,
    downloads: Vec<(String, Vec<u8>)>,
    reachable: bool,
}

impl Catalog {
    pub(crate) fn new() -> Self {
        Self {
            releases: Vec::new(),
            downloads: Vec::new(),
            reachable: true,
        }
    }

    /// A catalog whose list endpoints all answer 404.
    pub(crate) fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    /// Adds a release with one linux-amd64 archive containing a matching SDK.
    pub(crate) fn release(self, version_name: &str, stable: bool) -> Self {
        self.release_with_archive(version_name, stable, sdk_archive(version_name))
    }

    /// Adds a release whose linux-amd64 archive is `archive`, listed with its true digest.
    pub(crate) fn release_with_archive(mut self, version_name: &str, stable: bool, archive: Vec<u8>) -> Self {
        let filename = archive_name(version_name);
        let file = json!({
            "filename": filename,
            "os": OS,
            "arch": ARCH,
            "version": version_name,
            "sha256": hex::encode(Sha256::digest(&archive)),
            "size": archive.len(),
            "kind": "archive",
        });
        self.downloads.push((filename, archive));
        self.releases.push(CatalogRelease {
            version: version_name.to_string(),
            stable,
            files: vec![file],
        });
        self
    }

    /// Adds another file entry to an existing release.
    pub(crate) fn file(mut self, version_name: &str, file: Value) -> Self {
        if let Some(release) = self.releases.iter_mut().find(|r| r.version == version_name) {
            release.files.push(file);
        }
        self
    }

    /// Serves `body` instead of the archive listed for `filename`.
    pub(crate) fn serve(mut self, filename: &str, body: Vec<u8>) -> Self {
        self.downloads.retain(|(name, _)| name != filename);
        self.downloads.push((filename.to_string(), body));
        self
    }

    /// Stops serving `filename`, so downloading it answers 404.
    pub(crate) fn withhold(mut self, filename: &str) -> Self {
        self.downloads.retain(|(name, _)| name != filename);
        self
    }

    fn list_json(&self, stable_only: bool) -> String {
        let releases: Vec<Value> = self
            .releases
            .iter()
            .filter(|release| release.stable || !stable_only)
            .map(|release| {
                json!({
                    "version": release.version,
                    "stable": release.stable,
                    "files": release.files,
                })
            })
            .collect();
        Value::Array(releases).to_string()
    }

    pub(crate) fn client(&self) -> RoutedClient {
        let mut client = RoutedClient::new();
        if self.reachable {
            client = client
                .route(format!("{LIST_URL}&include=stable"), 200, self.list_json(true))
                .route(format!("{LIST_URL}&include=all"), 200, self.list_json(false));
        }
        for (filename, body) in &self.downloads {
            client = client.route(download_url(filename), 200, body.clone());
        }
        client
    }

    pub(crate) fn collaborators(&self) -> (Collaborators, TaskLog, Rc<RoutedClient>) {
        let client = Rc::new(self.client());
        let config = Config {
            root_dir: None,
            release_list_url: LIST_URL.to_string(),
            download_url: DOWNLOAD_URL.to_string(),
        };
        let shared: Rc<dyn HttpClient> = client.clone();
        let mut collaborators = Collaborators::with_client(shared, &config);
        let (task, log) = Task::buffered();
        collaborators.task = task;
        (collaborators, log, client)
    }
}

pub(crate) struct Harness {
    pub(crate) manager: Manager,
    pub(crate) log: TaskLog,
    pub(crate) client: Rc<RoutedClient>,
}

/// Opens a manager on `root` against `catalog`.
pub(crate) fn open(root: &Path, catalog: &Catalog) -> Harness {
    let (collaborators, log, client) = catalog.collaborators();
    let manager = match Manager::new(root, collaborators) {
        Ok(manager) => manager,
        Err(e) => panic!("could not open {}: {e}", root.display()),
    };
    Harness { manager, log, client }
}

/// Links by copying, but can never remove a link again.
pub(crate) struct UnremovableLinker;

impl Linker for UnremovableLinker {
    fn create_link(&self, source: &Path, link: &Path) -> io::Result<()> {
        CopyLinker.create_link(source, link)
    }

    fn remove_link(&self, link: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{} is locked", link.display()),
        ))
    }

    fn name(&self) -> &'static str {
        "unremovable"
    }
}
