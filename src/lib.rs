//! # gman Core Library
//!
//! This crate contains the core logic of `gman`, a manager for side-by-side Go SDK
//! installations in a single root directory.
//!
//! Every SDK lives in `<root>/go<version>`; at most one of them is *selected* through
//! the `<root>/go-selected` link, so tools only ever need that one path on `PATH`.
//!
//! ## Modules Overview
//! - [`manager`] – The state store: install, select, uninstall and cleanup
//! - [`resolver`] – Reading the release catalog and finding releases
//! - [`release`] – Catalog entries and artifact verification
//! - [`http`] – HTTP client seam and the download/extract primitive
//! - [`archive`] – `.tar.gz` and `.zip` extraction
//! - [`detect`] – Identifying the Go version of a directory
//! - [`link`] – Symlinks, junctions and copies for the selection
//! - [`version`] – Version numbers, ordering and canonical names
//! - [`task`] – Step-by-step progress narration
//! - [`config`] – User configuration and the root directory
//! - [`logging`] – Diagnostic logging setup
//! - [`error`] – Error types
//! - [`util`] – Shared utilities (platform names, hashing, paths)

pub mod archive;
pub mod config;
pub mod detect;
pub mod error;
pub mod http;
pub mod link;
pub mod logging;
pub mod manager;
pub mod release;
pub mod resolver;
pub mod task;
pub mod util;
pub mod version;

pub use error::{ErrorKind, ManagerError};
pub use manager::{Collaborators, Manager, ReleaseListing};
pub use release::ReleaseType;
pub use version::VersionNumber;
