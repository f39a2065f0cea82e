use std::path::PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use gman::VersionNumber;

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Directory holding the installed SDKs. Overrides `GMAN_ROOT` and the config file
    #[clap(long, global = true)]
    pub(crate) root: Option<PathBuf>,
    /// Print diagnostics to stderr. Repeat for more detail
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    /// Only print results and errors
    #[clap(short, long, global = true)]
    pub(crate) quiet: bool,
    #[command(subcommand)]
    pub(crate) command: GmanCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum GmanCommand {
    /// Lists the releases available for download
    List {
        /// Include release candidates, betas and archived releases
        #[clap(long)]
        unstable: bool,
    },
    /// Lists the installed versions. The selected one is marked with `*`
    Installed,
    /// Downloads and installs versions, e.g. `1.15.2` or `latest`
    Install {
        #[clap(required = true)]
        versions: Vec<String>,
        /// Allow versions that are not listed as stable
        #[clap(long)]
        unstable: bool,
        /// Target operating system in Go's naming (linux, darwin, windows, ...). Defaults to the host
        #[clap(long)]
        os: Option<String>,
        /// Target architecture in Go's naming (amd64, arm64, ...). Defaults to the host
        #[clap(long)]
        arch: Option<String>,
    },
    /// Removes installed versions, together with their leftover archives in the root
    Uninstall {
        #[clap(required_unless_present = "all", conflicts_with = "all")]
        versions: Vec<VersionNumber>,
        /// Uninstall every installed version
        #[clap(long)]
        all: bool,
    },
    /// Makes an installed version the active one by linking it to `<root>/go-selected`
    Select {
        version: VersionNumber,
    },
    /// Removes the `<root>/go-selected` link
    Unselect,
    /// Uninstalls every version that is no longer listed as stable
    Cleanup,
}
