use anyhow::{Context, Result};
use log::debug;
use gman::config::Config;
use gman::logging::{init_logging, level_for};
use gman::task::Task;
use gman::util::{host_arch, host_os};
use gman::{Collaborators, Manager, ReleaseType, VersionNumber};
use crate::cli::{GmanCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    init_logging(level_for(cli.verbose, cli.quiet));

    let config = Config::load_global()?;
    let root = config.root_dir(cli.root.clone())?;
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Could not create root directory {}", root.display()))?;
    debug!("using root {}", root.display());

    let mut collaborators = Collaborators::online(&config)?;
    if cli.quiet {
        collaborators.task = Task::silent();
    }
    let mut manager = Manager::new(&root, collaborators)?;

    match cli.command {
        GmanCommand::List { unstable } => {
            execute_list(&manager, ReleaseType::select(unstable))
        }
        GmanCommand::Installed => {
            execute_installed(&manager);
            Ok(())
        }
        GmanCommand::Install { versions, unstable, os, arch } => {
            let os = os.unwrap_or_else(host_os);
            let arch = arch.unwrap_or_else(host_arch);
            execute_install(&mut manager, &versions, &os, &arch, ReleaseType::select(unstable))
        }
        GmanCommand::Uninstall { versions, all } => {
            execute_uninstall(&mut manager, &versions, all)
        }
        GmanCommand::Select { version } => {
            Ok(manager.select(&version)?)
        }
        GmanCommand::Unselect => {
            Ok(manager.unselect()?)
        }
        GmanCommand::Cleanup => {
            Ok(manager.cleanup()?)
        }
    }
}

pub fn execute_list(manager: &Manager, filter: ReleaseType) -> Result<()> {
    let listings = manager.list_releases(filter)?;
    if listings.is_empty() {
        println!("No {filter} releases available");
        return Ok(());
    }
    for listing in listings.iter().rev() {
        let marker = if listing.selected { "*" } else { " " };
        let mut notes = Vec::new();
        if listing.installed {
            notes.push("installed");
        }
        if !listing.stable {
            notes.push("unstable");
        }
        if notes.is_empty() {
            println!("{marker} {}", listing.version);
        } else {
            println!("{marker} {} ({})", listing.version, notes.join(", "));
        }
    }
    Ok(())
}

pub fn execute_installed(manager: &Manager) {
    let installed = manager.installed_versions();
    if installed.is_empty() {
        println!("No versions installed");
        return;
    }
    for version in installed {
        let marker = if manager.selected_version() == Some(version) { "*" } else { " " };
        println!("{marker} {version}");
    }
}

pub fn execute_install(
    manager: &mut Manager,
    versions: &[String],
    os: &str,
    arch: &str,
    filter: ReleaseType,
) -> Result<()> {
    for requested in versions {
        if requested == "latest" {
            manager.install_latest(os, arch, filter)?;
            continue;
        }
        let version: VersionNumber = requested
            .parse()
            .with_context(|| format!("Invalid version: {requested}"))?;
        manager.install(&version, os, arch, filter)?;
    }
    Ok(())
}

pub fn execute_uninstall(manager: &mut Manager, versions: &[VersionNumber], all: bool) -> Result<()> {
    if all {
        manager.uninstall_all()?;
        return Ok(());
    }
    for version in versions {
        manager.uninstall(version)?;
    }
    Ok(())
}
