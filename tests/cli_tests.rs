use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn write_sdk(dir: &Path, version_name: &str) {
    fs::create_dir_all(dir.join("bin")).unwrap();
    fs::write(dir.join("VERSION"), format!("{version_name}\ntime 2020-09-09T16:38:12Z\n")).unwrap();
}

/// A `gman` command isolated from the user's config and environment.
fn gman(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gman").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("GMAN_ROOT");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&output).to_string()
}

#[test]
fn test_help() {
    let home = tempdir().unwrap();
    let help = stdout_of(gman(&home).arg("--help"));
    assert!(help.contains("install"));
    assert!(help.contains("cleanup"));
}

#[test]
fn test_installed_on_new_root() {
    let home = tempdir().unwrap();
    let root = home.path().join("nested").join("sdks");

    let output = stdout_of(gman(&home).arg("--root").arg(&root).arg("installed"));
    assert!(output.contains("No versions installed"));
    assert!(root.is_dir());
}

#[test]
fn test_select_and_unselect() {
    let home = tempdir().unwrap();
    let root = home.path().join("sdks");
    write_sdk(&root.join("go1.15.2"), "go1.15.2");
    write_sdk(&root.join("go1.16"), "go1.16");

    let output = stdout_of(gman(&home).arg("--root").arg(&root).arg("installed"));
    assert!(output.contains("  1.15.2\n"));
    assert!(output.contains("  1.16\n"));

    gman(&home)
        .args(["select", "1.16.0"])
        .arg("--root")
        .arg(&root)
        .assert()
        .success();
    assert!(root.join("go-selected").join("VERSION").is_file());

    let output = stdout_of(gman(&home).arg("--root").arg(&root).arg("installed"));
    assert!(output.contains("* 1.16\n"));
    assert!(output.contains("  1.15.2\n"));

    gman(&home).arg("--root").arg(&root).arg("unselect").assert().success();
    assert!(!root.join("go-selected").exists());

    let output = gman(&home)
        .arg("--root")
        .arg(&root)
        .arg("unselect")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("no version is selected"));
}

#[test]
fn test_select_not_installed_fails() {
    let home = tempdir().unwrap();
    let root = home.path().join("sdks");
    fs::create_dir_all(&root).unwrap();

    gman(&home)
        .arg("--root")
        .arg(&root)
        .args(["select", "1.16"])
        .assert()
        .failure();
    assert!(!root.join("go-selected").exists());
}

#[test]
fn test_uninstall() {
    let home = tempdir().unwrap();
    let root = home.path().join("sdks");
    write_sdk(&root.join("go1.15.2"), "go1.15.2");
    write_sdk(&root.join("go1.16"), "go1.16");
    fs::write(root.join("go1.16.linux-amd64.tar.gz"), "archive").unwrap();

    gman(&home)
        .env("GMAN_ROOT", &root)
        .args(["-q", "uninstall", "1.16"])
        .assert()
        .success();
    assert!(!root.join("go1.16").exists());
    assert!(!root.join("go1.16.linux-amd64.tar.gz").exists());
    assert!(root.join("go1.15.2").is_dir());

    gman(&home)
        .env("GMAN_ROOT", &root)
        .args(["uninstall", "1.16"])
        .assert()
        .failure();

    gman(&home)
        .env("GMAN_ROOT", &root)
        .args(["uninstall", "--all"])
        .assert()
        .success();
    assert!(!root.join("go1.15.2").exists());
}

#[cfg(unix)]
#[test]
fn test_root_from_config_file() {
    let home = tempdir().unwrap();
    let root = home.path().join("configured");
    write_sdk(&root.join("go1.14.9"), "go1.14.9");
    let config = gman::config::Config {
        root_dir: Some(root.clone()),
        ..gman::config::Config::default()
    };
    let config_file = temp_env_config_file(&home);
    config.save(&config_file).unwrap();

    let output = stdout_of(gman(&home).arg("installed"));
    assert!(output.contains("1.14.9"));
}

/// Where `gman` looks for its config file under the isolated home directory.
#[cfg(unix)]
fn temp_env_config_file(home: &TempDir) -> std::path::PathBuf {
    if cfg!(target_os = "macos") {
        home.path().join("Library").join("Application Support").join("org.gman.gman").join("config.toml")
    } else {
        home.path().join("config").join("gman").join("config.toml")
    }
}
