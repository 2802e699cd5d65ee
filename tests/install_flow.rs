//! Test installing into a temporary root with fake network and services.
use std::{os::unix::fs::PermissionsExt, time::Duration};

use deskcrate::{
    error::InstallerErrorKind,
    inst::{Installer, Step},
    net::{Fetcher, HttpFetcher},
    select::InstallSelection,
};

mod common;

use common::{FakeFetcher, FakeServiceManager, ScriptedPrompt};

fn make_installer(
    config: &deskcrate::inst::InstallConfig,
    fetcher: &FakeFetcher,
    service_manager: &FakeServiceManager,
) -> Installer {
    Installer::new(config)
        .with_fetcher(fetcher.clone())
        .with_service_manager(service_manager.clone())
        .with_privilege_check(false)
        .with_bootstrap(false)
}

#[test_log::test]
fn test_app_only() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new();
    let service_manager = FakeServiceManager::new();
    let prompt = ScriptedPrompt::new(Some(0), Some(&[0]));

    let report = make_installer(&config, &fetcher, &service_manager)
        .run(&prompt)
        .unwrap();

    assert_eq!(report.version.name, "2.4.1");
    assert_eq!(
        report.steps,
        vec![
            Step::InstallApp,
            Step::CreateDesktopEntry,
            Step::WriteUninstaller
        ]
    );

    let paths = &config.paths;
    assert_eq!(
        std::fs::read(&paths.app_executable).unwrap(),
        b"#!/bin/sh\necho lumen\n"
    );
    let mode = std::fs::metadata(&paths.app_executable)
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);

    assert!(paths.icon.is_file());
    let desktop_entry = std::fs::read_to_string(&paths.desktop_entry).unwrap();
    assert!(desktop_entry.starts_with("[Desktop Entry]\n"));
    assert!(desktop_entry.contains(&format!("Exec={}\n", paths.app_executable.display())));
    assert!(desktop_entry.contains(&format!("Icon={}\n", paths.icon.display())));

    for profile in &paths.shell_profiles {
        assert!(!profile.exists());
    }
    assert!(!paths.monitor_unit.exists());
    assert!(!paths.monitor_dir.exists());
    assert!(service_manager.recorded().is_empty());

    assert!(paths.uninstaller.is_file());
}

#[test_log::test]
fn test_second_release() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new().with_body("https://downloads.test/lumen-2.3.0", b"old");
    let service_manager = FakeServiceManager::new();
    let prompt = ScriptedPrompt::new(Some(1), Some(&[0]));

    let report = make_installer(&config, &fetcher, &service_manager)
        .run(&prompt)
        .unwrap();

    assert_eq!(report.version.name, "2.3.0");
    assert_eq!(std::fs::read(&config.paths.app_executable).unwrap(), b"old");
    assert_eq!(
        fetcher.requested()[..2],
        [
            common::MANIFEST_URL.to_string(),
            "https://downloads.test/lumen-2.3.0".to_string()
        ]
    );
}

#[test_log::test]
fn test_patches_applied_once() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new();
    let service_manager = FakeServiceManager::new();
    let bashrc = &config.paths.shell_profiles[0];

    std::fs::write(bashrc, "alias ll='ls -l'\n").unwrap();

    for _ in 0..2 {
        let prompt = ScriptedPrompt::new(Some(0), Some(&[1]));
        let report = make_installer(&config, &fetcher, &service_manager)
            .run(&prompt)
            .unwrap();

        assert_eq!(report.steps, vec![Step::ApplyPatches, Step::WriteUninstaller]);
    }

    assert_eq!(
        std::fs::read_to_string(bashrc).unwrap(),
        "alias ll='ls -l'\n\
         # Lumen: WEBKIT_DISABLE_DMABUF_RENDERER workaround\n\
         export WEBKIT_DISABLE_DMABUF_RENDERER=1\n"
    );

    let zshrc = std::fs::read_to_string(&config.paths.shell_profiles[1]).unwrap();
    assert_eq!(
        zshrc
            .lines()
            .filter(|line| *line == "export WEBKIT_DISABLE_DMABUF_RENDERER=1")
            .count(),
        1
    );
    assert!(!config.paths.install_dir.exists());
}

#[test_log::test]
fn test_monitor() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new();
    let service_manager = FakeServiceManager::new();
    let prompt = ScriptedPrompt::new(Some(0), Some(&[2]));

    let monitor_source = root.path().join("deskcrate-build");
    std::fs::write(&monitor_source, b"binary").unwrap();

    let report = make_installer(&config, &fetcher, &service_manager)
        .with_monitor_source(&monitor_source)
        .run(&prompt)
        .unwrap();

    assert_eq!(
        report.steps,
        vec![Step::InstallMonitor, Step::WriteUninstaller]
    );

    let paths = &config.paths;
    assert_eq!(std::fs::read(&paths.monitor_executable).unwrap(), b"binary");

    let unit = std::fs::read_to_string(&paths.monitor_unit).unwrap();
    assert!(unit.contains("[Unit]\n"));
    assert!(unit.contains(&format!(
        "ExecStart=\"{}\" monitor --log-dir \"{}\" --interval-secs 5\n",
        paths.monitor_executable.display(),
        paths.log_dir.display()
    )));
    assert!(unit.contains("Restart=always\n"));
    assert!(unit.contains("User=root\n"));
    assert!(unit.contains("WantedBy=multi-user.target\n"));

    assert_eq!(
        service_manager.recorded(),
        vec![
            "daemon-reload".to_string(),
            "enable --now lumen-log-monitor.service".to_string()
        ]
    );
}

#[test_log::test]
fn test_manifest_not_found() {
    let root = tempfile::tempdir().unwrap();
    let mut config = common::make_config(root.path());
    let (base_url, handle) = common::serve_once("404 Not Found", "not found");
    config.manifest_url = format!("{base_url}/versions.json");

    let prompt = ScriptedPrompt::new(Some(0), Some(&[0, 1]));
    let result = Installer::new(&config)
        .with_service_manager(FakeServiceManager::new())
        .with_privilege_check(false)
        .with_bootstrap(false)
        .run(&prompt);

    handle.join().unwrap();

    let error = result.unwrap_err();
    assert!(matches!(error.kind(), InstallerErrorKind::Network));
    assert!(error.context().contains("404"));
    assert_eq!(prompt.call_count(), 0);
    assert!(!config.paths.uninstaller.exists());
}

#[test_log::test]
fn test_manifest_timeout() {
    let root = tempfile::tempdir().unwrap();
    let mut config = common::make_config(root.path());
    let (base_url, handle) = common::serve_stalled(Duration::from_secs(3));
    config.manifest_url = format!("{base_url}/versions.json");
    config.read_timeout = Duration::from_millis(300);

    let prompt = ScriptedPrompt::new(Some(0), Some(&[0]));
    let result = Installer::new(&config)
        .with_service_manager(FakeServiceManager::new())
        .with_privilege_check(false)
        .with_bootstrap(false)
        .run(&prompt);

    let error = result.unwrap_err();
    assert!(matches!(error.kind(), InstallerErrorKind::Timeout));
    assert_eq!(prompt.call_count(), 0);

    handle.join().unwrap();
}

#[test_log::test]
fn test_fetch_timeout() {
    let (base_url, handle) = common::serve_stalled(Duration::from_secs(3));
    let fetcher = HttpFetcher::new(Duration::from_secs(5), Duration::from_millis(300));
    let mut body = Vec::new();

    let error = fetcher
        .fetch(&format!("{base_url}/lumen"), &mut body)
        .unwrap_err();

    assert!(matches!(error.kind(), InstallerErrorKind::Timeout));
    assert!(error.kind().is_network());
    assert!(body.is_empty());

    handle.join().unwrap();
}

#[test_log::test]
fn test_empty_manifest() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new().with_body(common::MANIFEST_URL, br#"{"versions": []}"#);
    let prompt = ScriptedPrompt::new(Some(0), Some(&[0]));

    let result = make_installer(&config, &fetcher, &FakeServiceManager::new()).run(&prompt);

    assert!(matches!(
        result.unwrap_err().kind(),
        InstallerErrorKind::EmptyManifest
    ));
    assert_eq!(prompt.call_count(), 0);
}

#[test_log::test]
fn test_malformed_manifest() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new().with_body(
        common::MANIFEST_URL,
        br#"{"versions": [{"name": "2.4.1", "url": "https://downloads.test/a"}, {"name": "2.3.0"}]}"#,
    );
    let prompt = ScriptedPrompt::new(Some(0), Some(&[0]));

    let result = make_installer(&config, &fetcher, &FakeServiceManager::new()).run(&prompt);

    assert!(matches!(
        result.unwrap_err().kind(),
        InstallerErrorKind::MalformedManifest
    ));
    assert_eq!(prompt.call_count(), 0);
}

#[test_log::test]
fn test_version_cancelled() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new();
    let prompt = ScriptedPrompt::new(None, Some(&[0, 1]));

    let result = make_installer(&config, &fetcher, &FakeServiceManager::new()).run(&prompt);

    assert!(matches!(
        result.unwrap_err().kind(),
        InstallerErrorKind::InterruptedByUser
    ));
    assert_eq!(prompt.call_count(), 1);
    assert!(!config.paths.install_dir.exists());
    assert!(!config.paths.uninstaller.exists());
}

#[test_log::test]
fn test_options_cancelled() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new();
    let prompt = ScriptedPrompt::new(Some(0), None);

    let report = make_installer(&config, &fetcher, &FakeServiceManager::new())
        .run(&prompt)
        .unwrap();

    assert_eq!(report.selection, InstallSelection::none());
    assert_eq!(report.steps, vec![Step::WriteUninstaller]);
    assert_eq!(fetcher.requested(), vec![common::MANIFEST_URL.to_string()]);
    assert!(!config.paths.install_dir.exists());
    assert!(config.paths.uninstaller.is_file());
}

#[test_log::test]
fn test_download_failure_stops_remaining_steps() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());
    let fetcher = FakeFetcher::new().with_body(
        common::MANIFEST_URL,
        br#"{"versions": [{"name": "9.9.9", "url": "https://downloads.test/missing"}]}"#,
    );
    let prompt = ScriptedPrompt::new(Some(0), Some(&[0, 1]));

    let result = make_installer(&config, &fetcher, &FakeServiceManager::new()).run(&prompt);

    let error = result.unwrap_err();
    assert!(error.kind().is_network());
    assert!(!config.paths.app_executable.exists());
    assert!(!config.paths.shell_profiles[0].exists());
    assert!(!config.paths.uninstaller.exists());
}
