//! Test reversing an installation in a temporary root.
use std::process::Command;

use deskcrate::{inst::Installer, uninst::Uninstaller};

mod common;

use common::{FakeFetcher, FakeServiceManager, ScriptedPrompt};

const BASHRC: &str = "alias ll='ls -l'\n";

fn install(config: &deskcrate::inst::InstallConfig, options: &[usize]) {
    let monitor_source = config.target_user.home.join("deskcrate-build");
    std::fs::write(&monitor_source, b"binary").unwrap();

    std::fs::write(&config.paths.shell_profiles[0], BASHRC).unwrap();

    Installer::new(config)
        .with_fetcher(FakeFetcher::new())
        .with_service_manager(FakeServiceManager::new())
        .with_privilege_check(false)
        .with_bootstrap(false)
        .with_monitor_source(monitor_source)
        .run(&ScriptedPrompt::new(Some(0), Some(options)))
        .unwrap();
}

fn run_script(path: &std::path::Path) -> std::process::Output {
    Command::new("sh").arg(path).output().unwrap()
}

#[test_log::test]
fn test_generated_script_twice() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());

    install(&config, &[0, 1]);

    let paths = &config.paths;
    assert!(paths.app_executable.is_file());
    assert!(paths.desktop_entry.is_file());

    let output = run_script(&paths.uninstaller);
    assert!(output.status.success(), "{output:?}");

    assert!(!paths.install_dir.exists());
    assert!(!paths.desktop_entry.exists());
    assert_eq!(
        std::fs::read_to_string(&paths.shell_profiles[0]).unwrap(),
        BASHRC
    );
    assert_eq!(
        std::fs::read_to_string(&paths.shell_profiles[1]).unwrap(),
        ""
    );

    let output = run_script(&paths.uninstaller);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        std::fs::read_to_string(&paths.shell_profiles[0]).unwrap(),
        BASHRC
    );
}

#[test_log::test]
fn test_generated_script_nothing_installed() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());

    deskcrate::uninst::script::write(&config).unwrap();

    assert!(!config.paths.install_dir.exists());

    let output = run_script(&config.paths.uninstaller);
    assert!(output.status.success(), "{output:?}");

    for profile in &config.paths.shell_profiles {
        assert!(!profile.exists());
    }
}

#[test_log::test]
fn test_native_uninstaller() {
    let root = tempfile::tempdir().unwrap();
    let config = common::make_config(root.path());

    install(&config, &[0, 1, 2]);

    let paths = &config.paths;
    assert!(paths.monitor_unit.is_file());
    assert!(paths.monitor_executable.is_file());

    let service_manager = FakeServiceManager::active();
    Uninstaller::new(&config)
        .with_service_manager(service_manager.clone())
        .run()
        .unwrap();

    assert!(!paths.install_dir.exists());
    assert!(!paths.desktop_entry.exists());
    assert!(!paths.monitor_unit.exists());
    assert!(!paths.monitor_dir.exists());
    assert_eq!(
        std::fs::read_to_string(&paths.shell_profiles[0]).unwrap(),
        BASHRC
    );
    assert_eq!(
        service_manager.recorded(),
        vec![
            "stop lumen-log-monitor.service".to_string(),
            "disable lumen-log-monitor.service".to_string(),
            "daemon-reload".to_string(),
        ]
    );

    // A second run finds nothing left to do.
    let service_manager = FakeServiceManager::new();
    Uninstaller::new(&config)
        .with_service_manager(service_manager.clone())
        .run()
        .unwrap();

    assert!(service_manager.recorded().is_empty());
    assert_eq!(
        std::fs::read_to_string(&paths.shell_profiles[0]).unwrap(),
        BASHRC
    );
}
