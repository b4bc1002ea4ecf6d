// Config loading and validation tests

use guest_agent::config::AppConfig;
use std::path::Path;

const VALID_CONFIG: &str = r#"
[general]
applications_list = "kernel bash qemu-guest-agent"
report_interval_secs = 5
stats_log_interval_secs = 60

[commands]
lock_session = "/usr/share/guest-agent/locksession"
shutdown = "/usr/share/guest-agent/shutdown"
hibernate = "/usr/share/guest-agent/hibernate"

[sources]
proc_root = "/proc"
mounts_path = "/proc/mounts"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.general.applications_list, "kernel bash qemu-guest-agent");
    assert_eq!(config.general.report_interval_secs, 5);
    assert_eq!(config.general.stats_log_interval_secs, 60);
    assert_eq!(config.commands.shutdown, "/usr/share/guest-agent/shutdown");
    assert_eq!(config.sources.mounts_path, Path::new("/proc/mounts"));
    assert_eq!(config.sources.dpkg_status_path, Path::new("/var/lib/dpkg/status"));
}

#[test]
fn test_config_defaults_for_omitted_sections() {
    let config = AppConfig::load_from_str("[general]\nreport_interval_secs = 10\n").unwrap();
    assert!(config.general.applications_list.is_empty());
    assert_eq!(config.general.stats_log_interval_secs, 300);
    assert!(config.general.ignored_fs.contains("tmpfs"));
    assert!(config.general.ignored_fs.contains("proc"));
    assert!(!config.general.ignored_fs.contains("ext4"));
    assert_eq!(config.commands.hibernate, "/usr/share/guest-agent/hibernate");
    assert_eq!(config.sources.rpm_db_path, Path::new("/var/lib/rpm"));
}

#[test]
fn test_config_ignored_fs_override() {
    let s = VALID_CONFIG.replace(
        "report_interval_secs = 5",
        "report_interval_secs = 5\nignored_fs = [\"nfs\"]",
    );
    let config = AppConfig::load_from_str(&s).unwrap();
    assert_eq!(config.general.ignored_fs.len(), 1);
    assert!(config.general.ignored_fs.contains("nfs"));
}

#[test]
fn test_config_validation_rejects_report_interval_zero() {
    let bad = VALID_CONFIG.replace("report_interval_secs = 5", "report_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report_interval_secs"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG.replace("stats_log_interval_secs = 60", "stats_log_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_validation_rejects_empty_shutdown_helper() {
    let bad = VALID_CONFIG.replace(
        "shutdown = \"/usr/share/guest-agent/shutdown\"",
        "shutdown = \"\"",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("commands.shutdown"));
}

#[test]
fn test_config_validation_rejects_empty_mounts_path() {
    let bad = VALID_CONFIG.replace("mounts_path = \"/proc/mounts\"", "mounts_path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sources.mounts_path"));
}

#[test]
fn test_config_requires_general_section() {
    assert!(AppConfig::load_from_str("[commands]\n").is_err());
}
