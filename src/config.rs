use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Whitespace-separated package names reported as installed applications.
    #[serde(default)]
    pub applications_list: String,
    /// Filesystem types left out of disk usage.
    #[serde(default = "default_ignored_fs")]
    pub ignored_fs: BTreeSet<String>,
    pub report_interval_secs: u64,
    /// How often to log agent stats (reports produced) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_ignored_fs() -> BTreeSet<String> {
    [
        "rootfs",
        "tmpfs",
        "autofs",
        "cgroup",
        "cgroup2",
        "selinuxfs",
        "udev",
        "mqueue",
        "nfsd",
        "proc",
        "sysfs",
        "devtmpfs",
        "hugetlbfs",
        "rpc_pipefs",
        "devpts",
        "securityfs",
        "debugfs",
        "binfmt_misc",
        "fuse.gvfsd-fuse",
        "fuse.gvfs-fuse-daemon",
        "fusectl",
        "usbfs",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

/// Helper programs run for host commands.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_lock_session")]
    pub lock_session: String,
    #[serde(default = "default_shutdown")]
    pub shutdown: String,
    #[serde(default = "default_hibernate")]
    pub hibernate: String,
}

fn default_lock_session() -> String {
    "/usr/share/guest-agent/locksession".into()
}

fn default_shutdown() -> String {
    "/usr/share/guest-agent/shutdown".into()
}

fn default_hibernate() -> String {
    "/usr/share/guest-agent/hibernate".into()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            lock_session: default_lock_session(),
            shutdown: default_shutdown(),
            hibernate: default_hibernate(),
        }
    }
}

/// Where system facts are read from; overridable for containers and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,
    #[serde(default = "default_mounts_path")]
    pub mounts_path: PathBuf,
    #[serde(default = "default_dpkg_status_path")]
    pub dpkg_status_path: PathBuf,
    #[serde(default = "default_rpm_db_path")]
    pub rpm_db_path: PathBuf,
}

fn default_proc_root() -> PathBuf {
    "/proc".into()
}

fn default_mounts_path() -> PathBuf {
    "/proc/mounts".into()
}

fn default_dpkg_status_path() -> PathBuf {
    "/var/lib/dpkg/status".into()
}

fn default_rpm_db_path() -> PathBuf {
    "/var/lib/rpm".into()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            mounts_path: default_mounts_path(),
            dpkg_status_path: default_dpkg_status_path(),
            rpm_db_path: default_rpm_db_path(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "guest-agent.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.general.report_interval_secs > 0,
            "general.report_interval_secs must be > 0, got {}",
            self.general.report_interval_secs
        );
        anyhow::ensure!(
            self.general.stats_log_interval_secs > 0,
            "general.stats_log_interval_secs must be > 0, got {}",
            self.general.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.commands.lock_session.is_empty(),
            "commands.lock_session must be non-empty"
        );
        anyhow::ensure!(
            !self.commands.shutdown.is_empty(),
            "commands.shutdown must be non-empty"
        );
        anyhow::ensure!(
            !self.commands.hibernate.is_empty(),
            "commands.hibernate must be non-empty"
        );
        anyhow::ensure!(
            !self.sources.proc_root.as_os_str().is_empty(),
            "sources.proc_root must be non-empty"
        );
        anyhow::ensure!(
            !self.sources.mounts_path.as_os_str().is_empty(),
            "sources.mounts_path must be non-empty"
        );
        Ok(())
    }
}
