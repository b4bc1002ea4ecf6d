// Machine identity via sysinfo, with Linux fallbacks

pub(crate) mod linux;

use crate::process::ProcessRunner;
use sysinfo::System;

/// Host name as configured in the guest, or "localhost" when unset.
pub fn machine_name() -> String {
    System::host_name()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".into())
}

/// Fully-qualified domain name from `hostname --fqdn`, falling back to the machine name.
pub fn fqdn(runner: &dyn ProcessRunner) -> String {
    match runner.output(&["hostname", "--fqdn"]) {
        Ok(out) if out.success => {
            let name = out.stdout.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
        Ok(_) => tracing::debug!(operation = "fqdn", "hostname --fqdn exited with failure"),
        Err(e) => tracing::debug!(operation = "fqdn", error = %e, "hostname --fqdn failed"),
    }
    machine_name()
}

/// Kernel release string (uname -r).
pub fn os_version() -> String {
    System::kernel_version()
        .filter(|s| !s.is_empty())
        .or_else(linux::read_kernel_release_linux)
        .unwrap_or_default()
}
