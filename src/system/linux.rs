// Linux-specific helpers: /proc/sys and /sys/class/net fallbacks.

/// Read kernel release from /proc/sys/kernel/osrelease (Linux). Used when sysinfo has none.
pub(crate) fn read_kernel_release_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let v = std::fs::read_to_string("/proc/sys/kernel/osrelease").ok()?;
        let v = v.trim();
        if v.is_empty() {
            return None;
        }
        Some(v.to_string())
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Read link-layer address from /sys/class/net/<interface>/address (Linux).
pub(crate) fn read_hw_address_linux(interface_name: &str) -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        if interface_name.contains('/') {
            return None;
        }
        let path = format!("/sys/class/net/{}/address", interface_name);
        let v = std::fs::read_to_string(&path).ok()?;
        let v = v.trim();
        if v.is_empty() {
            return None;
        }
        Some(v.to_string())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        None
    }
}
