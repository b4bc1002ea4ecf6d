// Model serialization tests (JSON wire keys)

use guest_agent::models::*;
use std::collections::BTreeSet;

#[test]
fn test_network_interface_uses_short_keys() {
    let nic = NetworkInterface {
        name: "eth0".into(),
        ipv4_addresses: vec!["10.0.0.2".into()],
        ipv6_addresses: vec![],
        hw_address: "52:54:00:aa:bb:cc".into(),
    };
    let json = serde_json::to_value(&nic).unwrap();
    assert_eq!(json["name"], "eth0");
    assert_eq!(json["inet"][0], "10.0.0.2");
    assert!(json["inet6"].as_array().unwrap().is_empty());
    assert_eq!(json["hw"], "52:54:00:aa:bb:cc");
}

#[test]
fn test_memory_snapshot_rate_keys() {
    let snap = MemorySnapshot {
        swap_in_rate: 1,
        swap_out_rate: 2,
        page_fault_rate: 3,
        major_fault_rate: 4,
        ..Default::default()
    };
    let json = serde_json::to_value(snap).unwrap();
    assert_eq!(json["swap_in"], 1);
    assert_eq!(json["swap_out"], 2);
    assert_eq!(json["pageflt"], 3);
    assert_eq!(json["majflt"], 4);
    assert_eq!(json["mem_total"], 0);
}

#[test]
fn test_guest_report_json_roundtrip_camel_case() {
    let report = GuestReport {
        timestamp: 1_700_000_000_000,
        machine_name: "vm1".into(),
        fqdn: "vm1.example.org".into(),
        os_version: "6.1.0".into(),
        network_interfaces: vec![],
        applications: BTreeSet::from(["bash-5.2".to_string()]),
        available_ram: 2000,
        disk_usage: vec![DiskUsageEntry {
            path: "/".into(),
            filesystem_type: "ext4".into(),
            total_bytes: 100,
            used_bytes: 40,
        }],
        memory_stats: MemorySnapshot::default(),
        users: BTreeSet::new(),
        active_user: "None".into(),
    };
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"machineName\""));
    assert!(json.contains("\"availableRam\""));
    assert!(json.contains("\"activeUser\""));
    assert!(json.contains("\"fs\":\"ext4\""));
    let back: GuestReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
