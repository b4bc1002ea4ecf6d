// NIC introspection through getifaddrs(3)

use super::{NicBackend, NicDescription};
use crate::error::CollectError;
use crate::system::linux::read_hw_address_linux;
use nix::ifaddrs::{InterfaceAddress, getifaddrs};
use nix::net::if_::InterfaceFlags;

#[derive(Debug, Default)]
pub struct GetifaddrsBackend;

fn snapshot() -> Result<Vec<InterfaceAddress>, CollectError> {
    getifaddrs()
        .map(|addrs| addrs.collect())
        .map_err(|e| CollectError::Interface(e.to_string()))
}

fn format_mac(octets: [u8; 6]) -> String {
    octets
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

impl GetifaddrsBackend {
    pub fn probe() -> Result<Self, CollectError> {
        snapshot()?;
        Ok(Self)
    }
}

impl NicBackend for GetifaddrsBackend {
    fn device_names(&self) -> Result<Vec<String>, CollectError> {
        let mut names: Vec<String> = Vec::new();
        for addr in snapshot()? {
            if !names.contains(&addr.interface_name) {
                names.push(addr.interface_name);
            }
        }
        Ok(names)
    }

    fn describe(&self, name: &str) -> Result<NicDescription, CollectError> {
        let entries: Vec<InterfaceAddress> = snapshot()?
            .into_iter()
            .filter(|a| a.interface_name == name)
            .collect();
        let first = entries
            .first()
            .ok_or_else(|| CollectError::Interface(format!("{} disappeared", name)))?;

        let mut desc = NicDescription {
            name: name.to_string(),
            up: first.flags.contains(InterfaceFlags::IFF_UP),
            loopback: first.flags.contains(InterfaceFlags::IFF_LOOPBACK),
            ipv4_addresses: Some(Vec::new()),
            ..Default::default()
        };

        for entry in &entries {
            let Some(address) = entry.address.as_ref() else {
                continue;
            };
            if let Some(v4) = address.as_sockaddr_in() {
                if let Some(list) = desc.ipv4_addresses.as_mut() {
                    list.push(v4.ip());
                }
            } else if let Some(v6) = address.as_sockaddr_in6() {
                desc.ipv6_addresses.push(v6.ip());
            } else if let Some(link) = address.as_link_addr()
                && let Some(octets) = link.addr()
            {
                desc.hw_address = Some(format_mac(octets));
            }
        }
        if desc.hw_address.is_none() {
            desc.hw_address = read_hw_address_linux(name);
        }
        Ok(desc)
    }
}
