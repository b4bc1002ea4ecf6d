// Network interface enumeration (up, non-loopback, sorted by name)

mod ifaddrs;

pub use ifaddrs::GetifaddrsBackend;

use crate::capability::Capability;
use crate::error::CollectError;
use crate::models::NetworkInterface;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::instrument;

const NO_HW_ADDRESS: &str = "00:00:00:00:00:00";

/// Raw per-interface facts from a NIC introspection backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicDescription {
    pub name: String,
    pub up: bool,
    pub loopback: bool,
    /// Full IPv4 list; `None` when the backend cannot enumerate more than one address.
    pub ipv4_addresses: Option<Vec<Ipv4Addr>>,
    /// Single primary IPv4 address, consulted only when `ipv4_addresses` is `None`.
    pub legacy_ipv4: Option<Ipv4Addr>,
    pub ipv6_addresses: Vec<Ipv6Addr>,
    pub hw_address: Option<String>,
}

pub trait NicBackend: Send + Sync {
    fn device_names(&self) -> Result<Vec<String>, CollectError>;
    fn describe(&self, name: &str) -> Result<NicDescription, CollectError>;
}

pub struct NetworkInterfaceEnumerator {
    backend: Capability<Box<dyn NicBackend>>,
}

impl NetworkInterfaceEnumerator {
    /// Probes getifaddrs once; failure leaves the enumerator permanently unsupported.
    pub fn probe() -> Self {
        let backend = Capability::from_probe("getifaddrs", GetifaddrsBackend::probe())
            .map(|b| Box::new(b) as Box<dyn NicBackend>);
        Self { backend }
    }

    pub fn with_backend(backend: Capability<Box<dyn NicBackend>>) -> Self {
        Self { backend }
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_available()
    }

    #[instrument(skip(self), fields(operation = "list_interfaces"))]
    pub fn list_interfaces(&self) -> Vec<NetworkInterface> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        let names = match backend.device_names() {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "Error retrieving network interfaces.");
                return Vec::new();
            }
        };

        let mut interfaces: Vec<NetworkInterface> = names
            .iter()
            .filter_map(|name| match backend.describe(name) {
                Ok(desc) => to_interface(desc),
                Err(e) => {
                    tracing::warn!(interface = %name, error = %e, "skipping interface");
                    None
                }
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        interfaces
    }
}

/// Applies the up/non-loopback filter and the IPv4 legacy fallback.
fn to_interface(desc: NicDescription) -> Option<NetworkInterface> {
    if !desc.up || desc.loopback {
        return None;
    }
    let ipv4 = match desc.ipv4_addresses {
        Some(list) => list,
        None => desc.legacy_ipv4.into_iter().collect(),
    };
    Some(NetworkInterface {
        name: desc.name,
        ipv4_addresses: ipv4.iter().map(ToString::to_string).collect(),
        ipv6_addresses: desc.ipv6_addresses.iter().map(ToString::to_string).collect(),
        hw_address: desc.hw_address.unwrap_or_else(|| NO_HW_ADDRESS.into()),
    })
}
