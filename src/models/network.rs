// Network interface model

use serde::{Deserialize, Serialize};

/// One administratively-up, non-loopback interface. Built fresh per enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub name: String,
    #[serde(rename = "inet")]
    pub ipv4_addresses: Vec<String>,
    #[serde(rename = "inet6")]
    pub ipv6_addresses: Vec<String>,
    #[serde(rename = "hw")]
    pub hw_address: String,
}
