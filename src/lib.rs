// Library for tests to access modules

pub mod capability;
pub mod collector;
pub mod commands;
pub mod config;
pub mod disks;
pub mod error;
pub mod memory;
pub mod models;
pub mod network;
pub mod packages;
pub mod process;
pub mod system;
pub mod users;
pub mod version;
pub mod worker;
