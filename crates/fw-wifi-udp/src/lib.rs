//! `WiFiUDP`-compatible UDP sockets for ESP-IDF firmware builds.
//!
//! The crate has two halves: [`WifiUdp`], the socket shim itself, and
//! [`descriptor`], the component record the build framework uses to place
//! this component in the build graph.

pub mod error;
pub mod socket;

use fw_component::ComponentDescriptor;

pub use error::{Result, UdpError};
pub use socket::{DEFAULT_BUFFER_SIZE, WifiUdp};

/// Component identifier.
pub const COMPONENT_NAME: &str = "wifi_udp";

pub const CODEOWNERS: &[&str] = &["@bkbartk"];

pub const DEPENDENCIES: &[&str] = &["wifi"];

/// Oldest ESP-IDF release whose socket headers the shim builds against.
pub const REQUIRED_PLATFORM_VERSION: &str = ">=4.4.0";

/// The component manifest shipped alongside this crate.
pub const MANIFEST: &str = include_str!("../component.toml");

/// Build this component's descriptor.
///
/// Pure: every call returns a fresh, equal record.
pub fn descriptor() -> fw_component::Result<ComponentDescriptor> {
    ComponentDescriptor::builder(COMPONENT_NAME)
        .description("WiFiUDP-compatible UDP sockets for ESP-IDF builds")
        .owners(CODEOWNERS.iter().copied())
        .dependencies(DEPENDENCIES.iter().copied())
        .min_platform_version(REQUIRED_PLATFORM_VERSION)
        .build()
}
