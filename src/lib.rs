// charm-cmi — native extension exposing `charm.cmi.num_cores()`

pub mod config;
pub mod display;
pub mod topology;
pub mod registry;
#[cfg(feature = "python")]
pub mod python;
#[cfg(feature = "c-abi")]
pub mod abi;

use std::sync::Arc;

// ── Version constants ────────────────────────────────────────────────────────
pub const CHARM_CMI_VERSION_MAJOR: u32 = 0;
pub const CHARM_CMI_VERSION_MINOR: u32 = 3;
pub const CHARM_CMI_VERSION_RELEASE: u32 = 0;
pub const CHARM_CMI_VERSION_NUMBER: u32 = CHARM_CMI_VERSION_MAJOR * 100 * 100
    + CHARM_CMI_VERSION_MINOR * 100
    + CHARM_CMI_VERSION_RELEASE;
pub const CHARM_CMI_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Returns the runtime version string.
pub fn version_string() -> &'static str {
    CHARM_CMI_VERSION_STRING
}

/// Number of cores on the local node, using the environment's query settings.
///
/// This is what `charm.cmi.num_cores()` returns when the extension is loaded
/// into a host.
pub fn num_cores() -> Result<usize, TopologyError> {
    HostTopology::from_env().query_core_count()
}

/// The query handed to [`register_capabilities`] by the shipped hosts.
pub fn default_query() -> Arc<dyn CoreCountQuery> {
    Arc::new(HostTopology::from_env())
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use config::{CoreSource, QueryConfig};
pub use registry::{
    register_capabilities, BindingError, EmbeddingHost, InProcessHost, NativeFunction,
    Registration, Value,
};
pub use topology::{CoreCountQuery, FixedCoreCount, HostTopology, TopologyError};
