//! Core-count query seam.
//!
//! The binding never talks to the platform directly: it holds an
//! `Arc<dyn CoreCountQuery>` and asks it for a count on every call.
//! [`HostTopology`] is the real implementation; [`FixedCoreCount`] answers
//! with a constant and stands in for the host in embedders' tests.

pub mod cores;

use std::fmt;

use crate::config::{CoreSource, QueryConfig};

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by a core-count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError {
    /// The platform exposes no way to count processors.
    Unsupported,
    /// The OS query failed with this errno.
    Os(i32),
    /// The probe reported zero processors.
    NoCores,
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::Unsupported => {
                f.write_str("core count is not available on this platform")
            }
            TopologyError::Os(code) => write!(
                f,
                "core count query failed: {}",
                std::io::Error::from_raw_os_error(*code)
            ),
            TopologyError::NoCores => f.write_str("core count query reported zero processors"),
        }
    }
}

impl std::error::Error for TopologyError {}

// ── Query trait ──────────────────────────────────────────────────────────────

/// Answers "how many cores does the local node have?".
///
/// Implementations must be idempotent and safe to call from any thread
/// without setup or teardown.
pub trait CoreCountQuery: Send + Sync {
    fn query_core_count(&self) -> Result<usize, TopologyError>;
}

impl<F> CoreCountQuery for F
where
    F: Fn() -> Result<usize, TopologyError> + Send + Sync,
{
    fn query_core_count(&self) -> Result<usize, TopologyError> {
        self()
    }
}

// ── Host implementation ──────────────────────────────────────────────────────

/// Queries the local machine according to a [`QueryConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostTopology {
    config: QueryConfig,
}

impl HostTopology {
    pub fn new(config: QueryConfig) -> Self {
        HostTopology { config }
    }

    /// Configuration taken from `FORCECPUCOUNT` and `CHARM_CMI_CORE_SOURCE`.
    pub fn from_env() -> Self {
        HostTopology::new(QueryConfig::from_env())
    }

    pub fn config(&self) -> QueryConfig {
        self.config
    }
}

impl CoreCountQuery for HostTopology {
    fn query_core_count(&self) -> Result<usize, TopologyError> {
        if let Some(forced) = self.config.forced {
            crate::displaylevel!(4, "core count forced to {}\n", forced);
            return Ok(forced);
        }
        let count = match self.config.source {
            CoreSource::Online => cores::online_cores(),
            CoreSource::Available => cores::available_cores(),
            CoreSource::Physical => cores::physical_cores(),
        };
        match &count {
            Ok(n) => crate::displaylevel!(4, "{} cores ({})\n", n, self.config.source),
            Err(err) => crate::displaylevel!(3, "{} probe failed: {}\n", self.config.source, err),
        }
        count
    }
}

// ── Fixed implementation ─────────────────────────────────────────────────────

/// Always reports the same count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCoreCount(pub usize);

impl CoreCountQuery for FixedCoreCount {
    fn query_core_count(&self) -> Result<usize, TopologyError> {
        if self.0 == 0 {
            Err(TopologyError::NoCores)
        } else {
            Ok(self.0)
        }
    }
}
