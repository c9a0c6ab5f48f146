// config.rs — Compile-time constants and environment-driven query settings.
//
// The namespace layout and the doc string are fixed at compile time. Which
// probe answers the core-count query, and whether the count is forced, are
// read from the environment when a `HostTopology` is built.

use std::ffi::CStr;
use std::fmt;
use std::str::FromStr;

use crate::displaylevel;

// ── Embedding surface ────────────────────────────────────────────────────────

/// Outer namespace registered with the embedding host.
pub const OUTER_NAMESPACE: &str = "charm";

/// Inner namespace attribute name on the outer namespace.
pub const INNER_NAMESPACE: &str = "cmi";

/// Fully-qualified inner namespace name, as the host registers it.
pub const INNER_NAMESPACE_PATH: &str = "charm.cmi";

/// Name of the single registered callable.
pub const NUM_CORES_NAME: &str = "num_cores";

/// Fully-qualified path of the callable.
pub const NUM_CORES_PATH: &str = "charm.cmi.num_cores";

/// Help text attached to the callable.
pub const NUM_CORES_DOC: &str = "Get the number of cores on the local node.";

/// [`NUM_CORES_NAME`] as a C string, for hosts that take `const char*`.
pub const NUM_CORES_NAME_C: &CStr = c"num_cores";

/// [`NUM_CORES_DOC`] as a C string.
pub const NUM_CORES_DOC_C: &CStr = c"Get the number of cores on the local node.";

// ── Environment variables ────────────────────────────────────────────────────

/// Forces the reported core count (scalability testing, debugging).
pub const ENV_FORCE_CPU_COUNT: &str = "FORCECPUCOUNT";

/// Selects the probe: `online`, `available` or `physical`.
pub const ENV_CORE_SOURCE: &str = "CHARM_CMI_CORE_SOURCE";

/// Initial display level (0..=4).
pub const ENV_DISPLAY_LEVEL: &str = "CHARM_CMI_DISPLAY_LEVEL";

// ── Core source ──────────────────────────────────────────────────────────────

/// Which platform probe answers the core-count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoreSource {
    /// Processors currently online (`sysconf(_SC_NPROCESSORS_ONLN)`).
    #[default]
    Online,
    /// Processors this process may run on (affinity and cgroup quotas applied).
    Available,
    /// Physical cores, ignoring SMT siblings.
    Physical,
}

impl CoreSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CoreSource::Online => "online",
            CoreSource::Available => "available",
            CoreSource::Physical => "physical",
        }
    }
}

impl fmt::Display for CoreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(CoreSource::Online),
            "available" => Ok(CoreSource::Available),
            "physical" => Ok(CoreSource::Physical),
            other => Err(format!("unknown core source: {other}")),
        }
    }
}

// ── Query configuration ──────────────────────────────────────────────────────

/// Settings for [`crate::topology::HostTopology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryConfig {
    /// Probe used when no count is forced.
    pub source: CoreSource,
    /// Count returned verbatim instead of probing.
    pub forced: Option<usize>,
}

impl QueryConfig {
    /// Build the configuration from `FORCECPUCOUNT` and `CHARM_CMI_CORE_SOURCE`.
    pub fn from_env() -> Self {
        QueryConfig::from_vars(
            std::env::var(ENV_FORCE_CPU_COUNT).ok().as_deref(),
            std::env::var(ENV_CORE_SOURCE).ok().as_deref(),
        )
    }

    /// Testable core of [`QueryConfig::from_env`]: pass the raw variable
    /// values, or `None` to simulate an unset variable.
    pub fn from_vars(force: Option<&str>, source: Option<&str>) -> Self {
        QueryConfig {
            source: init_core_source_from(source),
            forced: init_forced_count_from(force),
        }
    }

    pub fn with_source(mut self, source: CoreSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_forced(mut self, forced: Option<usize>) -> Self {
        self.forced = forced;
        self
    }
}

/// Parse an optional `FORCECPUCOUNT` value.
///
/// Only a positive decimal integer is accepted; anything else is ignored with
/// a warning at display level 2 and the real probe is used.
pub fn init_forced_count_from(env_val: Option<&str>) -> Option<usize> {
    let env = env_val?;
    match env.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            displaylevel!(
                2,
                "Ignore environment variable setting {}={}: not a positive integer \n",
                ENV_FORCE_CPU_COUNT,
                env
            );
            None
        }
    }
}

/// Parse an optional `CHARM_CMI_CORE_SOURCE` value, falling back to
/// [`CoreSource::Online`].
pub fn init_core_source_from(env_val: Option<&str>) -> CoreSource {
    let Some(env) = env_val else {
        return CoreSource::default();
    };
    match env.parse::<CoreSource>() {
        Ok(source) => source,
        Err(_) => {
            displaylevel!(
                2,
                "Ignore environment variable setting {}={}: expected online, available or physical \n",
                ENV_CORE_SOURCE,
                env
            );
            CoreSource::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_path_is_outer_dot_inner() {
        assert_eq!(
            INNER_NAMESPACE_PATH,
            format!("{}.{}", OUTER_NAMESPACE, INNER_NAMESPACE)
        );
        assert_eq!(
            NUM_CORES_PATH,
            format!("{}.{}", INNER_NAMESPACE_PATH, NUM_CORES_NAME)
        );
    }

    #[test]
    fn c_string_constants_match() {
        assert_eq!(NUM_CORES_NAME_C.to_str(), Ok(NUM_CORES_NAME));
        assert_eq!(NUM_CORES_DOC_C.to_str(), Ok(NUM_CORES_DOC));
    }

    #[test]
    fn forced_count_accepts_positive_integers() {
        assert_eq!(init_forced_count_from(Some("16")), Some(16));
        assert_eq!(init_forced_count_from(Some(" 3 ")), Some(3));
    }

    #[test]
    fn forced_count_rejects_zero_and_garbage() {
        assert_eq!(init_forced_count_from(Some("0")), None);
        assert_eq!(init_forced_count_from(Some("-4")), None);
        assert_eq!(init_forced_count_from(Some("many")), None);
        assert_eq!(init_forced_count_from(None), None);
    }

    #[test]
    fn core_source_parses_case_insensitively() {
        assert_eq!(init_core_source_from(Some("Physical")), CoreSource::Physical);
        assert_eq!(init_core_source_from(Some("available")), CoreSource::Available);
        assert_eq!(init_core_source_from(Some("bogus")), CoreSource::Online);
        assert_eq!(init_core_source_from(None), CoreSource::Online);
    }
}
