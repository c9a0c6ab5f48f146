// Integration tests for topology: the core-count query seam and its probes.
//
// Verifies the contract every embedding host relies on:
//   - The host query returns at least 1 for every probe
//   - Repeated calls in one process agree
//   - A forced count wins over the probe
//   - FixedCoreCount and closures substitute for the host query

use std::sync::Arc;

use charm::config::{CoreSource, QueryConfig};
use charm::topology::cores::{available_cores, online_cores, physical_cores};
use charm::topology::{CoreCountQuery, FixedCoreCount, HostTopology, TopologyError};

// ─────────────────────────────────────────────────────────────────────────────
// Probes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn online_cores_returns_at_least_one() {
    assert!(online_cores().unwrap() >= 1, "online_cores() must be >= 1");
}

#[test]
fn probes_return_reasonable_upper_bound() {
    // No real machine has more than 65536 logical cores.
    for (name, count) in [
        ("online", online_cores()),
        ("available", available_cores()),
        ("physical", physical_cores()),
    ] {
        let count = count.unwrap();
        assert!(
            (1..=65536).contains(&count),
            "{name} probe returned suspicious value: {count}"
        );
    }
}

#[test]
fn online_cores_is_deterministic() {
    let first = online_cores().unwrap();
    let second = online_cores().unwrap();
    assert_eq!(first, second, "online_cores() must be stable across calls");
}

// ─────────────────────────────────────────────────────────────────────────────
// HostTopology
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn host_topology_default_uses_online_probe() {
    let host = HostTopology::default();
    assert_eq!(host.config().source, CoreSource::Online);
    assert_eq!(host.query_core_count(), online_cores());
}

#[test]
fn host_topology_forced_count_wins() {
    let config = QueryConfig::from_vars(Some("8"), Some("physical"));
    let host = HostTopology::new(config);
    assert_eq!(host.query_core_count(), Ok(8));
}

#[test]
fn host_topology_malformed_force_falls_back_to_probe() {
    let config = QueryConfig::from_vars(Some("eight"), None);
    assert_eq!(config.forced, None);
    let count = HostTopology::new(config).query_core_count().unwrap();
    assert!(count >= 1);
}

#[test]
fn host_topology_repeated_calls_agree() {
    let host = HostTopology::new(QueryConfig::default().with_source(CoreSource::Available));
    let counts: Vec<usize> = (0..4).map(|_| host.query_core_count().unwrap()).collect();
    assert!(counts.windows(2).all(|w| w[0] == w[1]), "{counts:?}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Substitutes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fixed_core_count_behind_trait_object() {
    let query: Arc<dyn CoreCountQuery> = Arc::new(FixedCoreCount(8));
    assert_eq!(query.query_core_count(), Ok(8));
}

#[test]
fn closure_query_reports_os_error() {
    let query = || -> Result<usize, TopologyError> { Err(TopologyError::Os(libc::ENOSYS)) };
    assert_eq!(query.query_core_count(), Err(TopologyError::Os(libc::ENOSYS)));
}

#[test]
fn topology_error_messages() {
    assert_eq!(
        TopologyError::NoCores.to_string(),
        "core count query reported zero processors"
    );
    assert_eq!(
        TopologyError::Unsupported.to_string(),
        "core count is not available on this platform"
    );
}
