//! Platform core-count probes.
//!
//! Each probe reports one view of the local node:
//!
//! | Probe               | Source                                           |
//! |---------------------|--------------------------------------------------|
//! | [`online_cores`]    | `sysconf(_SC_NPROCESSORS_ONLN)`, else `num_cpus` |
//! | [`available_cores`] | `std::thread::available_parallelism`             |
//! | [`physical_cores`]  | `num_cpus::get_physical`                         |
//!
//! None of them caches; a probe that reports zero is an error.

use super::TopologyError;

/// Number of processors currently online.
#[cfg(has_nprocessors_onln)]
pub fn online_cores() -> Result<usize, TopologyError> {
    use nix::unistd::{sysconf, SysconfVar};

    let count: libc::c_long = sysconf(SysconfVar::_NPROCESSORS_ONLN)
        .map_err(|errno| TopologyError::Os(errno as i32))?
        .ok_or(TopologyError::Unsupported)?;
    nonzero(usize::try_from(count).map_err(|_| TopologyError::Unsupported)?)
}

/// Number of processors currently online.
///
/// Targets without `_SC_NPROCESSORS_ONLN` use the logical CPU count.
#[cfg(not(has_nprocessors_onln))]
pub fn online_cores() -> Result<usize, TopologyError> {
    nonzero(num_cpus::get())
}

/// Number of processors this process may actually run on.
///
/// Respects CPU affinity masks and cgroup quotas where the platform exposes
/// them, so it can be lower than [`online_cores`].
pub fn available_cores() -> Result<usize, TopologyError> {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .map_err(|err| match err.raw_os_error() {
            Some(code) => TopologyError::Os(code),
            None => TopologyError::Unsupported,
        })
}

/// Number of physical cores, ignoring SMT siblings.
pub fn physical_cores() -> Result<usize, TopologyError> {
    nonzero(num_cpus::get_physical())
}

#[inline]
fn nonzero(count: usize) -> Result<usize, TopologyError> {
    if count == 0 {
        Err(TopologyError::NoCores)
    } else {
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_cores_at_least_one() {
        assert!(online_cores().unwrap() >= 1);
    }

    #[test]
    fn available_never_exceeds_a_sane_bound() {
        let n = available_cores().unwrap();
        assert!((1..=65536).contains(&n), "available_cores() returned {n}");
    }

    #[test]
    fn physical_at_least_one() {
        assert!(physical_cores().unwrap() >= 1);
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(nonzero(0), Err(TopologyError::NoCores));
        assert_eq!(nonzero(2), Ok(2));
    }
}
