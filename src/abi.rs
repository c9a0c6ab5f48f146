//! C-ABI shim — exports `CmiNumCores` for C and C++ hosts.
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! C hosts have no exception channel, so a failed query returns `-1`.
//!
//! ```c
//! int CmiNumCores(void);
//! ```

use std::sync::Once;

use libc::c_int;

use crate::display::init_display_level;
use crate::topology::{CoreCountQuery, HostTopology};

static DISPLAY_INIT: Once = Once::new();

/// Return value when the core count cannot be determined.
pub const CMI_NUM_CORES_ERROR: c_int = -1;

/// Convert a query result to the C return convention.
#[inline]
pub fn to_c_count<E: std::fmt::Display>(result: Result<usize, E>) -> c_int {
    match result {
        Ok(count) => c_int::try_from(count).unwrap_or(CMI_NUM_CORES_ERROR),
        Err(err) => {
            crate::displaylevel!(1, "CmiNumCores: {}\n", err);
            CMI_NUM_CORES_ERROR
        }
    }
}

/// Number of cores on the local node, or `-1` on failure.
///
/// Reads `FORCECPUCOUNT` and `CHARM_CMI_CORE_SOURCE` on every call;
/// `CHARM_CMI_DISPLAY_LEVEL` is applied on the first call only.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn CmiNumCores() -> c_int {
    DISPLAY_INIT.call_once(init_display_level);
    to_c_count(HostTopology::from_env().query_core_count())
}
