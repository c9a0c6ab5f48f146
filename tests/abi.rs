// Tests for the C-ABI shim (`--features c-abi`).
//
// Calls the exported `CmiNumCores` symbol and the result conversion behind it.
#![cfg(feature = "c-abi")]

use charm::abi::{to_c_count, CMI_NUM_CORES_ERROR};
use charm::topology::TopologyError;

#[test]
fn cmi_num_cores_is_positive() {
    assert!(charm::abi::CmiNumCores() >= 1);
}

#[test]
fn cmi_num_cores_matches_library_query() {
    let expected = charm::num_cores().unwrap() as libc::c_int;
    assert_eq!(charm::abi::CmiNumCores(), expected);
}

#[test]
fn errors_map_to_sentinel() {
    for err in [TopologyError::Unsupported, TopologyError::NoCores, TopologyError::Os(libc::EIO)] {
        assert_eq!(to_c_count(Err(err)), CMI_NUM_CORES_ERROR);
    }
    assert_eq!(CMI_NUM_CORES_ERROR, -1);
}
