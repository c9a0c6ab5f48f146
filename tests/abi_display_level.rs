// Tests for the C-ABI shim's display level (`--features c-abi`).
//
// Kept in its own test binary: the first `CmiNumCores` call applies
// CHARM_CMI_DISPLAY_LEVEL to process-wide state.
#![cfg(feature = "c-abi")]

use charm::display::display_level;

#[test]
fn first_call_applies_display_level_env() {
    std::env::set_var("CHARM_CMI_DISPLAY_LEVEL", "0");
    assert_eq!(display_level(), 2);

    assert!(charm::abi::CmiNumCores() >= 1);
    assert_eq!(display_level(), 0);

    // Later changes to the variable are not re-read.
    std::env::set_var("CHARM_CMI_DISPLAY_LEVEL", "4");
    charm::abi::CmiNumCores();
    assert_eq!(display_level(), 0);
}
