// display.rs — Display-level logging shared by the library, the C ABI and the
// `cmi` binary.
//
// 0 = no output; 1 = errors only; 2 = warnings (default); 3 = info; 4 = verbose

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::ENV_DISPLAY_LEVEL;

/// Highest meaningful display level.
pub const DISPLAY_LEVEL_MAX: u32 = 4;

/// Level used when `CHARM_CMI_DISPLAY_LEVEL` is unset or malformed.
pub const DISPLAY_LEVEL_DEFAULT: u32 = 2;

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(DISPLAY_LEVEL_DEFAULT);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level, clamped to [`DISPLAY_LEVEL_MAX`].
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level.min(DISPLAY_LEVEL_MAX), Ordering::Relaxed);
}

/// Apply `CHARM_CMI_DISPLAY_LEVEL` to the global display level.
pub fn init_display_level() {
    set_display_level(init_display_level_from(
        std::env::var(ENV_DISPLAY_LEVEL).ok().as_deref(),
    ));
}

/// Testable core of [`init_display_level`].
pub fn init_display_level_from(env_val: Option<&str>) -> u32 {
    match env_val.map(|v| v.trim().parse::<u32>()) {
        Some(Ok(level)) => level.min(DISPLAY_LEVEL_MAX),
        _ => DISPLAY_LEVEL_DEFAULT,
    }
}

/// Print to stdout.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Print to stderr when the display level is at least `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::display::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
