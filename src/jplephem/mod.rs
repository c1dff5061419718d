//! Readers for JPL planetary ephemeris files
//!
//! Two on-disk layouts are supported:
//!
//! - `jpleph`: the JPL DE binary format (`lnxp1900p2053.421` and friends)
//! - `daf` / `spk`: NAIF Double Array Files holding SPK segments (`.bsp`)
//!
//! `pool` stacks several SPK files with later files taking priority, and
//! `chebyshev` holds the series evaluation both layouts share. Every reader
//! owns a read-only memory map that is released when the reader is dropped.

pub mod calendar;
pub mod chebyshev;
pub mod daf;
pub mod errors;
pub mod jpleph;
pub mod names;
pub mod pool;
pub mod spk;

#[cfg(test)]
pub(crate) mod fixtures;


// Re-export primary types for convenience
pub use self::errors::JplephemError;
pub use self::jpleph::{DeTarget, JplEph};
pub use self::pool::KernelPool;
pub use self::spk::SPK;
