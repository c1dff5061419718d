//! Standard SPICE target names and ID numbers
//!
//! Mappings between body names and the NAIF integer codes used in SPK
//! segments, plus the planet-to-barycenter fallback used when a kernel only
//! carries barycenter segments for a planetary system.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Map from target ID numbers to canonical names
    static ref TARGET_NAMES: HashMap<i32, &'static str> = {
        let mut m = HashMap::new();
        for &(id, name) in TARGET_NAME_PAIRS.iter() {
            m.entry(id).or_insert(name);
        }
        m
    };

    /// Map from lowercase target names to ID numbers
    static ref TARGET_IDS: HashMap<String, i32> = {
        let mut m = HashMap::new();
        for &(id, name) in TARGET_NAME_PAIRS.iter() {
            m.insert(name.to_lowercase(), id);
        }
        m
    };
}

/// Get the name of a target given its ID number
pub fn target_name(id: i32) -> Option<&'static str> {
    TARGET_NAMES.get(&id).copied()
}

/// Get the ID number of a target given its name
pub fn target_id(name: &str) -> Option<i32> {
    TARGET_IDS.get(&name.to_lowercase()).copied()
}

/// Barycenter code standing in for a planet center, if the id is one
///
/// Planet centers `N99` map to barycenter `N` for N in 1..=9. Satellites
/// (`N01..N98`) sit far from their system barycenter and have no stand-in.
pub fn barycenter_of(id: i32) -> Option<i32> {
    if (100..1000).contains(&id) && id % 100 == 99 {
        Some(id / 100)
    } else {
        None
    }
}

/// Pairs of (id, name) for celestial bodies
const TARGET_NAME_PAIRS: &[(i32, &str)] = &[
    (0, "SOLAR_SYSTEM_BARYCENTER"),
    (0, "SSB"),
    (0, "SOLAR SYSTEM BARYCENTER"),
    (1, "MERCURY_BARYCENTER"),
    (1, "MERCURY BARYCENTER"),
    (2, "VENUS_BARYCENTER"),
    (2, "VENUS BARYCENTER"),
    (3, "EARTH_BARYCENTER"),
    (3, "EMB"),
    (3, "EARTH MOON BARYCENTER"),
    (3, "EARTH-MOON BARYCENTER"),
    (3, "EARTH BARYCENTER"),
    (4, "MARS_BARYCENTER"),
    (4, "MARS BARYCENTER"),
    (5, "JUPITER_BARYCENTER"),
    (5, "JUPITER BARYCENTER"),
    (6, "SATURN_BARYCENTER"),
    (6, "SATURN BARYCENTER"),
    (7, "URANUS_BARYCENTER"),
    (7, "URANUS BARYCENTER"),
    (8, "NEPTUNE_BARYCENTER"),
    (8, "NEPTUNE BARYCENTER"),
    (9, "PLUTO_BARYCENTER"),
    (9, "PLUTO BARYCENTER"),
    (10, "SUN"),
    (199, "MERCURY"),
    (299, "VENUS"),
    (399, "EARTH"),
    (301, "MOON"),
    (499, "MARS"),
    (401, "PHOBOS"),
    (402, "DEIMOS"),
    (599, "JUPITER"),
    (501, "IO"),
    (502, "EUROPA"),
    (503, "GANYMEDE"),
    (504, "CALLISTO"),
    (699, "SATURN"),
    (601, "MIMAS"),
    (602, "ENCELADUS"),
    (603, "TETHYS"),
    (604, "DIONE"),
    (605, "RHEA"),
    (606, "TITAN"),
    (607, "HYPERION"),
    (608, "IAPETUS"),
    (609, "PHOEBE"),
    (799, "URANUS"),
    (701, "ARIEL"),
    (702, "UMBRIEL"),
    (703, "TITANIA"),
    (704, "OBERON"),
    (705, "MIRANDA"),
    (899, "NEPTUNE"),
    (801, "TRITON"),
    (802, "NEREID"),
    (999, "PLUTO"),
    (901, "CHARON"),
];

/// Common target name/ID pairs used in applications
pub mod targets {
    pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;
    pub const EARTH_MOON_BARYCENTER: i32 = 3;
    pub const SUN: i32 = 10;
    pub const MERCURY: i32 = 199;
    pub const VENUS: i32 = 299;
    pub const EARTH: i32 = 399;
    pub const MOON: i32 = 301;
    pub const MARS: i32 = 499;
    pub const JUPITER: i32 = 599;
    pub const SATURN: i32 = 699;
    pub const URANUS: i32 = 799;
    pub const NEPTUNE: i32 = 899;
    pub const PLUTO: i32 = 999;
}
