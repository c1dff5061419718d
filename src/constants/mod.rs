//! Constants module for astronomical calculations

// Astronomical distances
/// Astronomical Unit in meters (per IAU 2012 Resolution B2)
pub const AU_M: f64 = 149_597_870_700.0;
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;

// Earth constants
/// Earth's equatorial radius in meters
pub const EARTH_RADIUS: f64 = 6_378_136.6;
/// Earth's equatorial radius in kilometers.
///
/// This is the only factor used to move between kilometers and Earth radii.
pub const KM_PER_EARTH_RADIUS: f64 = EARTH_RADIUS / 1000.0;
/// Astronomical Unit in Earth radii
pub const EARTH_RADII_PER_AU: f64 = AU_KM / KM_PER_EARTH_RADIUS;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// Days in a Julian year
pub const JULIAN_YEAR_DAYS: f64 = 365.25;
/// Seconds in a Julian year, used to turn orbital periods into time offsets
pub const SECONDS_PER_YEAR: f64 = JULIAN_YEAR_DAYS * DAY_S;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// TT minus TAI in seconds
pub const TT_MINUS_TAI_S: f64 = 32.184;
/// TT minus TAI in days
pub const TT_MINUS_TAI: f64 = TT_MINUS_TAI_S / DAY_S;

// Calendar constants
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i32 = 2_299_161;
