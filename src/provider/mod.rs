//! Ephemeris backends behind a common position interface
//!
//! A provider answers "where is this body at this instant" in a fixed unit
//! relative to a fixed origin. [`crate::model::SystemModel`] normalizes
//! whatever the provider reports to Sun-centred Earth radii.

mod chebyshev;
mod kernel;

pub use self::chebyshev::ChebyshevProvider;
pub use self::kernel::KernelProvider;

use std::fmt;

use nalgebra::Vector3;

use crate::catalog::BodyRecord;
use crate::jplephem::calendar::format_date;
use crate::time::Time;
use crate::units::LengthUnit;
use crate::Result;

/// Point a provider measures positions from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The solar-system barycenter
    Barycentric,
    /// The center of the catalog root
    Heliocentric,
}

/// Fixed reference frame a provider reports in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderFrame {
    pub origin: Origin,
    pub unit: LengthUnit,
}

/// Validity window in TDB Julian dates, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub start_jd: f64,
    pub end_jd: f64,
}

impl Coverage {
    pub fn new(start_jd: f64, end_jd: f64) -> Self {
        Self { start_jd, end_jd }
    }

    /// Whether the instant's TDB Julian date lies inside the window
    pub fn contains(&self, time: &Time) -> bool {
        let jd = time.tdb();
        jd >= self.start_jd && jd <= self.end_jd
    }

    pub fn span_days(&self) -> f64 {
        self.end_jd - self.start_jd
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} (JD {:.1} to {:.1})",
            format_date(self.start_jd),
            format_date(self.end_jd),
            self.start_jd,
            self.end_jd
        )
    }
}

/// A source of body positions
pub trait PositionProvider: Send + Sync {
    /// Short label for logs and diagnostics
    fn name(&self) -> &str;

    /// Origin and unit of every vector this provider returns
    fn frame(&self) -> ProviderFrame;

    /// Instants the loaded data can answer for
    fn coverage(&self) -> Coverage;

    /// Whether the body can be looked up at all
    fn supports(&self, body: &BodyRecord) -> bool;

    /// Position of `body` at `time` relative to [`ProviderFrame::origin`],
    /// in [`ProviderFrame::unit`]
    ///
    /// Unsupported bodies yield `OrreryError::UnsupportedBody`. Instants
    /// outside [`Self::coverage`] surface the reader's out-of-range error.
    fn position_relative_to_origin(&self, body: &BodyRecord, time: &Time) -> Result<Vector3<f64>>;
}
