//! SPK (Spacecraft and Planet Kernel) segment reader
//!
//! Evaluates the Chebyshev segment types used by the JPL planetary
//! ephemerides: type 2 (position coefficients only) and type 3 (position and
//! velocity coefficients). Segments of other types are listed but fail with
//! `UnsupportedSegmentType` when evaluated.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use nalgebra::Vector3;

use crate::constants::{DAY_S, J2000};
use crate::jplephem::chebyshev::{normalize_time, rescale_derivative, ChebyshevPolynomial};
use crate::jplephem::daf::{Summary, DAF};
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::target_name;

/// Convert TDB seconds past J2000 to a Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    J2000 + seconds / DAY_S
}

/// Convert a Julian date to TDB seconds past J2000
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000) * DAY_S
}

/// An opened SPK file
#[derive(Debug)]
pub struct SPK {
    pub daf: DAF,
    pub segments: Vec<Segment>,
    /// (center, target) -> indices into `segments`, in file order
    pairs: HashMap<(i32, i32), Vec<usize>>,
}

/// Trailing directory of a Chebyshev segment
#[derive(Debug, Clone, Copy, PartialEq)]
struct Directory {
    /// Initial epoch of the first record (TDB seconds past J2000)
    init: f64,
    /// Length of each record's interval in seconds
    intlen: f64,
    /// Record size in double words
    rsize: usize,
    /// Number of records
    n: usize,
}

/// One segment of an SPK file
#[derive(Clone)]
pub struct Segment {
    /// Segment name from the name record
    pub source: String,
    pub start_second: f64,
    pub end_second: f64,
    pub target: i32,
    pub center: i32,
    pub frame: i32,
    pub data_type: i32,
    /// First and last 1-based addresses of the segment data
    pub start_i: usize,
    pub end_i: usize,
    pub start_jd: f64,
    pub end_jd: f64,
    /// `None` for data types this reader cannot evaluate
    directory: Option<Directory>,
}

impl SPK {
    /// Open an SPK file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let daf = DAF::open(path)?;
        if daf.locidw != "DAF/SPK" && daf.locidw != "NAIF/DAF" {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is a {} file, not an SPK",
                daf.path.display(),
                daf.locidw
            )));
        }
        if daf.nd != 2 || daf.ni != 6 {
            return Err(JplephemError::InvalidFormat(format!(
                "SPK summaries need ND=2 NI=6, found ND={} NI={}",
                daf.nd, daf.ni
            )));
        }

        let mut segments = Vec::new();
        for summary in daf.summaries()? {
            segments.push(Segment::from_summary(&daf, summary)?);
        }

        let mut pairs: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (i, seg) in segments.iter().enumerate() {
            pairs.entry((seg.center, seg.target)).or_default().push(i);
        }

        log::info!(
            "loaded SPK {} with {} segments",
            daf.path.display(),
            segments.len()
        );

        Ok(SPK {
            daf,
            segments,
            pairs,
        })
    }

    /// First segment for a (center, target) pair
    pub fn get_segment(&self, center: i32, target: i32) -> Result<&Segment> {
        self.segments_for(center, target)
            .next()
            .ok_or(JplephemError::BodyNotFound { center, target })
    }

    /// Every segment for a (center, target) pair, in file order
    pub fn segments_for(&self, center: i32, target: i32) -> impl Iterator<Item = &Segment> + '_ {
        self.pairs
            .get(&(center, target))
            .into_iter()
            .flatten()
            .map(move |&i| &self.segments[i])
    }

    pub fn comments(&self) -> Result<String> {
        self.daf.comments()
    }
}

impl Segment {
    fn from_summary(daf: &DAF, summary: Summary) -> Result<Self> {
        let Summary {
            name,
            doubles,
            ints,
        } = summary;
        let (start_second, end_second) = (doubles[0], doubles[1]);
        let (target, center, frame, data_type) = (ints[0], ints[1], ints[2], ints[3]);
        if ints[4] <= 0 || ints[5] < ints[4] + 3 {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {:?} has bad address range {}..{}",
                name, ints[4], ints[5]
            )));
        }
        let (start_i, end_i) = (ints[4] as usize, ints[5] as usize);

        let mut segment = Segment {
            source: name,
            start_second,
            end_second,
            target,
            center,
            frame,
            data_type,
            start_i,
            end_i,
            start_jd: seconds_to_jd(start_second),
            end_jd: seconds_to_jd(end_second),
            directory: None,
        };
        if data_type != 2 && data_type != 3 {
            log::warn!(
                "{}: segment {:?} has unsupported data type {}, it will not be evaluated",
                daf.path.display(),
                segment.source,
                data_type
            );
            return Ok(segment);
        }

        let trailer = daf.read_array(end_i - 3, end_i)?;
        let directory = Directory {
            init: trailer[0],
            intlen: trailer[1],
            rsize: trailer[2] as usize,
            n: trailer[3] as usize,
        };
        let components = if data_type == 2 { 3 } else { 6 };
        if directory.intlen <= 0.0
            || directory.n == 0
            || directory.rsize < 2 + components
            || (directory.rsize - 2) % components != 0
            || start_i + directory.rsize * directory.n > end_i - 3
        {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {:?} has an inconsistent directory {:?}",
                segment.source, directory
            )));
        }

        segment.directory = Some(directory);
        Ok(segment)
    }

    /// Whether this reader can evaluate the segment's data type
    pub fn is_supported(&self) -> bool {
        self.directory.is_some()
    }

    /// Whether an epoch in TDB seconds past J2000 lies inside the segment
    pub fn covers(&self, et: f64) -> bool {
        et >= self.start_second && et <= self.end_second
    }

    /// Compute position (km) at the given split TDB Julian date
    pub fn compute(&self, daf: &DAF, tdb: f64, tdb2: f64) -> Result<Vector3<f64>> {
        Ok(self.compute_and_differentiate(daf, tdb, tdb2)?.0)
    }

    /// Compute position (km) and velocity (km/s) at the given split TDB Julian date
    pub fn compute_and_differentiate(
        &self,
        daf: &DAF,
        tdb: f64,
        tdb2: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let et = jd_to_seconds(tdb) + tdb2 * DAY_S;
        self.state_at_seconds(daf, et)
    }

    /// Position and velocity at TDB seconds past J2000
    pub fn state_at_seconds(&self, daf: &DAF, et: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let dir = self
            .directory
            .ok_or(JplephemError::UnsupportedSegmentType(self.data_type))?;
        if !self.covers(et) {
            return Err(JplephemError::OutOfRange {
                jd: seconds_to_jd(et),
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }

        let index = (((et - dir.init) / dir.intlen).floor().max(0.0) as usize).min(dir.n - 1);
        let first = self.start_i + index * dir.rsize;
        let record = daf.read_array(first, first + dir.rsize - 1)?;
        let (mid, radius) = (record[0], record[1]);
        let s = normalize_time(et, mid, radius)?;

        let components = if self.data_type == 2 { 3 } else { 6 };
        let ncoeff = (dir.rsize - 2) / components;
        let words: &[f64] = &record;
        let series = move |k: usize| ChebyshevPolynomial::new(&words[2 + k * ncoeff..2 + (k + 1) * ncoeff]);

        let position = Vector3::new(
            series(0).evaluate(s),
            series(1).evaluate(s),
            series(2).evaluate(s),
        );
        let velocity = if self.data_type == 2 {
            Vector3::new(
                rescale_derivative(series(0).derivative(s), radius),
                rescale_derivative(series(1).derivative(s), radius),
                rescale_derivative(series(2).derivative(s), radius),
            )
        } else {
            Vector3::new(
                series(3).evaluate(s),
                series(4).evaluate(s),
                series(5).evaluate(s),
            )
        };

        Ok((position, velocity))
    }

    /// Human readable one-line description
    pub fn describe(&self) -> String {
        let label = |id: i32| match target_name(id) {
            Some(name) => format!("{} {}", id, name),
            None => id.to_string(),
        };
        format!(
            "{}..{} Type {} {} -> {}",
            crate::jplephem::calendar::format_date(self.start_jd),
            crate::jplephem::calendar::format_date(self.end_jd),
            self.data_type,
            label(self.center),
            label(self.target)
        )
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Segment {}>", self.describe())
    }
}
