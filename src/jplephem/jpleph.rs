//! Reader for the JPL planetary ephemeris binary format
//!
//! These are the files distributed as `lnxp1900p2053.421`, `linux_p1550p2650.430`
//! and so on: a header record, a record of constant values, then fixed-length
//! data records each covering `SS[2]` days with Chebyshev coefficients for
//! every body.
//!
//! Positions are returned in kilometers relative to the solar-system
//! barycenter and velocities in kilometers per day.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use nalgebra::Vector3;

use crate::jplephem::chebyshev::ChebyshevPolynomial;
use crate::jplephem::daf::Endian;
use crate::jplephem::errors::{io_err, JplephemError, Result};

/// Bytes in the header fields this reader consumes
const HEADER_BYTES: usize = 2856;
/// Constant names stored in the fixed part of the header
const MAX_CONSTANTS: usize = 400;

const TITLE: std::ops::Range<usize> = 0..252;
const CNAM_START: usize = 252;
const SS_START: usize = 2652;
const NCON_AT: usize = 2676;
const AU_AT: usize = 2680;
const EMRAT_AT: usize = 2688;
const IPT_START: usize = 2696;
const NUMDE_AT: usize = 2840;
const LPT_START: usize = 2844;

/// Index of the nutation series in the pointer table
const NUTATION: usize = 11;
/// Index of the lunar libration series in the pointer table
const LIBRATION: usize = 12;

/// Bodies a DE file can produce a state for
///
/// The outer planets (and Mars and Pluto) are stored as system barycenters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeTarget {
    Mercury,
    Venus,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Moon,
    Sun,
    SolarSystemBarycenter,
    Earth,
}

impl DeTarget {
    /// Look up a target by body name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let target = match name.to_ascii_lowercase().as_str() {
            "mercury" => DeTarget::Mercury,
            "venus" => DeTarget::Venus,
            "emb" | "earth-moon barycenter" | "earth barycenter" => DeTarget::EarthMoonBarycenter,
            "earth" => DeTarget::Earth,
            "moon" => DeTarget::Moon,
            "mars" => DeTarget::Mars,
            "jupiter" => DeTarget::Jupiter,
            "saturn" => DeTarget::Saturn,
            "uranus" => DeTarget::Uranus,
            "neptune" => DeTarget::Neptune,
            "pluto" => DeTarget::Pluto,
            "sun" => DeTarget::Sun,
            "ssb" | "solar system barycenter" => DeTarget::SolarSystemBarycenter,
            _ => return None,
        };
        Some(target)
    }

    /// Slot of this target's series in the pointer table, for stored bodies
    fn slot(self) -> Option<usize> {
        match self {
            DeTarget::Mercury => Some(0),
            DeTarget::Venus => Some(1),
            DeTarget::EarthMoonBarycenter => Some(2),
            DeTarget::Mars => Some(3),
            DeTarget::Jupiter => Some(4),
            DeTarget::Saturn => Some(5),
            DeTarget::Uranus => Some(6),
            DeTarget::Neptune => Some(7),
            DeTarget::Pluto => Some(8),
            DeTarget::Moon => Some(9),
            DeTarget::Sun => Some(10),
            DeTarget::SolarSystemBarycenter | DeTarget::Earth => None,
        }
    }
}

/// Where one body's coefficients live inside a data record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SeriesPointer {
    /// 1-based word offset inside the record
    offset: usize,
    /// Coefficients per component
    ncf: usize,
    /// Sub-intervals per record
    na: usize,
}

impl SeriesPointer {
    fn is_present(&self) -> bool {
        self.offset > 0 && self.ncf > 0 && self.na > 0
    }

    /// Last 1-based word used by this series
    fn last_word(&self, components: usize) -> usize {
        self.offset + self.ncf * components * self.na - 1
    }
}

/// An opened JPL DE binary ephemeris
pub struct JplEph {
    pub path: PathBuf,
    /// Three header title lines joined with newlines
    pub title: String,
    /// First covered Julian date (TDB)
    pub start_jd: f64,
    /// Last covered Julian date (TDB)
    pub end_jd: f64,
    /// Days covered by one data record
    pub record_span: f64,
    /// Astronomical unit in kilometers
    pub au_km: f64,
    /// Earth/Moon mass ratio
    pub emrat: f64,
    /// DE number, e.g. 421
    pub numde: i32,
    /// Double words per record
    pub ncoeff: usize,
    /// Number of data records covering `start_jd..end_jd`
    pub n_records: usize,
    pub endian: Endian,
    pointers: [SeriesPointer; 13],
    constant_names: Vec<String>,
    map: Mmap,
}

impl JplEph {
    /// Open a DE binary file and validate its header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| io_err(&path, e))?;
        // Safety: the map is read-only and the file is never written through it.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| io_err(&path, e))?;

        if map.len() < HEADER_BYTES {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is too short to hold a JPL ephemeris header",
                path.display()
            )));
        }
        let header = &map[..HEADER_BYTES];
        let endian = Self::detect_endian(header)?;

        let title = header[TITLE]
            .chunks(84)
            .map(|line| String::from_utf8_lossy(line).trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let ss = [
            endian.read_f64(&header[SS_START..SS_START + 8]),
            endian.read_f64(&header[SS_START + 8..SS_START + 16]),
            endian.read_f64(&header[SS_START + 16..SS_START + 24]),
        ];
        let ncon = endian.read_i32(&header[NCON_AT..NCON_AT + 4]).max(0) as usize;
        let au_km = endian.read_f64(&header[AU_AT..AU_AT + 8]);
        let emrat = endian.read_f64(&header[EMRAT_AT..EMRAT_AT + 8]);
        let numde = endian.read_i32(&header[NUMDE_AT..NUMDE_AT + 4]);

        let read_pointer = |at: usize| -> Result<SeriesPointer> {
            let word = |k: usize| endian.read_i32(&header[at + 4 * k..at + 4 * k + 4]);
            let (offset, ncf, na) = (word(0), word(1), word(2));
            if offset < 0 || ncf < 0 || na < 0 {
                return Err(JplephemError::InvalidFormat(format!(
                    "negative coefficient pointer ({}, {}, {})",
                    offset, ncf, na
                )));
            }
            Ok(SeriesPointer {
                offset: offset as usize,
                ncf: ncf as usize,
                na: na as usize,
            })
        };
        let mut pointers = [SeriesPointer::default(); 13];
        for (i, pointer) in pointers.iter_mut().take(12).enumerate() {
            *pointer = read_pointer(IPT_START + 12 * i)?;
        }
        pointers[LIBRATION] = read_pointer(LPT_START)?;

        let ncoeff = pointers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_present())
            .map(|(i, p)| p.last_word(if i == NUTATION { 2 } else { 3 }))
            .max()
            .unwrap_or(0);

        if ss[2] <= 0.0 || ss[1] <= ss[0] {
            return Err(JplephemError::InvalidFormat(format!(
                "bad coverage in header: start={} end={} step={}",
                ss[0], ss[1], ss[2]
            )));
        }
        if ncoeff * 8 < HEADER_BYTES {
            return Err(JplephemError::InvalidFormat(format!(
                "record length of {} words cannot hold the header",
                ncoeff
            )));
        }

        let n_records = ((ss[1] - ss[0]) / ss[2]).round() as usize;
        if n_records == 0 {
            return Err(JplephemError::InvalidFormat(format!(
                "record span {} exceeds the covered interval",
                ss[2]
            )));
        }
        let needed = (2 + n_records) * ncoeff * 8;
        if map.len() < needed {
            return Err(JplephemError::InvalidFormat(format!(
                "{} holds {} bytes, coverage needs {}",
                path.display(),
                map.len(),
                needed
            )));
        }

        let constant_names = (0..ncon.min(MAX_CONSTANTS))
            .map(|i| {
                let at = CNAM_START + 6 * i;
                String::from_utf8_lossy(&header[at..at + 6]).trim().to_string()
            })
            .collect();

        log::info!(
            "opened DE{} ephemeris {} covering JD {}..{}",
            numde,
            path.display(),
            ss[0],
            ss[1]
        );

        Ok(JplEph {
            path,
            title,
            start_jd: ss[0],
            end_jd: ss[1],
            record_span: ss[2],
            au_km,
            emrat,
            numde,
            ncoeff,
            n_records,
            endian,
            pointers,
            constant_names,
            map,
        })
    }

    fn detect_endian(header: &[u8]) -> Result<Endian> {
        let plausible = |e: Endian| (1..=10_000).contains(&e.read_i32(&header[NUMDE_AT..NUMDE_AT + 4]));
        if plausible(Endian::Little) {
            Ok(Endian::Little)
        } else if plausible(Endian::Big) {
            Ok(Endian::Big)
        } else {
            Err(JplephemError::InvalidFormat(
                "could not determine byte order from the DE number".to_string(),
            ))
        }
    }

    /// Named constant from the second record, e.g. `"AU"` or `"EMRAT"`
    pub fn constant(&self, name: &str) -> Option<f64> {
        let index = self.constant_names.iter().position(|n| n == name)?;
        let at = self.ncoeff * 8 + index * 8;
        Some(self.endian.read_f64(&self.map[at..at + 8]))
    }

    pub fn constant_names(&self) -> &[String] {
        &self.constant_names
    }

    /// Whether this file carries a series for the target
    pub fn has_target(&self, target: DeTarget) -> bool {
        match target.slot() {
            Some(slot) => self.pointers[slot].is_present(),
            None if target == DeTarget::Earth => {
                self.pointers[2].is_present() && self.pointers[9].is_present()
            }
            None => true,
        }
    }

    /// Barycentric position (km) and velocity (km/day) at a split TDB Julian date
    pub fn state(
        &self,
        target: DeTarget,
        jd_whole: f64,
        jd_frac: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        match target {
            DeTarget::SolarSystemBarycenter => {
                self.check_range(jd_whole, jd_frac)?;
                Ok((Vector3::zeros(), Vector3::zeros()))
            }
            DeTarget::Earth => {
                let (emb, emb_v) = self.stored_state(2, jd_whole, jd_frac)?;
                let (moon, moon_v) = self.stored_state(9, jd_whole, jd_frac)?;
                let share = 1.0 / (1.0 + self.emrat);
                Ok((emb - moon * share, emb_v - moon_v * share))
            }
            DeTarget::Moon => {
                let (emb, emb_v) = self.stored_state(2, jd_whole, jd_frac)?;
                let (moon, moon_v) = self.stored_state(9, jd_whole, jd_frac)?;
                let share = 1.0 / (1.0 + self.emrat);
                let (earth, earth_v) = (emb - moon * share, emb_v - moon_v * share);
                Ok((earth + moon, earth_v + moon_v))
            }
            _ => match target.slot() {
                Some(slot) => self.stored_state(slot, jd_whole, jd_frac),
                None => Err(JplephemError::InvalidFormat(format!(
                    "{:?} has no series slot",
                    target
                ))),
            },
        }
    }

    /// Barycentric position in kilometers
    pub fn position(&self, target: DeTarget, jd_whole: f64, jd_frac: f64) -> Result<Vector3<f64>> {
        Ok(self.state(target, jd_whole, jd_frac)?.0)
    }

    fn check_range(&self, jd_whole: f64, jd_frac: f64) -> Result<()> {
        let jd = jd_whole + jd_frac;
        if jd < self.start_jd || jd > self.end_jd {
            return Err(JplephemError::OutOfRange {
                jd,
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }
        Ok(())
    }

    /// Evaluate the series in `slot` as stored, i.e. without the Earth/Moon split
    fn stored_state(
        &self,
        slot: usize,
        jd_whole: f64,
        jd_frac: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        self.check_range(jd_whole, jd_frac)?;
        let pointer = self.pointers[slot];
        if !pointer.is_present() {
            return Err(JplephemError::BodyNotFound {
                center: 0,
                target: slot as i32,
            });
        }

        let since_start = (jd_whole - self.start_jd) + jd_frac;
        let index = ((since_start / self.record_span).floor() as usize).min(self.n_records - 1);
        let record = self.record(index);
        let words: &[f64] = &record;

        let record_start = words[0];
        let t = ((jd_whole - record_start) + jd_frac) / self.record_span;
        let na = pointer.na as f64;
        let sub = ((na * t).floor() as usize).min(pointer.na - 1);
        let tc = 2.0 * (na * t - sub as f64) - 1.0;

        let base = pointer.offset - 1 + sub * 3 * pointer.ncf;
        let series = move |k: usize| {
            let start = base + k * pointer.ncf;
            ChebyshevPolynomial::new(&words[start..start + pointer.ncf])
        };
        let scale = 2.0 * na / self.record_span;

        let position = Vector3::new(series(0).evaluate(tc), series(1).evaluate(tc), series(2).evaluate(tc));
        let velocity = Vector3::new(
            series(0).derivative(tc),
            series(1).derivative(tc),
            series(2).derivative(tc),
        ) * scale;
        Ok((position, velocity))
    }

    /// Decode data record `index` (0-based, after the two header records)
    fn record(&self, index: usize) -> Vec<f64> {
        let bytes = self.ncoeff * 8;
        let start = (index + 2) * bytes;
        self.map[start..start + bytes]
            .chunks_exact(8)
            .map(|chunk| self.endian.read_f64(chunk))
            .collect()
    }
}

impl Drop for JplEph {
    fn drop(&mut self) {
        log::info!("closing DE{} ephemeris {}", self.numde, self.path.display());
    }
}

impl fmt::Debug for JplEph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JplEph")
            .field("path", &self.path)
            .field("numde", &self.numde)
            .field("start_jd", &self.start_jd)
            .field("end_jd", &self.end_jd)
            .field("ncoeff", &self.ncoeff)
            .finish()
    }
}
