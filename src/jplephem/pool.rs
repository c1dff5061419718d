//! Ordered set of loaded SPK kernels
//!
//! Kernels are searched newest first, so a kernel furnished later takes
//! priority wherever its segments overlap an earlier one.

use std::path::Path;

use nalgebra::Vector3;

use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::targets::SOLAR_SYSTEM_BARYCENTER;
use crate::jplephem::spk::{seconds_to_jd, Segment, SPK};

/// Deepest center chain followed before giving up on reaching the barycenter
const MAX_CHAIN_DEPTH: usize = 32;

#[derive(Debug, Default)]
pub struct KernelPool {
    kernels: Vec<SPK>,
}

impl KernelPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an SPK file, giving it priority over everything loaded before
    pub fn furnish<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let spk = SPK::open(path)?;
        self.kernels.push(spk);
        Ok(())
    }

    /// Build a pool from paths loaded in the given order
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut pool = Self::new();
        for path in paths {
            pool.furnish(path)?;
        }
        Ok(pool)
    }

    pub fn kernels(&self) -> &[SPK] {
        &self.kernels
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Whether any loaded segment of a supported type has this target
    pub fn has_target(&self, target: i32) -> bool {
        self.segments()
            .any(|(_, seg)| seg.target == target && seg.is_supported())
    }

    /// Outer bounds (TDB Julian dates) of all loaded segments
    pub fn coverage(&self) -> Option<(f64, f64)> {
        self.segments().fold(None, |acc, (_, seg)| match acc {
            None => Some((seg.start_jd, seg.end_jd)),
            Some((start, end)) => Some((start.min(seg.start_jd), end.max(seg.end_jd))),
        })
    }

    /// Outer bounds of the segments for one target
    pub fn coverage_of(&self, target: i32) -> Option<(f64, f64)> {
        self.segments()
            .filter(|(_, seg)| seg.target == target)
            .fold(None, |acc, (_, seg)| match acc {
                None => Some((seg.start_jd, seg.end_jd)),
                Some((start, end)) => Some((start.min(seg.start_jd), end.max(seg.end_jd))),
            })
    }

    /// Segments in priority order: last kernel first, last segment first
    fn segments(&self) -> impl Iterator<Item = (&SPK, &Segment)> + '_ {
        self.kernels
            .iter()
            .rev()
            .flat_map(|spk| spk.segments.iter().rev().map(move |seg| (spk, seg)))
    }

    /// Highest-priority segment for `target` covering `et`
    fn find_segment(&self, target: i32, et: f64) -> Result<(&SPK, &Segment)> {
        let mut seen = false;
        for (spk, seg) in self.segments().filter(|(_, seg)| seg.target == target) {
            seen = true;
            if seg.covers(et) {
                return Ok((spk, seg));
            }
        }

        match (seen, self.coverage_of(target)) {
            (true, Some((start_jd, end_jd))) => Err(JplephemError::OutOfRange {
                jd: seconds_to_jd(et),
                start_jd,
                end_jd,
            }),
            _ => Err(JplephemError::BodyNotFound {
                center: SOLAR_SYSTEM_BARYCENTER,
                target,
            }),
        }
    }

    /// State of `target` relative to the solar-system barycenter
    fn barycentric_state(&self, target: i32, et: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        let mut body = target;

        for _ in 0..MAX_CHAIN_DEPTH {
            if body == SOLAR_SYSTEM_BARYCENTER {
                return Ok((position, velocity));
            }
            let (spk, seg) = self.find_segment(body, et)?;
            let (p, v) = seg.state_at_seconds(&spk.daf, et)?;
            position += p;
            velocity += v;
            body = seg.center;
        }

        Err(JplephemError::InvalidFormat(format!(
            "segment centers for {} do not reach the solar-system barycenter",
            target
        )))
    }

    /// Position (km) and velocity (km/s) of `target` relative to `observer`
    /// at TDB seconds past J2000
    pub fn state(&self, target: i32, observer: i32, et: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        if target == observer {
            return Ok((Vector3::zeros(), Vector3::zeros()));
        }
        let (tp, tv) = self.barycentric_state(target, et)?;
        let (op, ov) = self.barycentric_state(observer, et)?;
        Ok((tp - op, tv - ov))
    }

    /// Position (km) of `target` relative to `observer` at TDB seconds past J2000
    pub fn position(&self, target: i32, observer: i32, et: f64) -> Result<Vector3<f64>> {
        Ok(self.state(target, observer, et)?.0)
    }
}

impl Drop for KernelPool {
    fn drop(&mut self) {
        for spk in self.kernels.iter().rev() {
            log::info!("unloading kernel {}", spk.daf.path.display());
        }
    }
}
