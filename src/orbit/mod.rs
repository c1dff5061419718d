//! Orbit polylines and orbital-plane normals sampled from a [`SystemModel`]
//!
//! Both are sampled in the parent's frame, so a moon's orbit is drawn around
//! its planet rather than smeared along the planet's path round the Sun.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::catalog::BodyRecord;
use crate::constants::SECONDS_PER_YEAR;
use crate::model::SystemModel;
use crate::time::{linspace, Time};
use crate::{OrreryError, Result};

/// Default number of samples per orbit
pub const DEFAULT_SAMPLES: usize = 60;
/// Default length of the orbital normal, in Earth radii
pub const DEFAULT_NORMAL_LENGTH: f64 = 1000.0;

/// One straight piece of an orbit polyline
pub type Segment = (Vector3<f64>, Vector3<f64>);

/// Closed polyline through one orbital period
///
/// Points are relative to the body's position at the first sample.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPath {
    pub points: Vec<Vector3<f64>>,
}

impl OrbitPath {
    /// `(p_i, p_{i+1})` for each consecutive pair, then `(p_last, p_0)`
    pub fn segments(&self) -> Vec<Segment> {
        let n = self.points.len();
        (0..n).map(|i| (self.points[i], self.points[(i + 1) % n])).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Orbit sampling settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSampler {
    /// Samples per orbit, at least 2
    pub samples: usize,
    /// Length the orbital normal is scaled to, in Earth radii
    pub normal_length: f64,
}

impl Default for OrbitSampler {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            normal_length: DEFAULT_NORMAL_LENGTH,
        }
    }
}

impl OrbitSampler {
    pub fn new(samples: usize) -> Self {
        Self {
            samples: samples.max(2),
            ..Self::default()
        }
    }

    pub fn with_normal_length(mut self, length: f64) -> Self {
        self.normal_length = length;
        self
    }

    /// Period in SI seconds, or `None` for bodies that do not orbit
    fn period_seconds(body: &BodyRecord) -> Option<f64> {
        if body.orbital_period == 0.0 {
            None
        } else {
            Some(body.orbital_period * SECONDS_PER_YEAR)
        }
    }

    /// Sample one full period starting at `now`
    ///
    /// `None` for a body with zero period, such as the root.
    pub fn orbit_path(&self, model: &SystemModel, body: &BodyRecord, now: &Time) -> Result<Option<OrbitPath>> {
        let Some(period) = Self::period_seconds(body) else {
            return Ok(None);
        };

        let end = now.add_seconds(period);
        let times = linspace(now, &end, self.samples.max(2));
        let mut points = Vec::with_capacity(times.len());
        for t in &times {
            points.push(model.parent_relative_position(body, t)?);
        }
        let anchor = points[0];
        for p in points.iter_mut() {
            *p -= anchor;
        }

        log::debug!("sampled {} points along the orbit of {}", points.len(), body.name);
        Ok(Some(OrbitPath { points }))
    }

    /// Approximate orbital-plane normal scaled to `length`
    ///
    /// Uses the positions at `now`, a quarter period later and half a period
    /// later. `None` for a body with zero period.
    pub fn orbital_normal(
        &self,
        model: &SystemModel,
        body: &BodyRecord,
        now: &Time,
        length: f64,
    ) -> Result<Option<Vector3<f64>>> {
        let Some(period) = Self::period_seconds(body) else {
            return Ok(None);
        };

        let p0 = model.parent_relative_position(body, now)?;
        let p1 = model.parent_relative_position(body, &now.add_seconds(period / 4.0))?;
        let p2 = model.parent_relative_position(body, &now.add_seconds(period / 2.0))?;

        let normal = (p1 - p0).cross(&(p2 - p0));
        match normal.try_normalize(f64::EPSILON) {
            Some(unit) => Ok(Some(unit * length)),
            None => Err(OrreryError::DegenerateOrbit(body.name.clone())),
        }
    }

    /// [`Self::orbital_normal`] with the configured length
    pub fn up_vector(&self, model: &SystemModel, body: &BodyRecord, now: &Time) -> Result<Option<Vector3<f64>>> {
        self.orbital_normal(model, body, now, self.normal_length)
    }
}
