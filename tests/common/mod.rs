//! Analytic position provider shared by the integration tests
//!
//! Every body moves on a circle around its parent. Circles are tilted about
//! the x axis so orbital normals are known in closed form. In the barycentric
//! variant the root itself wobbles around the origin, so the model has to
//! subtract it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::f64::consts::TAU;

use nalgebra::Vector3;
use orrery::constants::{AU_KM, J2000, SECONDS_PER_YEAR, DAY_S};
use orrery::{
    BodyCatalog, BodyKind, BodyRecord, Coverage, LengthUnit, Origin, OrreryError, PositionProvider,
    ProviderFrame, Result, Time,
};

#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub radius_km: f64,
    pub period_days: f64,
    pub phase: f64,
    pub inclination: f64,
}

impl Circle {
    /// Offset from the parent at TDB Julian date `jd`
    pub fn offset(&self, jd: f64) -> Vector3<f64> {
        if self.radius_km == 0.0 {
            return Vector3::zeros();
        }
        let theta = TAU * (jd - J2000) / self.period_days + self.phase;
        let (s, c) = theta.sin_cos();
        let (si, ci) = self.inclination.sin_cos();
        Vector3::new(self.radius_km * c, self.radius_km * s * ci, self.radius_km * s * si)
    }

    /// Unit normal of the orbital plane for counter-clockwise motion
    pub fn normal(&self) -> Vector3<f64> {
        let (si, ci) = self.inclination.sin_cos();
        Vector3::new(0.0, -si, ci)
    }
}

/// Semi-major axes in km for the bodies the tests know by name
fn radius_km(name: &str) -> f64 {
    match name {
        "Mercury" => 0.387 * AU_KM,
        "Venus" => 0.723 * AU_KM,
        "Earth" => 1.0 * AU_KM,
        "Mars" => 1.524 * AU_KM,
        "Jupiter" => 5.203 * AU_KM,
        "Saturn" => 9.537 * AU_KM,
        "Uranus" => 19.19 * AU_KM,
        "Neptune" => 30.07 * AU_KM,
        "Moon" => 384_400.0,
        "Io" => 421_700.0,
        _ => 1.0e6,
    }
}

pub struct CircularEphemeris {
    origin: Origin,
    root: String,
    parents: HashMap<String, String>,
    circles: HashMap<String, Circle>,
    wobble: Circle,
}

impl CircularEphemeris {
    /// Circles for every catalog body, with periods taken from the catalog
    pub fn for_catalog(catalog: &BodyCatalog, origin: Origin) -> Self {
        let mut parents = HashMap::new();
        let mut circles = HashMap::new();
        for (i, body) in catalog.iter().enumerate() {
            if body.orbital_period == 0.0 {
                continue;
            }
            parents.insert(body.name.clone(), body.parent_name.clone());
            circles.insert(
                body.name.clone(),
                Circle {
                    radius_km: radius_km(&body.name),
                    period_days: body.orbital_period * SECONDS_PER_YEAR / DAY_S,
                    phase: 0.7 * i as f64,
                    inclination: 0.03 * i as f64,
                },
            );
        }
        Self {
            origin,
            root: catalog.root().name.clone(),
            parents,
            circles,
            wobble: Circle {
                radius_km: 740_000.0,
                period_days: 4332.6,
                phase: 0.3,
                inclination: 0.02,
            },
        }
    }

    pub fn without(mut self, name: &str) -> Self {
        self.circles.remove(name);
        self
    }

    pub fn with_circle(mut self, name: &str, circle: Circle) -> Self {
        self.circles.insert(name.to_string(), circle);
        self
    }

    pub fn circle(&self, name: &str) -> Option<Circle> {
        self.circles.get(name).copied()
    }

    /// Position relative to the root, composed directly from the circles (km)
    pub fn heliocentric_km(&self, name: &str, jd: f64) -> Option<Vector3<f64>> {
        let mut total = Vector3::zeros();
        let mut current = name;
        while current != self.root {
            total += self.circles.get(current)?.offset(jd);
            current = self.parents.get(current)?;
        }
        Some(total)
    }
}

impl PositionProvider for CircularEphemeris {
    fn name(&self) -> &str {
        match self.origin {
            Origin::Barycentric => "circles (barycentric)",
            Origin::Heliocentric => "circles (heliocentric)",
        }
    }

    fn frame(&self) -> ProviderFrame {
        ProviderFrame {
            origin: self.origin,
            unit: LengthUnit::Kilometers,
        }
    }

    fn coverage(&self) -> Coverage {
        Coverage::new(2_305_447.5, 2_688_976.5)
    }

    fn supports(&self, body: &BodyRecord) -> bool {
        body.name == self.root || self.circles.contains_key(&body.name)
    }

    fn position_relative_to_origin(&self, body: &BodyRecord, time: &Time) -> Result<Vector3<f64>> {
        let jd = time.tdb();
        let helio = self
            .heliocentric_km(&body.name, jd)
            .ok_or_else(|| OrreryError::UnsupportedBody {
                body: body.name.clone(),
                provider: self.name().to_string(),
            })?;
        Ok(match self.origin {
            Origin::Heliocentric => helio,
            Origin::Barycentric => self.wobble.offset(jd) + helio,
        })
    }
}

/// Sun, Jupiter and Io
pub fn jovian_catalog() -> BodyCatalog {
    BodyCatalog::from_records(vec![
        BodyRecord::new("Sun", "", 109.0, "sun", 0.0, BodyKind::Star),
        BodyRecord::new("Jupiter", "Sun", 11.21, "2k_jupiter", 11.862615, BodyKind::Planet),
        BodyRecord::new("Io", "Jupiter", 0.286, "io", 1.769_137_786 / 365.25, BodyKind::NaturalSatellite),
    ])
    .unwrap()
}

/// Sun and Earth only
pub fn sun_earth_catalog() -> BodyCatalog {
    BodyCatalog::from_records(vec![
        BodyRecord::new("Sun", "", 109.0, "sun", 0.0, BodyKind::Star),
        BodyRecord::new("Earth", "Sun", 1.0, "earth", 1.0000174, BodyKind::Planet),
    ])
    .unwrap()
}

pub fn j2000() -> Time {
    Time::from_tt(J2000, None)
}
