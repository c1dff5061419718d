//! Length units used by position providers

use crate::constants::{AU_KM, EARTH_RADII_PER_AU, KM_PER_EARTH_RADIUS};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a position provider reports its vectors in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Kilometers,
    EarthRadii,
    AstronomicalUnits,
}

impl LengthUnit {
    /// Convert a vector expressed in this unit into Earth radii
    pub fn to_earth_radii(self, v: Vector3<f64>) -> Vector3<f64> {
        match self {
            LengthUnit::Kilometers => km_to_earth_radii(v),
            LengthUnit::EarthRadii => v,
            LengthUnit::AstronomicalUnits => v * EARTH_RADII_PER_AU,
        }
    }

    /// Convert a vector expressed in this unit into kilometers
    pub fn to_km(self, v: Vector3<f64>) -> Vector3<f64> {
        match self {
            LengthUnit::Kilometers => v,
            LengthUnit::EarthRadii => v * KM_PER_EARTH_RADIUS,
            LengthUnit::AstronomicalUnits => v * AU_KM,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LengthUnit::Kilometers => "km",
            LengthUnit::EarthRadii => "R⊕",
            LengthUnit::AstronomicalUnits => "AU",
        };
        write!(f, "{}", name)
    }
}

/// Convert kilometers to Earth radii
pub fn km_to_earth_radii(v: Vector3<f64>) -> Vector3<f64> {
    v / KM_PER_EARTH_RADIUS
}
