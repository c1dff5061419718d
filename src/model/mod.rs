//! Sun-relative and parent-relative body positions in Earth radii

use nalgebra::Vector3;

use crate::catalog::{BodyCatalog, BodyRecord};
use crate::provider::{Coverage, Origin, PositionProvider};
use crate::time::Time;
use crate::{OrreryError, Result};

/// A body catalog paired with the ephemeris that positions it
///
/// Read-only after construction; every query is a pure function of body and
/// time.
pub struct SystemModel {
    catalog: BodyCatalog,
    provider: Box<dyn PositionProvider>,
}

impl SystemModel {
    pub fn new(catalog: BodyCatalog, provider: Box<dyn PositionProvider>) -> Self {
        log::info!(
            "system model with {} bodies on {} ({:?}, {})",
            catalog.len(),
            provider.name(),
            provider.frame().origin,
            provider.frame().unit
        );
        Self { catalog, provider }
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    pub fn provider(&self) -> &dyn PositionProvider {
        self.provider.as_ref()
    }

    pub fn coverage(&self) -> Coverage {
        self.provider.coverage()
    }

    /// Look up a body by name, failing for names outside the catalog
    pub fn body(&self, name: &str) -> Result<&BodyRecord> {
        self.catalog.get(name).ok_or_else(|| OrreryError::UnsupportedBody {
            body: name.to_string(),
            provider: "catalog".to_string(),
        })
    }

    /// Position of `body` relative to the catalog root, in Earth radii
    pub fn sun_relative_position(&self, body: &BodyRecord, time: &Time) -> Result<Vector3<f64>> {
        let frame = self.provider.frame();
        let raw = self.provider.position_relative_to_origin(body, time)?;
        let relative = match frame.origin {
            Origin::Heliocentric => raw,
            Origin::Barycentric => {
                raw - self
                    .provider
                    .position_relative_to_origin(self.catalog.root(), time)?
            }
        };
        Ok(frame.unit.to_earth_radii(relative))
    }

    /// Position of `body` relative to its parent, in Earth radii
    ///
    /// Both absolute positions are computed and differenced; offsets are
    /// never chained through intermediate generations. Zero for the root.
    pub fn parent_relative_position(&self, body: &BodyRecord, time: &Time) -> Result<Vector3<f64>> {
        match self.catalog.parent_of(body)? {
            None => Ok(Vector3::zeros()),
            Some(parent) => {
                let own = self.sun_relative_position(body, time)?;
                let parents = self.sun_relative_position(parent, time)?;
                Ok(own - parents)
            }
        }
    }
}

impl std::fmt::Debug for SystemModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemModel")
            .field("bodies", &self.catalog.len())
            .field("provider", &self.provider.name())
            .finish()
    }
}
