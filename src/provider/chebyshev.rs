use std::path::Path;

use nalgebra::Vector3;

use crate::catalog::{BodyKind, BodyRecord};
use crate::jplephem::{DeTarget, JplEph};
use crate::provider::{Coverage, Origin, PositionProvider, ProviderFrame};
use crate::time::Time;
use crate::units::LengthUnit;
use crate::{OrreryError, Result};

/// Barycentric positions from a JPL DE binary ephemeris
///
/// Bodies are matched to the file's series by name; the outer planets come
/// back as their system barycenters, which is what the DE files store.
#[derive(Debug)]
pub struct ChebyshevProvider {
    name: String,
    eph: JplEph,
}

impl ChebyshevProvider {
    /// Open the ephemeris file; failure here is a fatal startup error
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let eph = JplEph::open(path)?;
        Ok(Self::from_ephemeris(eph))
    }

    pub fn from_ephemeris(eph: JplEph) -> Self {
        Self {
            name: format!("DE{} ({})", eph.numde, eph.path.display()),
            eph,
        }
    }

    pub fn ephemeris(&self) -> &JplEph {
        &self.eph
    }

    /// DE series for a body; the catalog root is the Sun whatever it is called
    fn target(&self, body: &BodyRecord) -> Result<DeTarget> {
        let root = body.kind == BodyKind::Star && !body.has_parent();
        let named = if root { Some(DeTarget::Sun) } else { DeTarget::from_name(&body.name) };
        named
            .filter(|&t| self.eph.has_target(t))
            .ok_or_else(|| OrreryError::UnsupportedBody {
                body: body.name.clone(),
                provider: self.name.clone(),
            })
    }
}

impl PositionProvider for ChebyshevProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame(&self) -> ProviderFrame {
        ProviderFrame {
            origin: Origin::Barycentric,
            unit: LengthUnit::Kilometers,
        }
    }

    fn coverage(&self) -> Coverage {
        Coverage::new(self.eph.start_jd, self.eph.end_jd)
    }

    fn supports(&self, body: &BodyRecord) -> bool {
        self.target(body).is_ok()
    }

    fn position_relative_to_origin(&self, body: &BodyRecord, time: &Time) -> Result<Vector3<f64>> {
        let target = self.target(body)?;
        let (whole, fraction) = time.tdb_split();
        // Velocity is evaluated alongside but not needed here.
        let (position, _) = self.eph.state(target, whole, fraction)?;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BodyCatalog, BodyKind};
    use crate::jplephem::fixtures::{de_slot_position, write_linear_de, DE_EMRAT};
    use crate::jplephem::JplephemError;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn provider(dir: &TempDir) -> ChebyshevProvider {
        let path = dir.path().join("lnxsynthetic.999");
        write_linear_de(&path, 2_451_536.5, 2_451_664.5, 32.0).unwrap();
        ChebyshevProvider::open(path).unwrap()
    }

    #[test]
    fn test_frame_and_coverage() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        assert_eq!(p.frame().origin, Origin::Barycentric);
        assert_eq!(p.frame().unit, LengthUnit::Kilometers);
        assert_eq!(p.coverage(), Coverage::new(2_451_536.5, 2_451_664.5));
        assert!(p.name().starts_with("DE999"));
    }

    #[test]
    fn test_positions_match_file() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let catalog = BodyCatalog::solar_system();
        let t = Time::from_tt(2_451_545.0, None);
        let jd = t.tdb();

        let sun = p.position_relative_to_origin(catalog.root(), &t).unwrap();
        assert_relative_eq!(sun.x, de_slot_position(10, jd).x, epsilon = 1e-6);

        let jupiter = p
            .position_relative_to_origin(catalog.get("Jupiter").unwrap(), &t)
            .unwrap();
        assert_relative_eq!(jupiter.y, de_slot_position(4, jd).y, epsilon = 1e-6);

        let earth = p
            .position_relative_to_origin(catalog.get("Earth").unwrap(), &t)
            .unwrap();
        let expected = de_slot_position(2, jd) - de_slot_position(9, jd) / (1.0 + DE_EMRAT);
        assert_relative_eq!(earth.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn test_unsupported_body() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let io = BodyRecord::new("Io", "Jupiter", 0.286, "", 0.0048, BodyKind::NaturalSatellite);
        assert!(!p.supports(&io));
        assert!(matches!(
            p.position_relative_to_origin(&io, &Time::from_tt(2_451_545.0, None)),
            Err(OrreryError::UnsupportedBody { .. })
        ));
    }

    #[test]
    fn test_root_under_another_name_is_the_sun() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let sol = BodyRecord::new("Sol", "", 109.0, "", 0.0, BodyKind::Star);
        let t = Time::from_tt(2_451_545.0, None);
        assert!(p.supports(&sol));
        let sun = p.position_relative_to_origin(&sol, &t).unwrap();
        assert_relative_eq!(sun.x, de_slot_position(10, t.tdb()).x, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_range_surfaces_reader_error() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let catalog = BodyCatalog::solar_system();
        let t = Time::from_tt(2_460_000.5, None);
        assert!(!p.coverage().contains(&t));
        assert!(matches!(
            p.position_relative_to_origin(catalog.root(), &t),
            Err(OrreryError::Ephemeris(JplephemError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ChebyshevProvider::open(dir.path().join("lnxp1900p2053.421")),
            Err(OrreryError::Ephemeris(JplephemError::Io { .. }))
        ));
    }
}
