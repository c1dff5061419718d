use std::path::Path;

use nalgebra::Vector3;

use crate::catalog::{BodyKind, BodyRecord};
use crate::jplephem::names::{barycenter_of, target_id, targets};
use crate::jplephem::KernelPool;
use crate::provider::{Coverage, Origin, PositionProvider, ProviderFrame};
use crate::time::Time;
use crate::units::LengthUnit;
use crate::{OrreryError, Result};

/// Sun-relative positions from one or more SPK kernels
///
/// Kernels are loaded in the order given; where they overlap, the one loaded
/// last answers.
#[derive(Debug)]
pub struct KernelProvider {
    name: String,
    pool: KernelPool,
}

impl KernelProvider {
    /// Load every kernel in order; any failure is a fatal startup error
    pub fn open<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let pool = KernelPool::from_paths(paths)?;
        Self::from_pool(pool)
    }

    pub fn from_pool(pool: KernelPool) -> Result<Self> {
        if pool.is_empty() {
            return Err(OrreryError::Config("no SPK kernels were given".to_string()));
        }
        let name = pool
            .kernels()
            .iter()
            .filter_map(|spk| spk.daf.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("+");
        Ok(Self { name, pool })
    }

    pub fn pool(&self) -> &KernelPool {
        &self.pool
    }

    /// NAIF code to query for a body
    ///
    /// The catalog root is the Sun whatever it is called. A planet uses its
    /// center when the kernels carry it, otherwise the system barycenter (DE
    /// kernels only hold barycenters for the outer planets). Satellites need
    /// their own segment.
    fn naif_id(&self, body: &BodyRecord) -> Result<i32> {
        if body.kind == BodyKind::Star && !body.has_parent() {
            return Ok(targets::SUN);
        }
        let unsupported = || OrreryError::UnsupportedBody {
            body: body.name.clone(),
            provider: self.name.clone(),
        };
        let id = target_id(&body.name).ok_or_else(unsupported)?;
        if self.pool.has_target(id) {
            return Ok(id);
        }
        match barycenter_of(id) {
            Some(bary) if self.pool.has_target(bary) => {
                log::debug!(
                    "{}: no segment for {} ({}), using barycenter {}",
                    self.name,
                    body.name,
                    id,
                    bary
                );
                Ok(bary)
            }
            _ => Err(unsupported()),
        }
    }
}

impl PositionProvider for KernelProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame(&self) -> ProviderFrame {
        ProviderFrame {
            origin: Origin::Heliocentric,
            unit: LengthUnit::Kilometers,
        }
    }

    fn coverage(&self) -> Coverage {
        // Kernels holding no segments cover nothing.
        match self.pool.coverage() {
            Some((start, end)) => Coverage::new(start, end),
            None => Coverage::new(f64::INFINITY, f64::NEG_INFINITY),
        }
    }

    fn supports(&self, body: &BodyRecord) -> bool {
        self.naif_id(body).is_ok()
    }

    fn position_relative_to_origin(&self, body: &BodyRecord, time: &Time) -> Result<Vector3<f64>> {
        let id = self.naif_id(body)?;
        let et = time.tdb_seconds_from_j2000();
        Ok(self.pool.position(id, targets::SUN, et)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BodyCatalog;
    use crate::jplephem::fixtures::{write_spk, LinearSegment};
    use crate::jplephem::JplephemError;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    const DAY: f64 = 86_400.0;

    fn segments() -> Vec<LinearSegment> {
        vec![
            LinearSegment::new(10, 0, -20.0 * DAY, 20.0 * DAY),
            LinearSegment::new(3, 0, -20.0 * DAY, 20.0 * DAY),
            LinearSegment::new(399, 3, -20.0 * DAY, 20.0 * DAY),
            LinearSegment::new(5, 0, -20.0 * DAY, 20.0 * DAY),
        ]
    }

    fn provider(dir: &TempDir) -> KernelProvider {
        let path = dir.path().join("de_synthetic.bsp");
        write_spk(&path, &segments()).unwrap();
        KernelProvider::open([path]).unwrap()
    }

    #[test]
    fn test_frame_and_name() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        assert_eq!(p.frame().origin, Origin::Heliocentric);
        assert_eq!(p.name(), "de_synthetic.bsp");
        assert_relative_eq!(p.coverage().start_jd, 2_451_525.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sun_is_origin() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let catalog = BodyCatalog::solar_system();
        let t = Time::from_tt(2_451_545.0, None);
        assert_eq!(
            p.position_relative_to_origin(catalog.root(), &t).unwrap(),
            Vector3::zeros()
        );
    }

    #[test]
    fn test_planet_center_and_barycenter_fallback() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let catalog = BodyCatalog::solar_system();
        let t = Time::from_tt(2_451_546.0, None);
        let et = t.tdb_seconds_from_j2000();
        let segs = segments();
        let sun = segs[0].position(et);

        let earth = p
            .position_relative_to_origin(catalog.get("Earth").unwrap(), &t)
            .unwrap();
        let expected = segs[1].position(et) + segs[2].position(et) - sun;
        assert_relative_eq!(earth.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(earth.y, expected.y, epsilon = 1e-6);

        // Only the Jupiter barycenter (5) exists, not 599
        let jupiter = p
            .position_relative_to_origin(catalog.get("Jupiter").unwrap(), &t)
            .unwrap();
        let expected = segs[3].position(et) - sun;
        assert_relative_eq!(jupiter.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn test_moon_needs_its_own_segment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_moon.bsp");
        write_spk(&path, &segments()[..3]).unwrap();
        let p = KernelProvider::open([path]).unwrap();
        let catalog = BodyCatalog::solar_system();
        let moon = catalog.get("Moon").unwrap();

        // The Earth-Moon barycenter (3) is present but is not the Moon
        assert!(p.pool().has_target(3));
        assert!(!p.supports(moon));
        assert!(matches!(
            p.position_relative_to_origin(moon, &Time::from_tt(2_451_545.0, None)),
            Err(OrreryError::UnsupportedBody { .. })
        ));
        assert!(p.supports(catalog.get("Earth").unwrap()));
    }

    #[test]
    fn test_root_is_found_by_role_not_name() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let catalog = BodyCatalog::from_records(vec![
            BodyRecord::new("Sol", "", 109.0, "", 0.0, BodyKind::Star),
            BodyRecord::new("Earth", "Sol", 1.0, "", 1.0, BodyKind::Planet),
        ])
        .unwrap();
        let sol = catalog.root();
        assert!(p.supports(sol));
        let t = Time::from_tt(2_451_545.0, None);
        assert_eq!(p.position_relative_to_origin(sol, &t).unwrap(), Vector3::zeros());
    }

    #[test]
    fn test_kernel_with_unsupported_segment_type_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.bsp");
        let sun = LinearSegment::new(10, 0, -20.0 * DAY, 20.0 * DAY);
        let emb = LinearSegment::new(3, 0, -20.0 * DAY, 20.0 * DAY);
        let ceres = LinearSegment::new(2_000_001, 10, -20.0 * DAY, 20.0 * DAY).with_type(21);
        write_spk(&path, &[sun.clone(), ceres, emb.clone()]).unwrap();

        let p = KernelProvider::open([path]).unwrap();
        let t = Time::from_tt(2_451_546.0, None);
        let et = t.tdb_seconds_from_j2000();
        let expected = emb.position(et) - sun.position(et);
        let actual = p.pool().position(3, targets::SUN, et).unwrap();
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(actual.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn test_unsupported_and_out_of_range() {
        let dir = TempDir::new().unwrap();
        let p = provider(&dir);
        let catalog = BodyCatalog::solar_system();
        let saturn = catalog.get("Saturn").unwrap();
        assert!(!p.supports(saturn));
        assert!(matches!(
            p.position_relative_to_origin(saturn, &Time::from_tt(2_451_545.0, None)),
            Err(OrreryError::UnsupportedBody { .. })
        ));

        let late = Time::from_tt(2_451_600.0, None);
        assert!(matches!(
            p.position_relative_to_origin(catalog.get("Jupiter").unwrap(), &late),
            Err(OrreryError::Ephemeris(JplephemError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_empty_kernel_list() {
        let none: [&str; 0] = [];
        assert!(matches!(KernelProvider::open(none), Err(OrreryError::Config(_))));
    }
}
