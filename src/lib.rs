//! Orrery: where the Sun, planets and moons are at a given instant
//!
//! The crate pairs a hierarchical [`BodyCatalog`] with a [`PositionProvider`]
//! backed by JPL ephemeris files and answers Sun-relative and parent-relative
//! position queries in Earth radii. [`OrbitSampler`] builds orbit polylines and
//! orbital-plane normals on top of those queries.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod frame;
pub mod jplephem;
pub mod model;
pub mod orbit;
pub mod provider;
pub mod time;
pub mod units;

// Re-export commonly used types
pub use catalog::{BodyCatalog, BodyKind, BodyRecord, CatalogError};
pub use clock::SimulationClock;
pub use config::{Backend, ModelConfig};
pub use frame::{BodyPlacement, FrameSnapshot};
pub use model::SystemModel;
pub use orbit::{OrbitPath, OrbitSampler};
pub use provider::{ChebyshevProvider, Coverage, KernelProvider, Origin, PositionProvider, ProviderFrame};
pub use time::{CalendarTuple, Time, Timescale};
pub use units::LengthUnit;

/// Main error type for the orrery library
#[derive(Debug, Error)]
pub enum OrreryError {
    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] jplephem::JplephemError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Time error: {0}")]
    Time(#[from] time::TimeError),

    #[error("{provider} cannot position {body}")]
    UnsupportedBody { body: String, provider: String },

    #[error("Orbit of {0} is degenerate; sampled positions are collinear")]
    DegenerateOrbit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for orrery operations
pub type Result<T> = std::result::Result<T, OrreryError>;

/// Entry point for opening ephemeris files and building models
pub struct Loader {
    data_dir: Option<PathBuf>,
}

impl Loader {
    /// Create a new loader resolving paths against the working directory
    pub fn new() -> Self {
        Self { data_dir: None }
    }

    /// Set a custom data directory
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    fn resolve(&self, config: &ModelConfig, path: &Path) -> PathBuf {
        match (&config.data_dir, &self.data_dir) {
            (Some(_), _) => config.resolve(path),
            (None, Some(dir)) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Open the backend a config names
    pub fn open_provider(&self, config: &ModelConfig) -> Result<Box<dyn PositionProvider>> {
        let provider: Box<dyn PositionProvider> = match &config.backend {
            Backend::Chebyshev { path } => {
                Box::new(ChebyshevProvider::open(self.resolve(config, path))?)
            }
            Backend::Kernels { paths } => {
                let resolved: Vec<PathBuf> = paths.iter().map(|p| self.resolve(config, p)).collect();
                Box::new(KernelProvider::open(resolved)?)
            }
        };
        log::info!("ephemeris {} covers {}", provider.name(), provider.coverage());
        Ok(provider)
    }

    /// Build a model over the built-in solar-system catalog
    pub fn load(&self, config: &ModelConfig) -> Result<SystemModel> {
        self.load_with_catalog(config, BodyCatalog::solar_system())
    }

    /// Build a model over a caller-supplied catalog
    pub fn load_with_catalog(&self, config: &ModelConfig, catalog: BodyCatalog) -> Result<SystemModel> {
        let provider = self.open_provider(config)?;
        for body in catalog.iter().filter(|b| !provider.supports(b)) {
            log::warn!("{} has no data for {}", provider.name(), body.name);
        }
        Ok(SystemModel::new(catalog, provider))
    }

    /// Read a JSON config file and build a model from it
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(ModelConfig, SystemModel)> {
        let config = ModelConfig::from_file(path)?;
        let model = self.load(&config)?;
        Ok((config, model))
    }

    /// Load a timescale for time conversions
    pub fn timescale(&self) -> Timescale {
        Timescale::default()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
