//! JSON configuration for building a [`crate::SystemModel`]
//!
//! ```json
//! {
//!   "data_dir": "ephemeris",
//!   "backend": { "kernels": { "paths": ["de432s.bsp", "de440.bsp"] } },
//!   "orbit": { "samples": 60, "normal_length": 1000.0 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::orbit::OrbitSampler;
use crate::{OrreryError, Result};

/// Which ephemeris backend to load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// A JPL DE binary file
    Chebyshev { path: PathBuf },
    /// SPK kernels, loaded in order
    Kernels { paths: Vec<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory relative ephemeris paths resolve against
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    pub backend: Backend,
    #[serde(default)]
    pub orbit: OrbitSampler,
}

impl ModelConfig {
    pub fn chebyshev<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            data_dir: None,
            backend: Backend::Chebyshev { path: path.into() },
            orbit: OrbitSampler::default(),
        }
    }

    pub fn kernels<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            data_dir: None,
            backend: Backend::Kernels {
                paths: paths.into_iter().map(Into::into).collect(),
            },
            orbit: OrbitSampler::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_json_str(&text)?;
        // A relative data_dir is taken from the config file's location.
        if let (Some(dir), Some(parent)) = (&config.data_dir, path.as_ref().parent()) {
            if dir.is_relative() {
                config.data_dir = Some(parent.join(dir));
            }
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Backend::Kernels { paths } = &self.backend {
            if paths.is_empty() {
                return Err(OrreryError::Config("kernel backend needs at least one path".to_string()));
            }
        }
        if self.orbit.samples < 2 {
            return Err(OrreryError::Config(format!(
                "orbit.samples must be at least 2, got {}",
                self.orbit.samples
            )));
        }
        Ok(())
    }

    /// Resolve a path against `data_dir` unless it is absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_chebyshev() {
        let config = ModelConfig::from_json_str(
            r#"{ "data_dir": "/data/ephemeris",
                 "backend": { "chebyshev": { "path": "lnxp1900p2053.421" } },
                 "orbit": { "samples": 90, "normal_length": 250.0 } }"#,
        )
        .unwrap();
        assert_eq!(
            config.backend,
            Backend::Chebyshev {
                path: "lnxp1900p2053.421".into()
            }
        );
        assert_eq!(config.orbit.samples, 90);
        assert_eq!(config.orbit.normal_length, 250.0);
        assert_eq!(
            config.resolve(Path::new("lnxp1900p2053.421")),
            PathBuf::from("/data/ephemeris/lnxp1900p2053.421")
        );
        assert_eq!(config.resolve(Path::new("/abs/de440.bsp")), PathBuf::from("/abs/de440.bsp"));
    }

    #[test]
    fn test_parse_kernels_with_defaults() {
        let config = ModelConfig::from_json_str(
            r#"{ "backend": { "kernels": { "paths": ["de432s.bsp", "de438.bsp", "de440.bsp"] } } }"#,
        )
        .unwrap();
        match &config.backend {
            Backend::Kernels { paths } => {
                let names: Vec<_> = paths.iter().map(|p| p.to_str().unwrap()).collect();
                assert_eq!(names, ["de432s.bsp", "de438.bsp", "de440.bsp"]);
            }
            other => panic!("unexpected backend {:?}", other),
        }
        assert_eq!(config.orbit, OrbitSampler::default());
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_rejects_bad_configs() {
        assert!(matches!(
            ModelConfig::from_json_str(r#"{ "backend": { "kernels": { "paths": [] } } }"#),
            Err(OrreryError::Config(_))
        ));
        assert!(matches!(
            ModelConfig::from_json_str(
                r#"{ "backend": { "chebyshev": { "path": "x" } }, "orbit": { "samples": 1 } }"#
            ),
            Err(OrreryError::Config(_))
        ));
        assert!(matches!(
            ModelConfig::from_json_str(r#"{ "backend": "novas" }"#),
            Err(OrreryError::Json(_))
        ));
    }

    #[test]
    fn test_from_file_resolves_data_dir() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "data_dir": "kernels", "backend": {{ "kernels": {{ "paths": ["de440.bsp"] }} }} }}"#
        )
        .unwrap();
        let config = ModelConfig::from_file(file.path()).unwrap();
        let parent = file.path().parent().unwrap();
        assert_eq!(
            config.resolve(Path::new("de440.bsp")),
            parent.join("kernels").join("de440.bsp")
        );
    }
}
