//! Registry of the bodies the model knows about
//!
//! A catalog is an arena of [`BodyRecord`]s with a name index. Parent links
//! are stored by name and resolved through the index, so the hierarchy is a
//! tree rooted at the single star without any owning back-pointers.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found while building or querying a catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no bodies")]
    Empty,

    #[error("catalog has no star root")]
    NoRoot,

    #[error("catalog has more than one root: {0:?}")]
    MultipleRoots(Vec<String>),

    #[error("body name {0:?} appears more than once")]
    DuplicateName(String),

    #[error("body {body:?} names unknown parent {parent:?}")]
    UnknownParent { body: String, parent: String },

    #[error("root {body:?} must have no parent and period 0")]
    RootHasParent { body: String },

    #[error("body {0:?} does not reach the root")]
    Unreachable(String),
}

/// Broad class of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Star,
    Planet,
    NaturalSatellite,
}

/// Static description of one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    /// Unique name, also used to look the body up in ephemerides
    pub name: String,
    /// Name of the body this one orbits; empty for the root
    pub parent_name: String,
    /// Radius as a fraction of Earth's
    pub relative_radius: f64,
    /// Opaque texture identifier for the renderer
    pub texture_id: String,
    /// Sidereal period around the parent in Earth years; 0 for the root
    pub orbital_period: f64,
    pub kind: BodyKind,
}

impl BodyRecord {
    pub fn new(
        name: &str,
        parent_name: &str,
        relative_radius: f64,
        texture_id: &str,
        orbital_period: f64,
        kind: BodyKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            parent_name: parent_name.to_string(),
            relative_radius,
            texture_id: texture_id.to_string(),
            orbital_period,
            kind,
        }
    }

    pub fn has_parent(&self) -> bool {
        !self.parent_name.is_empty()
    }
}

impl fmt::Display for BodyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_parent() {
            write!(f, "{} ({:?}, orbits {})", self.name, self.kind, self.parent_name)
        } else {
            write!(f, "{} ({:?}, root)", self.name, self.kind)
        }
    }
}

/// Immutable, validated set of bodies
#[derive(Debug, Clone)]
pub struct BodyCatalog {
    bodies: Vec<BodyRecord>,
    index: HashMap<String, usize>,
    root: usize,
}

impl BodyCatalog {
    /// The Sun, the eight planets and the Moon
    pub fn solar_system() -> Self {
        use BodyKind::*;
        let records = vec![
            BodyRecord::new("Sun", "", 109.0, "Solarsystemscope_texture_8k_sun", 0.0, Star),
            BodyRecord::new("Mercury", "Sun", 0.3829, "Solarsystemscope_texture_8k_mercury", 0.2408467, Planet),
            BodyRecord::new("Venus", "Sun", 0.3829, "2k_venus_surface", 0.61519726, Planet),
            BodyRecord::new("Earth", "Sun", 1.0, "Solarsystemscope_texture_8k_earth_daymap", 1.0000174, Planet),
            BodyRecord::new("Moon", "Earth", 0.2727, "2k_moon", 0.0748, NaturalSatellite),
            BodyRecord::new("Mars", "Sun", 0.533, "2k_mars", 1.8808476, Planet),
            BodyRecord::new("Jupiter", "Sun", 11.21, "2k_jupiter", 11.862615, Planet),
            BodyRecord::new("Saturn", "Sun", 9.45, "2k_saturn", 29.447498, Planet),
            BodyRecord::new("Uranus", "Sun", 4.01, "2k_uranus", 84.016846, Planet),
            BodyRecord::new("Neptune", "Sun", 3.88, "2k_neptune", 164.79132, Planet),
        ];
        // The fixed table satisfies every invariant from_records checks.
        match Self::from_records(records) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in catalog is invalid: {}", e),
        }
    }

    /// Build and validate a catalog from arbitrary records
    pub fn from_records(records: Vec<BodyRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(records.len());
        for (i, body) in records.iter().enumerate() {
            if index.insert(body.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateName(body.name.clone()));
            }
        }

        let roots: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind == BodyKind::Star)
            .map(|(i, _)| i)
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(CatalogError::NoRoot),
            [only] => *only,
            _ => {
                return Err(CatalogError::MultipleRoots(
                    roots.iter().map(|&i| records[i].name.clone()).collect(),
                ))
            }
        };
        if records[root].has_parent() || records[root].orbital_period != 0.0 {
            return Err(CatalogError::RootHasParent {
                body: records[root].name.clone(),
            });
        }

        for body in records.iter().filter(|b| b.kind != BodyKind::Star) {
            if !body.has_parent() {
                return Err(CatalogError::MultipleRoots(vec![
                    records[root].name.clone(),
                    body.name.clone(),
                ]));
            }
            if !index.contains_key(&body.parent_name) {
                return Err(CatalogError::UnknownParent {
                    body: body.name.clone(),
                    parent: body.parent_name.clone(),
                });
            }
        }

        // Every chain of parents must hit the root within len steps.
        for body in &records {
            let mut current = body;
            let mut steps = 0;
            while current.has_parent() {
                steps += 1;
                if steps > records.len() {
                    return Err(CatalogError::Unreachable(body.name.clone()));
                }
                current = &records[index[&current.parent_name]];
            }
        }

        Ok(Self {
            bodies: records,
            index,
            root,
        })
    }

    /// The single star every other body orbits, directly or not
    pub fn root(&self) -> &BodyRecord {
        &self.bodies[self.root]
    }

    pub fn is_root(&self, body: &BodyRecord) -> bool {
        body.name == self.root().name
    }

    pub fn get(&self, name: &str) -> Option<&BodyRecord> {
        self.index.get(name).map(|&i| &self.bodies[i])
    }

    /// Resolve a body's parent by name
    ///
    /// `Ok(None)` for the root. An error means the record's parent is not in
    /// this catalog, which can only happen for a record from elsewhere.
    pub fn parent_of(&self, body: &BodyRecord) -> Result<Option<&BodyRecord>, CatalogError> {
        if !body.has_parent() {
            return Ok(None);
        }
        self.get(&body.parent_name)
            .map(Some)
            .ok_or_else(|| CatalogError::UnknownParent {
                body: body.name.clone(),
                parent: body.parent_name.clone(),
            })
    }

    /// Direct children in table order
    pub fn children_of<'a>(&'a self, body: &'a BodyRecord) -> impl Iterator<Item = &'a BodyRecord> + 'a {
        self.bodies.iter().filter(move |b| b.parent_name == body.name)
    }

    /// Visit every body once in table order, stopping at the first error
    pub fn for_each_body<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&BodyRecord) -> Result<(), E>,
    {
        self.bodies.iter().try_for_each(|b| visitor(b))
    }

    /// Visit the direct children of `body`, stopping at the first error
    pub fn for_each_child<E, F>(&self, body: &BodyRecord, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&BodyRecord) -> Result<(), E>,
    {
        self.children_of(body).try_for_each(|b| visitor(b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyRecord> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl Default for BodyCatalog {
    fn default() -> Self {
        Self::solar_system()
    }
}
