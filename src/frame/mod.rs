//! Per-frame cache of every body's position
//!
//! A renderer walks the hierarchy once per frame; [`FrameSnapshot::capture`]
//! does that walk up front and evaluates each body's Sun-relative position
//! exactly once.

use std::collections::BTreeMap;

use nalgebra::Vector3;

use crate::catalog::BodyRecord;
use crate::model::SystemModel;
use crate::time::Time;
use crate::Result;

/// Where one body sits in a snapshot, in Earth radii
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPlacement {
    pub sun_relative: Vector3<f64>,
    pub parent_relative: Vector3<f64>,
}

/// Positions of every catalog body at one instant
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    time: Time,
    placements: BTreeMap<String, BodyPlacement>,
}

impl FrameSnapshot {
    /// Walk from the root through each body's children
    ///
    /// Any failure aborts the walk and no snapshot is produced.
    pub fn capture(model: &SystemModel, time: &Time) -> Result<Self> {
        let catalog = model.catalog();
        let root = catalog.root();
        let root_position = model.sun_relative_position(root, time)?;

        let mut placements = BTreeMap::new();
        placements.insert(
            root.name.clone(),
            BodyPlacement {
                sun_relative: root_position,
                parent_relative: Vector3::zeros(),
            },
        );
        Self::place_children(model, root, root_position, time, &mut placements)?;

        Ok(Self {
            time: *time,
            placements,
        })
    }

    fn place_children(
        model: &SystemModel,
        parent: &BodyRecord,
        parent_position: Vector3<f64>,
        time: &Time,
        placements: &mut BTreeMap<String, BodyPlacement>,
    ) -> Result<()> {
        model.catalog().for_each_child(parent, |child| {
            let sun_relative = model.sun_relative_position(child, time)?;
            placements.insert(
                child.name.clone(),
                BodyPlacement {
                    sun_relative,
                    parent_relative: sun_relative - parent_position,
                },
            );
            Self::place_children(model, child, sun_relative, time, placements)
        })
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn get(&self, name: &str) -> Option<&BodyPlacement> {
        self.placements.get(name)
    }

    /// Placements ordered by body name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BodyPlacement)> {
        self.placements.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
