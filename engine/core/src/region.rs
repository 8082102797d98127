//! Region Registry
//!
//! Holds the interactive regions of the mounted screen: their identity,
//! spoken label, and (once the layout pass settles) their absolute screen
//! rectangle.
//!
//! # Design Philosophy
//!
//! Regions are registered when a screen mounts and dropped when it
//! unmounts. Registration order is significant: hit-testing walks regions
//! in that order and the first match wins, so screens register the regions
//! they want to win overlaps first.
//!
//! A region without a rectangle is "not yet interactive". The registry
//! refuses to store degenerate rectangles, so the only way a region becomes
//! hit-testable is a successful measurement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;

/// Region identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub String);

impl RegionId {
    /// Create a new region ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Declaration of a region a screen wants to mount
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Stable identifier
    pub id: RegionId,
    /// Text announced when the region gains focus
    pub label: String,
}

impl RegionSpec {
    /// Create a region declaration
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: RegionId::new(id),
            label: label.into(),
        }
    }

    /// Declaration whose id and label are the same text
    pub fn labelled(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: RegionId::new(label.clone()),
            label,
        }
    }
}

/// A mounted interactive region
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier
    pub id: RegionId,
    /// Text announced when the region gains focus
    pub label: String,
    /// Absolute rectangle; `None` until measured
    pub rect: Option<Rect>,
}

impl Region {
    /// Whether this region can be matched by hit-testing
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.rect.is_some()
    }
}

/// Errors from registry mutations
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A region with this id is already mounted
    #[error("region {0} is already registered")]
    Duplicate(RegionId),

    /// No region with this id is mounted
    #[error("region {0} is not registered")]
    Unknown(RegionId),
}

/// Ordered collection of the mounted screen's regions
#[derive(Clone, Debug, Default)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region at the end of the hit-test order
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the id is already mounted.
    pub fn register(&mut self, spec: RegionSpec) -> Result<(), RegistryError> {
        if self.contains(&spec.id) {
            return Err(RegistryError::Duplicate(spec.id));
        }
        self.regions.push(Region {
            id: spec.id,
            label: spec.label,
            rect: None,
        });
        Ok(())
    }

    /// Record a measured rectangle.
    ///
    /// Returns `Ok(false)` when the rectangle is degenerate; the region is
    /// left unmeasured in that case.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if the id is not mounted.
    pub fn set_rect(&mut self, id: &RegionId, rect: Rect) -> Result<bool, RegistryError> {
        let region = self
            .regions
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| RegistryError::Unknown(id.clone()))?;

        if rect.is_degenerate() {
            region.rect = None;
            return Ok(false);
        }
        region.rect = Some(rect);
        Ok(true)
    }

    /// Forget a region's rectangle, making it unmatched until re-measured
    pub fn clear_rect(&mut self, id: &RegionId) {
        if let Some(region) = self.regions.iter_mut().find(|r| &r.id == id) {
            region.rect = None;
        }
    }

    /// Remove a single region
    pub fn remove(&mut self, id: &RegionId) -> Option<Region> {
        let idx = self.regions.iter().position(|r| &r.id == id)?;
        Some(self.regions.remove(idx))
    }

    /// Drop every region (screen unmount)
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Look up a region by id
    #[must_use]
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.id == id)
    }

    /// Whether a region with this id is mounted
    #[must_use]
    pub fn contains(&self, id: &RegionId) -> bool {
        self.get(id).is_some()
    }

    /// All regions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Regions with a usable rectangle, in registration order
    pub fn measured(&self) -> impl Iterator<Item = (&Region, Rect)> {
        self.regions
            .iter()
            .filter_map(|r| r.rect.map(|rect| (r, rect)))
    }

    /// Ids of every mounted region, in registration order
    #[must_use]
    pub fn ids(&self) -> Vec<RegionId> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    /// Number of mounted regions
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no regions are mounted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(labels: &[&str]) -> RegionRegistry {
        let mut registry = RegionRegistry::new();
        for label in labels {
            registry.register(RegionSpec::labelled(*label)).unwrap();
        }
        registry
    }

    #[test]
    fn test_register_preserves_order() {
        let registry = registry_with(&["Lessons", "Quizes", "Marks"]);
        let labels: Vec<_> = registry.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Lessons", "Quizes", "Marks"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry_with(&["OK"]);
        let err = registry.register(RegionSpec::labelled("OK")).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate(RegionId::new("OK")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_degenerate_rect_is_not_stored() {
        let mut registry = registry_with(&["Clear"]);
        let id = RegionId::new("Clear");

        let stored = registry.set_rect(&id, Rect::new(0.0, 0.0, 0.0, 40.0)).unwrap();
        assert!(!stored);
        assert!(!registry.get(&id).unwrap().is_measured());

        let stored = registry.set_rect(&id, Rect::new(0.0, 0.0, 80.0, 40.0)).unwrap();
        assert!(stored);
        assert_eq!(registry.measured().count(), 1);
    }

    #[test]
    fn test_set_rect_unknown_region() {
        let mut registry = RegionRegistry::new();
        let err = registry
            .set_rect(&RegionId::new("ghost"), Rect::new(0.0, 0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unknown(_)));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = registry_with(&["a", "b", "c"]);
        let removed = registry.remove(&RegionId::new("b")).unwrap();
        assert_eq!(removed.label, "b");
        assert_eq!(registry.ids(), vec![RegionId::new("a"), RegionId::new("c")]);

        registry.clear();
        assert!(registry.is_empty());
    }
}
