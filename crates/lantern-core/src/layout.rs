//! Zone and road tables.
//!
//! A [`TerminalLayout`] is the static input of a run: the zone polygons and
//! the road polylines. It is either the built-in Genoa layout or a YAML file
//! of the form:
//!
//! ```yaml
//! zones:
//!   - id: BLOCK_A
//!     zone_type: STANDARD
//!     polygon: [{lat: 44.40, lng: 8.90}, ...]
//! roads:
//!   - path: [{lat: 44.40, lng: 8.90}, ...]
//!     one_way: true
//!     road_type: service
//! ```

use std::path::Path;

use lantern_types::{RoadSegment, Zone};
use lantern_world::{WorldError, ZoneModel};
use serde::Deserialize;
use tracing::info;

/// Errors that can occur when loading a layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Failed to read the layout file from disk.
    #[error("failed to read layout file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse layout YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A zone was rejected by the zone registry.
    #[error("invalid zone table: {source}")]
    World {
        /// The underlying registry error.
        #[from]
        source: WorldError,
    },
}

impl From<serde_yml::Error> for LayoutError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Static zone and road tables for one terminal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TerminalLayout {
    /// Zone polygons.
    pub zones: Vec<Zone>,

    /// Road polylines. Empty means the router falls back to a lattice over
    /// navigable zones.
    #[serde(default)]
    pub roads: Vec<RoadSegment>,
}

impl TerminalLayout {
    /// The built-in Genoa terminal.
    pub fn builtin() -> Self {
        Self {
            zones: lantern_world::default_zones(),
            roads: lantern_world::default_roads(),
        }
    }

    /// Load a layout from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Io`] if the file cannot be read, or
    /// [`LayoutError::Yaml`] if the content does not describe a layout.
    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        let contents = std::fs::read_to_string(path)?;
        let layout = Self::parse(&contents)?;
        info!(
            path = %path.display(),
            zones = layout.zones.len(),
            roads = layout.roads.len(),
            "Layout loaded"
        );
        Ok(layout)
    }

    /// Parse a layout from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Yaml`] if the string does not describe a
    /// layout.
    pub fn parse(yaml: &str) -> Result<Self, LayoutError> {
        let layout: Self = serde_yml::from_str(yaml)?;
        Ok(layout)
    }

    /// Load from `path` when given, otherwise the built-in layout.
    ///
    /// # Errors
    ///
    /// Whatever [`from_file`](Self::from_file) returns.
    pub fn load(path: Option<&Path>) -> Result<Self, LayoutError> {
        path.map_or_else(|| Ok(Self::builtin()), Self::from_file)
    }

    /// Register every zone.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::World`] for a degenerate polygon or a
    /// duplicate id.
    pub fn zone_model(&self) -> Result<ZoneModel, LayoutError> {
        Ok(ZoneModel::from_zones(self.zones.iter().cloned())?)
    }
}

impl Default for TerminalLayout {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lantern_types::{ZoneId, ZoneType};

    use super::*;

    const SMALL_LAYOUT: &str = r"
zones:
  - id: GATE
    zone_type: GATE
    polygon:
      - {lat: 44.0000, lng: 8.0000}
      - {lat: 44.0000, lng: 8.0010}
      - {lat: 44.0010, lng: 8.0010}
roads:
  - path:
      - {lat: 44.0000, lng: 8.0000}
      - {lat: 44.0005, lng: 8.0005}
    one_way: true
    road_type: service
";

    #[test]
    fn builtin_layout_registers() {
        let layout = TerminalLayout::builtin();
        let zones = layout.zone_model().unwrap();
        assert_eq!(zones.len(), layout.zones.len());
        assert!(!layout.roads.is_empty());
    }

    #[test]
    fn parse_small_layout() {
        let layout = TerminalLayout::parse(SMALL_LAYOUT).unwrap();
        assert_eq!(layout.zones.len(), 1);
        let zone = layout.zones.first().unwrap();
        assert_eq!(zone.id, ZoneId::from("GATE"));
        assert_eq!(zone.zone_type, ZoneType::Gate);
        assert_eq!(layout.roads.len(), 1);
        assert!(layout.roads.first().unwrap().one_way);
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let yaml = r"
zones:
  - id: LINE
    zone_type: ROAD
    polygon:
      - {lat: 44.0, lng: 8.0}
      - {lat: 44.1, lng: 8.1}
";
        let layout = TerminalLayout::parse(yaml).unwrap();
        assert!(matches!(
            layout.zone_model(),
            Err(LayoutError::World { .. })
        ));
    }

    #[test]
    fn load_without_path_is_builtin() {
        let layout = TerminalLayout::load(None).unwrap();
        assert_eq!(layout, TerminalLayout::builtin());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = TerminalLayout::load(Some(Path::new("/nonexistent/lantern-layout.yaml")));
        assert!(matches!(result, Err(LayoutError::Io { .. })));
    }
}
