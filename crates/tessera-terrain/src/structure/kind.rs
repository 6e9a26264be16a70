//! Structure shapes and placements.

use serde::{Deserialize, Serialize};

/// Named structure shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Cuboid,
    Pyramid,
    Cylinder,
    Tower,
    Dome,
}

/// Optional size hints for a placement, in grid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl StructureKind {
    pub const ALL: [StructureKind; 5] = [
        StructureKind::Cuboid,
        StructureKind::Pyramid,
        StructureKind::Cylinder,
        StructureKind::Tower,
        StructureKind::Dome,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StructureKind::Cuboid => "cuboid",
            StructureKind::Pyramid => "pyramid",
            StructureKind::Cylinder => "cylinder",
            StructureKind::Tower => "tower",
            StructureKind::Dome => "dome",
        }
    }

    /// Case-insensitive name lookup.
    pub fn from_name(name: &str) -> Option<StructureKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Size a new placement of this shape starts with.
    pub fn default_dimensions(self) -> StructureDimensions {
        let (width, height, depth, radius) = match self {
            StructureKind::Cuboid => (Some(1.0), Some(1.0), Some(1.0), None),
            StructureKind::Pyramid => (Some(1.0), Some(1.2), Some(1.0), None),
            StructureKind::Cylinder => (None, Some(1.5), None, Some(0.4)),
            StructureKind::Tower => (Some(0.6), Some(3.0), Some(0.6), None),
            StructureKind::Dome => (None, None, None, Some(0.5)),
        };
        StructureDimensions {
            width,
            height,
            depth,
            radius,
        }
    }
}

/// One structure on the home tile's integer grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructurePlacement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StructureKind,
    pub grid_x: i32,
    pub grid_z: i32,
    #[serde(flatten)]
    pub dimensions: StructureDimensions,
}

impl StructurePlacement {
    /// A placement with the shape's default dimensions.
    pub fn new(id: impl Into<String>, kind: StructureKind, grid_x: i32, grid_z: i32) -> Self {
        Self {
            id: id.into(),
            kind,
            grid_x,
            grid_z,
            dimensions: kind.default_dimensions(),
        }
    }

    /// Grid cell occupied by this structure.
    pub fn cell(&self) -> (i32, i32) {
        (self.grid_x, self.grid_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in StructureKind::ALL {
            assert_eq!(StructureKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StructureKind::from_name("TOWER"), Some(StructureKind::Tower));
        assert_eq!(StructureKind::from_name("castle"), None);
    }

    #[test]
    fn test_default_dimensions_present() {
        for kind in StructureKind::ALL {
            let dims = kind.default_dimensions();
            assert!(
                dims.width.is_some() || dims.radius.is_some(),
                "{} has no footprint",
                kind.name()
            );
        }
    }

    #[test]
    fn test_placement_json_shape() {
        let placement = StructurePlacement::new("s1", StructureKind::Dome, 4, -2);
        let json = serde_json::to_value(&placement).unwrap();
        assert_eq!(json["type"], "dome");
        assert_eq!(json["gridX"], 4);
        assert_eq!(json["gridZ"], -2);
        assert_eq!(json["radius"], 0.5);
        assert!(json.get("width").is_none(), "Absent dimensions must be omitted");
    }

    #[test]
    fn test_placement_parses_without_dimensions() {
        let json = r#"{"id":"a","type":"cuboid","gridX":1,"gridZ":2}"#;
        let placement: StructurePlacement = serde_json::from_str(json).unwrap();
        assert_eq!(placement.cell(), (1, 2));
        assert_eq!(placement.dimensions, StructureDimensions::default());
    }
}
