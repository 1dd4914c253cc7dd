//! Areas (screens) and their obstacle sets
//!
//! Area layout comes from an external loader; the simulation only queries it
//! and toggles obstacle solidity between frames.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Direction};

/// Identifier of an area in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

/// What an obstacle is, for callers that care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    Wall,
    Gate,
    Rift,
    Chest,
    Door,
}

/// A static or toggleable blocker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub bbox: Aabb,
    /// Non-solid obstacles (open gates, opened doors) are ignored by collision
    #[serde(default = "default_solid")]
    pub solid: bool,
}

fn default_solid() -> bool {
    true
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, bbox: Aabb) -> Self {
        Self {
            id,
            kind,
            bbox,
            solid: true,
        }
    }
}

/// Neighbouring areas reached by leaving through each edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exits {
    pub north: Option<AreaId>,
    pub east: Option<AreaId>,
    pub south: Option<AreaId>,
    pub west: Option<AreaId>,
}

impl Exits {
    pub fn toward(&self, side: Direction) -> Option<AreaId> {
        match side {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
            _ => None,
        }
    }
}

/// One screen of the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub bounds: Aabb,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub exits: Exits,
}

impl Area {
    pub fn new(id: AreaId, bounds: Aabb) -> Self {
        Self {
            id,
            bounds,
            obstacles: Vec::new(),
            exits: Exits::default(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_exits(mut self, exits: Exits) -> Self {
        self.exits = exits;
        self
    }

    /// Boxes of every obstacle currently blocking movement
    pub fn solid_boxes(&self) -> impl Iterator<Item = &Aabb> + '_ {
        self.obstacles.iter().filter(|o| o.solid).map(|o| &o.bbox)
    }

    /// Whether `bbox` lies fully inside the area's bounds
    pub fn contains(&self, bbox: &Aabb) -> bool {
        self.bounds.contains(bbox)
    }

    /// Open or close an obstacle. Returns false if no obstacle has that id.
    pub fn set_solid(&mut self, obstacle_id: u32, solid: bool) -> bool {
        match self.obstacles.iter_mut().find(|o| o.id == obstacle_id) {
            Some(obstacle) => {
                obstacle.solid = solid;
                true
            }
            None => false,
        }
    }

    /// Edge a point has left through, if it is outside the bounds
    pub fn exit_side(&self, point: Vec2) -> Option<Direction> {
        let b = &self.bounds;
        if point.x < b.x() {
            Some(Direction::West)
        } else if point.x > b.right() {
            Some(Direction::East)
        } else if point.y < b.y() {
            Some(Direction::North)
        } else if point.y > b.bottom() {
            Some(Direction::South)
        } else {
            None
        }
    }
}

/// Every area of a simulation, keyed by id
pub type AreaRegistry = BTreeMap<AreaId, Area>;

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Area {
        Area::new(AreaId(1), Aabb::new(0.0, 0.0, 320.0, 240.0))
            .with_obstacle(Obstacle::new(
                1,
                ObstacleKind::Wall,
                Aabb::new(100.0, 0.0, 20.0, 100.0),
            ))
            .with_obstacle(Obstacle::new(
                2,
                ObstacleKind::Gate,
                Aabb::new(100.0, 100.0, 20.0, 40.0),
            ))
    }

    #[test]
    fn test_gate_toggle_changes_solid_set() {
        let mut area = room();
        assert_eq!(area.solid_boxes().count(), 2);

        assert!(area.set_solid(2, false));
        assert_eq!(area.solid_boxes().count(), 1);
        assert!(!area.set_solid(99, false));
    }

    #[test]
    fn test_exit_side() {
        let area = room();
        assert_eq!(area.exit_side(Vec2::new(160.0, 120.0)), None);
        assert_eq!(area.exit_side(Vec2::new(-1.0, 120.0)), Some(Direction::West));
        assert_eq!(area.exit_side(Vec2::new(321.0, 120.0)), Some(Direction::East));
        assert_eq!(area.exit_side(Vec2::new(160.0, 241.0)), Some(Direction::South));
    }

    #[test]
    fn test_area_deserializes_with_defaults() {
        let json = r#"{
            "id": 3,
            "bounds": { "pos": [0.0, 0.0], "size": [320.0, 240.0] },
            "obstacles": [
                { "id": 1, "kind": "Chest", "bbox": { "pos": [10.0, 10.0], "size": [16.0, 16.0] } }
            ]
        }"#;
        let area: Area = serde_json::from_str(json).expect("valid area json");
        assert_eq!(area.id, AreaId(3));
        assert!(area.obstacles[0].solid);
        assert_eq!(area.obstacles[0].kind, ObstacleKind::Chest);
        assert_eq!(area.exits, Exits::default());
    }
}
