//! Versioned scene document and its assembly.

use crate::config::SynthConfig;
use crate::detection::{Bounds, Category, ImageSize};
use crate::extract::{CandidateId, PlatformCandidate, PlatformKind, Prop};
use crate::placement::Placement;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const SCENE_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Ground,
    Bridge,
    Solid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneObject {
    Platform {
        id: String,
        label: String,
        confidence: f32,
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surface_type: Option<SurfaceType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enemy_spawn_anchor: Option<bool>,
    },
    Obstacle {
        id: String,
        label: String,
        confidence: f32,
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
    },
    Collectible {
        id: String,
        label: String,
        confidence: f32,
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
    },
    /// Reserved for the renderer; this core never emits hazards.
    Hazard {
        id: String,
        label: String,
        confidence: f32,
        bounds: Bounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
    },
}

impl SceneObject {
    pub fn id(&self) -> &str {
        match self {
            SceneObject::Platform { id, .. }
            | SceneObject::Obstacle { id, .. }
            | SceneObject::Collectible { id, .. }
            | SceneObject::Hazard { id, .. } => id,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        match self {
            SceneObject::Platform { bounds, .. }
            | SceneObject::Obstacle { bounds, .. }
            | SceneObject::Collectible { bounds, .. }
            | SceneObject::Hazard { bounds, .. } => bounds,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SceneObject::Platform { label, .. }
            | SceneObject::Obstacle { label, .. }
            | SceneObject::Collectible { label, .. }
            | SceneObject::Hazard { label, .. } => label,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, SceneObject::Platform { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Walker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    Health,
    Coin,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: PickupKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spawns {
    pub player: SpawnPoint,
    pub exit: SpawnPoint,
    pub enemies: Vec<EnemySpawn>,
    pub pickups: Vec<PickupSpawn>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub version: u32,
    pub image: ImageSize,
    pub objects: Vec<SceneObject>,
    pub spawns: Spawns,
    /// Reserved; always empty.
    pub rules: Vec<serde_json::Value>,
}

impl Scene {
    pub fn platforms(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.is_platform())
    }
}

/// Per-build id counters, one per prefix. `plat_1`, `plat_2`, `bridge_1`...
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: BTreeMap<&'static str, u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, prefix: &'static str) -> String {
        let n = self.counters.entry(prefix).or_insert(0);
        *n += 1;
        format!("{prefix}_{n}")
    }
}

fn platform_object(
    ids: &mut IdAllocator,
    p: &PlatformCandidate,
    enemy_platforms: &HashSet<CandidateId>,
) -> SceneObject {
    let (prefix, surface) = match p.kind {
        PlatformKind::Ground => ("ground", SurfaceType::Ground),
        PlatformKind::Bridge => ("bridge", SurfaceType::Bridge),
        PlatformKind::Detected => ("plat", SurfaceType::Solid),
    };
    SceneObject::Platform {
        id: ids.next_id(prefix),
        label: p.label.clone(),
        confidence: p.confidence,
        bounds: p.bounds,
        surface_type: Some(surface),
        enemy_spawn_anchor: enemy_platforms.contains(&p.id).then_some(true),
    }
}

/// Compose the final scene: platforms, then obstacles, then collectibles.
pub fn assemble(
    image: ImageSize,
    platforms: &[PlatformCandidate],
    obstacles: &[Prop],
    collectibles: &[Prop],
    placement: Placement,
    config: &SynthConfig,
) -> Scene {
    let mut ids = IdAllocator::new();
    let enemy_platforms: HashSet<_> = placement.enemy_platforms.iter().copied().collect();

    let mut objects = Vec::with_capacity(
        platforms.len()
            + obstacles.len().min(config.max_obstacles)
            + collectibles.len().min(config.max_collectibles),
    );

    for p in platforms {
        objects.push(platform_object(&mut ids, p, &enemy_platforms));
    }
    for o in obstacles.iter().take(config.max_obstacles) {
        objects.push(SceneObject::Obstacle {
            id: ids.next_id("obstacle"),
            label: o.label.clone(),
            confidence: o.confidence,
            bounds: o.bounds,
            category: Some(o.category),
        });
    }
    for c in collectibles.iter().take(config.max_collectibles) {
        objects.push(SceneObject::Collectible {
            id: ids.next_id("collectible"),
            label: c.label.clone(),
            confidence: c.confidence,
            bounds: c.bounds,
            category: Some(c.category),
        });
    }

    Scene {
        version: SCENE_VERSION,
        image,
        objects,
        spawns: placement.spawns,
        rules: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_counters_are_per_prefix() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id("plat"), "plat_1");
        assert_eq!(ids.next_id("bridge"), "bridge_1");
        assert_eq!(ids.next_id("plat"), "plat_2");
        assert_eq!(ids.next_id("ground"), "ground_1");
    }

    #[test]
    fn allocators_do_not_share_state() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next_id("plat");
        a.next_id("plat");
        assert_eq!(b.next_id("plat"), "plat_1");
    }

    #[test]
    fn scene_object_serializes_tagged() {
        let obj = SceneObject::Platform {
            id: "plat_1".to_string(),
            label: "table".to_string(),
            confidence: 0.5,
            bounds: Bounds::new(0.1, 0.5, 0.3, 0.03),
            surface_type: Some(SurfaceType::Solid),
            enemy_spawn_anchor: None,
        };
        let v = serde_json::to_value(&obj).expect("serialize");
        assert_eq!(v["type"], "platform");
        assert_eq!(v["surface_type"], "solid");
        assert!(v.get("enemy_spawn_anchor").is_none());
    }

    #[test]
    fn spawn_type_tags() {
        let e = EnemySpawn {
            x: 0.5,
            y: 0.5,
            kind: EnemyKind::Walker,
        };
        let p = PickupSpawn {
            x: 0.5,
            y: 0.5,
            kind: PickupKind::Health,
        };
        assert_eq!(serde_json::to_value(e).expect("enemy")["type"], "walker");
        assert_eq!(serde_json::to_value(p).expect("pickup")["type"], "health");
    }

    #[test]
    fn scene_json_roundtrip_preserves_shape() {
        let scene = Scene {
            version: SCENE_VERSION,
            image: ImageSize::new(640, 480),
            objects: vec![SceneObject::Collectible {
                id: "collectible_1".to_string(),
                label: "apple".to_string(),
                confidence: 0.9,
                bounds: Bounds::new(0.4, 0.4, 0.1, 0.1),
                category: Some(Category::Food),
            }],
            spawns: Spawns {
                player: SpawnPoint { x: 0.08, y: 0.86 },
                exit: SpawnPoint { x: 0.95, y: 0.86 },
                enemies: vec![],
                pickups: vec![],
            },
            rules: vec![],
        };
        let json = serde_json::to_string(&scene).expect("serialize");
        let back: Scene = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, scene);
        assert!(json.contains("\"rules\":[]"));
    }
}
