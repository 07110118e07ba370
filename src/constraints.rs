use crate::config::{SynthConfig, MAX_SCENE_PLATFORMS, MIN_SCENE_PICKUPS};
use crate::detection::Bounds;
use crate::reachability::gap_violation;
use crate::scene::{Scene, SceneObject, SpawnPoint, SCENE_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const ALL_CONSTRAINTS: &[&str] = &[
    "version",
    "platform_count",
    "coordinate_ranges",
    "unique_ids",
    "pickup_floor",
    "spawns_on_platforms",
    "reachable",
];

const SPAWN_TOLERANCE: f32 = 1e-4;

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub scene: Scene,
    #[serde(default = "default_constraints")]
    pub constraints: Vec<String>,
}

fn default_constraints() -> Vec<String> {
    vec!["all".to_string()]
}

#[derive(Serialize, Debug)]
pub struct ValidateResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub passed: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct Violation {
    pub constraint: String,
    pub message: String,
    pub details: serde_json::Value,
}

fn expand(constraints: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for c in constraints {
        if c == "all" {
            out.extend(ALL_CONSTRAINTS.iter().map(|s| s.to_string()));
        } else {
            out.push(c.clone());
        }
    }
    out.dedup();
    out
}

/// Check an emitted scene against named structural constraints.
pub fn validate(scene: &Scene, config: &SynthConfig, constraints: &[String]) -> ValidateResult {
    let mut violations = Vec::new();
    let mut passed = Vec::new();

    for constraint in expand(constraints) {
        let failure = match constraint.as_str() {
            "version" => check_version(scene),
            "platform_count" => check_platform_count(scene),
            "coordinate_ranges" => check_coordinate_ranges(scene, config),
            "unique_ids" => check_unique_ids(scene),
            "pickup_floor" => check_pickup_floor(scene),
            "spawns_on_platforms" => check_spawns_on_platforms(scene, config),
            "reachable" => check_reachable(scene, config),
            other => Some((
                format!("Unknown constraint: {}", other),
                serde_json::json!({}),
            )),
        };
        match failure {
            None => passed.push(constraint),
            Some((message, details)) => violations.push(Violation {
                constraint,
                message,
                details,
            }),
        }
    }

    ValidateResult {
        valid: violations.is_empty(),
        violations,
        passed,
    }
}

type Failure = Option<(String, serde_json::Value)>;

fn check_version(scene: &Scene) -> Failure {
    if scene.version == SCENE_VERSION && scene.rules.is_empty() {
        return None;
    }
    Some((
        format!("Expected version {} with empty rules", SCENE_VERSION),
        serde_json::json!({ "version": scene.version, "rules": scene.rules.len() }),
    ))
}

fn check_platform_count(scene: &Scene) -> Failure {
    let count = scene.platforms().count();
    if (1..=MAX_SCENE_PLATFORMS).contains(&count) {
        return None;
    }
    Some((
        format!("Platform count {} outside 1..={}", count, MAX_SCENE_PLATFORMS),
        serde_json::json!({ "count": count, "max": MAX_SCENE_PLATFORMS }),
    ))
}

fn in_unit(v: f32) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

fn bounds_ok(b: &Bounds) -> bool {
    in_unit(b.x) && in_unit(b.y) && in_unit(b.w) && in_unit(b.h)
}

fn check_coordinate_ranges(scene: &Scene, config: &SynthConfig) -> Failure {
    let bad_objects: Vec<&str> = scene
        .objects
        .iter()
        .filter(|o| !bounds_ok(o.bounds()))
        .map(|o| o.id())
        .collect();

    // Spawns sit one clearance above a slab, which may poke above the image top.
    let spawn_ok = |x: f32, y: f32| {
        in_unit(x) && y.is_finite() && y >= -config.spawn_clearance && y <= 1.0
    };
    let s = &scene.spawns;
    let mut bad_spawns = Vec::new();
    if !spawn_ok(s.player.x, s.player.y) {
        bad_spawns.push("player".to_string());
    }
    if !spawn_ok(s.exit.x, s.exit.y) {
        bad_spawns.push("exit".to_string());
    }
    for (i, e) in s.enemies.iter().enumerate() {
        if !spawn_ok(e.x, e.y) {
            bad_spawns.push(format!("enemy[{i}]"));
        }
    }
    for (i, p) in s.pickups.iter().enumerate() {
        if !spawn_ok(p.x, p.y) {
            bad_spawns.push(format!("pickup[{i}]"));
        }
    }

    if bad_objects.is_empty() && bad_spawns.is_empty() {
        return None;
    }
    Some((
        "Coordinates outside the normalized range".to_string(),
        serde_json::json!({ "objects": bad_objects, "spawns": bad_spawns }),
    ))
}

fn check_unique_ids(scene: &Scene) -> Failure {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = scene
        .objects
        .iter()
        .map(|o| o.id())
        .filter(|id| !seen.insert(*id))
        .collect();
    if duplicates.is_empty() {
        return None;
    }
    Some((
        format!("{} duplicate id(s)", duplicates.len()),
        serde_json::json!({ "duplicates": duplicates }),
    ))
}

fn check_pickup_floor(scene: &Scene) -> Failure {
    let count = scene.spawns.pickups.len();
    if count >= MIN_SCENE_PICKUPS {
        return None;
    }
    Some((
        format!("Only {} pickup(s), need at least {}", count, MIN_SCENE_PICKUPS),
        serde_json::json!({ "count": count }),
    ))
}

fn rests_on_platform(scene: &Scene, spawn: &SpawnPoint, clearance: f32) -> bool {
    scene
        .platforms()
        .any(|p| (p.bounds().y - clearance - spawn.y).abs() <= SPAWN_TOLERANCE)
}

fn check_spawns_on_platforms(scene: &Scene, config: &SynthConfig) -> Failure {
    let clearance = config.spawn_clearance;
    let mut floating = Vec::new();
    if !rests_on_platform(scene, &scene.spawns.player, clearance) {
        floating.push("player");
    }
    if !rests_on_platform(scene, &scene.spawns.exit, clearance) {
        floating.push("exit");
    }
    if floating.is_empty() {
        return None;
    }
    Some((
        "Spawn not resting on any platform".to_string(),
        serde_json::json!({ "floating": floating }),
    ))
}

fn check_reachable(scene: &Scene, config: &SynthConfig) -> Failure {
    let limits = config.traversal();
    let mut chain: Vec<&SceneObject> = scene.platforms().collect();
    chain.sort_by(|a, b| b.bounds().y.total_cmp(&a.bounds().y));

    let gaps: Vec<serde_json::Value> = chain
        .windows(2)
        .filter_map(|pair| {
            gap_violation(pair[0].bounds(), pair[1].bounds(), limits).map(|(kind, gap, limit)| {
                serde_json::json!({
                    "lower": pair[0].id(),
                    "upper": pair[1].id(),
                    "kind": kind,
                    "gap": gap,
                    "limit": limit,
                })
            })
        })
        .collect();

    if gaps.is_empty() {
        return None;
    }
    Some((
        format!("{} platform pair(s) beyond jump reach", gaps.len()),
        serde_json::json!({ "gaps": gaps }),
    ))
}
