//! Detection classification: platforms, obstacles, collectibles.

use crate::config::SynthConfig;
use crate::detection::{finite_or_zero, Bounds, Category, Detection};
use serde::Serialize;

const PLATFORM_X_RANGE: (f32, f32) = (0.0, 0.95);
const PLATFORM_Y_RANGE: (f32, f32) = (0.05, 0.90);
const PLATFORM_W_RANGE: (f32, f32) = (0.05, 0.90);

/// Identity of a candidate for the lifetime of one build.
/// Geometry is not unique, so entity placement correlates through this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CandidateId(pub u32);

/// Hands out `CandidateId`s. One per build, never shared.
#[derive(Debug, Default)]
pub struct CandidateIds {
    next: u32,
}

impl CandidateIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> CandidateId {
        let id = CandidateId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Detected,
    Ground,
    Bridge,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformCandidate {
    pub id: CandidateId,
    pub label: String,
    pub category: Option<Category>,
    pub confidence: f32,
    pub bounds: Bounds,
    pub kind: PlatformKind,
    pub enemy_anchor: bool,
}

impl PlatformCandidate {
    pub fn is_ground(&self) -> bool {
        self.kind == PlatformKind::Ground
    }

    /// Bridges and stepping-stones alike.
    pub fn is_bridge(&self) -> bool {
        self.kind == PlatformKind::Bridge
    }

    pub fn is_detected(&self) -> bool {
        self.kind == PlatformKind::Detected
    }

    pub fn ground(ids: &mut CandidateIds, config: &SynthConfig) -> Self {
        Self {
            id: ids.next_id(),
            label: "ground".to_string(),
            category: None,
            confidence: 1.0,
            bounds: Bounds::new(0.0, config.ground_y, 1.0, config.platform_thickness),
            kind: PlatformKind::Ground,
            enemy_anchor: false,
        }
    }

    pub fn bridge(ids: &mut CandidateIds, label: &str, bounds: Bounds) -> Self {
        Self {
            id: ids.next_id(),
            label: label.to_string(),
            category: None,
            confidence: 1.0,
            bounds,
            kind: PlatformKind::Bridge,
            enemy_anchor: false,
        }
    }
}

/// A detection that is not walkable: an obstacle or a collectible.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prop {
    pub label: String,
    pub category: Category,
    pub confidence: f32,
    pub bounds: Bounds,
}

impl Prop {
    fn from_detection(det: &Detection) -> Self {
        Self {
            label: det.label.clone(),
            category: det.category,
            confidence: clamp_confidence(det.confidence),
            bounds: det.bounds.clamped_to_unit(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub platforms: Vec<PlatformCandidate>,
    pub obstacles: Vec<Prop>,
    pub collectibles: Vec<Prop>,
}

fn clamp_confidence(c: f32) -> f32 {
    finite_or_zero(c).clamp(0.0, 1.0)
}

/// Thin walkable slab along the top edge of the detection.
pub fn surface_from(bounds: &Bounds, config: &SynthConfig) -> Bounds {
    Bounds {
        x: finite_or_zero(bounds.x).clamp(PLATFORM_X_RANGE.0, PLATFORM_X_RANGE.1),
        y: finite_or_zero(bounds.y).clamp(PLATFORM_Y_RANGE.0, PLATFORM_Y_RANGE.1),
        w: finite_or_zero(bounds.w).clamp(PLATFORM_W_RANGE.0, PLATFORM_W_RANGE.1),
        h: config.platform_thickness,
    }
}

pub fn extract(
    detections: &[Detection],
    ids: &mut CandidateIds,
    config: &SynthConfig,
) -> Extraction {
    let mut out = Extraction::default();

    for det in detections {
        if det.category == Category::Food {
            out.collectibles.push(Prop::from_detection(det));
            continue;
        }

        // Width is judged on the clamped slab, the same geometry used downstream.
        let surface = surface_from(&det.bounds, config);
        if surface.w < config.min_platform_width {
            out.obstacles.push(Prop::from_detection(det));
            continue;
        }

        out.platforms.push(PlatformCandidate {
            id: ids.next_id(),
            label: det.label.clone(),
            category: Some(det.category),
            confidence: clamp_confidence(det.confidence),
            bounds: surface,
            kind: PlatformKind::Detected,
            enemy_anchor: det.category.is_enemy_anchor(),
        });
    }

    out
}

/// Append the full-width ground slab. Always reachable, never hosts enemies.
pub fn add_ground(platforms: &mut Vec<PlatformCandidate>, ids: &mut CandidateIds, config: &SynthConfig) {
    platforms.push(PlatformCandidate::ground(ids, config));
}
