use crate::config::SynthConfig;
use crate::dedup;
use crate::detection::DetectionResponse;
use crate::extract::{self, CandidateIds};
use crate::placement;
use crate::reachability::{self, RepairReport};
use crate::scene::{self, Scene};
use log::debug;
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SynthesisReport {
    pub candidates_extracted: usize,
    pub duplicates_dropped: usize,
    pub obstacles: usize,
    pub collectibles: usize,
    pub repair: RepairReport,
}

/// A scene plus how it was built. The report never goes into the scene document.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Synthesis {
    pub scene: Scene,
    pub report: SynthesisReport,
}

/// Turn one perception response into a playable level. Pure and total:
/// identical input and config always give identical output.
pub fn synthesize(input: &DetectionResponse, config: &SynthConfig) -> Synthesis {
    let mut ids = CandidateIds::new();

    let extraction = extract::extract(&input.detections, &mut ids, config);
    let candidates_extracted = extraction.platforms.len();
    let mut platforms = extraction.platforms;
    extract::add_ground(&mut platforms, &mut ids, config);

    let duplicates_dropped = dedup::dedupe(&mut platforms, config);
    debug!(
        "{} detection(s): {} platform candidate(s), {} duplicate(s) dropped, {} obstacle(s), {} collectible(s)",
        input.detections.len(),
        candidates_extracted,
        duplicates_dropped,
        extraction.obstacles.len(),
        extraction.collectibles.len()
    );

    let repair = reachability::repair(&mut platforms, &mut ids, config);
    let placement = placement::place_entities(&platforms, config);
    let scene = scene::assemble(
        input.image.clone(),
        &platforms,
        &extraction.obstacles,
        &extraction.collectibles,
        placement,
        config,
    );

    Synthesis {
        report: SynthesisReport {
            candidates_extracted,
            duplicates_dropped,
            obstacles: extraction.obstacles.len(),
            collectibles: extraction.collectibles.len(),
            repair,
        },
        scene,
    }
}

/// Scene only, for callers that do not care about diagnostics.
pub fn build_scene(input: &DetectionResponse, config: &SynthConfig) -> Scene {
    synthesize(input, config).scene
}
