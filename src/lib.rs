//! Turns object detections from a photo into a completable 2D platformer level.
//!
//! Pipeline: extract candidates, add ground, dedupe, repair reachability,
//! place entities, assemble the versioned scene.

pub mod config;
pub mod constraints;
pub mod dedup;
pub mod detection;
pub mod extract;
pub mod generation;
pub mod placement;
pub mod reachability;
pub mod scene;

pub use config::{ConfigError, SynthConfig};
pub use detection::{Bounds, Category, Detection, DetectionResponse, ImageSize};
pub use generation::{build_scene, synthesize, Synthesis, SynthesisReport};
pub use scene::Scene;
