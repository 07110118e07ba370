//! Reachability repair.
//!
//! Platforms are ordered bottom-to-top (descending y). Each consecutive pair
//! must be within the jump envelope: vertical gap `lower.y - upper.y` and the
//! horizontal gap between the nearest edges. The repair loop inserts one
//! synthetic platform per iteration at the first violating pair, re-sorts and
//! rescans from the bottom, until the chain is clean or the budget runs out.

use crate::config::{SynthConfig, TraversalLimits};
use crate::dedup::sort_bottom_up;
use crate::detection::Bounds;
use crate::extract::{CandidateId, CandidateIds, PlatformCandidate};
use log::{debug, warn};
use serde::Serialize;

/// Float slack on gap comparisons so a gap of exactly the limit passes.
const GAP_TOLERANCE: f32 = 1e-5;

const BRIDGE_X_RANGE: (f32, f32) = (0.02, 0.85);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    Vertical,
    Horizontal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GapViolation {
    pub kind: GapKind,
    /// Index of the lower platform; the upper one is `index + 1`.
    pub index: usize,
    pub lower: CandidateId,
    pub upper: CandidateId,
    pub gap: f32,
    pub limit: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepairReport {
    pub iterations: usize,
    pub inserted: usize,
    /// No violation left in the final, capped chain.
    pub converged: bool,
    /// Platforms dropped by the absolute cap.
    pub truncated: usize,
    pub residual_violations: Vec<GapViolation>,
}

pub fn vertical_gap(lower: &Bounds, upper: &Bounds) -> f32 {
    lower.y - upper.y
}

/// 0 when the x-intervals overlap or touch, else the distance between nearest edges.
pub fn horizontal_gap(a: &Bounds, b: &Bounds) -> f32 {
    if a.right() < b.x {
        b.x - a.right()
    } else if b.right() < a.x {
        a.x - b.right()
    } else {
        0.0
    }
}

/// First broken limit between two height-adjacent slabs as `(kind, gap, limit)`.
/// Vertical is checked first.
pub fn gap_violation(
    lower: &Bounds,
    upper: &Bounds,
    limits: TraversalLimits,
) -> Option<(GapKind, f32, f32)> {
    let dy = vertical_gap(lower, upper);
    if dy > limits.max_vertical + GAP_TOLERANCE {
        return Some((GapKind::Vertical, dy, limits.max_vertical));
    }
    let dx = horizontal_gap(lower, upper);
    if dx > limits.max_horizontal + GAP_TOLERANCE {
        return Some((GapKind::Horizontal, dx, limits.max_horizontal));
    }
    None
}

fn pair_violation(
    index: usize,
    lower: &PlatformCandidate,
    upper: &PlatformCandidate,
    limits: TraversalLimits,
) -> Option<GapViolation> {
    gap_violation(&lower.bounds, &upper.bounds, limits).map(|(kind, gap, limit)| GapViolation {
        kind,
        index,
        lower: lower.id,
        upper: upper.id,
        gap,
        limit,
    })
}

/// Every violating consecutive pair of an already bottom-up sorted list.
/// A pair reports at most one violation; vertical takes precedence.
pub fn find_violations(platforms: &[PlatformCandidate], limits: TraversalLimits) -> Vec<GapViolation> {
    platforms
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| pair_violation(i, &pair[0], &pair[1], limits))
        .collect()
}

fn first_violation(platforms: &[PlatformCandidate], limits: TraversalLimits) -> Option<GapViolation> {
    platforms
        .windows(2)
        .enumerate()
        .find_map(|(i, pair)| pair_violation(i, &pair[0], &pair[1], limits))
}

/// Bounds of the synthetic platform that splits a violating pair.
pub fn filler_bounds(
    lower: &Bounds,
    upper: &Bounds,
    kind: GapKind,
    config: &SynthConfig,
) -> Bounds {
    let width = config.bridge_width;
    let center_x = match kind {
        // Bridge: between the two platforms' centres.
        GapKind::Vertical => (lower.center_x() + upper.center_x()) / 2.0,
        // Stepping-stone: middle of the empty span between nearest edges.
        GapKind::Horizontal => {
            if lower.right() < upper.x {
                (lower.right() + upper.x) / 2.0
            } else {
                (upper.right() + lower.x) / 2.0
            }
        }
    };
    Bounds {
        x: (center_x - width / 2.0).clamp(BRIDGE_X_RANGE.0, BRIDGE_X_RANGE.1),
        y: (lower.y + upper.y) / 2.0,
        w: width,
        h: config.platform_thickness,
    }
}

/// Insert bridges/stepping-stones until the chain is reachable or the
/// iteration budget is spent, then apply the absolute platform cap.
/// The list comes back sorted bottom-to-top.
pub fn repair(
    platforms: &mut Vec<PlatformCandidate>,
    ids: &mut CandidateIds,
    config: &SynthConfig,
) -> RepairReport {
    let limits = config.traversal();
    let mut report = RepairReport::default();

    sort_bottom_up(platforms);

    while report.iterations < config.max_repair_iterations {
        let Some(violation) = first_violation(platforms, limits) else {
            break;
        };
        report.iterations += 1;

        let lower = &platforms[violation.index];
        let upper = &platforms[violation.index + 1];
        let bounds = filler_bounds(&lower.bounds, &upper.bounds, violation.kind, config);
        let label = match violation.kind {
            GapKind::Vertical => "bridge",
            GapKind::Horizontal => "stepping_stone",
        };
        debug!(
            "repair #{}: {:?} gap {:.3} > {:.3} between '{}' and '{}', inserting {} at ({:.3}, {:.3})",
            report.iterations,
            violation.kind,
            violation.gap,
            violation.limit,
            lower.label,
            upper.label,
            label,
            bounds.x,
            bounds.y
        );

        let filler = PlatformCandidate::bridge(ids, label, bounds);
        platforms.insert(violation.index + 1, filler);
        sort_bottom_up(platforms);
        report.inserted += 1;
    }

    if platforms.len() > config.max_platforms {
        report.truncated = platforms.len() - config.max_platforms;
        platforms.truncate(config.max_platforms);
    }

    report.residual_violations = find_violations(platforms, limits);
    report.converged = report.residual_violations.is_empty();
    if !report.converged {
        warn!(
            "reachability repair stopped after {} iteration(s) with {} violation(s) left",
            report.iterations,
            report.residual_violations.len()
        );
    }

    report
}
