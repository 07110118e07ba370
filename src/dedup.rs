use crate::config::SynthConfig;
use crate::extract::PlatformCandidate;

/// Sort bottom-of-scene first (descending y). Stable, so ties keep insertion order.
pub fn sort_bottom_up(platforms: &mut [PlatformCandidate]) {
    platforms.sort_by(|a, b| b.bounds.y.total_cmp(&a.bounds.y));
}

fn is_near_duplicate(kept: &PlatformCandidate, cand: &PlatformCandidate, band: f32) -> bool {
    (kept.bounds.y - cand.bounds.y).abs() < band && kept.bounds.overlaps_x(&cand.bounds)
}

/// Drop candidates that overlap an earlier kept candidate within the same
/// height band, then cap the survivors. Returns how many were dropped as duplicates.
pub fn dedupe(platforms: &mut Vec<PlatformCandidate>, config: &SynthConfig) -> usize {
    sort_bottom_up(platforms);

    let before = platforms.len();
    let mut kept: Vec<PlatformCandidate> = Vec::with_capacity(before);
    for cand in platforms.drain(..) {
        if kept
            .iter()
            .any(|k| is_near_duplicate(k, &cand, config.duplicate_band))
        {
            continue;
        }
        kept.push(cand);
    }
    let dropped = before - kept.len();

    kept.truncate(config.max_candidates);
    *platforms = kept;
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Bounds, Category};
    use crate::extract::{CandidateIds, PlatformKind};

    fn plat(ids: &mut CandidateIds, label: &str, x: f32, y: f32, w: f32) -> PlatformCandidate {
        PlatformCandidate {
            id: ids.next_id(),
            label: label.to_string(),
            category: Some(Category::Furniture),
            confidence: 0.9,
            bounds: Bounds::new(x, y, w, 0.03),
            kind: PlatformKind::Detected,
            enemy_anchor: false,
        }
    }

    #[test]
    fn first_accepted_wins_within_band() {
        let cfg = SynthConfig::default();
        let mut ids = CandidateIds::new();
        let mut list = vec![
            plat(&mut ids, "shelf", 0.1, 0.50, 0.3),
            plat(&mut ids, "shelf_echo", 0.2, 0.52, 0.3),
        ];
        let dropped = dedupe(&mut list, &cfg);
        assert_eq!(dropped, 1);
        assert_eq!(list.len(), 1);
        // bottom-first scan keeps the lower one
        assert_eq!(list[0].label, "shelf_echo");
    }

    #[test]
    fn same_height_without_overlap_survives() {
        let cfg = SynthConfig::default();
        let mut ids = CandidateIds::new();
        let mut list = vec![
            plat(&mut ids, "left", 0.0, 0.5, 0.3),
            plat(&mut ids, "right", 0.5, 0.5, 0.3),
        ];
        assert_eq!(dedupe(&mut list, &cfg), 0);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn overlap_outside_band_survives() {
        let cfg = SynthConfig::default();
        let mut ids = CandidateIds::new();
        let mut list = vec![
            plat(&mut ids, "low", 0.1, 0.60, 0.3),
            plat(&mut ids, "high", 0.1, 0.40, 0.3),
        ];
        dedupe(&mut list, &cfg);
        let labels: Vec<&str> = list.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["low", "high"]);
    }

    #[test]
    fn caps_survivors() {
        let cfg = SynthConfig::default();
        let mut ids = CandidateIds::new();
        let mut list: Vec<PlatformCandidate> = (0..15)
            .map(|i| plat(&mut ids, &format!("p{i}"), 0.0, 0.1 + i as f32 * 0.055, 0.2))
            .collect();
        dedupe(&mut list, &cfg);
        assert_eq!(list.len(), cfg.max_candidates);
        // the kept ones are the lowest in the scene
        assert!(list.windows(2).all(|w| w[0].bounds.y >= w[1].bounds.y));
        assert_eq!(list[0].label, "p14");
    }
}
