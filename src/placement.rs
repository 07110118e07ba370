use crate::config::SynthConfig;
use crate::extract::{CandidateId, PlatformCandidate};
use crate::scene::{EnemyKind, EnemySpawn, PickupKind, PickupSpawn, SpawnPoint, Spawns};

const EXIT_INSET: f32 = 0.05;
const EXIT_X_RANGE: (f32, f32) = (0.7, 0.95);
const FALLBACK_PICKUP_XS: [f32; 2] = [0.3, 0.5];

/// Spawns plus the platforms that received an enemy, by candidate id.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub spawns: Spawns,
    pub enemy_platforms: Vec<CandidateId>,
}

fn above(p: &PlatformCandidate, clearance: f32) -> (f32, f32) {
    (p.bounds.center_x(), p.bounds.y - clearance)
}

fn ground_y(platforms: &[PlatformCandidate], config: &SynthConfig) -> f32 {
    platforms
        .iter()
        .find(|p| p.is_ground())
        .or_else(|| platforms.first())
        .map(|p| p.bounds.y)
        .unwrap_or(config.ground_y)
}

fn exit_point(platforms: &[PlatformCandidate], floor_y: f32, config: &SynthConfig) -> SpawnPoint {
    // Highest platform = smallest y; first one wins ties.
    let highest = platforms
        .iter()
        .reduce(|best, p| if p.bounds.y < best.bounds.y { p } else { best });
    match highest {
        Some(p) => SpawnPoint {
            x: (p.bounds.right() - EXIT_INSET).clamp(EXIT_X_RANGE.0, EXIT_X_RANGE.1),
            y: p.bounds.y - config.spawn_clearance,
        },
        None => SpawnPoint {
            x: EXIT_X_RANGE.1,
            y: floor_y - config.spawn_clearance,
        },
    }
}

fn pickups(platforms: &[PlatformCandidate], floor_y: f32, config: &SynthConfig) -> Vec<PickupSpawn> {
    let clearance = config.spawn_clearance;
    let mut out: Vec<PickupSpawn> = platforms
        .iter()
        .filter(|p| p.is_detected())
        .take(config.max_platform_pickups)
        .enumerate()
        .map(|(i, p)| {
            let (x, y) = above(p, clearance);
            let kind = if i == 0 { PickupKind::Health } else { PickupKind::Coin };
            PickupSpawn { x, y, kind }
        })
        .collect();

    if out.len() < config.min_pickups {
        let room = config.max_topped_up_pickups.saturating_sub(out.len());
        out.extend(
            platforms
                .iter()
                .filter(|p| p.is_bridge())
                .take(room)
                .map(|p| {
                    let (x, y) = above(p, clearance);
                    PickupSpawn {
                        x,
                        y,
                        kind: PickupKind::Coin,
                    }
                }),
        );
    }

    if out.len() < config.min_pickups {
        out.extend(FALLBACK_PICKUP_XS.iter().map(|&x| PickupSpawn {
            x,
            y: floor_y - clearance,
            kind: PickupKind::Coin,
        }));
    }

    out
}

fn enemies(platforms: &[PlatformCandidate], config: &SynthConfig) -> (Vec<EnemySpawn>, Vec<CandidateId>) {
    let eligible: Vec<&PlatformCandidate> = platforms
        .iter()
        .filter(|p| p.is_detected() && p.bounds.w > config.enemy_min_width)
        .collect();

    // Hazard-anchored platforms first, list order otherwise.
    let chosen: Vec<&PlatformCandidate> = eligible
        .iter()
        .filter(|p| p.enemy_anchor)
        .chain(eligible.iter().filter(|p| !p.enemy_anchor))
        .take(config.max_enemies)
        .copied()
        .collect();

    let spawns: Vec<EnemySpawn> = chosen
        .iter()
        .map(|p| {
            let (x, y) = above(p, config.spawn_clearance);
            EnemySpawn {
                x,
                y,
                kind: EnemyKind::Walker,
            }
        })
        .collect();
    let ids: Vec<CandidateId> = chosen.iter().map(|p| p.id).collect();
    (spawns, ids)
}

/// Place player, exit, pickups and enemies on the repaired platform list.
pub fn place_entities(platforms: &[PlatformCandidate], config: &SynthConfig) -> Placement {
    let floor_y = ground_y(platforms, config);
    let player = SpawnPoint {
        x: config.player_spawn_x,
        y: floor_y - config.spawn_clearance,
    };
    let exit = exit_point(platforms, floor_y, config);
    let pickups = pickups(platforms, floor_y, config);
    let (enemies, enemy_platforms) = enemies(platforms, config);

    Placement {
        spawns: Spawns {
            player,
            exit,
            enemies,
            pickups,
        },
        enemy_platforms,
    }
}
