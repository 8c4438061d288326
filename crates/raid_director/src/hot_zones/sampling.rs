//! Rejection sampling of spawn positions inside circular zones.

use crate::config::{HotZone, PriorityRanks};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use tracing::debug;

/// Candidates drawn for one quota slot before that slot is given up on.
pub const MAX_ATTEMPTS_PER_POSITION: usize = 50;

/// An accepted spawn position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnPosition {
    pub zone: String,
    pub x: f64,
    pub y: f64,
}

impl SpawnPosition {
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

/// Places up to `maxBots` points per enabled zone, higher priority zones
/// first.
///
/// Points are drawn with a uniform angle and a uniform radius, so they cluster
/// toward the zone center. A candidate is kept only if it lies at least
/// `min_distance` from every point accepted so far on the map, whatever zone
/// that point belongs to. Each slot of the quota gets
/// [`MAX_ATTEMPTS_PER_POSITION`] candidates; a slot with no accepted candidate
/// is left empty and the next slot starts a fresh budget.
pub fn generate_spawn_positions<R: Rng + ?Sized>(
    zones: &BTreeMap<String, HotZone>,
    ranks: &PriorityRanks,
    min_distance: f64,
    rng: &mut R,
) -> Vec<SpawnPosition> {
    let mut ordered: Vec<(&String, &HotZone)> = zones.iter().filter(|(_, zone)| zone.enabled).collect();
    ordered.sort_by_key(|(_, zone)| ranks.rank(zone.priority));

    let mut accepted: Vec<SpawnPosition> = Vec::new();
    for (name, zone) in ordered {
        let quota = zone.max_bots as usize;
        let radius = zone.coordinates.radius.max(0.0);
        let mut placed = 0;

        for _slot in 0..quota {
            for _ in 0..MAX_ATTEMPTS_PER_POSITION {
                let angle = rng.gen::<f64>() * TAU;
                let distance = rng.gen::<f64>() * radius;
                let x = zone.coordinates.x + angle.cos() * distance;
                let y = zone.coordinates.y + angle.sin() * distance;

                if accepted.iter().all(|p| p.distance_to(x, y) >= min_distance) {
                    accepted.push(SpawnPosition {
                        zone: name.clone(),
                        x,
                        y,
                    });
                    placed += 1;
                    break;
                }
            }
        }

        if placed < quota {
            debug!(zone = %name, "Placed {}/{} spawn positions", placed, quota);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ZoneCoordinates, ZonePriority};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn zone(x: f64, y: f64, radius: f64, max_bots: u32, priority: ZonePriority) -> HotZone {
        HotZone {
            enabled: true,
            description: String::new(),
            spawn_types: vec!["assault".to_string()],
            max_bots,
            spawn_chance: 1.0,
            priority,
            coordinates: ZoneCoordinates { x, y, radius },
            quest_related: false,
        }
    }

    fn assert_spacing(positions: &[SpawnPosition], min_distance: f64) {
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance_to(b.x, b.y) >= min_distance, "{a:?} too close to {b:?}");
            }
        }
    }

    #[test]
    fn test_points_stay_inside_zone() {
        let mut zones = BTreeMap::new();
        zones.insert("dorms".to_string(), zone(100.0, -40.0, 80.0, 10, ZonePriority::High));
        let mut rng = StdRng::seed_from_u64(7);

        let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 5.0, &mut rng);

        assert!(!positions.is_empty());
        for p in &positions {
            assert!(p.distance_to(100.0, -40.0) <= 80.0 + 1e-9);
            assert_eq!(p.zone, "dorms");
        }
        assert_spacing(&positions, 5.0);
    }

    #[test]
    fn test_infeasible_quota_terminates_short() {
        // Two points 100 apart cannot both fit in a circle of radius 10.
        let mut zones = BTreeMap::new();
        zones.insert("tiny".to_string(), zone(0.0, 0.0, 10.0, 5, ZonePriority::Medium));
        let mut rng = StdRng::seed_from_u64(1);

        let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 100.0, &mut rng);

        assert_eq!(positions.len(), 1);
    }

    #[test]
    fn test_large_quota_is_not_capped_by_one_budget() {
        let mut zones = BTreeMap::new();
        zones.insert("plaza".to_string(), zone(0.0, 0.0, 1000.0, 60, ZonePriority::High));
        let mut rng = StdRng::seed_from_u64(11);

        let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 1.0, &mut rng);

        assert_eq!(positions.len(), 60);
        assert_spacing(&positions, 1.0);
    }

    #[test]
    fn test_crowded_zone_fills_most_slots() {
        // Eight points 120 apart fit in a radius of 200, but late slots
        // reject most candidates. A single shared budget averaged about six.
        let mut zones = BTreeMap::new();
        zones.insert("lab".to_string(), zone(0.0, 0.0, 200.0, 8, ZonePriority::High));

        let mut total = 0;
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 120.0, &mut rng);
            assert!(positions.len() <= 8);
            assert_spacing(&positions, 120.0);
            total += positions.len();
        }

        assert!(total >= 660, "placed {total} of 800");
    }

    #[test]
    fn test_spacing_holds_across_zones() {
        let mut zones = BTreeMap::new();
        zones.insert("a".to_string(), zone(0.0, 0.0, 200.0, 6, ZonePriority::Low));
        zones.insert("b".to_string(), zone(50.0, 50.0, 200.0, 6, ZonePriority::High));
        zones.insert("c".to_string(), zone(-80.0, 20.0, 150.0, 6, ZonePriority::Medium));

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 60.0, &mut rng);
            assert_spacing(&positions, 60.0);
            assert!(positions.len() <= 18);
        }
    }

    #[test]
    fn test_higher_priority_zone_placed_first() {
        let mut zones = BTreeMap::new();
        zones.insert("alpha".to_string(), zone(0.0, 0.0, 0.0, 1, ZonePriority::Low));
        zones.insert("omega".to_string(), zone(0.0, 0.0, 0.0, 1, ZonePriority::High));
        let mut rng = StdRng::seed_from_u64(3);

        let positions = generate_spawn_positions(&zones, &PriorityRanks::default(), 1.0, &mut rng);

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].zone, "omega");
    }

    #[test]
    fn test_disabled_zone_ignored() {
        let mut zones = BTreeMap::new();
        let mut off = zone(0.0, 0.0, 50.0, 4, ZonePriority::High);
        off.enabled = false;
        zones.insert("off".to_string(), off);
        let mut rng = StdRng::seed_from_u64(9);

        assert!(generate_spawn_positions(&zones, &PriorityRanks::default(), 1.0, &mut rng).is_empty());
    }
}
