//! Annealing force-directed layout
//!
//! Spring attraction along edges, pairwise repulsion between all nodes, and
//! a temperature that caps per-tick displacement and cools each step so the
//! layout settles instead of oscillating. Stepping is deterministic: node
//! ids are traversed in sorted order, so the same inputs always produce the
//! same positions.

use crate::config::SimulationConfig;
use crate::identifiers::ContentId;
use crate::projections::{GraphData, GraphEdge};
use crate::value_objects::{Dimensions, Position2D};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// One running force simulation
///
/// The simulation holds only annealing state; positions live with the
/// caller and flow through [`advance`](ForceSimulation::advance) unchanged
/// in identity, so a paused or detached renderer can resume stepping at
/// any time.
pub struct ForceSimulation {
    config: SimulationConfig,
    temperature: f64,
    last_displacement: f64,
}

impl ForceSimulation {
    /// Create a simulation at full temperature
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            temperature: config.initial_temperature,
            last_displacement: f64::INFINITY,
        }
    }

    /// Current displacement cap
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// True once the last step moved every node less than the settle
    /// threshold
    pub fn is_settled(&self) -> bool {
        self.last_displacement < self.config.settle_threshold
    }

    /// Restore full temperature, e.g. after the family changed shape
    pub fn reheat(&mut self) {
        self.temperature = self.config.initial_temperature;
        self.last_displacement = f64::INFINITY;
    }

    /// Seed starting positions: the root at the viewport center, everything
    /// else scattered around it
    ///
    /// The scatter is driven by the given seed, so replays place nodes
    /// identically.
    pub fn scatter(
        &self,
        data: &GraphData,
        dimensions: Dimensions,
        seed: u64,
    ) -> HashMap<ContentId, Position2D> {
        let mut rng = StdRng::seed_from_u64(seed);
        let center = dimensions.center();
        let spread_x = dimensions.width * 0.4;
        let spread_y = dimensions.height * 0.4;

        let mut positions = HashMap::with_capacity(data.nodes.len());
        for node in &data.nodes {
            let position = if node.id == data.root_id {
                center
            } else {
                Position2D::new(
                    center.x + rng.gen_range(-spread_x..spread_x),
                    center.y + rng.gen_range(-spread_y..spread_y),
                )
            };
            positions.insert(node.id, position);
        }
        positions
    }

    /// Advance the simulation one tick of `dt` seconds
    ///
    /// Returns the updated positions; the input map is untouched. Nodes
    /// referenced by an edge but missing from the map are skipped rather
    /// than invented.
    pub fn advance(
        &mut self,
        positions: &HashMap<ContentId, Position2D>,
        edges: &[GraphEdge],
        dt: f64,
    ) -> HashMap<ContentId, Position2D> {
        if positions.is_empty() {
            self.last_displacement = 0.0;
            return HashMap::new();
        }

        let mut ids: Vec<ContentId> = positions.keys().copied().collect();
        ids.sort();

        let mut forces: HashMap<ContentId, (f64, f64)> =
            ids.iter().map(|id| (*id, (0.0, 0.0))).collect();

        // Pairwise repulsion.
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let a = positions[&ids[i]];
                let b = positions[&ids[j]];
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                let magnitude = self.config.repulsion_strength / (distance * distance);
                let (ux, uy) = (dx / distance, dy / distance);

                let first = forces.entry(ids[i]).or_insert((0.0, 0.0));
                first.0 += ux * magnitude;
                first.1 += uy * magnitude;
                let second = forces.entry(ids[j]).or_insert((0.0, 0.0));
                second.0 -= ux * magnitude;
                second.1 -= uy * magnitude;
            }
        }

        // Spring attraction along edges.
        for edge in edges {
            let (a, b) = match (positions.get(&edge.source), positions.get(&edge.target)) {
                (Some(a), Some(b)) => (*a, *b),
                _ => continue,
            };
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let distance = (dx * dx + dy * dy).sqrt().max(0.01);
            let magnitude = self.config.spring_strength * (distance - self.config.spring_length);
            let (ux, uy) = (dx / distance, dy / distance);

            let source = forces.entry(edge.source).or_insert((0.0, 0.0));
            source.0 += ux * magnitude;
            source.1 += uy * magnitude;
            let target = forces.entry(edge.target).or_insert((0.0, 0.0));
            target.0 -= ux * magnitude;
            target.1 -= uy * magnitude;
        }

        // Integrate, damped and capped by the current temperature.
        let mut next = HashMap::with_capacity(positions.len());
        let mut max_step = 0.0f64;
        for id in &ids {
            let position = positions[id];
            let (fx, fy) = forces[id];
            let sx = fx * dt * self.config.damping;
            let sy = fy * dt * self.config.damping;
            let step = (sx * sx + sy * sy).sqrt();
            let (sx, sy) = if step > self.temperature && step > 0.0 {
                let scale = self.temperature / step;
                (sx * scale, sy * scale)
            } else {
                (sx, sy)
            };
            max_step = max_step.max(step.min(self.temperature));
            next.insert(*id, Position2D::new(position.x + sx, position.y + sy));
        }

        self.temperature *= self.config.cooling_rate;
        self.last_displacement = max_step;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FamilyBuilder;
    use crate::identifiers::CreatorId;
    use crate::projections::GraphDataOptions;
    use crate::value_objects::{
        Confidence, ContentItem, ContentRelationship, ContentType, CreationMethod, PlatformType,
        RelationshipType,
    };
    use chrono::Utc;

    fn linked_pair() -> (GraphData, ContentId, ContentId) {
        let creator = CreatorId::new();
        let make = |title: &str| {
            ContentItem::new(
                ContentId::new(),
                creator,
                PlatformType::Youtube,
                ContentType::Video,
                title,
                Utc::now(),
            )
        };
        let root = make("Root");
        let child = make("Child");
        let (root_id, child_id) = (root.id, child.id);
        let built = FamilyBuilder::new(root_id)
            .with_items([root, child])
            .with_relationships([ContentRelationship::new(
                root_id,
                child_id,
                RelationshipType::Parent,
                Confidence::FULL,
                CreationMethod::UserDefined,
            )])
            .build()
            .unwrap();
        let data = GraphData::from_family(&built.family, &GraphDataOptions::default());
        (data, root_id, child_id)
    }

    #[test]
    fn test_springs_pull_stretched_edges_together() {
        let (data, root_id, child_id) = linked_pair();
        let mut simulation = ForceSimulation::new(SimulationConfig::default());

        let mut positions = HashMap::new();
        positions.insert(root_id, Position2D::new(0.0, 0.0));
        positions.insert(child_id, Position2D::new(400.0, 0.0));

        let next = simulation.advance(&positions, &data.edges, 1.0);
        let before = positions[&root_id].distance_to(&positions[&child_id]);
        let after = next[&root_id].distance_to(&next[&child_id]);
        assert!(after < before);
    }

    #[test]
    fn test_repulsion_pushes_crowded_nodes_apart() {
        let (data, root_id, child_id) = linked_pair();
        let mut simulation = ForceSimulation::new(SimulationConfig::default());

        let mut positions = HashMap::new();
        positions.insert(root_id, Position2D::new(0.0, 0.0));
        positions.insert(child_id, Position2D::new(5.0, 0.0));

        let next = simulation.advance(&positions, &data.edges, 1.0);
        let before = positions[&root_id].distance_to(&positions[&child_id]);
        let after = next[&root_id].distance_to(&next[&child_id]);
        assert!(after > before);
    }

    #[test]
    fn test_stepping_is_deterministic() {
        let (data, root_id, child_id) = linked_pair();
        let mut positions = HashMap::new();
        positions.insert(root_id, Position2D::new(10.0, 20.0));
        positions.insert(child_id, Position2D::new(250.0, 180.0));

        let mut first = ForceSimulation::new(SimulationConfig::default());
        let mut second = ForceSimulation::new(SimulationConfig::default());
        let a = first.advance(&positions, &data.edges, 1.0 / 60.0);
        let b = second.advance(&positions, &data.edges, 1.0 / 60.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cooling_settles_the_layout() {
        let (data, _, _) = linked_pair();
        let mut simulation = ForceSimulation::new(SimulationConfig::default());
        let mut positions = simulation.scatter(&data, Dimensions::default(), 7);

        for _ in 0..600 {
            positions = simulation.advance(&positions, &data.edges, 1.0 / 60.0);
            if simulation.is_settled() {
                break;
            }
        }
        assert!(simulation.is_settled());

        // Reheating makes it live again.
        simulation.reheat();
        assert!(!simulation.is_settled());
        assert_eq!(
            simulation.temperature(),
            SimulationConfig::default().initial_temperature
        );
    }

    #[test]
    fn test_scatter_is_seeded_and_roots_the_center() {
        let (data, root_id, _) = linked_pair();
        let simulation = ForceSimulation::new(SimulationConfig::default());

        let first = simulation.scatter(&data, Dimensions::default(), 42);
        let second = simulation.scatter(&data, Dimensions::default(), 42);
        assert_eq!(first, second);
        assert_eq!(first[&root_id], Dimensions::default().center());

        let reseeded = simulation.scatter(&data, Dimensions::default(), 43);
        assert_ne!(first, reseeded);
    }
}
