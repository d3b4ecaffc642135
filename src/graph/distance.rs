use std::collections::{HashMap, VecDeque};

use super::model::{Edge, EntityId};

pub const MAX_HOPS: u8 = 2;

/// Hop distance per reached entity; the focus maps to 0 and nothing exceeds
/// [`MAX_HOPS`]. Unreached entities are absent.
pub type DistanceMap = HashMap<EntityId, u8>;

#[derive(Clone, Debug, Default)]
pub struct DistanceIndex {
    adjacency: Vec<Vec<EntityId>>,
}

impl DistanceIndex {
    pub fn new(entity_count: usize, edges: &[Edge]) -> Self {
        let mut adjacency = vec![Vec::new(); entity_count];
        for edge in edges {
            let (source, target) = (edge.source.index(), edge.target.index());
            if source >= entity_count || target >= entity_count {
                continue;
            }
            adjacency[source].push(edge.target);
            adjacency[target].push(edge.source);
        }

        Self { adjacency }
    }

    pub fn neighbors(&self, id: EntityId) -> &[EntityId] {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn distances_from(&self, focus: EntityId) -> DistanceMap {
        let mut distances = DistanceMap::new();
        if focus.index() >= self.adjacency.len() {
            return distances;
        }

        distances.insert(focus, 0);
        let mut queue = VecDeque::from([(focus, 0u8)]);

        while let Some((current, distance)) = queue.pop_front() {
            if distance >= MAX_HOPS {
                continue;
            }

            for &next in self.neighbors(current) {
                if distances.contains_key(&next) {
                    continue;
                }
                distances.insert(next, distance + 1);
                queue.push_back((next, distance + 1));
            }
        }

        distances
    }
}
