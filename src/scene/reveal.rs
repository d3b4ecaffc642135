use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::graph::EntityId;

use super::schedule::{Event, Scheduler};

/// Backlog of entities waiting for their fade target to flip to 1. Items
/// arrive staggered and leave one per reveal interval.
#[derive(Debug, Default)]
pub struct RevealQueue {
    items: VecDeque<EntityId>,
    staggered: usize,
    in_flight: bool,
}

impl RevealQueue {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Nothing queued, nothing still arriving, no reveal timer armed.
    pub fn is_drained(&self) -> bool {
        self.items.is_empty() && self.staggered == 0 && !self.in_flight
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.staggered = 0;
        self.in_flight = false;
    }

    pub fn schedule(
        &mut self,
        mut ids: Vec<EntityId>,
        stagger: Duration,
        rng: &mut impl Rng,
        scheduler: &mut Scheduler,
    ) -> usize {
        self.items.clear();
        ids.shuffle(rng);

        for (index, id) in ids.iter().enumerate() {
            scheduler.after(stagger * index as u32, Event::Enqueue(*id));
        }
        self.staggered += ids.len();
        ids.len()
    }

    /// A staggered item has arrived. Returns true when nothing is being
    /// revealed yet, so the caller should pop right away.
    pub fn arrive(&mut self, id: EntityId) -> bool {
        self.staggered = self.staggered.saturating_sub(1);
        self.items.push_back(id);
        !self.in_flight
    }

    /// Pops the next id and marks a reveal as in flight. `None` means the
    /// queue ran dry and the in-flight marker was dropped.
    pub fn pop(&mut self) -> Option<EntityId> {
        let next = self.items.pop_front();
        self.in_flight = next.is_some();
        next
    }
}
