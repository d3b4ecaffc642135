use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::graph::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    AdvanceStage,
    Enqueue(EntityId),
    RevealNext,
    PollSettlement,
    ReleaseDrag(u64),
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    seq: u64,
    episode: Option<u64>,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Single-threaded timer queue. Episode-bound entries are dropped in bulk by
/// bumping the episode token; free-standing entries always fire.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    episode: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl Scheduler {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    pub fn after(&mut self, delay: Duration, event: Event) {
        self.push(delay, Some(self.episode), event);
    }

    /// Schedules `event` outside any episode; invalidation leaves it alone.
    pub fn after_detached(&mut self, delay: Duration, event: Event) {
        self.push(delay, None, event);
    }

    fn push(&mut self, delay: Duration, episode: Option<u64>, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            due: self.now + delay,
            seq,
            episode,
            event,
        }));
    }

    /// Stale-episode entries and everything scheduled so far become no-ops.
    pub fn invalidate(&mut self) {
        self.episode += 1;
        let episode = self.episode;
        self.queue
            .retain(|Reverse(entry)| entry.episode.is_none_or(|token| token == episode));
    }

    pub fn pop_due(&mut self) -> Option<Event> {
        loop {
            let Reverse(head) = self.queue.peek()?;
            if head.due > self.now {
                return None;
            }

            let Reverse(entry) = self.queue.pop()?;
            if entry.episode.is_none_or(|token| token == self.episode) {
                return Some(entry.event);
            }
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
