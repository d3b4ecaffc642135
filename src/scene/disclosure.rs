use std::fmt;
use std::time::Duration;

/// Stages of one disclosure episode. Progression is forward-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisclosureState {
    CenterNode,
    FirstLevel,
    SecondLevel,
    #[default]
    Complete,
}

impl DisclosureState {
    /// Stage that follows `self`. `queue_empty` only matters when leaving
    /// the second level, which must not complete over a pending backlog.
    pub fn next(self, queue_empty: bool) -> Self {
        match self {
            Self::CenterNode => Self::FirstLevel,
            Self::FirstLevel => Self::SecondLevel,
            Self::SecondLevel if queue_empty => Self::Complete,
            Self::SecondLevel => Self::SecondLevel,
            Self::Complete => Self::Complete,
        }
    }

    pub fn status_text(self) -> Option<&'static str> {
        match self {
            Self::FirstLevel => Some("Loading connections..."),
            Self::SecondLevel => Some("Completing graph..."),
            Self::CenterNode | Self::Complete => None,
        }
    }
}

impl fmt::Display for DisclosureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CenterNode => "centerNode",
            Self::FirstLevel => "firstLevel",
            Self::SecondLevel => "secondLevel",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GateInputs {
    pub now: Duration,
    pub queue_drained: bool,
    pub all_settled: bool,
}

#[derive(Debug, Default)]
pub struct DisclosureController {
    state: DisclosureState,
    stage_started: Duration,
    last_reveal: Option<Duration>,
    polling: bool,
}

impl DisclosureController {
    pub fn state(&self) -> DisclosureState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != DisclosureState::Complete
    }

    pub fn begin(&mut self, now: Duration) {
        self.state = DisclosureState::CenterNode;
        self.stage_started = now;
        self.last_reveal = None;
        self.polling = false;
    }

    pub fn advance(&mut self, now: Duration, queue_empty: bool) -> Option<DisclosureState> {
        let next = self.state.next(queue_empty);
        if next == self.state {
            return None;
        }

        self.state = next;
        self.stage_started = now;
        Some(next)
    }

    pub fn abandon(&mut self) {
        self.state = DisclosureState::Complete;
        self.polling = false;
    }

    pub fn record_reveal(&mut self, now: Duration) {
        self.last_reveal = Some(now);
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn set_polling(&mut self, polling: bool) {
        self.polling = polling;
    }

    /// Drained queue, every visible entity settled, and the dwell time passed
    /// since both the stage start and the most recent reveal.
    pub fn ready_to_advance(&self, inputs: GateInputs, dwell: Duration) -> bool {
        if !inputs.queue_drained || !inputs.all_settled {
            return false;
        }

        let since_stage = inputs.now.saturating_sub(self.stage_started);
        let since_reveal = self
            .last_reveal
            .map(|at| inputs.now.saturating_sub(at))
            .unwrap_or(Duration::MAX);
        since_stage > dwell && since_reveal > dwell
    }
}
