use eframe::egui::Vec2;

use crate::graph::SettleWindow;

pub const WINDOW_CAPACITY: usize = 10;

#[derive(Clone, Copy, Debug)]
pub struct SettlementDetector {
    threshold: f32,
    frames_required: u32,
}

impl SettlementDetector {
    pub fn new(threshold: f32, frames_required: u32) -> Self {
        Self {
            threshold,
            frames_required,
        }
    }

    pub fn sample(&self, window: &mut SettleWindow, speed: f32) -> bool {
        window.samples.push_back(speed);
        while window.samples.len() > WINDOW_CAPACITY {
            window.samples.pop_front();
        }

        let average = window.samples.iter().sum::<f32>() / window.samples.len() as f32;
        if average < self.threshold {
            window.counter = window.counter.saturating_add(1);
        } else {
            window.counter = 0;
        }

        window.counter >= self.frames_required
    }

    pub fn is_settled(&self, window: &mut SettleWindow, velocity: Vec2) -> bool {
        self.sample(window, velocity.length())
    }
}
