use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use eframe::egui::{Vec2, vec2};
use serde::Deserialize;

/// Tunables for physics, layout and disclosure timing. Every field has a
/// default, so a config file only needs the keys it overrides.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub spring_length: f32,
    pub spring_strength: f32,
    pub repulsion_strength: f32,
    pub repulsion_cutoff: f32,
    pub centering_strength: f32,
    pub selected_pull: f32,
    pub damping_factor: f32,
    pub edge_margin: f32,
    pub jitter_amplitude: f32,
    pub jitter_period_secs: f32,

    pub first_level_radius: f32,
    pub second_level_radius: f32,
    pub outer_level_radius: f32,
    pub initial_radius: f32,
    pub anchor_offset: [f32; 2],
    pub compact_anchor_offset: [f32; 2],
    pub center_offset_x: f32,
    pub compact_breakpoint: f32,
    pub compact_size_multiplier: f32,

    pub center_node_velocity: f32,
    pub first_level_velocity: f32,
    pub second_level_velocity: f32,
    pub outer_node_velocity: f32,

    pub reveal_interval_ms: u64,
    pub reveal_stagger_ms: u64,
    pub fade_speed: f32,
    pub transition_delay_ms: u64,
    pub initial_node_delay_ms: u64,
    pub settlement_poll_ms: u64,
    pub settlement_threshold: f32,
    pub settlement_frames_required: u32,
    pub max_tick_ms: f32,

    pub click_tolerance: f32,
    pub drag_release_ms: u64,
    pub grid_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spring_length: 110.0,
            spring_strength: 0.03,
            repulsion_strength: 13_000.0,
            repulsion_cutoff: 300.0,
            centering_strength: 0.003,
            selected_pull: 0.05,
            damping_factor: 0.1,
            edge_margin: 20.0,
            jitter_amplitude: 0.05,
            jitter_period_secs: 8.0,

            first_level_radius: 120.0,
            second_level_radius: 170.0,
            outer_level_radius: 300.0,
            initial_radius: 150.0,
            anchor_offset: [80.0, 50.0],
            compact_anchor_offset: [40.0, 25.0],
            center_offset_x: -300.0,
            compact_breakpoint: 1000.0,
            compact_size_multiplier: 0.75,

            center_node_velocity: 0.015,
            first_level_velocity: 0.015,
            second_level_velocity: 0.04,
            outer_node_velocity: 0.025,

            reveal_interval_ms: 500,
            reveal_stagger_ms: 20,
            fade_speed: 0.02,
            transition_delay_ms: 600,
            initial_node_delay_ms: 700,
            settlement_poll_ms: 50,
            settlement_threshold: 0.1,
            settlement_frames_required: 5,
            max_tick_ms: 32.0,

            click_tolerance: 5.0,
            drag_release_ms: 100,
            grid_size: 30.0,
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid scene config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.reveal_interval_ms > 0, "revealIntervalMs must be at least 1");
        ensure!(self.settlement_poll_ms > 0, "settlementPollMs must be at least 1");
        ensure!(self.fade_speed > 0.0, "fadeSpeed must be positive");
        ensure!(
            self.settlement_threshold > 0.0,
            "settlementThreshold must be positive"
        );
        ensure!(
            self.settlement_frames_required > 0,
            "settlementFramesRequired must be at least 1"
        );
        ensure!(self.max_tick_ms > 0.0, "maxTickMs must be positive");
        ensure!(
            self.jitter_period_secs > 0.0,
            "jitterPeriodSecs must be positive"
        );
        Ok(())
    }

    // Recurring timers re-arm from their own handler, so a zero delay would
    // never leave the current tick.
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }

    pub fn reveal_stagger(&self) -> Duration {
        Duration::from_millis(self.reveal_stagger_ms)
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    pub fn initial_node_delay(&self) -> Duration {
        Duration::from_millis(self.initial_node_delay_ms)
    }

    pub fn settlement_poll(&self) -> Duration {
        Duration::from_millis(self.settlement_poll_ms.max(1))
    }

    pub fn drag_release(&self) -> Duration {
        Duration::from_millis(self.drag_release_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub compact: bool,
    center_offset_x: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, config: &SceneConfig) -> Self {
        let compact = width <= config.compact_breakpoint;
        Self {
            width,
            height,
            compact,
            center_offset_x: if compact { 0.0 } else { config.center_offset_x },
        }
    }

    pub fn center_offset_x(&self) -> f32 {
        self.center_offset_x
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0 + self.center_offset_x, self.height / 2.0)
    }

    pub fn anchor_offset(&self, config: &SceneConfig) -> Vec2 {
        let [x, y] = if self.compact {
            config.compact_anchor_offset
        } else {
            config.anchor_offset
        };
        vec2(x, y)
    }

    pub fn size_multiplier(&self, config: &SceneConfig) -> f32 {
        if self.compact {
            config.compact_size_multiplier
        } else {
            1.0
        }
    }
}
