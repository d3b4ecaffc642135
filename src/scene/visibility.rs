use crate::graph::Fade;
use crate::util::ease_in_out_cubic;

#[derive(Clone, Copy, Debug)]
pub struct VisibilityController {
    fade_speed: f32,
}

impl VisibilityController {
    pub fn new(fade_speed: f32) -> Self {
        Self {
            fade_speed: fade_speed.max(f32::EPSILON),
        }
    }

    pub fn step(&self, current: f32, target: f32) -> f32 {
        let gap = target - current;
        if gap.abs() < self.fade_speed {
            return target;
        }

        let progress = (1.0 - gap.abs()).clamp(0.0, 1.0);
        let stride = self.fade_speed * (1.0 + ease_in_out_cubic(progress) * 0.5);
        if gap > 0.0 {
            (current + stride).min(target)
        } else {
            (current - stride).max(target)
        }
    }

    pub fn advance_fade(&self, fade: &mut Fade) {
        fade.level = self.step(fade.level, fade.target).clamp(0.0, 1.0);
    }
}
