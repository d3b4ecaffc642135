use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Ui, vec2};

use crate::render::{Palette, PainterSurface, draw_scene};
use crate::scene::{Scene, SceneOptions, Viewport};

use super::ViewModel;

/// Tick length assumed for the very first frame.
const FIRST_FRAME: Duration = Duration::from_millis(16);

impl ViewModel {
    fn ensure_scene(&mut self, width: f32, height: f32) -> &mut Scene {
        let launch = &self.launch;
        let data = &self.data;
        self.scene.get_or_insert_with(|| {
            let viewport = Viewport::new(width, height, &launch.config);
            let mut scene = Scene::new(
                data,
                launch.config.clone(),
                viewport,
                SceneOptions {
                    seed: launch.seed,
                    deep_link: launch.deep_link.clone(),
                    show_all: launch.show_all,
                },
            );
            scene.begin_staged_transition();
            scene
        })
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let now_secs = ui.input(|input| input.time);
        let elapsed = self
            .last_frame_secs
            .map(|last| Duration::from_secs_f64((now_secs - last).max(0.0)))
            .unwrap_or(FIRST_FRAME);
        self.last_frame_secs = Some(now_secs);
        let debug = self.launch.debug;

        let scene = self.ensure_scene(rect.width(), rect.height());
        scene.resize(rect.width(), rect.height());

        let (hover, pressed, released, delta) = ui.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.delta(),
            )
        });

        match hover {
            Some(pos) if rect.contains(pos) || response.dragged() => {
                let local = pos - rect.min;
                if pressed && response.hovered() {
                    scene.pointer_down(local);
                }
                scene.pointer_move(local);
            }
            _ => scene.pointer_leave(),
        }
        if released {
            scene.pointer_up();
        }
        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            scene.drag_move(delta);
        }

        let cursor = if scene.dragged().is_some() && response.dragged() {
            Some(egui::CursorIcon::Grabbing)
        } else if scene.hovered().is_some() {
            Some(egui::CursorIcon::PointingHand)
        } else {
            None
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        scene.tick(elapsed);

        let painter = ui.painter_at(rect);
        let mut surface = PainterSurface::new(&painter, rect);
        draw_scene(scene, &mut surface, &Palette::default());

        if debug {
            let pinned = scene
                .pinned()
                .map_or("-", |id| scene.graph().entity(id).id.as_str());
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "state: {}\nqueue: {}\npinned: {}\nt: {:.1}s",
                    scene.disclosure_state(),
                    scene.queue_len(),
                    pinned,
                    scene.now().as_secs_f32()
                ),
                FontId::monospace(12.0),
                Color32::from_rgb(106, 198, 255),
            );
        }

        let anchor = scene.graph().anchor();
        let notices = scene.drain_notices();
        self.apply_notices(notices, anchor);

        ui.ctx().request_repaint();
    }
}
