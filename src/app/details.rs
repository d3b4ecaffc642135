use eframe::egui::{self, RichText, Ui};

use crate::graph::{EntityId, Graph};
use crate::scene::Notice;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Section {
    entity: EntityId,
    open: bool,
}

#[derive(Debug, Default)]
pub(in crate::app) struct DetailPanel {
    sections: Vec<Section>,
    scroll_to: Option<EntityId>,
}

impl DetailPanel {
    fn position(&self, entity: EntityId) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.entity == entity)
    }

    pub(in crate::app) fn ensure(&mut self, entity: EntityId) {
        if self.position(entity).is_none() {
            self.sections.push(Section {
                entity,
                open: false,
            });
        }
    }

    /// The anchor's section is never removed.
    pub(in crate::app) fn remove(&mut self, entity: EntityId, anchor: EntityId) {
        if entity != anchor {
            self.sections.retain(|section| section.entity != entity);
        }
    }

    pub(in crate::app) fn expand(&mut self, entity: EntityId) {
        self.ensure(entity);
        for section in &mut self.sections {
            section.open = section.entity == entity;
        }
        self.scroll_to = Some(entity);
    }

    /// Applies a panel notice. Returns false for notices meant for someone else.
    pub(in crate::app) fn apply(&mut self, notice: &Notice, anchor: EntityId) -> bool {
        match notice {
            Notice::EnsureSection(entity) => self.ensure(*entity),
            Notice::RemoveSection(entity) => self.remove(*entity, anchor),
            Notice::ExpandSection(entity) => self.expand(*entity),
            Notice::FocusChanged { .. } | Notice::Status(_) => return false,
        }
        true
    }

    #[cfg(test)]
    pub(in crate::app) fn len(&self) -> usize {
        self.sections.len()
    }

    /// Draws every section. Returns the entity whose header was just opened.
    pub(in crate::app) fn show(&mut self, ui: &mut Ui, graph: &Graph) -> Option<EntityId> {
        let mut opened = None;
        let scroll_to = self.scroll_to.take();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for section in &mut self.sections {
                    let entity = graph.entity(section.entity);
                    let marker = if section.open { "▾" } else { "▸" };

                    let header = ui.selectable_label(
                        section.open,
                        RichText::new(format!("{marker} {}", entity.name)).strong(),
                    );
                    if header.clicked() {
                        section.open = !section.open;
                        if section.open {
                            opened = Some(section.entity);
                        }
                    }
                    if scroll_to == Some(section.entity) {
                        header.scroll_to_me(Some(egui::Align::TOP));
                    }

                    if section.open {
                        ui.indent(("section", section.entity.index()), |ui| {
                            if let Some(subtitle) = &entity.subtitle {
                                ui.label(RichText::new(subtitle).italics().weak());
                            }
                            match entity.description.as_deref().map(str::trim) {
                                Some(description) if !description.is_empty() => {
                                    for paragraph in description
                                        .split("\n\n")
                                        .map(str::trim)
                                        .filter(|paragraph| !paragraph.is_empty())
                                    {
                                        ui.label(paragraph);
                                        ui.add_space(4.0);
                                    }
                                }
                                _ => {
                                    ui.label(RichText::new("No description available").weak());
                                }
                            }
                            if let Some(url) = &entity.url {
                                ui.small(url.as_str());
                            }
                        });
                    }
                    ui.separator();
                }
            });

        opened
    }
}
