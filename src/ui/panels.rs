//! Page tree and properties panels.

use super::state::{AppMode, ExploderApp};
use crate::links::{follow_link, SystemLauncher};
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;

const PAGE_SIZES: [PageSize; 6] = [
    PageSize::A4,
    PageSize::A3,
    PageSize::A5,
    PageSize::Letter,
    PageSize::Legal,
    PageSize::Custom,
];

const DOCUMENT_KINDS: [DocumentKind; 5] = [
    DocumentKind::Unspecified,
    DocumentKind::Video,
    DocumentKind::Pdf,
    DocumentKind::Excel,
    DocumentKind::Word,
];

/// Deferred actions from the properties panel, applied after drawing.
enum PanelAction {
    LinkToPageNamed(String),
    TestLink,
    ExportLink,
    ImportLink,
    BringToFront,
    SendToBack,
    Copy,
    Delete,
}

/// A fresh link of each kind, in menu order.
fn link_choices() -> [Link; 5] {
    [
        Link::None,
        Link::Page {
            page_id: PageId::new(),
        },
        Link::Document {
            path: PathBuf::new(),
            file_type: DocumentKind::Unspecified,
        },
        Link::Url { url: String::new() },
        Link::ExcelData {
            range: ExcelRange::default(),
        },
    ]
}

fn path_edit(ui: &mut egui::Ui, path: &mut PathBuf) {
    let mut text = path.display().to_string();
    if ui.text_edit_singleline(&mut text).changed() {
        *path = PathBuf::from(text);
    }
}

impl ExploderApp {
    /// Renders the page tree with navigation and page management.
    pub(super) fn draw_page_tree(&mut self, ui: &mut egui::Ui) {
        ui.heading("Pages");
        ui.separator();

        let current = self.current_page_id();
        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("page_tree_scroll")
            .auto_shrink([false; 2])
            .max_height((ui.available_height() - 120.0).max(80.0))
            .show(ui, |ui| {
                for (depth, id) in self.project.page_tree() {
                    let Some(page) = self.project.page(&id) else {
                        continue;
                    };
                    ui.horizontal(|ui| {
                        ui.add_space(depth as f32 * 12.0);
                        let is_current = current.as_deref() == Some(id.as_str());
                        let label = format!("{} ({})", page.name, page.objects.len());
                        if ui.selectable_label(is_current, label).clicked() {
                            clicked = Some(id.clone());
                        }
                    });
                }
            });
        if let Some(id) = clicked {
            self.switch_to_page(&id);
        }

        if self.mode != AppMode::Edit {
            return;
        }
        ui.separator();
        ui.label("New page under this one:");
        ui.text_edit_singleline(&mut self.interaction.new_page_name);
        ui.horizontal(|ui| {
            if ui.button("Add Page").clicked() {
                let name = std::mem::take(&mut self.interaction.new_page_name);
                if let Some(id) = self.add_child_page(&name) {
                    self.switch_to_page(&id);
                }
            }
            let can_delete = self.project.pages.len() > 1;
            ui.add_enabled_ui(can_delete, |ui| {
                if ui.button("Delete Page").clicked() {
                    if let Some(id) = self.current_page_id() {
                        self.delete_page(&id);
                    }
                }
            });
        });
    }

    /// Renders the properties panel for the selected object, or the page and
    /// project when nothing is selected.
    pub(super) fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.heading("Properties");
                ui.separator();

                match self.selected_object().cloned() {
                    Some(object) if self.mode == AppMode::Edit => {
                        self.draw_object_properties(ui, object);
                    }
                    _ => self.draw_page_properties(ui),
                }
            });
    }

    fn draw_object_properties(&mut self, ui: &mut egui::Ui, object: CanvasObject) {
        let mut edited = object.clone();
        let mut action = None;

        ui.label(format!("Type: {}", object.kind.label()));
        ui.label("Name:");
        ui.text_edit_singleline(&mut edited.name);

        ui.separator();
        ui.label("Position");
        match &mut edited.geometry {
            Geometry::Box {
                left,
                top,
                width,
                height,
            } => {
                egui::Grid::new("box_geometry").num_columns(2).show(ui, |ui| {
                    ui.label("Left");
                    ui.add(egui::DragValue::new(left).speed(1.0));
                    ui.end_row();
                    ui.label("Top");
                    ui.add(egui::DragValue::new(top).speed(1.0));
                    ui.end_row();
                    ui.label("Width");
                    ui.add(egui::DragValue::new(width).speed(1.0).range(1.0..=10_000.0));
                    ui.end_row();
                    ui.label("Height");
                    ui.add(egui::DragValue::new(height).speed(1.0).range(1.0..=10_000.0));
                    ui.end_row();
                });
            }
            Geometry::Line { x1, y1, x2, y2 } => {
                egui::Grid::new("line_geometry").num_columns(4).show(ui, |ui| {
                    ui.label("From");
                    ui.add(egui::DragValue::new(x1).speed(1.0));
                    ui.add(egui::DragValue::new(y1).speed(1.0));
                    ui.end_row();
                    ui.label("To");
                    ui.add(egui::DragValue::new(x2).speed(1.0));
                    ui.add(egui::DragValue::new(y2).speed(1.0));
                    ui.end_row();
                });
            }
        }

        ui.separator();
        ui.label("Style");
        egui::Grid::new("object_style").num_columns(2).show(ui, |ui| {
            ui.label("Fill");
            ui.text_edit_singleline(&mut edited.style.fill_color);
            ui.end_row();
            ui.label("Stroke");
            ui.text_edit_singleline(&mut edited.style.stroke_color);
            ui.end_row();
            ui.label("Thickness");
            ui.add(
                egui::DragValue::new(&mut edited.style.stroke_thickness)
                    .speed(0.1)
                    .range(0.0..=20.0),
            );
            ui.end_row();
            ui.label("Opacity");
            ui.add(egui::Slider::new(&mut edited.style.opacity, 0.0..=1.0));
            ui.end_row();
        });

        ui.separator();
        if edited.text.is_some() {
            ui.horizontal(|ui| {
                ui.label("Text");
                if ui.small_button("Remove").clicked() {
                    edited.text = None;
                }
            });
        } else if ui.button("Add Text").clicked() {
            edited.text = Some(TextStyle::new(edited.name.clone()));
        }
        if let Some(text) = &mut edited.text {
            ui.text_edit_multiline(&mut text.text);
            ui.horizontal(|ui| {
                ui.add(
                    egui::DragValue::new(&mut text.font_size)
                        .speed(0.5)
                        .range(4.0..=200.0)
                        .suffix(" pt"),
                );
                let mut bold = text.font_weight == FontWeight::Bold;
                if ui.checkbox(&mut bold, "Bold").changed() {
                    text.font_weight = if bold {
                        FontWeight::Bold
                    } else {
                        FontWeight::Normal
                    };
                }
            });
            ui.horizontal(|ui| {
                ui.label("Colour");
                ui.text_edit_singleline(&mut text.text_color);
            });
        }

        if object.kind == ObjectKind::Image {
            ui.separator();
            ui.label("Image file:");
            let mut image = edited.image.clone().unwrap_or_default();
            path_edit(ui, &mut image);
            edited.image = (!image.as_os_str().is_empty()).then_some(image);
        }

        ui.separator();
        ui.label("Link");
        self.draw_link_editor(ui, &mut edited.link, &mut action);

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button("Bring to Front").clicked() {
                action = Some(PanelAction::BringToFront);
            }
            if ui.button("Send to Back").clicked() {
                action = Some(PanelAction::SendToBack);
            }
            if ui.button("Copy").clicked() {
                action = Some(PanelAction::Copy);
            }
            if ui.button("Delete").clicked() {
                action = Some(PanelAction::Delete);
            }
        });

        if edited != object {
            self.apply_property_edit(edited);
        }
        if let Some(action) = action {
            self.run_panel_action(action);
        }
    }

    fn draw_link_editor(
        &mut self,
        ui: &mut egui::Ui,
        link: &mut Link,
        action: &mut Option<PanelAction>,
    ) {
        egui::ComboBox::from_id_salt("link_kind")
            .selected_text(link.kind_label())
            .show_ui(ui, |ui| {
                for choice in link_choices() {
                    let is_current = choice.kind_label() == link.kind_label();
                    if ui.selectable_label(is_current, choice.kind_label()).clicked() && !is_current
                    {
                        *link = choice;
                    }
                }
            });

        match link {
            Link::None => {}
            Link::Page { page_id } => {
                let target_name = self
                    .project
                    .page(page_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "(choose a page)".to_string());
                egui::ComboBox::from_id_salt("link_page")
                    .selected_text(target_name)
                    .show_ui(ui, |ui| {
                        for page in &self.project.pages {
                            ui.selectable_value(page_id, page.id.clone(), &page.name);
                        }
                    });
            }
            Link::Document { path, file_type } => {
                ui.label("Document path:");
                path_edit(ui, path);
                egui::ComboBox::from_id_salt("link_document_kind")
                    .selected_text(format!("{file_type:?}"))
                    .show_ui(ui, |ui| {
                        for kind in DOCUMENT_KINDS {
                            ui.selectable_value(file_type, kind, format!("{kind:?}"));
                        }
                    });
            }
            Link::Url { url } => {
                ui.label("URL:");
                ui.text_edit_singleline(url);
            }
            Link::ExcelData { range } => {
                egui::Grid::new("excel_range").num_columns(2).show(ui, |ui| {
                    ui.label("Workbook");
                    path_edit(ui, &mut range.file_path);
                    ui.end_row();
                    ui.label("Sheet");
                    ui.text_edit_singleline(&mut range.sheet_name);
                    ui.end_row();
                    ui.label("Range");
                    ui.text_edit_singleline(&mut range.cell_range);
                    ui.end_row();
                });
                ui.checkbox(&mut range.is_relative, "Relative to project folder");
            }
        }

        ui.label("Link to page named:");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.interaction.link_page_name);
            if ui.button("Link").clicked() {
                *action = Some(PanelAction::LinkToPageNamed(
                    self.interaction.link_page_name.clone(),
                ));
            }
        });

        ui.horizontal_wrapped(|ui| {
            ui.add_enabled_ui(link.is_some(), |ui| {
                if ui.button("Test Link").clicked() {
                    *action = Some(PanelAction::TestLink);
                }
                if ui.button("Export Link...").clicked() {
                    *action = Some(PanelAction::ExportLink);
                }
            });
            if ui.button("Import Link...").clicked() {
                *action = Some(PanelAction::ImportLink);
            }
        });
    }

    /// Writes panel edits back to the selected object; the first edit after
    /// selecting an object records an undo step.
    pub(super) fn apply_property_edit(&mut self, edited: CanvasObject) {
        if !self.interaction.property_edit_recorded {
            self.record_undo();
            self.interaction.property_edit_recorded = true;
        }
        if let Some(object) = self
            .current_page_mut()
            .and_then(|p| p.object_mut(&edited.id))
        {
            *object = edited;
            self.file.mark_unsaved();
        }
    }

    fn run_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::LinkToPageNamed(name) => self.link_selected_to_page_named(&name),
            PanelAction::TestLink => {
                if let Some(id) = self.interaction.selected_object.clone() {
                    self.follow_object_link(&id, &SystemLauncher);
                }
            }
            PanelAction::ExportLink => self.export_object_link_dialog(),
            PanelAction::ImportLink => self.import_object_link_dialog(),
            PanelAction::BringToFront => self.bring_selected_to_front(),
            PanelAction::SendToBack => self.send_selected_to_back(),
            PanelAction::Copy => self.copy_selected_object(),
            PanelAction::Delete => self.delete_selected_object(),
        }
    }

    fn draw_page_properties(&mut self, ui: &mut egui::Ui) {
        ui.label("Project name:");
        if ui.text_edit_singleline(&mut self.project.name).changed() {
            self.file.mark_unsaved();
        }

        let Some(page_id) = self.current_page_id() else {
            ui.label("No page selected");
            return;
        };
        let is_edit = self.mode == AppMode::Edit;
        let Some(page) = self.project.page_mut(&page_id) else {
            return;
        };

        ui.separator();
        ui.label(format!("Objects: {}", page.objects.len()));
        let mut changed = false;
        ui.add_enabled_ui(is_edit, |ui| {
            ui.label("Page name:");
            changed |= ui.text_edit_singleline(&mut page.name).changed();

            let settings = &mut page.settings;
            egui::Grid::new("page_settings").num_columns(2).show(ui, |ui| {
                ui.label("Size");
                let mut size = settings.page_size;
                egui::ComboBox::from_id_salt("page_size")
                    .selected_text(format!("{size:?}"))
                    .show_ui(ui, |ui| {
                        for option in PAGE_SIZES {
                            ui.selectable_value(&mut size, option, format!("{option:?}"));
                        }
                    });
                ui.end_row();

                ui.label("Orientation");
                let mut orientation = settings.orientation;
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut orientation, Orientation::Portrait, "Portrait");
                    ui.selectable_value(&mut orientation, Orientation::Landscape, "Landscape");
                });
                ui.end_row();

                if size != settings.page_size || orientation != settings.orientation {
                    if size == PageSize::Custom {
                        if orientation != settings.orientation {
                            std::mem::swap(&mut settings.width, &mut settings.height);
                        }
                    } else {
                        let sized = PageSettings::for_size(size, orientation);
                        settings.width = sized.width;
                        settings.height = sized.height;
                    }
                    settings.page_size = size;
                    settings.orientation = orientation;
                    changed = true;
                }

                ui.label("Width (mm)");
                ui.add_enabled_ui(settings.page_size == PageSize::Custom, |ui| {
                    changed |= ui
                        .add(egui::DragValue::new(&mut settings.width).range(10.0..=5000.0))
                        .changed();
                });
                ui.end_row();
                ui.label("Height (mm)");
                ui.add_enabled_ui(settings.page_size == PageSize::Custom, |ui| {
                    changed |= ui
                        .add(egui::DragValue::new(&mut settings.height).range(10.0..=5000.0))
                        .changed();
                });
                ui.end_row();
                ui.label("Margin (mm)");
                changed |= ui
                    .add(egui::DragValue::new(&mut settings.margin_size).range(0.0..=200.0))
                    .changed();
                ui.end_row();
                ui.label("Background");
                changed |= ui
                    .text_edit_singleline(&mut settings.background_color)
                    .changed();
                ui.end_row();
            });
            changed |= ui.checkbox(&mut page.settings.show_grid, "Page grid").changed();
        });
        if changed {
            self.file.mark_unsaved();
        }

        ui.separator();
        ui.label("Page links");
        ui.horizontal_wrapped(|ui| {
            if ui.button("Export Page Links...").clicked() {
                self.export_page_links_dialog();
            }
            ui.add_enabled_ui(is_edit, |ui| {
                if ui.button("Import Page Links...").clicked() {
                    self.import_page_links_dialog();
                }
            });
        });

        let issues = self.project.validate();
        if !issues.is_empty() {
            ui.separator();
            ui.colored_label(
                egui::Color32::from_rgb(230, 160, 40),
                format!("{} problem(s) in this project", issues.len()),
            );
            for issue in issues {
                ui.label(format!("• {issue:?}"));
            }
        }
    }

    /// Follows the link on an object of the current page and reports the outcome.
    pub fn follow_object_link(&mut self, object_id: &str, launcher: &dyn crate::links::Launcher) {
        let Some(object) = self.current_page().and_then(|p| p.object(object_id)).cloned() else {
            return;
        };
        let before = self.current_page_id();
        let result = follow_link(
            &self.project,
            &mut self.navigator,
            launcher,
            &object,
            &self.project.path,
        );
        match result {
            Ok(outcome) => {
                if self.current_page_id() != before {
                    self.on_page_changed();
                }
                self.status_message = outcome.status_message(&self.project);
            }
            Err(e) => {
                log::warn!("Could not follow link on '{}': {e}", object.name);
                self.status_message = e.to_string();
            }
        }
    }
}
