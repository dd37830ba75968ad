//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, object selection and dragging,
//! link following in view mode, and coordinate transformations between screen
//! and page space.

use super::state::{AppMode, ExploderApp};
use crate::constants::{GRID_SIZE, MAX_ZOOM, MIN_ZOOM, PAGE_UNITS_PER_MM};
use crate::links::SystemLauncher;
use crate::types::*;
use eframe::egui;

impl ExploderApp {
    /// Converts screen coordinates to page coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts page coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Snaps a position to the nearest grid point.
    pub fn snap_to_grid(&self, pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            (pos.x / GRID_SIZE).round() * GRID_SIZE,
            (pos.y / GRID_SIZE).round() * GRID_SIZE,
        )
    }

    /// Page extent in page units.
    pub fn page_extent(&self) -> egui::Vec2 {
        self.current_page()
            .map(|page| {
                egui::vec2(
                    page.settings.width as f32 * PAGE_UNITS_PER_MM,
                    page.settings.height as f32 * PAGE_UNITS_PER_MM,
                )
            })
            .unwrap_or(egui::Vec2::ZERO)
    }

    /// Centres the page in `canvas_rect`, keeping its top-left corner visible.
    pub fn center_page_in(&mut self, canvas_rect: egui::Rect) {
        let page_size = self.page_extent() * self.canvas.zoom_factor;
        let margin = egui::vec2(GRID_SIZE, GRID_SIZE);
        let centered = canvas_rect.center() - page_size / 2.0;
        self.canvas.offset = egui::vec2(
            centered.x.max(canvas_rect.min.x + margin.x),
            centered.y.max(canvas_rect.min.y + margin.y),
        );
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        // modifiers.command is Cmd on macOS and Ctrl elsewhere
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming, keeping the point under the cursor fixed.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let mouse_pos = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos());
        let Some(mouse_pos) = mouse_pos else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_pos_before_zoom = self.screen_to_world(mouse_pos);
        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor = (old_zoom + zoom_delta).clamp(MIN_ZOOM, MAX_ZOOM);

        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            let world_pos_after_zoom = self.world_to_screen(world_pos_before_zoom);
            self.canvas.offset += mouse_pos - world_pos_after_zoom;
        }
    }

    /// Finds the topmost object at the given page position.
    pub fn find_object_at_position(&self, pos: egui::Pos2) -> Option<ObjectId> {
        let page = self.current_page()?;
        page.object_at((f64::from(pos.x), f64::from(pos.y)))
            .map(|object| object.id.clone())
    }

    /// Draws the canvas for the current page and processes its input.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        if !self.canvas.initialized {
            self.center_page_in(response.rect);
            self.canvas.initialized = true;
        }

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);

        match self.mode {
            AppMode::Edit => {
                self.handle_canvas_interactions(ui, &response);
                self.handle_object_dragging(ui, &response);
            }
            AppMode::View => self.handle_view_interactions(ui, &response),
        }

        self.load_page_images(ui.ctx());
        self.render_page(&painter, response.rect);

        if self.context_menu.show {
            self.draw_context_menu(ui);
        }
    }

    /// Handles click selection and the context menu in edit mode.
    fn handle_canvas_interactions(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if response.clicked()
            && !self.interaction.is_panning
            && self.interaction.dragging_object.is_none()
        {
            if let Some(pos) = response.interact_pointer_pos() {
                let hit = self.find_object_at_position(self.screen_to_world(pos));
                self.select_object(hit);
            }
        }

        if response.secondary_clicked() {
            let pos = response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.hover_pos()));
            if let Some(pos) = pos {
                let world_pos = self.screen_to_world(pos);
                let hit = self.find_object_at_position(world_pos);
                self.select_object(hit);
                self.context_menu.show = true;
                self.context_menu.screen_pos = (pos.x, pos.y);
                self.context_menu.world_pos = (world_pos.x, world_pos.y);
                self.context_menu.just_opened = true;
            }
        }
    }

    /// Moves the pressed object with the pointer; shift snaps to the grid.
    pub fn handle_object_dragging(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let (primary_down, press_origin, snap) = ui.input(|i| {
            (
                i.pointer.primary_down(),
                i.pointer.press_origin(),
                i.modifiers.shift,
            )
        });

        if primary_down && !self.interaction.is_panning {
            if let Some(current_pos) = response.interact_pointer_pos() {
                let world_pos = self.screen_to_world(current_pos);
                if let Some(id) = self.interaction.dragging_object.clone() {
                    self.update_dragged_object_position(&id, world_pos, snap);
                } else if let Some(origin) = press_origin {
                    // Only a press that began on an object starts a drag
                    let origin_world = self.screen_to_world(origin);
                    if let Some(id) = self.find_object_at_position(origin_world) {
                        self.start_object_drag(id.clone(), origin_world);
                        if origin != current_pos {
                            self.update_dragged_object_position(&id, world_pos, snap);
                        }
                    }
                }
            }
        } else if let Some(id) = self.interaction.dragging_object.take() {
            if let Some(original) = self.interaction.drag_original_position.take() {
                self.record_object_movement(&id, original);
            }
        }
    }

    fn start_object_drag(&mut self, id: ObjectId, world_pos: egui::Pos2) {
        let Some((left, top, _, _)) = self
            .current_page()
            .and_then(|page| page.object(&id))
            .map(CanvasObject::bounds)
        else {
            return;
        };
        self.select_object(Some(id.clone()));
        self.interaction.dragging_object = Some(id);
        self.interaction.drag_original_position = Some((left, top));
        self.interaction.object_drag_offset = egui::vec2(left as f32, top as f32) - world_pos.to_vec2();
    }

    fn update_dragged_object_position(&mut self, id: &str, world_pos: egui::Pos2, snap: bool) {
        let mut target = world_pos + self.interaction.object_drag_offset;
        if snap {
            target = self.snap_to_grid(target);
        }
        if let Some(object) = self.current_page_mut().and_then(|page| page.object_mut(id)) {
            let (left, top, _, _) = object.bounds();
            object.translate(f64::from(target.x) - left, f64::from(target.y) - top);
        }
    }

    /// Records one undo step for a finished drag if the object moved.
    fn record_object_movement(&mut self, id: &str, original: (f64, f64)) {
        let Some(page) = self.current_page() else {
            return;
        };
        let Some((left, top, _, _)) = page.object(id).map(CanvasObject::bounds) else {
            return;
        };
        if (left, top) == original {
            return;
        }

        let mut before = page.clone();
        if let Some(object) = before.object_mut(id) {
            object.translate(original.0 - left, original.1 - top);
        }
        self.undo_history.record(&before);
        self.interaction.property_edit_recorded = false;
        self.file.mark_unsaved();
    }

    /// Follows links on click in view mode.
    fn handle_view_interactions(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let hovered_link = response
            .hover_pos()
            .and_then(|pos| self.find_object_at_position(self.screen_to_world(pos)))
            .and_then(|id| self.current_page()?.object(&id).map(|o| o.link.is_some()))
            .unwrap_or(false);
        if hovered_link {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if response.clicked() && !self.interaction.is_panning {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(id) = self.find_object_at_position(self.screen_to_world(pos)) {
                    self.follow_object_link(&id, &SystemLauncher);
                }
            }
        }
    }

    /// Draws the right-click menu for adding and editing objects.
    fn draw_context_menu(&mut self, ui: &mut egui::Ui) {
        let screen_pos = egui::pos2(self.context_menu.screen_pos.0, self.context_menu.screen_pos.1);
        let has_selection = self.interaction.selected_object.is_some();
        let can_paste = self.clipboard.has_content();

        let area_response = egui::Area::new(egui::Id::new("context_menu"))
            .fixed_pos(screen_pos)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label("Add Object:");
                        ui.separator();
                        for kind in ObjectKind::ALL {
                            if ui.button(kind.label()).clicked() {
                                self.create_object_at_pos(kind);
                                self.context_menu.show = false;
                            }
                        }

                        if has_selection {
                            ui.separator();
                            if ui.button("Copy").clicked() {
                                self.copy_selected_object();
                                self.context_menu.show = false;
                            }
                            if ui.button("Cut").clicked() {
                                self.cut_selected_object();
                                self.context_menu.show = false;
                            }
                            if ui.button("Bring to Front").clicked() {
                                self.bring_selected_to_front();
                                self.context_menu.show = false;
                            }
                            if ui.button("Send to Back").clicked() {
                                self.send_selected_to_back();
                                self.context_menu.show = false;
                            }
                            if ui.button("Delete").clicked() {
                                self.delete_selected_object();
                                self.context_menu.show = false;
                            }
                        }

                        if can_paste {
                            ui.separator();
                            if ui.button("Paste").clicked() {
                                self.paste_object();
                                self.context_menu.show = false;
                            }
                        }

                        ui.separator();
                        if ui.button("Cancel").clicked() {
                            self.context_menu.show = false;
                        }
                    });
                })
            });

        if !self.context_menu.just_opened && ui.input(|i| i.pointer.primary_clicked()) {
            if let Some(click_pos) = ui.input(|i| i.pointer.interact_pos()) {
                if !area_response.response.rect.contains(click_pos) {
                    self.context_menu.show = false;
                }
            }
        }

        self.context_menu.just_opened = false;
    }
}
