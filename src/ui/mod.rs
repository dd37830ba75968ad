//! User interface components and rendering logic for Exploder.
//!
//! This module contains all the UI-related code including the main application struct,
//! canvas rendering, the page tree and properties panels, context menus, and user
//! interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main ExploderApp
//! - `file_ops` - Project, publish and link-configuration file operations
//! - `canvas` - Canvas navigation, zooming, panning, selection and link following
//! - `rendering` - Drawing the page, its objects and the grid
//! - `panels` - Page tree and properties panels

mod canvas;
mod file_ops;
mod panels;
mod rendering;
mod state;

#[cfg(test)]
mod tests;

pub use state::{AppMode, ExploderApp};

use self::state::PendingConfirmAction;
use crate::constants::{DEFAULT_OBJECT_HEIGHT, DEFAULT_OBJECT_WIDTH};
use crate::types::*;
use eframe::egui;

impl eframe::App for ExploderApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                log::error!("Failed to serialize app state: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// Lays out the toolbar, page tree, properties panel, status bar and canvas,
    /// and shows any open dialogs.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_undo_redo_keys(ctx);
        self.handle_delete_key(ctx);
        self.handle_clipboard_keys(ctx);
        self.handle_navigation_keys(ctx);
        self.handle_file_shortcuts(ctx);

        // Intercept native window close requests (titlebar X)
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.file.has_unsaved_changes && !self.file.allow_close_on_next_request {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                if !self.file.show_unsaved_dialog {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::Quit);
                }
            } else {
                self.file.allow_close_on_next_request = false;
            }
        }

        // Restore window size once per session
        if !self.applied_viewport_restore {
            if let Some((w, h)) = self.window_inner_size {
                ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(w, h)));
            }
            self.applied_viewport_restore = true;
        }
        let size = ctx.input(|i| i.screen_rect().size());
        self.window_inner_size = Some((size.x, size.y));

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        if self.show_page_tree {
            egui::SidePanel::left("page_tree_panel")
                .resizable(true)
                .default_width(200.0)
                .show(ctx, |ui| {
                    self.draw_page_tree(ui);
                });
        }

        let viewport_width = ctx.input(|i| i.screen_rect().width());
        let clamped_width = self
            .properties_panel_width
            .clamp(180.0, (viewport_width * 0.9).max(180.0));

        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(clamped_width)
            .show(ctx, |ui| {
                let current_width = ui.available_width();
                let max_allowed = (viewport_width * 0.9).max(180.0);
                self.properties_panel_width = current_width.clamp(180.0, max_allowed);
                self.draw_properties_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        self.draw_template_windows(ctx);
        self.draw_unsaved_dialog(ctx);
    }
}

impl ExploderApp {
    /// Runs `action` now, or asks first when there are unsaved changes.
    fn request_action(&mut self, action: PendingConfirmAction, ctx: &egui::Context) {
        if self.file.has_unsaved_changes {
            self.file.show_unsaved_dialog = true;
            self.file.pending_confirm_action = Some(action);
        } else {
            self.run_confirmed_action(action, ctx);
        }
    }

    fn run_confirmed_action(&mut self, action: PendingConfirmAction, ctx: &egui::Context) {
        match action {
            PendingConfirmAction::New => self.new_project(),
            PendingConfirmAction::Open => self.open_project_dialog(),
            PendingConfirmAction::OpenRecent(path) => self.open_project_file(&path),
            PendingConfirmAction::NewFromTemplate(name) => self.new_project_from_template(&name),
            PendingConfirmAction::Quit => {
                self.file.allow_close_on_next_request = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn draw_unsaved_dialog(&mut self, ctx: &egui::Context) {
        if !self.file.show_unsaved_dialog {
            return;
        }
        let title = match self.file.pending_confirm_action {
            Some(PendingConfirmAction::Quit) => "Unsaved changes - Quit?",
            Some(PendingConfirmAction::New) | Some(PendingConfirmAction::NewFromTemplate(_)) => {
                "Unsaved changes - Create New?"
            }
            Some(PendingConfirmAction::Open) | Some(PendingConfirmAction::OpenRecent(_)) => {
                "Unsaved changes - Open Project?"
            }
            None => "Unsaved changes",
        };
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("You have unsaved changes. Are you sure you want to continue?");
                ui.horizontal(|ui| {
                    let confirm_label = match self.file.pending_confirm_action {
                        Some(PendingConfirmAction::Quit) => "Discard and Quit",
                        Some(PendingConfirmAction::New)
                        | Some(PendingConfirmAction::NewFromTemplate(_)) => {
                            "Discard and Create New"
                        }
                        Some(PendingConfirmAction::Open)
                        | Some(PendingConfirmAction::OpenRecent(_)) => "Discard and Open",
                        None => "Discard",
                    };
                    if ui.button(confirm_label).clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if confirmed {
            if let Some(action) = self.file.pending_confirm_action.take() {
                self.run_confirmed_action(action, ctx);
            }
            self.file.show_unsaved_dialog = false;
        } else if cancelled {
            self.file.show_unsaved_dialog = false;
            self.file.pending_confirm_action = None;
        }
    }

    fn draw_template_windows(&mut self, ctx: &egui::Context) {
        if self.template_dialog.show_picker {
            let mut open = true;
            let mut chosen = None;
            egui::Window::new("New from Template")
                .collapsible(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    if self.template_dialog.available.is_empty() {
                        ui.label("No templates found.");
                    }
                    egui::Grid::new("template_list").striped(true).show(ui, |ui| {
                        for info in &self.template_dialog.available {
                            ui.label(&info.name).on_hover_text(&info.description);
                            ui.label(&info.category);
                            ui.label(info.created_date.format("%Y-%m-%d").to_string());
                            if ui.button("Create").clicked() {
                                chosen = Some(info.name.clone());
                            }
                            ui.end_row();
                        }
                    });
                });
            if let Some(name) = chosen {
                open = false;
                self.request_action(PendingConfirmAction::NewFromTemplate(name), ctx);
            }
            self.template_dialog.show_picker = open;
        }

        if self.template_dialog.show_save {
            let mut open = true;
            let mut save = false;
            egui::Window::new("Save as Template")
                .collapsible(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut self.template_dialog.name);
                    ui.label("Description:");
                    ui.text_edit_multiline(&mut self.template_dialog.description);
                    ui.add_enabled_ui(!self.template_dialog.name.trim().is_empty(), |ui| {
                        if ui.button("Save").clicked() {
                            save = true;
                        }
                    });
                });
            if save {
                let name = self.template_dialog.name.trim().to_string();
                let description = self.template_dialog.description.clone();
                self.save_as_template(&name, &description);
                open = false;
            }
            self.template_dialog.show_save = open;
        }
    }

    fn open_template_picker(&mut self) {
        self.template_dialog.available = self
            .templates
            .as_ref()
            .map(|store| store.list())
            .unwrap_or_default();
        self.template_dialog.show_picker = true;
    }

    /// Handles file-related keyboard shortcuts: New, Open, Save, Save As, and Quit.
    /// Uses the platform-standard Command (macOS) or Control (Windows/Linux) modifier.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (save_as, save, open, new, quit) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let shift = i.modifiers.shift;
            (
                i.key_pressed(egui::Key::S) && cmd && shift,
                i.key_pressed(egui::Key::S) && cmd && !shift,
                i.key_pressed(egui::Key::O) && cmd,
                i.key_pressed(egui::Key::N) && cmd,
                i.key_pressed(egui::Key::Q) && cmd,
            )
        });
        if save_as {
            self.save_as_project_file();
        } else if save {
            self.save_project_file();
        }
        if open {
            self.request_action(PendingConfirmAction::Open, ctx);
        }
        if new {
            self.request_action(PendingConfirmAction::New, ctx);
        }
        if quit {
            self.request_action(PendingConfirmAction::Quit, ctx);
        }
    }

    /// Handles undo/redo keyboard shortcuts.
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.mode != AppMode::Edit {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift)
        {
            self.perform_undo();
        } else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Handles delete key presses to remove the selected object.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.mode != AppMode::Edit {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.delete_selected_object();
        }
    }

    /// Handles copy, cut and paste, both as key presses and as the clipboard
    /// events the platform integration turns them into.
    fn handle_clipboard_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.mode != AppMode::Edit {
            return;
        }
        let (copy, cut, paste) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let mut copy = i.key_pressed(egui::Key::C) && cmd;
            let mut cut = i.key_pressed(egui::Key::X) && cmd;
            let mut paste = i.key_pressed(egui::Key::V) && cmd;
            for event in &i.events {
                match event {
                    egui::Event::Copy => copy = true,
                    egui::Event::Cut => cut = true,
                    egui::Event::Paste(_) => paste = true,
                    _ => {}
                }
            }
            (copy, cut, paste)
        });
        if copy {
            self.copy_selected_object();
        }
        if cut {
            self.cut_selected_object();
        }
        if paste {
            self.paste_object();
        }
    }

    /// Alt+Left goes back, Alt+Home returns to the main page.
    fn handle_navigation_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (back, home) = ctx.input_mut(|i| {
            (
                i.consume_key(egui::Modifiers::ALT, egui::Key::ArrowLeft),
                i.consume_key(egui::Modifiers::ALT, egui::Key::Home),
            )
        });
        if back {
            self.go_back();
        } else if home {
            self.go_home();
        }
    }

    /// Renders the toolbar with file operations, navigation, mode and view options.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.request_action(PendingConfirmAction::New, ui.ctx());
            }
            if ui.button("Open").clicked() {
                self.request_action(PendingConfirmAction::Open, ui.ctx());
            }
            let recent: Vec<std::path::PathBuf> = self
                .recent
                .as_ref()
                .map(|r| r.entries().to_vec())
                .unwrap_or_default();
            ui.menu_button("Recent", |ui| {
                if recent.is_empty() {
                    ui.label("No recent projects");
                }
                for path in recent {
                    if ui.button(path.display().to_string()).clicked() {
                        self.request_action(PendingConfirmAction::OpenRecent(path), ui.ctx());
                        ui.close();
                    }
                }
            });
            if ui.button("Save").clicked() {
                self.save_project_file();
            }
            if ui.button("Save As").clicked() {
                self.save_as_project_file();
            }
            if ui.button("Publish").clicked() {
                self.publish_project_dialog();
            }
            ui.menu_button("Templates", |ui| {
                if ui.button("New from Template...").clicked() {
                    self.open_template_picker();
                    ui.close();
                }
                if ui.button("Save as Template...").clicked() {
                    self.template_dialog.name = self.project.name.clone();
                    self.template_dialog.description.clear();
                    self.template_dialog.show_save = true;
                    ui.close();
                }
            });

            ui.separator();

            let editing = self.mode == AppMode::Edit;
            ui.add_enabled_ui(editing && self.undo_history.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.perform_undo();
                }
            });
            ui.add_enabled_ui(editing && self.undo_history.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.perform_redo();
                }
            });

            ui.separator();

            ui.add_enabled_ui(self.navigator.can_go_back(), |ui| {
                if ui.button("⬅ Back").clicked() {
                    self.go_back();
                }
            });
            if ui.button("🏠 Main").clicked() {
                self.go_home();
            }

            ui.separator();

            let mut mode = self.mode;
            ui.selectable_value(&mut mode, AppMode::Edit, "Edit");
            ui.selectable_value(&mut mode, AppMode::View, "View");
            if mode != self.mode {
                self.set_mode(mode);
            }

            ui.separator();

            ui.checkbox(&mut self.canvas.show_grid, "Show Grid");
            ui.checkbox(&mut self.show_page_tree, "Pages");
            ui.checkbox(&mut self.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let status = if self.file.has_unsaved_changes { "*" } else { "" };
                match &self.file.current_path {
                    Some(file_path) => ui.label(format!("{}{}", file_path.display(), status)),
                    None => ui.label(format!("{}{}", self.project.name, status)),
                };
                ui.label(format!("Zoom: {:.0}%", self.canvas.zoom_factor * 100.0));
            });
        });
    }

    /// Breadcrumb trail on the left, last status message on the right.
    fn draw_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let trail: Vec<String> = self
                .navigator
                .breadcrumbs()
                .into_iter()
                .map(|id| {
                    self.project
                        .page(id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| id.to_string())
                })
                .collect();
            ui.label(trail.join(" › "));
            ui.separator();
            ui.label(match self.mode {
                AppMode::Edit => "Editing",
                AppMode::View => "Viewing",
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(&self.status_message);
            });
        });
    }

    /// Switches between editing and link-following.
    pub fn set_mode(&mut self, mode: AppMode) {
        self.mode = mode;
        self.interaction.dragging_object = None;
        self.interaction.drag_original_position = None;
        self.context_menu.show = false;
        if mode == AppMode::View {
            self.select_object(None);
        }
    }

    /// Clears selection and any drag in progress.
    pub fn clear_selection(&mut self) {
        self.select_object(None);
        self.interaction.dragging_object = None;
        self.interaction.drag_original_position = None;
    }

    /// Selects an object on the current page, or nothing.
    pub fn select_object(&mut self, id: Option<ObjectId>) {
        if self.interaction.selected_object != id {
            self.interaction.link_page_name.clear();
            self.interaction.property_edit_recorded = false;
        }
        self.interaction.selected_object = id;
    }

    /// Resets per-page state after the current page changed.
    fn on_page_changed(&mut self) {
        self.undo_history.clear();
        self.clear_selection();
        self.context_menu.show = false;
        self.canvas.initialized = false;
    }

    /// Shows the page with `page_id`, remembering the current one.
    pub fn switch_to_page(&mut self, page_id: &str) {
        match self.navigator.navigate_to(&self.project, page_id) {
            Ok(true) => {
                self.on_page_changed();
                if let Some(page) = self.current_page() {
                    self.status_message = format!("Navigated to page: {}", page.name);
                }
            }
            Ok(false) => {}
            Err(e) => self.status_message = e.to_string(),
        }
    }

    /// Returns to the previously shown page.
    pub fn go_back(&mut self) {
        if self.navigator.back().is_some() {
            self.on_page_changed();
        }
    }

    /// Shows the main page and forgets the history.
    pub fn go_home(&mut self) {
        let before = self.current_page_id();
        self.navigator.home(&self.project);
        if self.current_page_id() != before {
            self.on_page_changed();
        }
    }

    /// Records the current page for undo before an edit.
    fn record_undo(&mut self) {
        if let Some(page) = self.navigator.current().and_then(|id| self.project.page(id)) {
            self.undo_history.record(page);
        }
        self.interaction.property_edit_recorded = false;
    }

    /// Performs an undo operation on the current page.
    pub fn perform_undo(&mut self) {
        let Some(id) = self.navigator.current() else {
            return;
        };
        if let Some(page) = self.project.page_mut(id) {
            if self.undo_history.undo(page) {
                self.file.mark_unsaved();
                self.clear_selection();
            }
        }
    }

    /// Performs a redo operation on the current page.
    pub fn perform_redo(&mut self) {
        let Some(id) = self.navigator.current() else {
            return;
        };
        if let Some(page) = self.project.page_mut(id) {
            if self.undo_history.redo(page) {
                self.file.mark_unsaved();
                self.clear_selection();
            }
        }
    }

    /// Creates an object of `kind` at the context menu position and selects it.
    pub fn create_object_at_pos(&mut self, kind: ObjectKind) -> Option<ObjectId> {
        let (x, y) = self.context_menu.world_pos;
        let (x, y) = (f64::from(x), f64::from(y));
        let mut object = match kind {
            ObjectKind::Line => CanvasObject::new(
                kind,
                Geometry::Line {
                    x1: x,
                    y1: y,
                    x2: x + DEFAULT_OBJECT_WIDTH,
                    y2: y,
                },
            ),
            _ => CanvasObject::with_box(kind, x, y, DEFAULT_OBJECT_WIDTH, DEFAULT_OBJECT_HEIGHT),
        };
        match kind {
            ObjectKind::Text => object.text = Some(TextStyle::new("Text")),
            ObjectKind::Button => object.text = Some(TextStyle::new("Button")),
            _ => {}
        }

        self.record_undo();
        let page = self.current_page_mut()?;
        object.name = format!("{} {}", kind.label(), page.objects.len() + 1);
        object.z_index = page.objects.iter().map(|o| o.z_index).max().unwrap_or(0) + 1;
        let id = page.add_object(object);
        self.select_object(Some(id.clone()));
        self.file.mark_unsaved();
        Some(id)
    }

    /// Removes the selected object from the current page.
    pub fn delete_selected_object(&mut self) {
        let Some(id) = self.interaction.selected_object.clone() else {
            return;
        };
        if self.current_page().and_then(|p| p.object(&id)).is_none() {
            return;
        }
        self.record_undo();
        if let Some(page) = self.current_page_mut() {
            page.remove_object(&id);
        }
        self.clear_selection();
        self.file.mark_unsaved();
    }

    /// Copies the selected object to the clipboard.
    pub fn copy_selected_object(&mut self) {
        let Some(object) = self.selected_object().cloned() else {
            return;
        };
        self.clipboard.copy(&object);
        self.status_message = format!("Copied '{}'", object.name);
    }

    /// Moves the selected object to the clipboard.
    pub fn cut_selected_object(&mut self) {
        let Some(id) = self.interaction.selected_object.clone() else {
            return;
        };
        if self.current_page().and_then(|p| p.object(&id)).is_none() {
            return;
        }
        self.record_undo();
        let Some(page_id) = self.current_page_id() else {
            return;
        };
        if let Some(page) = self.project.page_mut(&page_id) {
            if let Some(object) = self.clipboard.cut(page, &id) {
                self.status_message = format!("Cut '{}'", object.name);
            }
        }
        self.clear_selection();
        self.file.mark_unsaved();
    }

    /// Pastes the clipboard content onto the current page and selects it.
    pub fn paste_object(&mut self) {
        if !self.clipboard.has_content() {
            return;
        }
        self.record_undo();
        let Some(page_id) = self.current_page_id() else {
            return;
        };
        let Some(page) = self.project.page_mut(&page_id) else {
            return;
        };
        if let Some(id) = self.clipboard.paste(page) {
            self.select_object(Some(id));
            self.file.mark_unsaved();
        }
    }

    /// Changes the link of the selected object.
    pub fn set_selected_link(&mut self, link: Link) {
        let Some(id) = self.interaction.selected_object.clone() else {
            return;
        };
        if self.selected_object().is_some_and(|o| o.link == link) {
            return;
        }
        self.record_undo();
        if let Some(object) = self.current_page_mut().and_then(|p| p.object_mut(&id)) {
            object.link = link;
            self.file.mark_unsaved();
        }
    }

    /// Links the selected object to the page called `name`, creating it as a
    /// child of the current page when it does not exist yet.
    pub fn link_selected_to_page_named(&mut self, name: &str) {
        let name = name.trim();
        let (Some(page_id), Some(object_id)) = (
            self.current_page_id(),
            self.interaction.selected_object.clone(),
        ) else {
            return;
        };
        if name.is_empty() {
            self.status_message = "Enter a page name".to_string();
            return;
        }
        self.record_undo();
        match self
            .project
            .link_object_to_page_named(&page_id, &object_id, name)
        {
            Ok(_) => {
                self.status_message = format!("Linked to page: {name}");
                self.file.mark_unsaved();
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    /// Adds a child page under the current page.
    pub fn add_child_page(&mut self, name: &str) -> Option<PageId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let parent = self.current_page_id();
        let id = self.project.add_page(name, parent);
        self.file.mark_unsaved();
        self.status_message = format!("Added page: {name}");
        Some(id)
    }

    /// Removes a page, keeping the navigator on a page that still exists.
    pub fn delete_page(&mut self, page_id: &str) {
        let was_current = self.navigator.current() == Some(page_id);
        match self.project.remove_page(page_id) {
            Some(removed) => {
                // Snapshots may still hold links to the removed page
                self.undo_history.clear();
                self.navigator.forget_page(&self.project, page_id);
                if was_current {
                    self.on_page_changed();
                }
                self.file.mark_unsaved();
                self.status_message = format!("Deleted page: {}", removed.name);
            }
            None => self.status_message = "The last page cannot be deleted".to_string(),
        }
    }

    /// Moves the selected object above all others.
    pub fn bring_selected_to_front(&mut self) {
        self.reorder_selected(true);
    }

    /// Moves the selected object below all others.
    pub fn send_selected_to_back(&mut self) {
        self.reorder_selected(false);
    }

    fn reorder_selected(&mut self, to_front: bool) {
        let Some(id) = self.interaction.selected_object.clone() else {
            return;
        };
        let Some(page) = self.current_page_mut() else {
            return;
        };
        let before = page.clone();
        let changed = if to_front {
            page.bring_to_front(&id)
        } else {
            page.send_to_back(&id)
        };
        if changed {
            self.undo_history.record(&before);
            self.interaction.property_edit_recorded = false;
            self.file.mark_unsaved();
        }
    }
}
