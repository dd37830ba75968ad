//! File operations for projects, published snapshots and link configurations.
//!
//! Anything that needs a native file dialog is queued as a pending operation
//! and carried out on the tokio runtime; results come back through the
//! channel in [`FileState`](super::state::FileState).

use super::state::{
    ExploderApp, FileOperationResult, PendingLoadOperation, PendingSaveOperation,
};
use crate::constants::{BULK_EXTENSION, LINK_EXTENSION, PROJECT_EXTENSION};
use crate::link_config::{
    default_bulk_file_name, export_page_links, import_bulk, read_bulk_configuration,
    read_link_configuration, write_bulk_configuration, write_link_configuration,
    BulkLinkConfiguration, LinkConfiguration,
};
use crate::persistence::{load_project, save_project, write_text};
use crate::publish::{publish_project, validate_for_publishing};
use crate::types::{PageSettings, Project};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

fn report(sender: &Option<Sender<FileOperationResult>>, result: FileOperationResult) {
    if let Some(tx) = sender {
        let _ = tx.send(result);
    }
}

impl ExploderApp {
    /// Handles completed async file operations and starts queued ones.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        let mut completed = Vec::new();
        if let Some(receiver) = &self.file.file_operation_receiver {
            while let Ok(result) = receiver.try_recv() {
                completed.push(result);
            }
        }
        for result in completed {
            self.apply_file_result(result);
        }

        if let Some(save_op) = self.file.pending_save_operation.take() {
            self.start_save_operation(save_op, ctx);
        }
        if let Some(load_op) = self.file.pending_load_operation.take() {
            self.start_load_operation(load_op, ctx);
        }
    }

    /// Applies the result of a finished file operation to the app.
    pub fn apply_file_result(&mut self, result: FileOperationResult) {
        match result {
            FileOperationResult::SaveCompleted(path) => {
                let snapshot = self.file.save_as_generation.take();
                self.after_save(path);
                if snapshot.is_some_and(|generation| generation != self.file.edit_generation) {
                    // Edits made while the dialog was open are not in the file
                    self.file.has_unsaved_changes = true;
                }
            }
            FileOperationResult::LoadCompleted(path, project) => {
                self.install_project(*project, Some(path));
            }
            FileOperationResult::PublishCompleted(path) => {
                self.status_message = format!("Published to {}", path.display());
            }
            FileOperationResult::LinksExported(path) => {
                self.status_message = format!("Links exported to {}", path.display());
            }
            FileOperationResult::PageLinksLoaded(page_id, bulk) => {
                self.apply_page_links(&page_id, &bulk);
            }
            FileOperationResult::ObjectLinkLoaded(object_id, configuration) => {
                self.apply_object_link(&object_id, &configuration);
            }
            FileOperationResult::OperationFailed(error) => {
                log::error!("File operation failed: {error}");
                self.status_message = error;
            }
        }
    }

    fn start_save_operation(&mut self, save_op: PendingSaveOperation, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();
        let directory = self.dialog_directory();

        match save_op {
            PendingSaveOperation::SaveAs => {
                self.project.sanitize();
                let json = match self.project.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        self.status_message = format!("Failed to serialize project: {e}");
                        return;
                    }
                };
                let file_name = format!("{}.{}", self.project.name, PROJECT_EXTENSION);
                self.file.save_as_generation = Some(self.file.edit_generation);
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("Exploder project", &[PROJECT_EXTENSION])
                        .set_directory(&directory)
                        .set_file_name(file_name)
                        .save_file()
                        .await
                    {
                        let path = handle.path().to_path_buf();
                        let result = match write_text(&path, &json) {
                            Ok(()) => FileOperationResult::SaveCompleted(path),
                            Err(e) => {
                                FileOperationResult::OperationFailed(format!("Failed to save: {e}"))
                            }
                        };
                        report(&sender, result);
                    }
                    ctx.request_repaint();
                });
            }
            PendingSaveOperation::Publish => {
                let project = self.project.clone();
                let file_name = format!("{} (Published).{}", project.name, PROJECT_EXTENSION);
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("Exploder project", &[PROJECT_EXTENSION])
                        .set_directory(&directory)
                        .set_file_name(file_name)
                        .save_file()
                        .await
                    {
                        let path = handle.path().to_path_buf();
                        let result = match publish_project(&project, &path) {
                            Ok(()) => FileOperationResult::PublishCompleted(path),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to publish: {e}"
                            )),
                        };
                        report(&sender, result);
                    }
                    ctx.request_repaint();
                });
            }
            PendingSaveOperation::ExportPageLinks => {
                let Some(page) = self.current_page() else {
                    return;
                };
                let bulk = match export_page_links(&self.project, page) {
                    Ok(bulk) => bulk,
                    Err(e) => {
                        self.status_message = e.to_string();
                        return;
                    }
                };
                let file_name = default_bulk_file_name(&self.project, page);
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("Bulk link configuration", &[BULK_EXTENSION])
                        .set_directory(&directory)
                        .set_file_name(file_name)
                        .save_file()
                        .await
                    {
                        let path = handle.path().to_path_buf();
                        let result = match write_bulk_configuration(&bulk, &path) {
                            Ok(()) => FileOperationResult::LinksExported(path),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to export links: {e}"
                            )),
                        };
                        report(&sender, result);
                    }
                    ctx.request_repaint();
                });
            }
            PendingSaveOperation::ExportObjectLink(object_id) => {
                let Some(object) = self.current_page().and_then(|p| p.object(&object_id)) else {
                    return;
                };
                if !object.link.is_some() {
                    self.status_message = format!("'{}' has no link to export", object.name);
                    return;
                }
                let configuration = LinkConfiguration::from_object(object);
                let file_name = format!("{}.{}", object.name, LINK_EXTENSION);
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("Link configuration", &[LINK_EXTENSION])
                        .set_directory(&directory)
                        .set_file_name(file_name)
                        .save_file()
                        .await
                    {
                        let path = handle.path().to_path_buf();
                        let result = match write_link_configuration(&configuration, &path) {
                            Ok(()) => FileOperationResult::LinksExported(path),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to export link: {e}"
                            )),
                        };
                        report(&sender, result);
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    fn start_load_operation(&mut self, load_op: PendingLoadOperation, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();
        let directory = self.dialog_directory();

        tokio::spawn(async move {
            let (filter_name, extension) = match &load_op {
                PendingLoadOperation::OpenProject => ("Exploder project", PROJECT_EXTENSION),
                PendingLoadOperation::ImportPageLinks(_) => {
                    ("Bulk link configuration", BULK_EXTENSION)
                }
                PendingLoadOperation::ImportObjectLink(_) => {
                    ("Link configuration", LINK_EXTENSION)
                }
            };
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter(filter_name, &[extension])
                .set_directory(&directory)
                .pick_file()
                .await
            {
                let path = handle.path().to_path_buf();
                let result = match load_op {
                    PendingLoadOperation::OpenProject => match load_project(&path) {
                        Ok(project) => FileOperationResult::LoadCompleted(path, Box::new(project)),
                        Err(e) => FileOperationResult::OperationFailed(format!(
                            "Failed to open project: {e}"
                        )),
                    },
                    PendingLoadOperation::ImportPageLinks(page_id) => {
                        match read_bulk_configuration(&path) {
                            Ok(bulk) => FileOperationResult::PageLinksLoaded(page_id, Box::new(bulk)),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to read links: {e}"
                            )),
                        }
                    }
                    PendingLoadOperation::ImportObjectLink(object_id) => {
                        match read_link_configuration(&path) {
                            Ok(configuration) => FileOperationResult::ObjectLinkLoaded(
                                object_id,
                                Box::new(configuration),
                            ),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to read link: {e}"
                            )),
                        }
                    }
                };
                report(&sender, result);
            }
            ctx.request_repaint();
        });
    }

    /// Folder file dialogs start in.
    fn dialog_directory(&self) -> PathBuf {
        if let Some(parent) = self.file.current_path.as_deref().and_then(Path::parent) {
            return parent.to_path_buf();
        }
        if !self.project.path.as_os_str().is_empty() {
            return self.project.path.clone();
        }
        std::env::current_dir().unwrap_or_default()
    }

    /// Saves to the current file, the project's default file, or asks for one.
    pub fn save_project_file(&mut self) {
        if let Some(path) = self.file.current_path.clone() {
            self.save_to(&path);
        } else if !self.project.path.as_os_str().is_empty() {
            let path = self.project.default_file_path();
            self.save_to(&path);
        } else {
            self.save_as_project_file();
        }
    }

    /// Opens a file dialog to save the project with a new name.
    pub fn save_as_project_file(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
    }

    /// Writes the project to `path` immediately.
    pub fn save_to(&mut self, path: &Path) {
        match save_project(&mut self.project, path) {
            Ok(()) => self.after_save(path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to save project: {e}");
                self.status_message = format!("Failed to save: {e}");
            }
        }
    }

    fn after_save(&mut self, path: PathBuf) {
        if self.project.path.as_os_str().is_empty() {
            if let Some(parent) = path.parent() {
                self.project.path = parent.to_path_buf();
            }
        }
        self.status_message = format!("Saved {}", path.display());
        self.remember_recent(&path);
        self.file.current_path = Some(path);
        self.file.has_unsaved_changes = false;
    }

    /// Opens a file dialog to load a project.
    pub fn open_project_dialog(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::OpenProject);
    }

    /// Loads the project at `path` immediately.
    pub fn open_project_file(&mut self, path: &Path) {
        match load_project(path) {
            Ok(project) => self.install_project(project, Some(path.to_path_buf())),
            Err(e) => {
                log::error!("Failed to open {}: {e}", path.display());
                self.status_message = format!("Failed to open project: {e}");
            }
        }
    }

    /// Replaces the open project and resets all per-project state.
    pub fn install_project(&mut self, project: Project, path: Option<PathBuf>) {
        self.project = project;
        self.image_cache.clear();
        self.navigator.open(&self.project);
        self.undo_history.clear();
        self.clear_selection();
        self.context_menu.show = false;
        self.canvas.initialized = false;
        self.file.has_unsaved_changes = false;
        self.status_message = format!("Opened project: {}", self.project.name);
        if let Some(path) = &path {
            self.remember_recent(path);
        }
        self.file.current_path = path;
    }

    fn remember_recent(&mut self, path: &Path) {
        if let Some(recent) = &mut self.recent {
            recent.add(path.to_path_buf());
            if let Err(e) = recent.save() {
                log::warn!("Could not update recent projects: {e}");
            }
        }
    }

    /// Creates a new empty project, resetting all state.
    pub fn new_project(&mut self) {
        self.install_project(Project::new("Untitled", "", PageSettings::default()), None);
        self.status_message = "New project".to_string();
    }

    /// Creates a new project from the saved template called `name`.
    pub fn new_project_from_template(&mut self, name: &str) {
        let Some(store) = &self.templates else {
            return;
        };
        match store.create_project(name) {
            Ok(project) => {
                self.install_project(project, None);
                self.file.mark_unsaved();
            }
            Err(e) => self.status_message = format!("Failed to create project: {e}"),
        }
    }

    /// Saves the open project as a template.
    pub fn save_as_template(&mut self, name: &str, description: &str) {
        let Some(store) = &self.templates else {
            return;
        };
        match store.save_as_template(&self.project, name, description) {
            Ok(info) => self.status_message = format!("Saved template '{}'", info.name),
            Err(e) => self.status_message = format!("Failed to save template: {e}"),
        }
    }

    /// Validates the project and asks where to write the published snapshot.
    pub fn publish_project_dialog(&mut self) {
        match validate_for_publishing(&self.project) {
            Ok(()) => self.file.pending_save_operation = Some(PendingSaveOperation::Publish),
            Err(e) => self.status_message = e.to_string(),
        }
    }

    /// Asks where to export the links of the current page.
    pub fn export_page_links_dialog(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::ExportPageLinks);
    }

    /// Asks where to export the link of the selected object.
    pub fn export_object_link_dialog(&mut self) {
        if let Some(id) = self.interaction.selected_object.clone() {
            self.file.pending_save_operation = Some(PendingSaveOperation::ExportObjectLink(id));
        }
    }

    /// Asks for a `.bulk` file to apply to the current page.
    pub fn import_page_links_dialog(&mut self) {
        if let Some(page_id) = self.current_page_id() {
            self.file.pending_load_operation = Some(PendingLoadOperation::ImportPageLinks(page_id));
        }
    }

    /// Asks for a `.link` file to apply to the selected object.
    pub fn import_object_link_dialog(&mut self) {
        if let Some(id) = self.interaction.selected_object.clone() {
            self.file.pending_load_operation = Some(PendingLoadOperation::ImportObjectLink(id));
        }
    }

    /// Applies a bulk link configuration to the page it was requested for.
    ///
    /// The page may have been left or deleted while the dialog was open.
    pub fn apply_page_links(&mut self, page_id: &str, bulk: &BulkLinkConfiguration) {
        let is_current = self.current_page_id().as_deref() == Some(page_id);
        let Some(page) = self.project.page_mut(page_id) else {
            self.status_message = "The page no longer exists".to_string();
            return;
        };
        let before = page.clone();
        let applied = import_bulk(page, bulk);
        self.status_message = format!(
            "Applied {applied} of {} link configurations to '{}'",
            bulk.link_configurations.len(),
            before.name
        );
        if page.objects != before.objects {
            if is_current {
                self.undo_history.record(&before);
                self.interaction.property_edit_recorded = false;
            }
            self.file.mark_unsaved();
        }
    }

    /// Applies a single link configuration to an object on the current page.
    pub fn apply_object_link(&mut self, object_id: &str, configuration: &LinkConfiguration) {
        if self.current_page().and_then(|p| p.object(object_id)).is_none() {
            self.status_message = "The object no longer exists on this page".to_string();
            return;
        }
        self.record_undo();
        if let Some(object) = self.current_page_mut().and_then(|p| p.object_mut(object_id)) {
            configuration.apply_to(object);
            self.status_message = format!("Imported link into '{}'", object.name);
            self.file.mark_unsaved();
        }
    }
}
