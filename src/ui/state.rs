//! Application state management structures.
//!
//! This module contains all the state structures that track the application's
//! current UI state, including canvas navigation, user interactions, context menus,
//! dialogs and file operations.

use super::rendering::ImageCache;
use crate::clipboard::Clipboard;
use crate::config::AppConfig;
use crate::link_config::{BulkLinkConfiguration, LinkConfiguration};
use crate::navigation::Navigator;
use crate::persistence::RecentProjects;
use crate::templates::{TemplateInfo, TemplateStore};
use crate::types::*;
use crate::undo::UndoHistory;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Whether the canvas edits objects or follows their links.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Select, drag, create and delete objects
    #[default]
    Edit,
    /// Clicking an object follows its link
    View,
}

/// State related to canvas navigation and display.
///
/// Tracks the current pan offset, zoom level, and display options for the canvas.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current canvas pan offset for navigation (in screen space)
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom)
    pub zoom_factor: f32,
    /// Whether the grid should be displayed on the canvas
    pub show_grid: bool,
    /// Whether the offset has been centred on the page yet
    #[serde(skip)]
    pub initialized: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
            initialized: false,
        }
    }
}

/// State related to user interactions with objects and the canvas.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InteractionState {
    /// Currently selected object on the current page
    #[serde(skip)]
    pub selected_object: Option<ObjectId>,
    /// Object currently being dragged by the user
    #[serde(skip)]
    pub dragging_object: Option<ObjectId>,
    /// Object bounds before the drag started (for undo)
    #[serde(skip)]
    pub drag_original_position: Option<(f64, f64)>,
    /// Offset from the mouse to the object's top-left corner while dragging
    #[serde(skip)]
    pub object_drag_offset: egui::Vec2,
    /// Whether the user is currently panning the canvas
    #[serde(skip)]
    pub is_panning: bool,
    /// Last mouse position during panning operation
    #[serde(skip)]
    pub last_pan_pos: Option<egui::Pos2>,
    /// Name typed for a new page in the page tree panel
    #[serde(skip)]
    pub new_page_name: String,
    /// Page name typed in the "link to page" field of the properties panel
    #[serde(skip)]
    pub link_page_name: String,
    /// Whether property edits on the selected object already have an undo step
    #[serde(skip)]
    pub property_edit_recorded: bool,
}

/// State related to context menu display and interaction.
///
/// Manages the right-click context menu for creating new objects.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContextMenuState {
    /// Whether the context menu is currently visible
    #[serde(skip)]
    pub show: bool,
    /// Screen position where the context menu should appear
    #[serde(skip)]
    pub screen_pos: (f32, f32),
    /// World position where objects should be created from context menu
    #[serde(skip)]
    pub world_pos: (f32, f32),
    /// Flag to prevent context menu from closing immediately after opening
    #[serde(skip)]
    pub just_opened: bool,
}

/// State of the template windows.
#[derive(Default)]
pub struct TemplateDialogState {
    /// Whether the "New from Template" window is open
    pub show_picker: bool,
    /// Whether the "Save as Template" window is open
    pub show_save: bool,
    /// Templates listed in the picker
    pub available: Vec<TemplateInfo>,
    /// Name typed in the save window
    pub name: String,
    /// Description typed in the save window
    pub description: String,
}

/// State related to file operations and persistence.
///
/// Manages file paths, unsaved changes tracking, and async file operations.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct FileState {
    /// Project file the editor saves to
    #[serde(skip)]
    pub current_path: Option<PathBuf>,
    /// Flag indicating if the project has unsaved changes
    #[serde(skip)]
    pub has_unsaved_changes: bool,
    /// Dialog-backed writes waiting to be started
    #[serde(skip)]
    pub pending_save_operation: Option<PendingSaveOperation>,
    /// Dialog-backed reads waiting to be started
    #[serde(skip)]
    pub pending_load_operation: Option<PendingLoadOperation>,
    /// Channel for receiving file operation results from async contexts
    #[serde(skip)]
    pub file_operation_sender: Option<Sender<FileOperationResult>>,
    #[serde(skip)]
    pub file_operation_receiver: Option<Receiver<FileOperationResult>>,
    /// Whether to show an unsaved-changes confirmation dialog
    #[serde(skip)]
    pub show_unsaved_dialog: bool,
    /// The action the user attempted that requires confirmation
    #[serde(skip)]
    pub pending_confirm_action: Option<PendingConfirmAction>,
    /// One-shot flag to allow the next close request to proceed after user confirmation
    #[serde(skip)]
    pub allow_close_on_next_request: bool,
    /// Bumped on every edit
    #[serde(skip)]
    pub edit_generation: u64,
    /// Edit generation captured when a Save As snapshot was taken
    #[serde(skip)]
    pub save_as_generation: Option<u64>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            has_unsaved_changes: false,
            pending_save_operation: None,
            pending_load_operation: None,
            file_operation_sender: Some(sender),
            file_operation_receiver: Some(receiver),
            show_unsaved_dialog: false,
            pending_confirm_action: None,
            allow_close_on_next_request: false,
            edit_generation: 0,
            save_as_generation: None,
        }
    }
}

impl FileState {
    /// Flags the project as edited since the last save.
    pub fn mark_unsaved(&mut self) {
        self.has_unsaved_changes = true;
        self.edit_generation += 1;
    }
}

/// A write that needs a file picker first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSaveOperation {
    /// Save the project under a new file name
    SaveAs,
    /// Write the published snapshot
    Publish,
    /// Export every link on the current page to a `.bulk` file
    ExportPageLinks,
    /// Export one object's link to a `.link` file
    ExportObjectLink(ObjectId),
}

/// A read that needs a file picker first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingLoadOperation {
    /// Open a project file
    OpenProject,
    /// Apply a `.bulk` file to the given page
    ImportPageLinks(PageId),
    /// Apply a `.link` file to one object
    ImportObjectLink(ObjectId),
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// The project was written to the given path
    SaveCompleted(PathBuf),
    /// A project was read from the given path
    LoadCompleted(PathBuf, Box<Project>),
    /// The published snapshot was written to the given path
    PublishCompleted(PathBuf),
    /// Link configuration was written to the given path
    LinksExported(PathBuf),
    /// A `.bulk` file was read for the given page
    PageLinksLoaded(PageId, Box<BulkLinkConfiguration>),
    /// A `.link` file was read for the given object
    ObjectLinkLoaded(ObjectId, Box<LinkConfiguration>),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// Pending confirmation actions that may require user approval due to unsaved changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// User is attempting to create a new project
    New,
    /// User is attempting to open a project file
    Open,
    /// User is attempting to open a recently used project
    OpenRecent(PathBuf),
    /// User is attempting to create a project from a template
    NewFromTemplate(String),
    /// User is attempting to quit the application
    Quit,
}

/// The main application structure containing UI state and the open project.
///
/// This struct implements the `eframe::App` trait and handles all user interface
/// rendering and interaction logic.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ExploderApp {
    /// The project being edited or viewed
    #[serde(skip)]
    pub project: Project,
    /// Current page and back history
    #[serde(skip)]
    pub navigator: Navigator,
    /// Undo/redo history for the current page
    #[serde(skip)]
    pub undo_history: UndoHistory,
    /// Object held between copy/cut and paste
    #[serde(skip)]
    pub clipboard: Clipboard,
    /// Editing or link-following mode
    pub mode: AppMode,
    /// Canvas navigation and display state
    pub canvas: CanvasState,
    /// User interaction state
    pub interaction: InteractionState,
    /// Context menu state
    pub context_menu: ContextMenuState,
    /// File operations state
    pub file: FileState,
    /// Template windows
    #[serde(skip)]
    pub template_dialog: TemplateDialogState,
    /// Recently opened project files
    #[serde(skip)]
    pub recent: Option<RecentProjects>,
    /// Saved templates
    #[serde(skip)]
    pub templates: Option<TemplateStore>,
    /// Startup configuration
    #[serde(skip)]
    pub config: AppConfig,
    /// Textures for image objects
    #[serde(skip)]
    pub image_cache: ImageCache,
    /// Last message shown in the status bar
    #[serde(skip)]
    pub status_message: String,
    /// Whether the page tree panel is shown
    pub show_page_tree: bool,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the properties panel across sessions
    pub properties_panel_width: f32,
    /// Persisted last known window inner size in logical points
    pub window_inner_size: Option<(f32, f32)>,
    /// Whether we've already applied the stored window geometry this session
    #[serde(skip)]
    pub applied_viewport_restore: bool,
}

impl Default for ExploderApp {
    fn default() -> Self {
        let project = Project::new("Untitled", "", PageSettings::default());
        let navigator = Navigator::new(&project);
        Self {
            project,
            navigator,
            undo_history: UndoHistory::new(),
            clipboard: Clipboard::new(),
            mode: AppMode::Edit,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            context_menu: ContextMenuState::default(),
            file: FileState::default(),
            template_dialog: TemplateDialogState::default(),
            recent: None,
            templates: None,
            config: AppConfig::default(),
            image_cache: ImageCache::default(),
            status_message: String::new(),
            show_page_tree: true,
            dark_mode: true,
            properties_panel_width: 300.0,
            window_inner_size: None,
            applied_viewport_restore: false,
        }
    }
}

impl ExploderApp {
    /// Serializes the application state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes application state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resets any non-UI related fields, so that when state is
    /// persisted only settings related to the UI are retained.
    pub fn reset_non_ui_fields(&mut self) {
        *self = Self {
            mode: self.mode,
            show_page_tree: self.show_page_tree,
            properties_panel_width: self.properties_panel_width,
            window_inner_size: self.window_inner_size,
            applied_viewport_restore: self.applied_viewport_restore,
            dark_mode: self.dark_mode,
            canvas: CanvasState {
                zoom_factor: self.canvas.zoom_factor,
                show_grid: self.canvas.show_grid,
                ..CanvasState::default()
            },
            ..Default::default()
        };
    }

    /// Builds the app for `config`, keeping UI preferences from `restored`.
    ///
    /// Loads the recent-projects list, installs the built-in templates and
    /// opens the configured project, if any.
    pub fn with_config(config: AppConfig, restored: Option<ExploderApp>) -> Self {
        let mut app = restored.unwrap_or_default();
        app.reset_non_ui_fields();
        app.recent = Some(RecentProjects::load(config.recent_projects_file()));
        let store = TemplateStore::new(config.templates_dir());
        if let Err(e) = store.install_defaults() {
            log::warn!("Could not install built-in templates: {e}");
        }
        app.templates = Some(store);
        if let Some(path) = config.initial_project.clone() {
            app.open_project_file(&path);
        }
        app.config = config;
        app
    }

    /// Id of the page shown on the canvas.
    pub fn current_page_id(&self) -> Option<PageId> {
        self.navigator.current().map(str::to_string)
    }

    /// The page shown on the canvas.
    pub fn current_page(&self) -> Option<&Page> {
        self.navigator.current().and_then(|id| self.project.page(id))
    }

    /// The page shown on the canvas, mutably.
    pub fn current_page_mut(&mut self) -> Option<&mut Page> {
        let id = self.current_page_id()?;
        self.project.page_mut(&id)
    }

    /// The selected object on the current page.
    pub fn selected_object(&self) -> Option<&CanvasObject> {
        let id = self.interaction.selected_object.as_deref()?;
        self.current_page()?.object(id)
    }
}
