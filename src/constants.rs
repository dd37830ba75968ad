//! Shared application-wide constants.
//! Centralizes tweakable values used across the model, persistence and UI.

// Undo/redo
/// Maximum number of page snapshots kept on the undo stack.
pub const MAX_UNDO_HISTORY: usize = 20;

// Persistence
/// File extension of project files.
pub const PROJECT_EXTENSION: &str = "exp";
/// File extension of single link configuration exports.
pub const LINK_EXTENSION: &str = "link";
/// File extension of page-wide link configuration exports.
pub const BULK_EXTENSION: &str = "bulk";
/// Maximum number of entries kept in the recent-projects list.
pub const MAX_RECENT_PROJECTS: usize = 10;
/// Name of the recent-projects list inside the data directory.
pub const RECENT_PROJECTS_FILE: &str = "recent_projects.txt";
/// Name of the templates folder inside the data directory.
pub const TEMPLATES_DIR: &str = "Templates";
/// Directory name under the per-user data directory.
pub const DATA_DIR_NAME: &str = "exploder";
/// Format version written into link configuration files.
pub const LINK_CONFIG_VERSION: &str = "1.0";

// Objects
/// Offset (in page units) applied to pasted objects relative to their source.
pub const PASTE_OFFSET: f64 = 20.0;
/// Default width of objects created from the canvas context menu.
pub const DEFAULT_OBJECT_WIDTH: f64 = 120.0;
/// Default height of objects created from the canvas context menu.
pub const DEFAULT_OBJECT_HEIGHT: f64 = 80.0;
/// Distance (in page units) within which a click hits a line object.
pub const LINE_HIT_TOLERANCE: f64 = 6.0;

// Canvas
/// Grid cell size in page units.
pub const GRID_SIZE: f32 = 20.0;
/// Smallest zoom factor reachable with the scroll wheel.
pub const MIN_ZOOM: f32 = 0.25;
/// Largest zoom factor reachable with the scroll wheel.
pub const MAX_ZOOM: f32 = 5.0;
/// Page units (96 per inch) per millimetre of page size.
pub const PAGE_UNITS_PER_MM: f32 = 96.0 / 25.4;
