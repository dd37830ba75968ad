//! # Exploder
//!
//! A drillable diagram editor. A project is a set of pages; each page holds
//! drawn objects that can link to another page, a document, a URL or a
//! spreadsheet range, so a reader can click through from an overview into
//! ever more detailed pages.
//!
//! ## Features
//! - Object creation, selection, dragging and property editing
//! - Page tree with parent/child pages and back/home navigation
//! - Edit mode for drawing and view mode for following links
//! - Per-page undo/redo, copy/cut/paste
//! - Link import/export for single objects and whole pages
//! - Templates and viewer-only publishing

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clipboard;
pub mod config;
pub mod constants;
pub mod error;
pub mod link_config;
pub mod links;
pub mod navigation;
pub mod persistence;
pub mod publish;
pub mod templates;
pub mod types;
pub mod undo;
mod ui;

// Re-export public types and functions
pub use config::{AppConfig, Cli, Commands};
pub use error::{ExploderError, Result};
pub use types::*;
pub use ui::{AppMode, ExploderApp};

/// Runs the editor window with the given configuration.
///
/// UI preferences saved by a previous session are restored from eframe's
/// storage before the configured project is opened.
///
/// # Example
///
/// ```no_run
/// use exploder::{run_app, AppConfig};
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app(AppConfig::default())
/// }
/// ```
pub fn run_app(config: AppConfig) -> std::result::Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Exploder",
        options,
        Box::new(move |cc| {
            let restored = cc
                .storage
                .and_then(|storage| storage.get_string("app_state"))
                .and_then(|json| match ExploderApp::from_json(&json) {
                    Ok(app) => Some(app),
                    Err(e) => {
                        log::warn!("Ignoring saved app state: {e}");
                        None
                    }
                });
            Ok(Box::new(ExploderApp::with_config(config, restored)))
        }),
    )
}
