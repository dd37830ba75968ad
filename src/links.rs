//! Resolving and following object links.
//!
//! [`resolve_link`] checks a link against the project and the file system and
//! turns it into a [`LinkAction`]. [`follow_link`] then carries the action out,
//! either by moving the [`Navigator`] or by handing a path or URL to a
//! [`Launcher`].

use crate::error::{ExploderError, Result};
use crate::navigation::Navigator;
use crate::types::{CanvasObject, DocumentKind, Link, PageId, Project};
use std::path::{Path, PathBuf};

/// What following a link should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Show another page of the project
    Navigate(PageId),
    /// Open a file with the system handler
    OpenPath(PathBuf),
    /// Open a web address with the system handler
    OpenUrl(String),
    /// The object has no link
    Nothing,
}

/// What actually happened when a link was followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The navigator moved to this page
    Navigated(PageId),
    /// The link pointed at the page already shown
    AlreadyThere(PageId),
    /// A file was handed to the system
    OpenedPath(PathBuf),
    /// A URL was handed to the system
    OpenedUrl(String),
    /// The object has no link
    NoLink,
}

impl LinkOutcome {
    /// Status bar text describing the outcome.
    pub fn status_message(&self, project: &Project) -> String {
        let page_name = |id: &str| {
            project
                .page(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match self {
            LinkOutcome::Navigated(id) => format!("Navigated to page: {}", page_name(id)),
            LinkOutcome::AlreadyThere(id) => format!("Already on page: {}", page_name(id)),
            LinkOutcome::OpenedPath(path) => format!(
                "Opened document: {}",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ),
            LinkOutcome::OpenedUrl(url) => format!("Opened URL: {url}"),
            LinkOutcome::NoLink => "Object has no link".to_string(),
        }
    }
}

/// Hands paths and URLs to something that can open them.
pub trait Launcher {
    /// Opens a file with its default application.
    fn open_path(&self, path: &Path) -> std::io::Result<()>;

    /// Opens a URL in the default browser.
    fn open_url(&self, url: &str) -> std::io::Result<()>;
}

/// Opens targets with the desktop's default handler.
///
/// Windows goes through `ShellExecuteW`, so no shell ever parses the target.
/// Elsewhere the platform opener (`open`, `xdg-open`, ...) runs to completion
/// and its exit status becomes the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open_path(&self, path: &Path) -> std::io::Result<()> {
        log::debug!("Opening {}", path.display());
        open::that(path)
    }

    fn open_url(&self, url: &str) -> std::io::Result<()> {
        log::debug!("Opening {url}");
        open::that(url)
    }
}

/// Joins relative paths onto the project directory.
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() || base_dir.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Checks that `path` has an extension accepted by `kind`.
pub fn check_document_kind(path: &Path, kind: DocumentKind) -> Result<()> {
    let accepted = kind.extensions();
    if accepted.is_empty() {
        return Ok(());
    }
    let actual = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if accepted.contains(&actual.as_str()) {
        return Ok(());
    }
    Err(ExploderError::DocumentTypeMismatch {
        expected: accepted
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(", "),
        actual: if actual.is_empty() {
            "(none)".to_string()
        } else {
            format!(".{actual}")
        },
    })
}

/// Validates `link` and decides what following it does.
///
/// Relative document paths, and spreadsheet paths marked relative, are
/// resolved against `base_dir`.
pub fn resolve_link(project: &Project, link: &Link, base_dir: &Path) -> Result<LinkAction> {
    match link {
        Link::None => Ok(LinkAction::Nothing),
        Link::Page { page_id } => {
            if page_id.is_empty() {
                return Err(ExploderError::EmptyPageId);
            }
            project
                .page(page_id)
                .map(|p| LinkAction::Navigate(p.id.clone()))
                .ok_or_else(|| ExploderError::PageNotFound(page_id.clone()))
        }
        Link::Document { path, file_type } => {
            if path.as_os_str().is_empty() {
                return Err(ExploderError::DocumentNotFound(path.clone()));
            }
            let full = resolve_path(path, base_dir);
            if !full.is_file() {
                return Err(ExploderError::DocumentNotFound(full));
            }
            check_document_kind(&full, *file_type)?;
            Ok(LinkAction::OpenPath(full))
        }
        Link::Url { url } => {
            let url = url.trim();
            if url.is_empty() {
                return Err(ExploderError::EmptyUrl);
            }
            Ok(LinkAction::OpenUrl(url.to_string()))
        }
        Link::ExcelData { range } => {
            if range.file_path.as_os_str().is_empty() {
                return Err(ExploderError::ExcelNotConfigured);
            }
            let full = if range.is_relative {
                resolve_path(&range.file_path, base_dir)
            } else {
                range.file_path.clone()
            };
            Ok(LinkAction::OpenPath(full))
        }
    }
}

/// Follows the link on `object`.
///
/// On error neither the navigator nor anything else has changed.
pub fn follow_link(
    project: &Project,
    navigator: &mut Navigator,
    launcher: &dyn Launcher,
    object: &CanvasObject,
    base_dir: &Path,
) -> Result<LinkOutcome> {
    let action = resolve_link(project, &object.link, base_dir)?;
    log::debug!("Following link on '{}': {:?}", object.name, action);
    match action {
        LinkAction::Nothing => Ok(LinkOutcome::NoLink),
        LinkAction::Navigate(page_id) => {
            if navigator.navigate_to(project, &page_id)? {
                Ok(LinkOutcome::Navigated(page_id))
            } else {
                Ok(LinkOutcome::AlreadyThere(page_id))
            }
        }
        LinkAction::OpenPath(path) => {
            launcher
                .open_path(&path)
                .map_err(|source| ExploderError::Launch {
                    target: path.display().to_string(),
                    source,
                })?;
            log::info!("Opened {}", path.display());
            Ok(LinkOutcome::OpenedPath(path))
        }
        LinkAction::OpenUrl(url) => {
            launcher
                .open_url(&url)
                .map_err(|source| ExploderError::Launch {
                    target: url.clone(),
                    source,
                })?;
            log::info!("Opened {url}");
            Ok(LinkOutcome::OpenedUrl(url))
        }
    }
}
