//! Error types shared by the project model, link handling and persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Exploder operations.
#[derive(Error, Debug)]
pub enum ExploderError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation was working on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A project, template or link file could not be (de)serialized
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A page link has no target id
    #[error("Page ID is empty")]
    EmptyPageId,

    /// A page id does not exist in the project
    #[error("Page with ID '{0}' not found")]
    PageNotFound(String),

    /// An object id does not exist on the page
    #[error("Object with ID '{0}' not found")]
    ObjectNotFound(String),

    /// A document link points at a missing file
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    /// A document link points at a file whose extension does not match its kind
    #[error("File type does not match the expected type for this link. Expected: {expected}, actual: {actual}")]
    DocumentTypeMismatch {
        /// Comma-separated list of accepted extensions
        expected: String,
        /// Extension of the linked file
        actual: String,
    },

    /// A URL link has no target
    #[error("URL is empty")]
    EmptyUrl,

    /// A spreadsheet link has no file configured
    #[error("Excel data not configured")]
    ExcelNotConfigured,

    /// The operating system refused to open a path or URL
    #[error("Failed to open {target}: {source}")]
    Launch {
        /// Path or URL being opened
        target: String,
        /// Underlying error from the launcher
        #[source]
        source: std::io::Error,
    },

    /// A page has no linked objects to export
    #[error("No objects with links found on page '{0}'")]
    NoLinks(String),

    /// The project cannot be published as-is
    #[error("Project cannot be published: {0}")]
    InvalidForPublishing(String),

    /// No template with the given name exists
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// A template name that cannot be used as a file name
    #[error("Invalid template name '{0}': use a plain name without path separators")]
    InvalidTemplateName(String),
}

impl ExploderError {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Exploder operations
pub type Result<T> = std::result::Result<T, ExploderError>;
