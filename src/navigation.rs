//! Page navigation with a back-history stack.

use crate::error::{ExploderError, Result};
use crate::types::{PageId, Project};

/// Tracks the page being shown and the pages visited before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    current: Option<PageId>,
    history: Vec<PageId>,
}

impl Navigator {
    /// Creates a navigator showing the project's main page.
    pub fn new(project: &Project) -> Self {
        let mut navigator = Self::default();
        navigator.open(project);
        navigator
    }

    /// Resets to the main page of a freshly loaded project.
    pub fn open(&mut self, project: &Project) {
        self.history.clear();
        self.current = project.main_page().map(|p| p.id.clone());
    }

    /// Id of the page being shown.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Moves to `page_id`, remembering the current page for [`Navigator::back`].
    ///
    /// Navigating to the page already shown does nothing. Returns whether the
    /// current page changed.
    pub fn navigate_to(&mut self, project: &Project, page_id: &str) -> Result<bool> {
        if page_id.is_empty() {
            return Err(ExploderError::EmptyPageId);
        }
        if project.page(page_id).is_none() {
            return Err(ExploderError::PageNotFound(page_id.to_string()));
        }
        if self.current.as_deref() == Some(page_id) {
            return Ok(false);
        }
        if let Some(previous) = self.current.replace(page_id.to_string()) {
            self.history.push(previous);
        }
        log::debug!("Navigated to page {page_id}");
        Ok(true)
    }

    /// Returns to the previously shown page, if any.
    pub fn back(&mut self) -> Option<&str> {
        let previous = self.history.pop()?;
        self.current = Some(previous);
        self.current.as_deref()
    }

    /// Clears the history and shows the main page.
    pub fn home(&mut self, project: &Project) {
        self.open(project);
    }

    /// Returns true if [`Navigator::back`] would move.
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Visited pages from oldest to the current one.
    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.history
            .iter()
            .map(String::as_str)
            .chain(self.current.as_deref())
            .collect()
    }

    /// Drops a removed page from the history; shows the main page if it was current.
    pub fn forget_page(&mut self, project: &Project, page_id: &str) {
        self.history.retain(|id| id != page_id);
        self.history.dedup();
        if self.current.as_deref() == Some(page_id) {
            self.current = self
                .history
                .pop()
                .or_else(|| project.main_page().map(|p| p.id.clone()));
        }
    }
}
