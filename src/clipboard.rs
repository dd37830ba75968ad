//! Copy, cut and paste of canvas objects.

use crate::constants::PASTE_OFFSET;
use crate::types::{new_id, CanvasObject, ObjectId, Page};

/// Holds at most one object between copy/cut and paste.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<CanvasObject>,
}

impl Clipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there is something to paste.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// The object that the next paste would be cloned from.
    pub fn content(&self) -> Option<&CanvasObject> {
        self.content.as_ref()
    }

    /// Stores a copy of `object` named "<name> (Copy)".
    pub fn copy(&mut self, object: &CanvasObject) {
        self.content = Some(Self::clone_with_suffix(object, " (Copy)"));
    }

    /// Removes an object from `page` and stores it named "<name> (Cut)".
    ///
    /// Returns the removed object, or `None` if the page has no such object.
    pub fn cut(&mut self, page: &mut Page, object_id: &str) -> Option<CanvasObject> {
        let (_, removed) = page.remove_object(object_id)?;
        self.content = Some(Self::clone_with_suffix(&removed, " (Cut)"));
        Some(removed)
    }

    /// Adds a fresh copy of the clipboard content to `page`, shifted by the
    /// paste offset, and returns its id.
    pub fn paste(&self, page: &mut Page) -> Option<ObjectId> {
        let mut pasted = self.content.clone()?;
        pasted.id = new_id();
        pasted.translate(PASTE_OFFSET, PASTE_OFFSET);
        Some(page.add_object(pasted))
    }

    fn clone_with_suffix(object: &CanvasObject, suffix: &str) -> CanvasObject {
        let mut clone = object.clone();
        clone.id = new_id();
        clone.name = format!("{}{}", object.name, suffix);
        clone
    }
}
