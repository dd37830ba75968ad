//! Exporting and importing object links as standalone files.
//!
//! A `.link` file carries one object's link; a `.bulk` file carries every
//! linked object of a page together with summary statistics. Imports match
//! objects by name and kind, so links can be moved between copies of a page.

use crate::constants::{BULK_EXTENSION, LINK_CONFIG_VERSION};
use crate::error::{ExploderError, Result};
use crate::persistence::{read_text, write_text};
use crate::types::{CanvasObject, Link, ObjectKind, Page, Project, TextStyle};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Where a link configuration came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkMetadata {
    /// Time of export
    pub exported_at: DateTime<Utc>,
    /// File format version
    pub version: String,
    /// Free-form description
    pub description: String,
    /// Name of the exporting object
    pub object_name: String,
    /// Kind of the exporting object
    pub object_kind: ObjectKind,
}

/// One object's link, as stored in a `.link` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfiguration {
    /// The link itself
    pub link: Link,
    /// Text shown on the object
    #[serde(default)]
    pub link_text: String,
    /// Export details
    pub metadata: LinkMetadata,
}

impl LinkConfiguration {
    /// Captures the link and text of `object`.
    pub fn from_object(object: &CanvasObject) -> Self {
        Self {
            link: object.link.clone(),
            link_text: object.text_content().to_string(),
            metadata: LinkMetadata {
                exported_at: Utc::now(),
                version: LINK_CONFIG_VERSION.to_string(),
                description: format!("Link configuration for {}", object.name),
                object_name: object.name.clone(),
                object_kind: object.kind,
            },
        }
    }

    /// Whether this configuration was exported from an object like `object`.
    pub fn matches(&self, object: &CanvasObject) -> bool {
        object.name == self.metadata.object_name && object.kind == self.metadata.object_kind
    }

    /// Copies the link onto `object`; non-empty link text replaces its text.
    pub fn apply_to(&self, object: &mut CanvasObject) {
        object.link = self.link.clone();
        if self.link_text.is_empty() {
            return;
        }
        match &mut object.text {
            Some(text) => text.text = self.link_text.clone(),
            None => object.text = Some(TextStyle::new(self.link_text.clone())),
        }
    }
}

/// Link counts in a bulk export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BulkStats {
    /// Number of exported links
    pub total_links: usize,
    /// Links to other pages
    pub page_links: usize,
    /// Links to documents
    pub document_links: usize,
    /// Links to URLs
    pub url_links: usize,
    /// Links to spreadsheet ranges
    pub excel_links: usize,
    /// Number of distinct object kinds
    pub object_kinds: usize,
    /// Distinct object kinds, sorted by name
    pub unique_object_kinds: Vec<String>,
}

impl BulkStats {
    /// Tallies a set of link configurations.
    pub fn from_configurations(configurations: &[LinkConfiguration]) -> Self {
        let mut stats = Self {
            total_links: configurations.len(),
            ..Self::default()
        };
        let mut kinds = BTreeSet::new();
        for configuration in configurations {
            match configuration.link {
                Link::Page { .. } => stats.page_links += 1,
                Link::Document { .. } => stats.document_links += 1,
                Link::Url { .. } => stats.url_links += 1,
                Link::ExcelData { .. } => stats.excel_links += 1,
                Link::None => {}
            }
            kinds.insert(configuration.metadata.object_kind.label().to_string());
        }
        stats.object_kinds = kinds.len();
        stats.unique_object_kinds = kinds.into_iter().collect();
        stats
    }
}

/// Every link on one page, as stored in a `.bulk` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkLinkConfiguration {
    /// Project the page belongs to
    pub project_name: String,
    /// Page the links were exported from
    pub page_name: String,
    /// Time of export
    pub exported_at: DateTime<Utc>,
    /// File format version
    pub version: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// One entry per linked object
    pub link_configurations: Vec<LinkConfiguration>,
    /// Summary counts
    #[serde(default)]
    pub stats: BulkStats,
}

/// Collects the links of every linked object on `page`.
pub fn export_page_links(project: &Project, page: &Page) -> Result<BulkLinkConfiguration> {
    let link_configurations: Vec<LinkConfiguration> = page
        .objects
        .iter()
        .filter(|o| o.link.is_some())
        .map(LinkConfiguration::from_object)
        .collect();
    if link_configurations.is_empty() {
        return Err(ExploderError::NoLinks(page.name.clone()));
    }

    let stats = BulkStats::from_configurations(&link_configurations);
    Ok(BulkLinkConfiguration {
        project_name: project.name.clone(),
        page_name: page.name.clone(),
        exported_at: Utc::now(),
        version: LINK_CONFIG_VERSION.to_string(),
        description: format!("Links exported from page '{}'", page.name),
        link_configurations,
        stats,
    })
}

/// Applies each entry to the first object on `page` with the same name and
/// kind. Returns how many entries found a match.
pub fn import_bulk(page: &mut Page, bulk: &BulkLinkConfiguration) -> usize {
    let mut applied = 0;
    for configuration in &bulk.link_configurations {
        match page.objects.iter_mut().find(|o| configuration.matches(o)) {
            Some(object) => {
                configuration.apply_to(object);
                applied += 1;
            }
            None => log::debug!(
                "No {} named '{}' on page '{}'",
                configuration.metadata.object_kind.label(),
                configuration.metadata.object_name,
                page.name
            ),
        }
    }
    log::info!(
        "Imported {applied} of {} link configurations into '{}'",
        bulk.link_configurations.len(),
        page.name
    );
    applied
}

/// Suggested file name for a bulk export of `page`.
pub fn default_bulk_file_name(project: &Project, page: &Page) -> String {
    format!(
        "BulkLinks_{}_{}_{}.{}",
        project.name,
        page.name,
        Local::now().format("%Y%m%d_%H%M%S"),
        BULK_EXTENSION
    )
}

/// Writes a single link configuration.
pub fn write_link_configuration(configuration: &LinkConfiguration, path: &Path) -> Result<()> {
    write_text(path, &serde_json::to_string_pretty(configuration)?)
}

/// Reads a single link configuration.
pub fn read_link_configuration(path: &Path) -> Result<LinkConfiguration> {
    Ok(serde_json::from_str(&read_text(path)?)?)
}

/// Writes a bulk link configuration.
pub fn write_bulk_configuration(bulk: &BulkLinkConfiguration, path: &Path) -> Result<()> {
    write_text(path, &serde_json::to_string_pretty(bulk)?)
}

/// Reads a bulk link configuration.
pub fn read_bulk_configuration(path: &Path) -> Result<BulkLinkConfiguration> {
    Ok(serde_json::from_str(&read_text(path)?)?)
}
