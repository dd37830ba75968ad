//! Project templates: built-in starting points and user-saved projects.
//!
//! A template is stored as two files in the templates directory:
//! `<name>.template` holds the project JSON and `<name>.meta` holds its
//! [`TemplateInfo`].

use crate::error::{ExploderError, Result};
use crate::persistence::{read_text, write_text};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const TEMPLATE_EXTENSION: &str = "template";
const META_EXTENSION: &str = "meta";

/// Kinds of built-in templates installed on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Machine overview drilling into component pages
    MachineDocumentation,
    /// Leadership chart drilling into role pages
    OrganizationalChart,
    /// Business overview drilling into process pages
    BusinessDocumentation,
}

/// Metadata for a single built-in template.
pub struct BuiltinTemplate {
    /// Stable identifier for the template
    pub kind: TemplateKind,
    /// Name the template is saved under
    pub name: &'static str,
    /// Description shown next to the name
    pub description: &'static str,
}

/// Returns all built-in templates.
pub const fn all_templates() -> &'static [BuiltinTemplate] {
    const TEMPLATES: &[BuiltinTemplate] = &[
        BuiltinTemplate {
            kind: TemplateKind::MachineDocumentation,
            name: "Machine Documentation",
            description: "Template for documenting machinery with multiple components",
        },
        BuiltinTemplate {
            kind: TemplateKind::OrganizationalChart,
            name: "Organizational Chart",
            description: "Template for creating organizational charts",
        },
        BuiltinTemplate {
            kind: TemplateKind::BusinessDocumentation,
            name: "Business Documentation",
            description: "Template for business process documentation",
        },
    ];
    TEMPLATES
}

/// Builds the project for a built-in template.
pub fn build_template(kind: TemplateKind) -> Project {
    match kind {
        TemplateKind::MachineDocumentation => build_overview(
            "Machine Documentation Template",
            "Main Overview",
            &[
                ("Engine", (50.0, 50.0), "#FFE6E6", "#CC0000"),
                ("Transmission", (200.0, 50.0), "#E6F3FF", "#0066CC"),
                ("Hydraulics", (350.0, 50.0), "#E6FFE6", "#00CC00"),
            ],
        ),
        TemplateKind::OrganizationalChart => build_overview(
            "Organizational Chart Template",
            "Organization Overview",
            &[
                ("CEO", (80.0, 30.0), "#FFE6CC", "#FF6600"),
                ("CTO", (30.0, 100.0), "#E6CCFF", "#6600CC"),
                ("CFO", (130.0, 100.0), "#CCE6FF", "#0066CC"),
            ],
        ),
        TemplateKind::BusinessDocumentation => build_overview(
            "Business Documentation Template",
            "Business Overview",
            &[
                ("Process Flow", (30.0, 50.0), "#F0F8FF", "#4169E1"),
                ("Policies", (130.0, 50.0), "#FFF8DC", "#DAA520"),
                ("Procedures", (30.0, 130.0), "#F0FFF0", "#228B22"),
                ("Forms", (130.0, 130.0), "#FFF0F5", "#DC143C"),
            ],
        ),
    }
}

/// An overview page of labelled boxes, each linked to its own details page.
fn build_overview(
    project_name: &str,
    page_name: &str,
    boxes: &[(&str, (f64, f64), &str, &str)],
) -> Project {
    let mut settings = PageSettings::for_size(PageSize::A4, Orientation::Landscape);
    settings.background_color = "#F5F5F5".to_string();
    settings.show_grid = true;

    let mut project = Project::new(project_name, "", settings);
    project.pages[0].name = page_name.to_string();
    let main_id = project.pages[0].id.clone();

    for &(label, (left, top), fill, stroke) in boxes {
        let details = project.add_page(format!("{label} Details"), Some(main_id.clone()));

        let mut object = CanvasObject::with_box(ObjectKind::Rectangle, left, top, 80.0, 60.0);
        object.name = label.to_string();
        object.style.fill_color = fill.to_string();
        object.style.stroke_color = stroke.to_string();
        object.style.stroke_thickness = 2.0;
        object.text = Some(TextStyle::new(label));
        object.link = Link::Page { page_id: details };
        project.pages[0].add_object(object);
    }
    project
}

/// Metadata stored next to each saved template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateInfo {
    /// Template name, also its file stem
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Grouping shown in the template list
    #[serde(default)]
    pub category: String,
    /// When the template was saved
    pub created_date: DateTime<Utc>,
    /// Location of the `.template` file
    #[serde(default)]
    pub file_path: PathBuf,
}

/// Gives every page and object a fresh id, keeping parent and page links intact.
pub fn regenerate_ids(project: &mut Project) {
    let remap: HashMap<PageId, PageId> = project
        .pages
        .iter()
        .map(|p| (p.id.clone(), new_id()))
        .collect();

    for page in &mut project.pages {
        if let Some(id) = remap.get(&page.id) {
            page.id = id.clone();
        }
        if let Some(parent) = page.parent_id.as_ref().and_then(|p| remap.get(p)) {
            page.parent_id = Some(parent.clone());
        }
        for object in &mut page.objects {
            object.id = new_id();
            if let Link::Page { page_id } = &mut object.link {
                if let Some(target) = remap.get(page_id.as_str()) {
                    *page_id = target.clone();
                }
            }
        }
    }
}

/// Templates saved in a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Opens the store rooted at `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the template files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rejects names that are empty or could leave the store directory.
    fn check_name(name: &str) -> Result<()> {
        let trimmed = name.trim();
        let invalid = trimmed.is_empty()
            || trimmed.contains("..")
            || trimmed.chars().any(|c| matches!(c, '/' | '\\' | ':') || c.is_control());
        if invalid {
            return Err(ExploderError::InvalidTemplateName(name.to_string()));
        }
        Ok(())
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{TEMPLATE_EXTENSION}"))
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{META_EXTENSION}"))
    }

    /// Saves `project` as a "Custom" template called `name`.
    pub fn save_as_template(
        &self,
        project: &Project,
        name: &str,
        description: &str,
    ) -> Result<TemplateInfo> {
        self.save_with_category(project, name, description, "Custom")
    }

    fn save_with_category(
        &self,
        project: &Project,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<TemplateInfo> {
        Self::check_name(name)?;
        let info = TemplateInfo {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            created_date: Utc::now(),
            file_path: self.template_path(name),
        };
        let mut snapshot = project.clone();
        snapshot.sanitize();
        write_text(&info.file_path, &snapshot.to_json()?)?;
        write_text(&self.meta_path(name), &serde_json::to_string_pretty(&info)?)?;
        log::info!("Saved template '{}' to {}", name, info.file_path.display());
        Ok(info)
    }

    /// Templates with readable metadata, sorted by category then name.
    pub fn list(&self) -> Vec<TemplateInfo> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("No templates in {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut templates: Vec<TemplateInfo> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == META_EXTENSION))
            .filter_map(|meta| {
                let parsed = read_text(&meta)
                    .and_then(|json| Ok(serde_json::from_str::<TemplateInfo>(&json)?));
                match parsed {
                    Ok(mut info) => {
                        info.file_path = meta.with_extension(TEMPLATE_EXTENSION);
                        info.file_path.is_file().then_some(info)
                    }
                    Err(e) => {
                        log::warn!("Skipping template metadata {}: {}", meta.display(), e);
                        None
                    }
                }
            })
            .collect();
        templates.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        templates
    }

    fn find(&self, name: &str) -> Result<TemplateInfo> {
        self.list()
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ExploderError::TemplateNotFound(name.to_string()))
    }

    /// Creates a new project from the template called `name` (case-insensitive).
    ///
    /// The copy is renamed "<name> (Copy)", has no directory and gets fresh ids.
    pub fn create_project(&self, name: &str) -> Result<Project> {
        let info = self.find(name)?;
        let mut project = Project::from_json(&read_text(&info.file_path)?)?;
        project.name = format!("{} (Copy)", project.name);
        project.path = PathBuf::new();
        project.recent_projects.clear();
        regenerate_ids(&mut project);
        project.sanitize();
        log::info!("Created project '{}' from template '{}'", project.name, info.name);
        Ok(project)
    }

    /// Deletes both files of the template called `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let info = self.find(name)?;
        for path in [info.file_path.clone(), self.meta_path(&info.name)] {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| ExploderError::io(&path, e))?;
            }
        }
        log::info!("Deleted template '{}'", info.name);
        Ok(())
    }

    /// Writes any built-in template that is not already present.
    /// Returns how many were written.
    pub fn install_defaults(&self) -> Result<usize> {
        let existing = self.list();
        let mut installed = 0;
        for builtin in all_templates() {
            if existing
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(builtin.name))
            {
                continue;
            }
            self.save_with_category(
                &build_template(builtin.kind),
                builtin.name,
                builtin.description,
                "Built-in",
            )?;
            installed += 1;
        }
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_store() -> TemplateStore {
        TemplateStore::new(
            std::env::temp_dir().join(format!("exploder-templates-{}", uuid::Uuid::new_v4())),
        )
    }

    #[test]
    fn test_builtin_templates_are_consistent() {
        for builtin in all_templates() {
            let project = build_template(builtin.kind);
            assert!(project.validate().is_empty(), "{} is invalid", builtin.name);
            let main = project.main_page().unwrap();
            assert_eq!(project.children(&main.id).len(), main.objects.len());
            assert!(main.objects.iter().all(|o| o.link.page_id().is_some()));
        }
        let machine = build_template(TemplateKind::MachineDocumentation);
        assert_eq!(machine.pages[0].settings.width, 297.0);
        assert!(machine.page_by_name("Engine Details").is_some());
    }

    #[test]
    fn test_save_list_and_delete() {
        let store = temp_store();
        assert!(store.list().is_empty());

        let project = Project::new("Mine", "/somewhere", PageSettings::default());
        let info = store.save_as_template(&project, "Zeta", "last").unwrap();
        assert_eq!(info.category, "Custom");
        assert!(info.file_path.is_file());
        store.save_as_template(&project, "Alpha", "first").unwrap();
        assert_eq!(store.install_defaults().unwrap(), 3);

        let names: Vec<String> = store.list().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "Business Documentation",
                "Machine Documentation",
                "Organizational Chart",
                "Alpha",
                "Zeta"
            ]
        );

        store.delete("zeta").unwrap();
        assert!(store.list().iter().all(|t| t.name != "Zeta"));
        assert!(matches!(
            store.delete("Zeta"),
            Err(ExploderError::TemplateNotFound(_))
        ));
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_template_names_stay_inside_the_store() {
        let store = temp_store();
        let project = Project::new("Mine", "", PageSettings::default());

        for name in ["../escaped", "a/b", "a\\b", "C:evil", "..", "  "] {
            assert!(
                matches!(
                    store.save_as_template(&project, name, ""),
                    Err(ExploderError::InvalidTemplateName(_))
                ),
                "{name:?} was accepted"
            );
        }
        assert!(!store.dir().exists(), "nothing was written");

        store.save_as_template(&project, "Pump v2.1", "").unwrap();
        let names: Vec<String> = store.list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Pump v2.1".to_string()]);
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_install_defaults_is_idempotent() {
        let store = temp_store();
        assert_eq!(store.install_defaults().unwrap(), 3);
        assert_eq!(store.install_defaults().unwrap(), 0);
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_list_skips_unreadable_metadata() {
        let store = temp_store();
        store
            .save_as_template(&Project::new("Ok", "", PageSettings::default()), "Ok", "")
            .unwrap();
        std::fs::write(store.dir().join("Broken.meta"), "{ nope").unwrap();
        std::fs::write(store.dir().join("Broken.template"), "{}").unwrap();

        let names: Vec<String> = store.list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Ok".to_string()]);
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_create_project_regenerates_ids() {
        let store = temp_store();
        store.install_defaults().unwrap();
        let original = build_template(TemplateKind::OrganizationalChart);

        let project = store.create_project("organizational chart").unwrap();

        assert_eq!(project.name, "Organizational Chart Template (Copy)");
        assert_eq!(project.path, PathBuf::new());
        assert_eq!(project.pages.len(), original.pages.len());
        assert!(project.validate().is_empty());

        let main = project.main_page().unwrap();
        for object in &main.objects {
            let target = project.page(object.link.page_id().unwrap()).unwrap();
            assert_eq!(target.parent_id.as_deref(), Some(main.id.as_str()));
            assert_eq!(target.name, format!("{} Details", object.name));
        }

        let again = store.create_project("Organizational Chart").unwrap();
        assert_ne!(again.pages[0].id, project.pages[0].id);
        assert!(matches!(
            store.create_project("missing"),
            Err(ExploderError::TemplateNotFound(_))
        ));
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn test_regenerate_ids_keeps_unknown_links() {
        let mut project = Project::new("P", "", PageSettings::default());
        let mut object = CanvasObject::with_box(ObjectKind::Button, 0.0, 0.0, 1.0, 1.0);
        object.link = Link::Page {
            page_id: "outside".to_string(),
        };
        let old_object_id = project.pages[0].add_object(object);
        let old_page_id = project.pages[0].id.clone();

        regenerate_ids(&mut project);

        assert_ne!(project.pages[0].id, old_page_id);
        assert_ne!(project.pages[0].objects[0].id, old_object_id);
        assert_eq!(project.pages[0].objects[0].link.page_id(), Some("outside"));
    }
}
