//! Publishing a project as a viewer-only snapshot.

use crate::error::{ExploderError, Result};
use crate::links::resolve_path;
use crate::persistence::write_text;
use crate::types::{Link, Project};
use std::path::Path;

/// Checks that a project can be published.
///
/// The project needs a name, at least one page, and every document link
/// with a path must point at an existing file.
pub fn validate_for_publishing(project: &Project) -> Result<()> {
    if project.name.trim().is_empty() {
        return Err(ExploderError::InvalidForPublishing(
            "project has no name".to_string(),
        ));
    }
    if project.pages.is_empty() {
        return Err(ExploderError::InvalidForPublishing(
            "project has no pages".to_string(),
        ));
    }
    for page in &project.pages {
        for object in &page.objects {
            if let Link::Document { path, .. } = &object.link {
                if path.as_os_str().is_empty() {
                    continue;
                }
                let full = resolve_path(path, &project.path);
                if !full.is_file() {
                    return Err(ExploderError::InvalidForPublishing(format!(
                        "'{}' on page '{}' links to missing document {}",
                        object.name,
                        page.name,
                        full.display()
                    )));
                }
            }
        }
    }
    Ok(())
}

/// A copy of `project` stripped of editing state.
///
/// The name gains a " (Published)" suffix; grouping and the recent-projects
/// list are dropped and all numbers are sanitized.
pub fn published_version(project: &Project) -> Project {
    let mut published = project.clone();
    published.name = format!("{} (Published)", project.name);
    published.recent_projects.clear();
    for page in &mut published.pages {
        for object in &mut page.objects {
            object.group_id = None;
        }
    }
    published.sanitize();
    published
}

/// Validates `project` and writes its published version to `output`.
pub fn publish_project(project: &Project, output: &Path) -> Result<()> {
    validate_for_publishing(project)?;
    let published = published_version(project);
    write_text(output, &published.to_json()?)?;
    log::info!(
        "Published '{}' ({} pages) to {}",
        project.name,
        published.pages.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::load_project;
    use crate::types::{CanvasObject, DocumentKind, ObjectKind, PageSettings};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("exploder-publish-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn grouped_project(dir: &Path) -> Project {
        let mut project = Project::new("Plant", dir, PageSettings::default());
        project.recent_projects.push(dir.join("other.exp"));
        let mut object = CanvasObject::with_box(ObjectKind::Rectangle, 0.0, 0.0, 5.0, 5.0);
        object.group_id = Some("g".to_string());
        object.style.opacity = f64::NAN;
        project.pages[0].add_object(object);
        project
    }

    #[test]
    fn test_published_version_strips_editing_state() {
        let dir = temp_dir();
        let project = grouped_project(&dir);

        let published = published_version(&project);

        assert_eq!(published.name, "Plant (Published)");
        assert!(published.recent_projects.is_empty());
        assert_eq!(published.pages[0].objects[0].group_id, None);
        assert_eq!(published.pages[0].objects[0].style.opacity, 1.0);
        assert_eq!(published.pages[0].id, project.pages[0].id);
        assert_eq!(project.name, "Plant");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_rejects_unnamed_or_empty_projects() {
        let mut project = Project::new("  ", "", PageSettings::default());
        assert!(validate_for_publishing(&project).is_err());

        project.name = "Named".to_string();
        project.pages.clear();
        assert!(matches!(
            validate_for_publishing(&project),
            Err(ExploderError::InvalidForPublishing(reason)) if reason.contains("no pages")
        ));
    }

    #[test]
    fn test_validate_checks_document_links() {
        let dir = temp_dir();
        let mut project = Project::new("Docs", &dir, PageSettings::default());
        let mut object = CanvasObject::with_box(ObjectKind::Button, 0.0, 0.0, 5.0, 5.0);
        object.link = Link::Document {
            path: PathBuf::from("manual.pdf"),
            file_type: DocumentKind::Pdf,
        };
        project.pages[0].add_object(object);

        assert!(validate_for_publishing(&project).is_err());

        std::fs::write(dir.join("manual.pdf"), b"%PDF").unwrap();
        assert!(validate_for_publishing(&project).is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_publish_project_writes_snapshot() {
        let dir = temp_dir();
        let project = grouped_project(&dir);
        let output = dir.join("out").join("plant.exp");

        publish_project(&project, &output).unwrap();

        let written = load_project(&output).unwrap();
        assert_eq!(written.name, "Plant (Published)");
        assert_eq!(written.pages.len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
