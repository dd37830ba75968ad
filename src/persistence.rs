//! Reading and writing `.exp` project files and the recent-projects list.

use crate::constants::{MAX_RECENT_PROJECTS, PROJECT_EXTENSION};
use crate::error::{ExploderError, Result};
use crate::types::Project;
use std::path::{Path, PathBuf};

/// Reads a UTF-8 file, tagging failures with the path.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ExploderError::io(path, e))
}

/// Writes a file, creating missing parent directories first.
pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExploderError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| ExploderError::io(path, e))
}

impl Project {
    /// `<path>/<name>.exp`, where a project is saved unless the user picks another file.
    pub fn default_file_path(&self) -> PathBuf {
        self.path
            .join(format!("{}.{}", self.name, PROJECT_EXTENSION))
    }
}

/// Loads a project file.
///
/// A project without a stored directory adopts the directory of the file.
pub fn load_project(path: &Path) -> Result<Project> {
    let json = read_text(path)?;
    let mut project = Project::from_json(&json)?;
    project.sanitize();
    if project.path.as_os_str().is_empty() {
        if let Some(parent) = path.parent() {
            project.path = parent.to_path_buf();
        }
    }
    log::info!(
        "Loaded project '{}' ({} pages) from {}",
        project.name,
        project.pages.len(),
        path.display()
    );
    Ok(project)
}

/// Sanitizes `project` and writes it as indented JSON.
pub fn save_project(project: &mut Project, path: &Path) -> Result<()> {
    project.sanitize();
    let json = project.to_json()?;
    write_text(path, &json)?;
    log::info!("Saved project '{}' to {}", project.name, path.display());
    Ok(())
}

/// Most-recently-used project files, stored one path per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentProjects {
    file: PathBuf,
    entries: Vec<PathBuf>,
}

impl RecentProjects {
    /// Reads the list at `file`, keeping existing project files only.
    ///
    /// A missing or unreadable list yields an empty one.
    pub fn load(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let entries = match std::fs::read_to_string(&file) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .filter(|path| path.is_file())
                .take(MAX_RECENT_PROJECTS)
                .collect(),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not read recent projects from {}: {}", file.display(), e);
                }
                Vec::new()
            }
        };
        Self { file, entries }
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Moves `path` to the front of the list.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|p| p != &path);
        self.entries.insert(0, path);
        self.entries.truncate(MAX_RECENT_PROJECTS);
    }

    /// Writes the list back to its file.
    pub fn save(&self) -> Result<()> {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_string_lossy());
            text.push('\n');
        }
        write_text(&self.file, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanvasObject, Link, ObjectKind, PageSettings};
    use pretty_assertions::assert_eq;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("exploder-persist-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_save_and_load_project() {
        let dir = temp_dir();
        let mut project = Project::new("Plant", &dir, PageSettings::default());
        let detail = project.add_page("Detail", None);
        let mut object = CanvasObject::with_box(ObjectKind::Circle, 1.0, 2.0, 3.0, 4.0);
        object.link = Link::Page { page_id: detail };
        project.pages[0].add_object(object);

        let path = project.default_file_path();
        assert_eq!(path, dir.join("Plant.exp"));
        save_project(&mut project, &path).unwrap();
        let loaded = load_project(&path).unwrap();

        assert_eq!(loaded, project);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_sanitizes_non_finite_numbers() {
        let dir = temp_dir();
        let mut project = Project::new("Broken", &dir, PageSettings::default());
        let mut object = CanvasObject::with_box(ObjectKind::Rectangle, f64::NAN, 0.0, 1.0, 1.0);
        object.style.opacity = f64::INFINITY;
        project.pages[0].add_object(object);

        let path = dir.join("nested").join("broken.exp");
        save_project(&mut project, &path).unwrap();
        let loaded = load_project(&path).unwrap();

        assert_eq!(loaded.pages[0].objects[0].bounds().0, 0.0);
        assert_eq!(loaded.pages[0].objects[0].style.opacity, 1.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_fills_missing_directory() {
        let dir = temp_dir();
        let path = dir.join("bare.exp");
        std::fs::write(&path, r#"{"name":"Bare","pages":[{"id":"p1","name":"Main Page"}]}"#)
            .unwrap();

        let loaded = load_project(&path).unwrap();

        assert_eq!(loaded.path, dir);
        assert_eq!(loaded.pages[0].id, "p1");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_errors() {
        let dir = temp_dir();
        assert!(matches!(
            load_project(&dir.join("missing.exp")),
            Err(ExploderError::Io { .. })
        ));

        let bad = dir.join("bad.exp");
        std::fs::write(&bad, "not json").unwrap();
        assert!(matches!(load_project(&bad), Err(ExploderError::Json(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_recent_projects_keeps_existing_files() {
        let dir = temp_dir();
        let existing = dir.join("a.exp");
        std::fs::write(&existing, "{}").unwrap();
        let list = dir.join("recent_projects.txt");
        std::fs::write(
            &list,
            format!("\n{}\n   \n{}\n", existing.display(), dir.join("gone.exp").display()),
        )
        .unwrap();

        let recent = RecentProjects::load(&list);

        assert_eq!(recent.entries(), &[existing]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_recent_projects_add_moves_to_front_and_truncates() {
        let dir = temp_dir();
        let list = dir.join("data").join("recent_projects.txt");
        let mut recent = RecentProjects::load(&list);
        assert!(recent.entries().is_empty());

        let files: Vec<PathBuf> = (0..12)
            .map(|i| {
                let path = dir.join(format!("p{i}.exp"));
                std::fs::write(&path, "{}").unwrap();
                path
            })
            .collect();
        for file in &files {
            recent.add(file.clone());
        }
        recent.add(files[5].clone());

        assert_eq!(recent.entries().len(), MAX_RECENT_PROJECTS);
        assert_eq!(recent.entries()[0], files[5]);
        assert_eq!(recent.entries()[1], files[11]);

        recent.save().unwrap();
        let reloaded = RecentProjects::load(&list);
        assert_eq!(reloaded.entries(), recent.entries());
        std::fs::remove_dir_all(&dir).ok();
    }
}
