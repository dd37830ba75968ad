//! Core data types for Exploder projects.
//!
//! A [`Project`] is an ordered list of [`Page`]s. Each page holds drawn
//! [`CanvasObject`]s, and any object may carry a [`Link`] to another page, a
//! document, a URL or a spreadsheet range. Page links turn the project into a
//! directed graph; `parent_id` back-references give it a navigable tree.

use crate::constants;
use crate::error::{ExploderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for pages within a project.
pub type PageId = String;

/// Unique identifier for objects within a project.
pub type ObjectId = String;

/// Generates a fresh identifier for a page or object.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn finite_or(value: &mut f64, default: f64) {
    if !value.is_finite() {
        *value = default;
    }
}

/// Parses `#RGB`, `#RRGGBB` or `#AARRGGBB` into `[r, g, b, a]`.
pub fn parse_hex_color(text: &str) -> Option<[u8; 4]> {
    let hex = text.trim().strip_prefix('#')?;
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 16 + v;
            }
            Some(out)
        }
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(2)?, byte(4)?, byte(6)?, byte(0)?]),
        _ => None,
    }
}

/// Standard paper sizes offered for new pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PageSize {
    /// 210 x 297 mm
    #[default]
    A4,
    /// 297 x 420 mm
    A3,
    /// 148 x 210 mm
    A5,
    /// 216 x 279 mm
    Letter,
    /// 216 x 356 mm
    Legal,
    /// User-supplied width and height
    Custom,
}

impl PageSize {
    /// Portrait dimensions in millimetres, or `None` for [`PageSize::Custom`].
    pub fn dimensions(self) -> Option<(f64, f64)> {
        match self {
            PageSize::A4 => Some((210.0, 297.0)),
            PageSize::A3 => Some((297.0, 420.0)),
            PageSize::A5 => Some((148.0, 210.0)),
            PageSize::Letter => Some((216.0, 279.0)),
            PageSize::Legal => Some((216.0, 356.0)),
            PageSize::Custom => None,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

/// Size, orientation, margins and background of a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageSettings {
    /// Named paper size
    pub page_size: PageSize,
    /// Portrait or landscape
    pub orientation: Orientation,
    /// Margin in millimetres
    pub margin_size: f64,
    /// Background colour as a hex string
    pub background_color: String,
    /// Whether the editor draws a grid
    pub show_grid: bool,
    /// Whether the editor draws rulers
    pub show_rulers: bool,
    /// Page width in millimetres
    pub width: f64,
    /// Page height in millimetres
    pub height: f64,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_size: 20.0,
            background_color: "#FFFFFF".to_string(),
            show_grid: false,
            show_rulers: true,
            width: 210.0,
            height: 297.0,
        }
    }
}

impl PageSettings {
    /// Settings for a named paper size; landscape swaps width and height.
    ///
    /// [`PageSize::Custom`] keeps the default A4 dimensions until the caller
    /// overrides `width` and `height`.
    pub fn for_size(page_size: PageSize, orientation: Orientation) -> Self {
        let (mut width, mut height) = page_size.dimensions().unwrap_or((210.0, 297.0));
        if orientation == Orientation::Landscape {
            std::mem::swap(&mut width, &mut height);
        }
        Self {
            page_size,
            orientation,
            width,
            height,
            ..Self::default()
        }
    }

    /// Replaces non-finite numbers with zero.
    pub fn sanitize(&mut self) {
        finite_or(&mut self.margin_size, 0.0);
        finite_or(&mut self.width, 0.0);
        finite_or(&mut self.height, 0.0);
    }
}

/// Kind of drawn object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ObjectKind {
    /// Plain rectangle
    #[default]
    Rectangle,
    /// Rectangle with rounded corners
    RoundedRectangle,
    /// Circle or ellipse inscribed in its box
    Circle,
    /// Upward-pointing triangle inscribed in its box
    Triangle,
    /// Straight line between two points
    Line,
    /// Free text
    Text,
    /// Bitmap loaded from `image`
    Image,
    /// Clickable button
    Button,
}

impl ObjectKind {
    /// All kinds, in menu order.
    pub const ALL: [ObjectKind; 8] = [
        ObjectKind::Rectangle,
        ObjectKind::RoundedRectangle,
        ObjectKind::Circle,
        ObjectKind::Triangle,
        ObjectKind::Line,
        ObjectKind::Text,
        ObjectKind::Image,
        ObjectKind::Button,
    ];

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Rectangle => "Rectangle",
            ObjectKind::RoundedRectangle => "Rounded Rectangle",
            ObjectKind::Circle => "Circle",
            ObjectKind::Triangle => "Triangle",
            ObjectKind::Line => "Line",
            ObjectKind::Text => "Text",
            ObjectKind::Image => "Image",
            ObjectKind::Button => "Button",
        }
    }
}

/// Placement of an object on its page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// Axis-aligned box
    Box {
        /// Left edge
        left: f64,
        /// Top edge
        top: f64,
        /// Width (may be negative while drawing)
        width: f64,
        /// Height (may be negative while drawing)
        height: f64,
    },
    /// Line segment
    Line {
        /// Start x
        x1: f64,
        /// Start y
        y1: f64,
        /// End x
        x2: f64,
        /// End y
        y2: f64,
    },
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::Box {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl Geometry {
    /// Normalized bounding box as `(left, top, width, height)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        match *self {
            Geometry::Box {
                left,
                top,
                width,
                height,
            } => (
                left.min(left + width),
                top.min(top + height),
                width.abs(),
                height.abs(),
            ),
            Geometry::Line { x1, y1, x2, y2 } => {
                (x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
            }
        }
    }

    /// Moves the geometry by the given offset.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Geometry::Box { left, top, .. } => {
                *left += dx;
                *top += dy;
            }
            Geometry::Line { x1, y1, x2, y2 } => {
                *x1 += dx;
                *y1 += dy;
                *x2 += dx;
                *y2 += dy;
            }
        }
    }

    fn sanitize(&mut self) {
        match self {
            Geometry::Box {
                left,
                top,
                width,
                height,
            } => {
                finite_or(left, 0.0);
                finite_or(top, 0.0);
                finite_or(width, 0.0);
                finite_or(height, 0.0);
            }
            Geometry::Line { x1, y1, x2, y2 } => {
                finite_or(x1, 0.0);
                finite_or(y1, 0.0);
                finite_or(x2, 0.0);
                finite_or(y2, 0.0);
            }
        }
    }
}

/// Fill and outline of an object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Style {
    /// Fill colour as a hex string
    pub fill_color: String,
    /// Outline colour as a hex string
    pub stroke_color: String,
    /// Outline width
    pub stroke_thickness: f64,
    /// Opacity in `0.0..=1.0`
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: "#FFFFFF".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_thickness: 1.0,
            opacity: 1.0,
        }
    }
}

/// Font weight of object text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FontWeight {
    /// Regular weight
    #[default]
    Normal,
    /// Bold weight
    Bold,
}

/// Text drawn inside an object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextStyle {
    /// Text content
    pub text: String,
    /// Font family name
    pub font_family: String,
    /// Font size in points
    pub font_size: f64,
    /// Font weight
    pub font_weight: FontWeight,
    /// Text colour as a hex string
    pub text_color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Arial".to_string(),
            font_size: 12.0,
            font_weight: FontWeight::Normal,
            text_color: "#000000".to_string(),
        }
    }
}

impl TextStyle {
    /// Default styling around the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Kind of document a [`Link::Document`] is expected to open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DocumentKind {
    /// Any file is accepted
    #[default]
    Unspecified,
    /// Video files
    Video,
    /// PDF documents
    Pdf,
    /// Excel workbooks
    Excel,
    /// Word documents
    Word,
}

impl DocumentKind {
    /// Lowercase extensions (without the dot) accepted for this kind.
    /// An empty slice accepts everything.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Unspecified => &[],
            DocumentKind::Video => &["mp4", "avi", "mov", "wmv", "flv"],
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Excel => &["xlsx", "xls"],
            DocumentKind::Word => &["docx", "doc"],
        }
    }
}

/// A cell range inside a spreadsheet file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExcelRange {
    /// Path to the workbook
    pub file_path: PathBuf,
    /// Sheet inside the workbook
    pub sheet_name: String,
    /// Range such as `A1:B10`
    pub cell_range: String,
    /// Whether `file_path` is relative to the project directory
    pub is_relative: bool,
}

impl Default for ExcelRange {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            sheet_name: String::new(),
            cell_range: String::new(),
            is_relative: true,
        }
    }
}

/// Typed reference from an object to its target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum Link {
    /// The object is not a link
    #[default]
    None,
    /// Navigate to another page of the project
    Page {
        /// Target page
        page_id: PageId,
    },
    /// Open a document with the operating system
    Document {
        /// Document path, absolute or relative to the project directory
        path: PathBuf,
        /// Expected document kind
        file_type: DocumentKind,
    },
    /// Open a web address
    Url {
        /// Target address
        url: String,
    },
    /// Open a spreadsheet range
    ExcelData {
        /// Target range
        range: ExcelRange,
    },
}

impl Link {
    /// Whether the link does anything when followed.
    pub fn is_some(&self) -> bool {
        !matches!(self, Link::None)
    }

    /// Short name of the link kind.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Link::None => "None",
            Link::Page { .. } => "Page",
            Link::Document { .. } => "Document",
            Link::Url { .. } => "Url",
            Link::ExcelData { .. } => "ExcelData",
        }
    }

    /// Target page id, for page links.
    pub fn page_id(&self) -> Option<&str> {
        match self {
            Link::Page { page_id } => Some(page_id),
            _ => None,
        }
    }
}

/// A drawn shape, text, image or button on a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasObject {
    /// Unique identifier within the project
    pub id: ObjectId,
    /// User-displayable name
    pub name: String,
    /// What is drawn
    pub kind: ObjectKind,
    /// Where it is drawn
    pub geometry: Geometry,
    /// Fill and outline
    pub style: Style,
    /// Optional text content and font
    pub text: Option<TextStyle>,
    /// Optional image path for [`ObjectKind::Image`]
    pub image: Option<PathBuf>,
    /// What happens when the object is clicked in view mode
    pub link: Link,
    /// Drawing order; higher values are drawn on top
    pub z_index: i32,
    /// Group membership, if any
    pub group_id: Option<String>,
}

impl Default for CanvasObject {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            kind: ObjectKind::default(),
            geometry: Geometry::default(),
            style: Style::default(),
            text: None,
            image: None,
            link: Link::None,
            z_index: 0,
            group_id: None,
        }
    }
}

impl CanvasObject {
    /// Creates a new object with a fresh id, default styling and no link.
    pub fn new(kind: ObjectKind, geometry: Geometry) -> Self {
        Self {
            id: new_id(),
            name: kind.label().to_string(),
            kind,
            geometry,
            ..Self::default()
        }
    }

    /// Creates a box-shaped object.
    pub fn with_box(kind: ObjectKind, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(
            kind,
            Geometry::Box {
                left,
                top,
                width,
                height,
            },
        )
    }

    /// Normalized bounding box as `(left, top, width, height)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.geometry.bounds()
    }

    /// Moves the object by the given offset.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.geometry.translate(dx, dy);
    }

    /// Whether `point` hits the object. Lines accept points within `tolerance`.
    pub fn contains(&self, point: (f64, f64), tolerance: f64) -> bool {
        match self.geometry {
            Geometry::Line { x1, y1, x2, y2 } => {
                point_to_segment_distance(point, (x1, y1), (x2, y2)) <= tolerance
            }
            Geometry::Box { .. } => {
                let (left, top, width, height) = self.bounds();
                let inside_box = point.0 >= left
                    && point.0 <= left + width
                    && point.1 >= top
                    && point.1 <= top + height;
                if !inside_box || self.kind != ObjectKind::Circle {
                    return inside_box;
                }
                let (rx, ry) = (width / 2.0, height / 2.0);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let dx = (point.0 - (left + rx)) / rx;
                let dy = (point.1 - (top + ry)) / ry;
                dx * dx + dy * dy <= 1.0
            }
        }
    }

    /// Text content, or an empty string.
    pub fn text_content(&self) -> &str {
        self.text.as_ref().map(|t| t.text.as_str()).unwrap_or("")
    }

    /// Replaces non-finite numbers with their documented defaults.
    pub fn sanitize(&mut self) {
        self.geometry.sanitize();
        finite_or(&mut self.style.stroke_thickness, 1.0);
        finite_or(&mut self.style.opacity, 1.0);
        if let Some(text) = &mut self.text {
            finite_or(&mut text.font_size, 12.0);
        }
    }
}

fn point_to_segment_distance(point: (f64, f64), start: (f64, f64), end: (f64, f64)) -> f64 {
    let (lx, ly) = (end.0 - start.0, end.1 - start.1);
    let (px, py) = (point.0 - start.0, point.1 - start.1);
    let len_sq = lx * lx + ly * ly;
    if len_sq < 1e-9 {
        return (px * px + py * py).sqrt();
    }
    let t = ((px * lx + py * ly) / len_sq).clamp(0.0, 1.0);
    let (dx, dy) = (px - lx * t, py - ly * t);
    (dx * dx + dy * dy).sqrt()
}

/// One canvas of drawn objects; a node in the navigation graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Page {
    /// Unique identifier within the project
    pub id: PageId,
    /// User-displayable name
    pub name: String,
    /// Page this one was drilled down from, if any
    pub parent_id: Option<PageId>,
    /// Size and background
    pub settings: PageSettings,
    /// Objects in insertion order
    pub objects: Vec<CanvasObject>,
}

impl Page {
    /// Creates an empty page with a fresh id.
    pub fn new(name: impl Into<String>, settings: PageSettings) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            parent_id: None,
            settings,
            objects: Vec::new(),
        }
    }

    /// Appends an object and returns its id.
    pub fn add_object(&mut self, object: CanvasObject) -> ObjectId {
        let id = object.id.clone();
        self.objects.push(object);
        id
    }

    /// Removes an object, returning its former index and the object.
    pub fn remove_object(&mut self, id: &str) -> Option<(usize, CanvasObject)> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some((index, self.objects.remove(index)))
    }

    /// Looks up an object by id.
    pub fn object(&self, id: &str) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Looks up an object by id for mutation.
    pub fn object_mut(&mut self, id: &str) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Objects sorted by z-index, ties kept in insertion order.
    pub fn objects_in_z_order(&self) -> Vec<&CanvasObject> {
        let mut sorted: Vec<&CanvasObject> = self.objects.iter().collect();
        sorted.sort_by_key(|o| o.z_index);
        sorted
    }

    /// Topmost object under `point`, if any.
    pub fn object_at(&self, point: (f64, f64)) -> Option<&CanvasObject> {
        self.objects_in_z_order()
            .into_iter()
            .rev()
            .find(|o| o.contains(point, constants::LINE_HIT_TOLERANCE))
    }

    /// Raises an object above every other object.
    ///
    /// Returns false if the object is missing or already drawn on top.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        if self.objects_in_z_order().last().is_some_and(|o| o.id == id) {
            return false;
        }
        let top = self.objects.iter().map(|o| o.z_index).max().unwrap_or(0);
        match self.object_mut(id) {
            Some(object) => {
                object.z_index = top + 1;
                true
            }
            None => false,
        }
    }

    /// Lowers an object below every other object.
    ///
    /// Returns false if the object is missing or already drawn at the bottom.
    pub fn send_to_back(&mut self, id: &str) -> bool {
        if self.objects_in_z_order().first().is_some_and(|o| o.id == id) {
            return false;
        }
        let bottom = self.objects.iter().map(|o| o.z_index).min().unwrap_or(0);
        match self.object_mut(id) {
            Some(object) => {
                object.z_index = bottom - 1;
                true
            }
            None => false,
        }
    }

    /// Replaces non-finite numbers in the settings and every object.
    pub fn sanitize(&mut self) {
        self.settings.sanitize();
        for object in &mut self.objects {
            object.sanitize();
        }
    }
}

/// A referential problem found by [`Project::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectIssue {
    /// Two pages share an id
    DuplicatePageId(PageId),
    /// Two objects share an id
    DuplicateObjectId(ObjectId),
    /// A page link points at a page that does not exist
    DanglingPageLink {
        /// Page holding the object
        page_id: PageId,
        /// Object holding the link
        object_id: ObjectId,
        /// Missing target
        target: PageId,
    },
    /// A page names a parent that does not exist
    DanglingParent {
        /// Child page
        page_id: PageId,
        /// Missing parent
        parent_id: PageId,
    },
}

/// Top-level saved document containing all pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Project {
    /// Project name; also the default file stem
    pub name: String,
    /// Directory the project lives in
    pub path: PathBuf,
    /// Settings copied into new pages
    pub page_settings: PageSettings,
    /// Pages in order; the first one is the main page
    pub pages: Vec<Page>,
    /// Recently opened project files
    pub recent_projects: Vec<PathBuf>,
}

impl Project {
    /// Creates a project with a single "Main Page".
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, settings: PageSettings) -> Self {
        let main = Page::new("Main Page", settings.clone());
        Self {
            name: name.into(),
            path: path.into(),
            page_settings: settings,
            pages: vec![main],
            recent_projects: Vec::new(),
        }
    }

    /// Serialize the project to a JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a project from a JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The first page, which navigation treats as home.
    pub fn main_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    /// Looks up a page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Looks up a page by id for mutation.
    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// Looks up a page by name.
    pub fn page_by_name(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Adds a page using the project's default settings and returns its id.
    pub fn add_page(&mut self, name: impl Into<String>, parent_id: Option<PageId>) -> PageId {
        let mut page = Page::new(name, self.page_settings.clone());
        page.parent_id = parent_id;
        let id = page.id.clone();
        self.pages.push(page);
        id
    }

    /// Removes a page.
    ///
    /// Children are re-parented to the removed page's parent and page links
    /// that targeted it are cleared. The last remaining page cannot be removed.
    pub fn remove_page(&mut self, id: &str) -> Option<Page> {
        if self.pages.len() <= 1 {
            return None;
        }
        let index = self.pages.iter().position(|p| p.id == id)?;
        let removed = self.pages.remove(index);
        for page in &mut self.pages {
            if page.parent_id.as_deref() == Some(id) {
                page.parent_id = removed.parent_id.clone();
            }
            for object in &mut page.objects {
                if object.link.page_id() == Some(id) {
                    log::warn!(
                        "Clearing link from '{}' to removed page '{}'",
                        object.name,
                        removed.name
                    );
                    object.link = Link::None;
                }
            }
        }
        Some(removed)
    }

    /// Direct children of a page, in project order.
    pub fn children(&self, id: &str) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|p| p.parent_id.as_deref() == Some(id))
            .collect()
    }

    /// Pages whose parent is absent or unknown.
    pub fn root_pages(&self) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|p| match &p.parent_id {
                None => true,
                Some(parent) => parent == &p.id || self.page(parent).is_none(),
            })
            .collect()
    }

    /// Depth-first listing of the page tree as `(depth, page id)`.
    ///
    /// Every page appears exactly once; pages only reachable through a parent
    /// cycle are listed at depth zero after the regular roots.
    pub fn page_tree(&self) -> Vec<(usize, PageId)> {
        fn visit(
            project: &Project,
            page: &Page,
            depth: usize,
            seen: &mut HashSet<PageId>,
            out: &mut Vec<(usize, PageId)>,
        ) {
            if !seen.insert(page.id.clone()) {
                return;
            }
            out.push((depth, page.id.clone()));
            for child in project.children(&page.id) {
                visit(project, child, depth + 1, seen, out);
            }
        }

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.pages.len());
        for root in self.root_pages() {
            visit(self, root, 0, &mut seen, &mut out);
        }
        for page in &self.pages {
            visit(self, page, 0, &mut seen, &mut out);
        }
        out
    }

    /// Finds the page holding an object.
    pub fn page_of_object(&self, object_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.object(object_id).is_some())
    }

    /// Links an object to the page called `target_name`.
    ///
    /// When no such page exists a child of the object's page is created with
    /// the same settings. Returns the id of the linked page.
    pub fn link_object_to_page_named(
        &mut self,
        page_id: &str,
        object_id: &str,
        target_name: &str,
    ) -> Result<PageId> {
        let page = self
            .page(page_id)
            .ok_or_else(|| ExploderError::PageNotFound(page_id.to_string()))?;
        if page.object(object_id).is_none() {
            return Err(ExploderError::ObjectNotFound(object_id.to_string()));
        }

        let target_id = match self.page_by_name(target_name) {
            Some(existing) => existing.id.clone(),
            None => {
                let mut child = Page::new(target_name, page.settings.clone());
                child.parent_id = Some(page_id.to_string());
                let id = child.id.clone();
                log::info!("Created page '{}' under '{}'", target_name, page.name);
                self.pages.push(child);
                id
            }
        };

        if let Some(object) = self
            .page_mut(page_id)
            .and_then(|p| p.object_mut(object_id))
        {
            object.link = Link::Page {
                page_id: target_id.clone(),
            };
        }
        Ok(target_id)
    }

    /// Reports duplicate ids and dangling page references.
    pub fn validate(&self) -> Vec<ProjectIssue> {
        let mut issues = Vec::new();
        let mut page_ids = HashSet::new();
        let mut object_ids = HashSet::new();

        for page in &self.pages {
            if !page_ids.insert(page.id.as_str()) {
                issues.push(ProjectIssue::DuplicatePageId(page.id.clone()));
            }
            for object in &page.objects {
                if !object_ids.insert(object.id.as_str()) {
                    issues.push(ProjectIssue::DuplicateObjectId(object.id.clone()));
                }
            }
        }

        for page in &self.pages {
            if let Some(parent) = &page.parent_id {
                if self.page(parent).is_none() {
                    issues.push(ProjectIssue::DanglingParent {
                        page_id: page.id.clone(),
                        parent_id: parent.clone(),
                    });
                }
            }
            for object in &page.objects {
                if let Some(target) = object.link.page_id() {
                    if self.page(target).is_none() {
                        issues.push(ProjectIssue::DanglingPageLink {
                            page_id: page.id.clone(),
                            object_id: object.id.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }
        issues
    }

    /// Replaces non-finite numbers everywhere in the project.
    pub fn sanitize(&mut self) {
        self.page_settings.sanitize();
        for page in &mut self.pages {
            page.sanitize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_project() -> Project {
        let mut project = Project::new("Plant", "/tmp/plant", PageSettings::default());
        let main_id = project.pages[0].id.clone();
        let pump_id = project.add_page("Pump", Some(main_id.clone()));

        let mut button = CanvasObject::with_box(ObjectKind::Button, 10.0, 10.0, 100.0, 40.0);
        button.name = "Open pump".to_string();
        button.text = Some(TextStyle::new("Pump"));
        button.link = Link::Page {
            page_id: pump_id.clone(),
        };
        project.pages[0].add_object(button);

        let mut manual = CanvasObject::with_box(ObjectKind::Rectangle, 200.0, 10.0, 50.0, 50.0);
        manual.link = Link::Document {
            path: PathBuf::from("docs/pump.pdf"),
            file_type: DocumentKind::Pdf,
        };
        project.page_mut(&pump_id).unwrap().add_object(manual);
        project
    }

    #[test]
    fn test_new_project_has_main_page() {
        let settings = PageSettings::for_size(PageSize::A3, Orientation::Landscape);
        let project = Project::new("Test Project", "/tmp", settings.clone());

        assert_eq!(project.name, "Test Project");
        assert_eq!(project.pages.len(), 1);
        let main = project.main_page().unwrap();
        assert_eq!(main.name, "Main Page");
        assert_eq!(main.settings, settings);
        assert!(main.parent_id.is_none());
        assert!(!main.id.is_empty());
    }

    #[test]
    fn test_page_settings_for_size_swaps_landscape() {
        let portrait = PageSettings::for_size(PageSize::Letter, Orientation::Portrait);
        assert_eq!((portrait.width, portrait.height), (216.0, 279.0));

        let landscape = PageSettings::for_size(PageSize::A4, Orientation::Landscape);
        assert_eq!((landscape.width, landscape.height), (297.0, 210.0));
        assert_eq!(landscape.margin_size, 20.0);
    }

    #[test]
    fn test_project_roundtrip_serialization() {
        let mut project = sample_project();
        project.recent_projects.push(PathBuf::from("/tmp/other.exp"));
        let page = &mut project.pages[0];
        let mut line = CanvasObject::new(
            ObjectKind::Line,
            Geometry::Line {
                x1: 1.0,
                y1: 2.0,
                x2: 3.0,
                y2: 4.0,
            },
        );
        line.group_id = Some("g1".to_string());
        line.z_index = 7;
        line.link = Link::ExcelData {
            range: ExcelRange {
                file_path: PathBuf::from("data.xlsx"),
                sheet_name: "Sheet1".to_string(),
                cell_range: "A1:B10".to_string(),
                is_relative: true,
            },
        };
        page.add_object(line);
        let mut image = CanvasObject::with_box(ObjectKind::Image, 0.0, 0.0, 10.0, 10.0);
        image.image = Some(PathBuf::from("logo.png"));
        image.link = Link::Url {
            url: "https://example.com".to_string(),
        };
        page.add_object(image);

        let json = project.to_json().unwrap();
        let restored = Project::from_json(&json).unwrap();

        assert_eq!(restored, project);
    }

    #[test]
    fn test_link_json_is_tagged() {
        let link = Link::Page {
            page_id: "p1".to_string(),
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["type"], "Page");
        assert_eq!(value["page_id"], "p1");

        let none: Link = serde_json::from_str(r#"{"type":"None"}"#).unwrap();
        assert_eq!(none, Link::None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let project: Project =
            Project::from_json(r#"{"name":"Sparse","pages":[{"id":"a","objects":[{"id":"o"}]}]}"#)
                .unwrap();
        let object = &project.pages[0].objects[0];
        assert_eq!(object.style, Style::default());
        assert_eq!(object.link, Link::None);
        assert_eq!(project.pages[0].settings, PageSettings::default());
    }

    #[test]
    fn test_sanitize_replaces_non_finite_values() {
        let mut object = CanvasObject::with_box(ObjectKind::Text, f64::NAN, 5.0, f64::INFINITY, 3.0);
        object.style.stroke_thickness = f64::NAN;
        object.style.opacity = f64::NEG_INFINITY;
        object.text = Some(TextStyle {
            font_size: f64::NAN,
            ..TextStyle::default()
        });
        let mut line = CanvasObject::new(
            ObjectKind::Line,
            Geometry::Line {
                x1: f64::INFINITY,
                y1: 1.0,
                x2: 2.0,
                y2: f64::NAN,
            },
        );

        object.sanitize();
        line.sanitize();

        assert_eq!(
            object.geometry,
            Geometry::Box {
                left: 0.0,
                top: 5.0,
                width: 0.0,
                height: 3.0
            }
        );
        assert_eq!(object.style.stroke_thickness, 1.0);
        assert_eq!(object.style.opacity, 1.0);
        assert_eq!(object.text.as_ref().unwrap().font_size, 12.0);
        assert_eq!(
            line.geometry,
            Geometry::Line {
                x1: 0.0,
                y1: 1.0,
                x2: 2.0,
                y2: 0.0
            }
        );
    }

    #[test]
    fn test_project_sanitize_reaches_pages_and_settings() {
        let mut project = sample_project();
        project.page_settings.margin_size = f64::NAN;
        project.pages[1].settings.width = f64::INFINITY;
        project.pages[1].objects[0].style.opacity = f64::NAN;

        project.sanitize();

        assert_eq!(project.page_settings.margin_size, 0.0);
        assert_eq!(project.pages[1].settings.width, 0.0);
        assert_eq!(project.pages[1].objects[0].style.opacity, 1.0);
        assert!(project.to_json().is_ok());
    }

    #[test]
    fn test_object_hit_testing() {
        let rect = CanvasObject::with_box(ObjectKind::Rectangle, 10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains((15.0, 15.0), 0.0));
        assert!(!rect.contains((35.0, 15.0), 0.0));

        let circle = CanvasObject::with_box(ObjectKind::Circle, 0.0, 0.0, 20.0, 20.0);
        assert!(circle.contains((10.0, 10.0), 0.0));
        assert!(!circle.contains((1.0, 1.0), 0.0));

        let line = CanvasObject::new(
            ObjectKind::Line,
            Geometry::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 100.0,
                y2: 0.0,
            },
        );
        assert!(line.contains((50.0, 3.0), 5.0));
        assert!(!line.contains((50.0, 10.0), 5.0));
    }

    #[test]
    fn test_negative_box_bounds_are_normalized() {
        let object = CanvasObject::with_box(ObjectKind::Rectangle, 50.0, 50.0, -20.0, -10.0);
        assert_eq!(object.bounds(), (30.0, 40.0, 20.0, 10.0));
        assert!(object.contains((35.0, 45.0), 0.0));
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut page = Page::new("P", PageSettings::default());
        let mut below = CanvasObject::with_box(ObjectKind::Rectangle, 0.0, 0.0, 50.0, 50.0);
        below.z_index = 5;
        let below_id = page.add_object(below);
        let above_id = page.add_object(CanvasObject::with_box(
            ObjectKind::Rectangle,
            0.0,
            0.0,
            50.0,
            50.0,
        ));

        assert_eq!(page.object_at((10.0, 10.0)).unwrap().id, below_id);

        assert!(page.bring_to_front(&above_id));
        assert_eq!(page.object_at((10.0, 10.0)).unwrap().id, above_id);

        assert!(page.send_to_back(&above_id));
        assert_eq!(page.object_at((10.0, 10.0)).unwrap().id, below_id);
        assert!(page.object_at((100.0, 100.0)).is_none());
        assert!(!page.bring_to_front("missing"));
    }

    #[test]
    fn test_reordering_an_object_already_in_place_changes_nothing() {
        let mut page = Page::new("P", PageSettings::default());
        let first = page.add_object(CanvasObject::with_box(ObjectKind::Rectangle, 0.0, 0.0, 5.0, 5.0));
        let second = page.add_object(CanvasObject::with_box(ObjectKind::Rectangle, 0.0, 0.0, 5.0, 5.0));

        assert!(!page.bring_to_front(&second));
        assert!(!page.send_to_back(&first));
        assert!(page.objects.iter().all(|o| o.z_index == 0));
    }

    #[test]
    fn test_remove_object_reports_index() {
        let mut page = Page::new("P", PageSettings::default());
        page.add_object(CanvasObject::with_box(ObjectKind::Rectangle, 0.0, 0.0, 1.0, 1.0));
        let id = page.add_object(CanvasObject::with_box(ObjectKind::Circle, 0.0, 0.0, 1.0, 1.0));

        let (index, removed) = page.remove_object(&id).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.kind, ObjectKind::Circle);
        assert!(page.remove_object(&id).is_none());
    }

    #[test]
    fn test_page_tree_orders_children_under_parents() {
        let mut project = sample_project();
        let main_id = project.pages[0].id.clone();
        let pump_id = project.pages[1].id.clone();
        let valve_id = project.add_page("Valve", Some(pump_id.clone()));
        let orphan_id = project.add_page("Orphan", Some("nowhere".to_string()));

        let tree = project.page_tree();
        assert_eq!(
            tree,
            vec![
                (0, main_id),
                (1, pump_id),
                (2, valve_id),
                (0, orphan_id)
            ]
        );
    }

    #[test]
    fn test_page_tree_survives_parent_cycles() {
        let mut project = Project::new("Cycle", "", PageSettings::default());
        let a = project.add_page("A", None);
        let b = project.add_page("B", Some(a.clone()));
        project.page_mut(&a).unwrap().parent_id = Some(b.clone());

        let tree = project.page_tree();
        assert_eq!(tree.len(), 3);
        assert!(tree.iter().any(|(_, id)| id == &a));
        assert!(tree.iter().any(|(_, id)| id == &b));
    }

    #[test]
    fn test_link_object_to_page_named_creates_child() {
        let mut project = sample_project();
        let main_id = project.pages[0].id.clone();
        let object_id = project.pages[0].objects[0].id.clone();

        let new_id = project
            .link_object_to_page_named(&main_id, &object_id, "Details")
            .unwrap();

        let created = project.page(&new_id).unwrap();
        assert_eq!(created.name, "Details");
        assert_eq!(created.parent_id.as_deref(), Some(main_id.as_str()));
        assert_eq!(
            project.pages[0].objects[0].link.page_id(),
            Some(new_id.as_str())
        );

        // Linking by an existing name reuses the page.
        let again = project
            .link_object_to_page_named(&main_id, &object_id, "Details")
            .unwrap();
        assert_eq!(again, new_id);
        assert_eq!(project.pages.len(), 3);
    }

    #[test]
    fn test_link_object_to_page_named_rejects_unknown_ids() {
        let mut project = sample_project();
        let main_id = project.pages[0].id.clone();
        assert!(matches!(
            project.link_object_to_page_named("nope", "x", "Y"),
            Err(ExploderError::PageNotFound(_))
        ));
        assert!(matches!(
            project.link_object_to_page_named(&main_id, "x", "Y"),
            Err(ExploderError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_remove_page_clears_links_and_reparents() {
        let mut project = sample_project();
        let main_id = project.pages[0].id.clone();
        let pump_id = project.pages[1].id.clone();
        let valve_id = project.add_page("Valve", Some(pump_id.clone()));

        let removed = project.remove_page(&pump_id).unwrap();

        assert_eq!(removed.name, "Pump");
        assert_eq!(project.pages[0].objects[0].link, Link::None);
        assert_eq!(
            project.page(&valve_id).unwrap().parent_id.as_deref(),
            Some(main_id.as_str())
        );
        assert!(project.validate().is_empty());
    }

    #[test]
    fn test_last_page_cannot_be_removed() {
        let mut project = Project::new("Solo", "", PageSettings::default());
        let id = project.pages[0].id.clone();
        assert!(project.remove_page(&id).is_none());
        assert_eq!(project.pages.len(), 1);
    }

    #[test]
    fn test_validate_reports_referential_problems() {
        let mut project = sample_project();
        assert!(project.validate().is_empty());

        let main_id = project.pages[0].id.clone();
        project.pages[0].objects[0].link = Link::Page {
            page_id: "ghost".to_string(),
        };
        let duplicate = project.pages[0].objects[0].clone();
        project.pages[1].objects.push(duplicate.clone());
        project.pages[1].parent_id = Some("missing-parent".to_string());

        let issues = project.validate();
        assert!(issues.contains(&ProjectIssue::DuplicateObjectId(duplicate.id.clone())));
        assert!(issues.contains(&ProjectIssue::DanglingPageLink {
            page_id: main_id,
            object_id: duplicate.id.clone(),
            target: "ghost".to_string(),
        }));
        assert!(issues
            .iter()
            .any(|i| matches!(i, ProjectIssue::DanglingParent { parent_id, .. } if parent_id == "missing-parent")));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFFFFF"), Some([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("#f00"), Some([255, 0, 0, 255]));
        assert_eq!(parse_hex_color("#80102030"), Some([16, 32, 48, 128]));
        assert_eq!(parse_hex_color("#00000000"), Some([0, 0, 0, 0]));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_document_kind_extensions() {
        assert!(DocumentKind::Video.extensions().contains(&"mp4"));
        assert_eq!(DocumentKind::Pdf.extensions(), &["pdf"]);
        assert!(DocumentKind::Unspecified.extensions().is_empty());
    }
}
