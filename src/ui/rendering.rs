//! Canvas rendering for the page background, grid, and objects.
//!
//! Objects are painted in z-order on top of the page sheet. Selection and
//! drag state are drawn as outlines around the object bounds.

use super::state::{AppMode, ExploderApp};
use crate::constants::{GRID_SIZE, PAGE_UNITS_PER_MM};
use crate::links::resolve_path;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Segments used to approximate ellipses.
const ELLIPSE_SEGMENTS: usize = 48;

/// Converts a hex colour string to a colour, scaling alpha by `opacity`.
pub fn color_from_hex(text: &str, opacity: f64, fallback: egui::Color32) -> egui::Color32 {
    let [r, g, b, a] = parse_hex_color(text).unwrap_or([
        fallback.r(),
        fallback.g(),
        fallback.b(),
        fallback.a(),
    ]);
    let alpha = (f64::from(a) * opacity.clamp(0.0, 1.0)).round() as u8;
    egui::Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Textures for image objects, keyed by resolved file path.
///
/// A path that failed to load is remembered as `None` so it is not retried
/// every frame; the object is drawn as a placeholder instead.
#[derive(Default)]
pub struct ImageCache {
    textures: HashMap<PathBuf, Option<egui::TextureHandle>>,
}

impl ImageCache {
    /// Loads `path` into a texture unless it was tried before.
    pub fn load(&mut self, ctx: &egui::Context, path: &Path) {
        if self.textures.contains_key(path) {
            return;
        }
        let texture = match load_color_image(path) {
            Ok(image) => {
                log::debug!("Loaded image {}", path.display());
                Some(ctx.load_texture(
                    path.display().to_string(),
                    image,
                    egui::TextureOptions::LINEAR,
                ))
            }
            Err(e) => {
                log::warn!("Failed to load image {}: {}", path.display(), e);
                None
            }
        };
        self.textures.insert(path.to_path_buf(), texture);
    }

    /// The texture for `path`, if it loaded.
    pub fn get(&self, path: &Path) -> Option<&egui::TextureHandle> {
        self.textures.get(path).and_then(Option::as_ref)
    }

    /// Whether loading `path` has been attempted.
    pub fn contains(&self, path: &Path) -> bool {
        self.textures.contains_key(path)
    }

    /// Forgets every texture.
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// Decodes an image file into RGBA pixels for egui.
fn load_color_image(path: &Path) -> Result<egui::ColorImage, image::ImageError> {
    let rgba = image::open(path)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

impl ExploderApp {
    /// Image file an object shows, resolved against the project directory.
    pub fn image_path(&self, object: &CanvasObject) -> Option<PathBuf> {
        let path = object.image.as_ref().filter(|p| !p.as_os_str().is_empty())?;
        Some(resolve_path(path, &self.project.path))
    }

    /// Loads textures for the image objects on the current page.
    pub fn load_page_images(&mut self, ctx: &egui::Context) {
        let paths: Vec<PathBuf> = self
            .current_page()
            .map(|page| {
                page.objects
                    .iter()
                    .filter(|o| o.kind == ObjectKind::Image)
                    .filter_map(|o| self.image_path(o))
                    .collect()
            })
            .unwrap_or_default();
        for path in paths {
            self.image_cache.load(ctx, &path);
        }
    }

    /// Renders the current page: background sheet, grid, then objects.
    pub fn render_page(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let Some(page) = self.current_page() else {
            return;
        };

        let page_rect = egui::Rect::from_min_max(
            self.world_to_screen(egui::Pos2::ZERO),
            self.world_to_screen(self.page_extent().to_pos2()),
        );
        let background = color_from_hex(&page.settings.background_color, 1.0, egui::Color32::WHITE);
        painter.rect_filled(page_rect, 0.0, background);
        painter.rect_stroke(
            page_rect,
            0.0,
            egui::Stroke::new(1.0, egui::Color32::GRAY),
            StrokeKind::Outside,
        );

        let margin = page.settings.margin_size as f32 * PAGE_UNITS_PER_MM * self.canvas.zoom_factor;
        if margin > 0.0 && self.mode == AppMode::Edit {
            let margin_rect = page_rect.shrink(margin);
            if margin_rect.is_positive() {
                painter.rect_stroke(
                    margin_rect,
                    0.0,
                    egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(100, 149, 237, 60)),
                    StrokeKind::Inside,
                );
            }
        }

        if self.canvas.show_grid && page.settings.show_grid {
            self.draw_grid(painter, page_rect.intersect(canvas_rect));
        }

        for object in page.objects_in_z_order() {
            self.draw_object(painter, object);
        }
    }

    /// Draws grid lines within `clip_rect`.
    pub fn draw_grid(&self, painter: &egui::Painter, clip_rect: egui::Rect) {
        if !clip_rect.is_positive() {
            return;
        }
        let screen_grid_size = GRID_SIZE * self.canvas.zoom_factor;
        if screen_grid_size < 2.0 {
            return;
        }

        let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32));
        let top_left_world = self.screen_to_world(clip_rect.min);
        let bottom_right_world = self.screen_to_world(clip_rect.max);

        let mut x = (top_left_world.x / GRID_SIZE).ceil() * GRID_SIZE;
        while x <= bottom_right_world.x {
            let screen_x = self.world_to_screen(egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(screen_x, clip_rect.min.y),
                    egui::pos2(screen_x, clip_rect.max.y),
                ],
                stroke,
            );
            x += GRID_SIZE;
        }

        let mut y = (top_left_world.y / GRID_SIZE).ceil() * GRID_SIZE;
        while y <= bottom_right_world.y {
            let screen_y = self.world_to_screen(egui::pos2(0.0, y)).y;
            painter.line_segment(
                [
                    egui::pos2(clip_rect.min.x, screen_y),
                    egui::pos2(clip_rect.max.x, screen_y),
                ],
                stroke,
            );
            y += GRID_SIZE;
        }
    }

    /// Screen rectangle covering an object's bounds.
    fn object_screen_rect(&self, object: &CanvasObject) -> egui::Rect {
        let (left, top, width, height) = object.bounds();
        let min = self.world_to_screen(egui::pos2(left as f32, top as f32));
        let max = self.world_to_screen(egui::pos2((left + width) as f32, (top + height) as f32));
        egui::Rect::from_min_max(min, max)
    }

    /// Draws one object with its text, link marker, and highlight.
    pub fn draw_object(&self, painter: &egui::Painter, object: &CanvasObject) {
        let zoom = self.canvas.zoom_factor;
        let rect = self.object_screen_rect(object);
        let opacity = object.style.opacity;
        let fill = color_from_hex(&object.style.fill_color, opacity, egui::Color32::TRANSPARENT);
        let stroke = egui::Stroke::new(
            (object.style.stroke_thickness as f32 * zoom).max(0.0),
            color_from_hex(&object.style.stroke_color, opacity, egui::Color32::BLACK),
        );

        match object.kind {
            ObjectKind::Rectangle => {
                painter.rect_filled(rect, 0.0, fill);
                painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Inside);
            }
            ObjectKind::RoundedRectangle => {
                let radius = (10.0 * zoom).min(rect.width().min(rect.height()) / 2.0);
                painter.rect_filled(rect, radius, fill);
                painter.rect_stroke(rect, radius, stroke, StrokeKind::Inside);
            }
            ObjectKind::Circle => {
                painter.add(egui::Shape::convex_polygon(ellipse_points(rect), fill, stroke));
            }
            ObjectKind::Triangle => {
                let points = vec![
                    rect.center_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                ];
                painter.add(egui::Shape::convex_polygon(points, fill, stroke));
            }
            ObjectKind::Line => {
                if let Geometry::Line { x1, y1, x2, y2 } = object.geometry {
                    let start = self.world_to_screen(egui::pos2(x1 as f32, y1 as f32));
                    let end = self.world_to_screen(egui::pos2(x2 as f32, y2 as f32));
                    painter.line_segment([start, end], stroke);
                }
            }
            ObjectKind::Text => {
                painter.rect_filled(rect, 0.0, fill);
            }
            ObjectKind::Image => self.draw_image(painter, object, rect, fill, stroke),
            ObjectKind::Button => {
                let radius = 6.0 * zoom;
                let fill = if fill == egui::Color32::TRANSPARENT {
                    egui::Color32::from_rgb(225, 225, 225)
                } else {
                    fill
                };
                painter.rect_filled(rect, radius, fill);
                painter.rect_stroke(rect, radius, stroke, StrokeKind::Inside);
            }
        }

        if let Some(text) = &object.text {
            if !text.text.trim().is_empty() {
                self.draw_object_text(painter, text, rect, opacity);
            }
        }

        if object.link.is_some() {
            self.draw_link_marker(painter, rect);
        }

        self.draw_highlight(painter, object, rect);
    }

    fn draw_image(
        &self,
        painter: &egui::Painter,
        object: &CanvasObject,
        rect: egui::Rect,
        fill: egui::Color32,
        stroke: egui::Stroke,
    ) {
        let texture = self
            .image_path(object)
            .and_then(|path| self.image_cache.get(&path).map(egui::TextureHandle::id));
        let Some(texture) = texture else {
            self.draw_image_placeholder(painter, object, rect, fill, stroke);
            return;
        };

        painter.rect_filled(rect, 0.0, fill);
        let alpha = (255.0 * object.style.opacity.clamp(0.0, 1.0)).round() as u8;
        painter.image(
            texture,
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::from_white_alpha(alpha),
        );
        if stroke.width > 0.0 {
            painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Inside);
        }
    }

    fn draw_image_placeholder(
        &self,
        painter: &egui::Painter,
        object: &CanvasObject,
        rect: egui::Rect,
        fill: egui::Color32,
        stroke: egui::Stroke,
    ) {
        painter.rect_filled(rect, 0.0, fill);
        let outline = egui::Stroke::new(stroke.width.max(1.0), egui::Color32::GRAY);
        painter.rect_stroke(rect, 0.0, outline, StrokeKind::Inside);
        painter.line_segment([rect.left_top(), rect.right_bottom()], outline);
        painter.line_segment([rect.right_top(), rect.left_bottom()], outline);

        let label = object
            .image
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Image".to_string());
        let font_id = egui::FontId::proportional((11.0 * self.canvas.zoom_factor).clamp(8.0, 48.0));
        painter.text(
            rect.center_bottom() - egui::vec2(0.0, 4.0 * self.canvas.zoom_factor),
            egui::Align2::CENTER_BOTTOM,
            label,
            font_id,
            egui::Color32::DARK_GRAY,
        );
    }

    /// Draws wrapped, centred text inside `rect`.
    fn draw_object_text(
        &self,
        painter: &egui::Painter,
        text: &TextStyle,
        rect: egui::Rect,
        opacity: f64,
    ) {
        let zoom = self.canvas.zoom_factor;
        let font_size = (text.font_size as f32 * zoom).clamp(6.0, 96.0);
        let font_id = match text.font_family.to_ascii_lowercase().as_str() {
            "consolas" | "courier new" | "monospace" => egui::FontId::monospace(font_size),
            _ => egui::FontId::proportional(font_size),
        };
        let color = color_from_hex(&text.text_color, opacity, egui::Color32::BLACK);

        let max_width = (rect.width() - 8.0 * zoom).max(font_size);
        let lines = self.wrap_text(&text.text, max_width, &font_id, painter);
        let line_height = painter.fonts_mut(|f| f.row_height(&font_id));
        let total_height = line_height * lines.len() as f32;
        let start_y = rect.center().y - total_height / 2.0 + line_height / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let pos = egui::pos2(rect.center().x, start_y + i as f32 * line_height);
            painter.text(pos, egui::Align2::CENTER_CENTER, line, font_id.clone(), color);
            if text.font_weight == FontWeight::Bold {
                painter.text(
                    pos + egui::vec2(0.6, 0.0),
                    egui::Align2::CENTER_CENTER,
                    line,
                    font_id.clone(),
                    color,
                );
            }
        }
    }

    fn draw_link_marker(&self, painter: &egui::Painter, rect: egui::Rect) {
        let radius = (4.0 * self.canvas.zoom_factor).clamp(3.0, 8.0);
        let center = rect.right_top() + egui::vec2(-radius - 2.0, radius + 2.0);
        painter.circle_filled(center, radius, egui::Color32::from_rgb(30, 144, 255));
    }

    fn draw_highlight(&self, painter: &egui::Painter, object: &CanvasObject, rect: egui::Rect) {
        let id = Some(&object.id);
        let stroke = if id == self.interaction.dragging_object.as_ref() {
            egui::Stroke::new(4.0, egui::Color32::from_rgb(255, 165, 0))
        } else if id == self.interaction.selected_object.as_ref() && self.mode == AppMode::Edit {
            egui::Stroke::new(3.0, egui::Color32::YELLOW)
        } else {
            return;
        };
        painter.rect_stroke(rect.expand(2.0), 0.0, stroke, StrokeKind::Outside);
    }

    /// Wraps text to fit within `max_width`, breaking at word boundaries.
    ///
    /// Explicit line breaks are kept. A single word wider than the limit gets
    /// its own line.
    pub fn wrap_text(
        &self,
        text: &str,
        max_width: f32,
        font_id: &egui::FontId,
        painter: &egui::Painter,
    ) -> Vec<String> {
        let mut lines = Vec::new();

        for paragraph in text.lines() {
            let mut current_line = String::new();
            for word in paragraph.split_whitespace() {
                let test_line = if current_line.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", current_line, word)
                };

                let text_width = painter.fonts_mut(|f| {
                    f.layout_no_wrap(test_line.clone(), font_id.clone(), egui::Color32::BLACK)
                        .size()
                        .x
                });

                if text_width <= max_width {
                    current_line = test_line;
                } else if !current_line.is_empty() {
                    lines.push(current_line);
                    current_line = word.to_string();
                } else {
                    lines.push(word.to_string());
                }
            }
            lines.push(current_line);
        }

        if lines.is_empty() {
            lines.push(text.to_string());
        }

        lines
    }
}

/// Polygon approximating the ellipse inscribed in `rect`.
fn ellipse_points(rect: egui::Rect) -> Vec<egui::Pos2> {
    let center = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let angle = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
            egui::pos2(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex_scales_alpha_by_opacity() {
        let color = color_from_hex("#FF0000", 0.5, egui::Color32::BLACK);
        assert_eq!(color, egui::Color32::from_rgba_unmultiplied(255, 0, 0, 128));
    }

    #[test]
    fn test_color_from_hex_falls_back_on_bad_input() {
        let color = color_from_hex("not a colour", 1.0, egui::Color32::WHITE);
        assert_eq!(color, egui::Color32::WHITE);
    }

    #[test]
    fn test_load_color_image_reads_png_and_rejects_garbage() {
        let dir = std::env::temp_dir().join(format!("exploder-img-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let png = dir.join("dot.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&png)
            .unwrap();
        let garbage = dir.join("broken.png");
        std::fs::write(&garbage, b"not an image").unwrap();

        let loaded = load_color_image(&png).unwrap();
        assert_eq!(loaded.size, [3, 2]);
        assert!(load_color_image(&garbage).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ellipse_points_stay_inside_rect() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(100.0, 40.0));
        let points = ellipse_points(rect);
        assert_eq!(points.len(), ELLIPSE_SEGMENTS);
        assert!(points.iter().all(|p| rect.expand(0.01).contains(*p)));
    }
}
