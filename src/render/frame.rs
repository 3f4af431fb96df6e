//! Frame rasterization.
//!
//! The static base map (region fills, province borders, label texts) is
//! built once as SVG bodies with the y-axis flipped into screen
//! orientation. Per frame only the viewBox — the camera bounding box — and
//! the label-layer toggle change; the scene is then rasterized with resvg
//! and written as PNG. `preserveAspectRatio` letterboxes any camera box
//! into the configured image size, so the frame plan is used exactly as
//! built.

use std::fmt::Write as _;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo::{Centroid, LineString, MultiPolygon};
use log::debug;
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use tiny_skia::{Color, Pixmap, Transform};
use usvg::fontdb;

use crate::commons::basic_functions::{frame_filename, parse_hex_color};
use crate::error::{TourError, TourResult};
use crate::geo_core::BoundingBox;
use crate::geometric::coloring::palette_color;
use crate::geometric::provinces::ProvinceFeature;
use crate::geometric::regions::RegionFeature;
use crate::render::style::RenderStyle;

/// Renders one PNG per camera bounding box into the output directory.
pub struct FrameRenderer {
    style: RenderStyle,
    output_dir: PathBuf,
    fontdb: Arc<fontdb::Database>,
    base_body: String,
    labels_body: String,
}

impl FrameRenderer {
    /// Build the static scene and resolve the label font. Fails fast when
    /// the requested font (or any system font) cannot be located.
    pub fn new(
        style: RenderStyle,
        output_dir: PathBuf,
        regions: &[RegionFeature],
        colors: &[usize],
        provinces: &[ProvinceFeature],
    ) -> TourResult<Self> {
        fs::create_dir_all(&output_dir)?;
        let fontdb = load_fonts(&style)?;
        let base_body = build_base_body(regions, colors, provinces, &style);
        let labels_body = build_labels_body(regions, &style);
        Ok(FrameRenderer {
            style,
            output_dir,
            fontdb,
            base_body,
            labels_body,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render one frame and write it as `frame_NNNN.png` (1-based index).
    pub fn render_frame(
        &self,
        frame: u32,
        bbox: &BoundingBox,
        with_labels: bool,
    ) -> TourResult<PathBuf> {
        let svg = self.compose_svg(bbox, with_labels);

        let mut options = usvg::Options::default();
        options.fontdb = self.fontdb.clone();
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| TourError::render(frame, format!("scene build failed: {}", e)))?;

        let mut pixmap = Pixmap::new(self.style.width, self.style.height)
            .ok_or_else(|| TourError::render(frame, "pixmap allocation failed"))?;
        let (r, g, b) = parse_hex_color(&self.style.background).unwrap_or((255, 255, 255));
        pixmap.fill(Color::from_rgba8(r, g, b, 255));

        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        let path = self.output_dir.join(frame_filename(frame));
        write_png(&pixmap, &path).map_err(|e| TourError::render(frame, e.to_string()))?;
        debug!("wrote {:?}", path);
        Ok(path)
    }

    fn compose_svg(&self, bbox: &BoundingBox, with_labels: bool) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
             viewBox=\"{}\" preserveAspectRatio=\"xMidYMid meet\">\n",
            self.style.width,
            self.style.height,
            viewbox_attr(bbox)
        );
        svg.push_str(&self.base_body);
        if with_labels {
            svg.push_str(&self.labels_body);
        }
        svg.push_str("</svg>\n");
        svg
    }
}

/// viewBox for a camera box. Map coordinates are y-up, SVG is y-down, so
/// every y in the scene is negated and the box top maps to `-max_y`.
fn viewbox_attr(bbox: &BoundingBox) -> String {
    format!(
        "{:.1} {:.1} {:.1} {:.1}",
        bbox.min_x,
        -bbox.max_y,
        bbox.width(),
        bbox.height()
    )
}

fn load_fonts(style: &RenderStyle) -> TourResult<Arc<fontdb::Database>> {
    let mut db = fontdb::Database::new();
    match &style.font_file {
        Some(path) => {
            let bytes = fs::read(path).map_err(|_| {
                TourError::ResourceUnavailable(format!("font file not found: {}", path.display()))
            })?;
            db.load_font_data(bytes);
        }
        None => db.load_system_fonts(),
    }
    if db.is_empty() {
        return Err(TourError::ResourceUnavailable(
            "no usable label font; configure font_file".to_string(),
        ));
    }

    // Map the generic family to the first loaded face so labels always
    // resolve.
    let family = db
        .faces()
        .next()
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()));
    if let Some(name) = family {
        db.set_sans_serif_family(name);
    }
    Ok(Arc::new(db))
}

fn build_base_body(
    regions: &[RegionFeature],
    colors: &[usize],
    provinces: &[ProvinceFeature],
    style: &RenderStyle,
) -> String {
    let mut body = String::new();
    for (index, region) in regions.iter().enumerate() {
        let fill = colors
            .get(index)
            .map(|&c| palette_color(c))
            .unwrap_or("#cccccc");
        let _ = writeln!(
            body,
            "<path d=\"{}\" fill=\"{}\" fill-rule=\"evenodd\" stroke=\"{}\" \
             stroke-width=\"{:.1}\" stroke-linejoin=\"round\"/>",
            multipolygon_path_data(&region.geometry),
            fill,
            style.region_outline,
            style.region_outline_width
        );
    }
    for province in provinces {
        let _ = writeln!(
            body,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.1}\" \
             stroke-linejoin=\"round\"/>",
            multipolygon_path_data(&province.geometry),
            style.province_outline,
            style.province_outline_width
        );
    }
    body
}

fn build_labels_body(regions: &[RegionFeature], style: &RenderStyle) -> String {
    let mut body = String::new();
    for region in regions {
        let Some(centroid) = region.geometry.centroid() else {
            continue;
        };
        let lines: Vec<&str> = region.label.lines().collect();
        let line_count = lines.len() as f64;
        for (index, line) in lines.iter().enumerate() {
            let offset = (index as f64 - (line_count - 1.0) / 2.0) * style.label_line_gap;
            let _ = writeln!(
                body,
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" \
                 font-family=\"sans-serif\" font-size=\"{:.1}\" fill=\"{}\">{}</text>",
                centroid.x(),
                -centroid.y() + offset,
                style.font_size,
                style.label_color,
                svg_escape(line)
            );
        }
    }
    body
}

fn multipolygon_path_data(geometry: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in &geometry.0 {
        ring_path(&mut d, polygon.exterior());
        for interior in polygon.interiors() {
            ring_path(&mut d, interior);
        }
    }
    d
}

fn ring_path(d: &mut String, ring: &LineString<f64>) {
    for (index, coord) in ring.0.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{} {:.1} {:.1} ", command, coord.x, -coord.y);
    }
    d.push_str("Z ");
}

fn svg_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn write_png(pixmap: &Pixmap, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = Encoder::new(file, pixmap.width(), pixmap.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_filter(FilterType::NoFilter);
    encoder.set_compression(Compression::Default);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixmap.data())?;
    Ok(())
}
