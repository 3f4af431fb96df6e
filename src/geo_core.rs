//! Base types for geospatial bookkeeping: CRS, bounding boxes, output paths.
//!
//! Everything downstream works in a single planar CRS (EPSG:28992, RD New),
//! which the PDOK services deliver natively, so no reprojection step exists
//! in the pipeline.

use geo::Rect;

/// EPSG code of the Dutch national planar CRS (Amersfoort / RD New).
pub const RD_NEW_EPSG: i32 = 28992;

/// Carries the CRS and output-path settings shared by the collection and
/// geometry layers.
#[derive(Clone)]
pub struct GeoCore {
    /// EPSG code of the working CRS
    pub epsg: i32,
    /// Output path for rendered or exported data
    pub output_path: Option<String>,
}

impl GeoCore {
    pub fn new(epsg: i32) -> Self {
        GeoCore {
            epsg,
            output_path: None,
        }
    }

    pub fn get_epsg(&self) -> i32 {
        self.epsg
    }

    pub fn set_epsg(&mut self, epsg: i32) {
        self.epsg = epsg;
    }

    pub fn get_output_path(&self) -> Option<&String> {
        self.output_path.as_ref()
    }

    pub fn set_output_path(&mut self, output_path: Option<String>) {
        self.output_path = output_path;
    }
}

impl Default for GeoCore {
    fn default() -> Self {
        GeoCore::new(RD_NEW_EPSG)
    }
}

/// Axis-aligned bounding box in the working planar CRS.
/// Invariant: `min_x <= max_x`, `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Grow this box so it also covers `other`.
    pub fn expand_to_include(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// A copy of this box padded on every side by `fraction` of the larger
    /// dimension. Used for the full-extent rest view so the outline does not
    /// touch the image border.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = self.width().max(self.height()) * fraction;
        BoundingBox::new(
            self.min_x - pad,
            self.min_y - pad,
            self.max_x + pad,
            self.max_y + pad,
        )
    }

    /// Component-wise linear interpolation between two boxes.
    /// `t = 0` yields `a`, `t = 1` yields `b` up to floating-point rounding;
    /// anchor frames are assigned exactly, never through this function.
    pub fn lerp(a: &BoundingBox, b: &BoundingBox, t: f64) -> Self {
        BoundingBox::new(
            a.min_x + (b.min_x - a.min_x) * t,
            a.min_y + (b.min_y - a.min_y) * t,
            a.max_x + (b.max_x - a.max_x) * t,
            a.max_y + (b.max_y - a.max_y) * t,
        )
    }
}
