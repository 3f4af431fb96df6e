//! Pipeline orchestration: fetch, clean, plan, render.

use std::path::PathBuf;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(all(feature = "rayon", feature = "indicatif"))]
use std::sync::{Arc, Mutex};

#[cfg(feature = "indicatif")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::animate::camera::{CameraPathBuilder, FramePlan};
use crate::collect::global_variables::default_frames_path;
use crate::error::{TourError, TourResult};
use crate::geometric::coloring::{color_indices, REGION_PALETTE};
use crate::geometric::layer_extent;
use crate::geometric::provinces::Provinces;
use crate::geometric::regions::Regions;
use crate::render::frame::FrameRenderer;
use crate::render::style::RenderStyle;

#[cfg(feature = "indicatif")]
fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .unwrap()
        .progress_chars("##-")
}

/// Caller-supplied tour parameters. Loadable from a JSON file; every field
/// has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Province visit order; names as served by the PDOK `naam` attribute
    pub targets: Vec<String>,
    /// Frames spent moving between resting positions
    pub n_transition: u32,
    /// Frames spent holding still on a reached target
    pub n_still: u32,
    /// Directory the frame PNGs are written to
    pub output_dir: PathBuf,
    /// Output image size in pixels
    pub width: u32,
    pub height: u32,
    /// Explicit label font file; None falls back to the system fonts
    pub font_file: Option<PathBuf>,
    /// Label text size in CRS meters
    pub font_size: f64,
    /// Optional local GeoJSON inputs instead of PDOK fetches
    pub provinces_file: Option<PathBuf>,
    pub regions_file: Option<PathBuf>,
    /// Outline simplification tolerance in CRS meters; None disables
    pub simplify_tolerance: Option<f64>,
    /// Padding around the full-extent rest view, as a fraction of its size
    pub margin: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        TourConfig {
            targets: vec![
                "Groningen".to_string(),
                "Fryslân".to_string(),
                "Drenthe".to_string(),
                "Overijssel".to_string(),
                "Flevoland".to_string(),
                "Gelderland".to_string(),
                "Utrecht".to_string(),
                "Noord-Holland".to_string(),
                "Zuid-Holland".to_string(),
                "Zeeland".to_string(),
                "Noord-Brabant".to_string(),
                "Limburg".to_string(),
            ],
            n_transition: 30,
            n_still: 60,
            output_dir: default_frames_path(),
            width: 1280,
            height: 720,
            font_file: None,
            font_size: 2500.0,
            provinces_file: None,
            regions_file: None,
            simplify_tolerance: Some(50.0),
            margin: 0.02,
        }
    }
}

impl TourConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl Into<PathBuf>) -> TourResult<Self> {
        let raw = std::fs::read_to_string(path.into())?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn render_style(&self) -> RenderStyle {
        RenderStyle {
            width: self.width,
            height: self.height,
            font_file: self.font_file.clone(),
            font_size: self.font_size,
            ..RenderStyle::default()
        }
    }
}

/// Outcome of a tour run.
#[derive(Debug)]
pub struct TourSummary {
    pub total_frames: usize,
    pub rendered: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
}

/// The whole pipeline, from fetch to frame files.
pub struct Tour {
    config: TourConfig,
}

impl Tour {
    pub fn new(config: TourConfig) -> Self {
        Tour { config }
    }

    /// Run the pipeline. Fetch, plan, and renderer construction errors are
    /// fatal; individual frame failures are logged and skipped, leaving a
    /// detectable gap in the output sequence.
    pub fn run(&self) -> TourResult<TourSummary> {
        if self.config.n_transition == 0 || self.config.n_still == 0 {
            warn!("n_transition and n_still should be >= 1; zero collapses segments");
        }

        let provinces = Provinces::new(self.config.provinces_file.clone()).run()?;

        let mut regions = Regions::new(self.config.regions_file.clone());
        regions.set_simplify_tolerance(self.config.simplify_tolerance);
        let regions = regions.run()?;

        let geometries = regions.geometries();
        let colors = color_indices(&geometries, REGION_PALETTE.len());

        // The rest view covers all regions, padded so outlines clear the
        // image border.
        let full_extent = layer_extent(geometries.iter())
            .ok_or_else(|| TourError::geometry("regions", "layer has no extent"))?
            .padded(self.config.margin);
        let lookup = provinces.bbox_lookup();

        let plan = CameraPathBuilder::new(full_extent, &lookup)
            .n_transition(self.config.n_transition)
            .n_still(self.config.n_still)
            .build(&self.config.targets)?;
        info!(
            "frame plan: {} frames for {} targets",
            plan.len(),
            self.config.targets.len()
        );

        let renderer = FrameRenderer::new(
            self.config.render_style(),
            self.config.output_dir.clone(),
            regions.features(),
            &colors,
            provinces.features(),
        )?;

        let failed = self.render_all(&renderer, &plan);

        let summary = TourSummary {
            total_frames: plan.len(),
            rendered: plan.len() - failed,
            failed,
            output_dir: self.config.output_dir.clone(),
        };
        info!(
            "rendered {}/{} frames into {:?}",
            summary.rendered, summary.total_frames, summary.output_dir
        );
        Ok(summary)
    }

    /// Render every frame of the plan; returns the number of failures.
    /// Frames are independent, so the loop parallelizes when the `rayon`
    /// feature is enabled; output naming is fixed by the frame index either
    /// way.
    #[cfg(feature = "rayon")]
    fn render_all(
        &self,
        renderer: &FrameRenderer,
        plan: &FramePlan,
    ) -> usize {
        #[cfg(feature = "indicatif")]
        let pb = {
            let pb = ProgressBar::new(plan.len() as u64);
            pb.set_style(progress_style());
            pb.set_message("Frames");
            Some(Arc::new(Mutex::new(pb)))
        };
        #[cfg(not(feature = "indicatif"))]
        let pb: Option<()> = None;

        let failures: usize = plan
            .frames()
            .par_iter()
            .enumerate()
            .map(|(offset, bbox)| {
                let frame = (offset + 1) as u32;
                let result = renderer.render_frame(frame, bbox, plan.show_labels(frame));
                #[cfg(feature = "indicatif")]
                if let Some(ref pb) = pb {
                    pb.lock().unwrap().inc(1);
                }
                #[cfg(not(feature = "indicatif"))]
                let _ = &pb;
                match result {
                    Ok(_) => 0usize,
                    Err(e) => {
                        error!("{e}");
                        1
                    }
                }
            })
            .sum();

        #[cfg(feature = "indicatif")]
        if let Some(ref pb) = pb {
            pb.lock().unwrap().finish_with_message("All frames done");
        }

        failures
    }

    #[cfg(not(feature = "rayon"))]
    fn render_all(
        &self,
        renderer: &FrameRenderer,
        plan: &FramePlan,
    ) -> usize {
        #[cfg(feature = "indicatif")]
        let pb = {
            let pb = ProgressBar::new(plan.len() as u64);
            pb.set_style(progress_style());
            pb.set_message("Frames");
            pb
        };

        let mut failures = 0;
        for (offset, bbox) in plan.frames().iter().enumerate() {
            let frame = (offset + 1) as u32;
            if let Err(e) = renderer.render_frame(frame, bbox, plan.show_labels(frame)) {
                error!("{e}");
                failures += 1;
            }
            #[cfg(feature = "indicatif")]
            pb.inc(1);
        }

        #[cfg(feature = "indicatif")]
        pb.finish_with_message("All frames done");

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TourConfig::default();
        assert_eq!(config.targets.len(), 12);
        assert_eq!(config.n_transition, 30);
        assert_eq!(config.n_still, 60);
        assert_eq!(config.output_dir, PathBuf::from("./frames"));
    }

    #[test]
    fn test_config_partial_json() {
        let config: TourConfig =
            serde_json::from_str(r#"{"targets": ["Zeeland"], "n_transition": 5}"#).unwrap();
        assert_eq!(config.targets, vec!["Zeeland".to_string()]);
        assert_eq!(config.n_transition, 5);
        // Everything else falls back to the defaults.
        assert_eq!(config.n_still, 60);
        assert_eq!(config.width, 1280);
    }

    const PROVINCES_FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"naam": "Utrecht"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[40.0, 40.0], [60.0, 40.0], [60.0, 60.0], [40.0, 60.0], [40.0, 40.0]]]
                }
            }
        ]
    }"#;

    const REGIONS_FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"statnaam": "Utrecht-West"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [50.0, 0.0], [50.0, 100.0], [0.0, 100.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"statnaam": "Utrecht-Oost"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[50.0, 0.0], [100.0, 0.0], [100.0, 100.0], [50.0, 100.0], [50.0, 0.0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn test_offline_tour_renders_frame_sequence() {
        use crate::commons::basic_functions::frame_filename;

        let dir = std::env::temp_dir().join(format!("provtour_tour_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let provinces_path = dir.join("provinces.geojson");
        let regions_path = dir.join("regions.geojson");
        std::fs::write(&provinces_path, PROVINCES_FIXTURE).unwrap();
        std::fs::write(&regions_path, REGIONS_FIXTURE).unwrap();

        let output_dir = dir.join("frames");
        let config = TourConfig {
            targets: vec!["Utrecht".to_string()],
            n_transition: 2,
            n_still: 1,
            output_dir: output_dir.clone(),
            width: 64,
            height: 64,
            provinces_file: Some(provinces_path),
            regions_file: Some(regions_path),
            simplify_tolerance: None,
            ..TourConfig::default()
        };

        // Needs at least one usable font; skip quietly on bare systems.
        let summary = match Tour::new(config).run() {
            Ok(summary) => summary,
            Err(TourError::ResourceUnavailable(_)) => return,
            Err(e) => panic!("tour failed: {e}"),
        };

        assert_eq!(summary.total_frames, 1 + 2 + 1 + 2);
        assert_eq!(summary.failed, 0);
        for frame in 1..=summary.total_frames as u32 {
            assert!(output_dir.join(frame_filename(frame)).exists());
        }
        let _ = std::fs::remove_dir_all(dir);
    }
}
