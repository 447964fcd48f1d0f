//! The per-frame hand detection pipeline.

use anyhow::{bail, ensure};

use crate::{
    detection::{RegionDetector, ScanParams},
    geometry::{Contour, Geometry, Imageproc},
    image::{Image, Mask, Rect},
    num::is_unit_fraction,
    timer::Timer,
};

use super::{
    candidate::{assemble, find_fingers, select_candidate, Candidate},
    finger_graph::FingerGraph,
    fingers::FingerParams,
    mask::{build_mask, restrict_to_detection, suppress_border, Centroid, MaskParams},
};

/// How edge artifacts are removed from the mask before contours are traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Denoise {
    /// Clear the outermost ring of pixels.
    #[default]
    Border,
    /// Erode, then dilate the mask by one pixel. Also removes isolated foreground specks.
    Morphology,
}

/// Parameters of the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerParams {
    /// Minimum channel value of foreground pixels.
    pub depth_threshold: u8,
    /// RGBA channel holding depth or likelihood values.
    pub depth_channel: usize,
    /// Whether to restrict the mask to the largest region found by the region detector.
    ///
    /// Has no effect unless a detector is set with [`HandTracker::set_region_detector`].
    pub detect_regions: bool,
    pub denoise: Denoise,
    /// Whether to build a finger graph and look for fingers.
    pub fingers: bool,
    /// Minimum contour area as a fraction of the frame area.
    pub min_area_fraction: f32,
    /// Polygon simplification tolerance, as a fraction of the contour's point count.
    pub polygon_epsilon: f32,
    /// Number of angular buckets in the finger graph.
    pub graph_resolution: usize,
    pub finger_threshold: f32,
    pub edge_margin: f32,
    pub cluster_span: f32,
    pub scan: ScanParams,
    /// Detector hit groups need more than this many members to be kept.
    pub min_neighbors: usize,
}

impl TrackerParams {
    pub const DEFAULT_MIN_AREA_FRACTION: f32 = 0.05;
    pub const DEFAULT_POLYGON_EPSILON: f32 = 0.005;
    pub const DEFAULT_MIN_NEIGHBORS: usize = 1;

    /// Checks that all parameters are within their valid ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.depth_channel < 4,
            "depth channel must be between 0 and 3, got {}",
            self.depth_channel
        );
        ensure!(
            self.graph_resolution > 0,
            "finger graph resolution must be positive"
        );
        ensure!(
            is_unit_fraction(self.min_area_fraction),
            "minimum area fraction {} is not in 0..=1",
            self.min_area_fraction
        );
        ensure!(
            self.polygon_epsilon.is_finite() && self.polygon_epsilon >= 0.0,
            "invalid polygon epsilon {}",
            self.polygon_epsilon
        );
        ensure!(
            is_unit_fraction(self.finger_threshold),
            "finger threshold {} is not in 0..=1",
            self.finger_threshold
        );
        ensure!(
            self.edge_margin.is_finite() && (0.0..0.5).contains(&self.edge_margin),
            "edge margin {} is not in 0..0.5",
            self.edge_margin
        );
        if !is_unit_fraction(self.cluster_span) || self.cluster_span == 0.0 {
            bail!("cluster span {} is not in (0, 1]", self.cluster_span);
        }
        ensure!(
            self.scan.scale_factor.is_finite() && self.scan.scale_factor > 1.0,
            "scan scale factor must be greater than 1, got {}",
            self.scan.scale_factor
        );
        ensure!(
            self.scan.scale_min.is_finite() && self.scan.scale_min > 0.0,
            "minimum scan scale must be positive, got {}",
            self.scan.scale_min
        );
        Ok(())
    }

    /// Returns the parameters of the mask stage.
    pub fn mask_params(&self) -> MaskParams {
        MaskParams {
            threshold: self.depth_threshold,
            channel: self.depth_channel,
        }
    }

    /// Returns the parameters of the finger extractor.
    pub fn finger_params(&self) -> FingerParams {
        FingerParams {
            threshold: self.finger_threshold,
            edge_margin: self.edge_margin,
            cluster_span: self.cluster_span,
        }
    }
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            depth_threshold: MaskParams::DEFAULT_THRESHOLD,
            depth_channel: MaskParams::DEFAULT_CHANNEL,
            detect_regions: false,
            denoise: Denoise::default(),
            fingers: true,
            min_area_fraction: Self::DEFAULT_MIN_AREA_FRACTION,
            polygon_epsilon: Self::DEFAULT_POLYGON_EPSILON,
            graph_resolution: FingerGraph::DEFAULT_RESOLUTION,
            finger_threshold: FingerParams::DEFAULT_THRESHOLD,
            edge_margin: FingerParams::DEFAULT_EDGE_MARGIN,
            cluster_span: FingerParams::DEFAULT_CLUSTER_SPAN,
            scan: ScanParams::default(),
            min_neighbors: Self::DEFAULT_MIN_NEIGHBORS,
        }
    }
}

/// Everything computed for one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The mask after region restriction and denoising.
    pub mask: Mask,
    /// Centroid of the foreground before region restriction.
    pub centroid: Option<Centroid>,
    /// Regions found by the region detector, largest first.
    pub rects: Vec<Rect>,
    /// All outer contours traced in `mask`.
    pub contours: Vec<Contour>,
    pub candidate: Option<Candidate>,
}

struct Timers {
    mask: Timer,
    denoise: Timer,
    contours: Timer,
    fingers: Timer,
    assembly: Timer,
}

impl Timers {
    fn new() -> Self {
        Self {
            mask: Timer::new("mask"),
            denoise: Timer::new("denoise"),
            contours: Timer::new("contours"),
            fingers: Timer::new("fingers"),
            assembly: Timer::new("assembly"),
        }
    }
}

/// Detects the hand in `image` without keeping any state.
///
/// `detector` is only used if [`TrackerParams::detect_regions`] is set. Frames can be processed
/// concurrently by calling this function from several threads.
///
/// # Panics
///
/// Panics if `params` do not pass [`TrackerParams::validate`].
pub fn detect_hand(
    image: &Image,
    params: &TrackerParams,
    geometry: &dyn Geometry,
    detector: Option<&dyn RegionDetector>,
) -> Frame {
    process(image, params, geometry, detector, &Timers::new())
}

fn process(
    image: &Image,
    params: &TrackerParams,
    geometry: &dyn Geometry,
    detector: Option<&dyn RegionDetector>,
    timers: &Timers,
) -> Frame {
    let mut result = timers.mask.time(|| {
        let mut result = build_mask(image, &params.mask_params());
        match (params.detect_regions, detector) {
            (true, Some(detector)) => {
                restrict_to_detection(&mut result, detector, &params.scan, params.min_neighbors)
            }
            (true, None) => log::debug!("region detection enabled, but no region detector set"),
            (false, _) => {}
        }
        result
    });

    timers.denoise.time(|| match params.denoise {
        Denoise::Border => suppress_border(&mut result.mask),
        Denoise::Morphology => {
            result.mask = geometry.dilate(&geometry.erode(&result.mask));
        }
    });

    let contours = timers
        .contours
        .time(|| geometry.trace_contours(&result.mask));

    let resolution = image.resolution();
    let min_area = resolution.num_pixels() as f32 * params.min_area_fraction;
    let candidate = match (result.centroid, select_candidate(&contours, min_area, geometry)) {
        (Some(centroid), Some(contour)) => {
            let fingers = params.fingers.then(|| {
                timers.fingers.time(|| {
                    find_fingers(
                        contour,
                        centroid,
                        resolution,
                        params.graph_resolution,
                        &params.finger_params(),
                    )
                })
            });
            let candidate = timers.assembly.time(|| {
                assemble(
                    contour,
                    centroid,
                    result.rects.clone(),
                    params.polygon_epsilon,
                    fingers,
                    geometry,
                )
            });
            Some(candidate)
        }
        (None, _) => {
            log::debug!("no foreground in {resolution} frame");
            None
        }
        (_, None) => {
            log::debug!(
                "none of {} contours covers {min_area} pixels",
                contours.len()
            );
            None
        }
    };

    if let Some(candidate) = &candidate {
        log::debug!(
            "hand at ({:.1}, {:.1}): {} fingers, {} defects",
            candidate.centroid().x,
            candidate.centroid().y,
            candidate.fingers().len(),
            candidate.defects().len(),
        );
    }

    Frame {
        mask: result.mask,
        centroid: result.centroid,
        rects: result.rects,
        contours,
        candidate,
    }
}

/// Detects a hand in a stream of frames.
///
/// The tracker holds the pipeline's parameters and collaborators, and keeps the mask and
/// contours of the last frame for inspection. It does not carry any detection results over from
/// one frame to the next.
pub struct HandTracker {
    params: TrackerParams,
    geometry: Box<dyn Geometry>,
    detector: Option<Box<dyn RegionDetector>>,
    mask: Mask,
    contours: Vec<Contour>,
    timers: Timers,
}

impl HandTracker {
    /// Creates a tracker using the [`Imageproc`] geometry backend.
    pub fn new(params: TrackerParams) -> anyhow::Result<Self> {
        Self::with_geometry(params, Imageproc)
    }

    /// Creates a tracker using a custom [`Geometry`] backend.
    pub fn with_geometry<G: Geometry + 'static>(
        params: TrackerParams,
        geometry: G,
    ) -> anyhow::Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            geometry: Box::new(geometry),
            detector: None,
            mask: Mask::new(0, 0),
            contours: Vec::new(),
            timers: Timers::new(),
        })
    }

    /// Sets the detector used to locate the hand when [`TrackerParams::detect_regions`] is
    /// enabled.
    pub fn set_region_detector<D: RegionDetector + 'static>(&mut self, detector: D) {
        self.detector = Some(Box::new(detector));
    }

    /// Replaces the tracker's parameters.
    pub fn set_params(&mut self, params: TrackerParams) -> anyhow::Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Returns the denoised mask of the last frame passed to [`HandTracker::detect`].
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Returns all contours traced in the last frame.
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Runs the pipeline on `image` and returns the hand found in it, if any.
    pub fn detect(&mut self, image: &Image) -> Option<Candidate> {
        let frame = process(
            image,
            &self.params,
            &*self.geometry,
            self.detector.as_deref(),
            &self.timers,
        );
        self.mask = frame.mask;
        self.contours = frame.contours;
        frame.candidate
    }

    /// Returns profiling timers for the stages of the pipeline.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [
            &self.timers.mask,
            &self.timers.denoise,
            &self.timers.contours,
            &self.timers.fingers,
            &self.timers.assembly,
        ]
    }
}
