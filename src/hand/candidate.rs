//! Selection and assembly of the hand candidate of a frame.

use crate::{
    geometry::{Contour, Defect, Geometry},
    image::{draw, Color, Image, Rect},
    resolution::Resolution,
};

use super::{
    finger_graph::FingerGraph,
    fingers::{extract_fingers, Finger, FingerParams},
    mask::Centroid,
};

/// Returns the contour with the largest area, ignoring contours smaller than `min_area`.
///
/// If several contours share the largest area, the first one is returned.
pub fn select_candidate<'a>(
    contours: &'a [Contour],
    min_area: f32,
    geometry: &dyn Geometry,
) -> Option<&'a Contour> {
    let mut best: Option<(&Contour, f32)> = None;
    for contour in contours {
        let area = geometry.area(contour);
        if area < min_area {
            continue;
        }
        match best {
            Some((_, best_area)) if best_area >= area => {}
            _ => best = Some((contour, area)),
        }
    }
    best.map(|(contour, _)| contour)
}

/// The hand found in a frame.
#[derive(Debug, Clone)]
pub struct Candidate {
    contour: Contour,
    hull: Contour,
    defects: Vec<Defect>,
    centroid: Centroid,
    finger_graph: Option<FingerGraph>,
    fingers: Vec<Finger>,
    rects: Vec<Rect>,
}

impl Candidate {
    /// The simplified outline of the hand.
    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    /// Convex hull of [`Candidate::contour`].
    pub fn hull(&self) -> &Contour {
        &self.hull
    }

    /// Convexity defects of [`Candidate::contour`], usually the gaps between fingers.
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    /// Centroid of the frame's foreground mask.
    pub fn centroid(&self) -> Centroid {
        self.centroid
    }

    /// Radial profile of the unsimplified contour. `None` if finger detection was disabled.
    pub fn finger_graph(&self) -> Option<&FingerGraph> {
        self.finger_graph.as_ref()
    }

    /// Extended fingers, longest first.
    pub fn fingers(&self) -> &[Finger] {
        &self.fingers
    }

    /// Regions reported by the region detector, largest first.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Draws the candidate onto `image` for debugging.
    pub fn draw(&self, image: &mut Image) {
        for rect in &self.rects {
            draw::rect(image, *rect).color(Color::BLUE);
        }
        draw::polygon(image, self.hull.coords()).color(Color::CYAN);
        draw::polygon(image, self.contour.coords()).color(Color::GREEN);
        for defect in &self.defects {
            draw::marker(image, defect.far.x, defect.far.y)
                .color(Color::MAGENTA)
                .size(3);
        }

        let (cx, cy) = (
            self.centroid.x.round() as i32,
            self.centroid.y.round() as i32,
        );
        for finger in &self.fingers {
            draw::line(image, cx, cy, finger.x, finger.y).color(Color::YELLOW);
            draw::circle(image, finger.x, finger.y, 9).color(Color::RED);
        }
        draw::marker(image, cx, cy).color(Color::WHITE);

        let label = match self.fingers.len() {
            1 => "1 finger".to_string(),
            n => format!("{n} fingers"),
        };
        draw::text(image, 2, 2, &label)
            .align_top()
            .align_left()
            .color(Color::WHITE);
    }
}

/// Builds the finger graph of `contour` and extracts the fingers from it.
///
/// `frame` is the size of the image the contour was traced in. The contour should be passed as
/// traced, since polygon simplification removes most of the points near finger tips.
pub fn find_fingers(
    contour: &Contour,
    centroid: Centroid,
    frame: Resolution,
    graph_resolution: usize,
    params: &FingerParams,
) -> (FingerGraph, Vec<Finger>) {
    let graph = FingerGraph::build(contour, centroid, graph_resolution);
    let fingers = extract_fingers(&graph, frame, params);
    (graph, fingers)
}

/// Builds the [`Candidate`] for the selected `contour`.
///
/// The contour is simplified with a tolerance of `polygon_epsilon` times its point count. Hull
/// and defects are computed on the simplified contour. `fingers` is the output of
/// [`find_fingers`], or `None` if finger detection is disabled.
pub fn assemble(
    contour: &Contour,
    centroid: Centroid,
    rects: Vec<Rect>,
    polygon_epsilon: f32,
    fingers: Option<(FingerGraph, Vec<Finger>)>,
    geometry: &dyn Geometry,
) -> Candidate {
    let epsilon = contour.len() as f32 * polygon_epsilon;
    let simplified = geometry.approx_polygon(contour, epsilon);
    let hull = geometry.convex_hull(&simplified);
    let defects = geometry.convexity_defects(&simplified, &hull);

    let (finger_graph, fingers) = match fingers {
        Some((graph, fingers)) => (Some(graph), fingers),
        None => (None, Vec::new()),
    };

    log::trace!(
        "candidate: {} points simplified to {}, hull {}, {} defects, {} fingers",
        contour.len(),
        simplified.len(),
        hull.len(),
        defects.len(),
        fingers.len(),
    );

    Candidate {
        contour: simplified,
        hull,
        defects,
        centroid,
        finger_graph,
        fingers,
        rects,
    }
}
