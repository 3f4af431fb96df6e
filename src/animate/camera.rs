//! Camera path construction.
//!
//! The animation is described by a handful of anchors: the full-extent rest
//! view, an arrival and an end-of-hold anchor per visited target, and a
//! final return to the rest view. Anchors live in a sparse map from frame
//! index to bounding box; a single dense-fill pass then interpolates every
//! frame in between. The resulting plan is immutable and consumed read-only
//! by the renderer.

use log::warn;
use std::collections::{BTreeMap, HashMap};

use crate::error::{TourError, TourResult};
use crate::geo_core::BoundingBox;

/// Dense per-frame camera sequence. Frame indices are 1-based.
#[derive(Debug, Clone)]
pub struct FramePlan {
    frames: Vec<BoundingBox>,
    n_transition: u32,
}

impl FramePlan {
    /// Total number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Camera box for a 1-based frame index.
    pub fn get(&self, frame: u32) -> Option<&BoundingBox> {
        if frame == 0 {
            return None;
        }
        self.frames.get(frame as usize - 1)
    }

    /// All camera boxes, frame 1 first.
    pub fn frames(&self) -> &[BoundingBox] {
        &self.frames
    }

    /// Whether labels are drawn on a 1-based frame index: never during the
    /// opening pan away from the rest view nor the closing pan back to it.
    pub fn show_labels(&self, frame: u32) -> bool {
        let total = self.frames.len() as u32;
        frame > self.n_transition && frame <= total - self.n_transition
    }
}

/// Builds the full per-frame bounding-box sequence for an animation.
pub struct CameraPathBuilder<'a> {
    full_extent: BoundingBox,
    lookup: &'a HashMap<String, BoundingBox>,
    n_transition: u32,
    n_still: u32,
}

impl<'a> CameraPathBuilder<'a> {
    /// `full_extent` is the rest position; `lookup` resolves focus-target
    /// names to their bounding boxes.
    pub fn new(full_extent: BoundingBox, lookup: &'a HashMap<String, BoundingBox>) -> Self {
        CameraPathBuilder {
            full_extent,
            lookup,
            n_transition: 30,
            n_still: 60,
        }
    }

    /// Frames spent moving between resting positions.
    pub fn n_transition(mut self, n_transition: u32) -> Self {
        self.n_transition = n_transition;
        self
    }

    /// Frames spent holding still on a reached target.
    pub fn n_still(mut self, n_still: u32) -> Self {
        self.n_still = n_still;
        self
    }

    /// Build the dense frame plan for the given visit order. Targets may
    /// repeat; order is preserved. All-or-nothing: an unknown target aborts
    /// the build and no plan is produced.
    pub fn build(&self, targets: &[String]) -> TourResult<FramePlan> {
        if self.n_transition == 0 || self.n_still == 0 {
            warn!(
                "degenerate frame counts (n_transition={}, n_still={}): \
                 affected segments collapse to zero frames",
                self.n_transition, self.n_still
            );
        }

        // Resolve every target up front so a failure leaves nothing behind.
        let mut boxes = Vec::with_capacity(targets.len());
        for name in targets {
            let bbox = self
                .lookup
                .get(name)
                .ok_or_else(|| TourError::UnknownTarget { name: name.clone() })?;
            boxes.push(*bbox);
        }

        let mut anchors: BTreeMap<u32, BoundingBox> = BTreeMap::new();
        anchors.insert(1, self.full_extent);

        for bbox in boxes {
            let cursor = anchors.keys().next_back().copied().unwrap_or(1);
            anchors.insert(cursor + self.n_transition, bbox);
            anchors.insert(cursor + self.n_transition + self.n_still, bbox);
        }

        let last = anchors.keys().next_back().copied().unwrap_or(1);
        anchors.insert(last + self.n_transition, self.full_extent);

        Ok(FramePlan {
            frames: fill_dense(&anchors),
            n_transition: self.n_transition,
        })
    }
}

/// Expand a sparse anchor map into one box per frame. Anchor frames take
/// the anchor value exactly; frames strictly between two anchors are
/// interpolated component-wise over the integer frame distance.
fn fill_dense(anchors: &BTreeMap<u32, BoundingBox>) -> Vec<BoundingBox> {
    let mut frames = Vec::new();
    let mut iter = anchors.iter();

    let Some((&first_index, first_box)) = iter.next() else {
        return frames;
    };
    debug_assert_eq!(first_index, 1);
    frames.push(*first_box);

    let mut prev_index = first_index;
    let mut prev_box = *first_box;
    for (&index, bbox) in iter {
        let span = index - prev_index;
        for step in 1..span {
            let t = f64::from(step) / f64::from(span);
            frames.push(BoundingBox::lerp(&prev_box, bbox, t));
        }
        frames.push(*bbox);
        prev_index = index;
        prev_box = *bbox;
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 10.0, 10.0)
    }

    fn lookup_with(name: &str, bbox: BoundingBox) -> HashMap<String, BoundingBox> {
        let mut lookup = HashMap::new();
        lookup.insert(name.to_string(), bbox);
        lookup
    }

    #[test]
    fn test_empty_targets_holds_full_extent() {
        let lookup = HashMap::new();
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(4)
            .n_still(2)
            .build(&[])
            .unwrap();
        assert_eq!(plan.len(), 1 + 4);
        for frame in plan.frames() {
            assert_eq!(*frame, full());
        }
    }

    #[test]
    fn test_single_target_frame_counts_and_anchors() {
        let target = BoundingBox::new(4.0, 4.0, 6.0, 6.0);
        let lookup = lookup_with("X", target);
        let (t, s) = (3, 2);
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(t)
            .n_still(s)
            .build(&["X".to_string()])
            .unwrap();

        assert_eq!(plan.len() as u32, 1 + t + s + t);
        assert_eq!(*plan.get(1).unwrap(), full());
        assert_eq!(*plan.get(1 + t).unwrap(), target);
        assert_eq!(*plan.get(1 + t + s).unwrap(), target);
        assert_eq!(*plan.get(1 + t + s + t).unwrap(), full());
        // Every frame in the hold is the target box, bit for bit.
        for frame in (1 + t)..=(1 + t + s) {
            assert_eq!(*plan.get(frame).unwrap(), target);
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let target = BoundingBox::new(4.0, 4.0, 6.0, 6.0);
        let lookup = lookup_with("X", target);
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(2)
            .n_still(1)
            .build(&["X".to_string()])
            .unwrap();

        let expected = [
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(2.0, 2.0, 8.0, 8.0),
            BoundingBox::new(4.0, 4.0, 6.0, 6.0),
            BoundingBox::new(4.0, 4.0, 6.0, 6.0),
            BoundingBox::new(2.0, 2.0, 8.0, 8.0),
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        ];
        assert_eq!(plan.frames(), &expected[..]);
    }

    #[test]
    fn test_interpolation_is_linear() {
        let target = BoundingBox::new(2.0, -4.0, 20.0, 14.0);
        let lookup = lookup_with("A", target);
        let t = 8;
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(t)
            .n_still(1)
            .build(&["A".to_string()])
            .unwrap();

        // Frames 1..=1+t run from full() to target; check the closed-form
        // value at every interior index.
        let p = full();
        for step in 1..t {
            let frac = f64::from(step) / f64::from(t);
            let frame = plan.get(1 + step).unwrap();
            let expected = BoundingBox::lerp(&p, &target, frac);
            assert!((frame.min_x - expected.min_x).abs() < 1e-9);
            assert!((frame.min_y - expected.min_y).abs() < 1e-9);
            assert!((frame.max_x - expected.max_x).abs() < 1e-9);
            assert!((frame.max_y - expected.max_y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_repeated_target_degenerates_to_idle() {
        let target = BoundingBox::new(4.0, 4.0, 6.0, 6.0);
        let lookup = lookup_with("X", target);
        let (t, s) = (2, 1);
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(t)
            .n_still(s)
            .build(&["X".to_string(), "X".to_string()])
            .unwrap();

        // Second visit transitions from the target to itself: duplicates.
        assert_eq!(plan.len() as u32, 1 + (t + s) * 2 + t);
        for frame in (1 + t)..=(1 + (t + s) * 2) {
            assert_eq!(*plan.get(frame).unwrap(), target);
        }
    }

    #[test]
    fn test_zero_transition_collapses() {
        let target = BoundingBox::new(4.0, 4.0, 6.0, 6.0);
        let lookup = lookup_with("X", target);
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(0)
            .n_still(2)
            .build(&["X".to_string()])
            .unwrap();
        // Arrival overwrites frame 1; the plan is just the hold.
        assert_eq!(plan.len(), 3);
        assert_eq!(*plan.get(1).unwrap(), target);
        assert_eq!(*plan.get(3).unwrap(), full());
    }

    #[test]
    fn test_unknown_target_aborts() {
        let lookup = lookup_with("X", BoundingBox::new(4.0, 4.0, 6.0, 6.0));
        let err = CameraPathBuilder::new(full(), &lookup)
            .n_transition(2)
            .n_still(1)
            .build(&["X".to_string(), "Nergensland".to_string()])
            .unwrap_err();
        match err {
            TourError::UnknownTarget { name } => assert_eq!(name, "Nergensland"),
            other => panic!("expected UnknownTarget, got {other}"),
        }
    }

    #[test]
    fn test_show_labels_window() {
        let target = BoundingBox::new(4.0, 4.0, 6.0, 6.0);
        let lookup = lookup_with("X", target);
        let t = 3;
        let plan = CameraPathBuilder::new(full(), &lookup)
            .n_transition(t)
            .n_still(2)
            .build(&["X".to_string()])
            .unwrap();

        let total = plan.len() as u32;
        for frame in 1..=total {
            let expected = frame > t && frame <= total - t;
            assert_eq!(plan.show_labels(frame), expected, "frame {frame}");
        }
    }
}
