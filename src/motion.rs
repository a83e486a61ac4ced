//! Frame-differencing movement detection.
//!
//! Every switch to red light stores a smoothed grayscale snapshot of the
//! camera. While the light stays red, incoming frames are smoothed the same
//! way, differenced against the snapshot, thresholded to a binary mask, and
//! the mask sum is compared to the movement limit.

use image::{GrayImage, RgbImage, imageops};
use tracing::debug;

/// Per-pixel absolute difference above this counts as changed.
const DIFF_THRESHOLD: u8 = 25;
/// Gaussian sigma, equivalent to the classic 21×21 smoothing kernel.
const BLUR_SIGMA: f32 = 3.5;
/// Movement limit as tuned at 640×480 capture resolution.
const BASE_LIMIT: u64 = 6_500_000;
const BASE_AREA: u64 = 640 * 480;

#[derive(Debug)]
pub struct MotionDetector {
    reference: Option<GrayImage>,
    limit: u64,
}

impl MotionDetector {
    /// Detector with the movement limit scaled to the camera's frame area, so
    /// the tuned constant keeps its meaning at any capture resolution.
    pub fn for_frame_area(width: u32, height: u32) -> Self {
        let area = u64::from(width) * u64::from(height);
        Self::with_limit(BASE_LIMIT * area / BASE_AREA)
    }

    /// Detector with an explicit raw limit.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            reference: None,
            limit,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Replaces the reference with a smoothed grayscale copy of `frame`.
    pub fn capture_reference(&mut self, frame: &RgbImage) {
        self.reference = Some(smooth(frame));
        debug!("reference frame captured");
    }

    /// Movement score of `frame` against the reference: the sum of the binary
    /// difference mask. Zero when no reference has been captured yet, which
    /// covers the window before the first switch to red.
    pub fn score(&self, frame: &RgbImage) -> u64 {
        let Some(reference) = &self.reference else {
            return 0;
        };
        let current = smooth(frame);
        reference
            .pixels()
            .zip(current.pixels())
            .filter(|(r, c)| r.0[0].abs_diff(c.0[0]) > DIFF_THRESHOLD)
            .map(|_| 255u64)
            .sum()
    }

    /// Whether `score` crosses the movement limit.
    pub fn is_movement(&self, score: u64) -> bool {
        score > self.limit
    }
}

fn smooth(frame: &RgbImage) -> GrayImage {
    imageops::blur(&imageops::grayscale(frame), BLUR_SIGMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([value, value, value]))
    }

    #[test]
    fn no_reference_scores_zero() {
        let detector = MotionDetector::with_limit(0);
        let score = detector.score(&flat(64, 48, 200));
        assert_eq!(score, 0);
        assert!(!detector.is_movement(score));
    }

    #[test]
    fn identical_frames_score_zero() {
        let mut detector = MotionDetector::with_limit(0);
        let frame = flat(64, 48, 120);
        detector.capture_reference(&frame);
        assert_eq!(detector.score(&frame), 0);
    }

    #[test]
    fn uniform_change_scores_mask_sum() {
        // Constant images stay constant under the blur, so every pixel lands
        // in the mask and contributes 255.
        let mut detector = MotionDetector::with_limit(6_500_000);
        detector.capture_reference(&flat(64, 48, 0));
        assert_eq!(detector.score(&flat(64, 48, 100)), 64 * 48 * 255);
    }

    #[test]
    fn change_below_diff_threshold_is_ignored() {
        let mut detector = MotionDetector::with_limit(0);
        detector.capture_reference(&flat(64, 48, 100));
        // A shift of 10 intensity levels is within camera noise tolerance.
        assert_eq!(detector.score(&flat(64, 48, 110)), 0);
    }

    #[test]
    fn score_just_above_limit_flags_movement() {
        // 183×150 changed pixels sum to 6,999,750, past the 6.5M limit.
        let mut detector = MotionDetector::with_limit(6_500_000);
        detector.capture_reference(&flat(183, 150, 0));
        let score = detector.score(&flat(183, 150, 200));
        assert!(score > 6_500_000);
        assert!(detector.is_movement(score));
    }

    #[test]
    fn limit_scales_with_frame_area() {
        assert_eq!(MotionDetector::for_frame_area(640, 480).limit(), 6_500_000);
        assert_eq!(
            MotionDetector::for_frame_area(1280, 960).limit(),
            26_000_000
        );
        assert_eq!(MotionDetector::for_frame_area(320, 240).limit(), 1_625_000);
    }

    #[test]
    fn recapture_replaces_the_reference() {
        let mut detector = MotionDetector::with_limit(0);
        detector.capture_reference(&flat(64, 48, 0));
        let bright = flat(64, 48, 200);
        assert!(detector.score(&bright) > 0);
        detector.capture_reference(&bright);
        assert_eq!(detector.score(&bright), 0);
    }
}
