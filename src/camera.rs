//! Live camera capture behind a narrow trait.

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::{Camera, NokhwaError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera failed to open: {0}")]
    Open(#[source] NokhwaError),
    #[error("failed to read frame from camera: {0}")]
    Read(#[source] NokhwaError),
}

/// A source of camera frames. The engine and the tests only ever see this
/// interface; the real device lives in [`Webcam`].
pub trait FrameSource {
    fn dimensions(&self) -> (u32, u32);
    fn read_frame(&mut self) -> Result<RgbImage, CameraError>;
}

/// The default capture device.
pub struct Webcam {
    camera: Camera,
}

impl Webcam {
    /// Opens the device and starts the stream. Failure here is fatal for the
    /// game; there is nothing to play without a camera.
    pub fn open(index: u32) -> Result<Self, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera =
            Camera::new(CameraIndex::Index(index), requested).map_err(CameraError::Open)?;
        camera.open_stream().map_err(CameraError::Open)?;
        let resolution = camera.resolution();
        info!(
            width = resolution.width(),
            height = resolution.height(),
            "camera initialized"
        );
        Ok(Self { camera })
    }
}

impl FrameSource for Webcam {
    fn dimensions(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width(), resolution.height())
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let frame = self.camera.frame().map_err(CameraError::Read)?;
        frame.decode_image::<RgbFormat>().map_err(CameraError::Read)
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
