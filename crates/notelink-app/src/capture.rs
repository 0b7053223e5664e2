//! Screen-region capture and QR decoding
//!
//! Both are external collaborators of the scan loop and sit behind traits:
//! [`ScreenCapture`] produces a grayscale frame of the centre of the screen,
//! [`CodeDecoder`] turns a frame into at most one payload.

use std::future::Future;

use notelink_core::prelude::*;
use notelink_core::RawPayload;

/// An 8-bit grayscale raster, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl GrayFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::capture(format!(
                "frame {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Screen rectangle in display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Square of side `size` centred on a `screen_width` x `screen_height`
/// display, shrunk to fit when the display is smaller.
pub fn centered_region(screen_width: u32, screen_height: u32, size: u32) -> Region {
    let width = size.min(screen_width);
    let height = size.min(screen_height);
    Region {
        x: ((screen_width - width) / 2) as i32,
        y: ((screen_height - height) / 2) as i32,
        width,
        height,
    }
}

/// Produces a grayscale image of the screen centre
pub trait ScreenCapture {
    fn capture_center(&self, size: u32) -> Result<GrayFrame>;
}

/// Decodes at most one text payload from a frame
pub trait CodeDecoder {
    fn decode(&self, frame: &GrayFrame) -> Option<String>;
}

/// QR decoder backed by `rqrr`. When several codes are visible, the first
/// one that decodes wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl CodeDecoder for QrDecoder {
    fn decode(&self, frame: &GrayFrame) -> Option<String> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if frame.is_empty() || frame.pixels.len() != width * height {
            return None;
        }

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
                frame.pixels[y * width + x]
            });

        let grids = prepared.detect_grids();
        trace!("Detected {} QR grid(s)", grids.len());

        grids.into_iter().find_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(content),
            Err(e) => {
                debug!("QR grid failed to decode: {:?}", e);
                None
            }
        })
    }
}

#[cfg(feature = "desktop-capture")]
mod desktop {
    use super::{centered_region, GrayFrame, ScreenCapture};
    use notelink_core::prelude::*;
    use screenshots::image::DynamicImage;
    use screenshots::Screen;

    /// Captures the primary display with the `screenshots` crate
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DesktopCapture;

    impl DesktopCapture {
        pub const fn is_supported() -> bool {
            true
        }
    }

    impl ScreenCapture for DesktopCapture {
        fn capture_center(&self, size: u32) -> Result<GrayFrame> {
            let screens = Screen::all().map_err(|e| Error::capture(e.to_string()))?;
            let screen = screens
                .iter()
                .find(|s| s.display_info.is_primary)
                .or_else(|| screens.first())
                .ok_or_else(|| Error::capture("No monitor found"))?;

            let info = &screen.display_info;
            let region = centered_region(info.width, info.height, size);
            trace!("Capturing {:?} of {}x{} display", region, info.width, info.height);

            let image = screen
                .capture_area(region.x, region.y, region.width, region.height)
                .map_err(|e| Error::capture(e.to_string()))?;

            let gray = DynamicImage::ImageRgba8(image).into_luma8();
            GrayFrame::new(gray.width(), gray.height(), gray.into_raw())
        }
    }
}

#[cfg(not(feature = "desktop-capture"))]
mod desktop {
    use super::{GrayFrame, ScreenCapture};
    use notelink_core::prelude::*;

    /// Placeholder used when the binary is built without screen capture
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DesktopCapture;

    impl DesktopCapture {
        pub const fn is_supported() -> bool {
            false
        }
    }

    impl ScreenCapture for DesktopCapture {
        fn capture_center(&self, _size: u32) -> Result<GrayFrame> {
            Err(Error::CaptureUnavailable)
        }
    }
}

pub use desktop::DesktopCapture;

/// Where an attempt gets its payload from
pub trait PayloadSource {
    /// `Ok(None)` means nothing was found this time
    fn acquire(&mut self) -> impl Future<Output = Result<Option<RawPayload>>>;
}

/// Captures the screen centre and decodes a QR code from it
#[derive(Debug)]
pub struct ScreenScanner<C, D> {
    capture: C,
    decoder: D,
    region_size: u32,
}

impl<C: ScreenCapture, D: CodeDecoder> ScreenScanner<C, D> {
    pub fn new(capture: C, decoder: D, region_size: u32) -> Self {
        Self {
            capture,
            decoder,
            region_size,
        }
    }
}

impl<C: ScreenCapture, D: CodeDecoder> PayloadSource for ScreenScanner<C, D> {
    async fn acquire(&mut self) -> Result<Option<RawPayload>> {
        let frame = self.capture.capture_center(self.region_size)?;
        Ok(self.decoder.decode(&frame).map(RawPayload::decoded))
    }
}
