//! I/O helpers for chart rasters and JSON reports.
//!
//! - `load_rgba_image`: read a PNG/JPEG/etc. into an owned RGBA8 buffer.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{Rgba, RgbaView};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned RGBA8 buffer with stride and borrowed view conversion.
#[derive(Clone, Debug)]
pub struct RgbaBuffer {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl RgbaBuffer {
    /// Construct an owned buffer given raw RGBA8 bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        let stride = width;
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    /// Allocate a buffer filled with one color.
    pub fn filled(width: usize, height: usize, fill: Rgba) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[fill.r, fill.g, fill.b, fill.a]);
        }
        Self::new(width, height, data)
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Write one pixel; out-of-range coordinates are ignored.
    pub fn put(&mut self, x: i32, y: i32, px: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.stride + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&[px.r, px.g, px.b, px.a]);
    }

    /// Borrow as a read-only `RgbaView`
    pub fn as_view(&self) -> RgbaView<'_> {
        RgbaView {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }
}

/// Load an image from disk and convert to RGBA8.
pub fn load_rgba_image(path: &Path) -> Result<RgbaBuffer, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgba8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw();
    Ok(RgbaBuffer::new(width, height, data))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
