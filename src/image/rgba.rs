/// One RGBA sample, channels 0..=255.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn gray(v: u8) -> Self {
        Self::opaque(v, v, v)
    }

    /// Mean of the color channels, 0 = black, 255 = white.
    #[inline]
    pub fn brightness(&self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / 3.0
    }
}

/// Borrowed view over caller-owned RGBA8 memory, 4 bytes per pixel.
#[derive(Clone, Debug)]
pub struct RgbaView<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // pixels between rows
    pub data: &'a [u8],
}

impl RgbaView<'_> {
    /// Out-of-range coordinates yield `None`, never an error.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return None;
        }
        let idx = (y as usize * self.stride + x as usize) * 4;
        let px = &self.data[idx..idx + 4];
        Some(Rgba {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Mean channel brightness at the coordinate, if in range.
    #[inline]
    pub fn brightness_at(&self, x: i32, y: i32) -> Option<f32> {
        self.get(x, y).map(|p| p.brightness())
    }
}
