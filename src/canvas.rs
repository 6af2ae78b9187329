use rayon::prelude::*;

// ============================================================================
// ARGB PIXELS
// ============================================================================

/// Packed 32-bit pixel: alpha in the high byte, then red, green, blue.
pub type Argb = u32;

/// Fully transparent pixel. Also the sentinel returned for out-of-bounds reads.
pub const TRANSPARENT: Argb = 0x0000_0000;
pub const OPAQUE_WHITE: Argb = 0xFFFF_FFFF;
pub const OPAQUE_BLACK: Argb = 0xFF00_0000;

/// Largest canvas we agree to allocate, in pixels.
pub const MAX_PIXELS: u64 = 256_000_000;

#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> Argb {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split a pixel into `[r, g, b, a]` byte order (the order egui and `image` use).
#[inline]
pub fn unpack_argb(c: Argb) -> [u8; 4] {
    [(c >> 16) as u8, (c >> 8) as u8, c as u8, (c >> 24) as u8]
}

#[inline]
pub fn alpha(c: Argb) -> u8 {
    (c >> 24) as u8
}

/// Straight-alpha source-over of `src` onto `dst`.
pub fn blend_over(dst: Argb, src: Argb) -> Argb {
    let sa = alpha(src) as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let [sr, sg, sb, _] = unpack_argb(src);
    let [dr, dg, db, da] = unpack_argb(dst);
    let da = da as u32;

    // out_a = sa + da * (1 - sa), everything in 0..=255 fixed point
    let inv = 255 - sa;
    let out_a = sa + (da * inv + 127) / 255;
    if out_a == 0 {
        return TRANSPARENT;
    }
    let mix = |s: u8, d: u8| -> u8 {
        let num = s as u32 * sa * 255 + d as u32 * da * inv;
        ((num + out_a * 255 / 2) / (out_a * 255)).min(255) as u8
    };
    pack_argb(mix(sr, dr), mix(sg, dg), mix(sb, db), out_a.min(255) as u8)
}

/// Parse `#AARRGGBB`, `#RRGGBB` (opaque), or the same without the `#`.
pub fn parse_hex_argb(s: &str) -> Option<Argb> {
    let hex = s.trim().trim_start_matches('#');
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        8 => Some(value),
        6 => Some(0xFF00_0000 | value),
        _ => None,
    }
}

pub fn format_hex_argb(c: Argb) -> String {
    format!("#{:08X}", c)
}

// ============================================================================
// PIXEL BUFFER
// ============================================================================

/// Errors raised while creating a pixel buffer.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("cannot allocate a {width}×{height} canvas")]
    Allocation { width: u32, height: u32 },
}

/// A dense, row-major `width × height` grid of ARGB pixels.
///
/// Dimensions are fixed for the buffer's lifetime and never zero. Reads and
/// writes outside the grid are silently ignored: `set` does nothing and `get`
/// returns [`TRANSPARENT`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Argb>,
}

impl PixelBuffer {
    /// Allocate a buffer filled with `fill`, reporting allocation failure.
    pub fn try_new(width: u32, height: u32, fill: Argb) -> Result<Self, CanvasError> {
        let width = width.max(1);
        let height = height.max(1);
        let total = width as u64 * height as u64;
        if total > MAX_PIXELS {
            return Err(CanvasError::Allocation { width, height });
        }
        let len = total as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| CanvasError::Allocation { width, height })?;
        pixels.resize(len, fill);
        Ok(Self { width, height, pixels })
    }

    /// Allocate a buffer filled with `fill`.
    ///
    /// A paint surface cannot work without its backing store, so allocation
    /// failure is fatal: the diagnostic goes to the session log and we panic.
    pub fn new(width: u32, height: u32, fill: Argb) -> Self {
        match Self::try_new(width, height, fill) {
            Ok(buf) => buf,
            Err(e) => {
                crate::log_err!("Failed to allocate memory for canvas, is canvas too big? ({})", e);
                panic!("Failed to allocate memory for canvas, is canvas too big? ({e})");
            }
        }
    }

    /// Fully transparent buffer, used for the preview overlay.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, TRANSPARENT)
    }

    /// Build a buffer from already-packed pixels. Returns `None` when the
    /// slice length does not match `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Argb>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn try_get(&self, x: i32, y: i32) -> Option<Argb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Pixel at `(x, y)`, or [`TRANSPARENT`] outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Argb {
        self.try_get(x, y).unwrap_or(TRANSPARENT)
    }

    /// Write one pixel. Out-of-bounds coordinates are a no-op.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Argb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: Argb) {
        self.pixels.fill(color);
    }

    /// Row-major pixels, `width * height` long, no padding.
    pub fn as_slice(&self) -> &[Argb] {
        &self.pixels
    }

    /// True when every pixel is fully transparent.
    pub fn is_clear(&self) -> bool {
        self.pixels.iter().all(|&p| p == TRANSPARENT)
    }

    /// Convert to `[r, g, b]` bytes, dropping alpha.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            let [r, g, b, _] = unpack_argb(p);
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }
}

/// Convert a flat RGBA byte array into packed ARGB pixels.
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn argb_from_rgba(rgba: &[u8]) -> Vec<Argb> {
    rgba.chunks_exact(4)
        .map(|p| pack_argb(p[0], p[1], p[2], p[3]))
        .collect()
}

// ============================================================================
// CANVAS: committed image + live preview overlay
// ============================================================================

/// Which of the two canvas buffers a drawing primitive should target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// The committed image.
    Base,
    /// The transient rubber-band layer shown while dragging a shape tool.
    Overlay,
}

/// The committed image plus a same-sized transparent preview overlay.
///
/// Both buffers always share dimensions; [`Canvas::reinit`] replaces them
/// together.
#[derive(Clone, Debug)]
pub struct Canvas {
    base: PixelBuffer,
    overlay: PixelBuffer,
}

impl Canvas {
    /// New canvas with an opaque white base.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, OPAQUE_WHITE)
    }

    pub fn with_background(width: u32, height: u32, background: Argb) -> Self {
        let base = PixelBuffer::new(width, height, background);
        let overlay = PixelBuffer::transparent(base.width(), base.height());
        Self { base, overlay }
    }

    /// Wrap an existing image; the overlay is allocated to match.
    pub fn from_base(base: PixelBuffer) -> Self {
        let overlay = PixelBuffer::transparent(base.width(), base.height());
        Self { base, overlay }
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.base.in_bounds(x, y)
    }

    pub fn base(&self) -> &PixelBuffer {
        &self.base
    }

    pub fn overlay(&self) -> &PixelBuffer {
        &self.overlay
    }

    pub fn buffer_mut(&mut self, target: Target) -> &mut PixelBuffer {
        match target {
            Target::Base => &mut self.base,
            Target::Overlay => &mut self.overlay,
        }
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.fill(TRANSPARENT);
    }

    /// Discard both buffers and allocate fresh ones at the new size.
    pub fn reinit(&mut self, width: u32, height: u32, background: Argb) {
        *self = Self::with_background(width, height, background);
    }

    /// Replace the committed image, reallocating the overlay to match.
    pub fn replace_base(&mut self, base: PixelBuffer) {
        *self = Self::from_base(base);
    }

    /// Overlay-over-base composite, written into `out` (resized as needed).
    pub fn composite_into(&self, out: &mut Vec<Argb>) {
        let w = self.width() as usize;
        out.resize(self.base.as_slice().len(), TRANSPARENT);
        let base = self.base.as_slice();
        let overlay = self.overlay.as_slice();
        out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            let start = y * w;
            let b = &base[start..start + w];
            let o = &overlay[start..start + w];
            for x in 0..w {
                row[x] = blend_over(b[x], o[x]);
            }
        });
    }

    pub fn composite(&self) -> Vec<Argb> {
        let mut out = Vec::new();
        self.composite_into(&mut out);
        out
    }
}
