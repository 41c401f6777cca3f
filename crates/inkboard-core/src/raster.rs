//! Raster surface holding baked freehand strokes.
//!
//! Strokes are rasterized segment by segment into a per-stroke coverage mask
//! and composited against the pixels captured when the stroke began. The
//! result does not depend on how the pointer path was chopped into segments:
//! a translucent pen never darkens where its own segments overlap.

use crate::camera::WorldSize;
use crate::tools::{BrushKind, BrushSettings};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{Rgba, RgbaImage, imageops};
use kurbo::{Point, Vec2};
use std::sync::Arc;
use thiserror::Error;

/// Fixed highlighter colour.
pub const HIGHLIGHTER_COLOR: [u8; 3] = [255, 245, 0];
/// Highlighter opacity.
pub const HIGHLIGHTER_ALPHA: f64 = 0.55;
/// Highlighter width relative to the brush size.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 2.6;
/// Highlighter glow radius relative to the brush size.
pub const HIGHLIGHTER_GLOW_FACTOR: f64 = 1.2;
/// Glow strength relative to the highlighter body.
pub const HIGHLIGHTER_GLOW_ALPHA: f64 = 0.6;

/// Errors raised while decoding or encoding raster content.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("unsupported data url (expected base64 encoding)")]
    UnsupportedDataUrl,
}

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Immutable copy of the surface pixels.
///
/// Copies taken while the surface is unchanged share one buffer.
#[derive(Debug, Clone)]
pub struct RasterSnapshot {
    revision: u64,
    pixels: Arc<RgbaImage>,
}

impl RasterSnapshot {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether two snapshots share the same buffer.
    pub fn shares_buffer(&self, other: &RasterSnapshot) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl PartialEq for RasterSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.shares_buffer(other) || *self.pixels == *other.pixels
    }
}

/// Per-pixel alpha profile of a brush.
#[derive(Debug, Clone, Copy)]
struct StrokeProfile {
    color: [u8; 3],
    half_width: f64,
    alpha: f64,
    glow_radius: f64,
    glow_alpha: f64,
    butt_ends: bool,
    erase: bool,
}

impl StrokeProfile {
    fn new(kind: BrushKind, brush: &BrushSettings) -> Self {
        let size = if brush.size.is_finite() { brush.size.max(0.0) } else { 0.0 };
        match kind {
            BrushKind::Pen => Self {
                color: brush.color,
                half_width: size / 2.0,
                alpha: brush.opacity.clamp(0.0, 1.0),
                glow_radius: 0.0,
                glow_alpha: 0.0,
                butt_ends: false,
                erase: false,
            },
            BrushKind::Highlighter => Self {
                color: HIGHLIGHTER_COLOR,
                half_width: size * HIGHLIGHTER_WIDTH_FACTOR / 2.0,
                alpha: HIGHLIGHTER_ALPHA,
                glow_radius: size * HIGHLIGHTER_GLOW_FACTOR,
                glow_alpha: HIGHLIGHTER_GLOW_ALPHA,
                butt_ends: true,
                erase: false,
            },
            BrushKind::Eraser => Self {
                color: [0, 0, 0],
                half_width: size / 2.0,
                alpha: 1.0,
                glow_radius: 0.0,
                glow_alpha: 0.0,
                butt_ends: false,
                erase: true,
            },
        }
    }

    /// How far from the segment this brush can touch pixels.
    fn reach(&self) -> f64 {
        self.half_width + self.glow_radius + 1.0
    }

    /// Effective alpha at `p` for the segment `a..b`.
    ///
    /// With blunt ends the body stops flush at the stroke end; interior
    /// joints stay round so consecutive segments leave no gaps.
    fn alpha_at(&self, p: Point, a: Point, b: Point, joined_start: bool) -> f64 {
        let ab: Vec2 = b - a;
        let len2 = ab.hypot2();
        let t = if len2 > 0.0 { (p - a).dot(ab) / len2 } else { 0.0 };
        let closest = a + ab * t.clamp(0.0, 1.0);
        let dist = (p - closest).hypot();

        let body_allowed = !self.butt_ends || (len2 > 0.0 && (t >= 0.0 || joined_start) && t <= 1.0);
        let body = if body_allowed {
            (self.half_width + 0.5 - dist).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let glow = if self.glow_radius <= 0.0 {
            0.0
        } else if dist <= self.half_width {
            self.glow_alpha
        } else {
            let falloff = 1.0 - (dist - self.half_width) / self.glow_radius;
            if falloff > 0.0 { self.glow_alpha * falloff * falloff } else { 0.0 }
        };

        self.alpha * body.max(glow)
    }

    /// Combine `base` with the brush at the given effective alpha.
    fn composite(&self, base: Rgba<u8>, alpha: f32) -> Rgba<u8> {
        let [br, bg, bb, ba] = base.0;
        let base_a = ba as f32 / 255.0;

        if self.erase {
            return Rgba([br, bg, bb, to_channel(base_a * (1.0 - alpha))]);
        }

        let out_a = alpha + base_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let mix = |src: u8, dst: u8| {
            let value = (src as f32 * alpha + dst as f32 * base_a * (1.0 - alpha)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        let [cr, cg, cb] = self.color;
        Rgba([mix(cr, br), mix(cg, bg), mix(cb, bb), to_channel(out_a)])
    }
}

fn to_channel(unit: f32) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

/// A stroke in progress.
#[derive(Debug)]
struct ActiveStroke {
    profile: StrokeProfile,
    last: Point,
    segments: usize,
    base: RgbaImage,
    mask: Vec<f32>,
    changed: bool,
}

/// Pixel buffer with the same dimensions as the world.
#[derive(Debug)]
pub struct RasterSurface {
    pixels: RgbaImage,
    revision: u64,
    next_revision: u64,
    cached: Option<RasterSnapshot>,
    stroke: Option<ActiveStroke>,
}

impl RasterSurface {
    /// Create a transparent surface.
    pub fn new(size: WorldSize) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
            revision: 0,
            next_revision: 1,
            cached: None,
            stroke: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> WorldSize {
        WorldSize::new(self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    fn touch(&mut self) {
        self.revision = self.next_revision;
        self.next_revision += 1;
    }

    /// Whether a stroke is in progress.
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Start a stroke at a world point. Nothing is painted until the stroke extends.
    pub fn begin_stroke(&mut self, kind: BrushKind, brush: &BrushSettings, at: Point) {
        if !(at.x.is_finite() && at.y.is_finite()) {
            log::warn!("Ignoring stroke start at non-finite point");
            return;
        }
        let (w, h) = self.pixels.dimensions();
        self.stroke = Some(ActiveStroke {
            profile: StrokeProfile::new(kind, brush),
            last: at,
            segments: 0,
            base: self.pixels.clone(),
            mask: vec![0.0; w as usize * h as usize],
            changed: false,
        });
    }

    /// Extend the active stroke to a world point. Returns true if any pixel
    /// changed. Without an active stroke this does nothing.
    pub fn extend_stroke(&mut self, to: Point) -> bool {
        if !(to.x.is_finite() && to.y.is_finite()) {
            return false;
        }
        let Some(stroke) = self.stroke.as_mut() else {
            return false;
        };

        let from = stroke.last;
        let painted = paint_segment(&mut self.pixels, stroke, from, to);
        stroke.last = to;
        stroke.segments += 1;

        if painted {
            stroke.changed = true;
            self.touch();
        }
        painted
    }

    /// Finish the active stroke. Returns whether it changed any pixel.
    pub fn end_stroke(&mut self) -> bool {
        self.stroke.take().is_some_and(|s| s.changed)
    }

    /// Erase everything.
    pub fn clear(&mut self) {
        self.stroke = None;
        if !self.is_blank() {
            self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
            self.touch();
        }
    }

    /// Reallocate to a new world size. Existing pixel content is discarded,
    /// even when the size is unchanged.
    pub fn resize(&mut self, size: WorldSize) {
        log::info!(
            "Raster surface reallocated to {}x{}, discarding content",
            size.width,
            size.height
        );
        self.stroke = None;
        self.pixels = RgbaImage::new(size.width, size.height);
        self.touch();
    }

    /// Copy the current pixels.
    pub fn snapshot(&mut self) -> RasterSnapshot {
        if let Some(cached) = &self.cached {
            if cached.revision == self.revision {
                return cached.clone();
            }
        }
        let snapshot = RasterSnapshot {
            revision: self.revision,
            pixels: Arc::new(self.pixels.clone()),
        };
        self.cached = Some(snapshot.clone());
        snapshot
    }

    /// Replace the pixels with a snapshot. A snapshot taken at another world
    /// size is drawn at the origin and clipped.
    pub fn restore(&mut self, snapshot: &RasterSnapshot) {
        self.stroke = None;
        if snapshot.pixels.dimensions() == self.pixels.dimensions() {
            self.pixels = (*snapshot.pixels).clone();
            self.revision = snapshot.revision;
            self.cached = Some(snapshot.clone());
        } else {
            let mut pixels = RgbaImage::new(self.width(), self.height());
            imageops::replace(&mut pixels, &*snapshot.pixels, 0, 0);
            self.pixels = pixels;
            self.touch();
        }
    }

    /// Replace the content with an encoded bitmap (a `data:` URL or bare
    /// base64), drawn at the origin. On error the surface is left untouched.
    pub fn load_encoded(&mut self, encoded: &str) -> RasterResult<()> {
        let bytes = decode_payload(encoded)?;
        self.load_bytes(&bytes)
    }

    /// Replace the content with a PNG, JPEG or WebP file's bytes.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> RasterResult<()> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();

        self.stroke = None;
        let mut pixels = RgbaImage::new(self.width(), self.height());
        imageops::replace(&mut pixels, &decoded, 0, 0);
        self.pixels = pixels;
        self.touch();
        log::debug!("Loaded {}x{} bitmap into raster surface", decoded.width(), decoded.height());
        Ok(())
    }

    /// Encode the surface as PNG bytes.
    pub fn encode_png(&self) -> RasterResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.pixels.as_raw())?;
        }
        Ok(png_data)
    }

    /// Encode the surface as a `data:image/png;base64,` URL.
    pub fn to_data_url(&self) -> RasterResult<String> {
        let png = self.encode_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

fn decode_payload(encoded: &str) -> RasterResult<Vec<u8>> {
    let encoded = encoded.trim();
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or(RasterError::UnsupportedDataUrl)?;
            if !header.ends_with(";base64") {
                return Err(RasterError::UnsupportedDataUrl);
            }
            data
        }
        None => encoded,
    };
    Ok(STANDARD.decode(payload)?)
}

/// Rasterize one segment of `stroke` into `pixels`.
fn paint_segment(pixels: &mut RgbaImage, stroke: &mut ActiveStroke, a: Point, b: Point) -> bool {
    let (width, height) = pixels.dimensions();
    let reach = stroke.profile.reach();

    let x0 = (a.x.min(b.x) - reach).floor().max(0.0) as u32;
    let y0 = (a.y.min(b.y) - reach).floor().max(0.0) as u32;
    let x1 = (a.x.max(b.x) + reach).ceil().min(width as f64).max(0.0) as u32;
    let y1 = (a.y.max(b.y) + reach).ceil().min(height as f64).max(0.0) as u32;

    let joined_start = stroke.segments > 0;
    let mut painted = false;

    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let alpha = stroke.profile.alpha_at(center, a, b, joined_start) as f32;
            if alpha <= 0.0 {
                continue;
            }
            let idx = y as usize * width as usize + x as usize;
            if alpha <= stroke.mask[idx] {
                continue;
            }
            stroke.mask[idx] = alpha;

            let out = stroke.profile.composite(*stroke.base.get_pixel(x, y), alpha);
            let current = pixels.get_pixel_mut(x, y);
            if *current != out {
                *current = out;
                painted = true;
            }
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> RasterSurface {
        RasterSurface::new(WorldSize::new(64, 48))
    }

    fn pen(size: f64, opacity: f64) -> BrushSettings {
        BrushSettings {
            color: [200, 10, 10],
            size,
            opacity,
        }
    }

    fn alpha(surface: &RasterSurface, x: u32, y: u32) -> u8 {
        surface.pixels().get_pixel(x, y).0[3]
    }

    #[test]
    fn test_pen_stroke_paints() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(4.0, 1.0), Point::new(5.0, 10.0));
        assert!(s.extend_stroke(Point::new(40.0, 10.0)));
        assert!(s.end_stroke());

        assert_eq!(s.pixels().get_pixel(20, 9).0, [200, 10, 10, 255]);
        assert_eq!(alpha(&s, 20, 30), 0);
    }

    #[test]
    fn test_stroke_without_movement_is_unchanged() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(4.0, 1.0), Point::new(5.0, 10.0));
        assert!(!s.end_stroke());
        assert!(s.is_blank());
    }

    #[test]
    fn test_extend_without_stroke_is_noop() {
        let mut s = surface();
        assert!(!s.extend_stroke(Point::new(10.0, 10.0)));
        assert!(!s.end_stroke());
        assert!(s.is_blank());
    }

    #[test]
    fn test_eraser_removes_alpha() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(6.0, 1.0), Point::new(0.0, 20.0));
        s.extend_stroke(Point::new(63.0, 20.0));
        s.end_stroke();
        assert_eq!(alpha(&s, 30, 20), 255);

        s.begin_stroke(BrushKind::Eraser, &pen(10.0, 1.0), Point::new(30.0, 0.0));
        assert!(s.extend_stroke(Point::new(30.0, 47.0)));
        assert!(s.end_stroke());
        assert_eq!(alpha(&s, 30, 20), 0);
        assert_eq!(alpha(&s, 5, 20), 255);
    }

    #[test]
    fn test_eraser_on_blank_surface_changes_nothing() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Eraser, &pen(10.0, 1.0), Point::new(0.0, 0.0));
        assert!(!s.extend_stroke(Point::new(30.0, 30.0)));
        assert!(!s.end_stroke());
    }

    #[test]
    fn test_translucent_pen_does_not_compound() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(6.0, 0.5), Point::new(5.0, 20.0));
        for x in [10.0, 12.0, 14.0, 30.0, 31.0, 50.0] {
            s.extend_stroke(Point::new(x, 20.0));
        }
        s.end_stroke();
        let max = s.pixels().pixels().map(|p| p.0[3]).max().unwrap_or(0);
        assert_eq!(max, 128);
    }

    #[test]
    fn test_highlighter_is_translucent_and_blunt() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Highlighter, &pen(4.0, 1.0), Point::new(10.0, 24.0));
        s.extend_stroke(Point::new(40.0, 24.0));
        s.end_stroke();

        let body = *s.pixels().get_pixel(25, 24);
        assert_eq!(&body.0[..3], &HIGHLIGHTER_COLOR);
        assert_eq!(body.0[3], 140);

        // Past the end the body stops; only the weaker glow remains.
        assert!(alpha(&s, 43, 24) < body.0[3]);
        assert!(alpha(&s, 43, 24) > 0);
    }

    #[test]
    fn test_resize_discards_content() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(4.0, 1.0), Point::new(5.0, 10.0));
        s.extend_stroke(Point::new(40.0, 10.0));
        s.end_stroke();
        s.resize(WorldSize::new(64, 48));
        assert!(s.is_blank());
    }

    #[test]
    fn test_snapshot_restore_and_sharing() {
        let mut s = surface();
        let blank = s.snapshot();
        assert!(blank.shares_buffer(&s.snapshot()));

        s.begin_stroke(BrushKind::Pen, &pen(4.0, 1.0), Point::new(5.0, 10.0));
        s.extend_stroke(Point::new(40.0, 10.0));
        s.end_stroke();
        let drawn = s.snapshot();
        assert!(!drawn.shares_buffer(&blank));

        s.restore(&blank);
        assert!(s.is_blank());
        s.restore(&drawn);
        assert_eq!(s.pixels(), drawn.pixels());
    }

    #[test]
    fn test_restore_from_other_size_clips() {
        let mut small = RasterSurface::new(WorldSize::new(8, 8));
        small.begin_stroke(BrushKind::Pen, &pen(20.0, 1.0), Point::new(0.0, 4.0));
        small.extend_stroke(Point::new(8.0, 4.0));
        let snap = small.snapshot();

        let mut s = surface();
        s.restore(&snap);
        assert_eq!(s.width(), 64);
        assert_eq!(alpha(&s, 4, 4), 255);
        assert_eq!(alpha(&s, 20, 20), 0);
    }

    #[test]
    fn test_encoded_round_trip() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(4.0, 0.8), Point::new(5.0, 10.0));
        s.extend_stroke(Point::new(40.0, 30.0));
        s.end_stroke();
        let url = s.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let mut other = surface();
        other.load_encoded(&url).unwrap();
        assert_eq!(other.pixels(), s.pixels());
    }

    #[test]
    fn test_bad_payload_leaves_surface() {
        let mut s = surface();
        s.begin_stroke(BrushKind::Pen, &pen(4.0, 1.0), Point::new(5.0, 10.0));
        s.extend_stroke(Point::new(40.0, 10.0));
        s.end_stroke();
        let before = s.pixels().clone();

        assert!(matches!(s.load_encoded("data:image/png;base64,@@@"), Err(RasterError::Base64(_))));
        assert!(matches!(s.load_encoded("data:image/png,plain"), Err(RasterError::UnsupportedDataUrl)));
        assert!(matches!(s.load_encoded("aGVsbG8="), Err(RasterError::Decode(_))));
        assert_eq!(s.pixels(), &before);
    }
}
