use crate::app::geometry::{Rect, Vec2};

use super::font::{glyph_bits, glyph_pixel_set, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::sprites::SpriteImage;

pub type Color = [u8; 4];

/// Integer sub-rectangle of a sprite image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Mutable view over one RGBA frame. All drawing is clipped to the frame.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let offset = self.byte_offset(x as i32, y as i32)?;
        let mut color = [0; 4];
        color.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(color)
    }

    pub fn clear(&mut self, color: Color) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Fills `rect`, blending when the color is translucent.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((left, top, right, bottom)) = self.clip(rect) else {
            return;
        };
        for y in top..bottom {
            for x in left..right {
                self.blend_pixel(x, y, color);
            }
        }
    }

    pub fn rect_outline(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness.max(1.0).min(rect.width * 0.5).min(rect.height * 0.5);
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.fill_rect(
            Rect::new(rect.x, rect.bottom() - t, rect.width, t),
            color,
        );
        self.fill_rect(
            Rect::new(rect.x, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
        self.fill_rect(
            Rect::new(rect.right() - t, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.fill_ellipse(Rect::from_center(center, radius * 2.0, radius * 2.0), color);
    }

    /// Fills the ellipse inscribed in `bounds`.
    pub fn fill_ellipse(&mut self, bounds: Rect, color: Color) {
        let Some((left, top, right, bottom)) = self.clip(bounds) else {
            return;
        };
        let radius_x = bounds.width * 0.5;
        let radius_y = bounds.height * 0.5;
        if radius_x <= 0.0 || radius_y <= 0.0 {
            return;
        }
        let center = bounds.center();
        for y in top..bottom {
            let dy = (y as f32 + 0.5 - center.y) / radius_y;
            for x in left..right {
                let dx = (x as f32 + 0.5 - center.x) / radius_x;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Draws `source` (or the whole image) with its top-left corner at `position`.
    pub fn blit(&mut self, image: &SpriteImage, source: Option<PixelRect>, position: Vec2) {
        let source = source.unwrap_or(PixelRect::new(0, 0, image.width(), image.height()));
        let dest = Rect::new(
            position.x.round(),
            position.y.round(),
            source.width as f32,
            source.height as f32,
        );
        self.blit_scaled(image, Some(source), dest);
    }

    /// Draws `source` stretched (nearest-neighbour) to fill `dest`.
    pub fn blit_scaled(&mut self, image: &SpriteImage, source: Option<PixelRect>, dest: Rect) {
        let source = source.unwrap_or(PixelRect::new(0, 0, image.width(), image.height()));
        if source.width == 0
            || source.height == 0
            || source.x.saturating_add(source.width) > image.width()
            || source.y.saturating_add(source.height) > image.height()
        {
            return;
        }
        let Some((left, top, right, bottom)) = self.clip(dest) else {
            return;
        };
        let scale_x = source.width as f32 / dest.width;
        let scale_y = source.height as f32 / dest.height;
        let dest_left = dest.x.round() as i32;
        let dest_top = dest.y.round() as i32;

        for y in top..bottom {
            let src_y = (((y - dest_top) as f32 * scale_y) as u32).min(source.height - 1);
            for x in left..right {
                let src_x = (((x - dest_left) as f32 * scale_x) as u32).min(source.width - 1);
                if let Some(color) = image.pixel(source.x + src_x, source.y + src_y) {
                    if color[3] != 0 {
                        self.blend_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Draws `text` with the built-in 3x5 font, each font pixel `scale` pixels wide.
    pub fn draw_text(&mut self, position: Vec2, text: &str, scale: i32, color: Color) {
        let scale = scale.max(1);
        let mut x = position.x.round() as i32;
        let y = position.y.round() as i32;
        for ch in text.chars() {
            let bits = glyph_bits(ch);
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyph_pixel_set(bits, col, row) {
                        continue;
                    }
                    let cell = Rect::new(
                        (x + col * scale) as f32,
                        (y + row * scale) as f32,
                        scale as f32,
                        scale as f32,
                    );
                    self.fill_rect(cell, color);
                }
            }
            x += (GLYPH_WIDTH + 1) * scale;
        }
    }

    fn clip(&self, rect: Rect) -> Option<(i32, i32, i32, i32)> {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return None;
        }
        let left = (rect.left().round() as i32).max(0);
        let top = (rect.top().round() as i32).max(0);
        let right = (rect.right().round() as i32).min(self.width as i32);
        let bottom = (rect.bottom().round() as i32).min(self.height as i32);
        if left >= right || top >= bottom {
            return None;
        }
        Some((left, top, right, bottom))
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let dst = &mut self.frame[offset..offset + 4];
        let alpha = color[3] as u32;
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let inverse = 255 - alpha;
        for channel in 0..3 {
            let blended = color[channel] as u32 * alpha + dst[channel] as u32 * inverse;
            dst[channel] = (blended / 255) as u8;
        }
        dst[3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];
    const BLACK: Color = [0, 0, 0, 255];

    fn frame(width: u32, height: u32) -> Vec<u8> {
        vec![0; (width * height * 4) as usize]
    }

    #[test]
    fn fill_rect_is_clipped_to_frame() {
        let mut buffer = frame(4, 4);
        let mut canvas = Canvas::new(&mut buffer, 4, 4);
        canvas.fill_rect(Rect::new(-10.0, 2.0, 100.0, 100.0), RED);

        assert_eq!(canvas.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(3, 3), Some(RED));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn translucent_fill_blends_over_existing_pixels() {
        let mut buffer = frame(2, 2);
        let mut canvas = Canvas::new(&mut buffer, 2, 2);
        canvas.clear([200, 200, 200, 255]);
        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), [0, 0, 0, 128]);

        let pixel = canvas.pixel(1, 1).expect("pixel");
        assert!(pixel[0] > 90 && pixel[0] < 110, "pixel={pixel:?}");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn zero_alpha_fill_leaves_frame_untouched() {
        let mut buffer = frame(2, 2);
        let mut canvas = Canvas::new(&mut buffer, 2, 2);
        canvas.clear(RED);
        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
    }

    #[test]
    fn blit_copies_sub_rect_and_skips_transparent_pixels() {
        let image = SpriteImage::from_rgba(
            2,
            1,
            vec![255, 0, 0, 255, 0, 255, 0, 0],
        )
        .expect("image");
        let mut buffer = frame(3, 3);
        let mut canvas = Canvas::new(&mut buffer, 3, 3);
        canvas.clear(BLACK);

        canvas.blit(&image, None, Vec2::new(1.0, 1.0));
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(2, 1), Some(BLACK));

        canvas.blit(&image, Some(PixelRect::new(0, 0, 1, 1)), Vec2::new(0.0, 2.0));
        assert_eq!(canvas.pixel(0, 2), Some(RED));
        assert_eq!(canvas.pixel(1, 2), Some(BLACK));
    }

    #[test]
    fn blit_scaled_stretches_with_nearest_neighbour() {
        let image = SpriteImage::from_rgba(1, 1, RED.to_vec()).expect("image");
        let mut buffer = frame(4, 4);
        let mut canvas = Canvas::new(&mut buffer, 4, 4);
        canvas.blit_scaled(&image, None, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(canvas.pixel(3, 3), Some(RED));
    }

    #[test]
    fn out_of_bounds_source_is_ignored() {
        let image = SpriteImage::from_rgba(1, 1, RED.to_vec()).expect("image");
        let mut buffer = frame(2, 2);
        let mut canvas = Canvas::new(&mut buffer, 2, 2);
        canvas.blit(&image, Some(PixelRect::new(0, 0, 2, 2)), Vec2::ZERO);
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn ellipse_covers_center_but_not_corners() {
        let mut buffer = frame(10, 10);
        let mut canvas = Canvas::new(&mut buffer, 10, 10);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 5.0, RED);
        assert_eq!(canvas.pixel(5, 5), Some(RED));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn text_draws_inside_frame_and_never_panics_at_edges() {
        let mut buffer = frame(16, 8);
        let mut canvas = Canvas::new(&mut buffer, 16, 8);
        canvas.draw_text(Vec2::new(0.0, 0.0), "1", 1, RED);
        assert_eq!(canvas.pixel(1, 0), Some(RED));
        canvas.draw_text(Vec2::new(-5.0, -5.0), "Hello, world!", 3, RED);
        canvas.draw_text(Vec2::new(14.0, 6.0), "W", 4, RED);
    }

    #[test]
    fn outline_leaves_interior_empty() {
        let mut buffer = frame(6, 6);
        let mut canvas = Canvas::new(&mut buffer, 6, 6);
        canvas.rect_outline(Rect::new(0.0, 0.0, 6.0, 6.0), 1.0, RED);
        assert_eq!(canvas.pixel(0, 3), Some(RED));
        assert_eq!(canvas.pixel(5, 5), Some(RED));
        assert_eq!(canvas.pixel(3, 3), Some([0, 0, 0, 0]));
    }
}
