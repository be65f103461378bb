pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;

/// 3x5 glyphs, one `u16` per glyph with rows packed top to bottom (3 bits
/// each, most significant bit on the left). Covers `' '..='`'` followed by
/// `'{'..='~'`; lowercase letters reuse the uppercase shapes.
const GLYPHS: [u16; 69] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400, //
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4, //
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292, //
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2, //
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f, //
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f, //
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd, //
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007, //
    0x4400, 0x3593, 0x2492, 0x64d6, 0x0780,
];

const FALLBACK_GLYPH: u16 = 0x72c2;

pub(crate) fn glyph_bits(ch: char) -> u16 {
    let ch = ch.to_ascii_uppercase();
    let index = match ch {
        ' '..='`' => ch as usize - ' ' as usize,
        '{'..='~' => 65 + (ch as usize - '{' as usize),
        _ => return FALLBACK_GLYPH,
    };
    GLYPHS[index]
}

pub(crate) fn glyph_pixel_set(bits: u16, col: i32, row: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    bits & (1 << shift) != 0
}

/// Horizontal advance in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * (GLYPH_WIDTH + 1) * scale.max(1) - scale.max(1)
}

pub fn line_height(scale: i32) -> i32 {
    GLYPH_HEIGHT * scale.max(1)
}
