use xserv_abi::draw::{Canvas, Color32};
use xserv_abi::font::{
    FONT_CHAR_HEIGHT, FONT_CHAR_WIDTH, FONT_PADDING_H, FONT_PADDING_W, get_glyph_or_space,
};
use xserv_abi::geometry::Size;

/// Draw one glyph with its top-left corner at `(x, y)`. Only set bits are
/// painted; the background shows through.
pub fn draw_char<T: Canvas>(target: &mut T, x: i32, y: i32, ch: u8, fg: Color32) {
    let fg_px = target.pixel_format().encode(fg);
    let glyph = get_glyph_or_space(ch);

    for (row_idx, &row_bits) in glyph.iter().enumerate() {
        let py = y + row_idx as i32;
        for col in 0..FONT_CHAR_WIDTH {
            if row_bits & (1 << col) != 0 {
                target.put_pixel(x + col, py, fg_px);
            }
        }
    }
}

/// Lay `text` out from the top-left corner of a `bounds`-sized box, wrapping
/// at the right edge and on `'\n'`. Layout stops at the first line that
/// would not fit vertically.
pub fn draw_string<T: Canvas>(target: &mut T, text: &[u8], fg: Color32, bounds: Size) {
    let advance_x = FONT_CHAR_WIDTH + FONT_PADDING_W;
    let advance_y = FONT_CHAR_HEIGHT + FONT_PADDING_H;
    let mut x = 0;
    let mut y = 0;

    for &ch in text {
        if ch == 0 {
            break;
        }
        if x + advance_x > bounds.width || ch == b'\n' {
            x = 0;
            if y + advance_y > bounds.height {
                break;
            }
            y += advance_y;
        }
        if ch == b'\n' {
            continue;
        }

        draw_char(target, x, y, ch, fg);
        x += advance_x;
    }
}

#[inline]
pub fn draw_str<T: Canvas>(target: &mut T, text: &str, fg: Color32, bounds: Size) {
    draw_string(target, text.as_bytes(), fg, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;
    use xserv_abi::pixel::PixelFormat;

    fn inked(l: &Layer, x0: i32, y0: i32, w: i32, h: i32) -> usize {
        let mut n = 0;
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                if l.pixel_at(x, y) == Some(Color32::WHITE) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_char_paints_only_set_bits() {
        let mut l = Layer::new(Size::new(8, 8), PixelFormat::Rgb888);
        draw_char(&mut l, 0, 0, b'_', Color32::WHITE);
        assert_eq!(inked(&l, 0, 7, 8, 1), 8);
        assert_eq!(inked(&l, 0, 0, 8, 7), 0);
    }

    #[test]
    fn test_string_wraps_at_right_edge() {
        let mut l = Layer::new(Size::new(16, 30), PixelFormat::Rgb888);
        draw_str(&mut l, "___", Color32::WHITE, Size::new(16, 30));
        assert_eq!(inked(&l, 0, 7, 16, 1), 16);
        assert_eq!(inked(&l, 0, 17, 8, 1), 8);
        assert_eq!(inked(&l, 8, 17, 8, 1), 0);
    }

    #[test]
    fn test_newline_starts_next_line() {
        let mut l = Layer::new(Size::new(32, 30), PixelFormat::Rgb888);
        draw_str(&mut l, "_\n_", Color32::WHITE, Size::new(32, 30));
        assert_eq!(inked(&l, 0, 7, 32, 1), 8);
        assert_eq!(inked(&l, 0, 17, 8, 1), 8);
    }
}
