use xserv_abi::draw::{Canvas, Color32, EncodedPixel};
use xserv_abi::geometry::Rect;

/// How much of a rectangle [`draw_rect`] paints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Thickness {
    Filled,
    /// An outline this many pixels wide, growing inward.
    Px(u32),
}

pub fn fill_rect<T: Canvas>(target: &mut T, rect: Rect, color: Color32) {
    let px = target.pixel_format().encode(color);
    target.fill_rect_encoded(rect, px);
}

fn outline<T: Canvas>(target: &mut T, x: i32, y: i32, w: i32, h: i32, px: EncodedPixel) {
    let right = x + w - 1;
    let bottom = y + h - 1;
    target.fill_span(y, x, right, px);
    target.fill_span(bottom, x, right, px);
    for row in y + 1..bottom {
        target.put_pixel(x, row, px);
        target.put_pixel(right, row, px);
    }
}

/// Paint `rect`, either solid or as an inward-growing outline.
///
/// An outline at least half as thick as the rect's short side covers the
/// whole rect. Everything is clipped to the target.
pub fn draw_rect<T: Canvas>(target: &mut T, rect: Rect, color: Color32, thickness: Thickness) {
    if rect.is_empty() {
        return;
    }
    let (x, y, w, h) = (rect.min_x(), rect.min_y(), rect.size.width, rect.size.height);

    match thickness {
        Thickness::Filled => fill_rect(target, rect, color),
        Thickness::Px(n) => {
            let px = target.pixel_format().encode(color);
            for i in 0..n as i32 {
                let (iw, ih) = (w - 2 * i, h - 2 * i);
                if iw <= 0 || ih <= 0 {
                    break;
                }
                outline(target, x + i, y + i, iw, ih, px);
            }
        }
    }
}
