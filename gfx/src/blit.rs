//! Layer-to-layer compositing.
//!
//! Both layers are expected to share a pixel format (every layer in the
//! server is created in the active display mode's format). Only the leading
//! colour bytes of each pixel are blended; a trailing padding or alpha byte
//! in the destination is left as it was.

use xserv_abi::geometry::{Coordinate, Rect};

use crate::layer::Layer;

/// Alpha value with a dedicated averaging path.
const HALF: f32 = 0.5;

/// Composite `src` onto `dest` with `src`'s top-left corner at `origin`
/// (destination coordinates).
///
/// The placement is clipped against `dest`; parts of `src` that fall off any
/// edge are skipped. An opaque source is copied row by row, a fully
/// transparent one is ignored, anything in between is blended per channel.
pub fn blit_layer(dest: &mut Layer, src: &Layer, origin: Coordinate) {
    debug_assert_eq!(dest.format(), src.format());

    let placed = Rect::from_parts(origin, src.size());
    let Some((visible, skipped)) = placed.clip_to(dest.size()) else {
        return;
    };

    let alpha = src.alpha();
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        copy_rows(dest, src, visible, skipped);
    } else if alpha == HALF {
        blend_rows(dest, src, visible, skipped, |d, s| ((d as u16 + s as u16) / 2) as u8);
    } else {
        let coeff = (alpha * 256.0) as i32;
        blend_rows(dest, src, visible, skipped, |d, s| {
            let d = d as i32;
            (d + (((s as i32 - d) * coeff) >> 8)) as u8
        });
    }
}

/// Copy the part of `src` under `frame` into a new, opaque layer.
///
/// `frame` is clipped to `src` exactly the way [`blit_layer`] clips its
/// placement; the snapshot has the clipped size (possibly empty).
pub fn layer_snapshot(src: &Layer, frame: Rect) -> Layer {
    let Some((visible, _)) = frame.clip_to(src.size()) else {
        return Layer::new(Default::default(), src.format());
    };

    let mut snapshot = Layer::new(visible.size, src.format());
    let bpp = src.bpp();
    let row_len = visible.size.width as usize * bpp;
    let src_pitch = src.pitch();
    let snap_pitch = snapshot.pitch();

    for row in 0..visible.size.height as usize {
        let s = (visible.min_y() as usize + row) * src_pitch + visible.min_x() as usize * bpp;
        let d = row * snap_pitch;
        snapshot.raw_mut()[d..d + row_len].copy_from_slice(&src.raw()[s..s + row_len]);
    }
    snapshot
}

fn copy_rows(dest: &mut Layer, src: &Layer, visible: Rect, skipped: Coordinate) {
    let bpp = dest.bpp();
    let row_len = visible.size.width as usize * bpp;
    let dest_pitch = dest.pitch();
    let src_pitch = src.pitch();

    for row in 0..visible.size.height as usize {
        let d = (visible.min_y() as usize + row) * dest_pitch + visible.min_x() as usize * bpp;
        let s = (skipped.y as usize + row) * src_pitch + skipped.x as usize * bpp;
        dest.raw_mut()[d..d + row_len].copy_from_slice(&src.raw()[s..s + row_len]);
    }
}

fn blend_rows(
    dest: &mut Layer,
    src: &Layer,
    visible: Rect,
    skipped: Coordinate,
    mix: impl Fn(u8, u8) -> u8,
) {
    let bpp = dest.bpp();
    let channels = dest.format().color_bytes();
    let row_len = visible.size.width as usize * bpp;
    let dest_pitch = dest.pitch();
    let src_pitch = src.pitch();

    for row in 0..visible.size.height as usize {
        let d = (visible.min_y() as usize + row) * dest_pitch + visible.min_x() as usize * bpp;
        let s = (skipped.y as usize + row) * src_pitch + skipped.x as usize * bpp;
        let src_row = &src.raw()[s..s + row_len];
        let dest_row = &mut dest.raw_mut()[d..d + row_len];

        for (dp, sp) in dest_row.chunks_exact_mut(bpp).zip(src_row.chunks_exact(bpp)) {
            for c in 0..channels {
                dp[c] = mix(dp[c], sp[c]);
            }
        }
    }
}
