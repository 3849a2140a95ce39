//! Building the final frame from window layers.

use xserv_abi::draw::Color32;
use xserv_abi::geometry::{Coordinate, Rect, Size};
use xserv_gfx::{Layer, Thickness, blit_layer, draw_rect};
use xserv_lib::{klog_debug, klog_warn};

use crate::config::ServerConfig;
use crate::error::XservResult;
use crate::platform::BitmapLoader;
use crate::redraw::{RedrawPass, draw_bmp, draw_window};
use crate::screen::Screen;
use crate::view::Bmp;

/// Repaint whatever is dirty, then composite the root window and every
/// top-level window, back to front, into `vmem`.
pub fn draw_desktop(screen: &mut Screen, pass: &mut RedrawPass) -> XservResult {
    let root = screen.tree.root();
    draw_window(&mut screen.tree, root, pass)?;
    blit_layer(&mut screen.vmem, screen.tree.layer(root)?, Coordinate::ZERO);

    let mut i = 0;
    while let Some(window) = screen.tree.windows().get(i).copied() {
        draw_window(&mut screen.tree, window, pass)?;
        let node = screen.tree.node(window)?;
        blit_layer(&mut screen.vmem, node.layer(), node.frame().origin);
        i += 1;
    }
    Ok(())
}

enum CursorImage {
    Unloaded,
    Bitmap(Bmp),
    Missing,
}

/// The pointer sprite, drawn straight into `vmem` above everything else.
///
/// The bitmap is loaded on first use; if that fails a filled rectangle is
/// drawn instead and loading is not retried. Drawing the cursor never
/// touches the redraw pass, so pointer motion alone does not count as a
/// repaint.
pub struct Cursor {
    image: CursorImage,
    path: &'static str,
    size: Size,
    fallback_size: Size,
    fallback_color: Color32,
}

impl Cursor {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            image: CursorImage::Unloaded,
            path: config.cursor_path,
            size: config.cursor_size,
            fallback_size: config.fallback_cursor_size,
            fallback_color: config.fallback_cursor_color,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.image, CursorImage::Bitmap(_))
    }

    fn ensure_loaded<L: BitmapLoader + ?Sized>(&mut self, loader: &mut L, vmem: &Layer) {
        if !matches!(self.image, CursorImage::Unloaded) {
            return;
        }
        let frame = Rect::with_size(self.size);
        self.image = match loader.load_bitmap(frame, self.path, vmem.format()) {
            Some(bmp) => {
                klog_debug!("xserv: cursor loaded from {}", self.path);
                CursorImage::Bitmap(bmp)
            }
            None => {
                klog_warn!("xserv: cannot load {}, using fallback cursor", self.path);
                CursorImage::Missing
            }
        };
    }

    pub fn draw<L: BitmapLoader + ?Sized>(
        &mut self,
        vmem: &mut Layer,
        loader: &mut L,
        position: Coordinate,
    ) {
        self.ensure_loaded(loader, vmem);
        match &mut self.image {
            CursorImage::Bitmap(bmp) => {
                bmp.frame.origin = position;
                draw_bmp(vmem, bmp);
            }
            _ => draw_rect(
                vmem,
                Rect::from_parts(position, self.fallback_size),
                self.fallback_color,
                Thickness::Filled,
            ),
        }
    }
}
