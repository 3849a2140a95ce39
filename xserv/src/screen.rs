use xserv_abi::display::DisplayMode;
use xserv_abi::geometry::Size;
use xserv_gfx::Layer;

use crate::error::XservResult;
use crate::tree::ViewTree;
use crate::view::ViewId;

/// Graphics-mode state: the view tree and the off-screen frame it is
/// composited into before being presented.
#[derive(Debug)]
pub struct Screen {
    pub tree: ViewTree,
    /// The composited frame, presented once per refresh.
    pub vmem: Layer,
    pub mode: DisplayMode,
    /// Cleared while a frame is being composited.
    pub finished_drawing: bool,
}

impl Screen {
    pub fn new(mode: DisplayMode) -> Self {
        let size = mode.size();
        Self {
            tree: ViewTree::new(size, mode.format),
            vmem: Layer::new(size, mode.format),
            mode,
            finished_drawing: true,
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.mode.size()
    }

    #[inline]
    pub fn root(&self) -> ViewId {
        self.tree.root()
    }

    /// Flag every node, label and bitmap on the desktop, so even a strict
    /// pass repaints all of it.
    pub fn mark_all_dirty(&mut self) -> XservResult {
        let root = self.tree.root();
        self.tree.mark_subtree_needs_redraw(root)
    }
}
