//! Pointer and keyboard routing: grabbing, raising, dragging, and the
//! single-key commands.

use xserv_abi::draw::Color32;
use xserv_abi::geometry::{Coordinate, Rect};
use xserv_abi::input::ButtonMask;
use xserv_lib::klog_debug;

use crate::config::ServerConfig;
use crate::error::XservResult;
use crate::tree::ViewTree;
use crate::view::ViewId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    /// `q`: leave graphics mode and stop the server.
    Quit,
    /// `r`: repaint everything.
    RefreshAll,
    /// `a`: flip the topmost window between translucent and opaque.
    ToggleAlpha,
}

impl KeyCommand {
    pub fn from_key(ch: u8) -> Option<Self> {
        match ch {
            b'q' => Some(KeyCommand::Quit),
            b'r' => Some(KeyCommand::RefreshAll),
            b'a' => Some(KeyCommand::ToggleAlpha),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCommand::Quit => "quit",
            KeyCommand::RefreshAll => "refresh",
            KeyCommand::ToggleAlpha => "toggle alpha",
        }
    }
}

/// The topmost top-level window under `p`, or the root window. A point on
/// any edge of a frame, the far ones included, is inside it.
pub fn window_containing_point(tree: &ViewTree, p: Coordinate) -> ViewId {
    tree.windows()
        .iter()
        .rev()
        .copied()
        .find(|&w| tree.frame(w).is_ok_and(|frame| frame.contains(p)))
        .unwrap_or(tree.root())
}

/// The root, or a live window attached directly under it.
fn is_open(tree: &ViewTree, window: ViewId) -> bool {
    window == tree.root() || tree.superview(window).is_ok_and(|s| s == Some(tree.root()))
}

/// Drag and focus state carried from one frame to the next.
#[derive(Debug)]
pub struct WindowManager {
    grabbed: Option<ViewId>,
    active: Option<ViewId>,
    last_pointer: Option<Coordinate>,
    active_title: Color32,
    inactive_title: Color32,
    translucent_alpha: f32,
}

impl WindowManager {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            grabbed: None,
            active: None,
            last_pointer: None,
            active_title: config.active_title_color,
            inactive_title: config.inactive_title_color,
            translucent_alpha: config.translucent_alpha,
        }
    }

    pub fn grabbed(&self) -> Option<ViewId> {
        self.grabbed
    }

    pub fn active(&self) -> Option<ViewId> {
        self.active
    }

    pub fn last_pointer(&self) -> Option<Coordinate> {
        self.last_pointer
    }

    /// Recolour every top-level title bar, `window`'s as active and the
    /// rest as inactive, and flag them all for repaint.
    pub fn set_active_window(&mut self, tree: &mut ViewTree, window: ViewId) -> XservResult {
        self.active = Some(window);
        let mut i = 0;
        while let Some(w) = tree.windows().get(i).copied() {
            let color = if w == window {
                self.active_title
            } else {
                self.inactive_title
            };
            if let Some(title) = tree.title_view(w)? {
                tree.set_background_color(title, color)?;
            }
            tree.mark_needs_redraw(w)?;
            i += 1;
        }
        Ok(())
    }

    /// Route one frame's pointer state.
    ///
    /// A press with nothing grabbed grabs the window under the pointer,
    /// focusing and raising it unless it is the root or fully transparent.
    /// While held, a grabbed non-root window follows the pointer by the
    /// delta since the previous frame. Releasing drops the grab.
    ///
    /// A grabbed window that was closed in the meantime hands the grab to
    /// the root, so nothing else moves until the button is released.
    pub fn process_mouse(
        &mut self,
        tree: &mut ViewTree,
        position: Coordinate,
        buttons: ButtonMask,
    ) -> XservResult {
        let root = tree.root();
        self.forget_closed(tree);

        if buttons.left() {
            if self.grabbed.is_none() {
                let owner = window_containing_point(tree, position);
                self.grabbed = Some(owner);
                klog_debug!("wm: grabbed {} at ({}, {})", owner, position.x, position.y);

                if owner != root && tree.alpha(owner)? > 0.0 {
                    self.set_active_window(tree, owner)?;
                    tree.raise_subview(root, owner)?;
                }
            }

            if let (Some(grabbed), Some(last)) = (self.grabbed, self.last_pointer) {
                if grabbed != root {
                    let (dx, dy) = position.delta_from(last);
                    let frame = tree.frame(grabbed)?;
                    let moved = Rect::from_parts(frame.origin.translated(dx, dy), frame.size);
                    tree.set_frame(grabbed, moved)?;
                }
            }
        } else if let Some(released) = self.grabbed.take() {
            klog_debug!("wm: released {}", released);
        }

        self.last_pointer = Some(position);
        Ok(())
    }

    /// Switch the topmost window to the translucent alpha, or back to
    /// opaque if it already is exactly that. Returns the new alpha, or
    /// `None` with no window open.
    pub fn toggle_topmost_alpha(&self, tree: &mut ViewTree) -> XservResult<Option<f32>> {
        let Some(top) = tree.topmost() else {
            return Ok(None);
        };
        let next = if tree.alpha(top)? == self.translucent_alpha {
            1.0
        } else {
            self.translucent_alpha
        };
        tree.set_alpha(top, next)?;
        Ok(Some(next))
    }

    /// Drop handles to windows that are no longer open on the desktop.
    fn forget_closed(&mut self, tree: &ViewTree) {
        if let Some(grabbed) = self.grabbed.filter(|&w| !is_open(tree, w)) {
            klog_debug!("wm: grabbed {} was closed", grabbed);
            self.grabbed = Some(tree.root());
        }
        if self.active.is_some_and(|w| !is_open(tree, w)) {
            self.active = None;
        }
    }

    /// Forget the drag state, e.g. after the display was away.
    pub fn reset(&mut self) {
        self.grabbed = None;
        self.last_pointer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xserv_abi::geometry::Size;
    use xserv_abi::pixel::PixelFormat;

    const ACTIVE: Color32 = Color32::rgb(120, 245, 80);
    const INACTIVE: Color32 = Color32::rgb(50, 122, 40);

    fn desktop() -> (ViewTree, [ViewId; 3]) {
        let mut tree = ViewTree::new(Size::new(400, 300), PixelFormat::Rgb888);
        let root = tree.root();
        let a = tree.create_window(Rect::new(10, 10, 100, 100), "a");
        let b = tree.create_window(Rect::new(150, 10, 100, 100), "b");
        let c = tree.create_window(Rect::new(290, 10, 100, 100), "c");
        for w in [a, b, c] {
            tree.add_subview(root, w).unwrap();
        }
        (tree, [a, b, c])
    }

    fn title_color(tree: &ViewTree, w: ViewId) -> Color32 {
        let title = tree.title_view(w).unwrap().unwrap();
        tree.background_color(title).unwrap()
    }

    #[test]
    fn test_key_commands() {
        assert_eq!(KeyCommand::from_key(b'q'), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key(b'r'), Some(KeyCommand::RefreshAll));
        assert_eq!(KeyCommand::from_key(b'a'), Some(KeyCommand::ToggleAlpha));
        assert_eq!(KeyCommand::from_key(b'Q'), None);
    }

    #[test]
    fn test_hit_test_prefers_topmost_and_includes_edges() {
        let (mut tree, [a, _, _]) = desktop();
        let over = tree.create_window(Rect::new(50, 50, 100, 100), "over");
        let root = tree.root();
        tree.add_subview(root, over).unwrap();

        assert_eq!(window_containing_point(&tree, Coordinate::new(60, 60)), over);
        assert_eq!(window_containing_point(&tree, Coordinate::new(20, 20)), a);
        assert_eq!(window_containing_point(&tree, Coordinate::new(110, 110)), over);
        assert_eq!(window_containing_point(&tree, Coordinate::new(110, 30)), a);
        assert_eq!(window_containing_point(&tree, Coordinate::new(5, 290)), root);
    }

    #[test]
    fn test_grab_raises_and_recolours() {
        let (mut tree, [a, b, c]) = desktop();
        let mut wm = WindowManager::new(&ServerConfig::default());
        for w in [a, b, c] {
            tree.node_mut(w).unwrap().needs_redraw = false;
        }

        wm.process_mouse(&mut tree, Coordinate::new(200, 50), ButtonMask::LEFT)
            .unwrap();
        wm.process_mouse(&mut tree, Coordinate::new(200, 50), ButtonMask::empty())
            .unwrap();

        assert_eq!(tree.windows(), &[a, c, b]);
        assert_eq!(wm.active(), Some(b));
        assert_eq!(wm.grabbed(), None);
        assert_eq!(title_color(&tree, b), ACTIVE);
        assert_eq!(title_color(&tree, a), INACTIVE);
        assert_eq!(title_color(&tree, c), INACTIVE);
        for w in [a, b, c] {
            assert!(tree.needs_redraw(w).unwrap());
        }
    }

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let (mut tree, [a, _, _]) = desktop();
        let mut wm = WindowManager::new(&ServerConfig::default());

        wm.process_mouse(&mut tree, Coordinate::new(10, 10), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(tree.frame(a).unwrap().origin, Coordinate::new(10, 10));
        wm.process_mouse(&mut tree, Coordinate::new(14, 17), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(tree.frame(a).unwrap(), Rect::new(14, 17, 100, 100));

        // Still dragging `a` even once the pointer is over another window.
        wm.process_mouse(&mut tree, Coordinate::new(160, 17), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(tree.frame(a).unwrap().origin, Coordinate::new(160, 17));
        assert_eq!(wm.grabbed(), Some(a));
    }

    #[test]
    fn test_root_is_never_moved_or_raised() {
        let (mut tree, windows) = desktop();
        let mut wm = WindowManager::new(&ServerConfig::default());
        let root = tree.root();

        wm.process_mouse(&mut tree, Coordinate::new(5, 250), ButtonMask::LEFT)
            .unwrap();
        wm.process_mouse(&mut tree, Coordinate::new(50, 280), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(wm.grabbed(), Some(root));
        assert_eq!(wm.active(), None);
        assert_eq!(tree.frame(root).unwrap().origin, Coordinate::ZERO);
        assert_eq!(tree.windows(), &windows);
    }

    #[test]
    fn test_transparent_window_is_grabbed_but_not_raised() {
        let (mut tree, [a, b, c]) = desktop();
        tree.set_alpha(a, 0.0).unwrap();
        let mut wm = WindowManager::new(&ServerConfig::default());

        wm.process_mouse(&mut tree, Coordinate::new(20, 20), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(wm.grabbed(), Some(a));
        assert_eq!(wm.active(), None);
        assert_eq!(tree.windows(), &[a, b, c]);
    }

    #[test]
    fn test_alpha_toggle_round_trips() {
        let (mut tree, [_, _, c]) = desktop();
        let wm = WindowManager::new(&ServerConfig::default());

        assert_eq!(wm.toggle_topmost_alpha(&mut tree).unwrap(), Some(0.5));
        assert_eq!(tree.alpha(c).unwrap(), 0.5);
        assert_eq!(wm.toggle_topmost_alpha(&mut tree).unwrap(), Some(1.0));
        assert_eq!(tree.alpha(c).unwrap(), 1.0);
    }

    #[test]
    fn test_closed_window_loses_grab_and_focus() {
        let (mut tree, [a, b, _]) = desktop();
        let mut wm = WindowManager::new(&ServerConfig::default());
        let root = tree.root();

        wm.process_mouse(&mut tree, Coordinate::new(20, 20), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(wm.grabbed(), Some(a));
        tree.remove_subview(root, a).unwrap();
        tree.destroy(a).unwrap();

        // Still held over `b`: nothing else is grabbed or moved.
        wm.process_mouse(&mut tree, Coordinate::new(160, 20), ButtonMask::LEFT)
            .unwrap();
        assert_eq!(wm.grabbed(), Some(root));
        assert_eq!(wm.active(), None);
        assert_eq!(tree.frame(b).unwrap().origin, Coordinate::new(150, 10));

        wm.process_mouse(&mut tree, Coordinate::new(160, 20), ButtonMask::empty())
            .unwrap();
        assert_eq!(wm.grabbed(), None);
    }

    #[test]
    fn test_alpha_toggle_without_windows() {
        let mut tree = ViewTree::new(Size::new(10, 10), PixelFormat::Rgb888);
        let wm = WindowManager::new(&ServerConfig::default());
        assert_eq!(wm.toggle_topmost_alpha(&mut tree).unwrap(), None);
    }
}
