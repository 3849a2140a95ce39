//! Repainting views and windows into their own layers.
//!
//! A window's `needs_redraw` flag decides whether anything under it is
//! repainted this frame. Inside a dirty window the traversal carries a
//! `forced` bit down from the window instead of reading each view's own
//! flag; [`RedrawMode::Strict`] narrows that to the views that are flagged.

use xserv_abi::draw::Color32;
use xserv_abi::geometry::Rect;
use xserv_gfx::canvas_font::draw_string;
use xserv_gfx::{Layer, Thickness, blit_layer, draw_rect};

use crate::config::RedrawMode;
use crate::error::{XservError, XservResult};
use crate::tree::ViewTree;
use crate::view::{Bmp, Label, Node, ViewId};

/// Per-frame redraw state.
#[derive(Debug, Clone, Copy)]
pub struct RedrawPass {
    pub mode: RedrawMode,
    /// Set as soon as anything is repainted.
    pub dirtied: bool,
}

impl RedrawPass {
    pub fn new(mode: RedrawMode) -> Self {
        Self {
            mode,
            dirtied: false,
        }
    }
}

/// Render `label` over `background` and composite it into `dest` at the
/// label's origin.
pub fn draw_label(dest: &mut Layer, label: &mut Label, background: Color32) {
    label.layer.fill(background);
    let bounds = label.frame.size;
    draw_string(&mut label.layer, label.text.as_bytes(), label.text_color, bounds);
    blit_layer(dest, &label.layer, label.frame.origin);
    label.needs_redraw = false;
}

pub fn draw_bmp(dest: &mut Layer, bmp: &mut Bmp) {
    blit_layer(dest, &bmp.layer, bmp.frame.origin);
    bmp.needs_redraw = false;
}

/// Background, then labels, then bitmaps.
fn paint_node(node: &mut Node) {
    let background = node.background_color;
    let Node {
        layer,
        labels,
        bmps,
        needs_redraw,
        ..
    } = node;

    layer.fill(background);
    for label in labels.iter_mut() {
        draw_label(layer, label, background);
    }
    for bmp in bmps.iter_mut().flatten() {
        draw_bmp(layer, bmp);
    }
    *needs_redraw = false;
}

fn composite(tree: &mut ViewTree, parent: ViewId, child: ViewId) -> XservResult {
    let (dest, src) = tree.pair_mut(parent, child)?;
    blit_layer(&mut dest.layer, &src.layer, src.frame.origin);
    Ok(())
}

/// Repaint the subviews of `parent` that the pass selects and composite
/// every one of them into `parent`'s layer, back to front.
fn draw_children(
    tree: &mut ViewTree,
    parent: ViewId,
    pass: &mut RedrawPass,
    forced: bool,
) -> XservResult {
    let mut i = 0;
    while let Some(child) = tree.node(parent)?.subviews.get(i).copied() {
        if tree.is_window(child) {
            draw_window(tree, child, pass)?;
        } else {
            draw_view(tree, child, pass, forced)?;
        }
        composite(tree, parent, child)?;
        i += 1;
    }
    Ok(())
}

/// Repaint `id` and its subviews into their layers.
///
/// In coarse mode the view is repainted exactly when `forced` is set. In
/// strict mode it is also repainted when it or anything below it is
/// flagged, and a flagged view forces its own subviews.
pub fn draw_view(tree: &mut ViewTree, id: ViewId, pass: &mut RedrawPass, forced: bool) -> XservResult {
    let flagged = tree.node(id)?.is_flagged();
    let repaint = match pass.mode {
        RedrawMode::Coarse => forced,
        RedrawMode::Strict => forced || tree.subtree_needs_redraw(id)?,
    };
    if !repaint {
        return Ok(());
    }

    pass.dirtied = true;
    paint_node(tree.node_mut(id)?);
    draw_children(tree, id, pass, forced || flagged)
}

/// Copy the window title into the first title label, flagging the title
/// view when the text changed.
fn sync_title(tree: &mut ViewTree, window: ViewId, title_view: ViewId) -> XservResult {
    let (view, owner) = tree.pair_mut(title_view, window)?;
    let Some(parts) = owner.window.as_ref() else {
        return Err(XservError::NotAWindow(window));
    };
    if let Some(label) = view.labels.first_mut() {
        if label.text != parts.title {
            label.set_text(&parts.title);
            view.needs_redraw = true;
        }
    }
    Ok(())
}

/// Repaint a dirty window: border, title bar, content, then any windows
/// nested inside it, all composited into the window's layer under a
/// one-pixel black frame. Returns whether anything was drawn.
///
/// The root window's own subviews are the top-level windows; the
/// compositor draws those separately.
pub fn draw_window(tree: &mut ViewTree, window: ViewId, pass: &mut RedrawPass) -> XservResult<bool> {
    let node = tree.node(window)?;
    if !node.needs_redraw {
        return Ok(false);
    }
    let parts = node.window.as_ref().ok_or(XservError::NotAWindow(window))?;
    let (title_view, content_view) = (parts.title_view, parts.content_view);
    let (border_color, border_width) = (parts.border_color, parts.border_width);
    let bounds = Rect::with_size(node.frame.size);

    pass.dirtied = true;
    let forced = pass.mode == RedrawMode::Coarse;

    draw_rect(
        tree.layer_mut(window)?,
        bounds,
        border_color,
        Thickness::Px(border_width),
    );

    if let Some(title_view) = title_view {
        sync_title(tree, window, title_view)?;
        draw_view(tree, title_view, pass, forced)?;
    }

    if let Some(content_view) = content_view {
        draw_view(tree, content_view, pass, forced)?;
        if border_width > 0 {
            let content = tree.node_mut(content_view)?;
            let inner = Rect::with_size(content.frame.size);
            draw_rect(
                &mut content.layer,
                inner,
                Color32::GRAY,
                Thickness::Px(border_width),
            );
        }
    }

    for part in [title_view, content_view].into_iter().flatten() {
        composite(tree, window, part)?;
    }
    if window != tree.root() {
        draw_children(tree, window, pass, forced)?;
    }

    draw_rect(tree.layer_mut(window)?, bounds, Color32::BLACK, Thickness::Px(1));
    tree.node_mut(window)?.needs_redraw = false;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xserv_abi::geometry::Size;
    use xserv_abi::pixel::PixelFormat;

    struct Fixture {
        tree: ViewTree,
        window: ViewId,
        content: ViewId,
        a: ViewId,
        b: ViewId,
    }

    /// A window at (10,10) whose content view (at (2,20) in the window)
    /// holds two red views side by side.
    fn fixture() -> Fixture {
        let mut tree = ViewTree::new(Size::new(200, 150), PixelFormat::Rgb888);
        let window = tree.create_window(Rect::new(10, 10, 100, 80), "demo");
        tree.add_subview(tree.root(), window).unwrap();
        let content = tree.content_view(window).unwrap().unwrap();
        let a = tree.create_view(Rect::new(5, 5, 10, 10));
        let b = tree.create_view(Rect::new(30, 5, 10, 10));
        tree.set_background_color(a, Color32::RED).unwrap();
        tree.set_background_color(b, Color32::RED).unwrap();
        tree.add_subview(content, a).unwrap();
        tree.add_subview(content, b).unwrap();
        Fixture {
            tree,
            window,
            content,
            a,
            b,
        }
    }

    fn first_draw(f: &mut Fixture, mode: RedrawMode) {
        let mut pass = RedrawPass::new(mode);
        assert!(draw_window(&mut f.tree, f.window, &mut pass).unwrap());
        assert!(pass.dirtied);
    }

    #[test]
    fn test_first_draw_composites_everything() {
        let mut f = fixture();
        first_draw(&mut f, RedrawMode::Coarse);

        let layer = f.tree.layer(f.window).unwrap();
        assert_eq!(layer.pixel_at(7, 25), Some(Color32::RED));
        assert_eq!(layer.pixel_at(0, 0), Some(Color32::BLACK));
        assert_eq!(layer.pixel_at(50, 2), Some(crate::view::DEFAULT_TITLE_COLOR));
        // Inner border on the content view's edge.
        assert_eq!(layer.pixel_at(2, 40), Some(Color32::GRAY));
        assert!(!f.tree.subtree_needs_redraw(f.content).unwrap());
        assert!(!f.tree.needs_redraw(f.window).unwrap());
    }

    #[test]
    fn test_window_flag_forces_full_repaint() {
        let mut f = fixture();
        let label = f.tree.create_label(Rect::new(0, 0, 8, 8), "");
        f.tree.add_sublabel(f.a, label).unwrap();
        let bmp = Bmp::new(
            Rect::new(1, 1, 3, 3),
            Layer::new(Size::new(3, 3), PixelFormat::Rgb888),
        );
        f.tree.add_bmp(f.b, bmp).unwrap();
        first_draw(&mut f, RedrawMode::Coarse);

        // New pixels everywhere, but only the window is flagged.
        f.tree.node_mut(f.a).unwrap().background_color = Color32::BLUE;
        if let Some(bmp) = f.tree.node_mut(f.b).unwrap().bmps[0].as_mut() {
            bmp.layer.fill(Color32::GREEN);
        }
        f.tree.node_mut(f.window).unwrap().needs_redraw = true;
        assert!(!f.tree.node(f.a).unwrap().is_flagged());
        assert!(!f.tree.node(f.b).unwrap().is_flagged());

        let mut pass = RedrawPass::new(RedrawMode::Coarse);
        assert!(draw_window(&mut f.tree, f.window, &mut pass).unwrap());
        assert!(!f.tree.needs_redraw(f.window).unwrap());

        let a = f.tree.node(f.a).unwrap();
        assert_eq!(a.labels()[0].layer().pixel_at(3, 3), Some(Color32::BLUE));
        assert!(!a.labels()[0].needs_redraw);
        let b = f.tree.node(f.b).unwrap();
        assert_eq!(b.layer().pixel_at(2, 2), Some(Color32::GREEN));
        assert!(!b.bmps()[0].as_ref().unwrap().needs_redraw);

        let window = f.tree.layer(f.window).unwrap();
        assert_eq!(window.pixel_at(7, 25), Some(Color32::BLUE));
        // b at (30,5) in content, content at (2,20); bitmap at (1,1) in b.
        assert_eq!(window.pixel_at(34, 27), Some(Color32::GREEN));
    }

    #[test]
    fn test_clean_window_is_skipped() {
        let mut f = fixture();
        first_draw(&mut f, RedrawMode::Coarse);

        f.tree.node_mut(f.a).unwrap().background_color = Color32::BLUE;
        let mut pass = RedrawPass::new(RedrawMode::Coarse);
        assert!(!draw_window(&mut f.tree, f.window, &mut pass).unwrap());
        assert!(!pass.dirtied);
        assert_eq!(f.tree.layer(f.a).unwrap().pixel_at(0, 0), Some(Color32::RED));
        assert_eq!(f.tree.layer(f.window).unwrap().pixel_at(7, 25), Some(Color32::RED));
    }

    #[test]
    fn test_strict_mode_repaints_only_flagged_views() {
        let mut f = fixture();
        first_draw(&mut f, RedrawMode::Strict);

        f.tree.node_mut(f.a).unwrap().background_color = Color32::BLUE;
        f.tree.node_mut(f.b).unwrap().background_color = Color32::BLUE;
        f.tree.mark_needs_redraw(f.a).unwrap();

        let mut pass = RedrawPass::new(RedrawMode::Strict);
        assert!(draw_window(&mut f.tree, f.window, &mut pass).unwrap());
        assert_eq!(f.tree.layer(f.a).unwrap().pixel_at(0, 0), Some(Color32::BLUE));
        assert_eq!(f.tree.layer(f.b).unwrap().pixel_at(0, 0), Some(Color32::RED));

        let layer = f.tree.layer(f.window).unwrap();
        assert_eq!(layer.pixel_at(7, 25), Some(Color32::BLUE));
        assert_eq!(layer.pixel_at(32, 25), Some(Color32::RED));
    }

    #[test]
    fn test_coarse_mode_ignores_view_flags() {
        let mut f = fixture();
        first_draw(&mut f, RedrawMode::Coarse);

        f.tree.node_mut(f.b).unwrap().background_color = Color32::BLUE;
        f.tree.mark_needs_redraw(f.a).unwrap();

        let mut pass = RedrawPass::new(RedrawMode::Coarse);
        draw_window(&mut f.tree, f.window, &mut pass).unwrap();
        assert_eq!(f.tree.layer(f.b).unwrap().pixel_at(0, 0), Some(Color32::BLUE));
    }

    #[test]
    fn test_title_follows_window_title() {
        let mut f = fixture();
        first_draw(&mut f, RedrawMode::Strict);

        f.tree.set_title(f.window, "renamed").unwrap();
        let mut pass = RedrawPass::new(RedrawMode::Strict);
        draw_window(&mut f.tree, f.window, &mut pass).unwrap();

        let title = f.tree.title_view(f.window).unwrap().unwrap();
        let label = &f.tree.node(title).unwrap().labels()[0];
        assert_eq!(label.text, "renamed");
        assert!(!label.needs_redraw);
    }

    #[test]
    fn test_label_takes_view_background() {
        let mut f = fixture();
        let label = f.tree.create_label(Rect::new(0, 0, 8, 8), " ");
        f.tree.set_background_color(f.b, Color32::GREEN).unwrap();
        f.tree.add_sublabel(f.b, label).unwrap();
        first_draw(&mut f, RedrawMode::Coarse);

        let node = f.tree.node(f.b).unwrap();
        assert_eq!(node.labels()[0].layer().pixel_at(3, 3), Some(Color32::GREEN));
        assert!(!node.labels()[0].needs_redraw);
    }

    #[test]
    fn test_bitmaps_draw_after_labels() {
        let mut f = fixture();
        let mut image = Layer::new(Size::new(4, 4), PixelFormat::Rgb888);
        image.fill(Color32::PURPLE);
        let label = f.tree.create_label(Rect::new(0, 0, 8, 8), "");
        f.tree.add_sublabel(f.a, label).unwrap();
        let bmp = f.tree.create_bmp(Rect::new(2, 2, 4, 4), image);
        f.tree.add_bmp(f.a, bmp).unwrap();
        first_draw(&mut f, RedrawMode::Coarse);

        let layer = f.tree.layer(f.a).unwrap();
        assert_eq!(layer.pixel_at(3, 3), Some(Color32::PURPLE));
        assert_eq!(layer.pixel_at(0, 0), Some(Color32::RED));
    }

    #[test]
    fn test_nested_window_is_composited() {
        let mut f = fixture();
        let nested = f.tree.create_window(Rect::new(40, 30, 30, 30), "n");
        f.tree.add_subview(f.window, nested).unwrap();
        first_draw(&mut f, RedrawMode::Coarse);

        assert!(!f.tree.needs_redraw(nested).unwrap());
        let layer = f.tree.layer(f.window).unwrap();
        assert_eq!(layer.pixel_at(40, 30), Some(Color32::BLACK));
        assert_eq!(layer.pixel_at(50, 35), Some(crate::view::DEFAULT_TITLE_COLOR));
    }
}
