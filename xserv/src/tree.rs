//! The view hierarchy: an arena of nodes addressed by [`ViewId`].
//!
//! Ownership is strictly tree shaped. A parent lists its children in
//! `subviews` (back to front); the child's `superview` is only a handle used
//! for walking upward. A window's title and content views are owned through
//! its [`WindowParts`] instead and have no superview, which makes each of
//! them the root of its own little subtree. Finding the window a view
//! belongs to therefore means walking to that root and asking which window
//! claims it.

use alloc::string::String;
use alloc::vec::Vec;

use xserv_abi::draw::Color32;
use xserv_abi::geometry::{Rect, Size};
use xserv_abi::pixel::PixelFormat;
use xserv_gfx::Layer;

use crate::error::{XservError, XservResult};
use crate::view::{
    Bmp, DEFAULT_TITLE_COLOR, Label, Node, TITLE_LABEL_ORIGIN, ViewId, WINDOW_BORDER_WIDTH,
    WINDOW_TITLE_HEIGHT, WindowParts,
};

/// Translate `inner` by `outer`'s origin and clamp its size to `outer`'s.
///
/// Applied once per ancestor, so the clamp is cumulative: a deep view ends
/// up no larger than its smallest ancestor even where it would not overlap
/// that ancestor's edge.
#[inline]
pub fn convert_rect(outer: Rect, inner: Rect) -> Rect {
    Rect::from_parts(
        inner.origin.translated(outer.origin.x, outer.origin.y),
        inner.size.min(outer.size),
    )
}

#[derive(Debug)]
pub struct ViewTree {
    nodes: Vec<Option<Node>>,
    format: PixelFormat,
    root: ViewId,
}

impl ViewTree {
    /// A tree holding only the root window: no title bar, no border, and a
    /// content view covering all of `size`.
    pub fn new(size: Size, format: PixelFormat) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            format,
            root: ViewId(0),
        };
        let frame = Rect::with_size(size);
        let root = tree.insert(Node::new(frame, format));
        let content = tree.insert(Node::new(frame, format));
        if let Some(node) = tree.nodes[content.index()].as_mut() {
            node.part_of = Some(root);
        }
        if let Some(node) = tree.nodes[root.index()].as_mut() {
            node.window = Some(WindowParts {
                title: String::from("root"),
                title_view: None,
                content_view: Some(content),
                border_color: Color32::BLACK,
                border_width: 0,
            });
        }
        tree.root = root;
        tree
    }

    #[inline]
    pub fn root(&self) -> ViewId {
        self.root
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn insert(&mut self, node: Node) -> ViewId {
        let id = ViewId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    pub fn contains(&self, id: ViewId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    pub fn node(&self, id: ViewId) -> XservResult<&Node> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(XservError::UnknownView(id))
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> XservResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(XservError::UnknownView(id))
    }

    /// Mutable `dest` alongside shared `src`, for compositing one into the
    /// other.
    pub(crate) fn pair_mut(&mut self, dest: ViewId, src: ViewId) -> XservResult<(&mut Node, &Node)> {
        self.node(dest)?;
        self.node(src)?;
        let (d, s) = (dest.index(), src.index());
        let (dest_slot, src_slot) = if d < s {
            let (lo, hi) = self.nodes.split_at_mut(s);
            (&mut lo[d], &hi[0])
        } else if d > s {
            let (lo, hi) = self.nodes.split_at_mut(d);
            (&mut hi[0], &lo[s])
        } else {
            return Err(XservError::CyclicAttach(dest));
        };
        match (dest_slot.as_mut(), src_slot.as_ref()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(XservError::UnknownView(dest)),
        }
    }

    pub fn window(&self, id: ViewId) -> XservResult<&WindowParts> {
        self.node(id)?.window.as_ref().ok_or(XservError::NotAWindow(id))
    }

    fn window_mut(&mut self, id: ViewId) -> XservResult<&mut WindowParts> {
        self.node_mut(id)?
            .window
            .as_mut()
            .ok_or(XservError::NotAWindow(id))
    }

    pub fn is_window(&self, id: ViewId) -> bool {
        self.node(id).is_ok_and(Node::is_window)
    }

    pub fn frame(&self, id: ViewId) -> XservResult<Rect> {
        Ok(self.node(id)?.frame)
    }

    pub fn subviews(&self, id: ViewId) -> XservResult<&[ViewId]> {
        Ok(&self.node(id)?.subviews)
    }

    pub fn superview(&self, id: ViewId) -> XservResult<Option<ViewId>> {
        Ok(self.node(id)?.superview)
    }

    pub fn layer(&self, id: ViewId) -> XservResult<&Layer> {
        Ok(&self.node(id)?.layer)
    }

    pub(crate) fn layer_mut(&mut self, id: ViewId) -> XservResult<&mut Layer> {
        Ok(&mut self.node_mut(id)?.layer)
    }

    pub fn alpha(&self, id: ViewId) -> XservResult<f32> {
        Ok(self.node(id)?.layer.alpha())
    }

    pub fn background_color(&self, id: ViewId) -> XservResult<Color32> {
        Ok(self.node(id)?.background_color)
    }

    pub fn needs_redraw(&self, id: ViewId) -> XservResult<bool> {
        Ok(self.node(id)?.needs_redraw)
    }

    pub fn title_view(&self, id: ViewId) -> XservResult<Option<ViewId>> {
        Ok(self.window(id)?.title_view)
    }

    pub fn content_view(&self, id: ViewId) -> XservResult<Option<ViewId>> {
        Ok(self.window(id)?.content_view)
    }

    /// Top-level windows, back to front.
    pub fn windows(&self) -> &[ViewId] {
        match self.node(self.root) {
            Ok(root) => &root.subviews,
            Err(_) => &[],
        }
    }

    /// The topmost top-level window, if any is open.
    pub fn topmost(&self) -> Option<ViewId> {
        self.windows().last().copied()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    pub fn create_view(&mut self, frame: Rect) -> ViewId {
        self.insert(Node::new(frame, self.format))
    }

    /// A window with a title bar (holding one label showing `title`) across
    /// the top and a content view filling the rest inside the border.
    pub fn create_window(&mut self, frame: Rect, title: &str) -> ViewId {
        let window = self.create_view(frame);
        let width = frame.size.width;
        let bw = WINDOW_BORDER_WIDTH as i32;

        let title_frame = Rect::new(0, 0, width, WINDOW_TITLE_HEIGHT);
        let title_view = self.create_view(title_frame);
        let label_frame = Rect::from_parts(
            TITLE_LABEL_ORIGIN,
            Size::new(
                width - TITLE_LABEL_ORIGIN.x,
                WINDOW_TITLE_HEIGHT - TITLE_LABEL_ORIGIN.y,
            ),
        );
        let mut label = self.create_label(label_frame, title);
        label.superview = Some(title_view);

        let content_frame = Rect::new(
            bw * 2,
            WINDOW_TITLE_HEIGHT,
            width - bw * 4,
            frame.size.height - WINDOW_TITLE_HEIGHT - bw * 2,
        );
        let content_view = self.create_view(content_frame);

        if let Some(node) = self.nodes[title_view.index()].as_mut() {
            node.background_color = DEFAULT_TITLE_COLOR;
            node.part_of = Some(window);
            node.labels.push(label);
        }
        if let Some(node) = self.nodes[content_view.index()].as_mut() {
            node.part_of = Some(window);
        }
        if let Some(node) = self.nodes[window.index()].as_mut() {
            node.window = Some(WindowParts {
                title: String::from(title),
                title_view: Some(title_view),
                content_view: Some(content_view),
                border_color: DEFAULT_TITLE_COLOR,
                border_width: WINDOW_BORDER_WIDTH,
            });
        }
        window
    }

    pub fn create_label(&self, frame: Rect, text: &str) -> Label {
        Label::new(frame, text, self.format)
    }

    /// Create a bitmap from a layer already in this tree's pixel format.
    pub fn create_bmp(&self, frame: Rect, layer: Layer) -> Bmp {
        Bmp::new(frame, layer)
    }

    /// Append `child` as the frontmost subview of `parent`.
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> XservResult {
        if self.node(child)?.is_attached() {
            return Err(XservError::AlreadyAttached(child));
        }
        if child == parent || self.ancestors(parent)?.contains(&child) {
            return Err(XservError::CyclicAttach(child));
        }
        self.node_mut(parent)?.subviews.push(child);
        self.node_mut(child)?.superview = Some(parent);
        self.mark_needs_redraw(parent)
    }

    pub fn remove_subview(&mut self, parent: ViewId, child: ViewId) -> XservResult {
        let subviews = &mut self.node_mut(parent)?.subviews;
        let Some(pos) = subviews.iter().position(|&v| v == child) else {
            return Err(XservError::UnknownView(child));
        };
        subviews.remove(pos);
        self.node_mut(child)?.superview = None;
        self.mark_needs_redraw(parent)
    }

    /// Move `child` to the end of `parent`'s subviews, making it frontmost.
    pub fn raise_subview(&mut self, parent: ViewId, child: ViewId) -> XservResult {
        let subviews = &mut self.node_mut(parent)?.subviews;
        let Some(pos) = subviews.iter().position(|&v| v == child) else {
            return Err(XservError::UnknownView(child));
        };
        let id = subviews.remove(pos);
        subviews.push(id);
        Ok(())
    }

    pub fn add_sublabel(&mut self, view: ViewId, mut label: Label) -> XservResult {
        label.superview = Some(view);
        label.needs_redraw = true;
        self.node_mut(view)?.labels.push(label);
        self.mark_needs_redraw(view)
    }

    /// Returns the slot index the bitmap was placed in.
    pub fn add_bmp(&mut self, view: ViewId, bmp: Bmp) -> XservResult<usize> {
        let bmps = &mut self.node_mut(view)?.bmps;
        let slot = match bmps.iter().position(Option::is_none) {
            Some(free) => {
                bmps[free] = Some(bmp);
                free
            }
            None => {
                bmps.push(Some(bmp));
                bmps.len() - 1
            }
        };
        self.mark_needs_redraw(view)?;
        Ok(slot)
    }

    /// Empty a bitmap slot, keeping later slots where they are.
    pub fn take_bmp(&mut self, view: ViewId, slot: usize) -> XservResult<Option<Bmp>> {
        let taken = self
            .node_mut(view)?
            .bmps
            .get_mut(slot)
            .and_then(Option::take);
        if taken.is_some() {
            self.mark_needs_redraw(view)?;
        }
        Ok(taken)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Move and/or resize a view. A size change swaps in a fresh layer
    /// (same alpha); layers are never resized in place.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) -> XservResult {
        let format = self.format;
        let node = self.node_mut(id)?;
        if node.frame.size != frame.size {
            let mut layer = Layer::new(frame.size, format);
            layer.set_alpha(node.layer.alpha());
            node.layer = layer;
        }
        node.frame = frame;
        self.mark_needs_redraw(id)
    }

    pub fn set_background_color(&mut self, id: ViewId, color: Color32) -> XservResult {
        self.node_mut(id)?.background_color = color;
        self.mark_needs_redraw(id)
    }

    pub fn set_title(&mut self, id: ViewId, title: &str) -> XservResult {
        let parts = self.window_mut(id)?;
        parts.title.clear();
        parts.title.push_str(title);
        self.mark_needs_redraw(id)
    }

    pub fn set_alpha(&mut self, id: ViewId, alpha: f32) -> XservResult {
        self.node_mut(id)?.layer.set_alpha(alpha);
        self.mark_needs_redraw(id)
    }

    /// Flag `id` for repaint. For a plain view the flag of its containing
    /// window is raised too, since that is what gates painting.
    pub fn mark_needs_redraw(&mut self, id: ViewId) -> XservResult {
        let node = self.node_mut(id)?;
        node.needs_redraw = true;
        if node.window.is_some() {
            return Ok(());
        }
        let window = self.containing_window(id)?;
        self.node_mut(window)?.needs_redraw = true;
        Ok(())
    }

    /// Flag `id` and every node and label below it, including window parts.
    pub fn mark_subtree_needs_redraw(&mut self, id: ViewId) -> XservResult {
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            let node = self.node_mut(next)?;
            node.needs_redraw = true;
            for label in node.labels.iter_mut() {
                label.needs_redraw = true;
            }
            for bmp in node.bmps.iter_mut().flatten() {
                bmp.needs_redraw = true;
            }
            stack.extend_from_slice(&node.subviews);
            if let Some(parts) = node.window.as_ref() {
                stack.extend(parts.title_view);
                stack.extend(parts.content_view);
            }
        }
        Ok(())
    }

    /// Free a detached view and everything it owns.
    pub fn destroy(&mut self, id: ViewId) -> XservResult {
        if id == self.root {
            return Err(XservError::AlreadyAttached(id));
        }
        if self.node(id)?.is_attached() {
            return Err(XservError::AlreadyAttached(id));
        }
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.get_mut(next.index()).and_then(Option::take) else {
                continue;
            };
            stack.extend_from_slice(&node.subviews);
            if let Some(parts) = node.window.as_ref() {
                stack.extend(parts.title_view);
                stack.extend(parts.content_view);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// `id`'s chain of superviews, nearest first.
    fn ancestors(&self, id: ViewId) -> XservResult<Vec<ViewId>> {
        let mut chain = Vec::new();
        let mut current = self.node(id)?.superview;
        while let Some(next) = current {
            if chain.len() > self.nodes.len() {
                return Err(XservError::NoContainingWindow(id));
            }
            chain.push(next);
            current = self.node(next)?.superview;
        }
        Ok(chain)
    }

    fn root_ancestor(&self, id: ViewId) -> XservResult<ViewId> {
        Ok(self.ancestors(id)?.last().copied().unwrap_or(id))
    }

    /// The window whose title or content subtree holds `id`.
    ///
    /// Scans the top-level windows, then one level of windows nested in
    /// them. Anything unclaimed, including views under the root's own
    /// content view, belongs to the root window.
    pub fn containing_window(&self, id: ViewId) -> XservResult<ViewId> {
        let top = self.root_ancestor(id)?;
        let claims = |window: ViewId| {
            self.window(window)
                .is_ok_and(|p| p.title_view == Some(top) || p.content_view == Some(top))
        };

        for &window in self.windows() {
            if window == top || claims(window) {
                return Ok(window);
            }
            for &sub in self.subviews(window)? {
                if claims(sub) {
                    return Ok(sub);
                }
            }
        }
        Ok(self.root)
    }

    /// `id`'s frame in screen coordinates.
    pub fn absolute_frame(&self, id: ViewId) -> XservResult<Rect> {
        let mut frame = self.node(id)?.frame;
        let chain = self.ancestors(id)?;
        for &ancestor in &chain {
            frame = convert_rect(self.node(ancestor)?.frame, frame);
        }
        let top = chain.last().copied().unwrap_or(id);
        let window = self.containing_window(top)?;
        let window_frame = self
            .node(window)
            .map_err(|_| XservError::NoContainingWindow(id))?
            .frame;
        Ok(convert_rect(window_frame, frame))
    }

    /// True if `id` or anything below it is flagged, labels and bitmaps
    /// included.
    pub fn subtree_needs_redraw(&self, id: ViewId) -> XservResult<bool> {
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            let node = self.node(next)?;
            if node.is_flagged() {
                return Ok(true);
            }
            stack.extend_from_slice(&node.subviews);
        }
        Ok(false)
    }
}
