//! Nodes of the display tree and the leaf entities they own.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use xserv_abi::draw::Color32;
use xserv_abi::geometry::{Coordinate, Rect};
use xserv_abi::pixel::PixelFormat;
use xserv_gfx::{Layer, layer_snapshot};

/// Height of a window's title bar.
pub const WINDOW_TITLE_HEIGHT: i32 = 20;
pub const WINDOW_BORDER_WIDTH: u32 = 1;
/// Where the title label sits inside the title bar.
pub const TITLE_LABEL_ORIGIN: Coordinate = Coordinate::new(15, 5);
pub const DEFAULT_TITLE_COLOR: Color32 = Color32::rgb(120, 245, 80);

/// Handle to a node in a [`ViewTree`](crate::tree::ViewTree).
///
/// Handles are never reused, so a stale one fails lookups instead of
/// aliasing a newer node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u32);

impl ViewId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// A run of text rendered into its own layer.
#[derive(Debug)]
pub struct Label {
    pub frame: Rect,
    pub text: String,
    pub text_color: Color32,
    pub needs_redraw: bool,
    pub(crate) layer: Layer,
    pub(crate) superview: Option<ViewId>,
}

impl Label {
    pub fn new(frame: Rect, text: &str, format: PixelFormat) -> Self {
        Self {
            frame,
            text: String::from(text),
            text_color: Color32::BLACK,
            needs_redraw: true,
            layer: Layer::new(frame.size, format),
            superview: None,
        }
    }

    pub fn superview(&self) -> Option<ViewId> {
        self.superview
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Replace the text, reusing the existing allocation.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.needs_redraw = true;
    }
}

/// A pre-rendered image placed inside a view.
#[derive(Debug)]
pub struct Bmp {
    pub frame: Rect,
    pub needs_redraw: bool,
    pub(crate) layer: Layer,
}

impl Bmp {
    pub fn new(frame: Rect, layer: Layer) -> Self {
        Self {
            frame,
            needs_redraw: true,
            layer,
        }
    }

    /// Capture the top-left `frame.size` pixels of a decoded image. Images
    /// smaller than the frame yield a correspondingly smaller bitmap.
    pub fn capture(image: &Layer, frame: Rect) -> Self {
        Self::new(frame, layer_snapshot(image, Rect::with_size(frame.size)))
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }
}

/// State only windows carry.
#[derive(Debug)]
pub struct WindowParts {
    pub title: String,
    pub title_view: Option<ViewId>,
    pub content_view: Option<ViewId>,
    pub border_color: Color32,
    pub border_width: u32,
}

/// One view. A node with `window` set is a window.
#[derive(Debug)]
pub struct Node {
    pub(crate) frame: Rect,
    pub(crate) background_color: Color32,
    pub(crate) layer: Layer,
    pub(crate) needs_redraw: bool,
    pub(crate) subviews: Vec<ViewId>,
    pub(crate) labels: Vec<Label>,
    pub(crate) bmps: Vec<Option<Bmp>>,
    pub(crate) superview: Option<ViewId>,
    /// Set on a window's title and content views; they have no superview.
    pub(crate) part_of: Option<ViewId>,
    pub(crate) window: Option<WindowParts>,
}

impl Node {
    pub(crate) fn new(frame: Rect, format: PixelFormat) -> Self {
        Self {
            frame,
            background_color: Color32::WHITE,
            layer: Layer::new(frame.size, format),
            needs_redraw: true,
            subviews: Vec::new(),
            labels: Vec::new(),
            bmps: Vec::new(),
            superview: None,
            part_of: None,
            window: None,
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn background_color(&self) -> Color32 {
        self.background_color
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn subviews(&self) -> &[ViewId] {
        &self.subviews
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn bmps(&self) -> &[Option<Bmp>] {
        &self.bmps
    }

    pub fn superview(&self) -> Option<ViewId> {
        self.superview
    }

    pub fn window(&self) -> Option<&WindowParts> {
        self.window.as_ref()
    }

    pub fn is_window(&self) -> bool {
        self.window.is_some()
    }

    /// The node itself, one of its labels or one of its bitmaps is flagged.
    pub fn is_flagged(&self) -> bool {
        self.needs_redraw
            || self.labels.iter().any(|l| l.needs_redraw)
            || self.bmps.iter().flatten().any(|b| b.needs_redraw)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.superview.is_some() || self.part_of.is_some()
    }
}
