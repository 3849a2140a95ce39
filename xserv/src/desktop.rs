//! The root window's decoration: wallpaper, status bar and taskbar.

use xserv_abi::draw::Color32;
use xserv_abi::font::FONT_CHAR_HEIGHT;
use xserv_abi::geometry::{Coordinate, Rect, Size};
use xserv_lib::{klog_info, klog_warn};

use crate::config::ServerConfig;
use crate::error::{XservError, XservResult};
use crate::platform::BitmapLoader;
use crate::screen::Screen;
use crate::view::ViewId;

const STATUS_BAR_HEIGHT_RATIO: f64 = 0.03;
const STATUS_BAR_COLOR: Color32 = Color32::rgb(150, 150, 150);

const TASKBAR_HEIGHT_RATIO: f64 = 0.045;
const TASKBAR_COLOR: Color32 = Color32::rgb(245, 120, 80);
const TASKBAR_BORDER_HEIGHT: i32 = 5;
const TASKBAR_BORDER_COLOR: Color32 = Color32::rgb(200, 80, 245);
const TASKBAR_INNER_BORDER_COLOR: Color32 = Color32::rgb(50, 50, 50);
/// Horizontal position of the name label, as a share of the taskbar width.
const NAME_LABEL_X_RATIO: f64 = 0.925;
const DESKTOP_NAME: &str = "xserv";

/// Handles to what [`desktop_setup`] created.
#[derive(Debug, Clone, Copy)]
pub struct Desktop {
    pub status_bar: ViewId,
    pub taskbar: ViewId,
    /// Bitmap slot of the wallpaper in the root content view.
    pub background: Option<usize>,
}

fn root_content(screen: &Screen) -> XservResult<(ViewId, Rect)> {
    let root = screen.root();
    let content = screen
        .tree
        .content_view(root)?
        .ok_or(XservError::NotAWindow(root))?;
    Ok((content, screen.tree.frame(content)?))
}

fn add_status_bar(screen: &mut Screen) -> XservResult<ViewId> {
    let (content, content_frame) = root_content(screen)?;
    let root_height = screen.tree.frame(screen.root())?.size.height;
    let height = (root_height as f64 * STATUS_BAR_HEIGHT_RATIO) as i32;
    let frame = Rect::new(0, 0, content_frame.size.width, height);

    let tree = &mut screen.tree;
    let status_bar = tree.create_view(frame);
    tree.set_background_color(status_bar, STATUS_BAR_COLOR)?;
    tree.add_subview(content, status_bar)?;

    let border = tree.create_view(Rect::new(0, height - 1, frame.size.width, 1));
    tree.set_background_color(border, Color32::PURPLE)?;
    tree.add_subview(status_bar, border)?;
    Ok(status_bar)
}

/// The taskbar hangs off the bottom of the root content view. Its frame
/// is measured before the top border is taken out of it and then placed
/// as if the border were not there, so it reaches a border's height past
/// the bottom edge.
fn add_taskbar(screen: &mut Screen) -> XservResult<ViewId> {
    let (content, content_frame) = root_content(screen)?;
    let width = content_frame.size.width;
    let border_frame = Rect::new(0, 0, width, TASKBAR_BORDER_HEIGHT);
    let height = (content_frame.size.height as f64 * TASKBAR_HEIGHT_RATIO) as i32
        - TASKBAR_BORDER_HEIGHT;
    let origin = Coordinate::new(
        0,
        content_frame.size.height - height + TASKBAR_BORDER_HEIGHT,
    );

    let tree = &mut screen.tree;
    let taskbar = tree.create_view(Rect::from_parts(origin, Size::new(width, height)));
    tree.set_background_color(taskbar, TASKBAR_COLOR)?;
    tree.add_subview(content, taskbar)?;

    let border = tree.create_view(border_frame);
    tree.set_background_color(border, TASKBAR_BORDER_COLOR)?;
    tree.add_subview(taskbar, border)?;

    let inner_border = tree.create_view(Rect::new(0, TASKBAR_BORDER_HEIGHT, width, 1));
    tree.set_background_color(inner_border, TASKBAR_INNER_BORDER_COLOR)?;
    tree.add_subview(taskbar, inner_border)?;

    let usable_height = height - TASKBAR_BORDER_HEIGHT;
    let label_origin = Coordinate::new(
        (width as f64 * NAME_LABEL_X_RATIO) as i32,
        TASKBAR_BORDER_HEIGHT + usable_height / 2 - FONT_CHAR_HEIGHT / 2,
    );
    let label_frame = Rect::from_parts(label_origin, Size::new(width - label_origin.x, height));
    let label = tree.create_label(label_frame, DESKTOP_NAME);
    tree.add_sublabel(taskbar, label)?;
    Ok(taskbar)
}

/// Decorate the root window. A missing wallpaper is skipped.
pub fn desktop_setup<L: BitmapLoader + ?Sized>(
    screen: &mut Screen,
    loader: &mut L,
    config: &ServerConfig,
) -> XservResult<Desktop> {
    let (content, content_frame) = root_content(screen)?;
    let background = match loader.load_bitmap(
        content_frame,
        config.background_path,
        screen.tree.format(),
    ) {
        Some(bmp) => Some(screen.tree.add_bmp(content, bmp)?),
        None => {
            klog_warn!("xserv: cannot load {}, no wallpaper", config.background_path);
            None
        }
    };

    let status_bar = add_status_bar(screen)?;
    let taskbar = add_taskbar(screen)?;
    klog_info!(
        "xserv: desktop ready ({}x{})",
        content_frame.size.width,
        content_frame.size.height
    );
    Ok(Desktop {
        status_bar,
        taskbar,
        background,
    })
}
