//! The frame loop.
//!
//! ```text
//!  keys ─▶ repaint + composite ─▶ cursor ─▶ indicator, FPS ─▶ pointer routing ─▶ present
//! ```
//!
//! Everything runs on the caller's task. The only suspension point is the
//! wait for pointer input between frames.

use xserv_abi::draw::Color32;
use xserv_abi::geometry::{Coordinate, Rect};
use xserv_abi::input::ButtonMask;
use xserv_gfx::{Thickness, draw_rect};
use xserv_lib::{
    NumBuf, klog_debug, klog_error, klog_info, klog_set_level, klog_trace, klog_warn,
};

use crate::compositor::{Cursor, draw_desktop};
use crate::config::ServerConfig;
use crate::desktop::desktop_setup;
use crate::error::{XservError, XservResult};
use crate::platform::Platform;
use crate::redraw::{RedrawPass, draw_label};
use crate::screen::Screen;
use crate::view::Label;
use crate::wm::{KeyCommand, WindowManager};

const INDICATOR_SIZE: i32 = 25;
const FPS_LABEL_FRAME: Rect = Rect::new(3, 3, 60, 20);

/// A running display server bound to its platform.
pub struct Xserv<P: Platform> {
    platform: P,
    config: ServerConfig,
    /// `None` once the server has quit.
    screen: Option<Screen>,
    wm: WindowManager,
    cursor: Cursor,
    fps: Label,
    fps_text: NumBuf<24>,
    dirtied: bool,
    frames: u64,
}

impl<P: Platform> Xserv<P> {
    /// Enter graphics mode and build the desktop.
    pub fn start(mut platform: P, config: ServerConfig) -> XservResult<Self> {
        klog_set_level(config.log_level);

        let mode = match platform.enter_graphics_mode(config.mode) {
            Ok(mode) => mode,
            Err(err) => {
                klog_error!("xserv: cannot enter graphics mode: {}", err);
                return Err(err);
            }
        };
        if mode != config.mode {
            klog_warn!(
                "xserv: asked for {}x{}, got {}x{}",
                config.mode.width,
                config.mode.height,
                mode.width,
                mode.height
            );
        }
        klog_info!(
            "xserv: {}x{} at {} bytes per pixel, {} redraw",
            mode.width,
            mode.height,
            mode.bytes_per_pixel(),
            config.redraw_mode
        );

        let mut screen = Screen::new(mode);
        desktop_setup(&mut screen, &mut platform, &config)?;

        let mut fps = screen.tree.create_label(FPS_LABEL_FRAME, "FPS counter");
        fps.text_color = Color32::BLACK;

        Ok(Self {
            wm: WindowManager::new(&config),
            cursor: Cursor::new(&config),
            platform,
            config,
            screen: Some(screen),
            fps,
            fps_text: NumBuf::new(),
            dirtied: false,
            frames: 0,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// `None` after [`quit`](Self::quit).
    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn screen_mut(&mut self) -> Option<&mut Screen> {
        self.screen.as_mut()
    }

    pub fn window_manager(&self) -> &WindowManager {
        &self.wm
    }

    pub fn fps_label(&self) -> &Label {
        &self.fps
    }

    pub fn is_running(&self) -> bool {
        self.screen.is_some()
    }

    /// Whether the last frame repainted anything.
    pub fn last_frame_dirtied(&self) -> bool {
        self.dirtied
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Act on at most one pending key. Returns false when it was `q`.
    fn poll_keyboard(&mut self) -> XservResult<bool> {
        if !self.platform.has_pending_key() {
            return Ok(true);
        }
        let Some(command) = self.platform.read_key().and_then(KeyCommand::from_key) else {
            return Ok(true);
        };
        klog_debug!("xserv: key command {}", command.as_str());

        let screen = self.screen.as_mut().ok_or(XservError::DisplayUnavailable)?;
        match command {
            KeyCommand::Quit => {
                self.quit();
                return Ok(false);
            }
            KeyCommand::RefreshAll => screen.mark_all_dirty()?,
            KeyCommand::ToggleAlpha => {
                if let Some(alpha) = self.wm.toggle_topmost_alpha(&mut screen.tree)? {
                    klog_debug!("xserv: topmost alpha now {}", alpha);
                }
            }
        }
        Ok(true)
    }

    /// Repaint, composite and draw the cursor. Returns whether anything
    /// was repainted.
    fn draw(&mut self, pointer: Coordinate) -> XservResult<bool> {
        let screen = self.screen.as_mut().ok_or(XservError::DisplayUnavailable)?;
        screen.finished_drawing = false;

        let mut pass = RedrawPass::new(self.config.redraw_mode);
        draw_desktop(screen, &mut pass)?;
        self.cursor.draw(&mut screen.vmem, &mut self.platform, pointer);

        screen.finished_drawing = true;
        Ok(pass.dirtied)
    }

    /// Paint the repaint indicator and the FPS label into the root layer.
    /// They reach the display with the next composite.
    fn draw_overlays(&mut self, fps: u64) -> XservResult {
        let screen = self.screen.as_mut().ok_or(XservError::DisplayUnavailable)?;
        let root = screen.tree.root();
        let height = screen.tree.frame(root)?.size.height;
        let layer = screen.tree.layer_mut(root)?;

        if self.config.indicator {
            let color = if self.dirtied {
                Color32::RED
            } else {
                Color32::GREEN
            };
            let indicator = Rect::new(0, height - INDICATOR_SIZE, INDICATOR_SIZE, INDICATOR_SIZE);
            draw_rect(layer, indicator, color, Thickness::Filled);
        }

        self.fps
            .set_text(self.fps_text.format_with_suffix(fps, " FPS"));
        draw_label(layer, &mut self.fps, Color32::WHITE);
        Ok(())
    }

    /// Run one frame. Returns `Ok(false)` once a `q` has stopped the
    /// server, and `DisplayUnavailable` if called after that.
    pub fn refresh(&mut self) -> XservResult<bool> {
        if self.screen.is_none() {
            return Err(XservError::DisplayUnavailable);
        }
        if !self.poll_keyboard()? {
            return Ok(false);
        }

        let pointer = self.platform.position();
        let buttons: ButtonMask = self.platform.buttons();

        let start = self.platform.now_ms();
        self.dirtied = self.draw(pointer)?;
        let frame_ms = self.platform.now_ms().saturating_sub(start);
        let fps = 1000 / frame_ms.max(1);

        self.draw_overlays(fps)?;

        let screen = self.screen.as_mut().ok_or(XservError::DisplayUnavailable)?;
        self.wm.process_mouse(&mut screen.tree, pointer, buttons)?;
        self.platform.present(&screen.vmem);

        self.frames += 1;
        klog_trace!(
            "xserv: frame {} took {} ms (dirtied: {})",
            self.frames,
            frame_ms,
            self.dirtied
        );
        Ok(true)
    }

    /// Refresh until `q`, waiting for pointer input between frames unless
    /// a key is already queued. Errors are logged and returned.
    pub fn run(&mut self) -> XservResult {
        loop {
            match self.refresh() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(err) => {
                    klog_error!("xserv: stopping: {}", err);
                    return Err(err);
                }
            }
            if !self.platform.has_pending_key() {
                self.platform.yield_until_pointer_event();
            }
        }
    }

    /// Leave graphics mode and drop all graphics state.
    pub fn quit(&mut self) {
        self.platform.enter_text_mode();
        self.screen = None;
        self.wm.reset();
        klog_info!("xserv: quit after {} frames", self.frames);
    }

    /// Switch to text mode, keeping the desktop for [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.platform.enter_text_mode();
        klog_info!("xserv: paused");
    }

    /// Return to graphics mode and repaint everything on the next frame.
    pub fn resume(&mut self) -> XservResult {
        let screen = self.screen.as_mut().ok_or(XservError::DisplayUnavailable)?;
        self.platform.enter_graphics_mode(screen.mode)?;
        screen.mark_all_dirty()?;
        self.wm.reset();
        klog_info!("xserv: resumed");
        Ok(())
    }

    /// Pause for `ms` milliseconds, then resume.
    pub fn temp_stop(&mut self, ms: u64) -> XservResult {
        self.pause();
        self.platform.sleep_ms(ms);
        self.resume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;
    use crate::view::ViewId;
    use xserv_abi::display::DisplayMode;
    use xserv_abi::pixel::PixelFormat;

    fn config() -> ServerConfig {
        ServerConfig {
            mode: DisplayMode::new(320, 240, PixelFormat::Rgb888),
            ..ServerConfig::default()
        }
    }

    fn server(platform: FakePlatform) -> Xserv<FakePlatform> {
        Xserv::start(platform, config()).unwrap()
    }

    fn open_window(x: &mut Xserv<FakePlatform>, frame: Rect) -> ViewId {
        let screen = x.screen_mut().unwrap();
        let w = screen.tree.create_window(frame, "w");
        let root = screen.root();
        screen.tree.add_subview(root, w).unwrap();
        w
    }

    #[test]
    fn test_start_fails_without_display() {
        let mut platform = FakePlatform::new();
        platform.refuse_graphics = true;
        let err = Xserv::start(platform, config()).err();
        assert_eq!(err, Some(XservError::DisplayUnavailable));
    }

    #[test]
    fn test_frame_presents_and_reports_repaint() {
        let mut x = server(FakePlatform::new());
        assert_eq!(x.platform().graphics_entries, 1);

        assert!(x.refresh().unwrap());
        assert!(x.last_frame_dirtied());
        assert_eq!(x.platform().presented, 1);

        let root = x.screen().unwrap().root();
        let root_layer = x.screen().unwrap().tree.layer(root).unwrap();
        assert_eq!(root_layer.pixel_at(5, 235), Some(Color32::RED));

        // Nothing changed; the cursor alone does not count.
        x.platform_mut().push_pointer(100, 100, ButtonMask::empty());
        assert!(x.refresh().unwrap());
        assert!(!x.last_frame_dirtied());
        let screen = x.screen().unwrap();
        assert_eq!(screen.tree.layer(root).unwrap().pixel_at(5, 235), Some(Color32::GREEN));

        // The presented frame carries the previous frame's indicator and
        // this frame's fallback cursor.
        let frame = x.platform().last_frame.as_ref().unwrap();
        assert_eq!(frame.pixel_at(5, 235), Some(Color32::RED));
        assert_eq!(frame.pixel_at(104, 104), Some(Color32::BLUE));
    }

    #[test]
    fn test_fps_label_uses_frame_time() {
        let mut platform = FakePlatform::new();
        platform.clock_step = 4;
        let mut x = server(platform);
        x.refresh().unwrap();
        assert_eq!(x.fps_label().text, "250 FPS");

        x.platform_mut().clock_step = 0;
        x.refresh().unwrap();
        assert_eq!(x.fps_label().text, "1000 FPS");
    }

    #[test]
    fn test_drag_across_frames() {
        let mut x = server(FakePlatform::new());
        let w = open_window(&mut x, Rect::new(10, 30, 80, 60));
        x.platform_mut().push_pointer(20, 40, ButtonMask::LEFT);
        x.platform_mut().push_pointer(24, 47, ButtonMask::LEFT);
        x.platform_mut().push_pointer(24, 47, ButtonMask::empty());

        x.refresh().unwrap();
        x.refresh().unwrap();
        let frame = x.screen().unwrap().tree.frame(w).unwrap();
        assert_eq!(frame.origin, Coordinate::new(14, 37));
        assert_eq!(x.window_manager().grabbed(), Some(w));

        x.refresh().unwrap();
        assert_eq!(x.window_manager().grabbed(), None);
        assert_eq!(x.window_manager().active(), Some(w));
    }

    #[test]
    fn test_window_closed_mid_drag_keeps_running() {
        let mut x = server(FakePlatform::new());
        let w = open_window(&mut x, Rect::new(10, 30, 80, 60));
        x.platform_mut().push_pointer(20, 40, ButtonMask::LEFT);
        x.platform_mut().push_pointer(24, 47, ButtonMask::LEFT);
        x.platform_mut().push_pointer(30, 50, ButtonMask::LEFT);
        x.refresh().unwrap();
        x.refresh().unwrap();
        assert_eq!(x.window_manager().grabbed(), Some(w));

        let screen = x.screen_mut().unwrap();
        let root = screen.root();
        screen.tree.remove_subview(root, w).unwrap();
        screen.tree.destroy(w).unwrap();

        assert_eq!(x.refresh(), Ok(true));
        assert!(x.last_frame_dirtied());
        assert_eq!(x.window_manager().grabbed(), Some(root));
        assert_eq!(x.window_manager().active(), None);
    }

    #[test]
    fn test_key_commands() {
        let mut x = server(FakePlatform::new());
        let w = open_window(&mut x, Rect::new(10, 30, 80, 60));
        x.refresh().unwrap();

        x.platform_mut().keys.push_back(b'a');
        x.refresh().unwrap();
        assert_eq!(x.screen().unwrap().tree.alpha(w).unwrap(), 0.5);

        x.refresh().unwrap();
        assert!(!x.last_frame_dirtied());
        x.platform_mut().keys.push_back(b'r');
        x.refresh().unwrap();
        assert!(x.last_frame_dirtied());

        x.platform_mut().keys.push_back(b'a');
        x.refresh().unwrap();
        assert_eq!(x.screen().unwrap().tree.alpha(w).unwrap(), 1.0);
    }

    #[test]
    fn test_refresh_all_repaints_clean_views_in_strict_mode() {
        let cfg = ServerConfig {
            redraw_mode: crate::config::RedrawMode::Strict,
            ..config()
        };
        let mut x = Xserv::start(FakePlatform::new(), cfg).unwrap();
        let w = open_window(&mut x, Rect::new(10, 30, 80, 60));
        x.refresh().unwrap();

        let content = {
            let tree = &mut x.screen_mut().unwrap().tree;
            let content = tree.content_view(w).unwrap().unwrap();
            tree.node_mut(content).unwrap().background_color = Color32::RED;
            content
        };
        x.refresh().unwrap();
        let layer = x.screen().unwrap().tree.layer(content).unwrap();
        assert_eq!(layer.pixel_at(5, 5), Some(Color32::WHITE));

        x.platform_mut().keys.push_back(b'r');
        x.refresh().unwrap();
        let layer = x.screen().unwrap().tree.layer(content).unwrap();
        assert_eq!(layer.pixel_at(5, 5), Some(Color32::RED));
    }

    #[test]
    fn test_quit_tears_down() {
        let mut x = server(FakePlatform::new());
        x.refresh().unwrap();
        x.platform_mut().keys.push_back(b'q');

        assert!(!x.refresh().unwrap());
        assert!(!x.is_running());
        assert_eq!(x.platform().text_entries, 1);
        assert_eq!(x.platform().presented, 1);
        assert_eq!(x.refresh(), Err(XservError::DisplayUnavailable));
        assert_eq!(x.resume(), Err(XservError::DisplayUnavailable));
    }

    #[test]
    fn test_run_waits_for_pointer_between_frames() {
        let mut platform = FakePlatform::new();
        platform.quit_on_yield = Some(2);
        let mut x = server(platform);

        x.run().unwrap();
        assert_eq!(x.platform().yields, 2);
        assert_eq!(x.platform().presented, 2);
        assert_eq!(x.frames(), 2);
        assert!(!x.is_running());
    }

    #[test]
    fn test_run_skips_wait_when_key_queued() {
        let mut platform = FakePlatform::new();
        platform.keys.extend([b'x', b'q']);
        let mut x = server(platform);

        x.run().unwrap();
        assert_eq!(x.platform().yields, 0);
        assert_eq!(x.platform().presented, 1);
    }

    #[test]
    fn test_temp_stop_round_trip() {
        let mut x = server(FakePlatform::new());
        let w = open_window(&mut x, Rect::new(10, 30, 80, 60));
        x.refresh().unwrap();
        assert!(!x.screen().unwrap().tree.needs_redraw(w).unwrap());

        x.temp_stop(100).unwrap();
        assert_eq!(x.platform().text_entries, 1);
        assert_eq!(x.platform().sleeps, [100]);
        assert_eq!(x.platform().graphics_entries, 2);
        let tree = &x.screen().unwrap().tree;
        assert!(tree.needs_redraw(tree.root()).unwrap());
        assert!(tree.needs_redraw(w).unwrap());
    }

    #[test]
    fn test_indicator_can_be_disabled() {
        let cfg = ServerConfig {
            indicator: false,
            ..config()
        };
        let mut x = Xserv::start(FakePlatform::new(), cfg).unwrap();
        x.refresh().unwrap();
        let screen = x.screen().unwrap();
        let layer = screen.tree.layer(screen.root()).unwrap();
        assert_ne!(layer.pixel_at(5, 235), Some(Color32::RED));
    }
}
