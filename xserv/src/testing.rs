//! In-memory stand-ins for every platform trait.

use core::cell::Cell;

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use xserv_abi::display::DisplayMode;
use xserv_abi::draw::Color32;
use xserv_abi::geometry::{Coordinate, Rect, Size};
use xserv_abi::input::ButtonMask;
use xserv_abi::pixel::PixelFormat;
use xserv_gfx::Layer;

use crate::error::{XservError, XservResult};
use crate::platform::{
    BitmapLoader, Clock, DisplayDevice, KeyboardDevice, PointerDevice, Scheduler,
};
use crate::view::Bmp;

/// Serves solid-colour images for the paths it knows. An image without a
/// size of its own decodes at exactly the requested frame size.
#[derive(Default)]
pub struct FakeLoader {
    images: Vec<(&'static str, Option<Size>, Color32)>,
    pub requests: usize,
}

impl FakeLoader {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_image(path: &'static str, color: Color32) -> Self {
        let mut loader = Self::default();
        loader.images.push((path, None, color));
        loader
    }

    pub fn with_sized_image(path: &'static str, size: Size, color: Color32) -> Self {
        let mut loader = Self::default();
        loader.images.push((path, Some(size), color));
        loader
    }
}

impl BitmapLoader for FakeLoader {
    fn load_bitmap(&mut self, frame: Rect, path: &str, format: PixelFormat) -> Option<Bmp> {
        self.requests += 1;
        let &(_, size, color) = self.images.iter().find(|(p, _, _)| *p == path)?;
        let mut image = Layer::new(size.unwrap_or(frame.size), format);
        image.fill(color);
        Some(Bmp::capture(&image, frame))
    }
}

/// Scripted input, a recording display, a counting scheduler and a clock
/// that advances by `clock_step` on every read.
pub struct FakePlatform {
    pub loader: FakeLoader,
    /// Consumed one sample per `position()` call; the last one sticks.
    pub pointer: VecDeque<(Coordinate, ButtonMask)>,
    current: (Coordinate, ButtonMask),
    pub keys: VecDeque<u8>,
    pub refuse_graphics: bool,
    pub graphics_entries: usize,
    pub text_entries: usize,
    pub presented: usize,
    pub last_frame: Option<Layer>,
    pub yields: usize,
    /// Queue a `q` on this yield.
    pub quit_on_yield: Option<usize>,
    pub sleeps: Vec<u64>,
    now: Cell<u64>,
    pub clock_step: u64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            loader: FakeLoader::empty(),
            pointer: VecDeque::new(),
            current: (Coordinate::ZERO, ButtonMask::empty()),
            keys: VecDeque::new(),
            refuse_graphics: false,
            graphics_entries: 0,
            text_entries: 0,
            presented: 0,
            last_frame: None,
            yields: 0,
            quit_on_yield: None,
            sleeps: Vec::new(),
            now: Cell::new(0),
            clock_step: 0,
        }
    }

    pub fn push_pointer(&mut self, x: i32, y: i32, buttons: ButtonMask) {
        self.pointer.push_back((Coordinate::new(x, y), buttons));
    }
}

impl PointerDevice for FakePlatform {
    fn position(&mut self) -> Coordinate {
        if let Some(next) = self.pointer.pop_front() {
            self.current = next;
        }
        self.current.0
    }

    fn buttons(&mut self) -> ButtonMask {
        self.current.1
    }
}

impl KeyboardDevice for FakePlatform {
    fn has_pending_key(&mut self) -> bool {
        !self.keys.is_empty()
    }

    fn read_key(&mut self) -> Option<u8> {
        self.keys.pop_front()
    }
}

impl BitmapLoader for FakePlatform {
    fn load_bitmap(&mut self, frame: Rect, path: &str, format: PixelFormat) -> Option<Bmp> {
        self.loader.load_bitmap(frame, path, format)
    }
}

impl DisplayDevice for FakePlatform {
    fn enter_graphics_mode(&mut self, mode: DisplayMode) -> XservResult<DisplayMode> {
        if self.refuse_graphics {
            return Err(XservError::DisplayUnavailable);
        }
        self.graphics_entries += 1;
        Ok(mode)
    }

    fn enter_text_mode(&mut self) {
        self.text_entries += 1;
    }

    fn present(&mut self, frame: &Layer) {
        self.presented += 1;
        self.last_frame = Some(frame.clone());
    }
}

impl Scheduler for FakePlatform {
    fn yield_until_pointer_event(&mut self) {
        self.yields += 1;
        if self.quit_on_yield == Some(self.yields) {
            self.keys.push_back(b'q');
        }
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push(ms);
    }
}

impl Clock for FakePlatform {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.clock_step);
        now
    }
}
