//! Pointer state shared between the interrupt path and the frame loop.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use xserv_abi::geometry::Coordinate;
use xserv_abi::input::ButtonMask;

/// Latest pointer position and button set, published by the mouse interrupt
/// handler and read once per frame.
///
/// Each field is an independent atomic. A reader racing a publish can see
/// the new `x` with the old `y`; the frame loop tolerates that, and the
/// next frame sees a consistent value. Publishing never blocks.
pub struct PointerSnapshot {
    x: AtomicI32,
    y: AtomicI32,
    buttons: AtomicU8,
}

impl PointerSnapshot {
    pub const fn new() -> Self {
        Self {
            x: AtomicI32::new(0),
            y: AtomicI32::new(0),
            buttons: AtomicU8::new(0),
        }
    }

    pub fn publish(&self, position: Coordinate, buttons: ButtonMask) {
        self.x.store(position.x, Ordering::Relaxed);
        self.y.store(position.y, Ordering::Relaxed);
        self.buttons.store(buttons.bits(), Ordering::Release);
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.x.load(Ordering::Relaxed), self.y.load(Ordering::Relaxed))
    }

    pub fn buttons(&self) -> ButtonMask {
        ButtonMask::from_bits_truncate(self.buttons.load(Ordering::Acquire))
    }
}

impl Default for PointerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-slot "input arrived" flag.
///
/// Any number of signals between two takes collapse into one; the consumer
/// only needs to know that something happened since it last looked.
pub struct InputLatch {
    pending: AtomicBool,
}

impl InputLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consume the pending signal, returning whether there was one.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for InputLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn isqrt_u32(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = x.div_ceil(2);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Square-root pointer smoothing.
///
/// The first sample is returned as is. After that, each axis moves from the
/// previously returned position toward the raw one by `floor(sqrt(|d|))`,
/// so small jitters are absorbed and long sweeps still converge.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerAccel {
    previous: Option<Coordinate>,
}

impl PointerAccel {
    pub const fn new() -> Self {
        Self { previous: None }
    }

    fn step(from: i32, to: i32) -> i32 {
        let offset = isqrt_u32(to.abs_diff(from)) as i32;
        if to > from { from + offset } else { from - offset }
    }

    pub fn apply(&mut self, raw: Coordinate) -> Coordinate {
        let next = match self.previous {
            None => raw,
            Some(prev) => Coordinate::new(Self::step(prev.x, raw.x), Self::step(prev.y, raw.y)),
        };
        self.previous = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
