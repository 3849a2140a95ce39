use spin::Mutex;
use xserv_lib::RingBuffer;

/// Characters buffered between the keyboard IRQ and the frame loop.
pub const KEY_QUEUE_CAPACITY: usize = 64;
type Buffer = RingBuffer<u8, KEY_QUEUE_CAPACITY>;

// Scan code set 1, make codes 0x00..0x3A.
const SCANCODE_LETTERS: [u8; 0x3A] = [
    0x00, 0x1B, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'0', b'-', b'=', 0x08, b'\t',
    b'q', b'w', b'e', b'r', b't', b'y', b'u', b'i', b'o', b'p', b'[', b']', b'\n', 0x00, b'a', b's',
    b'd', b'f', b'g', b'h', b'j', b'k', b'l', b';', b'\'', b'`', 0x00, b'\\', b'z', b'x', b'c', b'v',
    b'b', b'n', b'm', b',', b'.', b'/', 0x00, b'*', 0x00, b' ',
];

const SCANCODE_SHIFTED: [u8; 0x3A] = [
    0x00, 0x1B, b'!', b'@', b'#', b'$', b'%', b'^', b'&', b'*', b'(', b')', b'_', b'+', 0x08, b'\t',
    b'Q', b'W', b'E', b'R', b'T', b'Y', b'U', b'I', b'O', b'P', b'{', b'}', b'\n', 0x00, b'A', b'S',
    b'D', b'F', b'G', b'H', b'J', b'K', b'L', b':', b'"', b'~', 0x00, b'|', b'Z', b'X', b'C', b'V',
    b'B', b'N', b'M', b'<', b'>', b'?', 0x00, b'*', 0x00, b' ',
];

const MAKE_SHIFT_LEFT: u8 = 0x2A;
const MAKE_SHIFT_RIGHT: u8 = 0x36;
const MAKE_CAPS_LOCK: u8 = 0x3A;
const EXTENDED_PREFIX: u8 = 0xE0;

#[inline(always)]
fn is_break_code(scancode: u8) -> bool {
    scancode & 0x80 != 0
}

struct KeyboardState {
    shift_left: bool,
    shift_right: bool,
    caps_lock: bool,
    extended: bool,
    chars: Buffer,
}

impl KeyboardState {
    const fn new() -> Self {
        Self {
            shift_left: false,
            shift_right: false,
            caps_lock: false,
            extended: false,
            chars: Buffer::new_with(0),
        }
    }

    fn translate(&self, make_code: u8) -> u8 {
        let Some(&base) = SCANCODE_LETTERS.get(make_code as usize) else {
            return 0;
        };
        let shift = self.shift_left || self.shift_right;
        if base.is_ascii_lowercase() {
            return if shift ^ self.caps_lock {
                base.to_ascii_uppercase()
            } else {
                base
            };
        }
        if shift { SCANCODE_SHIFTED[make_code as usize] } else { base }
    }
}

/// Fixed-capacity character queue fed by the keyboard interrupt.
///
/// When the frame loop falls behind, the oldest characters are dropped so
/// the interrupt path never has to wait.
pub struct KeyQueue {
    state: Mutex<KeyboardState>,
}

impl KeyQueue {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(KeyboardState::new()),
        }
    }

    /// Queue an already translated character.
    pub fn push(&self, ch: u8) {
        self.state.lock().chars.push_overwrite(ch);
    }

    /// Translate one set-1 scan code and queue the resulting character, if
    /// any. Modifier state is tracked across calls.
    pub fn handle_scancode(&self, scancode: u8) {
        let mut state = self.state.lock();
        if scancode == EXTENDED_PREFIX {
            state.extended = true;
            return;
        }
        if core::mem::take(&mut state.extended) {
            // Arrows and the navigation block have no character.
            return;
        }

        let make_code = scancode & 0x7F;
        let pressed = !is_break_code(scancode);
        match make_code {
            MAKE_SHIFT_LEFT => state.shift_left = pressed,
            MAKE_SHIFT_RIGHT => state.shift_right = pressed,
            MAKE_CAPS_LOCK => {
                if pressed {
                    state.caps_lock = !state.caps_lock;
                }
            }
            _ if pressed => {
                let ch = state.translate(make_code);
                if ch != 0 {
                    state.chars.push_overwrite(ch);
                }
            }
            _ => {}
        }
    }

    pub fn has_pending_key(&self) -> bool {
        !self.state.lock().chars.is_empty()
    }

    pub fn read_key(&self) -> Option<u8> {
        self.state.lock().chars.try_pop()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.chars.reset();
        state.shift_left = false;
        state.shift_right = false;
        state.extended = false;
    }
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}
