use xserv_abi::display::DisplayMode;
use xserv_abi::draw::Color32;
use xserv_abi::geometry::Size;
use xserv_abi::pixel::PixelFormat;
use xserv_lib::KlogLevel;

const DEFAULT_TRANSLUCENT_ALPHA: f32 = 0.5;
const DEFAULT_ACTIVE_TITLE: Color32 = Color32::rgb(120, 245, 80);
const DEFAULT_INACTIVE_TITLE: Color32 = Color32::rgb(50, 122, 40);
const DEFAULT_CURSOR_PATH: &str = "cursor.bmp";
const DEFAULT_CURSOR_SIZE: Size = Size::new(12, 18);
const DEFAULT_FALLBACK_CURSOR_SIZE: Size = Size::new(10, 12);
const DEFAULT_BACKGROUND_PATH: &str = "background.bmp";

/// How far a window's dirty flag reaches when its subtree is repainted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RedrawMode {
    /// A dirty window repaints every view, label and bitmap under it.
    #[default]
    Coarse,
    /// Inside a dirty window, a view repaints only when it, an ancestor
    /// view or a descendant is flagged; clean views keep their last pixels.
    Strict,
}

impl RedrawMode {
    pub fn from_name(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("coarse") {
            Some(RedrawMode::Coarse)
        } else if value.eq_ignore_ascii_case("strict") {
            Some(RedrawMode::Strict)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedrawMode::Coarse => "coarse",
            RedrawMode::Strict => "strict",
        }
    }
}

impl core::fmt::Display for RedrawMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    pub mode: DisplayMode,
    /// The "low" value the alpha toggle switches the topmost window to.
    pub translucent_alpha: f32,
    pub active_title_color: Color32,
    pub inactive_title_color: Color32,
    pub cursor_path: &'static str,
    pub cursor_size: Size,
    pub fallback_cursor_size: Size,
    pub fallback_cursor_color: Color32,
    pub background_path: &'static str,
    pub redraw_mode: RedrawMode,
    pub log_level: KlogLevel,
    /// Paint the red/green "frame repainted" square.
    pub indicator: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::VESA_1024X768X24,
            translucent_alpha: DEFAULT_TRANSLUCENT_ALPHA,
            active_title_color: DEFAULT_ACTIVE_TITLE,
            inactive_title_color: DEFAULT_INACTIVE_TITLE,
            cursor_path: DEFAULT_CURSOR_PATH,
            cursor_size: DEFAULT_CURSOR_SIZE,
            fallback_cursor_size: DEFAULT_FALLBACK_CURSOR_SIZE,
            fallback_cursor_color: Color32::BLUE,
            background_path: DEFAULT_BACKGROUND_PATH,
            redraw_mode: RedrawMode::Coarse,
            log_level: KlogLevel::Info,
            indicator: true,
        }
    }
}

const ON_WORDS: [&str; 4] = ["on", "true", "yes", "1"];
const OFF_WORDS: [&str; 4] = ["off", "false", "no", "0"];

fn parse_bool(value: &str) -> Option<bool> {
    let any_of = |words: &[&str]| words.iter().any(|w| value.eq_ignore_ascii_case(w));
    if any_of(&ON_WORDS[..]) {
        Some(true)
    } else if any_of(&OFF_WORDS[..]) {
        Some(false)
    } else {
        None
    }
}

/// `WxH` or `WxHxBPP`, e.g. `800x600` or `1280x1024x32`. Without a depth the
/// current format is kept.
fn parse_mode(value: &str, current: PixelFormat) -> Option<DisplayMode> {
    let mut parts = value.split('x');
    let width = parts.next()?.parse::<u32>().ok()?;
    let height = parts.next()?.parse::<u32>().ok()?;
    let format = match parts.next() {
        Some(bpp) => PixelFormat::from_bpp(bpp.parse::<u8>().ok()?)?,
        None => current,
    };
    if parts.next().is_some() || width == 0 || height == 0 {
        return None;
    }
    Some(DisplayMode::new(width, height, format))
}

/// Build a config from a kernel-style command line. Tokens not starting with
/// `xserv.` and values that do not parse leave the default in place.
pub fn config_from_cmdline(cmdline: Option<&str>) -> ServerConfig {
    let mut cfg = ServerConfig::default();
    let Some(cmdline) = cmdline else {
        return cfg;
    };

    for token in cmdline.split_whitespace() {
        if let Some(value) = token.strip_prefix("xserv.mode=") {
            if let Some(mode) = parse_mode(value, cfg.mode.format) {
                cfg.mode = mode;
            }
        } else if let Some(value) = token.strip_prefix("xserv.redraw=") {
            if let Some(mode) = RedrawMode::from_name(value) {
                cfg.redraw_mode = mode;
            }
        } else if let Some(value) = token.strip_prefix("xserv.log=") {
            if let Some(level) = KlogLevel::from_name(value) {
                cfg.log_level = level;
            }
        } else if let Some(value) = token.strip_prefix("xserv.alpha=") {
            if let Ok(alpha) = value.parse::<f32>() {
                if alpha > 0.0 && alpha < 1.0 {
                    cfg.translucent_alpha = alpha;
                }
            }
        } else if let Some(value) = token.strip_prefix("xserv.indicator=") {
            if let Some(on) = parse_bool(value) {
                cfg.indicator = on;
            }
        }
    }
    cfg
}
