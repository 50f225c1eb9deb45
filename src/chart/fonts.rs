//! Runtime font registration for chart text.
//!
//! Plotters is built with the `ab_glyph` text backend, which only knows fonts
//! registered at runtime. We register the first readable TrueType/OpenType file
//! from an explicit path or a list of common system locations. Without one,
//! charts are still drawn, just without any text.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};
use tracing::{info, warn};

/// Family name every chart text style refers to.
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a chart font once per process. Returns whether text can be drawn.
///
/// Only the first call's `preferred` path is considered.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| register_first(preferred))
}

fn register_first(preferred: Option<&Path>) -> bool {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // The registry holds `&'static` data for the life of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!(path = %path.display(), "registered chart font");
                return true;
            }
            Err(_) => warn!(path = %path.display(), "unusable font file"),
        }
    }

    warn!("no usable font found (set STOCK_INSIGHT_FONT); charts will be drawn without text");
    false
}
