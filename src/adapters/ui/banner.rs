//! Neon ASCII banner with gradient (DOC-SCAN).
//! Uses figlet's built-in standard font.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Ocean Blue (#2563eb).
const OCEAN_BLUE: (u8, u8, u8) = (0x25, 0x63, 0xeb);
/// Soft Purple (#a855f7).
const SOFT_PURPLE: (u8, u8, u8) = (0xa8, 0x55, 0xf7);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Banner art lines; falls back to the plain title if the font cannot render.
fn banner_lines() -> Vec<String> {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("DOC-SCAN").map(|fig| fig.to_string()))
        .map(|art| art.lines().map(str::to_string).collect())
        .unwrap_or_else(|| vec!["DOC-SCAN".to_string()])
}

/// Prints the welcome banner with a blue-to-purple gradient, then version and tagline.
pub fn print_welcome() {
    let mut out = stdout();
    let lines = banner_lines();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(OCEAN_BLUE, SOFT_PURPLE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: SOFT_PURPLE.0,
        g: SOFT_PURPLE.1,
        b: SOFT_PURPLE.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Scan documents and send them by email\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
