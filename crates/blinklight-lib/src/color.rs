//! Color types and conversions for BlinkStick light control.
//!
//! Hue is measured in degrees `[0, 360)`, saturation and value in percent
//! `[0, 100]`, matching the hue/saturation convention of home-automation
//! light entities. Channels are 8-bit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An 8-bit RGB triple as reported and accepted by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A hue/saturation pair — the color cache of a light entity.
///
/// Brightness is carried separately; together they form a full HSV color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsColor {
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
    /// Saturation in percent, `[0, 100]`.
    pub saturation: f32,
}

impl HsColor {
    /// Fallback color when a light is turned on before any color was
    /// ever cached or commanded.
    pub const WHITE: HsColor = HsColor {
        hue: 0.0,
        saturation: 0.0,
    };

    pub const fn new(hue: f32, saturation: f32) -> Self {
        HsColor { hue, saturation }
    }
}

/// A full HSV color: hue in degrees, saturation and value in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

// ── RGB ↔ HSV ──

/// Convert an RGB triple to HSV.
///
/// At the saturation-zero singularity (grays, including black) the hue is
/// reported as 0.0.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f32::from(rgb.r) / 255.0;
    let g = f32::from(rgb.g) / 255.0;
    let b = f32::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max * 100.0 };

    Hsv {
        hue,
        saturation,
        value: max * 100.0,
    }
}

/// Convert an HSV color to an RGB triple.
///
/// Hue wraps modulo 360 so that e.g. 360.0 and 0.0 produce the same color.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let s = hsv.saturation / 100.0;
    let v = hsv.value / 100.0;

    if s <= 0.0 {
        let gray = (v * 255.0).round() as u8;
        return Rgb::new(gray, gray, gray);
    }

    let h = hsv.hue.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb::new(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

// ── Brightness scaling ──

/// Rescale an HSV value percent `[0, 100]` to the 0–255 brightness range.
pub fn value_to_brightness(value: f32) -> u8 {
    (value / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Rescale a 0–255 brightness to an HSV value percent `[0, 100]`.
pub fn brightness_to_value(brightness: u8) -> f32 {
    f32::from(brightness) / 255.0 * 100.0
}

// ── Parsing / formatting ──

/// Parse a color string into an RGB triple.
///
/// Accepts:
/// - Hex: `"#FF0000"`, `"FF0000"`, `"#ff0000"`
/// - Named: `"red"`, `"green"`, `"blue"`, `"white"`, `"orange"`, `"yellow"`, `"purple"`, `"cyan"`
pub fn parse_color(s: &str) -> crate::error::Result<Rgb> {
    let s = s.trim();

    // Named colors
    match s.to_lowercase().as_str() {
        "red" => return Ok(Rgb::new(0xFF, 0x00, 0x00)),
        "green" => return Ok(Rgb::new(0x00, 0xFF, 0x00)),
        "blue" => return Ok(Rgb::new(0x00, 0x00, 0xFF)),
        "white" => return Ok(Rgb::new(0xFF, 0xFF, 0xFF)),
        "orange" => return Ok(Rgb::new(0xFF, 0x80, 0x00)),
        "yellow" => return Ok(Rgb::new(0xFF, 0xFF, 0x00)),
        "purple" => return Ok(Rgb::new(0x80, 0x00, 0xFF)),
        "cyan" => return Ok(Rgb::new(0x00, 0xFF, 0xFF)),
        "off" | "black" => return Ok(Rgb::BLACK),
        _ => {}
    }

    // Hex color
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return Err(crate::BlinklightError::Color(format!(
            "Invalid color: {s} (use #RRGGBB or a color name)"
        )));
    }
    let val = u32::from_str_radix(hex, 16)
        .map_err(|_| crate::BlinklightError::Color(format!("Invalid hex color: {s}")))?;
    Ok(Rgb::new(
        ((val >> 16) & 0xFF) as u8,
        ((val >> 8) & 0xFF) as u8,
        (val & 0xFF) as u8,
    ))
}

/// Format an RGB triple as `#RRGGBB`.
pub fn format_color(rgb: Rgb) -> String {
    rgb.to_string()
}
