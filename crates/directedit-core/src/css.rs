//! CSS value parsing and formatting.
//!
//! Values read back from computed style are strings like `16px`, `1.5rem`,
//! `auto` or `rgba(0, 0, 0, 0.5)`. These helpers turn them into structured
//! values the editor can manipulate, and never fail: anything that does not
//! look numeric is carried through as a keyword.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length unit of a [`CssValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CssUnit {
    #[default]
    Px,
    Rem,
    Em,
    Percent,
    /// Keyword values (`auto`, `inherit`, ...) carry no unit.
    None,
}

impl CssUnit {
    /// The unit suffix as written in CSS.
    pub fn as_str(self) -> &'static str {
        match self {
            CssUnit::Px => "px",
            CssUnit::Rem => "rem",
            CssUnit::Em => "em",
            CssUnit::Percent => "%",
            CssUnit::None => "",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "px" => Some(CssUnit::Px),
            "rem" => Some(CssUnit::Rem),
            "em" => Some(CssUnit::Em),
            "%" => Some(CssUnit::Percent),
            _ => None,
        }
    }
}

/// A single CSS length or keyword.
///
/// For numeric values `raw` is always `numeric_value` followed by the unit.
/// For keywords `raw` holds the keyword and `numeric_value` is `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssValue {
    pub numeric_value: f64,
    pub unit: CssUnit,
    pub raw: String,
}

impl CssValue {
    /// Create a numeric value.
    pub fn new(numeric_value: f64, unit: CssUnit) -> Self {
        let raw = format!("{}{}", format_number(numeric_value), unit.as_str());
        Self {
            numeric_value,
            unit,
            raw,
        }
    }

    /// Create a pixel value.
    pub fn px(value: f64) -> Self {
        Self::new(value, CssUnit::Px)
    }

    /// Create a keyword value such as `auto`.
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            numeric_value: 0.0,
            unit: CssUnit::None,
            raw: keyword.into(),
        }
    }

    /// Whether this value is a keyword rather than a number.
    pub fn is_keyword(&self) -> bool {
        self.unit == CssUnit::None
    }
}

impl Default for CssValue {
    fn default() -> Self {
        Self::px(0.0)
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_property_value(self))
    }
}

/// Split a string into its leading number and the remaining suffix.
///
/// Accepts an optional sign, digits and at most one decimal point. Returns
/// `None` when no digit is present.
fn split_number(s: &str) -> Option<(f64, &str)> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    let number = s[..end].parse::<f64>().ok()?;
    Some((number, &s[end..]))
}

/// Format a number the way CSS writes it: no trailing `.0`, no `-0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Parse a CSS length string into a [`CssValue`].
///
/// A bare number is treated as pixels. Anything that is not a number with a
/// recognised unit is returned unchanged as a keyword.
pub fn parse_property_value(value: &str) -> CssValue {
    let trimmed = value.trim();
    match split_number(trimmed) {
        Some((number, suffix)) => match CssUnit::from_suffix(suffix) {
            Some(unit) => CssValue::new(number, unit),
            None => CssValue::keyword(trimmed),
        },
        None => CssValue::keyword(trimmed),
    }
}

/// Format a [`CssValue`] back into a CSS string.
pub fn format_property_value(value: &CssValue) -> String {
    if value.is_keyword() {
        return value.raw.clone();
    }
    format!("{}{}", format_number(value.numeric_value), value.unit.as_str())
}

/// A parsed colour with a percentage alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorValue {
    /// Lowercase `#rrggbb`.
    pub hex: String,
    /// Opacity from 0 to 100.
    pub alpha: u8,
    pub raw: String,
}

impl ColorValue {
    /// Create an opaque colour from its channels.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 100)
    }

    /// Create a colour from its channels and an alpha percentage.
    pub fn from_rgba(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        let alpha = alpha.min(100);
        let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
        let raw = if alpha == 100 {
            hex.clone()
        } else {
            format!("rgba({}, {}, {}, {})", r, g, b, format_number(alpha as f64 / 100.0))
        };
        Self { hex, alpha, raw }
    }

    /// The red, green and blue channels.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            self.hex
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .unwrap_or(0)
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }

    /// Format as a CSS colour: hex when opaque, `rgba()` otherwise.
    pub fn to_css(&self) -> String {
        if self.alpha >= 100 {
            return self.hex.clone();
        }
        let (r, g, b) = self.rgb();
        format!("rgba({}, {}, {}, {})", r, g, b, format_number(self.alpha as f64 / 100.0))
    }
}

impl Default for ColorValue {
    fn default() -> Self {
        Self::from_rgb(0, 0, 0)
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    let s = s.trim();
    let value = if let Some(pct) = s.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? * 2.55
    } else {
        s.parse::<f64>().ok()?
    };
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(s: &str) -> Option<u8> {
    let s = s.trim();
    let fraction = if let Some(pct) = s.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? / 100.0
    } else {
        s.parse::<f64>().ok()?
    };
    Some((fraction * 100.0).round().clamp(0.0, 100.0) as u8)
}

fn parse_rgb_function(inner: &str) -> Option<(u8, u8, u8, u8)> {
    // Accept both `r, g, b, a` and `r g b / a`.
    let (channels, alpha) = match inner.split_once('/') {
        Some((c, a)) => (c, Some(a)),
        None => (inner, None),
    };
    let parts: Vec<&str> = if channels.contains(',') {
        channels.split(',').map(str::trim).filter(|p| !p.is_empty()).collect()
    } else {
        channels.split_whitespace().collect()
    };
    let (r, g, b, a) = match (parts.as_slice(), alpha) {
        ([r, g, b], None) => (r, g, b, None),
        ([r, g, b, a], None) => (r, g, b, Some(*a)),
        ([r, g, b], Some(a)) => (r, g, b, Some(a)),
        _ => return None,
    };
    let alpha = match a {
        Some(a) => parse_alpha(a)?,
        None => 100,
    };
    Some((parse_channel(r)?, parse_channel(g)?, parse_channel(b)?, alpha))
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8, u8)> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<Vec<_>>>()?;
    match digits.as_slice() {
        [r, g, b] => Some((r * 17, g * 17, b * 17, 100)),
        [r, g, b, a] => Some((r * 17, g * 17, b * 17, ((*a as f64 * 17.0) / 2.55).round() as u8)),
        [r1, r0, g1, g0, b1, b0] => Some((r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 100)),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Some((
            r1 * 16 + r0,
            g1 * 16 + g0,
            b1 * 16 + b0,
            (((a1 * 16 + a0) as f64) / 2.55).round() as u8,
        )),
        _ => None,
    }
}

/// Parse a computed colour string (`rgb()`, `rgba()`, hex or `transparent`).
///
/// Unrecognised input becomes opaque black with `raw` preserving the input.
pub fn parse_color_value(value: &str) -> ColorValue {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();

    let parsed = if lower == "transparent" {
        Some((0, 0, 0, 0))
    } else if let Some(hex) = lower.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(inner) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        parse_rgb_function(inner)
    } else {
        None
    };

    match parsed {
        Some((r, g, b, a)) => {
            let mut color = ColorValue::from_rgba(r, g, b, a);
            color.raw = trimmed.to_string();
            color
        }
        None => ColorValue {
            raw: trimmed.to_string(),
            ..ColorValue::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        let v = parse_property_value("16px");
        assert_eq!(v.numeric_value, 16.0);
        assert_eq!(v.unit, CssUnit::Px);
        assert_eq!(v.raw, "16px");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_property_value("1.5rem").unit, CssUnit::Rem);
        assert_eq!(parse_property_value("0.25em").unit, CssUnit::Em);
        assert_eq!(parse_property_value("100%").unit, CssUnit::Percent);
        assert_eq!(parse_property_value("-8px").numeric_value, -8.0);
        assert_eq!(parse_property_value(".5rem").numeric_value, 0.5);
    }

    #[test]
    fn test_bare_number_defaults_to_px() {
        let v = parse_property_value("12");
        assert_eq!(v.unit, CssUnit::Px);
        assert_eq!(v.raw, "12px");
    }

    #[test]
    fn test_keywords_pass_through() {
        for keyword in ["auto", "inherit", "initial", "fit-content", "12vh", ""] {
            let v = parse_property_value(keyword);
            assert!(v.is_keyword(), "{keyword} should be a keyword");
            assert_eq!(v.numeric_value, 0.0);
            assert_eq!(v.raw, keyword);
        }
    }

    #[test]
    fn test_round_trip() {
        for s in [
            "16px", "1.5rem", "0.25em", "100%", "-8px", "0px", "13px", "2.75rem", "0.12345rem",
            "-1.234567em", "33.333333%",
        ] {
            assert_eq!(format_property_value(&parse_property_value(s)), s);
        }
    }

    #[test]
    fn test_format_keyword() {
        assert_eq!(format_property_value(&CssValue::keyword("auto")), "auto");
    }

    #[test]
    fn test_parse_rgb() {
        let c = parse_color_value("rgb(59, 130, 246)");
        assert_eq!(c.hex, "#3b82f6");
        assert_eq!(c.alpha, 100);
        assert_eq!(c.raw, "rgb(59, 130, 246)");
    }

    #[test]
    fn test_parse_rgba_alpha_is_percent() {
        let c = parse_color_value("rgba(0, 0, 0, 0.5)");
        assert_eq!(c.hex, "#000000");
        assert_eq!(c.alpha, 50);
    }

    #[test]
    fn test_parse_space_syntax() {
        let c = parse_color_value("rgb(255 0 0 / 25%)");
        assert_eq!(c.hex, "#ff0000");
        assert_eq!(c.alpha, 25);
    }

    #[test]
    fn test_parse_hex_and_transparent() {
        assert_eq!(parse_color_value("#FFF").hex, "#ffffff");
        assert_eq!(parse_color_value("#10b981").hex, "#10b981");
        assert_eq!(parse_color_value("transparent").alpha, 0);
    }

    #[test]
    fn test_unknown_color_keeps_raw() {
        let c = parse_color_value("currentcolor");
        assert_eq!(c.hex, "#000000");
        assert_eq!(c.raw, "currentcolor");
    }

    #[test]
    fn test_color_to_css() {
        assert_eq!(ColorValue::from_rgb(255, 0, 0).to_css(), "#ff0000");
        assert_eq!(ColorValue::from_rgba(255, 0, 0, 50).to_css(), "rgba(255, 0, 0, 0.5)");
    }
}
