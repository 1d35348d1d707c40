//! Conversion of pending CSS edits into Tailwind utility classes.
//!
//! Scale lookups are exact: a pixel value maps to a scale token only when the
//! table has that exact magnitude. Anything else becomes an arbitrary-value
//! class such as `pt-[13px]`. The conversion is one-directional and only used
//! for export.

use crate::css::{CssUnit, parse_color_value, parse_property_value};
use crate::properties::PendingStyles;

/// Tailwind spacing scale (pixels to token).
const SPACING_SCALE: &[(f64, &str)] = &[
    (0.0, "0"),
    (1.0, "px"),
    (2.0, "0.5"),
    (4.0, "1"),
    (6.0, "1.5"),
    (8.0, "2"),
    (10.0, "2.5"),
    (12.0, "3"),
    (14.0, "3.5"),
    (16.0, "4"),
    (20.0, "5"),
    (24.0, "6"),
    (28.0, "7"),
    (32.0, "8"),
    (36.0, "9"),
    (40.0, "10"),
    (44.0, "11"),
    (48.0, "12"),
    (56.0, "14"),
    (64.0, "16"),
    (80.0, "20"),
    (96.0, "24"),
    (112.0, "28"),
    (128.0, "32"),
    (144.0, "36"),
    (160.0, "40"),
    (176.0, "44"),
    (192.0, "48"),
    (208.0, "52"),
    (224.0, "56"),
    (240.0, "60"),
    (256.0, "64"),
    (288.0, "72"),
    (320.0, "80"),
    (384.0, "96"),
];

/// Tailwind border radius scale. An empty token is the bare `rounded` class.
const RADIUS_SCALE: &[(f64, &str)] = &[
    (0.0, "none"),
    (2.0, "sm"),
    (4.0, ""),
    (6.0, "md"),
    (8.0, "lg"),
    (12.0, "xl"),
    (16.0, "2xl"),
    (24.0, "3xl"),
    (9999.0, "full"),
];

const FONT_SIZE_SCALE: &[(f64, &str)] = &[
    (12.0, "xs"),
    (14.0, "sm"),
    (16.0, "base"),
    (18.0, "lg"),
    (20.0, "xl"),
    (24.0, "2xl"),
    (30.0, "3xl"),
    (36.0, "4xl"),
    (48.0, "5xl"),
    (60.0, "6xl"),
    (72.0, "7xl"),
    (96.0, "8xl"),
    (128.0, "9xl"),
];

const LETTER_SPACING_SCALE: &[(f64, &str)] = &[
    (-0.05, "tighter"),
    (-0.025, "tight"),
    (0.0, "normal"),
    (0.025, "wide"),
    (0.05, "wider"),
    (0.1, "widest"),
];

fn lookup(scale: &[(f64, &'static str)], value: f64) -> Option<&'static str> {
    scale
        .iter()
        .find(|(px, _)| (px - value).abs() < 1e-6)
        .map(|(_, token)| *token)
}

/// Escape a value for use inside `[...]`: spaces become underscores.
fn arbitrary(value: &str) -> String {
    format!("[{}]", value.trim().replace(' ', "_"))
}

/// Class for a spacing property such as `pt`, `mx` or `gap`.
pub fn spacing_class(prefix: &str, value: &str) -> String {
    let parsed = parse_property_value(value);
    if parsed.is_keyword() {
        return if parsed.raw == "auto" {
            format!("{}-auto", prefix)
        } else {
            format!("{}-{}", prefix, arbitrary(&parsed.raw))
        };
    }
    if parsed.unit == CssUnit::Px {
        let negative = parsed.numeric_value < 0.0;
        if let Some(token) = lookup(SPACING_SCALE, parsed.numeric_value.abs()) {
            // Only margins may be negative in Tailwind's scale.
            if !negative {
                return format!("{}-{}", prefix, token);
            }
            if prefix.starts_with('m') {
                return format!("-{}-{}", prefix, token);
            }
        }
    }
    format!("{}-{}", prefix, arbitrary(&parsed.raw))
}

/// Class for one border radius corner (`tl`, `tr`, `br`, `bl`) or all corners
/// when `corner` is empty.
pub fn radius_class(corner: &str, value: &str) -> String {
    let prefix = if corner.is_empty() {
        "rounded".to_string()
    } else {
        format!("rounded-{}", corner)
    };
    let parsed = parse_property_value(value);
    if parsed.unit == CssUnit::Px {
        if let Some(token) = lookup(RADIUS_SCALE, parsed.numeric_value) {
            return if token.is_empty() {
                prefix
            } else {
                format!("{}-{}", prefix, token)
            };
        }
    }
    format!("{}-{}", prefix, arbitrary(&parsed.raw))
}

/// Class for `width` or `height`.
pub fn size_class(prefix: &str, value: &str) -> String {
    match value.trim() {
        "100%" => format!("{}-full", prefix),
        "fit-content" => format!("{}-fit", prefix),
        "auto" => format!("{}-auto", prefix),
        other => format!("{}-{}", prefix, arbitrary(other)),
    }
}

pub fn display_class(value: &str) -> Option<String> {
    let class = match value.trim() {
        "flex" => "flex",
        "inline-flex" => "inline-flex",
        "block" => "block",
        "inline-block" => "inline-block",
        "inline" => "inline",
        "grid" => "grid",
        "none" => "hidden",
        other => return Some(format!("[display:{}]", other)),
    };
    Some(class.to_string())
}

pub fn flex_direction_class(value: &str) -> Option<String> {
    let class = match value.trim() {
        "row" => "flex-row",
        "row-reverse" => "flex-row-reverse",
        "column" => "flex-col",
        "column-reverse" => "flex-col-reverse",
        _ => return None,
    };
    Some(class.to_string())
}

/// Unmatched values produce no class.
pub fn justify_class(value: &str) -> Option<String> {
    let class = match value.trim() {
        "flex-start" | "start" => "justify-start",
        "flex-end" | "end" => "justify-end",
        "center" => "justify-center",
        "space-between" => "justify-between",
        "space-around" => "justify-around",
        "space-evenly" => "justify-evenly",
        _ => return None,
    };
    Some(class.to_string())
}

/// Unmatched values produce no class.
pub fn align_class(value: &str) -> Option<String> {
    let class = match value.trim() {
        "flex-start" | "start" => "items-start",
        "flex-end" | "end" => "items-end",
        "center" => "items-center",
        "baseline" => "items-baseline",
        "stretch" => "items-stretch",
        _ => return None,
    };
    Some(class.to_string())
}

pub fn flex_wrap_class(value: &str) -> Option<String> {
    let class = match value.trim() {
        "wrap" => "flex-wrap",
        "nowrap" => "flex-nowrap",
        "wrap-reverse" => "flex-wrap-reverse",
        _ => return None,
    };
    Some(class.to_string())
}

pub fn font_weight_class(value: &str) -> String {
    let token = match value.trim() {
        "100" => "thin",
        "200" => "extralight",
        "300" => "light",
        "400" => "normal",
        "500" => "medium",
        "600" => "semibold",
        "700" => "bold",
        "800" => "extrabold",
        "900" => "black",
        other => return format!("font-{}", arbitrary(other)),
    };
    format!("font-{}", token)
}

pub fn font_size_class(value: &str) -> String {
    let parsed = parse_property_value(value);
    if parsed.unit == CssUnit::Px {
        if let Some(token) = lookup(FONT_SIZE_SCALE, parsed.numeric_value) {
            return format!("text-{}", token);
        }
    }
    format!("text-{}", arbitrary(&parsed.raw))
}

pub fn letter_spacing_class(value: &str) -> String {
    let parsed = parse_property_value(value);
    if parsed.unit == CssUnit::Em {
        if let Some(token) = lookup(LETTER_SPACING_SCALE, parsed.numeric_value) {
            return format!("tracking-{}", token);
        }
    }
    format!("tracking-{}", arbitrary(&parsed.raw))
}

pub fn text_align_class(value: &str) -> Option<String> {
    match value.trim() {
        v @ ("left" | "center" | "right" | "justify") => Some(format!("text-{}", v)),
        _ => None,
    }
}

/// Class for a colour property. `prefix` is `bg`, `text` or `border`.
pub fn color_class(prefix: &str, value: &str) -> String {
    let color = parse_color_value(value);
    if color.alpha == 0 && color.raw.eq_ignore_ascii_case("transparent") {
        return format!("{}-transparent", prefix);
    }
    if color.alpha < 100 {
        format!("{}-[{}]/{}", prefix, color.hex, color.alpha)
    } else {
        format!("{}-[{}]", prefix, color.hex)
    }
}

fn font_family_class(value: &str) -> String {
    let family = value.split(',').next().unwrap_or(value).trim();
    let family = family.trim_matches(|c: char| c == '"' || c == '\'');
    format!("font-{}", arbitrary(&format!("'{}'", family)))
}

/// Convert a single property to its class, if it has one.
fn property_class(property: &str, value: &str) -> Option<String> {
    let class = match property {
        "padding-top" => spacing_class("pt", value),
        "padding-right" => spacing_class("pr", value),
        "padding-bottom" => spacing_class("pb", value),
        "padding-left" => spacing_class("pl", value),
        "margin-top" => spacing_class("mt", value),
        "margin-right" => spacing_class("mr", value),
        "margin-bottom" => spacing_class("mb", value),
        "margin-left" => spacing_class("ml", value),
        "gap" => spacing_class("gap", value),
        "border-top-left-radius" => radius_class("tl", value),
        "border-top-right-radius" => radius_class("tr", value),
        "border-bottom-right-radius" => radius_class("br", value),
        "border-bottom-left-radius" => radius_class("bl", value),
        "display" => return display_class(value),
        "flex-direction" => return flex_direction_class(value),
        "justify-content" => return justify_class(value),
        "align-items" => return align_class(value),
        "flex-wrap" => return flex_wrap_class(value),
        "width" => size_class("w", value),
        "height" => size_class("h", value),
        "font-weight" => font_weight_class(value),
        "font-size" => font_size_class(value),
        "font-family" => font_family_class(value),
        "line-height" => format!("leading-{}", arbitrary(value)),
        "letter-spacing" => letter_spacing_class(value),
        "text-align" => return text_align_class(value),
        "background-color" => color_class("bg", value),
        "color" => color_class("text", value),
        "border-color" => color_class("border", value),
        other => format!("[{}:{}]", other, value.trim().replace(' ', "_")),
    };
    Some(class)
}

/// A four-sided box property (padding or margin) that may collapse into the
/// `p`/`px`/`py` shorthands.
struct BoxGroup {
    base: &'static str,
    sides: [&'static str; 4],
}

const BOX_GROUPS: [BoxGroup; 2] = [
    BoxGroup {
        base: "p",
        sides: ["padding-top", "padding-right", "padding-bottom", "padding-left"],
    },
    BoxGroup {
        base: "m",
        sides: ["margin-top", "margin-right", "margin-bottom", "margin-left"],
    },
];

impl BoxGroup {
    /// Collapse the group if all four sides are pending. Returns the classes
    /// and whether the group was handled.
    fn collapse(&self, styles: &PendingStyles) -> Option<Vec<String>> {
        let [top, right, bottom, left] = self.sides.map(|side| styles.get(side));
        let (top, right, bottom, left) = (top?, right?, bottom?, left?);
        let base = self.base;
        if top == right && right == bottom && bottom == left {
            return Some(vec![spacing_class(base, top)]);
        }
        let mut classes = Vec::new();
        if top == bottom {
            classes.push(spacing_class(&format!("{}y", base), top));
        } else {
            classes.push(spacing_class(&format!("{}t", base), top));
            classes.push(spacing_class(&format!("{}b", base), bottom));
        }
        if left == right {
            classes.push(spacing_class(&format!("{}x", base), left));
        } else {
            classes.push(spacing_class(&format!("{}r", base), right));
            classes.push(spacing_class(&format!("{}l", base), left));
        }
        Some(classes)
    }
}

/// Convert pending styles into Tailwind classes, in edit order.
///
/// Padding and margin collapse into shorthands when all four sides were
/// edited.
pub fn tailwind_classes(styles: &PendingStyles) -> Vec<String> {
    let mut classes = Vec::new();
    let mut emitted_groups = [false; BOX_GROUPS.len()];

    for (property, value) in styles.iter() {
        let group = BOX_GROUPS
            .iter()
            .position(|g| g.sides.contains(&property));
        if let Some(index) = group {
            if emitted_groups[index] {
                continue;
            }
            if let Some(collapsed) = BOX_GROUPS[index].collapse(styles) {
                emitted_groups[index] = true;
                classes.extend(collapsed);
                continue;
            }
        }
        if let Some(class) = property_class(property, value) {
            classes.push(class);
        }
    }
    classes
}

/// Convert pending styles into a space-joined Tailwind class string.
pub fn styles_to_tailwind(styles: &PendingStyles) -> String {
    tailwind_classes(styles).join(" ")
}
