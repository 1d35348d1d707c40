//! Style property bundles and the keys used to edit them.
//!
//! Each bundle groups one semantic category of style (spacing, radius, flex,
//! sizing, typography, colour). Keys map to kebab-case CSS property names so
//! an edit can be written straight to the element's inline style.

use crate::css::{ColorValue, CssValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// A spacing property (padding, margin or gap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpacingKey {
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    Gap,
}

impl SpacingKey {
    pub const ALL: [SpacingKey; 9] = [
        SpacingKey::PaddingTop,
        SpacingKey::PaddingRight,
        SpacingKey::PaddingBottom,
        SpacingKey::PaddingLeft,
        SpacingKey::MarginTop,
        SpacingKey::MarginRight,
        SpacingKey::MarginBottom,
        SpacingKey::MarginLeft,
        SpacingKey::Gap,
    ];

    pub const PADDING: [SpacingKey; 4] = [
        SpacingKey::PaddingTop,
        SpacingKey::PaddingRight,
        SpacingKey::PaddingBottom,
        SpacingKey::PaddingLeft,
    ];

    pub const MARGIN: [SpacingKey; 4] = [
        SpacingKey::MarginTop,
        SpacingKey::MarginRight,
        SpacingKey::MarginBottom,
        SpacingKey::MarginLeft,
    ];

    /// The CSS property this key edits.
    pub fn css_name(self) -> &'static str {
        match self {
            SpacingKey::PaddingTop => "padding-top",
            SpacingKey::PaddingRight => "padding-right",
            SpacingKey::PaddingBottom => "padding-bottom",
            SpacingKey::PaddingLeft => "padding-left",
            SpacingKey::MarginTop => "margin-top",
            SpacingKey::MarginRight => "margin-right",
            SpacingKey::MarginBottom => "margin-bottom",
            SpacingKey::MarginLeft => "margin-left",
            SpacingKey::Gap => "gap",
        }
    }
}

/// Padding, margin and gap of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpacingProperties {
    pub padding_top: CssValue,
    pub padding_right: CssValue,
    pub padding_bottom: CssValue,
    pub padding_left: CssValue,
    pub margin_top: CssValue,
    pub margin_right: CssValue,
    pub margin_bottom: CssValue,
    pub margin_left: CssValue,
    pub gap: CssValue,
}

impl SpacingProperties {
    pub fn get(&self, key: SpacingKey) -> &CssValue {
        match key {
            SpacingKey::PaddingTop => &self.padding_top,
            SpacingKey::PaddingRight => &self.padding_right,
            SpacingKey::PaddingBottom => &self.padding_bottom,
            SpacingKey::PaddingLeft => &self.padding_left,
            SpacingKey::MarginTop => &self.margin_top,
            SpacingKey::MarginRight => &self.margin_right,
            SpacingKey::MarginBottom => &self.margin_bottom,
            SpacingKey::MarginLeft => &self.margin_left,
            SpacingKey::Gap => &self.gap,
        }
    }

    pub fn set(&mut self, key: SpacingKey, value: CssValue) {
        let slot = match key {
            SpacingKey::PaddingTop => &mut self.padding_top,
            SpacingKey::PaddingRight => &mut self.padding_right,
            SpacingKey::PaddingBottom => &mut self.padding_bottom,
            SpacingKey::PaddingLeft => &mut self.padding_left,
            SpacingKey::MarginTop => &mut self.margin_top,
            SpacingKey::MarginRight => &mut self.margin_right,
            SpacingKey::MarginBottom => &mut self.margin_bottom,
            SpacingKey::MarginLeft => &mut self.margin_left,
            SpacingKey::Gap => &mut self.gap,
        };
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// Border radius
// ---------------------------------------------------------------------------

/// One corner of the border radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadiusKey {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl RadiusKey {
    pub const ALL: [RadiusKey; 4] = [
        RadiusKey::TopLeft,
        RadiusKey::TopRight,
        RadiusKey::BottomRight,
        RadiusKey::BottomLeft,
    ];

    pub fn css_name(self) -> &'static str {
        match self {
            RadiusKey::TopLeft => "border-top-left-radius",
            RadiusKey::TopRight => "border-top-right-radius",
            RadiusKey::BottomRight => "border-bottom-right-radius",
            RadiusKey::BottomLeft => "border-bottom-left-radius",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderRadiusProperties {
    pub top_left: CssValue,
    pub top_right: CssValue,
    pub bottom_right: CssValue,
    pub bottom_left: CssValue,
}

impl BorderRadiusProperties {
    pub fn get(&self, key: RadiusKey) -> &CssValue {
        match key {
            RadiusKey::TopLeft => &self.top_left,
            RadiusKey::TopRight => &self.top_right,
            RadiusKey::BottomRight => &self.bottom_right,
            RadiusKey::BottomLeft => &self.bottom_left,
        }
    }

    pub fn set(&mut self, key: RadiusKey, value: CssValue) {
        match key {
            RadiusKey::TopLeft => self.top_left = value,
            RadiusKey::TopRight => self.top_right = value,
            RadiusKey::BottomRight => self.bottom_right = value,
            RadiusKey::BottomLeft => self.bottom_left = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Flex
// ---------------------------------------------------------------------------

/// The `display` value of an element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    InlineFlex,
    Grid,
    None,
    Other(String),
}

impl Display {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "block" => Display::Block,
            "inline" => Display::Inline,
            "inline-block" => Display::InlineBlock,
            "flex" => Display::Flex,
            "inline-flex" => Display::InlineFlex,
            "grid" => Display::Grid,
            "none" => Display::None,
            other => Display::Other(other.to_string()),
        }
    }

    pub fn as_css(&self) -> &str {
        match self {
            Display::Block => "block",
            Display::Inline => "inline",
            Display::InlineBlock => "inline-block",
            Display::Flex => "flex",
            Display::InlineFlex => "inline-flex",
            Display::Grid => "grid",
            Display::None => "none",
            Display::Other(s) => s,
        }
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, Display::Flex | Display::InlineFlex)
    }

    /// Whether the element flows inline with text.
    pub fn is_inline_level(&self) -> bool {
        matches!(self, Display::Inline | Display::InlineBlock | Display::InlineFlex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "row-reverse" => FlexDirection::RowReverse,
            "column" => FlexDirection::Column,
            "column-reverse" => FlexDirection::ColumnReverse,
            _ => FlexDirection::Row,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            FlexDirection::Row => "row",
            FlexDirection::RowReverse => "row-reverse",
            FlexDirection::Column => "column",
            FlexDirection::ColumnReverse => "column-reverse",
        }
    }

    /// Whether the main axis is horizontal.
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl JustifyContent {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "flex-end" | "end" => JustifyContent::FlexEnd,
            "center" => JustifyContent::Center,
            "space-between" => JustifyContent::SpaceBetween,
            "space-around" => JustifyContent::SpaceAround,
            "space-evenly" => JustifyContent::SpaceEvenly,
            _ => JustifyContent::FlexStart,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            JustifyContent::FlexStart => "flex-start",
            JustifyContent::FlexEnd => "flex-end",
            JustifyContent::Center => "center",
            JustifyContent::SpaceBetween => "space-between",
            JustifyContent::SpaceAround => "space-around",
            JustifyContent::SpaceEvenly => "space-evenly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignItems {
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
    #[default]
    Stretch,
}

impl AlignItems {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "flex-start" | "start" => AlignItems::FlexStart,
            "flex-end" | "end" => AlignItems::FlexEnd,
            "center" => AlignItems::Center,
            "baseline" => AlignItems::Baseline,
            _ => AlignItems::Stretch,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            AlignItems::FlexStart => "flex-start",
            AlignItems::FlexEnd => "flex-end",
            AlignItems::Center => "center",
            AlignItems::Baseline => "baseline",
            AlignItems::Stretch => "stretch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

impl FlexWrap {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "wrap" => FlexWrap::Wrap,
            "wrap-reverse" => FlexWrap::WrapReverse,
            _ => FlexWrap::NoWrap,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            FlexWrap::NoWrap => "nowrap",
            FlexWrap::Wrap => "wrap",
            FlexWrap::WrapReverse => "wrap-reverse",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexProperties {
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub flex_wrap: FlexWrap,
}

/// A single flex edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FlexUpdate {
    Display(Display),
    Direction(FlexDirection),
    Justify(JustifyContent),
    Align(AlignItems),
    Wrap(FlexWrap),
}

impl FlexUpdate {
    pub fn css_name(&self) -> &'static str {
        match self {
            FlexUpdate::Display(_) => "display",
            FlexUpdate::Direction(_) => "flex-direction",
            FlexUpdate::Justify(_) => "justify-content",
            FlexUpdate::Align(_) => "align-items",
            FlexUpdate::Wrap(_) => "flex-wrap",
        }
    }

    pub fn css_value(&self) -> String {
        match self {
            FlexUpdate::Display(d) => d.as_css().to_string(),
            FlexUpdate::Direction(d) => d.as_css().to_string(),
            FlexUpdate::Justify(j) => j.as_css().to_string(),
            FlexUpdate::Align(a) => a.as_css().to_string(),
            FlexUpdate::Wrap(w) => w.as_css().to_string(),
        }
    }

    pub(crate) fn apply(&self, flex: &mut FlexProperties) {
        match self {
            FlexUpdate::Display(d) => flex.display = d.clone(),
            FlexUpdate::Direction(d) => flex.flex_direction = *d,
            FlexUpdate::Justify(j) => flex.justify_content = *j,
            FlexUpdate::Align(a) => flex.align_items = *a,
            FlexUpdate::Wrap(w) => flex.flex_wrap = *w,
        }
    }
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Sizing axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizingKey {
    Width,
    Height,
}

impl SizingKey {
    pub fn css_name(self) -> &'static str {
        match self {
            SizingKey::Width => "width",
            SizingKey::Height => "height",
        }
    }
}

/// How an element's size along one axis is determined.
///
/// This is an inferred classification, not a CSS property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizingMode {
    /// Stretches to the available space.
    Fill,
    /// Shrinks to its content.
    #[default]
    Fit,
    /// An explicit length.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingValue {
    pub mode: SizingMode,
    pub value: CssValue,
}

impl SizingValue {
    pub fn fill() -> Self {
        Self {
            mode: SizingMode::Fill,
            value: CssValue::new(100.0, crate::css::CssUnit::Percent),
        }
    }

    pub fn fit() -> Self {
        Self {
            mode: SizingMode::Fit,
            value: CssValue::keyword("auto"),
        }
    }

    pub fn fixed(value: CssValue) -> Self {
        Self {
            mode: SizingMode::Fixed,
            value,
        }
    }

    /// Read a sizing from `fill`, `fit` or a length. `100%` is fill and
    /// `auto`/`fit-content` are fit.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "fill" | "100%" => Self::fill(),
            "fit" | "fit-content" | "auto" => Self::fit(),
            _ => Self::fixed(crate::css::parse_property_value(value)),
        }
    }

    /// The CSS value written to the element for this sizing.
    pub fn css_value(&self) -> String {
        match self.mode {
            SizingMode::Fill => "100%".to_string(),
            SizingMode::Fit => "fit-content".to_string(),
            SizingMode::Fixed => crate::css::format_property_value(&self.value),
        }
    }
}

impl Default for SizingValue {
    fn default() -> Self {
        Self::fit()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingProperties {
    pub width: SizingValue,
    pub height: SizingValue,
}

impl SizingProperties {
    pub fn get(&self, key: SizingKey) -> &SizingValue {
        match key {
            SizingKey::Width => &self.width,
            SizingKey::Height => &self.height,
        }
    }

    pub fn set(&mut self, key: SizingKey, value: SizingValue) {
        match key {
            SizingKey::Width => self.width = value,
            SizingKey::Height => self.height = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Typography
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "center" => TextAlign::Center,
            "right" | "end" => TextAlign::Right,
            "justify" => TextAlign::Justify,
            _ => TextAlign::Left,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

/// Vertical placement of text inside its box.
///
/// There is no standalone CSS property for this; it is expressed through a
/// flex display and `align-items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Some(VerticalAlign::Top),
            "center" | "middle" => Some(VerticalAlign::Center),
            "bottom" => Some(VerticalAlign::Bottom),
            _ => None,
        }
    }

    pub fn to_align_items(self) -> AlignItems {
        match self {
            VerticalAlign::Top => AlignItems::FlexStart,
            VerticalAlign::Center => AlignItems::Center,
            VerticalAlign::Bottom => AlignItems::FlexEnd,
        }
    }

    pub fn from_align_items(align: AlignItems) -> Self {
        match align {
            AlignItems::Center => VerticalAlign::Center,
            AlignItems::FlexEnd => VerticalAlign::Bottom,
            _ => VerticalAlign::Top,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypographyProperties {
    pub font_family: String,
    /// Numeric weight as a string (`"400"`).
    pub font_weight: String,
    pub font_size: CssValue,
    pub line_height: CssValue,
    pub letter_spacing: CssValue,
    pub text_align: TextAlign,
    pub text_vertical_align: VerticalAlign,
}

/// A single typography edit.
#[derive(Debug, Clone, PartialEq)]
pub enum TypographyUpdate {
    FontFamily(String),
    FontWeight(String),
    FontSize(CssValue),
    LineHeight(CssValue),
    LetterSpacing(CssValue),
    TextAlign(TextAlign),
    VerticalAlign(VerticalAlign),
}

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorKey {
    Background,
    Text,
    Border,
}

impl ColorKey {
    pub const ALL: [ColorKey; 3] = [ColorKey::Background, ColorKey::Text, ColorKey::Border];

    pub fn css_name(self) -> &'static str {
        match self {
            ColorKey::Background => "background-color",
            ColorKey::Text => "color",
            ColorKey::Border => "border-color",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorProperties {
    pub background_color: ColorValue,
    pub text_color: ColorValue,
    pub border_color: ColorValue,
}

impl ColorProperties {
    pub fn get(&self, key: ColorKey) -> &ColorValue {
        match key {
            ColorKey::Background => &self.background_color,
            ColorKey::Text => &self.text_color,
            ColorKey::Border => &self.border_color,
        }
    }

    pub fn set(&mut self, key: ColorKey, value: ColorValue) {
        match key {
            ColorKey::Background => self.background_color = value,
            ColorKey::Text => self.text_color = value,
            ColorKey::Border => self.border_color = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Touched properties
// ---------------------------------------------------------------------------

/// Every CSS property the editor may write to an element's inline style.
pub const EDITABLE_PROPERTIES: &[&str] = &[
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "gap",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
    "display",
    "flex-direction",
    "justify-content",
    "align-items",
    "flex-wrap",
    "width",
    "height",
    "background-color",
    "color",
    "border-color",
    "font-family",
    "font-weight",
    "font-size",
    "line-height",
    "letter-spacing",
    "text-align",
];

// ---------------------------------------------------------------------------
// Pending and original styles
// ---------------------------------------------------------------------------

/// The CSS properties changed since the current element was selected.
///
/// Keeps first-edit order so exports read in the order the user worked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingStyles {
    entries: Vec<(String, String)>,
}

impl PendingStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any earlier value in place.
    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Render as CSS declarations, one per line.
    pub fn to_css(&self) -> String {
        self.iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PendingStyles {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut styles = PendingStyles::new();
        for (k, v) in iter {
            styles.insert(k, v);
        }
        styles
    }
}

/// Inline style values present on an element before it was selected.
///
/// Properties without an inline value are absent, so restoring removes the
/// override and the cascade applies again.
pub type OriginalStyles = BTreeMap<String, String>;
