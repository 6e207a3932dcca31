use crate::color::Color;
use crate::ir::{Appearance, BorderStyle, Settings, TextAlignment};
use serde::{Deserialize, Serialize};

/// Side length of one background pattern tile.
pub const PATTERN_CELL: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPattern {
    #[default]
    None,
    Dots,
    Grid,
    Lines,
}

/// Per-render style overrides. Every field is optional; nothing here is
/// ever written back into a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub background_color: Option<String>,
    pub background_pattern: Option<BackgroundPattern>,
    pub pattern_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub line_color: Option<String>,
    pub line_width: Option<f64>,
    pub arrow_color: Option<String>,
    pub shadow_color: Option<String>,
    pub shadow_enabled: Option<bool>,
    pub border_radius: Option<f64>,
    pub default_font: Option<String>,
    pub default_font_size: Option<f64>,
    pub default_text_color: Option<String>,
    pub default_fill: Option<String>,
    pub default_border: Option<BorderStyle>,
    pub default_alignment: Option<TextAlignment>,
    pub note_x_padding: Option<f64>,
}

/// A theme with every field decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    pub background_color: String,
    pub background_pattern: BackgroundPattern,
    pub pattern_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub line_color: String,
    pub line_width: f64,
    pub arrow_color: String,
    pub shadow_color: String,
    pub shadow_enabled: bool,
    pub border_radius: f64,
    pub default_font: String,
    pub default_font_size: f64,
    pub default_text_color: String,
    pub default_fill: String,
    pub default_border: BorderStyle,
    pub default_alignment: TextAlignment,
    pub note_x_padding: f64,
}

impl Default for ResolvedTheme {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            background_pattern: BackgroundPattern::None,
            pattern_color: "#cccccc".to_string(),
            stroke_color: "#cccccc".to_string(),
            stroke_width: 1.0,
            line_color: "#666666".to_string(),
            line_width: 1.0,
            arrow_color: "#666666".to_string(),
            shadow_color: "#00000033".to_string(),
            shadow_enabled: true,
            border_radius: 8.0,
            default_font: "Helvetica".to_string(),
            default_font_size: 12.0,
            default_text_color: "#000000".to_string(),
            default_fill: "none".to_string(),
            default_border: BorderStyle::None,
            default_alignment: TextAlignment::Center,
            note_x_padding: 8.0,
        }
    }
}

/// Fully decided styling for one note.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNoteStyle {
    pub alignment: TextAlignment,
    pub border: BorderStyle,
    pub border_color: String,
    pub border_weight: f64,
    pub fill: String,
    pub text_color: String,
    pub font_size: f64,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

impl Theme {
    pub fn paper() -> Self {
        Self {
            background_color: Some("#fbf8f1".to_string()),
            background_pattern: Some(BackgroundPattern::Lines),
            pattern_color: Some("#d8e2ef".to_string()),
            stroke_color: Some("#b9ad94".to_string()),
            line_color: Some("#8a7f6a".to_string()),
            arrow_color: Some("#8a7f6a".to_string()),
            default_font: Some("Georgia".to_string()),
            ..Self::default()
        }
    }

    pub fn blueprint() -> Self {
        Self {
            background_color: Some("#1d3c6e".to_string()),
            background_pattern: Some(BackgroundPattern::Grid),
            pattern_color: Some("#2f5694".to_string()),
            stroke_color: Some("#dce8ff".to_string()),
            line_color: Some("#dce8ff".to_string()),
            arrow_color: Some("#dce8ff".to_string()),
            shadow_enabled: Some(false),
            border_radius: Some(2.0),
            default_text_color: Some("#ffffff".to_string()),
            default_border: Some(BorderStyle::Square),
            ..Self::default()
        }
    }

    pub fn dark() -> Self {
        Self {
            background_color: Some("#1e1f22".to_string()),
            background_pattern: Some(BackgroundPattern::Dots),
            pattern_color: Some("#3a3c42".to_string()),
            stroke_color: Some("#5a5d66".to_string()),
            line_color: Some("#9da2ad".to_string()),
            arrow_color: Some("#9da2ad".to_string()),
            shadow_color: Some("#00000080".to_string()),
            default_text_color: Some("#e6e6e6".to_string()),
            default_fill: Some("#2b2d31".to_string()),
            ..Self::default()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" | "scapple" => Some(Self::default()),
            "paper" => Some(Self::paper()),
            "blueprint" => Some(Self::blueprint()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    /// Layers `self` on top of `other`; fields set here win.
    pub fn overlay(&self, other: &Theme) -> Theme {
        Theme {
            background_color: self.background_color.clone().or_else(|| other.background_color.clone()),
            background_pattern: self.background_pattern.or(other.background_pattern),
            pattern_color: self.pattern_color.clone().or_else(|| other.pattern_color.clone()),
            stroke_color: self.stroke_color.clone().or_else(|| other.stroke_color.clone()),
            stroke_width: self.stroke_width.or(other.stroke_width),
            line_color: self.line_color.clone().or_else(|| other.line_color.clone()),
            line_width: self.line_width.or(other.line_width),
            arrow_color: self.arrow_color.clone().or_else(|| other.arrow_color.clone()),
            shadow_color: self.shadow_color.clone().or_else(|| other.shadow_color.clone()),
            shadow_enabled: self.shadow_enabled.or(other.shadow_enabled),
            border_radius: self.border_radius.or(other.border_radius),
            default_font: self.default_font.clone().or_else(|| other.default_font.clone()),
            default_font_size: self.default_font_size.or(other.default_font_size),
            default_text_color: self
                .default_text_color
                .clone()
                .or_else(|| other.default_text_color.clone()),
            default_fill: self.default_fill.clone().or_else(|| other.default_fill.clone()),
            default_border: self.default_border.or(other.default_border),
            default_alignment: self.default_alignment.or(other.default_alignment),
            note_x_padding: self.note_x_padding.or(other.note_x_padding),
        }
    }

    /// Applies this override to a fully resolved base.
    pub fn merge(&self, base: ResolvedTheme) -> ResolvedTheme {
        ResolvedTheme {
            background_color: theme_color(&self.background_color, base.background_color, "background_color"),
            background_pattern: self.background_pattern.unwrap_or(base.background_pattern),
            pattern_color: theme_color(&self.pattern_color, base.pattern_color, "pattern_color"),
            stroke_color: theme_color(&self.stroke_color, base.stroke_color, "stroke_color"),
            stroke_width: self.stroke_width.unwrap_or(base.stroke_width),
            line_color: theme_color(&self.line_color, base.line_color, "line_color"),
            line_width: self.line_width.unwrap_or(base.line_width),
            arrow_color: theme_color(&self.arrow_color, base.arrow_color, "arrow_color"),
            shadow_color: theme_color(&self.shadow_color, base.shadow_color, "shadow_color"),
            shadow_enabled: self.shadow_enabled.unwrap_or(base.shadow_enabled),
            border_radius: self.border_radius.unwrap_or(base.border_radius),
            default_font: self.default_font.clone().unwrap_or(base.default_font),
            default_font_size: self.default_font_size.unwrap_or(base.default_font_size),
            default_text_color: theme_color(
                &self.default_text_color,
                base.default_text_color,
                "default_text_color",
            ),
            default_fill: theme_color(&self.default_fill, base.default_fill, "default_fill"),
            default_border: self.default_border.unwrap_or(base.default_border),
            default_alignment: self.default_alignment.unwrap_or(base.default_alignment),
            note_x_padding: self.note_x_padding.unwrap_or(base.note_x_padding),
        }
    }
}

impl From<&Settings> for Theme {
    fn from(settings: &Settings) -> Self {
        Self {
            background_color: Some(settings.background_color.to_hex()),
            default_text_color: Some(settings.text_color.to_hex()),
            default_font: Some(settings.default_font.clone()),
            note_x_padding: Some(settings.note_x_padding),
            ..Self::default()
        }
    }
}

/// Built-in defaults, then document settings, then the caller's theme.
pub fn resolve_theme(settings: &Settings, theme: Option<&Theme>) -> ResolvedTheme {
    let mut resolved = Theme::from(settings).merge(ResolvedTheme::default());
    if let Some(theme) = theme {
        resolved = theme.merge(resolved);
    }
    resolved
}

impl ResolvedTheme {
    /// Explicit note appearance wins over everything in the theme.
    pub fn note_style(&self, appearance: &Appearance) -> ResolvedNoteStyle {
        ResolvedNoteStyle {
            alignment: appearance.alignment.unwrap_or(self.default_alignment),
            border: appearance.border.unwrap_or(self.default_border),
            border_color: hex_or(appearance.border_color, &self.stroke_color),
            border_weight: appearance.border_weight.unwrap_or(self.stroke_width),
            fill: hex_or(appearance.fill, &self.default_fill),
            text_color: hex_or(appearance.text_color, &self.default_text_color),
            font_size: appearance
                .font_size
                .filter(|size| *size > 0.0)
                .unwrap_or(self.default_font_size),
            font_name: appearance
                .font_name
                .clone()
                .unwrap_or_else(|| self.default_font.clone()),
            is_bold: appearance.is_bold,
            is_italic: appearance.is_italic,
        }
    }
}

/// `none`, `#rrggbb` or `#rrggbbaa`.
pub fn is_theme_color(raw: &str) -> bool {
    if raw.eq_ignore_ascii_case("none") {
        return true;
    }
    let Some(hex) = raw.strip_prefix('#') else {
        return false;
    };
    match hex.len() {
        6 => Color::from_hex(hex).is_some(),
        8 => hex.chars().all(|c| c.is_ascii_hexdigit()),
        _ => false,
    }
}

fn theme_color(value: &Option<String>, base: String, field: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(raw) if raw.eq_ignore_ascii_case("none") => "none".to_string(),
        Some(raw) if is_theme_color(raw) => raw.to_string(),
        Some(raw) => {
            tracing::warn!(field, value = raw, "ignoring invalid theme color");
            base
        }
        None => base,
    }
}

fn hex_or(color: Option<Color>, fallback: &str) -> String {
    color
        .map(|color| color.to_hex())
        .unwrap_or_else(|| fallback.to_string())
}
