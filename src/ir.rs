use crate::color::Color;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTE_WIDTH: f64 = 140.0;
pub const DEFAULT_NOTE_HEIGHT: f64 = 30.0;
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_FONT: &str = "Helvetica";
pub const DEFAULT_NOTE_X_PADDING: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderStyle {
    Rounded,
    Square,
    Cloud,
    None,
}

impl BorderStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "Rounded" => Some(Self::Rounded),
            "Square" => Some(Self::Square),
            "Cloud" => Some(Self::Cloud),
            "None" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rounded => "Rounded",
            Self::Square => "Square",
            Self::Cloud => "Cloud",
            Self::None => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

impl TextAlignment {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "Left" => Some(Self::Left),
            "Center" => Some(Self::Center),
            "Right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
        }
    }
}

/// Per-note styling. `None` means "inherit from the theme cascade".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Appearance {
    pub alignment: Option<TextAlignment>,
    pub border: Option<BorderStyle>,
    pub border_color: Option<Color>,
    pub border_weight: Option<f64>,
    pub fill: Option<Color>,
    pub text_color: Option<Color>,
    pub font_size: Option<f64>,
    pub font_name: Option<String>,
    pub is_bold: bool,
    pub is_italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub appearance: Appearance,
    pub connected_note_ids: Vec<u32>,
    pub points_to_note_ids: Vec<u32>,
}

impl Note {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Decorative rectangle drawn behind notes. Never connectable.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundShape {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub border: BorderStyle,
    pub border_color: Option<Color>,
    pub border_weight: f64,
    pub fill: Option<Color>,
}

impl BackgroundShape {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Named style preset. Carried through unchanged; notes never resolve
/// against it here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteStyle {
    pub name: String,
    pub id: String,
    pub border_thickness: Option<f64>,
    pub border_color: Option<Color>,
    pub fill_color: Option<Color>,
    pub text_color: Option<Color>,
    pub font_size: Option<f64>,
    pub is_bold: Option<bool>,
    pub is_italic: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub background_color: Color,
    pub text_color: Color,
    pub default_font: String,
    pub note_x_padding: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            text_color: Color::BLACK,
            default_font: DEFAULT_FONT.to_string(),
            note_x_padding: DEFAULT_NOTE_X_PADDING,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub notes: Vec<Note>,
    pub background_shapes: Vec<BackgroundShape>,
    pub note_styles: Vec<NoteStyle>,
    pub settings: Settings,
}

impl Document {
    pub fn note(&self, id: u32) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Rectangles of everything that occupies canvas space.
    pub fn content_rects(&self) -> Vec<Rect> {
        self.background_shapes
            .iter()
            .map(BackgroundShape::rect)
            .chain(self.notes.iter().map(Note::rect))
            .collect()
    }
}
