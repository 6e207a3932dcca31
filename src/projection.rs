//! JSON read model of a decoded document.
//!
//! Colors are projected as `#rrggbb` and every note appearance is fully
//! resolved against the document settings, so consumers never see the
//! distinction between inherited and explicit values.

use crate::ir::{BackgroundShape, BorderStyle, Document, Note, TextAlignment};
use crate::theme::{ResolvedTheme, resolve_theme};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub note_count: usize,
    pub background_color: String,
    pub default_text_color: String,
    pub default_font: String,
    pub note_padding: f64,
    pub notes: Vec<NoteSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub background_shapes: Vec<ShapeSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note_styles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub appearance: AppearanceSummary,
    #[serde(rename = "connectedNoteIDs", skip_serializing_if = "Vec::is_empty")]
    pub connected_note_ids: Vec<u32>,
    #[serde(rename = "pointsToNoteIDs", skip_serializing_if = "Vec::is_empty")]
    pub points_to_note_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSummary {
    pub alignment: TextAlignment,
    pub border: BorderStyle,
    /// `None` for a transparent note.
    pub fill: Option<String>,
    pub text_color: String,
    pub font_size: f64,
    pub font_name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_italic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSummary {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub border: BorderStyle,
    pub border_color: Option<String>,
    pub fill: Option<String>,
}

pub fn summarize(doc: &Document, file_path: Option<&str>) -> DocumentSummary {
    let theme = resolve_theme(&doc.settings, None);
    DocumentSummary {
        file_path: file_path.map(str::to_string),
        note_count: doc.notes.len(),
        background_color: doc.settings.background_color.to_hex(),
        default_text_color: doc.settings.text_color.to_hex(),
        default_font: doc.settings.default_font.clone(),
        note_padding: doc.settings.note_x_padding,
        notes: doc.notes.iter().map(|note| note_summary(note, &theme)).collect(),
        background_shapes: doc.background_shapes.iter().map(shape_summary).collect(),
        note_styles: doc.note_styles.iter().map(|style| style.name.clone()).collect(),
    }
}

fn note_summary(note: &Note, theme: &ResolvedTheme) -> NoteSummary {
    let style = theme.note_style(&note.appearance);
    NoteSummary {
        id: note.id,
        x: note.x,
        y: note.y,
        width: note.width,
        height: note.height,
        text: note.text.clone(),
        appearance: AppearanceSummary {
            alignment: style.alignment,
            border: style.border,
            fill: note.appearance.fill.map(|fill| fill.to_hex()),
            text_color: style.text_color,
            font_size: style.font_size,
            font_name: style.font_name,
            is_bold: style.is_bold,
            is_italic: style.is_italic,
        },
        connected_note_ids: note.connected_note_ids.clone(),
        points_to_note_ids: note.points_to_note_ids.clone(),
    }
}

fn shape_summary(shape: &BackgroundShape) -> ShapeSummary {
    ShapeSummary {
        id: shape.id,
        x: shape.x,
        y: shape.y,
        width: shape.width,
        height: shape.height,
        border: shape.border,
        border_color: shape.border_color.map(|color| color.to_hex()),
        fill: shape.fill.map(|fill| fill.to_hex()),
    }
}
