//! Document construction from caller input, and Scapple markup encoding.

use crate::color::Color;
use crate::connections::ensure_bidirectional;
use crate::error::Result;
use crate::id_range::encode_ranges;
use crate::ir::{
    Appearance, BackgroundShape, BorderStyle, DEFAULT_FONT, DEFAULT_FONT_SIZE,
    DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH, Document, Note, NoteStyle, Settings, TextAlignment,
};
use crate::markup::XmlWriter;
use crate::parser::{ROOT_ELEMENT, check_references};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const FORMAT_VERSION: &str = "1.2";

/// One note as a caller describes it. Only position and text are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderStyle>,
    /// `#rrggbb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(
        default,
        rename = "connectedNoteIDs",
        alias = "connectedNoteIds",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub connected_note_ids: Vec<u32>,
    #[serde(
        default,
        rename = "pointsToNoteIDs",
        alias = "pointsToNoteIds",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub points_to_note_ids: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub notes: Vec<NoteInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Materializes caller input into a document with symmetric connections.
///
/// Notes without an explicit id take their index. Explicit ids are trusted,
/// so mixing both styles can collide; that is left to the caller.
pub fn build_document(input: &DocumentInput) -> Result<Document> {
    let notes = input
        .notes
        .iter()
        .zip(0u32..)
        .map(|(note, index)| build_note(note, index))
        .collect::<Result<Vec<_>>>()?;
    check_references(&notes)?;

    let background_color = match input.background_color.as_deref() {
        Some(hex) => Color::parse_hex(hex)?,
        None => Color::WHITE,
    };

    Ok(Document {
        notes: ensure_bidirectional(&notes),
        settings: Settings {
            background_color,
            ..Settings::default()
        },
        ..Document::default()
    })
}

fn build_note(input: &NoteInput, index: u32) -> Result<Note> {
    let fill = input.fill.as_deref().map(Color::parse_hex).transpose()?;
    let text_color = match input.text_color.as_deref() {
        Some(hex) => Color::parse_hex(hex)?,
        None => Color::BLACK,
    };

    Ok(Note {
        id: input.id.unwrap_or(index),
        x: input.x,
        y: input.y,
        width: input.width.unwrap_or(DEFAULT_NOTE_WIDTH),
        height: input.height.unwrap_or(DEFAULT_NOTE_HEIGHT),
        text: input.text.clone(),
        appearance: Appearance {
            alignment: Some(input.alignment.unwrap_or(TextAlignment::Center)),
            border: Some(input.border.unwrap_or(BorderStyle::Rounded)),
            fill,
            text_color: Some(text_color),
            font_size: Some(input.font_size.unwrap_or(DEFAULT_FONT_SIZE)),
            font_name: Some(
                input
                    .font_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FONT.to_string()),
            ),
            ..Appearance::default()
        },
        connected_note_ids: input.connected_note_ids.clone(),
        points_to_note_ids: input.points_to_note_ids.clone(),
    })
}

/// Serializes with a freshly generated document identifier.
pub fn encode_scapple(doc: &Document) -> String {
    let id = Uuid::new_v4().to_string().to_uppercase();
    encode_scapple_with_id(doc, &id)
}

pub fn encode_scapple_with_id(doc: &Document, document_id: &str) -> String {
    let mut xml = XmlWriter::new();
    xml.declaration();
    xml.open(
        ROOT_ELEMENT,
        &[
            ("Version", FORMAT_VERSION.to_string()),
            ("ID", document_id.to_string()),
        ],
    );

    xml.open("Notes", &[]);
    for note in &doc.notes {
        write_note(&mut xml, note);
    }
    xml.close("Notes");

    if !doc.background_shapes.is_empty() {
        xml.open("BackgroundShapes", &[]);
        for shape in &doc.background_shapes {
            write_background_shape(&mut xml, shape);
        }
        xml.close("BackgroundShapes");
    }

    if !doc.note_styles.is_empty() {
        xml.open("NoteStyles", &[]);
        for style in &doc.note_styles {
            write_note_style(&mut xml, style);
        }
        xml.close("NoteStyles");
    }

    let settings = &doc.settings;
    xml.leaf("BackgroundColor", &[], &settings.background_color.to_triplet());
    xml.leaf("DefaultTextColor", &[], &settings.text_color.to_triplet());
    xml.open("UISettings", &[]);
    xml.leaf("BackgroundColor", &[], &settings.background_color.to_triplet());
    xml.leaf("DefaultFont", &[], &settings.default_font);
    xml.leaf("NoteXPadding", &[], &settings.note_x_padding.to_string());
    xml.close("UISettings");
    xml.leaf("AutoFit", &[], "0,1");
    xml.leaf("NotesTextEncoding", &[], "94");
    xml.leaf("Printable", &[], "YES");

    xml.close(ROOT_ELEMENT);

    tracing::debug!(
        notes = doc.notes.len(),
        shapes = doc.background_shapes.len(),
        document_id,
        "encoded scapple document"
    );
    xml.finish()
}

fn write_note(xml: &mut XmlWriter, note: &Note) {
    let mut attrs = vec![("ID", note.id.to_string())];
    if let Some(size) = note.appearance.font_size {
        attrs.push(("FontSize", size.to_string()));
    }
    attrs.push(("Position", format!("{},{}", note.x, note.y)));
    attrs.push(("Width", note.width.to_string()));
    if note.height != DEFAULT_NOTE_HEIGHT {
        attrs.push(("Height", note.height.to_string()));
    }
    xml.open("Note", &attrs);

    write_appearance(xml, &note.appearance);
    xml.leaf("String", &[], &note.text);
    if !note.connected_note_ids.is_empty() {
        xml.leaf("ConnectedNoteIDs", &[], &encode_ranges(&note.connected_note_ids));
    }
    if !note.points_to_note_ids.is_empty() {
        xml.leaf("PointsToNoteIDs", &[], &encode_ranges(&note.points_to_note_ids));
    }

    xml.close("Note");
}

fn write_appearance(xml: &mut XmlWriter, appearance: &Appearance) {
    let has_content = appearance.alignment.is_some()
        || appearance.border.is_some()
        || appearance.fill.is_some()
        || appearance.text_color.is_some()
        || appearance.font_name.is_some()
        || appearance.is_bold
        || appearance.is_italic;
    if !has_content {
        return;
    }

    xml.open("Appearance", &[]);
    if let Some(alignment) = appearance.alignment {
        xml.leaf("Alignment", &[], alignment.as_str());
    }
    if let Some(border) = appearance.border {
        write_border(xml, border, appearance.border_weight, appearance.border_color);
    }
    if let Some(fill) = appearance.fill {
        xml.leaf("Fill", &[], &fill.to_triplet());
    }
    if let Some(color) = appearance.text_color {
        xml.leaf("TextColor", &[], &color.to_triplet());
    }
    if let Some(font) = &appearance.font_name {
        xml.leaf("FontName", &[], font);
    }
    if appearance.is_bold {
        xml.leaf("IsBold", &[], "Yes");
    }
    if appearance.is_italic {
        xml.leaf("IsItalic", &[], "Yes");
    }
    xml.close("Appearance");
}

/// Always the attributed form, so the style survives a round trip.
fn write_border(xml: &mut XmlWriter, style: BorderStyle, weight: Option<f64>, color: Option<Color>) {
    let mut attrs = Vec::new();
    if let Some(weight) = weight {
        attrs.push(("Weight", weight.to_string()));
    }
    attrs.push(("Style", style.as_str().to_string()));
    let text = color.map(|color| color.to_triplet()).unwrap_or_default();
    xml.leaf("Border", &attrs, &text);
}

fn write_background_shape(xml: &mut XmlWriter, shape: &BackgroundShape) {
    xml.open(
        "Shape",
        &[
            ("ID", shape.id.to_string()),
            ("Position", format!("{},{}", shape.x, shape.y)),
            ("Width", shape.width.to_string()),
            ("Height", shape.height.to_string()),
        ],
    );
    xml.open("Appearance", &[]);
    write_border(xml, shape.border, Some(shape.border_weight), shape.border_color);
    if let Some(fill) = shape.fill {
        xml.leaf("Fill", &[], &fill.to_triplet());
    }
    xml.close("Appearance");
    xml.close("Shape");
}

fn write_note_style(xml: &mut XmlWriter, style: &NoteStyle) {
    xml.open(
        "Style",
        &[("Name", style.name.clone()), ("ID", style.id.clone())],
    );
    if let Some(thickness) = style.border_thickness {
        xml.leaf("BorderThickness", &[], &thickness.to_string());
    }
    if let Some(color) = style.border_color {
        xml.leaf("BorderColor", &[], &color.to_triplet());
    }
    if let Some(color) = style.fill_color {
        xml.leaf("FillColor", &[], &color.to_triplet());
    }
    if let Some(color) = style.text_color {
        xml.leaf("TextColor", &[], &color.to_triplet());
    }
    if let Some(size) = style.font_size {
        xml.leaf("FontSize", &[], &size.to_string());
    }
    if style.is_bold == Some(true) {
        xml.leaf("IsBold", &[], "Yes");
    }
    if style.is_italic == Some(true) {
        xml.leaf("IsItalic", &[], "Yes");
    }
    xml.close("Style");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::parse_scapple;

    fn input(json: &str) -> DocumentInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn assigns_sequential_ids_and_defaults() {
        let doc = build_document(&input(
            r#"{"notes":[{"x":0,"y":0,"text":"a"},{"x":10,"y":10,"text":"b","id":7}]}"#,
        ))
        .unwrap();
        assert_eq!(doc.notes[0].id, 0);
        assert_eq!(doc.notes[1].id, 7);
        let note = &doc.notes[0];
        assert_eq!((note.width, note.height), (140.0, 30.0));
        assert_eq!(note.appearance.alignment, Some(TextAlignment::Center));
        assert_eq!(note.appearance.border, Some(BorderStyle::Rounded));
        assert_eq!(note.appearance.font_size, Some(12.0));
        assert_eq!(note.appearance.text_color, Some(Color::BLACK));
        assert_eq!(doc.settings.background_color, Color::WHITE);
    }

    #[test]
    fn connections_become_bidirectional() {
        let doc = build_document(&input(
            r#"{"notes":[{"x":0,"y":0,"text":"a"},{"x":10,"y":10,"text":"b","connectedNoteIDs":[0]}]}"#,
        ))
        .unwrap();
        assert_eq!(doc.notes[0].connected_note_ids, vec![1]);
        assert_eq!(doc.notes[1].connected_note_ids, vec![0]);
    }

    #[test]
    fn round_trip_keeps_connections_symmetric() {
        let doc = build_document(&input(
            r#"{"notes":[{"x":0,"y":0,"text":"a"},{"x":10,"y":10,"text":"b","connectedNoteIDs":[0]}]}"#,
        ))
        .unwrap();
        let decoded = parse_scapple(&encode_scapple(&doc)).unwrap();
        assert_eq!(decoded.notes.len(), 2);
        assert_eq!(decoded.notes[1].connected_note_ids, vec![0]);
        assert_eq!(decoded.notes[0].connected_note_ids, vec![1]);
    }

    #[test]
    fn rejects_bad_colors_and_dangling_ids() {
        let err = build_document(&input(r#"{"notes":[{"x":0,"y":0,"text":"a","fill":"yellow"}]}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationInvalidColor);

        let err = build_document(&input(
            r#"{"notes":[{"x":0,"y":0,"text":"a","pointsToNoteIDs":[4]}]}"#,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationInvalidId);
    }

    #[test]
    fn explicit_id_collisions_are_not_validated() {
        let doc = build_document(&input(
            r#"{"notes":[{"x":0,"y":0,"text":"a"},{"x":0,"y":0,"text":"b","id":0}]}"#,
        ))
        .unwrap();
        assert_eq!(doc.notes[0].id, doc.notes[1].id);
    }

    #[test]
    fn omits_empty_connection_lists() {
        let doc = build_document(&input(r#"{"notes":[{"x":0,"y":0,"text":"solo"}]}"#)).unwrap();
        let xml = encode_scapple_with_id(&doc, "FIXED");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<ScappleDocument Version=\"1.2\" ID=\"FIXED\">"));
        assert!(!xml.contains("ConnectedNoteIDs"));
        assert!(!xml.contains("PointsToNoteIDs"));
        assert!(xml.contains("<String>solo</String>"));
    }

    #[test]
    fn generated_ids_are_unique_uppercase_uuids() {
        let doc = Document::default();
        let a = encode_scapple(&doc);
        let b = encode_scapple(&doc);
        assert_ne!(a, b);
        let id = a.split("ID=\"").nth(1).unwrap().split('"').next().unwrap();
        assert_eq!(id.len(), 36);
        assert_eq!(id, id.to_uppercase());
    }

    #[test]
    fn decoded_documents_round_trip_losslessly() {
        let markup = r#"<ScappleDocument Version="1.2" ID="A">
            <Notes>
                <Note ID="2" FontSize="13.5" Position="-4.25,8" Width="200" Height="48">
                    <Appearance>
                        <Alignment>Right</Alignment>
                        <Border Weight="2" Style="Square">1 0 0</Border>
                        <Fill>0.2 0.4 0.6</Fill>
                        <IsItalic>Yes</IsItalic>
                    </Appearance>
                    <String>Line one
Line &lt;two&gt;</String>
                    <ConnectedNoteIDs>5</ConnectedNoteIDs>
                    <PointsToNoteIDs>5</PointsToNoteIDs>
                </Note>
                <Note ID="5" Position="100,100">
                    <String></String>
                    <ConnectedNoteIDs>2</ConnectedNoteIDs>
                </Note>
            </Notes>
            <BackgroundShapes>
                <Shape ID="0" Position="-50,-50" Width="400" Height="300">
                    <Appearance><Border Weight="1" Style="Cloud">0 0 1</Border><Fill>1 1 0.8</Fill></Appearance>
                </Shape>
            </BackgroundShapes>
            <NoteStyles>
                <Style Name="Warning" ID="W"><TextColor>1 0 0</TextColor><IsBold>Yes</IsBold></Style>
            </NoteStyles>
            <BackgroundColor>0.9 0.9 0.9</BackgroundColor>
            <UISettings><DefaultFont>Menlo</DefaultFont><NoteXPadding>6</NoteXPadding></UISettings>
        </ScappleDocument>"#;
        let decoded = parse_scapple(markup).unwrap();
        let again = parse_scapple(&encode_scapple(&decoded)).unwrap();
        assert_eq!(again, decoded);
    }

    #[test]
    fn self_arrows_are_dropped() {
        let doc = build_document(&input(
            r#"{"notes":[{"x":0,"y":0,"text":"a","pointsToNoteIDs":[0]}]}"#,
        ))
        .unwrap();
        let note = doc.note(0).unwrap();
        assert!(note.connected_note_ids.is_empty());
        assert!(note.points_to_note_ids.is_empty());
    }

    #[test]
    fn positions_keep_full_precision() {
        let markup = r#"<ScappleDocument Version="1.2" ID="A"><Notes>
            <Note ID="0" Position="1234.5678,98765.4321" Width="140.125"><String>x</String></Note>
        </Notes></ScappleDocument>"#;
        let decoded = parse_scapple(markup).unwrap();
        let xml = encode_scapple_with_id(&decoded, "A");
        assert!(xml.contains("Position=\"1234.5678,98765.4321\""));
        assert!(xml.contains("Width=\"140.125\""));
        assert_eq!(parse_scapple(&xml).unwrap(), decoded);
    }
}
