//! Scapple markup decoder.
//!
//! The XML is first parsed into a strict `roxmltree` tree; every field is then
//! pulled out by a small extraction function that returns `Option<T>` and
//! applies its documented fallback at the call site.

use crate::color::Color;
use crate::error::{Entity, Relation, Result, ScappleError};
use crate::id_range::decode_ranges;
use crate::ir::{
    Appearance, BackgroundShape, BorderStyle, DEFAULT_FONT, DEFAULT_NOTE_HEIGHT,
    DEFAULT_NOTE_WIDTH, DEFAULT_NOTE_X_PADDING, Document, Note, NoteStyle, Settings,
    TextAlignment,
};
use roxmltree::Node;
use std::collections::{BTreeMap, BTreeSet};

pub const ROOT_ELEMENT: &str = "ScappleDocument";

const DEFAULT_SHAPE_SIZE: f64 = 100.0;

pub fn parse_scapple(markup: &str) -> Result<Document> {
    let xml = roxmltree::Document::parse(markup).map_err(|err| ScappleError::InvalidXml {
        message: err.to_string(),
    })?;
    let root = xml.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(ScappleError::MissingElement {
            element: ROOT_ELEMENT,
        });
    }

    let notes = match child(root, "Notes") {
        Some(wrapper) => children(wrapper, "Note")
            .map(parse_note)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    validate_notes(&notes)?;

    let background_shapes = match child(root, "BackgroundShapes") {
        Some(wrapper) => children(wrapper, "Shape")
            .map(parse_background_shape)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let note_styles: Vec<NoteStyle> = child(root, "NoteStyles")
        .map(|wrapper| children(wrapper, "Style").map(parse_note_style).collect())
        .unwrap_or_default();

    let settings = parse_settings(root);

    tracing::debug!(
        notes = notes.len(),
        shapes = background_shapes.len(),
        styles = note_styles.len(),
        "decoded scapple document"
    );

    Ok(Document {
        notes,
        background_shapes,
        note_styles,
        settings,
    })
}

fn validate_notes(notes: &[Note]) -> Result<()> {
    check_duplicate_ids(notes)?;
    check_references(notes)
}

pub(crate) fn check_duplicate_ids(notes: &[Note]) -> Result<()> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for note in notes {
        *counts.entry(note.id).or_default() += 1;
    }
    if counts.len() == notes.len() {
        return Ok(());
    }
    let ids = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| *id)
        .collect();
    Err(ScappleError::DuplicateId {
        count: notes.len() - counts.len(),
        ids,
    })
}

/// Every connection and arrow must name a note of the same document.
pub(crate) fn check_references(notes: &[Note]) -> Result<()> {
    let known: BTreeSet<u32> = notes.iter().map(|note| note.id).collect();
    for note in notes {
        let lists = [
            (Relation::Connected, &note.connected_note_ids),
            (Relation::PointsTo, &note.points_to_note_ids),
        ];
        for (relation, ids) in lists {
            if let Some(&missing) = ids.iter().find(|id| !known.contains(*id)) {
                return Err(ScappleError::DanglingReference {
                    note_id: note.id,
                    referenced_id: missing,
                    relation,
                });
            }
        }
    }
    Ok(())
}

fn parse_note(node: Node<'_, '_>) -> Result<Note> {
    // A non-numeric ID falls back to 0 and surfaces later as a duplicate.
    let id = attr_u32(node, "ID").unwrap_or(0);
    let (x, y) = parse_position(node, Entity::Note, id)?;

    let mut appearance = child(node, "Appearance")
        .map(parse_note_appearance)
        .unwrap_or_default();
    if let Some(size) = attr_f64(node, "FontSize") {
        appearance.font_size = Some(size);
    }

    Ok(Note {
        id,
        x,
        y,
        width: attr_f64(node, "Width").unwrap_or(DEFAULT_NOTE_WIDTH),
        height: attr_f64(node, "Height").unwrap_or(DEFAULT_NOTE_HEIGHT),
        text: child_text(node, "String").unwrap_or_default().to_string(),
        appearance,
        connected_note_ids: id_list(node, "ConnectedNoteIDs"),
        points_to_note_ids: id_list(node, "PointsToNoteIDs"),
    })
}

fn parse_note_appearance(node: Node<'_, '_>) -> Appearance {
    let mut appearance = Appearance {
        alignment: child_text(node, "Alignment").and_then(TextAlignment::from_token),
        fill: child_text(node, "Fill").and_then(Color::from_triplet),
        text_color: child_text(node, "TextColor").and_then(Color::from_triplet),
        font_size: child_text(node, "FontSize").and_then(parse_f64),
        font_name: child_text(node, "FontName").map(str::to_string),
        is_bold: child_text(node, "IsBold").is_some_and(is_yes),
        is_italic: child_text(node, "IsItalic").is_some_and(is_yes),
        ..Appearance::default()
    };

    if let Some(border) = child(node, "Border") {
        if has_attributes(border) {
            // Structured borders always draw something; unknown styles read as Rounded.
            appearance.border = Some(
                border
                    .attribute("Style")
                    .and_then(BorderStyle::from_token)
                    .unwrap_or(BorderStyle::Rounded),
            );
            appearance.border_weight = attr_f64(border, "Weight");
            appearance.border_color = border.text().and_then(Color::from_triplet);
        } else {
            appearance.border = border.text().and_then(BorderStyle::from_token);
        }
    }
    appearance
}

fn parse_background_shape(node: Node<'_, '_>) -> Result<BackgroundShape> {
    let id = attr_u32(node, "ID").unwrap_or(0);
    let (x, y) = parse_position(node, Entity::BackgroundShape, id)?;

    let mut shape = BackgroundShape {
        id,
        x,
        y,
        width: attr_f64(node, "Width").unwrap_or(DEFAULT_SHAPE_SIZE),
        height: attr_f64(node, "Height").unwrap_or(DEFAULT_SHAPE_SIZE),
        border: BorderStyle::Rounded,
        border_color: None,
        border_weight: 1.0,
        fill: None,
    };

    if let Some(appearance) = child(node, "Appearance") {
        if let Some(border) = child(appearance, "Border") {
            if has_attributes(border) {
                shape.border = border
                    .attribute("Style")
                    .and_then(BorderStyle::from_token)
                    .unwrap_or(BorderStyle::Rounded);
                shape.border_weight = attr_f64(border, "Weight").unwrap_or(1.0);
            }
            shape.border_color = border.text().and_then(Color::from_triplet);
        }
        shape.fill = child_text(appearance, "Fill").and_then(Color::from_triplet);
    }
    Ok(shape)
}

fn parse_note_style(node: Node<'_, '_>) -> NoteStyle {
    NoteStyle {
        name: node.attribute("Name").unwrap_or_default().to_string(),
        id: node.attribute("ID").unwrap_or_default().to_string(),
        border_thickness: child_text(node, "BorderThickness").and_then(parse_f64),
        border_color: child_text(node, "BorderColor").and_then(Color::from_triplet),
        fill_color: child_text(node, "FillColor").and_then(Color::from_triplet),
        text_color: child_text(node, "TextColor").and_then(Color::from_triplet),
        font_size: child_text(node, "FontSize").and_then(parse_f64),
        is_bold: child_text(node, "IsBold").filter(|v| is_yes(v)).map(|_| true),
        is_italic: child_text(node, "IsItalic").filter(|v| is_yes(v)).map(|_| true),
    }
}

fn parse_settings(root: Node<'_, '_>) -> Settings {
    let ui = child(root, "UISettings");
    let ui_text = |name: &str| ui.and_then(|ui| child_text(ui, name));

    Settings {
        background_color: child_text(root, "BackgroundColor")
            .or_else(|| ui_text("BackgroundColor"))
            .and_then(Color::from_triplet)
            .unwrap_or(Color::WHITE),
        text_color: child_text(root, "DefaultTextColor")
            .and_then(Color::from_triplet)
            .unwrap_or(Color::BLACK),
        default_font: ui_text("DefaultFont")
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_FONT.to_string()),
        note_x_padding: ui_text("NoteXPadding")
            .and_then(parse_f64)
            .unwrap_or(DEFAULT_NOTE_X_PADDING),
    }
}

/// `Position="x,y"`; a missing attribute reads as the origin.
fn parse_position(node: Node<'_, '_>, entity: Entity, id: u32) -> Result<(f64, f64)> {
    let raw = node.attribute("Position").unwrap_or("0,0");
    let parsed: Option<Vec<f64>> = raw.split(',').map(parse_f64).collect();
    match parsed.as_deref() {
        Some([x, y, ..]) => Ok((*x, *y)),
        _ => Err(ScappleError::InvalidPosition {
            entity,
            id,
            raw: raw.to_string(),
        }),
    }
}

fn id_list(node: Node<'_, '_>, name: &str) -> Vec<u32> {
    child_text(node, name).map(decode_ranges).unwrap_or_default()
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

/// Text of a named child element; an empty element yields `""`.
fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).map(|element| element.text().unwrap_or_default())
}

fn has_attributes(node: Node<'_, '_>) -> bool {
    node.attributes().next().is_some()
}

fn attr_f64(node: Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name).and_then(parse_f64)
}

fn attr_u32(node: Node<'_, '_>, name: &str) -> Option<u32> {
    node.attribute(name).and_then(|raw| raw.trim().parse().ok())
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn is_yes(raw: &str) -> bool {
    raw.trim() == "Yes"
}
