//! Indented outline text to a left-to-right tree of notes.

use crate::builder::NoteInput;
use crate::ir::{BorderStyle, DEFAULT_FONT_SIZE, DEFAULT_NOTE_HEIGHT};
use crate::text_metrics::measure_text_width;
use once_cell::sync::Lazy;
use regex::Regex;

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*•]\s*").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\s*").unwrap());

/// Horizontal distance between consecutive depths.
const COLUMN_STEP: f64 = 220.0;
/// Vertical distance between consecutive leaves.
const LEAF_STEP: f64 = 80.0;
const ROOT_GAP: f64 = 20.0;
const MIN_NOTE_WIDTH: f64 = 80.0;
const NOTE_TEXT_MARGIN: f64 = 24.0;

/// Fill colors by depth, cycling.
pub const DEPTH_PALETTE: [&str; 8] = [
    "#ffeb3b", "#4fc3f7", "#81c784", "#ff8a65", "#ce93d8", "#f48fb1", "#80cbc4", "#fff176",
];

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub text: String,
    pub depth: usize,
    pub children: Vec<OutlineNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: u32,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Builds the outline forest. Indent is the raw count of leading whitespace
/// characters, so tabs and spaces weigh the same.
pub fn parse_outline(text: &str) -> Vec<OutlineNode> {
    let mut roots = Vec::new();
    // Open ancestors with their indent; a node joins its parent once closed.
    let mut stack: Vec<(usize, OutlineNode)> = Vec::new();

    for line in text.lines() {
        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        let stripped = BULLET_RE.replace(line, "");
        let stripped = NUMBER_RE.replace(&stripped, "");
        let content = stripped.trim();
        if content.is_empty() {
            continue;
        }

        while stack.last().is_some_and(|(open, _)| *open >= indent) {
            close_top(&mut stack, &mut roots);
        }
        let node = OutlineNode {
            text: content.to_string(),
            depth: stack.len(),
            children: Vec::new(),
        };
        stack.push((indent, node));
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

fn close_top(stack: &mut Vec<(usize, OutlineNode)>, roots: &mut Vec<OutlineNode>) {
    let Some((_, node)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Places the forest in two passes: pre-order for ids, columns and leaf
/// slots, then children-before-parents to center each internal node on its
/// first and last child.
pub fn layout_outline(roots: &[OutlineNode], font_size: f64) -> Vec<PlacedNode> {
    let mut placed = Vec::new();
    let mut cursor = 0.0;
    for root in roots {
        place_pre_order(root, 0, None, font_size, &mut cursor, &mut placed);
        cursor += ROOT_GAP;
    }

    // Pre-order puts every child after its parent.
    for index in (0..placed.len()).rev() {
        let node = &placed[index];
        if let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) {
            let y = (placed[first].y + placed[last].y) / 2.0;
            placed[index].y = y;
        }
    }

    placed
}

fn place_pre_order(
    node: &OutlineNode,
    depth: usize,
    parent: Option<usize>,
    font_size: f64,
    cursor: &mut f64,
    placed: &mut Vec<PlacedNode>,
) {
    let index = placed.len();
    let width = (measure_text_width(&node.text, font_size) + NOTE_TEXT_MARGIN)
        .ceil()
        .max(MIN_NOTE_WIDTH);
    let y = if node.children.is_empty() {
        let slot = *cursor;
        *cursor += LEAF_STEP;
        slot
    } else {
        0.0
    };
    placed.push(PlacedNode {
        id: index as u32,
        text: node.text.clone(),
        x: depth as f64 * COLUMN_STEP,
        y,
        width,
        height: DEFAULT_NOTE_HEIGHT,
        depth,
        parent,
        children: Vec::new(),
    });
    if let Some(parent) = parent {
        placed[parent].children.push(index);
    }

    for child in &node.children {
        place_pre_order(child, depth + 1, Some(index), font_size, cursor, placed);
    }
}

/// Outline text as builder input: roots get cloud borders, every edge is
/// connected both ways and points from parent to child.
pub fn outline_to_notes(text: &str) -> Vec<NoteInput> {
    let roots = parse_outline(text);
    let font_size = DEFAULT_FONT_SIZE;
    let placed = layout_outline(&roots, font_size);

    placed
        .iter()
        .map(|node| {
            let children: Vec<u32> = node.children.iter().map(|&c| placed[c].id).collect();
            let connected = node
                .parent
                .map(|p| placed[p].id)
                .into_iter()
                .chain(children.iter().copied())
                .collect();
            NoteInput {
                id: Some(node.id),
                x: node.x,
                y: node.y,
                width: Some(node.width),
                height: Some(node.height),
                text: node.text.clone(),
                border: Some(if node.depth == 0 {
                    BorderStyle::Cloud
                } else {
                    BorderStyle::Rounded
                }),
                fill: Some(DEPTH_PALETTE[node.depth % DEPTH_PALETTE.len()].to_string()),
                font_size: Some(font_size),
                connected_note_ids: connected,
                points_to_note_ids: children,
                ..NoteInput::default()
            }
        })
        .collect()
}
