use crate::ir::Note;
use std::collections::{BTreeMap, BTreeSet};

/// Symmetric note adjacency, keyed by note id.
pub type Adjacency = BTreeMap<u32, BTreeSet<u32>>;

/// One drawable connector between two notes, keyed by `(low, high)` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub low: u32,
    pub high: u32,
    /// `low` points at `high`.
    pub arrow_to_high: bool,
    /// `high` points at `low`.
    pub arrow_to_low: bool,
}

/// Union of every declared connection and arrow, closed under reversal.
pub fn resolve_adjacency(notes: &[Note]) -> Adjacency {
    let mut adjacency: Adjacency = notes.iter().map(|note| (note.id, BTreeSet::new())).collect();
    for note in notes {
        for &other in note.connected_note_ids.iter().chain(&note.points_to_note_ids) {
            if other == note.id {
                continue;
            }
            adjacency.entry(note.id).or_default().insert(other);
            adjacency.entry(other).or_default().insert(note.id);
        }
    }
    adjacency
}

/// New notes whose connection lists are symmetric. Arrows stay with the
/// note that declared them. Self-references are dropped from both lists.
pub fn ensure_bidirectional(notes: &[Note]) -> Vec<Note> {
    let adjacency = resolve_adjacency(notes);
    notes
        .iter()
        .map(|note| {
            let connected = adjacency
                .get(&note.id)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            let mut points_to = note.points_to_note_ids.clone();
            points_to.retain(|&id| id != note.id);
            dedup_in_order(&mut points_to);
            Note {
                connected_note_ids: connected,
                points_to_note_ids: points_to,
                ..note.clone()
            }
        })
        .collect()
}

/// Every undirected pair exactly once, in ascending `(low, high)` order.
pub fn connector_pairs(notes: &[Note]) -> Vec<Connector> {
    let arrows: BTreeSet<(u32, u32)> = notes
        .iter()
        .flat_map(|note| note.points_to_note_ids.iter().map(move |&to| (note.id, to)))
        .collect();

    resolve_adjacency(notes)
        .iter()
        .flat_map(|(&id, others)| {
            others
                .iter()
                .filter(move |&&other| other > id)
                .map(move |&other| (id, other))
        })
        .map(|(low, high)| Connector {
            low,
            high,
            arrow_to_high: arrows.contains(&(low, high)),
            arrow_to_low: arrows.contains(&(high, low)),
        })
        .collect()
}

fn dedup_in_order(ids: &mut Vec<u32>) {
    let mut seen = BTreeSet::new();
    ids.retain(|id| seen.insert(*id));
}
