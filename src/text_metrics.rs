use unicode_width::UnicodeWidthChar;

// Heuristic advance widths as a fraction of the font size. Rendering never
// has real font metrics available, so layout relies on these estimates.
const AVG_CHAR_WIDTH_RATIO: f64 = 0.6;
const WIDE_CHAR_WIDTH_RATIO: f64 = 1.0;
const LINE_HEIGHT_RATIO: f64 = 1.3;

pub fn char_width_factor(ch: char) -> f64 {
    match ch.width() {
        Some(0) => 0.0,
        Some(2) => WIDE_CHAR_WIDTH_RATIO,
        _ => AVG_CHAR_WIDTH_RATIO,
    }
}

pub fn measure_text_width(text: &str, font_size: f64) -> f64 {
    if font_size <= 0.0 {
        return 0.0;
    }
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| char_width_factor(ch) * font_size)
        .sum()
}

pub fn line_height(font_size: f64) -> f64 {
    font_size * LINE_HEIGHT_RATIO
}

/// Greedy word wrap. Explicit newlines always break; blank paragraphs keep
/// their empty line; a single over-long word stays whole on its own line.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            lines.push(String::new());
            continue;
        };
        let mut current = first.to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            if measure_text_width(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
