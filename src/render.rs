use crate::connections::{Connector, connector_pairs};
use crate::error::{Result, ScappleError};
use crate::geometry::{bounding_box, cloud_outline, fmt_num, ray_rect_intersection};
use crate::ir::{BackgroundShape, BorderStyle, Document, Note, TextAlignment};
use crate::markup::escape_xml;
use crate::text_metrics::{line_height, wrap_text};
use crate::theme::{BackgroundPattern, PATTERN_CELL, ResolvedNoteStyle, ResolvedTheme, Theme, resolve_theme};
use std::path::Path;

pub const DEFAULT_PADDING: f64 = 40.0;

const SHADOW_ID: &str = "shadow";
const PATTERN_ID: &str = "bg-pattern";
const ARROW_ID: &str = "arrowhead";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Margin around the content on every side.
    pub padding: f64,
    pub theme: Option<Theme>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            theme: None,
        }
    }
}

impl RenderOptions {
    /// Padding actually applied: non-finite values fall back to the default
    /// and negative values to zero.
    pub fn effective_padding(&self) -> f64 {
        if !self.padding.is_finite() {
            DEFAULT_PADDING
        } else {
            self.padding.max(0.0)
        }
    }
}

pub fn render_svg(doc: &Document, options: &RenderOptions) -> String {
    let theme = resolve_theme(&doc.settings, options.theme.as_ref());
    let bbox = bounding_box(&doc.content_rects(), options.effective_padding());
    let (x, y, w, h) = (
        fmt_num(bbox.x),
        fmt_num(bbox.y),
        fmt_num(bbox.width),
        fmt_num(bbox.height),
    );

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{x} {y} {w} {h}\" width=\"{w}\" height=\"{h}\">\n"
    ));
    svg.push_str(&defs_svg(&theme));
    svg.push_str(&format!(
        "  <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>\n",
        escape_xml(&theme.background_color)
    ));
    if theme.background_pattern != BackgroundPattern::None {
        svg.push_str(&format!(
            "  <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"url(#{PATTERN_ID})\"/>\n"
        ));
    }

    for shape in &doc.background_shapes {
        svg.push_str(&background_shape_svg(shape, &theme));
    }

    for connector in connector_pairs(&doc.notes) {
        svg.push_str(&connector_svg(doc, &connector, &theme));
    }

    for note in &doc.notes {
        let style = theme.note_style(&note.appearance);
        svg.push_str(&note_outline_svg(note, &style, &theme));
        svg.push_str(&note_text_svg(note, &style, theme.note_x_padding));
    }

    svg.push_str("</svg>\n");

    tracing::debug!(
        notes = doc.notes.len(),
        shapes = doc.background_shapes.len(),
        width = bbox.width,
        height = bbox.height,
        "rendered svg"
    );
    svg
}

fn defs_svg(theme: &ResolvedTheme) -> String {
    let mut defs = String::from("  <defs>\n");
    if theme.shadow_enabled {
        defs.push_str(&format!(
            "    <filter id=\"{SHADOW_ID}\" x=\"-10%\" y=\"-10%\" width=\"130%\" height=\"130%\"><feDropShadow dx=\"1\" dy=\"1\" stdDeviation=\"2\" flood-color=\"{}\"/></filter>\n",
            escape_xml(&theme.shadow_color)
        ));
    }
    if let Some(tile) = pattern_tile(theme.background_pattern, &escape_xml(&theme.pattern_color)) {
        let cell = fmt_num(PATTERN_CELL);
        defs.push_str(&format!(
            "    <pattern id=\"{PATTERN_ID}\" width=\"{cell}\" height=\"{cell}\" patternUnits=\"userSpaceOnUse\">{tile}</pattern>\n"
        ));
    }
    defs.push_str(&format!(
        "    <marker id=\"{ARROW_ID}\" viewBox=\"0 0 10 7\" markerWidth=\"10\" markerHeight=\"7\" refX=\"9\" refY=\"3.5\" orient=\"auto-start-reverse\"><polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{}\"/></marker>\n",
        escape_xml(&theme.arrow_color)
    ));
    defs.push_str("  </defs>\n");
    defs
}

/// Content of one pattern cell, or `None` when no pattern is drawn.
fn pattern_tile(pattern: BackgroundPattern, color: &str) -> Option<String> {
    let cell = PATTERN_CELL;
    let mid = fmt_num(cell / 2.0);
    let edge = fmt_num(cell - 0.5);
    let cell = fmt_num(cell);
    match pattern {
        BackgroundPattern::None => None,
        BackgroundPattern::Dots => Some(format!(
            "<circle cx=\"{mid}\" cy=\"{mid}\" r=\"1\" fill=\"{color}\"/>"
        )),
        BackgroundPattern::Grid => Some(format!(
            "<path d=\"M {cell} 0 L 0 0 0 {cell}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1\"/>"
        )),
        BackgroundPattern::Lines => Some(format!(
            "<path d=\"M 0 {edge} L {cell} {edge}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1\"/>"
        )),
    }
}

fn background_shape_svg(shape: &BackgroundShape, theme: &ResolvedTheme) -> String {
    let fill = shape
        .fill
        .map(|fill| fill.to_hex())
        .unwrap_or_else(|| "none".to_string());
    let stroke = shape
        .border_color
        .map(|color| color.to_hex())
        .unwrap_or_else(|| theme.stroke_color.clone());
    outline_svg(
        shape.border,
        (shape.x, shape.y, shape.width, shape.height),
        &fill,
        &stroke,
        shape.border_weight,
        theme.border_radius,
        false,
    )
}

fn note_outline_svg(note: &Note, style: &ResolvedNoteStyle, theme: &ResolvedTheme) -> String {
    outline_svg(
        style.border,
        (note.x, note.y, note.width, note.height),
        &style.fill,
        &style.border_color,
        style.border_weight,
        theme.border_radius,
        theme.shadow_enabled,
    )
}

fn outline_svg(
    border: BorderStyle,
    (x, y, w, h): (f64, f64, f64, f64),
    fill: &str,
    stroke: &str,
    stroke_width: f64,
    radius: f64,
    shadow: bool,
) -> String {
    let fill = escape_xml(fill);
    let stroke = escape_xml(stroke);
    let stroke_width = fmt_num(stroke_width);
    let filter = if shadow {
        format!(" filter=\"url(#{SHADOW_ID})\"")
    } else {
        String::new()
    };
    let (xs, ys, ws, hs) = (fmt_num(x), fmt_num(y), fmt_num(w), fmt_num(h));

    match border {
        BorderStyle::Rounded | BorderStyle::Square => {
            let r = if border == BorderStyle::Rounded {
                fmt_num(radius)
            } else {
                "0".to_string()
            };
            format!(
                "  <rect x=\"{xs}\" y=\"{ys}\" width=\"{ws}\" height=\"{hs}\" rx=\"{r}\" ry=\"{r}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"{filter}/>\n"
            )
        }
        BorderStyle::Cloud => format!(
            "  <path d=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"{filter}/>\n",
            cloud_outline(x, y, w, h)
        ),
        // Borderless: only a fill, if any, and no shadow.
        BorderStyle::None if fill != "none" => format!(
            "  <rect x=\"{xs}\" y=\"{ys}\" width=\"{ws}\" height=\"{hs}\" fill=\"{fill}\" stroke=\"none\"/>\n"
        ),
        BorderStyle::None => String::new(),
    }
}

fn connector_svg(doc: &Document, connector: &Connector, theme: &ResolvedTheme) -> String {
    let (Some(low), Some(high)) = (doc.note(connector.low), doc.note(connector.high)) else {
        tracing::warn!(
            low = connector.low,
            high = connector.high,
            "skipping connector with a missing endpoint"
        );
        return String::new();
    };
    let (low_rect, high_rect) = (low.rect(), high.rect());
    let start = ray_rect_intersection(high_rect.center(), &low_rect);
    let end = ray_rect_intersection(low_rect.center(), &high_rect);

    let mut markers = String::new();
    if connector.arrow_to_high {
        markers.push_str(&format!(" marker-end=\"url(#{ARROW_ID})\""));
    }
    if connector.arrow_to_low {
        markers.push_str(&format!(" marker-start=\"url(#{ARROW_ID})\""));
    }
    format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{markers}/>\n",
        fmt_num(start.x),
        fmt_num(start.y),
        fmt_num(end.x),
        fmt_num(end.y),
        escape_xml(&theme.line_color),
        fmt_num(theme.line_width),
    )
}

fn note_text_svg(note: &Note, style: &ResolvedNoteStyle, x_padding: f64) -> String {
    if note.text.trim().is_empty() {
        return String::new();
    }
    let font_size = style.font_size;
    let lines = wrap_text(&note.text, note.width - x_padding * 2.0, font_size);
    let lh = line_height(font_size);
    let total_height = lines.len() as f64 * lh;
    let text_y = note.y + (note.height - total_height) / 2.0 + font_size;
    let (text_x, anchor) = match style.alignment {
        TextAlignment::Left => (note.x + x_padding, "start"),
        TextAlignment::Center => (note.x + note.width / 2.0, "middle"),
        TextAlignment::Right => (note.x + note.width - x_padding, "end"),
    };
    let text_x = fmt_num(text_x);

    let mut text = format!(
        "  <text x=\"{text_x}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\"",
        fmt_num(text_y),
        escape_xml(&style.font_name),
        fmt_num(font_size),
        escape_xml(&style.text_color),
    );
    if style.is_bold {
        text.push_str(" font-weight=\"bold\"");
    }
    if style.is_italic {
        text.push_str(" font-style=\"italic\"");
    }
    text.push('>');
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { "0".to_string() } else { fmt_num(lh) };
        text.push_str(&format!(
            "<tspan x=\"{text_x}\" dy=\"{dy}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>\n");
    text
}

/// Writes SVG to `output`, or to stdout when no path is given.
pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg).map_err(|source| ScappleError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{svg}");
            Ok(())
        }
    }
}

#[cfg(feature = "png")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
}

#[cfg(feature = "png")]
pub fn rasterize(svg: &str, scale: f32) -> Result<RasterImage> {
    let png_error = |message: String| ScappleError::RenderPng {
        message,
        path: None,
    };
    if !scale.is_finite() || scale <= 0.0 {
        return Err(png_error(format!("scale must be positive, got {scale}")));
    }

    let mut opt = usvg::Options::default();
    opt.font_family = crate::ir::DEFAULT_FONT.to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| ScappleError::RenderSvg {
        message: err.to_string(),
    })?;
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| png_error(format!("failed to allocate a {width}x{height} pixmap")))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    let png = pixmap
        .encode_png()
        .map_err(|err| png_error(format!("failed to encode PNG: {err}")))?;

    tracing::debug!(width, height, bytes = png.len(), "rasterized svg");
    Ok(RasterImage { width, height, png })
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, scale: f32) -> Result<RasterImage> {
    let image = rasterize(svg, scale).map_err(|err| match err {
        ScappleError::RenderPng { message, .. } => ScappleError::RenderPng {
            message,
            path: Some(output.to_path_buf()),
        },
        other => other,
    })?;
    std::fs::write(output, &image.png).map_err(|source| ScappleError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{DocumentInput, NoteInput, build_document};
    use crate::color::Color;
    use crate::ir::Appearance;

    fn note(id: u32, x: f64, y: f64, text: &str) -> NoteInput {
        NoteInput {
            id: Some(id),
            x,
            y,
            text: text.to_string(),
            ..NoteInput::default()
        }
    }

    fn pair_document() -> Document {
        let mut a = note(0, 0.0, 0.0, "Alpha & <Beta>");
        a.points_to_note_ids = vec![1];
        a.connected_note_ids = vec![1];
        let b = note(1, 300.0, 0.0, "Gamma");
        build_document(&DocumentInput {
            notes: vec![a, b],
            background_color: None,
        })
        .unwrap()
    }

    #[test]
    fn empty_document_is_a_padding_square() {
        let svg = render_svg(&Document::default(), &RenderOptions::default());
        assert!(svg.contains("viewBox=\"0 0 80 80\""));
        assert!(svg.contains("width=\"80\" height=\"80\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn negative_or_non_finite_padding_never_inverts_the_viewbox() {
        let negative = RenderOptions {
            padding: -50.0,
            ..RenderOptions::default()
        };
        let svg = render_svg(&Document::default(), &negative);
        assert!(svg.contains("viewBox=\"0 0 0 0\""));
        assert!(!svg.contains("-100"));

        let svg = render_svg(&pair_document(), &negative);
        assert!(svg.contains("viewBox=\"0 0 440 30\""));

        let nan = RenderOptions {
            padding: f64::NAN,
            ..RenderOptions::default()
        };
        assert_eq!(nan.effective_padding(), DEFAULT_PADDING);
        let svg = render_svg(&Document::default(), &nan);
        assert!(svg.contains("viewBox=\"0 0 80 80\""));
    }

    #[test]
    fn escapes_text_and_draws_one_arrow() {
        let svg = render_svg(&pair_document(), &RenderOptions::default());
        assert!(svg.contains("Alpha &amp; &lt;Beta&gt;"));
        assert_eq!(svg.matches("<line ").count(), 1);
        assert_eq!(svg.matches("marker-end=").count(), 1);
        assert!(!svg.contains("marker-start="));
        assert!(svg.contains("orient=\"auto-start-reverse\""));
        // The line stops at the note borders.
        assert!(svg.contains("x1=\"140\" y1=\"15\" x2=\"300\" y2=\"15\""));
    }

    #[test]
    fn reverse_arrow_uses_marker_start() {
        let mut doc = pair_document();
        doc.notes[0].points_to_note_ids.clear();
        doc.notes[1].points_to_note_ids = vec![0];
        let svg = render_svg(&doc, &RenderOptions::default());
        assert!(svg.contains("marker-start="));
        assert!(!svg.contains("marker-end="));
    }

    #[test]
    fn missing_endpoints_are_skipped() {
        let mut doc = pair_document();
        doc.notes.truncate(1);
        let svg = render_svg(&doc, &RenderOptions::default());
        assert!(!svg.contains("<line "));
    }

    #[test]
    fn theme_controls_pattern_and_shadow() {
        let options = RenderOptions {
            theme: Some(Theme::blueprint()),
            ..RenderOptions::default()
        };
        let svg = render_svg(&pair_document(), &options);
        assert!(svg.contains("<pattern id=\"bg-pattern\""));
        assert!(svg.contains("fill=\"url(#bg-pattern)\""));
        assert!(!svg.contains("<filter"));
        assert!(svg.contains("fill=\"#1d3c6e\""));

        let svg = render_svg(&pair_document(), &RenderOptions::default());
        assert!(!svg.contains("<pattern"));
        assert!(svg.contains("filter=\"url(#shadow)\""));
    }

    #[test]
    fn borders_and_font_styles() {
        let mut doc = pair_document();
        doc.notes[0].appearance = Appearance {
            border: Some(BorderStyle::Cloud),
            is_bold: true,
            is_italic: true,
            alignment: Some(TextAlignment::Left),
            ..Appearance::default()
        };
        doc.notes[1].appearance = Appearance {
            border: Some(BorderStyle::None),
            fill: Some(Color::new(1.0, 0.0, 0.0)),
            ..Appearance::default()
        };
        let svg = render_svg(&doc, &RenderOptions::default());
        assert!(svg.contains("<path d=\"M 0 0 Q"));
        assert!(svg.contains("font-weight=\"bold\""));
        assert!(svg.contains("font-style=\"italic\""));
        assert!(svg.contains("text-anchor=\"start\""));
        assert!(svg.contains("fill=\"#ff0000\" stroke=\"none\""));
    }

    #[test]
    fn wrapped_lines_become_tspans() {
        let mut doc = pair_document();
        doc.notes[1].text = "one\ntwo\nthree".to_string();
        let svg = render_svg(&doc, &RenderOptions::default());
        let gamma = svg.lines().find(|line| line.contains(">one<")).unwrap();
        assert_eq!(gamma.matches("<tspan").count(), 3);
        assert!(gamma.contains("dy=\"15.6\""));
    }

    #[cfg(feature = "png")]
    #[test]
    fn rasterizes_at_scale() {
        let svg = render_svg(&Document::default(), &RenderOptions::default());
        let image = rasterize(&svg, 2.0).unwrap();
        assert_eq!((image.width, image.height), (160, 160));
        assert!(image.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[cfg(feature = "png")]
    #[test]
    fn rejects_non_positive_scale() {
        let err = rasterize("<svg/>", 0.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::RenderPngFailed);
    }
}
