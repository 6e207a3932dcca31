use scapple_rs::builder::{DocumentInput, build_document, encode_scapple};
use scapple_rs::projection::summarize;
use scapple_rs::{RenderOptions, ScappleError, Theme, outline_to_notes, parse_scapple, render_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScappleRenderOptions {
    theme: Option<String>,
    theme_variables: Option<Theme>,
    padding: Option<f64>,
}

fn build_render_options(options: ScappleRenderOptions) -> RenderOptions {
    let mut theme = options
        .theme
        .as_deref()
        .and_then(Theme::preset)
        .unwrap_or_default();
    if let Some(vars) = options.theme_variables {
        theme = vars.overlay(&theme);
    }

    let mut render_options = RenderOptions {
        theme: Some(theme),
        ..RenderOptions::default()
    };
    if let Some(padding) = options.padding {
        render_options.padding = padding;
    }
    render_options
}

fn to_js(error: ScappleError) -> JsValue {
    JsValue::from_str(&error.to_report())
}

#[wasm_bindgen]
pub fn render_scapple_svg(markup: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<ScappleRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        ScappleRenderOptions::default()
    };

    let doc = parse_scapple(markup).map_err(to_js)?;
    Ok(render_svg(&doc, &build_render_options(options)))
}

/// Scapple markup for an indented outline, or `undefined` when the outline
/// has no items.
#[wasm_bindgen]
pub fn outline_to_scapple(text: &str) -> Result<Option<String>, JsValue> {
    let notes = outline_to_notes(text);
    if notes.is_empty() {
        return Ok(None);
    }
    let doc = build_document(&DocumentInput {
        notes,
        background_color: None,
    })
    .map_err(to_js)?;
    Ok(Some(encode_scapple(&doc)))
}

/// JSON projection of a document, as printed by `scap read`.
#[wasm_bindgen]
pub fn scapple_to_json(markup: &str) -> Result<String, JsValue> {
    let doc = parse_scapple(markup).map_err(to_js)?;
    serde_json::to_string(&summarize(&doc, None)).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use scapple_rs::{parse_scapple, render_svg};

    use crate::{ScappleRenderOptions, build_render_options};

    #[test]
    fn renders_outline_markup_with_theme_overrides() {
        let notes = scapple_rs::outline_to_notes("Root\n  Left\n  Right");
        let doc = scapple_rs::build_document(&scapple_rs::DocumentInput {
            notes,
            background_color: None,
        })
        .expect("outline should build");
        let markup = scapple_rs::encode_scapple_with_id(&doc, "WASM");

        let options: ScappleRenderOptions = serde_json::from_str(
            r##"{"theme":"dark","themeVariables":{"lineColor":"#00ff00"},"padding":10}"##,
        )
        .expect("options should parse");
        let svg = render_svg(
            &parse_scapple(&markup).expect("markup should decode"),
            &build_render_options(options),
        );

        assert!(svg.contains("<svg"));
        assert!(svg.contains("stroke=\"#00ff00\""));
        assert!(svg.contains("fill=\"#1e1f22\""));
        assert!(svg.contains("Right"));
    }

    #[test]
    fn unknown_theme_falls_back_to_defaults() {
        let options = build_render_options(ScappleRenderOptions {
            theme: Some("neon".to_string()),
            ..ScappleRenderOptions::default()
        });
        assert_eq!(options.theme, Some(scapple_rs::Theme::default()));
        assert_eq!(options.padding, 40.0);
    }
}
