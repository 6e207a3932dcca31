use crate::render::DEFAULT_PADDING;
use crate::theme::Theme;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SCALE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub padding: f64,
    /// Raster pixels per SVG unit.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            scale: DEFAULT_SCALE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<Theme>,
    padding: Option<f64>,
    scale: Option<f32>,
}

/// Reads a JSON5 render config. `None` yields the defaults.
///
/// A named preset is applied first and `themeVariables` on top of it.
/// `preset` replaces the file's own `theme` name but not its variables.
pub fn load_config(path: Option<&Path>, preset: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            json5::from_str::<ConfigFile>(&contents)?
        }
        None => ConfigFile::default(),
    };

    if let Some(theme_name) = preset.or(parsed.theme.as_deref()) {
        match Theme::preset(theme_name) {
            Some(preset) => config.theme = preset,
            None => tracing::warn!(theme = theme_name, "unknown theme preset, using defaults"),
        }
    }
    if let Some(vars) = parsed.theme_variables {
        config.theme = vars.overlay(&config.theme);
    }
    if let Some(padding) = parsed.padding.filter(|p| p.is_finite() && *p >= 0.0) {
        config.render.padding = padding;
    }
    if let Some(scale) = parsed.scale.filter(|s| s.is_finite() && *s > 0.0) {
        config.render.scale = scale;
    }

    Ok(config)
}
