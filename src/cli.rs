use crate::builder::{DocumentInput, build_document};
use crate::config::load_config;
use crate::layout::outline_to_notes;
use crate::projection::summarize;
use crate::render::{RenderOptions, render_svg, write_output_svg};
use crate::storage::{read_document, validate_scap_path, write_document};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "scap", version, about = "Read, write and render Scapple mind maps")]
pub struct Args {
    /// Log decode/encode/render details to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a .scap file as JSON
    Read {
        file: PathBuf,
    },
    /// Build a .scap file from JSON notes
    Write {
        file: PathBuf,
        /// JSON input file, or '-' for stdin (the default)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
    /// Render a .scap file to SVG or PNG
    Render {
        file: PathBuf,
        /// Output path. Defaults to the input path with the format's extension.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "png")]
        output_format: OutputFormat,
        /// Raster pixels per SVG unit
        #[arg(short = 's', long = "scale")]
        scale: Option<f32>,
        #[arg(short = 'p', long = "padding")]
        padding: Option<f64>,
        /// JSON5 render config (theme, themeVariables, padding, scale)
        #[arg(short = 'c', long = "configFile")]
        config: Option<PathBuf>,
        /// Theme preset: default, paper, blueprint or dark
        #[arg(long = "theme")]
        theme: Option<String>,
    },
    /// Turn an indented outline into a .scap mind map
    Outline {
        file: PathBuf,
        /// Outline text file, or '-' for stdin (the default)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        /// Also render a PNG next to the .scap file
        #[arg(long = "render")]
        render: bool,
        #[arg(short = 's', long = "scale")]
        scale: Option<f32>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Read { file } => {
            let doc = read_document(&file)?;
            let summary = summarize(&doc, Some(&file.display().to_string()));
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Write { file, input } => {
            validate_scap_path(&file)?;
            let raw = read_input(input.as_deref())?;
            let input: DocumentInput =
                serde_json::from_str(&raw).context("input is not a valid notes document")?;
            let doc = build_document(&input)?;
            write_document(&file, &doc)?;
            print_json(&json!({
                "filePath": file.display().to_string(),
                "noteCount": doc.notes.len(),
            }))?;
        }
        Command::Render {
            file,
            output,
            output_format,
            scale,
            padding,
            config,
            theme,
        } => {
            let mut config = load_config(config.as_deref(), theme.as_deref())?;
            if let Some(padding) = padding {
                config.render.padding = padding;
            }
            if let Some(scale) = scale {
                config.render.scale = scale;
            }

            let doc = read_document(&file)?;
            let svg = render_svg(
                &doc,
                &RenderOptions {
                    padding: config.render.padding,
                    theme: Some(config.theme),
                },
            );
            let output = output.unwrap_or_else(|| file.with_extension(output_format.extension()));
            match output_format {
                OutputFormat::Svg => {
                    write_output_svg(&svg, Some(&output))?;
                    print_json(&json!({ "outputPath": output.display().to_string() }))?;
                }
                OutputFormat::Png => {
                    let (width, height) = write_png(&svg, &output, config.render.scale)?;
                    print_json(&json!({
                        "outputPath": output.display().to_string(),
                        "width": width,
                        "height": height,
                    }))?;
                }
            }
        }
        Command::Outline {
            file,
            input,
            render,
            scale,
        } => {
            validate_scap_path(&file)?;
            let text = read_input(input.as_deref())?;
            let notes = outline_to_notes(&text);
            if notes.is_empty() {
                print_json(&json!({ "filePath": null, "noteCount": 0 }))?;
                return Ok(());
            }

            let doc = build_document(&DocumentInput {
                notes,
                background_color: None,
            })?;
            write_document(&file, &doc)?;

            let mut summary = json!({
                "filePath": file.display().to_string(),
                "noteCount": doc.notes.len(),
            });
            if render {
                let png_path = file.with_extension("png");
                let svg = render_svg(&doc, &RenderOptions::default());
                let scale = scale.unwrap_or(crate::config::DEFAULT_SCALE);
                write_png(&svg, &png_path, scale)?;
                summary["pngPath"] = json!(png_path.display().to_string());
            }
            print_json(&summary)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // A second install (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, scale: f32) -> Result<(u32, u32)> {
    let image = crate::render::write_output_png(svg, output, scale)?;
    Ok((image.width, image.height))
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _scale: f32) -> Result<(u32, u32)> {
    anyhow::bail!("PNG output requires the `png` feature; use --outputFormat svg")
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_render_flags() {
        let args = Args::try_parse_from([
            "scap", "-v", "render", "map.scap", "-e", "svg", "-s", "3", "--theme", "dark",
        ])
        .unwrap();
        assert!(args.verbose);
        let Command::Render {
            file,
            output_format,
            scale,
            theme,
            output,
            ..
        } = args.command
        else {
            panic!("expected render");
        };
        assert_eq!(file, PathBuf::from("map.scap"));
        assert_eq!(output_format, OutputFormat::Svg);
        assert_eq!(scale, Some(3.0));
        assert_eq!(theme.as_deref(), Some("dark"));
        assert!(output.is_none());
    }

    #[test]
    fn render_defaults_to_png() {
        let args = Args::try_parse_from(["scap", "render", "map.scap"]).unwrap();
        let Command::Render { output_format, .. } = args.command else {
            panic!("expected render");
        };
        assert_eq!(output_format, OutputFormat::Png);
        assert_eq!(output_format.extension(), "png");
    }

    #[test]
    fn outline_accepts_stdin_marker() {
        let args = Args::try_parse_from(["scap", "outline", "m.scap", "-i", "-", "--render"]).unwrap();
        let Command::Outline { input, render, .. } = args.command else {
            panic!("expected outline");
        };
        assert_eq!(input, Some(PathBuf::from("-")));
        assert!(render);
    }
}
