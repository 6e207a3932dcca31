pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod connections;
pub mod error;
pub mod geometry;
pub mod id_range;
pub mod ir;
pub mod layout;
pub mod markup;
pub mod parser;
pub mod projection;
pub mod render;
pub mod storage;
pub mod text_metrics;
pub mod theme;

pub use builder::{DocumentInput, NoteInput, build_document, encode_scapple, encode_scapple_with_id};
#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{ErrorKind, Result, ScappleError};
pub use ir::Document;
pub use layout::outline_to_notes;
pub use parser::parse_scapple;
pub use render::{RenderOptions, render_svg};
pub use theme::Theme;
