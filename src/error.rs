use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Machine-readable error category surfaced at the tool boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ParseInvalidXml,
    ParseMissingElement,
    ParseInvalidFormat,
    ValidationInvalidId,
    ValidationInvalidColor,
    ValidationDuplicateId,
    IoReadFailed,
    IoWriteFailed,
    IoInvalidPath,
    RenderSvgFailed,
    RenderPngFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseInvalidXml => "PARSE_INVALID_XML",
            Self::ParseMissingElement => "PARSE_MISSING_ELEMENT",
            Self::ParseInvalidFormat => "PARSE_INVALID_FORMAT",
            Self::ValidationInvalidId => "VALIDATION_INVALID_ID",
            Self::ValidationInvalidColor => "VALIDATION_INVALID_COLOR",
            Self::ValidationDuplicateId => "VALIDATION_DUPLICATE_ID",
            Self::IoReadFailed => "IO_READ_FAILED",
            Self::IoWriteFailed => "IO_WRITE_FAILED",
            Self::IoInvalidPath => "IO_INVALID_PATH",
            Self::RenderSvgFailed => "RENDER_SVG_FAILED",
            Self::RenderPngFailed => "RENDER_PNG_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which positioned entity a malformed `Position` attribute belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Entity {
    Note,
    BackgroundShape,
}

/// Which connection list held a dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    Connected,
    PointsTo,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::PointsTo => f.write_str("pointed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScappleError {
    #[error("failed to parse XML: {message}")]
    InvalidXml { message: String },
    #[error("missing root <{element}> element")]
    MissingElement { element: &'static str },
    #[error("invalid Position format for {entity:?} {id}: {raw:?}")]
    InvalidPosition { entity: Entity, id: u32, raw: String },
    #[error("found {count} duplicate note ID(s)")]
    DuplicateId { count: usize, ids: Vec<u32> },
    #[error("note {note_id} references non-existent {relation} note {referenced_id}")]
    DanglingReference {
        note_id: u32,
        referenced_id: u32,
        relation: Relation,
    },
    #[error("invalid color {raw:?}")]
    InvalidColor { raw: String },
    #[error("file must have .scap extension: {}", path.display())]
    InvalidPath { path: PathBuf },
    #[error("failed to read file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to generate SVG: {message}")]
    RenderSvg { message: String },
    #[error("failed to convert SVG to PNG: {message}")]
    RenderPng {
        message: String,
        path: Option<PathBuf>,
    },
}

pub type Result<T> = std::result::Result<T, ScappleError>;

impl ScappleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidXml { .. } => ErrorKind::ParseInvalidXml,
            Self::MissingElement { .. } => ErrorKind::ParseMissingElement,
            Self::InvalidPosition { .. } => ErrorKind::ParseInvalidFormat,
            Self::DuplicateId { .. } => ErrorKind::ValidationDuplicateId,
            Self::DanglingReference { .. } => ErrorKind::ValidationInvalidId,
            Self::InvalidColor { .. } => ErrorKind::ValidationInvalidColor,
            Self::InvalidPath { .. } => ErrorKind::IoInvalidPath,
            Self::Read { .. } => ErrorKind::IoReadFailed,
            Self::Write { .. } => ErrorKind::IoWriteFailed,
            Self::RenderSvg { .. } => ErrorKind::RenderSvgFailed,
            Self::RenderPng { .. } => ErrorKind::RenderPngFailed,
        }
    }

    /// Structured details that pinpoint the failure without re-parsing.
    pub fn context(&self) -> Value {
        match self {
            Self::InvalidXml { message } => json!({ "message": message }),
            Self::MissingElement { element } => json!({ "element": element }),
            Self::InvalidPosition { entity, id, raw } => match entity {
                Entity::Note => json!({ "noteId": id, "position": raw }),
                Entity::BackgroundShape => json!({ "shapeId": id, "position": raw }),
            },
            Self::DuplicateId { count, ids } => json!({ "count": count, "duplicateIds": ids }),
            Self::DanglingReference {
                note_id,
                referenced_id,
                relation,
            } => json!({
                "noteId": note_id,
                "referencedId": referenced_id,
                "relation": relation,
            }),
            Self::InvalidColor { raw } => json!({ "color": raw }),
            Self::InvalidPath { path } => json!({ "filePath": path }),
            Self::Read { path, source } | Self::Write { path, source } => json!({
                "filePath": path,
                "error": source.to_string(),
            }),
            Self::RenderSvg { message } => json!({ "error": message }),
            Self::RenderPng { message, path } => json!({
                "outputPath": path,
                "error": message,
            }),
        }
    }

    /// `[KIND] message` form used by the command line front end.
    pub fn to_report(&self) -> String {
        format!("[{}] {} {}", self.kind(), self, self.context())
    }
}
