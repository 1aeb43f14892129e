use thiserror::Error;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("Invalid page geometry: {0}")]
    GeometryError(String),

    #[error("Failed to parse font: {0}")]
    FontError(String),

    #[error("WinAnsi cannot encode \"{ch}\" ({code:#06x})")]
    EncodingError { ch: char, code: u32 },

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}
