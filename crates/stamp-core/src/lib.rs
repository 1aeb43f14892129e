//! PDF text stamping
//!
//! This crate places a short text label on the first page of an existing PDF
//! using lopdf:
//! - `position`: anchor tokens ("bottom-right", "top-center", ...) to coordinates
//! - `font`: embedded TrueType fonts or the built-in Helvetica, with measurement
//! - `stamp`: page geometry lookup, font registration, content injection
//! - `naming`: download names for stamped documents

pub mod config;
pub mod error;
pub mod font;
pub mod naming;
pub mod position;
pub mod stamp;

pub use config::{parse_font_size, StampConfig};
pub use error::StampError;
pub use font::StampFont;
pub use naming::output_filename;
pub use position::{resolve_position, Anchor, PageGeometry, Position, TextMetrics, DEFAULT_MARGIN};
pub use stamp::{stamp_first_page, StampRequest, StampedPdf};

