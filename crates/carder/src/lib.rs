//! Render card templates to printable PDF sheets.
//!
//! A template names a set of parts (localised CSV text, per-card image
//! folders, fixed images). They are resolved into one record per card id,
//! drawn onto a card background and tiled onto pages.

pub mod compose;
mod csv;
pub mod fonts;
mod options;
mod pdf;
pub mod render;
pub mod resolve;
pub mod template;
pub mod tile;
mod types;
pub mod units;
pub mod wrap;

pub use compose::{card_background, compose, compose_cards};
pub use crate::csv::{TextRow, load_text_table, locale_column};
pub use fonts::{CardFont, FontHandle, Fonts, GlyphFont, MeasureText};
pub use options::*;
pub use pdf::{encode_pdf, save_pdf};
pub use render::{render_pages, render_template, template_statistics};
pub use resolve::resolve;
pub use template::{Border, CardMetadata, PartDeclaration, PartKind, Template};
pub use tile::{PageGrid, calculate_statistics, tile};
pub use types::*;
pub use units::mm_to_px;
pub use wrap::{WrapPolicy, fit_text, fit_text_with};
