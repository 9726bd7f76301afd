//! PowerPoint (.pptx) presentation support.
//!
//! A [`Document`] owns its package and its slides. Slides own their shapes as
//! a closed [`Shape`] enum; shapes the model doesn't look into are kept as
//! verbatim XML together with snapshots of the package parts they reference,
//! so they can be written into another document.
//!
//! ```rust,ignore
//! use deckweave::ooxml::pptx::Document;
//!
//! let deck = Document::load(&std::fs::read("deck.pptx")?)?;
//! for (index, slide) in deck.slides().iter().enumerate() {
//!     println!("slide {}: {} shapes", index, slide.shape_count());
//! }
//! ```

pub mod document;
pub mod format;
pub mod parts;
pub mod resources;
pub mod shapes;
pub mod slide;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::Document;
pub use format::ImageFormat;
pub use parts::theme::{Theme, ThemeColor};
pub use shapes::{
    Alignment, ContentRole, GenericShape, Geometry, ImageData, Paragraph, Picture, Placeholder,
    PlaceholderKind, RgbColor, Run, Shape, ShapeKind, TextBody, TextField, TextFrame,
    UnderlineStyle,
};
pub use slide::Slide;
