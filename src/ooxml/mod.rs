//! Office Open XML (OOXML) support for PowerPoint presentations.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, parts, relationships)
//! 2. **XML helpers** (`xml`, `error`): decoding shared by the parsers
//! 3. **PresentationML** (`pptx`): the deck, its slides and their shapes
pub mod error;
pub mod opc;
pub mod pptx;
pub mod xml;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
