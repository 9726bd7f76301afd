//! Deck composition: building an output deck from a template deck, a source
//! deck and a structure.
//!
//! - [`transplant`]: replace a slide's shapes with copies of another slide's
//! - [`extract`]: read the title and body out of a slide
//! - [`place`]: write a title and body into a slide's text slots
//! - [`assemble`]: run the whole pipeline against a selection oracle
pub mod assembler;
pub mod audit;
pub mod error;
pub mod extract;
pub mod placement;
pub mod structure;
pub mod transplant;

pub use assembler::{AssemblyOutput, AssemblySession, Stage, assemble};
pub use audit::{AuditLog, StepLogEntry};
pub use error::{
    AssemblyError, CopyFallback, DeckRole, OracleError, Result, ShapeCopyWarning, StructureSizeMismatch,
};
pub use extract::{SlideContent, extract, slide_excerpt};
pub use placement::{Placement, place};
pub use structure::{StepAction, StructureStep, load_structure, parse_structure};
pub use transplant::transplant;
