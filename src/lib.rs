//! Deckweave - assemble PowerPoint decks from a template and a source deck
//!
//! A structure lists one step per slide of the output deck. For every step a
//! selection oracle picks the source slide that best fits the step's keyword;
//! the step's action then either copies that slide's shapes over the template
//! slide or writes its title and body into the template slide's text slots.
//!
//! # Features
//!
//! - **OPC layer**: ZIP packages, parts, relationships and content types
//! - **Deck model**: slides as ordered shape lists (pictures, text frames,
//!   verbatim XML for everything else) that can be copied between decks
//! - **Composition**: slide transplanting, content extraction and placement
//! - **Oracles**: a local keyword oracle and a chat-completions oracle
//! - **Audit log**: one entry per step, written as YAML
//!
//! # Example
//!
//! ```no_run
//! use deckweave::compose::{assemble, parse_structure};
//! use deckweave::config::Config;
//! use deckweave::oracle::KeywordOracle;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let template = std::fs::read("template.pptx")?;
//! let source = std::fs::read("source.pptx")?;
//! let structure = parse_structure("- keyword: Timeline\n  action: copy_verbatim\n")?;
//!
//! let output = assemble(&template, &source, structure, Arc::new(KeywordOracle::new()), Config::default()).await?;
//! std::fs::write("output.pptx", &output.bytes)?;
//! println!("{}", output.audit.to_yaml()?);
//! # Ok(())
//! # }
//! ```

/// Deck composition pipeline
pub mod compose;

/// YAML configuration
pub mod config;

/// OOXML (Office Open XML) package and PresentationML support
pub mod ooxml;

/// Selection oracles
pub mod oracle;

pub use compose::{AssemblyError, AssemblyOutput, StepAction, StructureStep, assemble};
pub use config::Config;
pub use ooxml::pptx::Document;
