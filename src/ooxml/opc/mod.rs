/// Open Packaging Conventions (OPC) implementation.
///
/// The container layer of every .pptx: parts, relationships, content types and
/// the ZIP archive holding them.
///
/// - Uses `memchr` for fast reference counting in part XML
/// - Uses `atoi_simd` for fast rId and partname index parsing
/// - Uses `quick-xml` for streaming XML parsing
/// - Uses `bytes` so untouched blobs move from reader to writer without copies
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, PartFactory, XmlPart};
pub use rel::{Relationship, Relationships};
