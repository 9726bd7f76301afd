/// Verbatim shape XML together with what it needs from its package.
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::resources::{DocumentId, ResourceRef, ResourceTarget};
use std::sync::Arc;

/// The slide a piece of shape XML was loaded from. Relationship ids inside
/// the XML are only meaningful relative to this slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlideOrigin {
    pub document: DocumentId,
    pub partname: PackURI,
}

/// A shape subtree kept as serialized XML.
#[derive(Debug, Clone)]
pub struct Opaque {
    pub xml: String,
    pub origin: Arc<SlideOrigin>,
    /// Relationships referenced from attributes of the subtree
    pub resources: Vec<ResourceRef>,
    /// Namespace declarations of the origin slide's root element
    pub namespaces: Arc<Vec<(String, String)>>,
}

impl Opaque {
    /// Relationship ids the subtree references.
    pub fn referenced_ids(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|res| res.r_id.as_str())
    }

    /// References that can't be carried into another package.
    pub fn unportable(&self) -> impl Iterator<Item = &ResourceRef> {
        self.resources
            .iter()
            .filter(|res| matches!(res.target, ResourceTarget::Unportable))
    }

    /// Whether the XML is only valid inside `origin`.
    pub fn is_foreign_to(&self, origin: &SlideOrigin) -> bool {
        *self.origin != *origin
    }
}
