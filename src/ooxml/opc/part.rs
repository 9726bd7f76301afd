use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use bytes::Bytes;
use memchr::memmem;
use quick_xml::Reader;
/// Open Packaging Convention (OPC) objects related to package parts.
///
/// Parts are the fundamental units of content in an OPC package, each with a
/// unique partname, a content type and its own relationships. Blobs are held
/// as `Bytes` so untouched parts can be handed from reader to writer without
/// copying.

/// Trait representing a part in an OPC package.
pub trait Part: Send + Sync + std::fmt::Debug {
    /// Get the partname of this part.
    fn partname(&self) -> &PackURI;

    /// Get the content type of this part.
    fn content_type(&self) -> &str;

    /// Get the binary content of this part.
    fn blob(&self) -> &Bytes;

    /// Replace the binary content of this part.
    fn set_blob(&mut self, blob: Bytes);

    /// Get the relationships for this part.
    fn rels(&self) -> &Relationships;

    /// Get mutable access to the relationships for this part.
    fn rels_mut(&mut self) -> &mut Relationships;

    /// Whether the content is XML that can be parsed with quick-xml.
    fn is_xml(&self) -> bool {
        is_xml_content_type(self.content_type())
    }

    /// Add or get a relationship to another part, returning its rId.
    fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname().base_uri());
        self.rels_mut().get_or_add(reltype, &target_ref)
    }

    /// Add or get an external relationship.
    fn relate_to_ext(&mut self, target_url: &str, reltype: &str) -> String {
        self.rels_mut().get_or_add_ext_rel(reltype, target_url)
    }

    /// Get the target reference for a relationship ID.
    fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels()
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))
    }

    /// Count attribute values referencing a relationship ID in the part content.
    ///
    /// Matches any `="rIdN"` occurrence, which covers `r:id`, `r:embed`,
    /// `r:link` and friends. Non-XML parts never reference relationships.
    fn rel_ref_count(&self, r_id: &str) -> usize {
        if !self.is_xml() {
            return 0;
        }
        let pattern = format!(r#"="{}""#, r_id);
        memmem::Finder::new(pattern.as_bytes())
            .find_iter(self.blob())
            .count()
    }
}

/// A part holding opaque binary content, such as an image.
#[derive(Debug, Clone)]
pub struct BlobPart {
    partname: PackURI,
    content_type: String,
    blob: Bytes,
    rels: Relationships,
}

impl BlobPart {
    pub fn new(partname: PackURI, content_type: String, blob: Bytes) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob,
            rels,
        }
    }
}

impl Part for BlobPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &Bytes {
        &self.blob
    }

    fn set_blob(&mut self, blob: Bytes) {
        self.blob = blob;
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// An XML part. The content is validated as UTF-8 on load.
#[derive(Debug, Clone)]
pub struct XmlPart {
    partname: PackURI,
    content_type: String,
    xml_bytes: Bytes,
    rels: Relationships,
}

impl XmlPart {
    pub fn new(partname: PackURI, content_type: String, xml_bytes: Bytes) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            xml_bytes,
            rels,
        }
    }

    /// Load an XML part from raw data, rejecting content that isn't UTF-8.
    pub fn load(partname: PackURI, content_type: String, xml_bytes: Bytes) -> Result<Self> {
        std::str::from_utf8(&xml_bytes)
            .map_err(|e| OpcError::XmlError(format!("Invalid UTF-8 in {}: {}", partname, e)))?;

        Ok(Self::new(partname, content_type, xml_bytes))
    }

    /// Get a quick-xml reader over the content.
    pub fn reader(&self) -> Reader<&[u8]> {
        let mut reader = Reader::from_reader(&self.xml_bytes[..]);
        reader.config_mut().trim_text(true);
        reader
    }

    /// The XML content as a string slice.
    pub fn xml_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.xml_bytes)?)
    }
}

impl Part for XmlPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &Bytes {
        &self.xml_bytes
    }

    fn set_blob(&mut self, blob: Bytes) {
        self.xml_bytes = blob;
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// Whether a content type denotes XML content.
pub fn is_xml_content_type(content_type: &str) -> bool {
    content_type.ends_with("+xml") || content_type.ends_with("/xml")
}

/// Factory for creating the appropriate part type based on content type.
pub struct PartFactory;

impl PartFactory {
    /// Load a part, choosing `XmlPart` for XML content types and `BlobPart`
    /// for everything else.
    pub fn load(partname: PackURI, content_type: String, blob: Bytes) -> Result<Box<dyn Part>> {
        if is_xml_content_type(&content_type) {
            Ok(Box::new(XmlPart::load(partname, content_type, blob)?))
        } else {
            Ok(Box::new(BlobPart::new(partname, content_type, blob)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};

    #[test]
    fn test_factory_picks_part_kind() {
        let xml = PartFactory::load(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            Bytes::from_static(b"<p:sld/>"),
        )
        .unwrap();
        assert!(xml.is_xml());

        let png = PartFactory::load(
            PackURI::new("/ppt/media/image1.png").unwrap(),
            ct::PNG.to_string(),
            Bytes::from_static(&[0x89, b'P', b'N', b'G']),
        )
        .unwrap();
        assert!(!png.is_xml());
        assert_eq!(png.rel_ref_count("rId1"), 0);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = XmlPart::load(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            Bytes::from_static(&[0xff, 0xfe]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_relate_to_and_ref_count() {
        let mut part = XmlPart::new(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            Bytes::from_static(br#"<p:sld><a:blip r:embed="rId1"/><a:blip r:embed="rId1"/></p:sld>"#),
        );
        let media = PackURI::new("/ppt/media/image1.png").unwrap();
        let r_id = part.relate_to(&media, rt::IMAGE);
        assert_eq!(r_id, "rId1");
        assert_eq!(part.target_ref("rId1").unwrap(), "../media/image1.png");
        assert_eq!(part.rel_ref_count("rId1"), 2);
        assert_eq!(part.rel_ref_count("rId2"), 0);
    }
}
