//! Low-level, read-only API to a serialized Open Packaging Convention (OPC) package.
//!
//! The PackageReader parses `[Content_Types].xml`, then walks the relationship
//! graph breadth-first from the package relationships, so only parts that are
//! actually reachable are loaded.

use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::xml::attr_value;
use bytes::Bytes;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};

/// Serialized part with its content and relationships, before it becomes a Part.
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,

    /// The relationship type that first reached this part
    pub reltype: String,

    pub blob: Bytes,

    /// Relationships from this part, usually only a handful
    pub srels: SmallVec<[SerializedRelationship; 8]>,
}

/// Serialized relationship as read from a .rels file.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    /// Base URI for resolving relative references
    pub base_uri: String,
    pub r_id: String,
    pub reltype: String,

    /// Target reference (relative URI or external URL)
    pub target_ref: String,

    /// Target mode (Internal or External)
    pub target_mode: String,
}

impl SerializedRelationship {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }

    /// Resolve the target reference against the base URI.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Content type map built from the Default and Override elements of
/// `[Content_Types].xml`.
#[derive(Debug, Default)]
pub struct ContentTypeMap {
    /// Lowercase file extension to content type
    defaults: HashMap<String, String>,

    /// Partname to content type
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => true,
                        b"Override" => false,
                        _ => {
                            buf.clear();
                            continue;
                        },
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = Some(attr_value(&attr)?),
                            b"ContentType" => content_type = Some(attr_value(&attr)?),
                            _ => {},
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            map.add_default(key, ct);
                        } else {
                            map.add_override(key, ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    fn add_default(&mut self, extension: String, content_type: String) {
        self.defaults.insert(extension.to_lowercase(), content_type);
    }

    fn add_override(&mut self, partname: String, content_type: String) {
        self.overrides.insert(partname.to_lowercase(), content_type);
    }

    /// Get the content type for a partname: override first, then the default
    /// for its extension. Both lookups ignore case.
    pub fn get(&self, pack_uri: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(&pack_uri.as_str().to_lowercase()) {
            return Ok(ct.clone());
        }

        if let Some(ct) = self.defaults.get(&pack_uri.ext().to_lowercase()) {
            return Ok(ct.clone());
        }

        Err(OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Package reader that provides access to serialized parts and relationships.
pub struct PackageReader {
    pkg_srels: SmallVec<[SerializedRelationship; 8]>,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    /// Parse content types and walk the relationship graph of a physical package.
    pub fn from_phys_reader(phys_reader: &PhysPkgReader) -> Result<Self> {
        let content_types = ContentTypeMap::from_xml(&phys_reader.content_types_xml()?)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = Self::load_rels(phys_reader, &package_uri)?;

        let sparts = Self::load_parts(phys_reader, &pkg_srels, &content_types)?;

        Ok(Self { pkg_srels, sparts })
    }

    fn load_rels(
        phys_reader: &PhysPkgReader,
        source_uri: &PackURI,
    ) -> Result<SmallVec<[SerializedRelationship; 8]>> {
        match phys_reader.rels_xml_for(source_uri)? {
            Some(xml) => parse_rels_xml(&xml, source_uri.base_uri()),
            None => Ok(SmallVec::new()),
        }
    }

    /// Breadth-first walk of the relationship graph starting at the package
    /// relationships. Each part is loaded once, however many parts refer to it.
    fn load_parts(
        phys_reader: &PhysPkgReader,
        pkg_srels: &[SerializedRelationship],
        content_types: &ContentTypeMap,
    ) -> Result<Vec<SerializedPart>> {
        let mut sparts = Vec::with_capacity(32);
        let mut visited: HashSet<PackURI> = HashSet::with_capacity(32);
        let mut work_queue: VecDeque<(PackURI, String)> = VecDeque::with_capacity(pkg_srels.len());

        for srel in pkg_srels {
            enqueue(srel, &mut visited, &mut work_queue);
        }

        while let Some((partname, reltype)) = work_queue.pop_front() {
            let part_srels = Self::load_rels(phys_reader, &partname)?;
            for child in &part_srels {
                enqueue(child, &mut visited, &mut work_queue);
            }

            let blob = phys_reader.blob_for(&partname)?;
            let content_type = content_types.get(&partname)?;

            sparts.push(SerializedPart {
                partname,
                content_type,
                reltype,
                blob,
                srels: part_srels,
            });
        }

        Ok(sparts)
    }

    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    pub fn take_pkg_srels(&mut self) -> SmallVec<[SerializedRelationship; 8]> {
        std::mem::take(&mut self.pkg_srels)
    }

    pub fn take_sparts(&mut self) -> Vec<SerializedPart> {
        std::mem::take(&mut self.sparts)
    }
}

/// Queue the internal target of `srel` unless it was already seen.
fn enqueue(
    srel: &SerializedRelationship,
    visited: &mut HashSet<PackURI>,
    queue: &mut VecDeque<(PackURI, String)>,
) {
    if srel.is_external() {
        return;
    }
    if let Ok(partname) = srel.target_partname()
        && visited.insert(partname.clone())
    {
        queue.push_back((partname, srel.reltype.clone()));
    }
}

/// Parse the XML of a .rels part.
pub fn parse_rels_xml(
    rels_xml: &[u8],
    base_uri: &str,
) -> Result<SmallVec<[SerializedRelationship; 8]>> {
    let mut srels = SmallVec::new();
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut r_id = None;
                let mut reltype = None;
                let mut target_ref = None;
                let mut mode = target_mode::INTERNAL.to_string();

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => r_id = Some(attr_value(&attr)?),
                        b"Type" => reltype = Some(attr_value(&attr)?),
                        b"Target" => target_ref = Some(attr_value(&attr)?),
                        b"TargetMode" => mode = attr_value(&attr)?,
                        _ => {},
                    }
                }

                if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                    srels.push(SerializedRelationship {
                        base_uri: base_uri.to_string(),
                        r_id: id,
                        reltype: rt,
                        target_ref: tr,
                        target_mode: mode,
                    });
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(srels)
}
