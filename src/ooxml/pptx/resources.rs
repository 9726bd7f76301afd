//! Package resources referenced from shape XML, and carrying them between
//! packages.
//!
//! When a slide is loaded, every part a shape reaches through a relationship is
//! snapshotted (with the parts it reaches in turn). When that shape is later
//! written into a slide of another package, the snapshots are imported under
//! fresh partnames, new relationships are created in the destination slide and
//! the attribute values in the shape XML are rewritten to the new ids.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::{BlobPart, PartFactory};
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::xml::attr_value;
use bytes::Bytes;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug)]
struct DocumentToken;

/// Identity of a loaded document. Clones compare equal; ids of separately
/// loaded documents never do, even while both are alive.
#[derive(Debug, Clone)]
pub struct DocumentId(Arc<DocumentToken>);

impl DocumentId {
    pub fn new() -> Self {
        Self(Arc::new(DocumentToken))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DocumentId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DocumentId {}

impl Hash for DocumentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

/// A relationship referenced from shape XML, resolved at load time.
#[derive(Debug, Clone)]
pub struct ResourceRef {
    pub r_id: String,
    pub reltype: String,
    pub target: ResourceTarget,
}

#[derive(Debug, Clone)]
pub enum ResourceTarget {
    Part(Arc<PartSnapshot>),
    External(String),
    /// Slides, layouts, masters and notes belong to their own package
    Unportable,
}

/// Content of a part and of everything it reaches.
#[derive(Debug)]
pub struct PartSnapshot {
    pub partname: PackURI,
    pub content_type: String,
    pub blob: Bytes,
    pub children: Vec<ResourceRef>,
}

/// Relationship types whose targets are structural parts of a presentation.
pub fn is_unportable(reltype: &str) -> bool {
    matches!(
        reltype,
        rt::SLIDE
            | rt::SLIDE_LAYOUT
            | rt::SLIDE_MASTER
            | rt::NOTES_SLIDE
            | rt::NOTES_MASTER
            | rt::HANDOUT_MASTER
    )
}

/// Snapshot builder for one package, sharing snapshots of parts reached
/// from several shapes.
pub(crate) struct SnapshotCache<'a> {
    package: &'a OpcPackage,
    done: HashMap<PackURI, Arc<PartSnapshot>>,
    in_progress: HashSet<PackURI>,
}

impl<'a> SnapshotCache<'a> {
    pub fn new(package: &'a OpcPackage) -> Self {
        Self {
            package,
            done: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn package(&self) -> &'a OpcPackage {
        self.package
    }

    /// Resolve `r_id` in `rels`. Returns `None` when the id is unknown.
    pub fn resolve(&mut self, rels: &Relationships, r_id: &str) -> Option<ResourceRef> {
        let rel = rels.get(r_id)?;
        let target = if rel.is_external() {
            ResourceTarget::External(rel.target_ref().to_string())
        } else if is_unportable(rel.reltype()) {
            ResourceTarget::Unportable
        } else {
            match rel.target_partname().ok().and_then(|name| self.snapshot(&name)) {
                Some(snapshot) => ResourceTarget::Part(snapshot),
                None => ResourceTarget::Unportable,
            }
        };
        Some(ResourceRef {
            r_id: r_id.to_string(),
            reltype: rel.reltype().to_string(),
            target,
        })
    }

    fn snapshot(&mut self, partname: &PackURI) -> Option<Arc<PartSnapshot>> {
        if let Some(snapshot) = self.done.get(partname) {
            return Some(snapshot.clone());
        }
        // A part reaching itself again can't be carried as a tree
        if !self.in_progress.insert(partname.clone()) {
            return None;
        }

        let package = self.package;
        let Ok(part) = package.get_part(partname) else {
            self.in_progress.remove(partname);
            return None;
        };
        let rels = part.rels();
        let children = rels
            .sorted()
            .iter()
            .filter_map(|rel| self.resolve(rels, rel.r_id()))
            .filter(|child| !matches!(child.target, ResourceTarget::Unportable))
            .collect();

        let snapshot = Arc::new(PartSnapshot {
            partname: partname.clone(),
            content_type: part.content_type().to_string(),
            blob: part.blob().clone(),
            children,
        });
        self.in_progress.remove(partname);
        self.done.insert(partname.clone(), snapshot.clone());
        Some(snapshot)
    }
}

/// Relationship ids of `rels` referenced by prefixed attributes in `xml`
/// (`r:id`, `r:embed`, `r:link`, ...), in document order without repeats.
pub(crate) fn referenced_rel_ids(xml: &str, rels: &Relationships) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if !is_reference_key(attr.key.as_ref()) {
                        continue;
                    }
                    let value = attr_value(&attr)?;
                    if rels.contains(&value) && !ids.contains(&value) {
                        ids.push(value);
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(ids)
}

/// Prefixed attribute that isn't a namespace declaration.
fn is_reference_key(key: &[u8]) -> bool {
    memchr::memchr(b':', key).is_some() && !key.starts_with(b"xmlns")
}

/// Rewrite relationship references in shape XML.
///
/// Attributes whose value is a key of `ids` get the mapped id, or are removed
/// when it maps to `None`. `declare` adds namespace declarations to the root
/// element of the subtree.
pub(crate) fn rewrite_references(
    xml: &str,
    ids: &HashMap<String, Option<String>>,
    declare: &[(String, String)],
) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 128));
    let mut at_root = true;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let decls = if at_root { declare } else { &[] };
                at_root = false;
                writer.write_event(Event::Start(rewrite_start(&e, ids, decls)?))?;
            },
            Event::Empty(e) => {
                let decls = if at_root { declare } else { &[] };
                at_root = false;
                writer.write_event(Event::Empty(rewrite_start(&e, ids, decls)?))?;
            },
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| OoxmlError::Xml(e.to_string()))
}

fn rewrite_start(
    e: &BytesStart<'_>,
    ids: &HashMap<String, Option<String>>,
    declare: &[(String, String)],
) -> Result<BytesStart<'static>> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut out = BytesStart::new(name);
    let mut declared: Vec<Vec<u8>> = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key.starts_with(b"xmlns") {
            declared.push(key.to_vec());
        }
        if is_reference_key(key) {
            let value = attr_value(&attr)?;
            if let Some(mapped) = ids.get(&value) {
                if let Some(new_id) = mapped {
                    out.push_attribute((key, new_id.as_bytes()));
                }
                continue;
            }
        }
        out.push_attribute(attr);
    }

    for (prefix, uri) in declare {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        if !declared.iter().any(|existing| existing == key.as_bytes()) {
            out.push_attribute((key.as_str(), uri.as_str()));
        }
    }

    Ok(out)
}

/// Namespace declarations of the root element of a part.
pub(crate) fn root_namespaces(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let mut namespaces = Vec::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    let prefix = if key == b"xmlns" {
                        Some("")
                    } else {
                        key.strip_prefix(b"xmlns:")
                            .and_then(|p| std::str::from_utf8(p).ok())
                    };
                    if let Some(prefix) = prefix {
                        namespaces.push((prefix.to_string(), attr_value(&attr)?));
                    }
                }
                return Ok(namespaces);
            },
            Event::Eof => return Ok(Vec::new()),
            _ => {},
        }
    }
}

/// Writes foreign resources into a destination package.
///
/// Imports are remembered per origin part so a chart shared by two copied
/// shapes is imported once, and images are de-duplicated by content hash
/// against the media already in the package.
pub(crate) struct Importer<'a> {
    package: &'a mut OpcPackage,
    imported: HashMap<(DocumentId, PackURI), PackURI>,
    media: Option<HashMap<[u8; 32], PackURI>>,
}

impl<'a> Importer<'a> {
    pub fn new(package: &'a mut OpcPackage) -> Self {
        Self {
            package,
            imported: HashMap::new(),
            media: None,
        }
    }

    /// Embed image bytes, reusing an identical image part if one exists.
    pub fn embed_image(&mut self, blob: &Bytes, content_type: &str, ext_hint: &str) -> Result<PackURI> {
        let key = content_hash(blob);
        if let Some(existing) = self.media_index().get(&key) {
            return Ok(existing.clone());
        }

        let ext = ImageFormat::from_mime_type(content_type)
            .map(|format| format.extension())
            .unwrap_or(if ext_hint.is_empty() { "bin" } else { ext_hint });
        let partname = self.package.next_partname(&format!("/ppt/media/image%d.{}", ext))?;
        self.package.add_part(Box::new(BlobPart::new(
            partname.clone(),
            content_type.to_string(),
            blob.clone(),
        )));
        self.media_index().insert(key, partname.clone());
        Ok(partname)
    }

    fn media_index(&mut self) -> &mut HashMap<[u8; 32], PackURI> {
        let package = &*self.package;
        self.media.get_or_insert_with(|| {
            package
                .iter_parts()
                .filter(|part| part.content_type().starts_with("image/"))
                .map(|part| (content_hash(part.blob()), part.partname().clone()))
                .collect()
        })
    }

    /// Import a snapshot (and everything it reaches), returning its new partname.
    pub fn import_part(&mut self, origin: &DocumentId, snapshot: &PartSnapshot) -> Result<PackURI> {
        if snapshot.content_type.starts_with("image/") && snapshot.children.is_empty() {
            return self.embed_image(&snapshot.blob, &snapshot.content_type, snapshot.partname.ext());
        }

        let key = (origin.clone(), snapshot.partname.clone());
        if let Some(existing) = self.imported.get(&key) {
            return Ok(existing.clone());
        }

        let partname = self
            .package
            .next_partname(&snapshot.partname.numbered_template())?;
        let part = PartFactory::load(
            partname.clone(),
            snapshot.content_type.clone(),
            snapshot.blob.clone(),
        )?;
        self.package.add_part(part);
        self.imported.insert(key, partname.clone());

        let mut rels = Relationships::new(partname.base_uri().to_string());
        for child in &snapshot.children {
            match &child.target {
                ResourceTarget::Part(child_snapshot) => {
                    let child_name = self.import_part(origin, child_snapshot)?;
                    rels.add_relationship(
                        child.reltype.clone(),
                        child_name.relative_ref(partname.base_uri()),
                        child.r_id.clone(),
                        false,
                    );
                },
                ResourceTarget::External(url) => {
                    rels.add_relationship(child.reltype.clone(), url.clone(), child.r_id.clone(), true);
                },
                ResourceTarget::Unportable => {},
            }
        }
        *self.package.get_part_mut(&partname)?.rels_mut() = rels;

        Ok(partname)
    }

    /// Create the relationship for `resource` in a destination slide's
    /// relationships. Returns the new rId, or `None` for unportable targets.
    pub fn link(
        &mut self,
        rels: &mut Relationships,
        origin: &DocumentId,
        resource: &ResourceRef,
    ) -> Result<Option<String>> {
        match &resource.target {
            ResourceTarget::Part(snapshot) => {
                let partname = self.import_part(origin, snapshot)?;
                let target_ref = partname.relative_ref(rels.base_uri());
                Ok(Some(rels.get_or_add(&resource.reltype, &target_ref)))
            },
            ResourceTarget::External(url) => {
                Ok(Some(rels.get_or_add_ext_rel(&resource.reltype, url)))
            },
            ResourceTarget::Unportable => Ok(None),
        }
    }
}

fn content_hash(blob: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(blob);
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}
