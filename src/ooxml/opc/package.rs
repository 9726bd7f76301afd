/// Objects that implement reading and writing OPC packages.
///
/// `OpcPackage` is the in-memory form of an Open Packaging Convention package:
/// package relationships plus every part reachable from them.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{HashMap, HashSet, VecDeque};

/// Main API class for working with OPC packages.
#[derive(Debug)]
pub struct OpcPackage {
    /// Package-level relationships
    rels: Relationships,

    /// All parts in the package, indexed by partname
    parts: HashMap<PackURI, Box<dyn Part>>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Load an OPC package from the bytes of a ZIP archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_bytes(data)?;
        let pkg_reader = PackageReader::from_phys_reader(&phys_reader)?;
        Self::unmarshal(pkg_reader)
    }

    /// Convert serialized parts and relationships into the in-memory graph.
    fn unmarshal(mut pkg_reader: PackageReader) -> Result<Self> {
        let mut package = Self::new();

        for srel in pkg_reader.take_pkg_srels() {
            let is_external = srel.is_external();
            package
                .rels
                .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
        }

        for spart in pkg_reader.take_sparts() {
            let mut part = PartFactory::load(spart.partname.clone(), spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut()
                    .add_relationship(srel.reltype, srel.target_ref, srel.r_id, is_external);
            }
            package.parts.insert(spart.partname, part);
        }

        Ok(package)
    }

    /// Serialize the package, writing only parts reachable from the package
    /// relationships.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Get the main document part (the presentation part for .pptx).
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let partname = self.main_document_partname()?;
        self.get_part(&partname)
    }

    pub fn main_document_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname)
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut Box<dyn Part>> {
        self.parts
            .get_mut(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Add a new part to the package, replacing any part with the same name.
    pub fn add_part(&mut self, part: Box<dyn Part>) {
        let partname = part.partname().clone();
        self.parts.insert(partname, part);
    }

    pub fn remove_part(&mut self, partname: &PackURI) -> Option<Box<dyn Part>> {
        self.parts.remove(partname)
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Find the next available partname for a `%d` template, e.g.
    /// `/ppt/media/image%d.png`.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        for n in 1..=10_000u32 {
            let candidate = PackURI::new(template.replace("%d", &n.to_string()))
                .map_err(OpcError::InvalidPackUri)?;
            if !self.contains_part(&candidate) {
                return Ok(candidate);
            }
        }
        Err(OpcError::InvalidPackUri(format!(
            "Too many parts, cannot find next partname for {}",
            template
        )))
    }

    /// Check if a part exists, ignoring case like the ZIP lookup does.
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
            || self
                .parts
                .keys()
                .any(|name| name.as_str().eq_ignore_ascii_case(partname.as_str()))
    }

    /// Partnames reachable from the package relationships, in breadth-first
    /// order. Relationships to parts that don't exist are ignored.
    pub fn reachable_partnames(&self) -> Vec<PackURI> {
        let mut order = Vec::with_capacity(self.parts.len());
        let mut visited: HashSet<PackURI> = HashSet::with_capacity(self.parts.len());
        let mut queue: VecDeque<PackURI> = VecDeque::new();

        let visit = |rels: &Relationships,
                     visited: &mut HashSet<PackURI>,
                     queue: &mut VecDeque<PackURI>| {
            for rel in rels.sorted() {
                if rel.is_external() {
                    continue;
                }
                if let Ok(target) = rel.target_partname()
                    && self.parts.contains_key(&target)
                    && visited.insert(target.clone())
                {
                    queue.push_back(target);
                }
            }
        };

        visit(&self.rels, &mut visited, &mut queue);
        while let Some(partname) = queue.pop_front() {
            if let Some(part) = self.parts.get(&partname) {
                visit(part.rels(), &mut visited, &mut queue);
            }
            order.push(partname);
        }
        order
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::part::BlobPart;
    use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
    use bytes::Bytes;

    fn minimal_pptx() -> Vec<u8> {
        let mut writer = PhysPkgWriter::new();
        writer
            .write_member(
                "[Content_Types].xml",
                br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#,
            )
            .unwrap();
        writer
            .write_member(
                "_rels/.rels",
                br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
            )
            .unwrap();
        writer
            .write_member("ppt/presentation.xml", br#"<p:presentation/>"#)
            .unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_open_package() {
        let pkg = OpcPackage::from_bytes(&minimal_pptx()).unwrap();
        assert_eq!(pkg.part_count(), 1);

        let main_part = pkg.main_document_part().unwrap();
        assert_eq!(main_part.content_type(), ct::PML_PRESENTATION_MAIN);
    }

    #[test]
    fn test_next_partname() {
        let mut pkg = OpcPackage::from_bytes(&minimal_pptx()).unwrap();
        let first = pkg.next_partname("/ppt/media/image%d.png").unwrap();
        assert_eq!(first.as_str(), "/ppt/media/image1.png");

        pkg.add_part(Box::new(BlobPart::new(first, ct::PNG.to_string(), Bytes::new())));
        let second = pkg.next_partname("/ppt/media/image%d.png").unwrap();
        assert_eq!(second.as_str(), "/ppt/media/image2.png");
    }

    #[test]
    fn test_unreachable_parts_are_not_saved() {
        let mut pkg = OpcPackage::from_bytes(&minimal_pptx()).unwrap();
        let orphan = PackURI::new("/ppt/media/image1.png").unwrap();
        pkg.add_part(Box::new(BlobPart::new(orphan.clone(), ct::PNG.to_string(), Bytes::new())));

        assert!(!pkg.reachable_partnames().contains(&orphan));

        let reloaded = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.part_count(), 1);
        assert!(!reloaded.contains_part(&orphan));
    }
}
