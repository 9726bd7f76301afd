//! Package writer for OPC packages.
//!
//! Serializes `[Content_Types].xml`, the package relationships and every part
//! reachable from them, together with each part's relationships. Parts no
//! relationship leads to are left out, as are relationships whose target part
//! no longer exists.

use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::BTreeMap;

/// Package writer that serializes an OPC package to a ZIP archive in memory.
pub struct PackageWriter;

impl PackageWriter {
    /// Serialize an OPC package to bytes.
    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let reachable = package.reachable_partnames();
        let mut phys_writer = PhysPkgWriter::new();

        let parts: Vec<&dyn Part> = reachable
            .iter()
            .filter_map(|partname| package.get_part(partname).ok())
            .collect();

        Self::write_content_types(&mut phys_writer, &parts)?;
        Self::write_pkg_rels(&mut phys_writer, package)?;
        Self::write_parts(&mut phys_writer, package, &parts)?;

        phys_writer.finish()
    }

    fn write_content_types(phys_writer: &mut PhysPkgWriter, parts: &[&dyn Part]) -> Result<()> {
        let mut cti = ContentTypesItem::new();
        for part in parts {
            cti.add_content_type(part.partname(), part.content_type());
        }

        let content_types_uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        phys_writer.write(&content_types_uri, cti.to_xml().as_bytes())
    }

    fn write_pkg_rels(phys_writer: &mut PhysPkgWriter, package: &OpcPackage) -> Result<()> {
        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels_uri = package_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        let rels = live_rels(package, package.rels());
        phys_writer.write(&rels_uri, rels.to_xml().as_bytes())
    }

    fn write_parts(
        phys_writer: &mut PhysPkgWriter,
        package: &OpcPackage,
        parts: &[&dyn Part],
    ) -> Result<()> {
        for part in parts {
            phys_writer.write(part.partname(), part.blob())?;

            let rels = live_rels(package, part.rels());
            if !rels.is_empty() {
                let rels_uri = part.partname().rels_uri().map_err(OpcError::InvalidPackUri)?;
                phys_writer.write(&rels_uri, rels.to_xml().as_bytes())?;
            }
        }

        Ok(())
    }
}

/// Copy of `rels` without internal relationships whose target is missing.
fn live_rels(package: &OpcPackage, rels: &Relationships) -> Relationships {
    let mut live = rels.clone();
    live.retain(|rel| {
        rel.is_external()
            || rel
                .target_partname()
                .map(|target| package.contains_part(&target))
                .unwrap_or(false)
    });
    live
}

/// Helper for building [Content_Types].xml content.
struct ContentTypesItem {
    /// Default content types by extension
    defaults: BTreeMap<String, String>,

    /// Override content types by partname
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    /// Use a Default for well-known extension/content-type pairs, an Override
    /// for everything else.
    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_lowercase();

        if Self::is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
                | ("emf", ct::X_EMF)
                | ("wmf", ct::X_WMF)
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                quick_xml::escape::escape(ext.as_str()),
                quick_xml::escape::escape(content_type.as_str())
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                quick_xml::escape::escape(partname.as_str()),
                quick_xml::escape::escape(content_type.as_str())
            ));
        }

        xml.push_str("</Types>");

        xml
    }
}
