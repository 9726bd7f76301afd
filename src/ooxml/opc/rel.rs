use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
/// Relationship-related objects for OPC packages.
///
/// A part reaches every other part (and external URL) it depends on through
/// its relationships; the composition pipeline rewrites these when slides are
/// cleared, removed or receive content from another package.
use std::collections::HashMap;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a relative part reference or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    ///
    /// For internal relationships, this is a relative part reference.
    /// For external relationships, this is an absolute URL.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "Cannot get target_partname for external relationship {}",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source part.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    /// Map of relationship ID to Relationship
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection rooted at `base_uri`.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    #[inline]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Add a relationship with a known rId, replacing any previous one with
    /// the same id.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.insert(r_id, rel);
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    #[inline]
    pub fn contains(&self, r_id: &str) -> bool {
        self.rels.contains_key(r_id)
    }

    /// Get or add an internal relationship to a target part.
    ///
    /// Returns the rId of an existing relationship of the same type and target,
    /// otherwise allocates the next free rId.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(rel) = self
            .rels
            .values()
            .find(|rel| rel.reltype() == reltype && rel.target_ref() == target_ref && !rel.is_external())
        {
            return rel.r_id().to_string();
        }

        let r_id = self.next_r_id();
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), false);
        r_id
    }

    /// Get or add an external relationship.
    pub fn get_or_add_ext_rel(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(rel) = self
            .rels
            .values()
            .find(|rel| rel.reltype() == reltype && rel.target_ref() == target_ref && rel.is_external())
        {
            return rel.r_id().to_string();
        }

        let r_id = self.next_r_id();
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), true);
        r_id
    }

    /// Get the next available relationship ID.
    ///
    /// Generates IDs in the format "rId1", "rId2", etc., filling in gaps
    /// if any exist.
    pub fn next_r_id(&self) -> String {
        let mut used_numbers: Vec<u32> = self
            .rels
            .keys()
            .filter_map(|r_id| {
                r_id.strip_prefix("rId")
                    .and_then(|digits| atoi_simd::parse::<u32>(digits.as_bytes()).ok())
            })
            .collect();

        used_numbers.sort_unstable();

        let mut next_num = 1u32;
        for &num in &used_numbers {
            match num.cmp(&next_num) {
                std::cmp::Ordering::Equal => next_num += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next_num)
    }

    /// Get the relationship of a specific type.
    ///
    /// Returns an error if no relationship of the type is found,
    /// or if multiple relationships of the type exist.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.values().filter(|rel| rel.reltype() == reltype);

        match (matching.next(), matching.next()) {
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(rel), None) => Ok(rel),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    /// First relationship of a type, in rId order.
    pub fn first_of_type(&self, reltype: &str) -> Option<&Relationship> {
        self.sorted().into_iter().find(|rel| rel.reltype() == reltype)
    }

    /// Iterator over all relationships, in no particular order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    /// All relationships sorted by rId (numerically where possible).
    pub fn sorted(&self) -> Vec<&Relationship> {
        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by(|a, b| rid_sort_key(a.r_id()).cmp(&rid_sort_key(b.r_id())));
        rels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        self.rels.remove(r_id)
    }

    /// Keep only relationships for which the predicate returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Relationship) -> bool) {
        self.rels.retain(|_, rel| keep(rel));
    }

    /// Serialize relationships to the XML of a .rels part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for rel in self.sorted() {
            let target_mode = if rel.is_external() {
                r#" TargetMode="External""#
            } else {
                ""
            };

            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                quick_xml::escape::escape(rel.r_id()),
                quick_xml::escape::escape(rel.reltype()),
                quick_xml::escape::escape(rel.target_ref()),
                target_mode
            ));
        }

        xml.push_str("</Relationships>");

        xml
    }
}

/// Sort key ordering `rId2` before `rId10`; ids outside the rIdN pattern sort last.
fn rid_sort_key(r_id: &str) -> (u32, &str) {
    let num = r_id
        .strip_prefix("rId")
        .and_then(|digits| atoi_simd::parse::<u32>(digits.as_bytes()).ok())
        .unwrap_or(u32::MAX);
    (num, r_id)
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_target_partname() {
        let rel = Relationship::new(
            "rId1".to_string(),
            "http://example.com/rel".to_string(),
            "../media/image1.png".to_string(),
            "/ppt/slides".to_string(),
            false,
        );

        assert_eq!(rel.r_id(), "rId1");
        assert_eq!(rel.target_partname().unwrap().as_str(), "/ppt/media/image1.png");

        let ext = Relationship::new(
            "rId2".to_string(),
            "http://example.com/rel".to_string(),
            "https://example.com".to_string(),
            "/ppt/slides".to_string(),
            true,
        );
        assert!(ext.target_partname().is_err());
    }

    #[test]
    fn test_next_r_id_fills_gaps() {
        let mut rels = Relationships::new("/ppt/slides".to_string());
        assert_eq!(rels.next_r_id(), "rId1");

        rels.add_relationship("t".to_string(), "a".to_string(), "rId1".to_string(), false);
        rels.add_relationship("t".to_string(), "b".to_string(), "rId3".to_string(), false);
        assert_eq!(rels.next_r_id(), "rId2");
    }

    #[test]
    fn test_get_or_add() {
        let mut rels = Relationships::new("/ppt/slides".to_string());

        assert_eq!(rels.get_or_add("type1", "target1"), "rId1");
        assert_eq!(rels.get_or_add("type1", "target1"), "rId1");
        assert_eq!(rels.get_or_add("type1", "target2"), "rId2");
        assert_eq!(rels.get_or_add_ext_rel("type1", "target1"), "rId3");
    }

    #[test]
    fn test_to_xml_sorted_numerically() {
        let mut rels = Relationships::new("/ppt/slides".to_string());
        rels.add_relationship("t".to_string(), "x10".to_string(), "rId10".to_string(), false);
        rels.add_relationship("t".to_string(), "a&b".to_string(), "rId2".to_string(), true);

        let xml = rels.to_xml();
        let pos2 = xml.find(r#"Id="rId2""#).unwrap();
        let pos10 = xml.find(r#"Id="rId10""#).unwrap();
        assert!(pos2 < pos10);
        assert!(xml.contains("a&amp;b"));
        assert!(xml.contains(r#"TargetMode="External""#));
    }

    #[test]
    fn test_retain_and_remove() {
        let mut rels = Relationships::new("/ppt".to_string());
        rels.add_relationship("slide".to_string(), "s1".to_string(), "rId1".to_string(), false);
        rels.add_relationship("theme".to_string(), "t1".to_string(), "rId2".to_string(), false);

        rels.retain(|rel| rel.reltype() != "slide");
        assert!(!rels.contains("rId1"));
        assert!(rels.remove("rId2").is_some());
        assert!(rels.is_empty());
    }
}
