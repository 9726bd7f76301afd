/// Slide layout and master parts, read for the placeholder positions slides
/// inherit.
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::pptx::shapes::placeholder_geometry;
use crate::ooxml::pptx::shapes::{Geometry, Placeholder, PlaceholderKind};
use crate::ooxml::pptx::slide::split_shape_tree;
use std::collections::HashMap;
use std::sync::Arc;

/// Placeholders of one layout or master.
#[derive(Debug, Default)]
struct PlaceholderTable {
    by_idx: HashMap<u32, (PlaceholderKind, Option<Geometry>)>,
    by_kind: HashMap<PlaceholderKind, Geometry>,
}

impl PlaceholderTable {
    fn parse(xml: &str) -> Result<Self> {
        let mut table = Self::default();
        let tree = split_shape_tree(xml)?;
        for range in tree.shapes {
            let Some((ph, geometry)) = placeholder_geometry(&xml[range])? else {
                continue;
            };
            if let Some(idx) = ph.idx {
                table.by_idx.entry(idx).or_insert((ph.kind, geometry));
            }
            if let Some(geometry) = geometry {
                table.by_kind.entry(ph.kind).or_insert(geometry);
            }
        }
        Ok(table)
    }

    fn from_part(part: &dyn Part) -> Result<Self> {
        Self::parse(std::str::from_utf8(part.blob())?)
    }
}

/// Placeholder positions a slide inherits from its layout and master.
#[derive(Debug, Default)]
pub struct InheritedGeometry {
    layout: PlaceholderTable,
    master: PlaceholderTable,
}

impl InheritedGeometry {
    /// Geometry for a slide placeholder: the layout placeholder with the same
    /// `idx`, then the layout placeholder of the same type, then the master
    /// placeholder of the corresponding master type.
    pub fn resolve(&self, ph: &Placeholder) -> Option<Geometry> {
        let by_idx = ph.idx.and_then(|idx| self.layout.by_idx.get(&idx));
        if let Some((_, Some(geometry))) = by_idx {
            return Some(*geometry);
        }

        let kind = by_idx.map_or(ph.kind, |(kind, _)| *kind);
        self.layout
            .by_kind
            .get(&kind)
            .or_else(|| self.master.by_kind.get(&kind.master_kind()))
            .copied()
    }
}

/// Parsed layouts of one package, shared by the slides using them.
#[derive(Debug, Default)]
pub(crate) struct LayoutCache {
    layouts: HashMap<PackURI, Arc<InheritedGeometry>>,
}

impl LayoutCache {
    /// Inherited geometry for a slide with relationships `slide_rels`.
    ///
    /// Slides without a resolvable layout inherit nothing.
    pub fn for_slide(
        &mut self,
        package: &OpcPackage,
        slide_rels: &Relationships,
    ) -> Result<Option<Arc<InheritedGeometry>>> {
        let Some(rel) = slide_rels.first_of_type(rt::SLIDE_LAYOUT) else {
            return Ok(None);
        };
        let partname = rel.target_partname()?;
        if let Some(inherited) = self.layouts.get(&partname) {
            return Ok(Some(inherited.clone()));
        }
        let Ok(layout_part) = package.get_part(&partname) else {
            return Ok(None);
        };

        let layout = PlaceholderTable::from_part(layout_part)?;
        let master = match layout_part.rels().first_of_type(rt::SLIDE_MASTER) {
            Some(rel) => match package.get_part(&rel.target_partname()?) {
                Ok(master_part) => PlaceholderTable::from_part(master_part)?,
                Err(_) => PlaceholderTable::default(),
            },
            None => PlaceholderTable::default(),
        };

        let inherited = Arc::new(InheritedGeometry { layout, master });
        self.layouts.insert(partname, inherited.clone());
        Ok(Some(inherited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(shapes: &str) -> String {
        format!(
            r#"<p:sldLayout xmlns:a="urn:a" xmlns:p="urn:p"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sldLayout>"#,
            shapes
        )
    }

    fn ph(id: u32, attrs: &str, xfrm: Option<(i64, i64, i64, i64)>) -> String {
        let sp_pr = match xfrm {
            Some((x, y, cx, cy)) => Geometry::new(x, y, cx, cy).to_xml("a"),
            None => String::new(),
        };
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="ph{id}"/><p:cNvSpPr/><p:nvPr><p:ph {attrs}/></p:nvPr></p:nvSpPr><p:spPr>{sp_pr}</p:spPr></p:sp>"#
        )
    }

    #[test]
    fn test_resolution_order() {
        let layout = tree(&format!(
            "{}{}{}",
            ph(2, r#"type="title""#, None),
            ph(3, r#"idx="1""#, Some((100, 200, 300, 400))),
            ph(4, r#"type="body" idx="2""#, None),
        ));
        let master = tree(&format!(
            "{}{}",
            ph(2, r#"type="title""#, Some((1, 2, 3, 4))),
            ph(3, r#"type="body" idx="1""#, Some((5, 6, 7, 8))),
        ));
        let inherited = InheritedGeometry {
            layout: PlaceholderTable::parse(&layout).unwrap(),
            master: PlaceholderTable::parse(&master).unwrap(),
        };

        // idx match in the layout
        let content = Placeholder::from_attrs(None, Some("1"));
        assert_eq!(inherited.resolve(&content), Some(Geometry::new(100, 200, 300, 400)));

        // layout title has no transform, master title does
        let title = Placeholder::from_attrs(Some("ctrTitle"), None);
        assert_eq!(inherited.resolve(&title), Some(Geometry::new(1, 2, 3, 4)));

        // idx found without transform, falls through on its layout type
        let body = Placeholder::from_attrs(Some("body"), Some("2"));
        assert_eq!(inherited.resolve(&body), Some(Geometry::new(5, 6, 7, 8)));

        let footer = Placeholder::from_attrs(Some("ftr"), Some("11"));
        assert_eq!(inherited.resolve(&footer), None);
    }
}
