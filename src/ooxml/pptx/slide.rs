/// A slide and its shape tree.
///
/// The slide XML is split once at load time around `<p:spTree>`: everything
/// before the first shape, the tree's own properties, the shapes, the tree's
/// extension list and everything after. Only the shapes are modeled; the rest
/// is written back as it was read.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace as ns, relationship_type as rt};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::pptx::parts::layout::LayoutCache;
use crate::ooxml::pptx::resources::{
    DocumentId, Importer, SnapshotCache, referenced_rel_ids, rewrite_references, root_namespaces,
};
use crate::ooxml::pptx::shapes::{Opaque, Shape, ShapeContext, SlideOrigin, parse_shape};
use bytes::Bytes;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

/// Byte ranges of a part's shape tree (`p:cSld/p:spTree`).
#[derive(Debug, Default)]
pub(crate) struct TreeSplit {
    /// End of the `<p:spTree>` start tag
    pub head_end: usize,
    /// `nvGrpSpPr` and `grpSpPr`
    pub header: Vec<Range<usize>>,
    pub shapes: Vec<Range<usize>>,
    pub ext_lst: Option<Range<usize>>,
    /// Start of `</p:spTree>`
    pub tail_start: usize,
}

impl TreeSplit {
    fn push(&mut self, local: &[u8], range: Range<usize>) {
        match local {
            b"nvGrpSpPr" | b"grpSpPr" => self.header.push(range),
            b"extLst" => self.ext_lst = Some(range),
            _ => self.shapes.push(range),
        }
    }
}

/// Locate the children of the shape tree of a slide, layout or master.
pub(crate) fn split_shape_tree(xml: &str) -> Result<TreeSplit> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::with_capacity(8);
    let mut split = TreeSplit::default();
    let mut head_end = None;
    let mut tail_start = None;
    let mut child_start = None;

    loop {
        let pos = reader.buffer_position() as usize;
        let in_tree = head_end.is_some() && tail_start.is_none();
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if in_tree && stack.len() == 3 {
                    child_start = Some(pos);
                } else if head_end.is_none() && is_tree(&stack, &local) {
                    head_end = Some(reader.buffer_position() as usize);
                }
                stack.push(local);
            },
            Event::Empty(e) => {
                let local = e.local_name();
                if in_tree && stack.len() == 3 {
                    split.push(local.as_ref(), pos..reader.buffer_position() as usize);
                } else if head_end.is_none() && is_tree(&stack, local.as_ref()) {
                    return Err(OoxmlError::InvalidFormat("shape tree has no content".to_string()));
                }
            },
            Event::End(e) => {
                stack.pop();
                if !in_tree {
                    continue;
                }
                if stack.len() == 3 {
                    if let Some(start) = child_start.take() {
                        split.push(e.local_name().as_ref(), start..reader.buffer_position() as usize);
                    }
                } else if stack.len() == 2 {
                    tail_start = Some(pos);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    match (head_end, tail_start) {
        (Some(head_end), Some(tail_start)) => {
            split.head_end = head_end;
            split.tail_start = tail_start;
            Ok(split)
        },
        _ => Err(OoxmlError::InvalidFormat("part has no shape tree".to_string())),
    }
}

fn is_tree(stack: &[Vec<u8>], local: &[u8]) -> bool {
    stack.len() == 2 && stack[1] == b"cSld" && local == b"spTree"
}

/// Namespaces authored shape XML is written with.
const AUTHORED_NAMESPACES: [(&str, &str); 3] = [
    ("a", ns::DML_MAIN),
    ("r", ns::OFC_RELATIONSHIPS),
    ("p", ns::PML_MAIN),
];

/// One slide of a [`Document`](crate::ooxml::pptx::Document).
#[derive(Debug)]
pub struct Slide {
    partname: PackURI,
    rels: Relationships,
    original: Bytes,
    head: String,
    tree_header: String,
    shapes: Vec<Shape>,
    ext_lst: Option<String>,
    tail: String,
    /// Relationship ids used outside the shapes (background, timing, ...)
    frame_refs: HashSet<String>,
    namespaces: Arc<Vec<(String, String)>>,
    origin: Arc<SlideOrigin>,
    rebuilt: bool,
}

impl Slide {
    pub(crate) fn load(
        document: DocumentId,
        package: &OpcPackage,
        partname: &PackURI,
        snapshots: &mut SnapshotCache<'_>,
        layouts: &mut LayoutCache,
    ) -> Result<Self> {
        let part = package.get_part(partname)?;
        if part.content_type() != ct::PML_SLIDE {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_SLIDE.to_string(),
                got: part.content_type().to_string(),
            });
        }

        let original = part.blob().clone();
        let xml = std::str::from_utf8(&original)?;
        let rels = part.rels().clone();
        let tree = split_shape_tree(xml)?;
        let namespaces = Arc::new(root_namespaces(xml)?);
        let origin = Arc::new(SlideOrigin {
            document,
            partname: partname.clone(),
        });
        let inherited = layouts.for_slide(package, &rels)?;

        let mut shapes = Vec::with_capacity(tree.shapes.len());
        let mut ctx = ShapeContext {
            rels: &rels,
            snapshots,
            origin: &origin,
            namespaces: &namespaces,
        };
        for range in &tree.shapes {
            let mut shape = parse_shape(&xml[range.clone()], &mut ctx)?;
            if let (Some(ph), Some(inherited)) = (shape.placeholder(), inherited.as_ref())
                && let Some(geometry) = inherited.resolve(&ph)
            {
                shape.set_inherited(geometry);
            }
            shapes.push(shape);
        }

        let head = xml[..tree.head_end].to_string();
        let tree_header: String = tree.header.iter().map(|range| &xml[range.clone()]).collect();
        let ext_lst = tree.ext_lst.map(|range| xml[range].to_string());
        let tail = xml[tree.tail_start..].to_string();

        let mut frame = String::with_capacity(head.len() + tree_header.len() + tail.len());
        frame.push_str(&head);
        frame.push_str(&tree_header);
        frame.push_str(ext_lst.as_deref().unwrap_or_default());
        frame.push_str(&tail);
        let frame_refs = referenced_rel_ids(&frame, &rels)?.into_iter().collect();

        Ok(Self {
            partname: partname.clone(),
            rels,
            original,
            head,
            tree_header,
            shapes,
            ext_lst,
            tail,
            frame_refs,
            namespaces,
            origin,
            rebuilt: false,
        })
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Shapes in z-order.
    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[inline]
    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Slide XML as loaded.
    #[inline]
    pub fn original_xml(&self) -> &Bytes {
        &self.original
    }

    /// Partname of the slide layout, if any.
    pub fn layout_partname(&self) -> Option<PackURI> {
        self.rels
            .first_of_type(rt::SLIDE_LAYOUT)
            .and_then(|rel| rel.target_partname().ok())
    }

    /// Whether saving has to regenerate the slide XML.
    pub fn is_modified(&self) -> bool {
        self.rebuilt
            || self
                .shapes
                .iter()
                .any(|shape| shape.as_text_frame().is_some_and(|frame| frame.is_dirty()))
    }

    /// Remove every shape, and the relationships only those shapes used.
    pub fn clear_shapes(&mut self) {
        let mut released: HashSet<String> = HashSet::new();
        for shape in self.shapes.drain(..) {
            if let Some(opaque) = shape.opaque()
                && !opaque.is_foreign_to(&self.origin)
            {
                released.extend(opaque.referenced_ids().map(str::to_string));
            }
        }
        let frame_refs = &self.frame_refs;
        self.rels
            .retain(|rel| !released.contains(rel.r_id()) || frame_refs.contains(rel.r_id()));
        self.rebuilt = true;
    }

    /// Append a shape on top of the z-order.
    pub fn push_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
        self.rebuilt = true;
    }

    pub(crate) fn origin(&self) -> &Arc<SlideOrigin> {
        &self.origin
    }

    /// Regenerate the slide XML. New relationships go into `rels`, foreign
    /// resources into the importer's package.
    pub(crate) fn render(&self, importer: &mut Importer<'_>, rels: &mut Relationships) -> Result<String> {
        let mut xml = String::with_capacity(self.original.len() + 512);
        xml.push_str(&self.head);
        xml.push_str(&self.tree_header);
        for shape in &self.shapes {
            xml.push_str(&self.render_shape(shape, importer, rels)?);
        }
        if let Some(ref ext_lst) = self.ext_lst {
            xml.push_str(ext_lst);
        }
        xml.push_str(&self.tail);
        Ok(xml)
    }

    fn render_shape(&self, shape: &Shape, importer: &mut Importer<'_>, rels: &mut Relationships) -> Result<String> {
        let (xml, opaque) = match shape {
            Shape::TextFrame(frame) => (frame.to_xml(), frame.opaque()),
            Shape::Generic(generic) => (generic.opaque.xml.clone(), Some(&generic.opaque)),
            Shape::Picture(picture) => match picture.native {
                Some(ref native) => (native.xml.clone(), Some(native)),
                None => {
                    let image = picture
                        .image()
                        .map_err(|reason| OoxmlError::Other(reason.to_string()))?;
                    let partname = importer.embed_image(&image.blob, &image.content_type, image.partname.ext())?;
                    let r_id = rels.get_or_add(rt::IMAGE, &partname.relative_ref(self.partname.base_uri()));
                    (picture.authored_xml(&r_id), None)
                },
            },
        };

        match opaque {
            Some(opaque) if opaque.is_foreign_to(&self.origin) => self.carry(&xml, opaque, importer, rels),
            Some(_) => Ok(xml),
            None => {
                let missing: Vec<(String, String)> = AUTHORED_NAMESPACES
                    .iter()
                    .filter(|(prefix, uri)| !self.declares(prefix, uri))
                    .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
                    .collect();
                if missing.is_empty() {
                    Ok(xml)
                } else {
                    rewrite_references(&xml, &HashMap::new(), &missing)
                }
            },
        }
    }

    /// Re-home XML cloned from another slide: import what it references and
    /// declare the namespaces it relied on.
    fn carry(
        &self,
        xml: &str,
        opaque: &Opaque,
        importer: &mut Importer<'_>,
        rels: &mut Relationships,
    ) -> Result<String> {
        let mut ids = HashMap::with_capacity(opaque.resources.len());
        for resource in &opaque.resources {
            let new_id = importer.link(rels, &opaque.origin.document, resource)?;
            ids.insert(resource.r_id.clone(), new_id);
        }
        let declare: Vec<(String, String)> = opaque
            .namespaces
            .iter()
            .filter(|(prefix, uri)| !self.declares(prefix, uri))
            .cloned()
            .collect();
        rewrite_references(xml, &ids, &declare)
    }

    fn declares(&self, prefix: &str, uri: &str) -> bool {
        self.namespaces.iter().any(|(p, u)| p == prefix && u == uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="urn:a" xmlns:r="urn:r" xmlns:p="urn:p"><p:cSld><p:bg><p:bgPr><a:blipFill><a:blip r:embed="rId3"/></a:blipFill></p:bgPr></p:bg><p:spTree>
  <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
  <p:grpSpPr/>
  <p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/></p:nvSpPr><p:txBody><a:p/></p:txBody></p:sp>
  <p:cxnSp/>
  <p:extLst><p:ext uri="x"/></p:extLst>
</p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_split_shape_tree() {
        let split = split_shape_tree(SLIDE).unwrap();
        assert!(SLIDE[..split.head_end].ends_with("<p:spTree>"));
        assert_eq!(split.header.len(), 2);
        assert!(SLIDE[split.header[0].clone()].starts_with("<p:nvGrpSpPr>"));
        assert_eq!(split.shapes.len(), 2);
        assert!(SLIDE[split.shapes[0].clone()].starts_with("<p:sp>"));
        assert!(SLIDE[split.shapes[0].clone()].ends_with("</p:sp>"));
        assert_eq!(&SLIDE[split.shapes[1].clone()], "<p:cxnSp/>");
        assert_eq!(
            &SLIDE[split.ext_lst.clone().unwrap()],
            r#"<p:extLst><p:ext uri="x"/></p:extLst>"#
        );
        assert!(SLIDE[split.tail_start..].starts_with("</p:spTree>"));
    }

    #[test]
    fn test_missing_tree_is_an_error() {
        let err = split_shape_tree(r#"<p:sld xmlns:p="urn:p"><p:cSld/></p:sld>"#).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidFormat(_)));
    }
}
