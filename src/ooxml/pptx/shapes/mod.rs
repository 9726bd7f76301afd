/// Shapes module for PowerPoint presentations.
///
/// A slide's shape tree is read into a closed set of variants decided once,
/// from the element kind, at load time:
/// - `<p:sp>` with a text body, or any placeholder `<p:sp>`: [`TextFrame`]
/// - `<p:pic>`: [`Picture`]
/// - everything else (tables, charts, groups, connectors, ink, alternate
///   content): [`GenericShape`], kept as verbatim XML
pub mod base;
pub mod opaque;
pub mod picture;
pub mod textframe;

pub use base::{Geometry, NonVisual, Placeholder, PlaceholderKind};
pub use opaque::{Opaque, SlideOrigin};
pub use picture::{ImageData, Picture};
pub use textframe::{
    Alignment, ContentRole, Margins, Paragraph, RgbColor, Run, TextBody, TextField, TextFrame,
    UnderlineStyle,
};

use crate::ooxml::error::Result;
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::pptx::resources::{SnapshotCache, referenced_rel_ids};
use crate::ooxml::xml::attr_value;
use base::parse_i64;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use textframe::{NativeText, TextSlot};

/// A shape the model doesn't look into.
#[derive(Debug, Clone)]
pub struct GenericShape {
    /// Qualified element name, e.g. `p:graphicFrame`
    pub tag: String,
    pub nv: Option<NonVisual>,
    pub placeholder: Option<Placeholder>,
    pub geometry: Option<Geometry>,
    pub inherited: Option<Geometry>,
    pub(crate) opaque: Opaque,
}

#[derive(Debug, Clone)]
pub enum Shape {
    Picture(Picture),
    TextFrame(TextFrame),
    Generic(GenericShape),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Picture,
    TextFrame,
    Generic,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Picture => f.write_str("picture"),
            Self::TextFrame => f.write_str("text frame"),
            Self::Generic => f.write_str("generic shape"),
        }
    }
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Picture(_) => ShapeKind::Picture,
            Self::TextFrame(_) => ShapeKind::TextFrame,
            Self::Generic(_) => ShapeKind::Generic,
        }
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Self::Picture(picture) => picture.placeholder,
            Self::TextFrame(frame) => frame.placeholder,
            Self::Generic(generic) => generic.placeholder,
        }
    }

    pub fn nv(&self) -> Option<&NonVisual> {
        match self {
            Self::Picture(picture) => Some(&picture.nv),
            Self::TextFrame(frame) => Some(&frame.nv),
            Self::Generic(generic) => generic.nv.as_ref(),
        }
    }

    /// Position and size, own or inherited from the layout.
    pub fn effective_geometry(&self) -> Option<Geometry> {
        match self {
            Self::Picture(picture) => picture.effective_geometry(),
            Self::TextFrame(frame) => frame.effective_geometry(),
            Self::Generic(generic) => generic.geometry.or(generic.inherited),
        }
    }

    /// Text of a text frame; other shapes carry none.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::TextFrame(frame) => Some(frame.text()),
            _ => None,
        }
    }

    pub fn as_text_frame(&self) -> Option<&TextFrame> {
        match self {
            Self::TextFrame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match self {
            Self::TextFrame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&Picture> {
        match self {
            Self::Picture(picture) => Some(picture),
            _ => None,
        }
    }

    /// XML the shape was loaded from.
    pub(crate) fn opaque(&self) -> Option<&Opaque> {
        match self {
            Self::Picture(picture) => picture.native.as_ref(),
            Self::TextFrame(frame) => frame.opaque(),
            Self::Generic(generic) => Some(&generic.opaque),
        }
    }

    pub(crate) fn set_inherited(&mut self, geometry: Geometry) {
        match self {
            Self::Picture(picture) => picture.inherited = Some(geometry),
            Self::TextFrame(frame) => frame.inherited = Some(geometry),
            Self::Generic(generic) => generic.inherited = Some(geometry),
        }
    }
}

/// What shape parsing needs from the slide being loaded.
pub(crate) struct ShapeContext<'a, 'p> {
    pub rels: &'a Relationships,
    pub snapshots: &'a mut SnapshotCache<'p>,
    pub origin: &'a Arc<SlideOrigin>,
    pub namespaces: &'a Arc<Vec<(String, String)>>,
}

/// Facts collected from one pass over a shape element.
#[derive(Default)]
struct ShapeScan {
    root: String,
    root_local: Vec<u8>,
    nv: Option<NonVisual>,
    placeholder: Option<Placeholder>,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
    body: Option<(usize, usize)>,
    paragraphs_start: Option<usize>,
    paragraphs_end: Option<usize>,
    empty_body: Option<TextSlot>,
    tail: Option<usize>,
    embed: Option<std::result::Result<String, String>>,
}

impl ShapeScan {
    fn open(&mut self, e: &BytesStart<'_>, stack: &[Vec<u8>], pos: usize) -> Result<()> {
        let local = e.local_name();
        let local = local.as_ref();
        let depth = stack.len();

        if depth == 0 {
            self.root = std::str::from_utf8(e.name().as_ref())?.to_string();
            self.root_local = local.to_vec();
            return Ok(());
        }

        match (depth, local) {
            (2, b"cNvPr") if stack[1].starts_with(b"nv") && self.nv.is_none() => {
                let mut nv = NonVisual::default();
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"id" => nv.id = atoi_simd::parse::<u32>(&attr.value).unwrap_or_default(),
                        b"name" => nv.name = attr_value(&attr)?,
                        b"descr" => nv.descr = Some(attr_value(&attr)?),
                        _ => {},
                    }
                }
                self.nv = Some(nv);
            },
            (3, b"ph") if stack[2] == b"nvPr" => {
                let mut ph_type = None;
                let mut idx = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"type" => ph_type = Some(attr_value(&attr)?),
                        b"idx" => idx = Some(attr_value(&attr)?),
                        _ => {},
                    }
                }
                self.placeholder = Some(Placeholder::from_attrs(ph_type.as_deref(), idx.as_deref()));
            },
            (_, b"off" | b"ext") if self.in_own_xfrm(stack) => {
                let (mut a, mut b) = (None, None);
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"x" | b"cx" => a = parse_i64(&attr.value),
                        b"y" | b"cy" => b = parse_i64(&attr.value),
                        _ => {},
                    }
                }
                if let (Some(a), Some(b)) = (a, b) {
                    if local == b"off" {
                        self.off = Some((a, b));
                    } else {
                        self.ext = Some((a, b));
                    }
                }
            },
            (1, b"txBody") => self.body = Some((pos, pos)),
            (2, b"p") if stack[1] == b"txBody" => {
                self.paragraphs_start.get_or_insert(pos);
            },
            (1, b"extLst") => {
                self.tail.get_or_insert(pos);
            },
            (2, b"blip") if stack[1] == b"blipFill" && self.embed.is_none() => {
                let mut linked = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.prefix().is_none() {
                        continue;
                    }
                    match attr.key.local_name().as_ref() {
                        b"embed" if !attr.value.is_empty() => {
                            self.embed = Some(Ok(attr_value(&attr)?));
                            return Ok(());
                        },
                        b"link" => linked = true,
                        _ => {},
                    }
                }
                if linked {
                    self.embed = Some(Err("image is linked, not embedded".to_string()));
                }
            },
            _ => {},
        }
        Ok(())
    }

    /// `<a:xfrm>` of the shape's own properties, or `<p:xfrm>` of a graphic frame.
    fn in_own_xfrm(&self, stack: &[Vec<u8>]) -> bool {
        match stack.len() {
            3 => stack[2] == b"xfrm" && matches!(stack[1].as_slice(), b"spPr" | b"grpSpPr"),
            2 => stack[1] == b"xfrm" && self.root_local == b"graphicFrame",
            _ => false,
        }
    }

    fn close_body(&mut self, pos: usize, after: usize) {
        if let Some((start, _)) = self.body {
            self.body = Some((start, after));
            self.paragraphs_end = Some(pos);
        }
    }

    fn geometry(&self) -> Option<Geometry> {
        match (self.off, self.ext) {
            (Some((left, top)), Some((width, height))) => Some(Geometry::new(left, top, width, height)),
            _ => None,
        }
    }

    fn prefix(&self) -> &str {
        self.root.split_once(':').map_or("", |(prefix, _)| prefix)
    }

    /// Where paragraphs go when the frame is edited.
    fn text_slot(&self) -> Option<TextSlot> {
        if let Some(slot) = self.empty_body {
            return Some(slot);
        }
        if let Some(end) = self.paragraphs_end {
            let start = self.paragraphs_start.unwrap_or(end);
            return Some(TextSlot {
                start,
                end,
                wrap: false,
            });
        }
        self.tail.map(|at| TextSlot {
            start: at,
            end: at,
            wrap: true,
        })
    }
}

fn scan_shape(raw: &str) -> Result<ShapeScan> {
    let mut reader = Reader::from_str(raw);
    let mut stack: Vec<Vec<u8>> = Vec::with_capacity(8);
    let mut scan = ShapeScan::default();

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                scan.open(&e, &stack, pos)?;
                stack.push(e.local_name().as_ref().to_vec());
            },
            Event::Empty(e) => {
                scan.open(&e, &stack, pos)?;
                if stack.len() == 1 && e.local_name().as_ref() == b"txBody" {
                    let after = reader.buffer_position() as usize;
                    scan.body = None;
                    scan.empty_body = Some(TextSlot {
                        start: pos,
                        end: after,
                        wrap: true,
                    });
                }
            },
            Event::End(e) => {
                stack.pop();
                match stack.len() {
                    0 => {
                        scan.tail.get_or_insert(pos);
                    },
                    1 if e.local_name().as_ref() == b"txBody" => {
                        scan.close_body(pos, reader.buffer_position() as usize);
                    },
                    _ => {},
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }
    Ok(scan)
}

/// Placeholder marker and own transform of a layout or master shape.
pub(crate) fn placeholder_geometry(raw: &str) -> Result<Option<(Placeholder, Option<Geometry>)>> {
    let scan = scan_shape(raw)?;
    Ok(scan.placeholder.map(|ph| (ph, scan.geometry())))
}

/// Parse one child element of `<p:spTree>`.
pub(crate) fn parse_shape(raw: &str, ctx: &mut ShapeContext<'_, '_>) -> Result<Shape> {
    let mut scan = scan_shape(raw)?;
    let resources = referenced_rel_ids(raw, ctx.rels)?
        .iter()
        .filter_map(|r_id| ctx.snapshots.resolve(ctx.rels, r_id))
        .collect();
    let opaque = Opaque {
        xml: raw.to_string(),
        origin: ctx.origin.clone(),
        resources,
        namespaces: ctx.namespaces.clone(),
    };
    let geometry = scan.geometry();

    match scan.root_local.as_slice() {
        b"sp" if scan.body.is_some() || scan.empty_body.is_some() || scan.placeholder.is_some() => {
            if let Some(slot) = scan.text_slot() {
                let body = match scan.body {
                    Some((start, end)) => TextBody::parse(&raw[start..end])?,
                    None => TextBody::default(),
                };
                let prefix = match scan.prefix() {
                    "" => "p".to_string(),
                    prefix => prefix.to_string(),
                };
                let native = NativeText {
                    opaque,
                    slot,
                    prefix,
                };
                return Ok(Shape::TextFrame(TextFrame::from_native(
                    scan.nv.unwrap_or_default(),
                    scan.placeholder,
                    geometry,
                    body,
                    native,
                )));
            }
        },
        b"pic" => {
            let image = resolve_image(ctx, scan.embed.take());
            return Ok(Shape::Picture(Picture::from_native(
                scan.nv.unwrap_or_default(),
                scan.placeholder,
                geometry,
                image,
                opaque,
            )));
        },
        _ => {},
    }

    Ok(Shape::Generic(GenericShape {
        tag: scan.root,
        nv: scan.nv,
        placeholder: scan.placeholder,
        geometry,
        inherited: None,
        opaque,
    }))
}

fn resolve_image(
    ctx: &ShapeContext<'_, '_>,
    embed: Option<std::result::Result<String, String>>,
) -> std::result::Result<ImageData, String> {
    let r_id = match embed {
        Some(embed) => embed?,
        None => return Err("picture has no embedded image".to_string()),
    };
    let rel = ctx
        .rels
        .get(&r_id)
        .ok_or_else(|| format!("image relationship {} not found", r_id))?;
    if rel.is_external() {
        return Err(format!("image {} is external", rel.target_ref()));
    }
    let partname = rel.target_partname().map_err(|e| e.to_string())?;
    let part = ctx
        .snapshots
        .package()
        .get_part(&partname)
        .map_err(|e| e.to_string())?;
    if !part.content_type().starts_with("image/") {
        return Err(format!("{} is not an image ({})", partname, part.content_type()));
    }
    Ok(ImageData {
        blob: part.blob().clone(),
        content_type: part.content_type().to_string(),
        partname,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use crate::ooxml::opc::package::OpcPackage;
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::opc::part::BlobPart;
    use crate::ooxml::pptx::resources::DocumentId;
    use bytes::Bytes;

    fn parse_with(raw: &str, package: &OpcPackage, rels: &Relationships) -> Shape {
        let origin = Arc::new(SlideOrigin {
            document: DocumentId::new(),
            partname: PackURI::new("/ppt/slides/slide1.xml").unwrap(),
        });
        let namespaces = Arc::new(Vec::new());
        let mut snapshots = SnapshotCache::new(package);
        let mut ctx = ShapeContext {
            rels,
            snapshots: &mut snapshots,
            origin: &origin,
            namespaces: &namespaces,
        };
        parse_shape(raw, &mut ctx).unwrap()
    }

    fn parse(raw: &str) -> Shape {
        parse_with(raw, &OpcPackage::new(), &Relationships::new("/ppt/slides".to_string()))
    }

    const TITLE: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>Quarterly review</a:t></a:r></a:p></p:txBody></p:sp>"#;

    #[test]
    fn test_placeholder_text_frame() {
        let shape = parse(TITLE);
        assert_eq!(shape.kind(), ShapeKind::TextFrame);
        assert_eq!(shape.placeholder().unwrap().kind, PlaceholderKind::Title);
        assert_eq!(shape.nv().unwrap().name, "Title 1");
        assert_eq!(shape.text().as_deref(), Some("Quarterly review"));
        assert_eq!(
            shape.effective_geometry(),
            Some(Geometry::new(457200, 274638, 8229600, 1143000))
        );
    }

    #[test]
    fn test_edited_frame_keeps_surrounding_xml() {
        let mut shape = parse(TITLE);
        let frame = shape.as_text_frame_mut().unwrap();
        assert_eq!(frame.to_xml(), TITLE);

        frame.replace_text("Roadmap", ContentRole::Title);
        let xml = frame.to_xml();
        assert!(xml.starts_with(r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/>"#));
        assert!(xml.contains(r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>Roadmap</a:t></a:r></a:p></p:txBody>"#));
        assert!(!xml.contains("Quarterly"));
    }

    #[test]
    fn test_placeholder_without_body_gets_one() {
        let raw = r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:extLst><p:ext uri="x"/></p:extLst></p:sp>"#;
        let mut shape = parse(raw);
        assert_eq!(shape.placeholder().unwrap().kind, PlaceholderKind::Object);
        assert_eq!(shape.text().as_deref(), Some(""));
        assert_eq!(shape.effective_geometry(), None);

        let frame = shape.as_text_frame_mut().unwrap();
        frame.replace_text("Body", ContentRole::Body);
        let xml = frame.to_xml();
        assert!(xml.contains(r#"<p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p>"#));
        assert!(xml.ends_with(r#"</p:txBody><p:extLst><p:ext uri="x"/></p:extLst></p:sp>"#));
    }

    #[test]
    fn test_empty_body_element_is_replaced() {
        let raw = r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Box"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody/></p:sp>"#;
        let mut shape = parse(raw);
        let frame = shape.as_text_frame_mut().unwrap();
        frame.replace_text("x", ContentRole::Body);
        assert_eq!(
            frame.to_xml(),
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Box"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr dirty="0"/><a:t>x</a:t></a:r></a:p></p:txBody></p:sp>"#
        );
    }

    #[test]
    fn test_shape_without_text_is_generic() {
        let raw = r#"<p:sp><p:nvSpPr><p:cNvPr id="7" name="Arrow"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:prstGeom prst="rightArrow"/></p:spPr></p:sp>"#;
        let shape = parse(raw);
        assert_eq!(shape.kind(), ShapeKind::Generic);
        assert_eq!(shape.text(), None);
    }

    #[test]
    fn test_graphic_frame_geometry() {
        let raw = r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="4" name="Table 3"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></p:xfrm><a:graphic><a:graphicData uri="tbl"><a:tbl><a:tr h="1"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;
        let shape = parse(raw);
        assert_eq!(shape.kind(), ShapeKind::Generic);
        assert_eq!(shape.effective_geometry(), Some(Geometry::new(1, 2, 3, 4)));
        match shape {
            Shape::Generic(generic) => assert_eq!(generic.tag, "p:graphicFrame"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_picture_resolves_image() {
        let mut package = OpcPackage::new();
        package.add_part(Box::new(BlobPart::new(
            PackURI::new("/ppt/media/image1.png").unwrap(),
            ct::PNG.to_string(),
            Bytes::from_static(b"\x89PNG-bytes"),
        )));
        let mut rels = Relationships::new("/ppt/slides".to_string());
        rels.add_relationship(rt::IMAGE.to_string(), "../media/image1.png".to_string(), "rId2".to_string(), false);

        let raw = r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture 4" descr="chart.png"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr></p:pic>"#;
        let shape = parse_with(raw, &package, &rels);
        let picture = shape.as_picture().unwrap();
        assert_eq!(picture.image().unwrap().blob.as_ref(), b"\x89PNG-bytes");
        assert_eq!(picture.nv.descr.as_deref(), Some("chart.png"));
        assert_eq!(picture.effective_geometry(), Some(Geometry::new(10, 20, 30, 40)));
        assert_eq!(shape.opaque().unwrap().resources.len(), 1);
    }

    #[test]
    fn test_picture_failures() {
        let linked = r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Linked"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:link="rId9"/></p:blipFill><p:spPr/></p:pic>"#;
        let shape = parse(linked);
        assert!(shape.as_picture().unwrap().image().unwrap_err().contains("linked"));

        let dangling = r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Broken"/><p:cNvPicPr/><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr/></p:pic>"#;
        let shape = parse(dangling);
        assert_eq!(shape.placeholder().unwrap().kind, PlaceholderKind::Picture);
        assert!(shape.as_picture().unwrap().image().unwrap_err().contains("rId9"));
    }
}
