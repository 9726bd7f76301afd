//! In-memory decks for tests.

use crate::ooxml::opc::constants::{content_type as ct, namespace as ns, relationship_type as rt};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use std::fmt::Write as _;

type Rel = (String, String, String);

struct ExtraPart {
    partname: String,
    content_type: String,
    blob: Vec<u8>,
    rels: Vec<Rel>,
}

/// Builds a minimal but complete `.pptx`: one master, one layout, one theme
/// and the slides added.
pub(crate) struct DeckBuilder {
    slides: Vec<(String, Vec<Rel>)>,
    layout_shapes: String,
    master_shapes: String,
    extra: Vec<ExtraPart>,
    main_content_type: String,
}

pub(crate) const MASTER_TITLE: (i64, i64, i64, i64) = (457200, 274638, 8229600, 1143000);
pub(crate) const MASTER_BODY: (i64, i64, i64, i64) = (457200, 1600200, 8229600, 4525963);

impl DeckBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            layout_shapes: format!(
                "{}{}",
                text_shape(2, "Title 1", Some(r#"type="title""#), None, ""),
                text_shape(3, "Content Placeholder 2", Some(r#"idx="1""#), None, ""),
            ),
            master_shapes: format!(
                "{}{}",
                text_shape(2, "Title Placeholder 1", Some(r#"type="title""#), Some(MASTER_TITLE), ""),
                text_shape(3, "Text Placeholder 2", Some(r#"type="body" idx="1""#), Some(MASTER_BODY), ""),
            ),
            extra: Vec::new(),
            main_content_type: ct::PML_PRESENTATION_MAIN.to_string(),
        }
    }

    pub fn slide(self, shapes: &str) -> Self {
        self.slide_with_rels(shapes, &[])
    }

    /// Add a slide. `rels` are `(rId, type, target)` next to the layout
    /// relationship, which always is `rId1`.
    pub fn slide_with_rels(mut self, shapes: &str, rels: &[(&str, &str, &str)]) -> Self {
        self.slides.push((shapes.to_string(), owned(rels)));
        self
    }

    pub fn layout_shapes(mut self, shapes: &str) -> Self {
        self.layout_shapes = shapes.to_string();
        self
    }

    /// Add `/ppt/media/{name}`.
    pub fn media(self, name: &str, blob: &[u8]) -> Self {
        let content_type = match name.rsplit('.').next() {
            Some("png") => ct::PNG,
            Some("jpeg" | "jpg") => ct::JPEG,
            Some("gif") => ct::GIF,
            _ => "application/octet-stream",
        };
        self.part(&format!("/ppt/media/{}", name), content_type, blob, &[])
    }

    pub fn part(mut self, partname: &str, content_type: &str, blob: &[u8], rels: &[(&str, &str, &str)]) -> Self {
        self.extra.push(ExtraPart {
            partname: partname.to_string(),
            content_type: content_type.to_string(),
            blob: blob.to_vec(),
            rels: owned(rels),
        });
        self
    }

    pub fn main_content_type(mut self, content_type: &str) -> Self {
        self.main_content_type = content_type.to_string();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = PhysPkgWriter::new();
        let n = self.slides.len();

        let mut types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        let mut add_override = |partname: &str, content_type: &str| {
            let _ = write!(types, r#"<Override PartName="{}" ContentType="{}"/>"#, partname, content_type);
        };
        add_override("/ppt/presentation.xml", &self.main_content_type);
        for i in 1..=n {
            add_override(&format!("/ppt/slides/slide{}.xml", i), ct::PML_SLIDE);
        }
        add_override("/ppt/slideLayouts/slideLayout1.xml", ct::PML_SLIDE_LAYOUT);
        add_override("/ppt/slideMasters/slideMaster1.xml", ct::PML_SLIDE_MASTER);
        add_override("/ppt/theme/theme1.xml", ct::OFC_THEME);
        for part in &self.extra {
            add_override(&part.partname, &part.content_type);
        }
        types.push_str("</Types>");
        writer.write_member("[Content_Types].xml", types.as_bytes()).unwrap();

        writer
            .write_member(
                "_rels/.rels",
                rels_xml(&[("rId1".into(), rt::OFFICE_DOCUMENT.into(), "ppt/presentation.xml".into())]).as_bytes(),
            )
            .unwrap();

        // presentation
        let mut sld_ids = String::new();
        let mut pres_rels = vec![(
            "rId1".to_string(),
            rt::SLIDE_MASTER.to_string(),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for i in 0..n {
            let _ = write!(sld_ids, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2);
            pres_rels.push((format!("rId{}", i + 2), rt::SLIDE.to_string(), format!("slides/slide{}.xml", i + 1)));
        }
        pres_rels.push((format!("rId{}", n + 2), rt::THEME.to_string(), "theme/theme1.xml".to_string()));
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            a = ns::DML_MAIN,
            r = ns::OFC_RELATIONSHIPS,
            p = ns::PML_MAIN,
        );
        writer.write_member("ppt/presentation.xml", presentation.as_bytes()).unwrap();
        writer
            .write_member("ppt/_rels/presentation.xml.rels", rels_xml(&pres_rels).as_bytes())
            .unwrap();

        // slides
        for (i, (shapes, rels)) in self.slides.iter().enumerate() {
            let mut all = vec![(
                "rId1".to_string(),
                rt::SLIDE_LAYOUT.to_string(),
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            all.extend(rels.iter().cloned());
            writer
                .write_member(&format!("ppt/slides/slide{}.xml", i + 1), slide_xml(shapes).as_bytes())
                .unwrap();
            writer
                .write_member(&format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), rels_xml(&all).as_bytes())
                .unwrap();
        }

        // layout, master, theme
        let layout = tree_part("sldLayout", &self.layout_shapes, "");
        writer.write_member("ppt/slideLayouts/slideLayout1.xml", layout.as_bytes()).unwrap();
        writer
            .write_member(
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                rels_xml(&[(
                    "rId1".into(),
                    rt::SLIDE_MASTER.into(),
                    "../slideMasters/slideMaster1.xml".into(),
                )])
                .as_bytes(),
            )
            .unwrap();
        let master = tree_part(
            "sldMaster",
            &self.master_shapes,
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
        );
        writer.write_member("ppt/slideMasters/slideMaster1.xml", master.as_bytes()).unwrap();
        writer
            .write_member(
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                rels_xml(&[
                    ("rId1".into(), rt::SLIDE_LAYOUT.into(), "../slideLayouts/slideLayout1.xml".into()),
                    ("rId2".into(), rt::THEME.into(), "../theme/theme1.xml".into()),
                ])
                .as_bytes(),
            )
            .unwrap();
        writer.write_member("ppt/theme/theme1.xml", THEME.as_bytes()).unwrap();

        for part in &self.extra {
            let member = &part.partname[1..];
            writer.write_member(member, &part.blob).unwrap();
            if !part.rels.is_empty() {
                let (dir, file) = member.rsplit_once('/').unwrap();
                writer
                    .write_member(&format!("{}/_rels/{}.rels", dir, file), rels_xml(&part.rels).as_bytes())
                    .unwrap();
            }
        }

        writer.finish().unwrap()
    }
}

fn owned(rels: &[(&str, &str, &str)]) -> Vec<Rel> {
    rels.iter()
        .map(|(id, reltype, target)| (id.to_string(), reltype.to_string(), target.to_string()))
        .collect()
}

fn rels_xml(rels: &[Rel]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, reltype, target) in rels {
        let mode = if target.starts_with("http") {
            r#" TargetMode="External""#
        } else {
            ""
        };
        let _ = write!(xml, r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#, id, reltype, target, mode);
    }
    xml.push_str("</Relationships>");
    xml
}

const TREE_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

pub(crate) fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        ns::DML_MAIN,
        ns::OFC_RELATIONSHIPS,
        ns::PML_MAIN,
        TREE_HEADER,
        shapes
    )
}

fn tree_part(root: &str, shapes: &str, trailer: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:{root} xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld>{trailer}</p:{root}>"#,
        ns::DML_MAIN,
        ns::OFC_RELATIONSHIPS,
        ns::PML_MAIN,
        TREE_HEADER,
        shapes
    )
}

fn xfrm(geometry: Option<(i64, i64, i64, i64)>) -> String {
    geometry
        .map(|(x, y, cx, cy)| format!(r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#))
        .unwrap_or_default()
}

/// `<p:sp>` with one plain paragraph per line of `text`.
pub(crate) fn text_shape(
    id: u32,
    name: &str,
    ph: Option<&str>,
    geometry: Option<(i64, i64, i64, i64)>,
    text: &str,
) -> String {
    let mut paragraphs = String::new();
    if text.is_empty() {
        paragraphs.push_str(r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#);
    }
    for line in text.split('\n').filter(|line| !line.is_empty()) {
        let _ = write!(paragraphs, r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#, line);
    }
    body_shape(id, name, ph, geometry, &format!("<a:bodyPr/><a:lstStyle/>{}", paragraphs))
}

/// `<p:sp>` around the given `<p:txBody>` content.
pub(crate) fn body_shape(
    id: u32,
    name: &str,
    ph: Option<&str>,
    geometry: Option<(i64, i64, i64, i64)>,
    body: &str,
) -> String {
    let nv_pr = match ph {
        Some(attrs) => format!("<p:nvPr><p:ph {}/></p:nvPr>", attrs),
        None => "<p:nvPr/>".to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/>{nv_pr}</p:nvSpPr><p:spPr>{}</p:spPr><p:txBody>{body}</p:txBody></p:sp>"#,
        xfrm(geometry)
    )
}

pub(crate) fn picture_shape(id: u32, r_id: &str, geometry: (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        xfrm(Some(geometry))
    )
}

pub(crate) fn table_shape(id: u32, geometry: (i64, i64, i64, i64)) -> String {
    let (x, y, cx, cy) = geometry;
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblGrid><a:gridCol w="{cx}"/></a:tblGrid><a:tr h="{cy}"><a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

pub(crate) const CHART_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
pub(crate) const CHART_RELTYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
pub(crate) const CHART_CT: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";

pub(crate) fn chart_shape(id: u32, r_id: &str, geometry: (i64, i64, i64, i64)) -> String {
    let (x, y, cx, cy) = geometry;
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Chart {id}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm><a:graphic><a:graphicData uri="{CHART_NS}"><c:chart xmlns:c="{CHART_NS}" r:id="{r_id}"/></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

/// Bytes with a PNG signature, distinct per `tag`.
pub(crate) fn png(tag: u8) -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, tag, tag, 0, 1]
}

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"/></a:themeElements></a:theme>"#;
