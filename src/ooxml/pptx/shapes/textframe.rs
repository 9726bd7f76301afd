/// Text frames: `<p:sp>` shapes and the DrawingML text they carry.
///
/// Only the formatting that survives a transplant is modeled: alignment and
/// level on paragraphs; language, bold, italic, underline, explicit size and
/// flat RGB color on runs. Fields (`<a:fld>`) keep their id and type so slide
/// numbers and dates stay live. Everything else stays in the native XML of
/// the shape.
use crate::ooxml::error::Result;
use crate::ooxml::pptx::shapes::base::{Geometry, NonVisual, Placeholder, parse_i64};
use crate::ooxml::pptx::shapes::opaque::Opaque;
use crate::ooxml::xml::{attr_value, esc, general_ref, text_value};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as _;

/// Paragraph alignment (ST_TextAlignType).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    JustifyLow,
    Distributed,
    ThaiDistributed,
}

impl Alignment {
    pub fn from_schema(token: &str) -> Option<Self> {
        match token {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" => Some(Self::Justify),
            "justLow" => Some(Self::JustifyLow),
            "dist" => Some(Self::Distributed),
            "thaiDist" => Some(Self::ThaiDistributed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
            Self::JustifyLow => "justLow",
            Self::Distributed => "dist",
            Self::ThaiDistributed => "thaiDist",
        }
    }
}

/// Underline style of a run (ST_TextUnderlineType).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnderlineStyle {
    None,
    Single,
    Double,
    /// Any other schema token (`wavy`, `dotted`, `heavy`, ...), kept verbatim
    Styled(String),
}

impl UnderlineStyle {
    pub fn from_schema(token: &str) -> Self {
        match token {
            "none" => Self::None,
            "sng" => Self::Single,
            "dbl" => Self::Double,
            other => Self::Styled(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Single => "sng",
            Self::Double => "dbl",
            Self::Styled(token) => token,
        }
    }
}

/// A flat sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    /// Parse a `RRGGBB` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// A field run such as a slide number or date, refreshed by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextField {
    pub id: String,
    /// `slidenum`, `datetime1`, ...
    pub kind: Option<String>,
}

/// Smallest styled span of text. Unset properties inherit from the shape,
/// layout and master defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    pub text: String,
    /// Set when the run is an `<a:fld>`; `text` is then its last rendered value
    pub field: Option<TextField>,
    pub lang: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<UnderlineStyle>,
    /// Font size in hundredths of a point
    pub size: Option<u32>,
    pub color: Option<RgbColor>,
}

impl Run {
    /// A run with no explicit formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn write_xml(&self, out: &mut String) {
        if let Some(ref field) = self.field {
            let _ = write!(out, r#"<a:fld id="{}""#, esc(&field.id));
            if let Some(ref kind) = field.kind {
                let _ = write!(out, r#" type="{}""#, esc(kind));
            }
            out.push('>');
            self.write_props(out);
            let _ = write!(out, "<a:t>{}</a:t></a:fld>", esc(&self.text));
            return;
        }

        // Line breaks live between runs as <a:br/>
        for (i, segment) in self.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("<a:br/>");
            }
            // A run that is empty as a whole is still written
            if segment.is_empty() && !self.text.is_empty() {
                continue;
            }
            out.push_str("<a:r>");
            self.write_props(out);
            let _ = write!(out, "<a:t>{}</a:t></a:r>", esc(segment));
        }
    }

    fn write_props(&self, out: &mut String) {
        out.push_str("<a:rPr");
        if let Some(ref lang) = self.lang {
            let _ = write!(out, r#" lang="{}""#, esc(lang));
        }
        if let Some(size) = self.size {
            let _ = write!(out, r#" sz="{}""#, size);
        }
        if let Some(bold) = self.bold {
            let _ = write!(out, r#" b="{}""#, u8::from(bold));
        }
        if let Some(italic) = self.italic {
            let _ = write!(out, r#" i="{}""#, u8::from(italic));
        }
        if let Some(ref underline) = self.underline {
            let _ = write!(out, r#" u="{}""#, esc(underline.as_str()));
        }
        out.push_str(r#" dirty="0""#);
        match self.color {
            Some(color) => {
                let _ = write!(
                    out,
                    r#"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr>"#,
                    color.to_hex()
                );
            },
            None => out.push_str("/>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub alignment: Option<Alignment>,
    /// Outline (bullet) level, 0 to 8
    pub level: Option<u32>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<a:p>");
        if self.alignment.is_some() || self.level.is_some() {
            out.push_str("<a:pPr");
            if let Some(level) = self.level {
                let _ = write!(out, r#" lvl="{}""#, level);
            }
            if let Some(alignment) = self.alignment {
                let _ = write!(out, r#" algn="{}""#, alignment.as_str());
            }
            out.push_str("/>");
        }
        for run in &self.runs {
            run.write_xml(out);
        }
        out.push_str("</a:p>");
    }
}

/// Text insets of a body, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: Option<i64>,
    pub top: Option<i64>,
    pub right: Option<i64>,
    pub bottom: Option<i64>,
}

/// The `<p:txBody>` of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBody {
    pub word_wrap: Option<bool>,
    pub margins: Margins,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBody {
    /// Parse a `<p:txBody>` element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut body = TextBody::default();
        let mut stack: Vec<Vec<u8>> = Vec::with_capacity(8);

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    body.open(&e, &stack)?;
                    stack.push(e.local_name().as_ref().to_vec());
                },
                Event::Empty(e) => body.open(&e, &stack)?,
                Event::End(_) => {
                    stack.pop();
                },
                Event::Text(e) if in_text(&stack) => {
                    let text = text_value(&e)?;
                    body.push_text(&text);
                },
                Event::GeneralRef(e) if in_text(&stack) => {
                    let text = general_ref(&e)?;
                    body.push_text(&text);
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(body)
    }

    fn open(&mut self, e: &BytesStart<'_>, stack: &[Vec<u8>]) -> Result<()> {
        let parent = stack.last().map(Vec::as_slice);
        match (e.local_name().as_ref(), parent) {
            (b"bodyPr", _) => {
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"wrap" => self.word_wrap = Some(attr.value.as_ref() != b"none"),
                        b"lIns" => self.margins.left = parse_i64(&attr.value),
                        b"tIns" => self.margins.top = parse_i64(&attr.value),
                        b"rIns" => self.margins.right = parse_i64(&attr.value),
                        b"bIns" => self.margins.bottom = parse_i64(&attr.value),
                        _ => {},
                    }
                }
            },
            (b"p", _) => self.paragraphs.push(Paragraph::default()),
            (b"pPr", Some(b"p")) => {
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.local_name().as_ref() {
                            b"algn" => paragraph.alignment = Alignment::from_schema(&attr_value(&attr)?),
                            b"lvl" => {
                                paragraph.level = atoi_simd::parse::<u32>(&attr.value).ok();
                            },
                            _ => {},
                        }
                    }
                }
            },
            (b"r", Some(b"p")) => {
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    paragraph.runs.push(Run::default());
                }
            },
            (b"fld", Some(b"p")) => {
                let mut field = TextField::default();
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"id" => field.id = attr_value(&attr)?,
                        b"type" => field.kind = Some(attr_value(&attr)?),
                        _ => {},
                    }
                }
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    paragraph.runs.push(Run {
                        field: Some(field),
                        ..Run::default()
                    });
                }
            },
            (b"rPr", Some(b"r" | b"fld")) => {
                if let Some(run) = self.current_run() {
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.local_name().as_ref() {
                            b"lang" => run.lang = Some(attr_value(&attr)?),
                            b"b" => run.bold = parse_bool(&attr.value),
                            b"i" => run.italic = parse_bool(&attr.value),
                            b"u" => run.underline = Some(UnderlineStyle::from_schema(&attr_value(&attr)?)),
                            b"sz" => run.size = atoi_simd::parse::<u32>(&attr.value).ok(),
                            _ => {},
                        }
                    }
                }
            },
            (b"srgbClr", Some(b"solidFill")) if stack.len() >= 2 && stack[stack.len() - 2] == b"rPr" => {
                if let Some(run) = self.current_run() {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.local_name().as_ref() == b"val" {
                            run.color = RgbColor::from_hex(&attr_value(&attr)?);
                        }
                    }
                }
            },
            (b"br", Some(b"p")) => {
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    match paragraph.runs.last_mut() {
                        Some(run) if run.field.is_none() => run.text.push('\n'),
                        _ => paragraph.runs.push(Run::plain("\n")),
                    }
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn current_run(&mut self) -> Option<&mut Run> {
        self.paragraphs.last_mut().and_then(|p| p.runs.last_mut())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.current_run() {
            run.text.push_str(text);
        }
    }

    /// Text of all paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize only the paragraphs, at least one `<a:p>` as the schema requires.
    pub fn paragraphs_xml(&self) -> String {
        let mut out = String::with_capacity(64 + self.paragraphs.len() * 128);
        if self.paragraphs.is_empty() {
            out.push_str("<a:p/>");
        }
        for paragraph in &self.paragraphs {
            paragraph.write_xml(&mut out);
        }
        out
    }

    /// Serialize the whole body as `<{prefix}:txBody>`.
    pub fn to_xml(&self, prefix: &str) -> String {
        let mut out = String::with_capacity(256);
        let _ = write!(out, "<{prefix}:txBody><a:bodyPr");
        if let Some(wrap) = self.word_wrap {
            let _ = write!(out, r#" wrap="{}""#, if wrap { "square" } else { "none" });
        }
        for (name, value) in [
            ("lIns", self.margins.left),
            ("tIns", self.margins.top),
            ("rIns", self.margins.right),
            ("bIns", self.margins.bottom),
        ] {
            if let Some(value) = value {
                let _ = write!(out, r#" {}="{}""#, name, value);
            }
        }
        out.push_str("/><a:lstStyle/>");
        out.push_str(&self.paragraphs_xml());
        let _ = write!(out, "</{prefix}:txBody>");
        out
    }
}

fn in_text(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|name| name == b"t")
}

fn parse_bool(value: &[u8]) -> Option<bool> {
    match value {
        b"1" | b"true" | b"on" => Some(true),
        b"0" | b"false" | b"off" => Some(false),
        _ => None,
    }
}

/// Which content the placement engine last wrote into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRole {
    Title,
    Body,
}

/// Byte range of a native shape's XML that holds its paragraphs.
///
/// With `wrap` set the range holds no usable body (missing or empty
/// `<p:txBody/>`) and a complete body is written in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextSlot {
    pub start: usize,
    pub end: usize,
    pub wrap: bool,
}

/// XML a text frame was loaded from, kept so edits only touch the paragraphs.
#[derive(Debug, Clone)]
pub(crate) struct NativeText {
    pub opaque: Opaque,
    pub slot: TextSlot,
    /// Prefix of the shape element, used for a new `txBody`
    pub prefix: String,
}

/// A shape with a text body.
#[derive(Debug, Clone)]
pub struct TextFrame {
    pub nv: NonVisual,
    pub placeholder: Option<Placeholder>,
    /// Transform set on the shape itself
    pub geometry: Option<Geometry>,
    /// Transform inherited from the layout or master placeholder
    pub inherited: Option<Geometry>,
    pub body: TextBody,
    pub(crate) native: Option<NativeText>,
    dirty: bool,
    filled_as: Option<ContentRole>,
}

impl TextFrame {
    /// A new text box that will be written from the model alone.
    pub fn new(nv: NonVisual, geometry: Option<Geometry>, body: TextBody) -> Self {
        Self {
            nv,
            placeholder: None,
            geometry,
            inherited: None,
            body,
            native: None,
            dirty: true,
            filled_as: None,
        }
    }

    pub(crate) fn from_native(
        nv: NonVisual,
        placeholder: Option<Placeholder>,
        geometry: Option<Geometry>,
        body: TextBody,
        native: NativeText,
    ) -> Self {
        Self {
            nv,
            placeholder,
            geometry,
            inherited: None,
            body,
            native: Some(native),
            dirty: false,
            filled_as: None,
        }
    }

    /// Own transform, falling back to the inherited one.
    pub fn effective_geometry(&self) -> Option<Geometry> {
        self.geometry.or(self.inherited)
    }

    pub fn text(&self) -> String {
        self.body.text()
    }

    /// Replace all paragraphs with a single unformatted run holding `text`,
    /// or with one empty paragraph when `text` is empty.
    ///
    /// The first paragraph's alignment and level are kept so the text still
    /// sits where the layout intends, and its language stays with the run.
    pub fn replace_text(&mut self, text: &str, role: ContentRole) {
        let first = self.body.paragraphs.first();
        let lang = first
            .and_then(|p| p.runs.iter().find_map(|run| run.lang.clone()));
        let paragraph = Paragraph {
            alignment: first.and_then(|p| p.alignment),
            level: first.and_then(|p| p.level),
            runs: if text.is_empty() {
                Vec::new()
            } else {
                vec![Run {
                    lang,
                    ..Run::plain(text)
                }]
            },
        };
        self.body.paragraphs = vec![paragraph];
        self.dirty = true;
        self.filled_as = Some(role);
    }

    pub fn filled_as(&self) -> Option<ContentRole> {
        self.filled_as
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn opaque(&self) -> Option<&Opaque> {
        self.native.as_ref().map(|native| &native.opaque)
    }

    /// XML for this frame. Untouched native frames are returned verbatim,
    /// edited native frames get their paragraphs spliced in, new frames are
    /// written as text boxes.
    pub(crate) fn to_xml(&self) -> String {
        match &self.native {
            Some(native) if !self.dirty => native.opaque.xml.clone(),
            Some(native) => {
                let raw = &native.opaque.xml;
                let slot = native.slot;
                let replacement = if slot.wrap {
                    self.body.to_xml(&native.prefix)
                } else {
                    self.body.paragraphs_xml()
                };
                let mut xml = String::with_capacity(raw.len() + replacement.len());
                xml.push_str(&raw[..slot.start]);
                xml.push_str(&replacement);
                xml.push_str(&raw[slot.end..]);
                xml
            },
            None => self.text_box_xml(),
        }
    }

    fn text_box_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        let _ = write!(
            xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}""#,
            self.nv.id,
            esc(&self.nv.name)
        );
        if let Some(ref descr) = self.nv.descr {
            let _ = write!(xml, r#" descr="{}""#, esc(descr));
        }
        xml.push_str(r#"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
        if let Some(geometry) = self.effective_geometry() {
            xml.push_str(&geometry.to_xml("a"));
        }
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
        xml.push_str(&self.body.to_xml("p"));
        xml.push_str("</p:sp>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<p:txBody><a:bodyPr wrap="none" lIns="91440" tIns="0" rIns="91440" bIns="45720"/><a:lstStyle/><a:p><a:pPr lvl="1" algn="ctr"/><a:r><a:rPr lang="en-US" sz="2400" b="1" i="0" u="sng" dirty="0"><a:ln><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill></a:ln><a:solidFill><a:srgbClr val="ff0000"/></a:solidFill></a:rPr><a:t>Fish &amp; chips</a:t></a:r><a:br><a:rPr lang="en-US"/></a:br><a:r><a:t>second line</a:t></a:r></a:p><a:p><a:fld id="{1}" type="slidenum"><a:rPr lang="en-US"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill></a:rPr><a:t>7</a:t></a:fld></a:p></p:txBody>"#;

    #[test]
    fn test_parse_body() {
        let body = TextBody::parse(BODY).unwrap();
        assert_eq!(body.word_wrap, Some(false));
        assert_eq!(body.margins.left, Some(91440));
        assert_eq!(body.margins.top, Some(0));
        assert_eq!(body.margins.bottom, Some(45720));
        assert_eq!(body.paragraphs.len(), 2);

        let first = &body.paragraphs[0];
        assert_eq!(first.alignment, Some(Alignment::Center));
        assert_eq!(first.level, Some(1));
        assert_eq!(first.runs.len(), 2);

        let run = &first.runs[0];
        assert_eq!(run.text, "Fish & chips\n");
        assert_eq!(run.bold, Some(true));
        assert_eq!(run.italic, Some(false));
        assert_eq!(run.underline, Some(UnderlineStyle::Single));
        assert_eq!(run.size, Some(2400));
        assert_eq!(run.color, Some(RgbColor([0xFF, 0, 0])));

        let plain = &first.runs[1];
        assert_eq!(plain.size, None);
        assert_eq!(plain.bold, None);

        assert_eq!(run.lang.as_deref(), Some("en-US"));
        assert_eq!(plain.lang, None);

        // Scheme colors aren't carried
        let slide_number = &body.paragraphs[1].runs[0];
        assert_eq!(slide_number.color, None);
        assert_eq!(
            slide_number.field,
            Some(TextField {
                id: "{1}".to_string(),
                kind: Some("slidenum".to_string()),
            })
        );
        assert_eq!(body.text(), "Fish & chips\nsecond line\n7");
    }

    #[test]
    fn test_body_survives_reserialization() {
        let body = TextBody::parse(BODY).unwrap();
        let xml = body.to_xml("p");
        let reparsed = TextBody::parse(&xml).unwrap();
        assert_eq!(reparsed, body);
        assert!(xml.contains("<a:br/>"));
        assert!(xml.contains("Fish &amp; chips"));
        assert!(xml.contains(r#"<a:fld id="{1}" type="slidenum"><a:rPr lang="en-US" dirty="0"/><a:t>7</a:t></a:fld>"#));
    }

    #[test]
    fn test_empty_runs_are_kept() {
        let xml = r#"<p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="de-DE"/><a:t></a:t></a:r><a:r><a:rPr lang="de-DE"/><a:t>Hallo</a:t></a:r></a:p></p:txBody>"#;
        let body = TextBody::parse(xml).unwrap();
        assert_eq!(body.paragraphs[0].runs.len(), 2);

        let written = body.to_xml("p");
        assert_eq!(written.matches("<a:r>").count(), 2);
        assert!(!written.contains("en-US"));
        assert_eq!(TextBody::parse(&written).unwrap(), body);
    }

    #[test]
    fn test_field_followed_by_line_break() {
        let xml = r#"<p:txBody><a:bodyPr/><a:p><a:fld id="{2}" type="datetime1"><a:t>19.10.2026</a:t></a:fld><a:br/><a:r><a:t>next</a:t></a:r></a:p></p:txBody>"#;
        let body = TextBody::parse(xml).unwrap();
        let runs = &body.paragraphs[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text, "19.10.2026");
        assert_eq!(runs[1].text, "\n");
        assert_eq!(body.text(), "19.10.2026\nnext");
        assert_eq!(TextBody::parse(&body.to_xml("p")).unwrap(), body);
    }

    #[test]
    fn test_empty_body_still_has_paragraph() {
        let body = TextBody::default();
        assert_eq!(body.paragraphs_xml(), "<a:p/>");
        assert_eq!(body.text(), "");
    }

    #[test]
    fn test_replace_text_keeps_alignment_only() {
        let mut frame = TextFrame::new(NonVisual::default(), None, TextBody::parse(BODY).unwrap());
        frame.replace_text("Agenda", ContentRole::Title);

        assert_eq!(frame.body.paragraphs.len(), 1);
        let paragraph = &frame.body.paragraphs[0];
        assert_eq!(paragraph.alignment, Some(Alignment::Center));
        assert_eq!(
            paragraph.runs,
            vec![Run {
                lang: Some("en-US".to_string()),
                ..Run::plain("Agenda")
            }]
        );
        assert_eq!(frame.filled_as(), Some(ContentRole::Title));
        assert_eq!(frame.text(), "Agenda");

        frame.replace_text("", ContentRole::Body);
        assert_eq!(frame.body.paragraphs.len(), 1);
        assert!(frame.body.paragraphs[0].runs.is_empty());
        assert_eq!(frame.text(), "");
    }

    #[test]
    fn test_rgb_color() {
        assert_eq!(RgbColor::from_hex("1F497D"), Some(RgbColor([0x1F, 0x49, 0x7D])));
        assert_eq!(RgbColor([0x1F, 0x49, 0x7D]).to_hex(), "1F497D");
        assert_eq!(RgbColor::from_hex("12345"), None);
        assert_eq!(RgbColor::from_hex("GGGGGG"), None);
    }
}
