/// Presentation part: the slide list and slide size of a deck.
use crate::ooxml::error::Result;
use crate::ooxml::pptx::shapes::base::parse_i64;
use crate::ooxml::xml::attr_value;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;
use std::ops::Range;

/// An entry of `<p:sldIdLst>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    pub id: u32,
    pub r_id: String,
}

/// What the deck needs from `presentation.xml`.
#[derive(Debug, Clone, Default)]
pub struct PresentationInfo {
    /// Slides in presentation order
    pub slides: Vec<SlideRef>,
    /// Slide width and height in EMUs
    pub slide_size: Option<(i64, i64)>,
}

impl PresentationInfo {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut info = Self::default();
        let mut in_slide_list = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"sldIdLst" => in_slide_list = true,
                Event::End(e) if e.local_name().as_ref() == b"sldIdLst" => in_slide_list = false,
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"sldId" if in_slide_list => {
                        let (id, r_id) = slide_id_attrs(&e)?;
                        if let (Some(id), Some(r_id)) = (id, r_id) {
                            info.slides.push(SlideRef { id, r_id });
                        }
                    },
                    b"sldSz" => {
                        let (mut cx, mut cy) = (None, None);
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"cx" => cx = parse_i64(&attr.value),
                                b"cy" => cy = parse_i64(&attr.value),
                                _ => {},
                            }
                        }
                        info.slide_size = cx.zip(cy);
                    },
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(info)
    }
}

/// Unprefixed `id` and prefixed relationship `id` of a slide reference.
fn slide_id_attrs(e: &BytesStart<'_>) -> Result<(Option<u32>, Option<String>)> {
    let mut id = None;
    let mut r_id = None;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() != b"id" {
            continue;
        }
        if attr.key.prefix().is_some() {
            r_id = Some(attr_value(&attr)?);
        } else {
            id = atoi_simd::parse::<u32>(&attr.value).ok();
        }
    }
    Ok((id, r_id))
}

/// Remove every reference to `removed` slides from `presentation.xml`: the
/// `sldId` entries, section membership (`p14:sldId`) and custom show
/// members (`p:sld`).
pub(crate) fn remove_slide_refs(xml: &str, removed: &[SlideRef]) -> Result<String> {
    let ids: HashSet<u32> = removed.iter().map(|r| r.id).collect();
    let r_ids: HashSet<&str> = removed.iter().map(|r| r.r_id.as_str()).collect();

    let mut reader = Reader::from_str(xml);
    let mut cuts: Vec<Range<usize>> = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    let mut depth = 0usize;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                if open.is_none() && references_removed(&e, &ids, &r_ids)? {
                    open = Some((pos, depth));
                }
                depth += 1;
            },
            Event::Empty(e) => {
                if open.is_none() && references_removed(&e, &ids, &r_ids)? {
                    cuts.push(pos..reader.buffer_position() as usize);
                }
            },
            Event::End(_) => {
                depth -= 1;
                if let Some((start, at)) = open
                    && at == depth
                {
                    cuts.push(start..reader.buffer_position() as usize);
                    open = None;
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    let mut out = String::with_capacity(xml.len());
    let mut from = 0;
    for cut in cuts {
        out.push_str(&xml[from..cut.start]);
        from = cut.end;
    }
    out.push_str(&xml[from..]);
    Ok(out)
}

fn references_removed(e: &BytesStart<'_>, ids: &HashSet<u32>, r_ids: &HashSet<&str>) -> Result<bool> {
    let local = e.local_name();
    if !matches!(local.as_ref(), b"sldId" | b"sld") {
        return Ok(false);
    }
    let (id, r_id) = slide_id_attrs(e)?;
    if let Some(r_id) = r_id {
        return Ok(r_ids.contains(r_id.as_str()));
    }
    Ok(local.as_ref() == b"sldId" && id.is_some_and(|id| ids.contains(&id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION: &str = r#"<p:presentation xmlns:p="urn:p" xmlns:r="urn:r" xmlns:p14="urn:p14"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/><p:sldId id="258" r:id="rId4"/></p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:custShowLst><p:custShow name="short" id="0"><p:sldLst><p:sld r:id="rId2"/><p:sld r:id="rId4"/></p:sldLst></p:custShow></p:custShowLst><p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst><p14:section name="Default"><p14:sldIdLst><p14:sldId id="256"/><p14:sldId id="257"/><p14:sldId id="258"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst></p:presentation>"#;

    #[test]
    fn test_parse() {
        let info = PresentationInfo::parse(PRESENTATION).unwrap();
        assert_eq!(info.slides.len(), 3);
        assert_eq!(
            info.slides[1],
            SlideRef {
                id: 257,
                r_id: "rId3".to_string()
            }
        );
        assert_eq!(info.slide_size, Some((12192000, 6858000)));
    }

    #[test]
    fn test_remove_slide_refs() {
        let info = PresentationInfo::parse(PRESENTATION).unwrap();
        let xml = remove_slide_refs(PRESENTATION, &info.slides[1..]).unwrap();

        assert!(xml.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#));
        assert!(xml.contains(r#"<p:sldLst><p:sld r:id="rId2"/></p:sldLst>"#));
        assert!(xml.contains(r#"<p14:sldIdLst><p14:sldId id="256"/></p14:sldIdLst>"#));
        assert!(xml.contains(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#));

        let reparsed = PresentationInfo::parse(&xml).unwrap();
        assert_eq!(reparsed.slides, info.slides[..1].to_vec());
    }
}
