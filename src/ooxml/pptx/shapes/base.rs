/// Properties common to every shape kind: identity, position and placeholder role.
use phf::phf_map;
use std::fmt::Write as _;

/// Position and size of a shape in EMUs (914400 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Geometry {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Serialize as a transform element, `<a:xfrm>` inside `spPr` or
    /// `<p:xfrm>` on a graphic frame.
    pub fn to_xml(&self, prefix: &str) -> String {
        let mut xml = String::with_capacity(96);
        let _ = write!(
            xml,
            r#"<{prefix}:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{prefix}:xfrm>"#,
            self.left, self.top, self.width, self.height
        );
        xml
    }
}

/// Non-visual properties from `<p:cNvPr>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NonVisual {
    pub id: u32,
    pub name: String,
    pub descr: Option<String>,
}

/// Placeholder types of `<p:ph type="...">` (ST_PlaceholderType).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Title,
    Body,
    CenterTitle,
    Subtitle,
    DateTime,
    SlideNumber,
    Footer,
    Header,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    SlideImage,
    Picture,
}

static PLACEHOLDER_KINDS: phf::Map<&'static str, PlaceholderKind> = phf_map! {
    "title" => PlaceholderKind::Title,
    "body" => PlaceholderKind::Body,
    "ctrTitle" => PlaceholderKind::CenterTitle,
    "subTitle" => PlaceholderKind::Subtitle,
    "dt" => PlaceholderKind::DateTime,
    "sldNum" => PlaceholderKind::SlideNumber,
    "ftr" => PlaceholderKind::Footer,
    "hdr" => PlaceholderKind::Header,
    "obj" => PlaceholderKind::Object,
    "chart" => PlaceholderKind::Chart,
    "tbl" => PlaceholderKind::Table,
    "clipArt" => PlaceholderKind::ClipArt,
    "dgm" => PlaceholderKind::Diagram,
    "media" => PlaceholderKind::Media,
    "sldImg" => PlaceholderKind::SlideImage,
    "pic" => PlaceholderKind::Picture,
};

impl PlaceholderKind {
    /// Parse the schema token of the `type` attribute.
    pub fn from_schema(token: &str) -> Option<Self> {
        PLACEHOLDER_KINDS.get(token).copied()
    }

    /// The schema token, as accepted in configuration lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::DateTime => "dt",
            Self::SlideNumber => "sldNum",
            Self::Footer => "ftr",
            Self::Header => "hdr",
            Self::Object => "obj",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::ClipArt => "clipArt",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::SlideImage => "sldImg",
            Self::Picture => "pic",
        }
    }

    /// Numeric code in the PP_PLACEHOLDER numbering used by presentation
    /// automation APIs.
    pub fn code(&self) -> u32 {
        match self {
            Self::Title => 1,
            Self::Body => 2,
            Self::CenterTitle => 3,
            Self::Subtitle => 4,
            Self::Object => 7,
            Self::Chart => 8,
            Self::ClipArt => 9,
            Self::Media => 10,
            Self::Diagram => 11,
            Self::Table => 12,
            Self::SlideNumber => 13,
            Self::Header => 14,
            Self::Footer => 15,
            Self::DateTime => 16,
            Self::Picture => 18,
            Self::SlideImage => 101,
        }
    }

    /// The master placeholder type a layout placeholder of this type inherits
    /// from. Masters only carry title, body and the footer-ish placeholders.
    pub fn master_kind(&self) -> Self {
        match self {
            Self::Title | Self::CenterTitle => Self::Title,
            Self::DateTime | Self::SlideNumber | Self::Footer | Self::Header => *self,
            _ => Self::Body,
        }
    }
}

/// Placeholder marker from `<p:ph>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub idx: Option<u32>,
}

impl Placeholder {
    /// Build from raw `type` and `idx` attribute values. A missing type means
    /// `obj`; unknown tokens are treated the same way.
    pub fn from_attrs(ph_type: Option<&str>, idx: Option<&str>) -> Self {
        let kind = ph_type
            .and_then(PlaceholderKind::from_schema)
            .unwrap_or(PlaceholderKind::Object);
        let idx = idx.and_then(|v| atoi_simd::parse::<u32>(v.as_bytes()).ok());
        Self { kind, idx }
    }

    #[inline]
    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

/// Parse a signed integer attribute value such as an EMU coordinate.
#[inline]
pub(crate) fn parse_i64(value: &[u8]) -> Option<i64> {
    atoi_simd::parse::<i64>(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_defaults_to_object() {
        let ph = Placeholder::from_attrs(None, Some("1"));
        assert_eq!(ph.kind, PlaceholderKind::Object);
        assert_eq!(ph.idx, Some(1));

        let ph = Placeholder::from_attrs(Some("ctrTitle"), None);
        assert_eq!(ph.kind, PlaceholderKind::CenterTitle);
        assert_eq!(ph.code(), 3);
        assert_eq!(ph.kind.master_kind(), PlaceholderKind::Title);
    }

    #[test]
    fn test_schema_tokens_roundtrip() {
        for token in ["title", "body", "subTitle", "obj", "sldNum", "pic"] {
            let kind = PlaceholderKind::from_schema(token).unwrap();
            assert_eq!(kind.as_str(), token);
        }
        assert!(PlaceholderKind::from_schema("bogus").is_none());
    }

    #[test]
    fn test_geometry_xml() {
        let geometry = Geometry::new(1, -2, 3, 4);
        assert_eq!(
            geometry.to_xml("a"),
            r#"<a:xfrm><a:off x="1" y="-2"/><a:ext cx="3" cy="4"/></a:xfrm>"#
        );
        assert_eq!(parse_i64(b"-914400"), Some(-914400));
        assert_eq!(parse_i64(b"x"), None);
    }
}
