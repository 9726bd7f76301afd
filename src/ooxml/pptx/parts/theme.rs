/// Theme part: the color scheme and fonts a deck's text falls back to.
use crate::ooxml::error::Result;
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::shapes::RgbColor;
use crate::ooxml::xml::attr_value;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One slot of the color scheme (`dk1`, `accent1`, `hlink`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColor {
    pub name: String,
    /// Explicit color, or the last computed value of a system color
    pub rgb: Option<RgbColor>,
    /// System color token (`windowText`, `window`, ...)
    pub system_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Theme {
    pub name: String,
    pub color_scheme: String,
    /// Latin typeface for headings
    pub major_font: Option<String>,
    /// Latin typeface for body text
    pub minor_font: Option<String>,
    pub colors: Vec<ThemeColor>,
}

impl Theme {
    pub fn color(&self, name: &str) -> Option<&ThemeColor> {
        self.colors.iter().find(|color| color.name == name)
    }

    /// Parse a theme part.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let theme = Theme::from_part(part)?;
    /// println!("{} uses {:?} for headings", theme.name, theme.major_font);
    /// ```
    pub fn from_part(part: &dyn Part) -> Result<Self> {
        Self::parse(std::str::from_utf8(part.blob())?)
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut theme = Theme::default();
        let mut scope = Scope::None;
        let mut slot: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => theme.open(&e, &mut scope, &mut slot)?,
                Event::Empty(e) => theme.open(&e, &mut scope, &mut slot)?,
                Event::End(e) => match e.local_name().as_ref() {
                    b"clrScheme" | b"majorFont" | b"minorFont" => scope = Scope::None,
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(theme)
    }

    fn open(&mut self, e: &BytesStart<'_>, scope: &mut Scope, slot: &mut Option<String>) -> Result<()> {
        let local = e.local_name();
        match (local.as_ref(), *scope) {
            (b"theme", _) => self.name = attribute(e, b"name")?.unwrap_or_default(),
            (b"clrScheme", _) => {
                self.color_scheme = attribute(e, b"name")?.unwrap_or_default();
                *scope = Scope::Colors;
            },
            (b"majorFont", _) => *scope = Scope::MajorFont,
            (b"minorFont", _) => *scope = Scope::MinorFont,
            (b"latin", Scope::MajorFont) => self.major_font = attribute(e, b"typeface")?,
            (b"latin", Scope::MinorFont) => self.minor_font = attribute(e, b"typeface")?,
            (b"srgbClr", Scope::Colors) => {
                if let Some(name) = slot.take() {
                    let rgb = attribute(e, b"val")?.and_then(|hex| RgbColor::from_hex(&hex));
                    self.colors.push(ThemeColor {
                        name,
                        rgb,
                        system_color: None,
                    });
                }
            },
            (b"sysClr", Scope::Colors) => {
                if let Some(name) = slot.take() {
                    let rgb = attribute(e, b"lastClr")?.and_then(|hex| RgbColor::from_hex(&hex));
                    self.colors.push(ThemeColor {
                        name,
                        rgb,
                        system_color: attribute(e, b"val")?,
                    });
                }
            },
            (name, Scope::Colors) => {
                if let Ok(name) = std::str::from_utf8(name)
                    && is_scheme_slot(name)
                {
                    *slot = Some(name.to_string());
                }
            },
            _ => {},
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    None,
    Colors,
    MajorFont,
    MinorFont,
}

fn is_scheme_slot(name: &str) -> bool {
    matches!(
        name,
        "dk1" | "lt1" | "dk2" | "lt2" | "accent1" | "accent2" | "accent3" | "accent4" | "accent5"
            | "accent6" | "hlink" | "folHlink"
    )
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr_value(&attr)?));
        }
    }
    Ok(None)
}
