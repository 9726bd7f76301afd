//! Small helpers shared by the quick-xml based parsers.
//!
//! quick-xml reports entity references as separate `GeneralRef` events and
//! leaves attribute values raw, so decoding is done in one place here.

use crate::ooxml::opc::error::Result;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use std::borrow::Cow;

/// Decode and unescape an attribute value.
pub fn attr_value(attr: &Attribute<'_>) -> Result<String> {
    let raw = std::str::from_utf8(&attr.value)?;
    Ok(unescape(raw)?.into_owned())
}

/// Decode the raw bytes of a text event.
pub fn text_value(raw: &[u8]) -> Result<String> {
    let raw = std::str::from_utf8(raw)?;
    Ok(unescape(raw)?.into_owned())
}

/// Resolve the name of a general entity reference (`amp`, `#x41`, ...).
///
/// Unknown entities are kept literally.
pub fn general_ref(name: &[u8]) -> Result<String> {
    let name = std::str::from_utf8(name)?;
    let literal = format!("&{};", name);
    match unescape(&literal) {
        Ok(resolved) => Ok(resolved.into_owned()),
        Err(_) => Ok(literal),
    }
}

/// Escape text for element content or attribute values.
#[inline]
pub fn esc(s: &str) -> Cow<'_, str> {
    escape(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_ref() {
        assert_eq!(general_ref(b"amp").unwrap(), "&");
        assert_eq!(general_ref(b"#x41").unwrap(), "A");
        assert_eq!(general_ref(b"nbsp").unwrap(), "&nbsp;");
    }

    #[test]
    fn test_text_value() {
        assert_eq!(text_value(b"a &lt; b").unwrap(), "a < b");
        assert_eq!(esc("a < b & c"), "a &lt; b &amp; c");
    }
}
