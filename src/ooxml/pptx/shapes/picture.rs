/// Picture (image) shape implementation.
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::shapes::base::{Geometry, NonVisual, Placeholder};
use crate::ooxml::pptx::shapes::opaque::Opaque;
use crate::ooxml::xml::esc;
use bytes::Bytes;
use std::fmt::Write as _;

/// Image bytes owned by a picture, detached from the package they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub blob: Bytes,
    pub content_type: String,
    /// Partname in the originating package, used as a naming hint
    pub partname: PackURI,
}

/// A `<p:pic>` shape.
///
/// Pictures loaded from a slide keep their XML; pictures created by a
/// transplant are written fresh with a new embedded image relationship.
#[derive(Debug, Clone)]
pub struct Picture {
    pub nv: NonVisual,
    pub placeholder: Option<Placeholder>,
    pub geometry: Option<Geometry>,
    pub inherited: Option<Geometry>,
    image: Result<ImageData, String>,
    pub(crate) native: Option<Opaque>,
}

impl Picture {
    /// A new picture that owns `image` and has no XML yet.
    pub fn new(nv: NonVisual, geometry: Option<Geometry>, image: ImageData) -> Self {
        Self {
            nv,
            placeholder: None,
            geometry,
            inherited: None,
            image: Ok(image),
            native: None,
        }
    }

    /// A loaded picture. `image` holds the reason when the bytes couldn't be
    /// resolved (linked image, broken relationship, empty placeholder, ...).
    pub(crate) fn from_native(
        nv: NonVisual,
        placeholder: Option<Placeholder>,
        geometry: Option<Geometry>,
        image: Result<ImageData, String>,
        native: Opaque,
    ) -> Self {
        Self {
            nv,
            placeholder,
            geometry,
            inherited: None,
            image,
            native: Some(native),
        }
    }

    /// The owned image, or why there is none.
    pub fn image(&self) -> Result<&ImageData, &str> {
        self.image.as_ref().map_err(String::as_str)
    }

    pub fn effective_geometry(&self) -> Option<Geometry> {
        self.geometry.or(self.inherited)
    }

    /// XML for a new picture whose image is related as `r_id`.
    pub(crate) fn authored_xml(&self, r_id: &str) -> String {
        let mut xml = String::with_capacity(512);
        let _ = write!(
            xml,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}""#,
            self.nv.id,
            esc(&self.nv.name)
        );
        if let Some(ref descr) = self.nv.descr {
            let _ = write!(xml, r#" descr="{}""#, esc(descr));
        }
        let _ = write!(
            xml,
            r#"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#,
            esc(r_id)
        );
        if let Some(geometry) = self.effective_geometry() {
            xml.push_str(&geometry.to_xml("a"));
        }
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        xml
    }
}
