//! Copying a slide's shapes into a slide of another deck.

use crate::compose::error::{CopyFallback, ShapeCopyWarning};
use crate::ooxml::pptx::{Picture, Shape, Slide, TextFrame};

/// Replace every shape of `dest` with a copy of the shapes of `src`.
///
/// Pictures get their own copy of the image bytes and text frames are rebuilt
/// from the text model, both at the source geometry. Anything else is cloned
/// as XML, carrying the parts it references. Shapes that can't be copied take
/// a fallback and are reported in `warnings`; the copy itself never fails.
pub fn transplant(dest: &mut Slide, src: &Slide, warnings: &mut Vec<ShapeCopyWarning>) {
    dest.clear_shapes();

    for (index, shape) in src.shapes().iter().enumerate() {
        let warn = |reason: String, fallback: CopyFallback| ShapeCopyWarning {
            shape_index: index,
            kind: shape.kind(),
            name: shape.nv().map(|nv| nv.name.clone()).unwrap_or_default(),
            reason,
            fallback,
        };

        let copy = match shape {
            Shape::Picture(picture) => match picture.image() {
                Ok(image) => Some(Shape::Picture(Picture::new(
                    picture.nv.clone(),
                    picture.effective_geometry(),
                    image.clone(),
                ))),
                Err(reason) if picture.placeholder.is_some() => {
                    warnings.push(warn(reason.to_string(), CopyFallback::OpaqueClone));
                    Some(shape.clone())
                },
                Err(reason) => {
                    warnings.push(warn(reason.to_string(), CopyFallback::Dropped));
                    None
                },
            },
            Shape::TextFrame(frame) => Some(Shape::TextFrame(TextFrame::new(
                frame.nv.clone(),
                frame.effective_geometry(),
                frame.body.clone(),
            ))),
            Shape::Generic(_) => Some(shape.clone()),
        };

        let Some(copy) = copy else {
            continue;
        };
        if let Some(opaque) = copy.opaque() {
            for reference in opaque.unportable() {
                warnings.push(warn(
                    format!("reference {} ({}) points into the source deck", reference.r_id, reltype_name(&reference.reltype)),
                    CopyFallback::ReferenceDropped,
                ));
            }
        }
        dest.push_shape(copy);
    }
}

/// Last segment of a relationship type URI.
fn reltype_name(reltype: &str) -> &str {
    reltype.rsplit('/').next().unwrap_or(reltype)
}
