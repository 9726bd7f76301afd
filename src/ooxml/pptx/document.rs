/// A loaded presentation: package, slide list and slides.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::parts::layout::LayoutCache;
use crate::ooxml::pptx::parts::presentation::{PresentationInfo, SlideRef, remove_slide_refs};
use crate::ooxml::pptx::parts::theme::Theme;
use crate::ooxml::pptx::resources::{DocumentId, Importer, SnapshotCache};
use crate::ooxml::pptx::slide::Slide;
use bytes::Bytes;
use tracing::debug;

/// Content types a presentation main part may have.
const PRESENTATION_TYPES: [&str; 3] = [
    ct::PML_PRESENTATION_MAIN,
    ct::PML_PRES_MACRO_MAIN,
    ct::PML_TEMPLATE_MAIN,
];

/// A presentation document.
///
/// Slides are identified by their position. Everything the document needs is
/// owned, so slides can be copied between documents without tying their
/// lifetimes together.
///
/// # Examples
///
/// ```rust,ignore
/// use deckweave::ooxml::pptx::Document;
///
/// let mut deck = Document::load(&std::fs::read("deck.pptx")?)?;
/// println!("{} slides", deck.slide_count());
/// deck.truncate_slides(3)?;
/// std::fs::write("short.pptx", deck.save()?)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Document {
    package: OpcPackage,
    presentation: PackURI,
    slide_refs: Vec<SlideRef>,
    slide_size: Option<(i64, i64)>,
    slides: Vec<Slide>,
}

impl Document {
    /// Parse a `.pptx` (or `.pptm` / `.potx`) file.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let package = OpcPackage::from_bytes(bytes)?;
        let id = DocumentId::new();

        let main = package.main_document_part()?;
        if !PRESENTATION_TYPES.contains(&main.content_type()) {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: main.content_type().to_string(),
            });
        }
        let presentation = main.partname().clone();
        let info = PresentationInfo::parse(std::str::from_utf8(main.blob())?)?;

        let mut slides = Vec::with_capacity(info.slides.len());
        {
            let mut snapshots = SnapshotCache::new(&package);
            let mut layouts = LayoutCache::default();
            for slide_ref in &info.slides {
                let rel = main.rels().get(&slide_ref.r_id).ok_or_else(|| {
                    OoxmlError::InvalidRelationship(format!("slide {} has no relationship {}", slide_ref.id, slide_ref.r_id))
                })?;
                let partname = rel.target_partname()?;
                slides.push(Slide::load(id.clone(), &package, &partname, &mut snapshots, &mut layouts)?);
            }
        }
        debug!(slides = slides.len(), parts = package.part_count(), "loaded presentation");

        Ok(Self {
            package,
            presentation,
            slide_refs: info.slides,
            slide_size: info.slide_size,
            slides,
        })
    }

    /// Serialize the document, consuming it.
    ///
    /// Slides that were never modified keep their original XML and
    /// relationships. Only parts reachable from the package relationships are
    /// written.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut rendered = Vec::new();
        {
            let mut importer = Importer::new(&mut self.package);
            for slide in self.slides.iter().filter(|slide| slide.is_modified()) {
                let mut rels = slide.rels().clone();
                let xml = slide.render(&mut importer, &mut rels)?;
                rendered.push((slide.partname().clone(), xml, rels));
            }
        }
        debug!(modified = rendered.len(), "rendered slides");

        for (partname, xml, rels) in rendered {
            let part = self.package.get_part_mut(&partname)?;
            part.set_blob(Bytes::from(xml));
            *part.rels_mut() = rels;
        }
        Ok(self.package.to_bytes()?)
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    #[inline]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    #[inline]
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    #[inline]
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Slide width and height in EMUs.
    #[inline]
    pub fn slide_size(&self) -> Option<(i64, i64)> {
        self.slide_size
    }

    /// Keep the first `len` slides. Returns how many were removed.
    ///
    /// The removed slides leave the slide list, section and custom show lists
    /// and the presentation relationships; their parts (with notes and media
    /// nothing else uses) are left out when saving.
    pub fn truncate_slides(&mut self, len: usize) -> Result<usize> {
        if len >= self.slides.len() {
            return Ok(0);
        }
        let removed = self.slides.split_off(len).len();
        let removed_refs = self.slide_refs.split_off(len);

        let part = self.package.get_part_mut(&self.presentation)?;
        let xml = remove_slide_refs(std::str::from_utf8(part.blob())?, &removed_refs)?;
        part.set_blob(Bytes::from(xml));
        for slide_ref in &removed_refs {
            part.rels_mut().remove(&slide_ref.r_id);
        }
        Ok(removed)
    }

    /// The presentation theme, found through the presentation or, failing
    /// that, the first slide master.
    pub fn theme(&self) -> Result<Option<Theme>> {
        let main = self.package.get_part(&self.presentation)?;
        let mut rel = main.rels().first_of_type(rt::THEME);
        if rel.is_none()
            && let Some(master) = main.rels().first_of_type(rt::SLIDE_MASTER)
        {
            let master = self.package.get_part(&master.target_partname()?)?;
            rel = master.rels().first_of_type(rt::THEME);
        }
        match rel {
            Some(rel) => Ok(Some(Theme::from_part(self.package.get_part(&rel.target_partname()?)?)?)),
            None => Ok(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn package(&self) -> &OpcPackage {
        &self.package
    }
}
