//! Reading a slide's title and body out of its text-bearing shapes.

use crate::ooxml::pptx::Slide;

/// Title and body text of a slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideContent {
    pub title: String,
    pub body: String,
}

impl SlideContent {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

/// Non-empty texts of a slide, top edge first. Shapes without a known
/// position come last; ties keep their z-order.
fn texts_top_down(slide: &Slide) -> Vec<String> {
    let mut texts: Vec<(i64, String)> = slide
        .shapes()
        .iter()
        .filter_map(|shape| {
            let text = shape.text()?;
            if text.trim().is_empty() {
                return None;
            }
            let top = shape.effective_geometry().map_or(i64::MAX, |g| g.top);
            Some((top, text))
        })
        .collect();
    texts.sort_by_key(|(top, _)| *top);
    texts.into_iter().map(|(_, text)| text).collect()
}

/// The topmost text is the title, the rest joined by newlines is the body.
pub fn extract(slide: &Slide) -> SlideContent {
    let mut texts = texts_top_down(slide).into_iter();
    let title = texts.next().unwrap_or_default();
    let body = texts.collect::<Vec<_>>().join("\n");
    SlideContent { title, body }
}

/// All text of a slide in reading order, cut to `max_chars` characters.
pub fn slide_excerpt(slide: &Slide, max_chars: usize) -> String {
    let text = texts_top_down(slide).join("\n");
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
