//! Writing extracted content into the text shapes of a template slide.
//!
//! Shapes are visited once, top to bottom and then left to right. The first
//! shape that qualifies as a title slot gets the title; the first later shape
//! that qualifies as a body slot gets the body. A slot qualifies by its
//! placeholder type, by its position, or by holding filler text. Content with
//! no qualifying shape is not written.

use crate::compose::extract::SlideContent;
use crate::config::PlacementConfig;
use crate::ooxml::pptx::{ContentRole, Slide, TextFrame};

/// Shape indices that received content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub title: Option<usize>,
    pub body: Option<usize>,
}

impl Placement {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

/// Shape indices ordered by top edge, then left edge. Shapes without a known
/// position come last.
fn reading_order(slide: &Slide) -> Vec<usize> {
    let mut order: Vec<(i64, i64, usize)> = slide
        .shapes()
        .iter()
        .enumerate()
        .map(|(index, shape)| match shape.effective_geometry() {
            Some(geometry) => (geometry.top, geometry.left, index),
            None => (i64::MAX, i64::MAX, index),
        })
        .collect();
    order.sort();
    order.into_iter().map(|(_, _, index)| index).collect()
}

fn is_title_slot(frame: &TextFrame, config: &PlacementConfig) -> bool {
    if frame.filled_as() == Some(ContentRole::Title) {
        return true;
    }
    if let Some(placeholder) = frame.placeholder
        && config.is_title_placeholder(placeholder.kind)
    {
        return true;
    }
    frame
        .effective_geometry()
        .is_some_and(|geometry| geometry.top < config.near_top_emu)
}

fn is_body_slot(frame: &TextFrame, config: &PlacementConfig) -> bool {
    if frame.filled_as() == Some(ContentRole::Body) {
        return true;
    }
    if let Some(placeholder) = frame.placeholder
        && config.is_body_placeholder(placeholder.kind)
    {
        return true;
    }
    let text = frame.text();
    if !config.filler_marker.is_empty()
        && text
            .to_lowercase()
            .contains(&config.filler_marker.to_lowercase())
    {
        return true;
    }
    text.trim().is_empty()
        && frame
            .effective_geometry()
            .is_some_and(|geometry| geometry.height > config.large_box_emu)
}

/// Write `content` into the qualifying text frames of `slide`.
///
/// An empty title or body still takes its slot and clears the template text
/// there. Calling this again with the same content leaves the slide as it is.
pub fn place(slide: &mut Slide, content: &SlideContent, config: &PlacementConfig) -> Placement {
    let mut placement = Placement::default();
    let mut title_done = false;
    let mut body_done = false;

    for index in reading_order(slide) {
        if title_done && body_done {
            break;
        }
        let Some(frame) = slide.shapes_mut()[index].as_text_frame_mut() else {
            continue;
        };

        if !title_done && is_title_slot(frame, config) {
            frame.replace_text(&content.title, ContentRole::Title);
            placement.title = Some(index);
            title_done = true;
        } else if !body_done && is_body_slot(frame, config) {
            frame.replace_text(&content.body, ContentRole::Body);
            placement.body = Some(index);
            body_done = true;
        }
    }

    placement
}
