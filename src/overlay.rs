use crate::constants::*;
use crate::layout::anchor_style;
use glam::Vec2;
use landing_core::{RegionEntry, SegmentId};
use web_sys as web;

#[inline]
pub fn show(document: &web::Document, element_id: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let cl = el.class_list();
        _ = cl.remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document, element_id: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let cl = el.class_list();
        _ = cl.add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}

fn show_at(document: &web::Document, element_id: &str, at: Vec2) {
    if let Some(el) = document.get_element_by_id(element_id) {
        _ = el.class_list().remove_1("hidden");
        _ = el.set_attribute("style", &anchor_style(at));
    }
}

fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

/// Show the segment label and the info panel at the pointer.
pub fn show_info(document: &web::Document, entry: &RegionEntry, at: Vec2) {
    let label_id = entry.id.label_element_id();
    show_at(document, &label_id, at);
    if !entry.label.is_empty() {
        set_text(document, &label_id, &entry.label);
    }

    set_text(document, INFO_NAME_ID, &entry.name);
    set_text(document, INFO_POPULATION_ID, &entry.population);
    set_text(document, INFO_DESCRIPTION_ID, &entry.description);
    show_at(document, INFO_CONTAINER_ID, at);
}

pub fn hide_info(document: &web::Document, segment: &SegmentId) {
    hide(document, &segment.label_element_id());
    hide(document, INFO_CONTAINER_ID);
}

/// Loading finished (successfully or not): drop the loading screen.
pub fn hide_loading(document: &web::Document) {
    hide(document, LOADING_SCREEN_ID);
}

pub fn model_ready(document: &web::Document) {
    hide_loading(document);
    show(document, HEADER_ID);
}
