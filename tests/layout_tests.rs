// Host-side tests for overlay placement.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod layout {
    include!("../src/layout.rs");
}

use glam::Vec2;
use layout::*;

#[test]
fn panel_sits_exactly_at_pointer() {
    assert_eq!(
        anchor_style(Vec2::new(120.0, 48.0)),
        "position:absolute; left:120px; top:48px;"
    );
}

#[test]
fn fractional_pointer_positions_round_to_whole_pixels() {
    assert_eq!(
        anchor_style(Vec2::new(10.4, 99.6)),
        "position:absolute; left:10px; top:100px;"
    );
}

#[test]
fn negative_coordinates_clamp_to_viewport_edge() {
    assert_eq!(
        anchor_style(Vec2::new(-5.0, -0.2)),
        "position:absolute; left:0px; top:0px;"
    );
}
