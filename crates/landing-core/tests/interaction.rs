// Host-side integration tests: a six-segment board picked through the real
// camera and scene, driven the way the page drives the controller.

use glam::{Mat4, Vec2, Vec3};
use landing_core::*;
use std::time::Duration;

const SITE: &str = r#"{
    "profile": "preview",
    "regions": [
        { "id": "1", "label": "North", "name": "North India", "href": "http://example.com/page1" },
        { "id": "2", "label": "West", "name": "West India", "href": "http://example.com/page2" },
        { "id": "3", "label": "Central", "name": "Central India", "href": "http://example.com/page3" },
        { "id": "4", "label": "East", "name": "East India", "href": "http://example.com/page4" },
        { "id": "5", "label": "South", "name": "South India", "href": "south.html" },
        { "id": "6", "label": "North-East", "name": "North-East India", "href": "http://example.com/page6" }
    ]
}"#;

const LAYOUT: [(&str, [f32; 3]); 6] = [
    ("1", [-6.0, 3.0, 0.0]),
    ("2", [0.0, 3.0, 0.0]),
    ("3", [6.0, 3.0, 0.0]),
    ("4", [-6.0, -3.0, 0.0]),
    ("5", [0.0, -3.0, 0.0]),
    ("6", [6.0, -3.0, 0.0]),
];

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn board() -> SegmentScene {
    let mut scene = SegmentScene::new(Transform::default());
    for (id, at) in LAYOUT {
        let local = Transform {
            translation: Vec3::from(at),
            ..Transform::default()
        };
        scene.push(SceneNode::new(
            id,
            Mat4::IDENTITY,
            local,
            MeshData::cuboid(Vec3::new(2.0, 2.0, 0.5)),
        ));
    }
    // backdrop that is hit between segments but is not a region
    let local = Transform {
        translation: Vec3::new(0.0, 0.0, -2.0),
        ..Transform::default()
    };
    scene.push(SceneNode::new(
        "base",
        Mat4::IDENTITY,
        local,
        MeshData::cuboid(Vec3::new(30.0, 30.0, 0.1)),
    ));
    scene
}

fn controller_with(profile: InteractionProfile) -> InteractionController<SegmentScene> {
    let config = SiteConfig::from_json(SITE).unwrap();
    InteractionController::new(&config, profile, board(), Viewport::new(800.0, 600.0))
}

fn controller() -> InteractionController<SegmentScene> {
    controller_with(InteractionProfile::preview())
}

fn pixel_of(c: &InteractionController<SegmentScene>, id: &str) -> Vec2 {
    let p = c.scene().world_position(id).unwrap();
    c.camera().world_to_viewport(p, c.viewport()).unwrap()
}

/// A point in the gap between segments, over the backdrop.
fn gap_pixel(c: &InteractionController<SegmentScene>) -> Vec2 {
    c.camera()
        .world_to_viewport(Vec3::new(3.0, 0.0, 0.0), c.viewport())
        .unwrap()
}

fn scale_of(c: &InteractionController<SegmentScene>, id: &str) -> Vec3 {
    c.scene().scale(id).unwrap()
}

#[test]
fn pointer_outside_segments_hovers_nothing() {
    let mut c = controller();
    let gap = gap_pixel(&c);
    let fx = c.on_pointer_move(gap.x, gap.y);
    assert!(fx.is_empty());
    assert!(c.hovered().is_none());

    let fx = c.on_pointer_move(2.0, 2.0);
    assert!(fx.is_empty());
    assert!(c.hovered().is_none());
}

#[test]
fn hover_highlights_exactly_one_segment() {
    let mut c = controller();
    let px = pixel_of(&c, "2");
    let fx = c.on_pointer_move(px.x, px.y);
    assert_eq!(
        fx.as_slice(),
        &[Effect::ShowInfo {
            segment: SegmentId::from("2"),
            at: px,
        }]
    );
    assert_eq!(c.hovered(), Some(&SegmentId::from("2")));

    c.tick(ms(150));
    let mid = scale_of(&c, "2");
    assert!(mid.x > 1.0 && mid.x < 1.2);

    c.tick(ms(150));
    assert_eq!(scale_of(&c, "2"), Vec3::splat(1.2));
    for (id, _) in LAYOUT.iter().filter(|(id, _)| *id != "2") {
        assert_eq!(scale_of(&c, id), Vec3::ONE);
    }
}

#[test]
fn moving_between_segments_swaps_highlight() {
    let mut c = controller();
    let a = pixel_of(&c, "1");
    let b = pixel_of(&c, "6");
    c.on_pointer_move(a.x, a.y);
    c.tick(ms(300));

    let fx = c.on_pointer_move(b.x, b.y);
    assert_eq!(
        fx.as_slice(),
        &[
            Effect::HideInfo {
                segment: SegmentId::from("1")
            },
            Effect::ShowInfo {
                segment: SegmentId::from("6"),
                at: b
            },
        ]
    );
    c.tick(ms(300));
    assert_eq!(scale_of(&c, "1"), Vec3::ONE);
    assert_eq!(scale_of(&c, "6"), Vec3::splat(1.2));
    let highlighted = LAYOUT
        .iter()
        .filter(|(id, _)| scale_of(&c, id) != Vec3::ONE)
        .count();
    assert_eq!(highlighted, 1);
}

#[test]
fn hover_then_leave_restores_identity_exactly() {
    let mut c = controller();
    let px = pixel_of(&c, "4");
    c.on_pointer_move(px.x, px.y);
    c.tick(ms(300));

    let gap = gap_pixel(&c);
    let fx = c.on_pointer_move(gap.x, gap.y);
    assert_eq!(
        fx.as_slice(),
        &[Effect::HideInfo {
            segment: SegmentId::from("4")
        }]
    );
    assert!(c.hovered().is_none());
    c.tick(ms(300));
    assert_eq!(scale_of(&c, "4"), Vec3::ONE);

    // leaving again is a no-op
    assert!(c.on_pointer_move(gap.x, gap.y).is_empty());
}

#[test]
fn every_segment_navigates_to_its_configured_target() {
    let expected = [
        ("1", "http://example.com/page1"),
        ("2", "http://example.com/page2"),
        ("3", "http://example.com/page3"),
        ("4", "http://example.com/page4"),
        ("5", "south.html"),
        ("6", "http://example.com/page6"),
    ];
    for (id, href) in expected {
        let mut c = controller();
        let px = pixel_of(&c, id);
        c.on_click(px.x, px.y);
        assert!(matches!(c.phase(), Phase::Traveling { segment, .. } if segment.as_str() == id));

        // nothing until the position tween has finished
        assert!(c.tick(ms(500)).is_empty());
        let fx = c.tick(ms(500));
        assert_eq!(
            fx.as_slice(),
            &[Effect::Navigate {
                segment: SegmentId::from(id),
                href: href.to_owned(),
            }]
        );
        assert_eq!(c.phase(), &Phase::Departed);
    }
}

#[test]
fn click_outside_segments_starts_nothing() {
    let mut c = controller();
    let gap = gap_pixel(&c);
    let before = c.camera().clone();
    assert!(c.on_click(gap.x, gap.y).is_empty());
    assert!(!c.tweens().is_active(&Property::CameraPosition));
    assert!(!c.tweens().is_active(&Property::CameraRotation));
    assert_eq!(c.phase(), &Phase::Browsing);
    assert!(c.tick(ms(2000)).is_empty());
    assert_eq!(c.camera(), &before);
}

#[test]
fn travel_stops_at_standoff_and_rotates() {
    let mut c = controller();
    let anchor = c.scene().world_position("3").unwrap();
    let px = pixel_of(&c, "3");
    c.on_click(px.x, px.y);
    c.tick(ms(1000));

    let profile = *c.profile();
    let cam = c.camera();
    assert!(((cam.position - anchor).length() - profile.standoff).abs() < 1e-3);
    assert_eq!(cam.rotation, profile.travel_rotation.apply_to(Vec3::ZERO));
}

#[test]
fn click_during_hover_tween_snaps_highlight_back() {
    let mut c = controller();
    let px = pixel_of(&c, "3");
    c.on_pointer_move(px.x, px.y);
    c.tick(ms(100));
    assert!(scale_of(&c, "3").x > 1.0);

    let fx = c.on_click(px.x, px.y);
    assert_eq!(
        fx.as_slice(),
        &[Effect::HideInfo {
            segment: SegmentId::from("3")
        }]
    );
    assert_eq!(scale_of(&c, "3"), Vec3::ONE);
    assert!(c.hovered().is_none());
    assert!(!c
        .tweens()
        .is_active(&Property::SegmentScale(SegmentId::from("3"))));

    // travel ignores further pointer input
    assert!(c.on_pointer_move(px.x, px.y).is_empty());
    c.tick(ms(1000));
    assert_eq!(scale_of(&c, "3"), Vec3::ONE);
}

#[test]
fn click_also_settles_a_segment_still_shrinking() {
    let mut c = controller();
    let a = pixel_of(&c, "1");
    let b = pixel_of(&c, "2");
    c.on_pointer_move(a.x, a.y);
    c.tick(ms(300));
    c.on_pointer_move(b.x, b.y);
    c.tick(ms(50));

    c.on_click(b.x, b.y);
    assert_eq!(scale_of(&c, "1"), Vec3::ONE);
    assert_eq!(scale_of(&c, "2"), Vec3::ONE);
}

#[test]
fn resize_updates_aspect_without_touching_state() {
    let mut c = controller();
    let px = pixel_of(&c, "5");
    c.on_pointer_move(px.x, px.y);
    let position = c.camera().position;

    c.on_resize(1024.0, 512.0);
    assert_eq!(c.viewport(), Viewport::new(1024.0, 512.0));
    assert!((c.camera().aspect - 2.0).abs() < 1e-6);
    assert_eq!(c.camera().position, position);
    assert_eq!(c.hovered(), Some(&SegmentId::from("5")));
}

#[test]
fn classic_profile_has_no_info_panel() {
    let mut c = controller_with(InteractionProfile::classic());
    let a = pixel_of(&c, "1");
    let gap = gap_pixel(&c);
    assert!(c.on_pointer_move(a.x, a.y).is_empty());
    assert_eq!(c.hovered(), Some(&SegmentId::from("1")));
    assert!(c.on_pointer_move(gap.x, gap.y).is_empty());
    assert!(c.hovered().is_none());
}

#[test]
fn click_supersedes_intro_zoom() {
    let mut c = controller();
    c.start_intro();
    c.tick(ms(1900));

    let px = pixel_of(&c, "2");
    c.on_click(px.x, px.y);
    assert!(matches!(c.phase(), Phase::Traveling { .. }));
    // position + rotation only; the intro tween is gone
    assert_eq!(c.tweens().len(), 2);

    c.tick(ms(1000));
    let anchor = c.scene().world_position("2").unwrap();
    assert!(((c.camera().position - anchor).length() - c.profile().standoff).abs() < 1e-3);
}

#[test]
fn empty_scene_until_model_loads() {
    let config = SiteConfig::from_json(SITE).unwrap();
    let mut c = InteractionController::new(
        &config,
        InteractionProfile::preview(),
        SegmentScene::default(),
        Viewport::new(800.0, 600.0),
    );
    assert!(c.on_pointer_move(400.0, 300.0).is_empty());
    assert!(c.on_click(400.0, 300.0).is_empty());

    assert!(c.set_scene(board()).is_empty());
    let px = pixel_of(&c, "5");
    assert_eq!(c.on_pointer_move(px.x, px.y).len(), 1);
}
