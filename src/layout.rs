use glam::Vec2;

/// Inline style that pins an overlay element's top-left corner at `at`
/// (viewport CSS pixels), the pointer position it was shown for.
pub fn anchor_style(at: Vec2) -> String {
    format!(
        "position:absolute; left:{:.0}px; top:{:.0}px;",
        at.x.max(0.0),
        at.y.max(0.0)
    )
}
