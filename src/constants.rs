// Page wiring and lighting constants for the web front-end.
//
// Element ids follow the page's HTML; per-segment labels are addressed as
// `text-<segmentId>` and built from the segment id itself.

// DOM element ids
pub const APP_CANVAS_ID: &str = "app-canvas";
pub const LOADING_SCREEN_ID: &str = "loading-screen";
pub const HEADER_ID: &str = "header";
pub const INFO_CONTAINER_ID: &str = "info-container";
pub const INFO_NAME_ID: &str = "info-name";
pub const INFO_POPULATION_ID: &str = "info-population";
pub const INFO_DESCRIPTION_ID: &str = "info-description";

// Canvas attribute that overrides the configured interaction profile
pub const PROFILE_ATTRIBUTE: &str = "data-profile";

// Sky background (0x87CEEB)
pub const SKY_COLOR: [f64; 3] = [0x87 as f64 / 255.0, 0xCE as f64 / 255.0, 0xEB as f64 / 255.0];

// Lighting
pub const AMBIENT_INTENSITY: f32 = 1.5;
pub const DIRECTIONAL_INTENSITY: f32 = 1.5;
pub const DIRECTIONAL_POSITION: [f32; 3] = [2.0, 6.0, 10.0]; // normalized to a direction
