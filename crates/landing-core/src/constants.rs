// Shared interaction and camera tuning used by the controller and its profiles.

// Hover highlight
pub const HOVER_SCALE: f32 = 1.2; // uniform scale of the hovered segment
pub const HOVER_TWEEN_MS: u64 = 300;

// Click travel
pub const TRAVEL_TWEEN_MS: u64 = 1000;
pub const CLASSIC_STANDOFF: f32 = 5.0; // distance kept from the segment after travel
pub const PREVIEW_STANDOFF: f32 = 3.0;
pub const TRAVEL_PITCH_RADIANS: f32 = -0.2; // camera X rotation reached at the end of travel

// Camera (vertical fov, clip planes)
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: [f32; 3] = [0.0, 0.0, 20.0];

// Intro zoom played once the model has loaded
pub const INTRO_FROM: [f32; 3] = [100.0, 0.0, 20.0];
pub const INTRO_TO: [f32; 3] = [0.0, 0.0, 15.0];
pub const INTRO_TWEEN_MS: u64 = 2000;

// Model placement applied on top of the asset's own node transforms
pub const MODEL_ASSET: &str = "ideathonindia.glb";
pub const MODEL_POSITION: [f32; 3] = [4.0, 0.9, -1.0];
pub const MODEL_ROTATION: [f32; 3] = [13.8, 0.0, 0.0]; // Euler XYZ, radians
pub const MODEL_SCALE: [f32; 3] = [4.4, 4.4, 4.0];

// Picking
pub const RAY_EPSILON: f32 = 1e-7; // parallel-ray / degenerate-triangle threshold
