pub mod camera;
pub mod config;
pub mod constants;
pub mod controller;
pub mod model;
pub mod picking;
pub mod scene;
pub mod segment;
pub mod tween;

pub use camera::*;
pub use config::*;
pub use controller::*;
pub use model::{load_glb, ModelError};
pub use picking::{Aabb, PickHit, Ray};
pub use scene::*;
pub use segment::SegmentId;
pub use tween::*;
