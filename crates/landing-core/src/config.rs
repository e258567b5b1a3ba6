//! Site configuration: region table, interaction profiles, model placement
//! and camera intro.
//!
//! The region table is the single source of truth for which segment ids are
//! interactive, what their panels say, and where a click navigates.

use crate::constants::*;
use crate::scene::Transform;
use crate::segment::SegmentId;
use crate::tween::Easing;
use fnv::FnvHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("site config declares no regions")]
    NoRegions,
    #[error("region id must not be empty")]
    EmptyId,
    #[error("region `{0}` is declared more than once")]
    DuplicateRegion(String),
    #[error("region `{0}` has no navigation target")]
    MissingHref(String),
    #[error("unknown interaction profile `{0}`")]
    UnknownProfile(String),
}

/// Descriptive record and navigation target of one segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub id: SegmentId,
    #[serde(default)]
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub population: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub href: String,
}

#[derive(Clone, Debug, Default)]
pub struct RegionTable {
    entries: Vec<RegionEntry>,
    index: FnvHashMap<String, usize>,
}

impl RegionTable {
    pub fn new(entries: Vec<RegionEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        let mut index = FnvHashMap::default();
        for (i, e) in entries.iter().enumerate() {
            if e.id.as_str().is_empty() {
                return Err(ConfigError::EmptyId);
            }
            if e.href.trim().is_empty() {
                return Err(ConfigError::MissingHref(e.id.to_string()));
            }
            if index.insert(e.id.as_str().to_owned(), i).is_some() {
                return Err(ConfigError::DuplicateRegion(e.id.to_string()));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&RegionEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn href(&self, id: &str) -> Option<&str> {
        self.get(id).map(|e| e.href.as_str())
    }

    pub fn entries(&self) -> &[RegionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

/// Final value of one Euler component; the other two are left as they are.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    pub axis: Axis,
    pub radians: f32,
}

impl AxisAngle {
    pub fn apply_to(&self, euler: Vec3) -> Vec3 {
        let mut out = euler;
        match self.axis {
            Axis::X => out.x = self.radians,
            Axis::Y => out.y = self.radians,
            Axis::Z => out.z = self.radians,
        }
        out
    }
}

/// Tunables that differ between the two page variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionProfile {
    /// Distance kept between the camera and a clicked segment.
    pub standoff: f32,
    /// Whether hovering shows the label and info panel.
    pub info_panel: bool,
    pub hover_scale: f32,
    pub hover_duration: Duration,
    pub travel_duration: Duration,
    pub travel_rotation: AxisAngle,
    pub easing: Easing,
}

impl InteractionProfile {
    pub fn classic() -> Self {
        Self {
            standoff: CLASSIC_STANDOFF,
            info_panel: false,
            hover_scale: HOVER_SCALE,
            hover_duration: Duration::from_millis(HOVER_TWEEN_MS),
            travel_duration: Duration::from_millis(TRAVEL_TWEEN_MS),
            travel_rotation: AxisAngle {
                axis: Axis::X,
                radians: TRAVEL_PITCH_RADIANS,
            },
            easing: Easing::QuadraticOut,
        }
    }

    pub fn preview() -> Self {
        Self {
            standoff: PREVIEW_STANDOFF,
            info_panel: true,
            ..Self::classic()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    #[default]
    Classic,
    Preview,
}

impl ProfileName {
    pub fn profile(self) -> InteractionProfile {
        match self {
            ProfileName::Classic => InteractionProfile::classic(),
            ProfileName::Preview => InteractionProfile::preview(),
        }
    }
}

impl FromStr for ProfileName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(ProfileName::Classic),
            "preview" => Ok(ProfileName::Preview),
            other => Err(ConfigError::UnknownProfile(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPlacement {
    pub asset: String,
    pub position: Vec3,
    /// Euler XYZ, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            asset: MODEL_ASSET.to_owned(),
            position: Vec3::from(MODEL_POSITION),
            rotation: Vec3::from(MODEL_ROTATION),
            scale: Vec3::from(MODEL_SCALE),
        }
    }
}

impl ModelPlacement {
    pub fn transform(&self) -> Transform {
        Transform::from_euler(self.position, self.rotation, self.scale)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroSettings {
    pub from: Vec3,
    pub to: Vec3,
    pub duration_ms: u64,
}

impl Default for IntroSettings {
    fn default() -> Self {
        Self {
            from: Vec3::from(INTRO_FROM),
            to: Vec3::from(INTRO_TO),
            duration_ms: INTRO_TWEEN_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub start: Vec3,
    pub intro: IntroSettings,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            start: Vec3::from(CAMERA_START),
            intro: IntroSettings::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawSiteConfig {
    #[serde(default)]
    profile: ProfileName,
    #[serde(default)]
    model: ModelPlacement,
    #[serde(default)]
    camera: CameraSettings,
    #[serde(default)]
    regions: Vec<RegionEntry>,
}

/// Validated site configuration.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub profile: ProfileName,
    pub model: ModelPlacement,
    pub camera: CameraSettings,
    pub regions: RegionTable,
}

impl SiteConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSiteConfig = serde_json::from_str(text)?;
        Ok(Self {
            profile: raw.profile,
            model: raw.model,
            camera: raw.camera,
            regions: RegionTable::new(raw.regions)?,
        })
    }
}
