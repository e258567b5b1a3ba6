//! Pointer picking, hover highlighting and click travel.
//!
//! The controller owns all interaction state for one page: camera, hover
//! state, running tweens and the travel phase. Input handlers and the frame
//! tick return [`Effect`]s for the DOM layer instead of touching the page.

use crate::camera::{Camera, Viewport};
use crate::config::{InteractionProfile, IntroSettings, RegionEntry, RegionTable, SiteConfig};
use crate::scene::SceneProvider;
use crate::segment::SegmentId;
use crate::tween::{Easing, Property, TweenId, TweenScheduler};
use glam::{Vec2, Vec3};
use smallvec::SmallVec;
use std::time::Duration;

/// Page-side action requested by the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Show the label and info panel of `segment` at pointer position `at`.
    ShowInfo { segment: SegmentId, at: Vec2 },
    HideInfo { segment: SegmentId },
    /// Full-page navigation; emitted once, after travel has finished.
    Navigate { segment: SegmentId, href: String },
}

pub type Effects = SmallVec<[Effect; 4]>;

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Browsing,
    /// Camera is moving toward `segment`; `tween` is the position tween whose
    /// completion triggers navigation to `href`.
    Traveling {
        segment: SegmentId,
        href: String,
        tween: TweenId,
    },
    /// Navigation has been requested; the page is unloading.
    Departed,
}

/// Camera destination for travel: `standoff` units from `anchor`, on the
/// side facing the camera.
#[inline]
pub fn travel_target(camera: Vec3, anchor: Vec3, standoff: f32) -> Vec3 {
    anchor + (camera - anchor).normalize_or_zero() * standoff
}

pub struct InteractionController<S> {
    scene: S,
    camera: Camera,
    viewport: Viewport,
    regions: RegionTable,
    profile: InteractionProfile,
    intro: IntroSettings,
    hover: Option<SegmentId>,
    tweens: TweenScheduler,
    phase: Phase,
}

impl<S: SceneProvider> InteractionController<S> {
    pub fn new(
        config: &SiteConfig,
        profile: InteractionProfile,
        scene: S,
        viewport: Viewport,
    ) -> Self {
        let camera = Camera {
            position: config.camera.start,
            fovy_radians: config.camera.fov_degrees.to_radians(),
            znear: config.camera.near,
            zfar: config.camera.far,
            aspect: viewport.aspect().unwrap_or(1.0),
            ..Camera::default()
        };
        Self {
            scene,
            camera,
            viewport,
            regions: config.regions.clone(),
            profile,
            intro: config.camera.intro.clone(),
            hover: None,
            tweens: TweenScheduler::new(),
            phase: Phase::Browsing,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn profile(&self) -> &InteractionProfile {
        &self.profile
    }

    pub fn hovered(&self) -> Option<&SegmentId> {
        self.hover.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn tweens(&self) -> &TweenScheduler {
        &self.tweens
    }

    /// Swap in a freshly loaded scene. Hover state refers to the old scene
    /// and is dropped.
    pub fn set_scene(&mut self, scene: S) -> Effects {
        let mut effects = Effects::new();
        if let Some(prev) = self.hover.take() {
            self.hide_info(prev, &mut effects);
        }
        self.tweens
            .cancel_matching(|p| matches!(p, Property::SegmentScale(_)));
        self.scene = scene;
        effects
    }

    /// Fly the camera in from the configured start point.
    pub fn start_intro(&mut self) {
        self.camera.position = self.intro.from;
        self.tweens.start(
            Property::CameraPosition,
            self.intro.from,
            self.intro.to,
            Duration::from_millis(self.intro.duration_ms),
            Easing::QuadraticOut,
        );
        log::debug!("[camera] intro {:?} -> {:?}", self.intro.from, self.intro.to);
    }

    /// Segment under viewport pixel `(x, y)`, if the nearest hit is one.
    pub fn pick_segment(&self, x: f32, y: f32) -> Option<SegmentId> {
        self.pick_region(x, y).map(|entry| entry.id.clone())
    }

    fn pick_region(&self, x: f32, y: f32) -> Option<&RegionEntry> {
        let ndc = self.viewport.to_ndc(x, y)?;
        let ray = self.camera.ray_through(ndc);
        let hit = self.scene.pick(&ray)?;
        self.regions.get(hit.name)
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> Effects {
        let mut effects = Effects::new();
        if self.phase != Phase::Browsing || !self.viewport.is_valid() {
            return effects;
        }

        let target = self.pick_segment(x, y);
        if target == self.hover {
            return effects;
        }

        if let Some(prev) = self.hover.take() {
            log::debug!("[hover] leave {}", prev);
            self.tween_scale(&prev, Vec3::ONE);
            self.hide_info(prev, &mut effects);
        }
        if let Some(next) = target {
            log::debug!("[hover] enter {}", next);
            self.tween_scale(&next, Vec3::splat(self.profile.hover_scale));
            if self.profile.info_panel {
                effects.push(Effect::ShowInfo {
                    segment: next.clone(),
                    at: Vec2::new(x, y),
                });
            }
            self.hover = Some(next);
        }
        effects
    }

    pub fn on_click(&mut self, x: f32, y: f32) -> Effects {
        let mut effects = Effects::new();
        if self.phase != Phase::Browsing {
            return effects;
        }
        // region entries always carry an href; `RegionTable::new` rejects empty ones
        let Some((segment, href)) = self
            .pick_region(x, y)
            .map(|entry| (entry.id.clone(), entry.href.clone()))
        else {
            return effects;
        };
        let Some(anchor) = self.scene.world_position(segment.as_str()) else {
            log::warn!("[click] segment {} has no scene node", segment);
            return effects;
        };

        self.settle_highlights(&mut effects);

        let duration = self.profile.travel_duration;
        let easing = self.profile.easing;
        let destination = travel_target(self.camera.position, anchor, self.profile.standoff);
        let tween = self.tweens.start(
            Property::CameraPosition,
            self.camera.position,
            destination,
            duration,
            easing,
        );
        let rotation = self.profile.travel_rotation.apply_to(self.camera.rotation);
        self.tweens.start(
            Property::CameraRotation,
            self.camera.rotation,
            rotation,
            duration,
            easing,
        );

        log::info!(
            "[click] travel to segment {} -> ({:.2},{:.2},{:.2})",
            segment,
            destination.x,
            destination.y,
            destination.z
        );
        self.phase = Phase::Traveling {
            segment,
            href,
            tween,
        };
        effects
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        let viewport = Viewport::new(width, height);
        let Some(aspect) = viewport.aspect() else {
            log::debug!("[resize] ignoring {}x{}", width, height);
            return;
        };
        self.viewport = viewport;
        self.camera.aspect = aspect;
    }

    /// Advance tweens by `dt` and report navigation once travel completes.
    pub fn tick(&mut self, dt: Duration) -> Effects {
        let mut effects = Effects::new();
        let camera = &mut self.camera;
        let scene = &mut self.scene;
        let completed = self.tweens.update(dt, |property, value| match property {
            Property::CameraPosition => camera.position = value,
            Property::CameraRotation => camera.rotation = value,
            Property::SegmentScale(id) => {
                scene.set_scale(id.as_str(), value);
            }
        });

        let arrived = matches!(
            &self.phase,
            Phase::Traveling { tween, .. } if completed.contains(tween)
        );
        if arrived {
            if let Phase::Traveling { segment, href, .. } =
                std::mem::replace(&mut self.phase, Phase::Departed)
            {
                log::info!("[nav] segment {} -> {}", segment, href);
                effects.push(Effect::Navigate { segment, href });
            }
        }
        effects
    }

    fn tween_scale(&mut self, segment: &SegmentId, to: Vec3) {
        let from = self.scene.scale(segment.as_str()).unwrap_or(Vec3::ONE);
        self.tweens.start(
            Property::SegmentScale(segment.clone()),
            from,
            to,
            self.profile.hover_duration,
            self.profile.easing,
        );
    }

    fn hide_info(&self, segment: SegmentId, effects: &mut Effects) {
        if self.profile.info_panel {
            effects.push(Effect::HideInfo { segment });
        }
    }

    /// Cut every highlight tween short and snap those segments, plus the
    /// hovered one, back to identity scale.
    fn settle_highlights(&mut self, effects: &mut Effects) {
        let cancelled = self
            .tweens
            .cancel_matching(|p| matches!(p, Property::SegmentScale(_)));
        for property in cancelled {
            if let Property::SegmentScale(id) = property {
                self.scene.set_scale(id.as_str(), Vec3::ONE);
            }
        }
        if let Some(prev) = self.hover.take() {
            self.scene.set_scale(prev.as_str(), Vec3::ONE);
            self.hide_info(prev, effects);
        }
    }
}
