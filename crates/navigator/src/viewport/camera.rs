use glam::Vec3;
use serde::Serialize;

use crate::state::settings::CameraSettings;

/// Frame length the fixed smoothing factor is tuned for
const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Camera position, aim point and orthographic zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub zoom: f32,
}

/// Something the camera reports from a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraEvent {
    /// A scripted flight got within the arrival epsilon
    Arrived,
}

/// Eases the camera toward the pose the current selection asks for.
///
/// The target is recomputed from scratch every tick; the only memory is the
/// pose itself and an optional scripted flight.
#[derive(Debug, Clone)]
pub struct CameraController {
    settings: CameraSettings,
    pose: CameraPose,
    flight: Option<CameraPose>,
}

impl CameraController {
    /// Start at the overview pose
    pub fn new(settings: CameraSettings) -> Self {
        let pose = Self::target_for(&settings, None);
        Self {
            settings,
            pose,
            flight: None,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Pose for a selected shelf at `shelf`, or the overview pose
    pub fn target_for(settings: &CameraSettings, shelf: Option<Vec3>) -> CameraPose {
        match shelf {
            Some(position) => CameraPose {
                position: position + settings.shelf_offset,
                look_at: position,
                zoom: settings.zoomed,
            },
            None => CameraPose {
                position: settings.overview_position,
                look_at: Vec3::ZERO,
                zoom: settings.overview,
            },
        }
    }

    /// Current target: the flight if one is active, else the selection's pose
    pub fn target(&self, shelf: Option<Vec3>) -> CameraPose {
        self.flight
            .unwrap_or_else(|| Self::target_for(&self.settings, shelf))
    }

    /// Override the selection target until the camera arrives
    pub fn fly_to(&mut self, position: Vec3, look_at: Vec3, zoom: f32) {
        tracing::debug!("Camera flight to {position}");
        self.flight = Some(CameraPose {
            position,
            look_at,
            zoom,
        });
    }

    /// Smoothing factor for a frame of `dt_ms`
    fn factor(&self, dt_ms: f32) -> f32 {
        let k = self.settings.lerp_factor.clamp(0.0, 1.0);
        if self.settings.time_scaled {
            1.0 - (1.0 - k).powf(dt_ms.max(0.0) / REFERENCE_FRAME_MS)
        } else {
            k
        }
    }

    /// One rendering tick toward the target for `shelf`
    pub fn tick(&mut self, shelf: Option<Vec3>, dt_ms: f32) -> Option<CameraEvent> {
        let target = self.target(shelf);
        let k = self.factor(dt_ms);
        self.pose.position = self.pose.position.lerp(target.position, k);
        self.pose.zoom += (target.zoom - self.pose.zoom) * k;
        self.pose.look_at = target.look_at;

        let flight = self.flight?;
        if self.pose.position.distance(flight.position) < self.settings.arrival_epsilon {
            self.flight = None;
            tracing::debug!("Camera arrived at {}", flight.position);
            return Some(CameraEvent::Arrived);
        }
        None
    }

    /// Scroll zoom from the user, clamped to the configured range
    pub fn user_zoom(&mut self, factor: f32) {
        let zoom = self.pose.zoom * factor;
        self.pose.zoom = zoom.clamp(self.settings.min_zoom, self.settings.max_zoom);
    }

    /// Free orbiting is only allowed in the room overview
    pub fn orbit_enabled(shelf_index: Option<usize>) -> bool {
        shelf_index.is_none()
    }
}
