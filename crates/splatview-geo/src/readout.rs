//! Per-frame camera position readout.
//!
//! ECEF is cheap and reported whenever the camera moves. The geodetic solve is
//! deferred until the camera has stayed put for a settle period, then run
//! once; until then readouts carry the last geodetic value forward.

use std::time::{Duration, Instant};

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::geodetic::Geodetic;
use crate::transform::EcefTransform;

/// Default movement (scene units) that counts as the camera moving.
pub const DEFAULT_MOVEMENT_THRESHOLD: f32 = 0.001;

/// Default stillness required before the geodetic position is refreshed.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// One readout of the camera position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraReadout {
    pub local: Vec3,
    pub ecef: DVec3,
    pub geodetic: Geodetic,
}

/// Decides when to emit camera readouts and when to refresh the geodetic value.
#[derive(Debug, Clone)]
pub struct ReadoutTracker {
    movement_threshold: f32,
    settle: Duration,
    last_position: Vec3,
    last_moved: Option<Instant>,
    geodetic: Geodetic,
    geodetic_fresh: bool,
}

impl ReadoutTracker {
    /// Creates a tracker.
    pub fn new(movement_threshold: f32, settle: Duration) -> Self {
        Self {
            movement_threshold,
            settle,
            last_position: Vec3::ZERO,
            last_moved: None,
            geodetic: Geodetic::default(),
            geodetic_fresh: false,
        }
    }

    /// The last geodetic value computed.
    pub fn last_geodetic(&self) -> Geodetic {
        self.geodetic
    }

    /// Feeds the camera position for one frame.
    ///
    /// Returns a readout when the camera moved more than the threshold, or when
    /// it has just settled and the geodetic value was refreshed. Returns `None`
    /// on frames with nothing new to report.
    pub fn update(
        &mut self,
        local: Vec3,
        now: Instant,
        transform: &EcefTransform,
    ) -> Option<CameraReadout> {
        let moved = local.distance(self.last_position) > self.movement_threshold;
        let mut refresh = false;

        if moved {
            self.last_position = local;
            self.last_moved = Some(now);
            self.geodetic_fresh = false;
        } else if !self.geodetic_fresh {
            let still_for = self
                .last_moved
                .map_or(self.settle, |at| now.saturating_duration_since(at));
            refresh = still_for >= self.settle;
        }

        let ecef = transform.local_to_ecef(local.as_dvec3());
        if refresh {
            let solution = transform.solve_at(local.as_dvec3());
            if !solution.converged {
                log::warn!(
                    "geodetic readout did not converge after {} iterations",
                    solution.iterations
                );
            }
            self.geodetic = solution.geodetic;
            self.geodetic_fresh = true;
        }

        (moved || refresh).then_some(CameraReadout {
            local,
            ecef,
            geodetic: self.geodetic,
        })
    }
}

impl Default for ReadoutTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MOVEMENT_THRESHOLD, DEFAULT_SETTLE)
    }
}
