//! Authorization gesture tracking.
//!
//! Once an operator stands at an authorized cabinet facing it, they have
//! `max_wait_ticks` ticks to show the authorization gesture. The gesture is
//! remembered until they turn away, leave the cabinet or disappear.

use guard_common::types::{ActionStatus, Gesture, Pose, VisionSample};

#[derive(Debug, Clone)]
pub struct GestureTracker {
    max_wait_ticks: u32,
    ticks_waiting: u32,
    authorized: bool,
}

impl GestureTracker {
    pub const fn new(max_wait_ticks: u32) -> Self {
        Self {
            max_wait_ticks,
            ticks_waiting: 0,
            authorized: false,
        }
    }

    pub fn reset(&mut self) {
        self.ticks_waiting = 0;
        self.authorized = false;
    }

    /// Advance by one tick.
    ///
    /// `at_authorized_cabinet` is true while the zone tracker reports
    /// `STABLE_AUTH`. `vision` is `None` when nobody is detected.
    pub fn update(
        &mut self,
        vision: Option<&VisionSample>,
        at_authorized_cabinet: bool,
    ) -> ActionStatus {
        let facing = vision.is_some_and(|v| v.pose == Pose::FacingCabinet);
        if !at_authorized_cabinet || !facing {
            self.reset();
            return ActionStatus::Idle;
        }
        if self.authorized {
            return ActionStatus::Ready;
        }
        if vision.is_some_and(|v| v.gesture == Gesture::Authorized) {
            self.authorized = true;
            self.ticks_waiting = 0;
            return ActionStatus::Ready;
        }

        self.ticks_waiting = self.ticks_waiting.saturating_add(1);
        if self.ticks_waiting >= self.max_wait_ticks {
            ActionStatus::ViolationNoGesture
        } else {
            ActionStatus::WaitGesture
        }
    }

    pub fn ticks_waiting(&self) -> u32 {
        self.ticks_waiting
    }
}
