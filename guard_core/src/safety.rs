//! Three-state safety verdict: SAFE_STABLE / TRANSITION / DANGER_STABLE.
//!
//! The line zone selects the state label; the cabinet flag can only take
//! `safe` away, never grant it. Every tick produces a verdict; the machine
//! keeps the previous state only for transition logging.

use guard_common::types::{LineZone, OnLinePolicy, SafetyState};
use serde::Serialize;

/// Inputs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyInput {
    pub line_zone: LineZone,
    pub is_authorized_cabinet: bool,
    pub has_motion: bool,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyVerdict {
    pub state: SafetyState,
    pub previous: SafetyState,
    pub safe: bool,
    pub output_enabled: bool,
    pub reason: String,
}

impl SafetyVerdict {
    #[inline]
    pub fn changed(&self) -> bool {
        self.state != self.previous
    }
}

/// Safety state machine.
#[derive(Debug, Clone)]
pub struct SafetyStateMachine {
    state: SafetyState,
    policy: OnLinePolicy,
}

impl SafetyStateMachine {
    pub const fn new(policy: OnLinePolicy) -> Self {
        Self {
            state: SafetyState::Transition,
            policy,
        }
    }

    #[inline]
    pub const fn state(&self) -> SafetyState {
        self.state
    }

    #[inline]
    pub const fn policy(&self) -> OnLinePolicy {
        self.policy
    }

    /// Evaluate one tick.
    pub fn evaluate(&mut self, input: SafetyInput) -> SafetyVerdict {
        use LineZone as Z;
        use SafetyState as S;

        let (next, zone_safe) = match input.line_zone {
            Z::InsideDanger => (S::DangerStable, false),
            Z::OnLine => (S::Transition, self.policy == OnLinePolicy::Permissive),
            Z::OutsideSafe => (S::SafeStable, true),
        };
        let safe = zone_safe && input.is_authorized_cabinet;
        let output_enabled =
            safe && input.is_authorized_cabinet && input.line_zone != Z::InsideDanger;

        let mut reason = format!("zone={}", input.line_zone);
        if input.line_zone == Z::OnLine && self.policy == OnLinePolicy::Strict {
            reason.push_str(", on line (strict)");
        }
        if !input.is_authorized_cabinet {
            reason.push_str(", cabinet unauthorized");
        }
        if input.has_motion {
            reason.push_str(", motion");
        }

        let previous = self.state;
        self.state = next;
        if previous != next {
            tracing::info!(
                from = %previous,
                to = %next,
                output_enabled,
                %reason,
                "safety state transition"
            );
        }

        SafetyVerdict {
            state: next,
            previous,
            safe,
            output_enabled,
            reason,
        }
    }
}

impl Default for SafetyStateMachine {
    fn default() -> Self {
        Self::new(OnLinePolicy::default())
    }
}
