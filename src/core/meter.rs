// src/core/meter.rs — Per-second call metering and low-balance cutoff
//
// A session is billed per elapsed second at a fixed per-minute rate:
// cost = (elapsed_seconds / 60) * price_per_minute. Fractional minutes are
// charged proportionally, never rounded up. Cost is always derived from the
// elapsed counter so it cannot drift from it.
//
// Lifecycle: Idle (no session) -> Active (`SessionMeter::start`) ->
// Terminated (`end`, or a tick that exhausts the balance).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{EndReason, FinalizedSession, TickResult};
use crate::infra::errors::{MeterError, Result};

/// Absorbs float error so a session whose cost lands exactly on the
/// floor terminates on that tick rather than the next.
const COST_EPSILON: f64 = 1e-9;

/// Cost of `elapsed_seconds` at `price_per_minute`.
pub fn accrued_cost(elapsed_seconds: u64, price_per_minute: f64) -> f64 {
    (elapsed_seconds as f64 / 60.0) * price_per_minute
}

/// Low-balance check with the default policy (`remaining < 2 * rate`).
pub fn is_low_balance(projected_remaining: f64, price_per_minute: f64) -> bool {
    MeterPolicy::default().is_low_balance(projected_remaining, price_per_minute)
}

/// Thresholds that decide termination and the low-balance warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterPolicy {
    pub termination_floor: f64,
    pub low_balance_minutes: f64,
}

impl Default for MeterPolicy {
    fn default() -> Self {
        Self {
            termination_floor: 0.0,
            low_balance_minutes: 2.0,
        }
    }
}

impl MeterPolicy {
    pub fn should_terminate(&self, projected_remaining: f64) -> bool {
        projected_remaining <= self.termination_floor + COST_EPSILON
    }

    pub fn is_low_balance(&self, projected_remaining: f64, price_per_minute: f64) -> bool {
        projected_remaining < self.low_balance_minutes * price_per_minute
    }
}

/// Starts sessions under a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct SessionMeter {
    policy: MeterPolicy,
}

impl SessionMeter {
    pub fn new(policy: MeterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MeterPolicy {
        self.policy
    }

    /// Open a session. The balance must cover at least one full minute;
    /// otherwise no session is created.
    pub fn start(&self, price_per_minute: f64, starting_balance: f64) -> Result<CallSession> {
        if !price_per_minute.is_finite() || price_per_minute <= 0.0 {
            return Err(MeterError::InvalidRate {
                rate: price_per_minute,
            });
        }
        // Written as a negated `>=` so a NaN balance is rejected too.
        if !(starting_balance >= price_per_minute) {
            return Err(MeterError::InsufficientFunds {
                balance: starting_balance,
                required: price_per_minute,
            });
        }

        let session = CallSession {
            id: Uuid::new_v4().to_string(),
            price_per_minute,
            starting_balance,
            elapsed_seconds: 0,
            started_at: Utc::now(),
            policy: self.policy,
            state: SessionState::Active,
        };
        tracing::info!(
            session = %session.id,
            price_per_minute,
            starting_balance,
            "call session started"
        );
        Ok(session)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Active,
    Terminated(FinalizedSession),
}

/// One metered call. Mutated only through `tick` and `end`.
#[derive(Debug, Clone)]
pub struct CallSession {
    id: String,
    price_per_minute: f64,
    starting_balance: f64,
    elapsed_seconds: u64,
    started_at: DateTime<Utc>,
    policy: MeterPolicy,
    state: SessionState,
}

impl CallSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn price_per_minute(&self) -> f64 {
        self.price_per_minute
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    pub fn accrued_cost(&self) -> f64 {
        accrued_cost(self.elapsed_seconds, self.price_per_minute)
    }

    pub fn projected_remaining(&self) -> f64 {
        self.starting_balance - self.accrued_cost()
    }

    pub fn is_low_balance(&self) -> bool {
        self.policy
            .is_low_balance(self.projected_remaining(), self.price_per_minute)
    }

    /// Current state as a tick record, without advancing time.
    pub fn snapshot(&self) -> TickResult {
        let accrued_cost = self.accrued_cost();
        let projected_remaining = self.starting_balance - accrued_cost;
        TickResult {
            elapsed_seconds: self.elapsed_seconds,
            accrued_cost,
            projected_remaining,
            should_terminate: self.policy.should_terminate(projected_remaining),
            low_balance: self
                .policy
                .is_low_balance(projected_remaining, self.price_per_minute),
        }
    }

    /// Tick number on which this session will be cut off for funds, or
    /// `None` when that tick does not fit in a `u64`.
    pub fn affordable_seconds(&self) -> Option<u64> {
        let projected_at =
            |n: u64| self.starting_balance - accrued_cost(n, self.price_per_minute);
        let budget = self.starting_balance - self.policy.termination_floor;
        let estimate = ((budget * 60.0) / self.price_per_minute).ceil().max(1.0);
        if estimate >= u64::MAX as f64 {
            return None;
        }
        let mut n = estimate as u64;
        while n > 1 && self.policy.should_terminate(projected_at(n - 1)) {
            n -= 1;
        }
        while !self.policy.should_terminate(projected_at(n)) {
            n = n.checked_add(1)?;
        }
        Some(n)
    }

    /// Advance one billed second. On the tick where the balance is
    /// exhausted the session terminates itself with `InsufficientFunds`.
    /// Ticking a terminated session is an error.
    pub fn tick(&mut self) -> Result<TickResult> {
        if !self.is_active() {
            return Err(MeterError::SessionAlreadyEnded {
                session_id: self.id.clone(),
            });
        }

        self.elapsed_seconds += 1;
        let result = self.snapshot();
        tracing::debug!(
            session = %self.id,
            elapsed = result.elapsed_seconds,
            cost = result.accrued_cost,
            remaining = result.projected_remaining,
            "tick"
        );

        if result.should_terminate {
            tracing::warn!(
                session = %self.id,
                elapsed = result.elapsed_seconds,
                "balance exhausted, ending call"
            );
            self.finalize(EndReason::InsufficientFunds);
        }
        Ok(result)
    }

    /// End the session. Idempotent: later calls return the first record
    /// unchanged, whatever reason they pass.
    pub fn end(&mut self, reason: EndReason) -> FinalizedSession {
        match &self.state {
            SessionState::Terminated(finalized) => finalized.clone(),
            SessionState::Active => self.finalize(reason),
        }
    }

    /// The terminal record, if the session has ended.
    pub fn finalized(&self) -> Option<&FinalizedSession> {
        match &self.state {
            SessionState::Terminated(finalized) => Some(finalized),
            SessionState::Active => None,
        }
    }

    fn finalize(&mut self, reason: EndReason) -> FinalizedSession {
        let accrued_cost = self.accrued_cost();
        let finalized = FinalizedSession {
            session_id: self.id.clone(),
            reason,
            elapsed_seconds: self.elapsed_seconds,
            accrued_cost,
            price_per_minute: self.price_per_minute,
            starting_balance: self.starting_balance,
            final_balance: (self.starting_balance - accrued_cost).max(0.0),
            started_at: self.started_at,
            ended_at: Utc::now(),
        };
        tracing::info!(
            session = %self.id,
            %reason,
            elapsed = finalized.elapsed_seconds,
            cost = finalized.accrued_cost,
            "call session ended"
        );
        self.state = SessionState::Terminated(finalized.clone());
        finalized
    }
}
