// src/core/types.rs — Shared data records for the call meter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a session moved to `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    User,
    InsufficientFunds,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::User => write!(f, "user"),
            EndReason::InsufficientFunds => write!(f, "insufficient-funds"),
        }
    }
}

/// State of a session after a tick (or a read-only snapshot of it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub elapsed_seconds: u64,
    pub accrued_cost: f64,
    pub projected_remaining: f64,
    pub should_terminate: bool,
    pub low_balance: bool,
}

/// Terminal record of a session. Returned unchanged by every `end` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedSession {
    pub session_id: String,
    pub reason: EndReason,
    pub elapsed_seconds: u64,
    pub accrued_cost: f64,
    pub price_per_minute: f64,
    pub starting_balance: f64,
    /// Starting balance minus accrued cost, floored at zero.
    pub final_balance: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl FinalizedSession {
    pub fn duration_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.elapsed_seconds / 60,
            self.elapsed_seconds % 60
        )
    }
}

/// Events emitted by a running tick source.
#[derive(Debug, Clone, PartialEq)]
pub enum MeterEvent {
    Tick(TickResult),
    /// Emitted once, on the first tick where the low-balance flag is set.
    LowBalance(TickResult),
    Ended(FinalizedSession),
}
