// src/cli/progress.rs — Terminal renderer for call meter events

use crate::core::types::MeterEvent;

/// One status line for `event`.
pub fn format_event(event: &MeterEvent) -> String {
    match event {
        MeterEvent::Tick(t) => format!(
            "[{:02}:{:02}] cost={:.2} remaining={:.2}",
            t.elapsed_seconds / 60,
            t.elapsed_seconds % 60,
            t.accrued_cost,
            t.projected_remaining,
        ),
        MeterEvent::LowBalance(t) => format!(
            "[warn] low balance: {:.2} left, call will end soon",
            t.projected_remaining
        ),
        MeterEvent::Ended(f) => format!(
            "[done] {} ({}) cost={:.2} balance={:.2}",
            f.duration_label(),
            f.reason,
            f.accrued_cost,
            f.final_balance,
        ),
    }
}

/// Build a callback that writes events to stderr, keeping stdout for the
/// final record.
pub fn terminal_progress() -> impl Fn(&MeterEvent) + Send + 'static {
    move |event: &MeterEvent| eprintln!("{}", format_event(event))
}
