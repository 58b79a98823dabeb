// src/cli/call.rs — Run a metered call on the real tick source

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::cli::progress;
use crate::core::meter::SessionMeter;
use crate::core::ticker::{spawn_session, SessionHandle};
use crate::core::types::{EndReason, FinalizedSession, MeterEvent};
use crate::core::wallet::{Wallet, WalletMailbox};
use crate::infra::config::Config;

const FAST_TICK: Duration = Duration::from_millis(10);

/// Outcome of one call: the finalized session and the settled balance.
#[derive(Debug, Serialize)]
pub struct CallReport {
    pub session: FinalizedSession,
    pub balance_after: f64,
}

/// Meter a call at `rate` per minute against `balance` until the balance
/// runs out, `max_seconds` elapse, or the user hits Ctrl+C.
pub async fn run_call(
    config: &Config,
    rate: f64,
    balance: f64,
    max_seconds: Option<u64>,
    fast: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (wallet, mailbox) = Wallet::new(balance, config.catalog()?, 16);
    let wallet_task = wallet.start();

    let meter = SessionMeter::new(config.billing.policy());
    let period = if fast {
        FAST_TICK
    } else {
        config.billing.tick_interval()
    };
    let render = progress::terminal_progress();

    let report = meter_call(
        &mailbox,
        &meter,
        rate,
        period,
        max_seconds,
        tokio::signal::ctrl_c(),
        &render,
    )
    .await?;

    drop(mailbox);
    wallet_task.await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let finalized = &report.session;
        println!(
            "Call {} ended by {} after {}: charged {:.2}, balance {:.2}",
            finalized.session_id,
            finalized.reason,
            finalized.duration_label(),
            finalized.accrued_cost,
            report.balance_after,
        );
    }
    Ok(())
}

/// Open a session against the wallet's balance, tick it every `period`
/// until it ends, then settle the cost back into the wallet.
pub async fn meter_call(
    mailbox: &WalletMailbox,
    meter: &SessionMeter,
    rate: f64,
    period: Duration,
    max_seconds: Option<u64>,
    shutdown: impl Future,
    render: &impl Fn(&MeterEvent),
) -> anyhow::Result<CallReport> {
    let opening = mailbox.balance().await?;
    let session = meter.start(rate, opening)?;

    match session.affordable_seconds() {
        Some(seconds) => eprintln!(
            "[call] {:.2}/min, balance {:.2} covers {}s",
            rate, opening, seconds
        ),
        None => eprintln!(
            "[call] {:.2}/min, balance {:.2} will not run out",
            rate, opening
        ),
    }

    let (handle, mut events) = spawn_session(session, period);
    let session = drive_call(&handle, &mut events, max_seconds, shutdown, render).await;
    let balance_after = mailbox.settle(&session).await?;

    Ok(CallReport {
        session,
        balance_after,
    })
}

/// Render events until the session ends on its own, `max_seconds` billed
/// seconds pass, or `shutdown` resolves. The last two end the call as a
/// user hang-up.
pub async fn drive_call(
    handle: &SessionHandle,
    events: &mut UnboundedReceiver<MeterEvent>,
    max_seconds: Option<u64>,
    shutdown: impl Future,
    render: &impl Fn(&MeterEvent),
) -> FinalizedSession {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                let finalized = handle.end(EndReason::User);
                render(&MeterEvent::Ended(finalized.clone()));
                break finalized;
            }
            event = events.recv() => match event {
                Some(MeterEvent::Ended(finalized)) => {
                    render(&MeterEvent::Ended(finalized.clone()));
                    break finalized;
                }
                Some(event) => {
                    render(&event);
                    if let MeterEvent::Tick(t) = &event {
                        if max_seconds.is_some_and(|max| t.elapsed_seconds >= max) {
                            let finalized = handle.end(EndReason::User);
                            render(&MeterEvent::Ended(finalized.clone()));
                            break finalized;
                        }
                    }
                }
                // Stream closed without an Ended event; `end` returns whatever it recorded.
                None => break handle.end(EndReason::User),
            }
        }
    }
}
