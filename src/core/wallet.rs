// src/core/wallet.rs — Account balance with a single-owner mutation queue
//
// `Balance` is the plain value. `Wallet` owns one inside a tokio task and
// applies credits and debits strictly in mailbox order, so a purchase and
// a call settlement can never interleave.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::catalog::{self, Catalog};
use super::types::FinalizedSession;
use crate::infra::errors::{MeterError, Result};

/// Spendable coin balance. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Balance {
    amount: f64,
}

impl Balance {
    pub fn new(amount: f64) -> Self {
        Self {
            amount: amount.max(0.0),
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn credit(&mut self, amount: f64) {
        self.amount += amount.max(0.0);
    }

    /// Subtract `amount`, stopping at zero. Returns what was actually taken.
    pub fn debit(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.amount);
        self.amount -= taken;
        taken
    }

    /// Charge a finished call against this balance.
    pub fn settle(&mut self, session: &FinalizedSession) -> f64 {
        self.debit(session.accrued_cost)
    }
}

enum Message {
    Balance {
        response: oneshot::Sender<f64>,
    },
    Purchase {
        package_id: String,
        response: oneshot::Sender<Result<f64>>,
    },
    Settle {
        session: FinalizedSession,
        response: oneshot::Sender<f64>,
    },
}

/// Cloneable address of a running `Wallet`.
#[derive(Clone)]
pub struct WalletMailbox {
    sender: mpsc::Sender<Message>,
}

impl WalletMailbox {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Message) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| MeterError::WalletClosed)?;
        rx.await.map_err(|_| MeterError::WalletClosed)
    }

    pub async fn balance(&self) -> Result<f64> {
        self.request(|response| Message::Balance { response }).await
    }

    /// Credit a catalog package. Unknown ids leave the balance untouched.
    pub async fn purchase(&self, package_id: &str) -> Result<f64> {
        let package_id = package_id.to_string();
        self.request(|response| Message::Purchase {
            package_id,
            response,
        })
        .await?
    }

    /// Debit a finished call. Settling the same session twice is a no-op.
    pub async fn settle(&self, session: &FinalizedSession) -> Result<f64> {
        let session = session.clone();
        self.request(|response| Message::Settle { session, response })
            .await
    }
}

/// Single owner of an account balance.
pub struct Wallet {
    balance: Balance,
    catalog: Catalog,
    /// Ids of sessions already charged. Grows by one per settled call for
    /// the life of the task, since a cloned record can be resubmitted at
    /// any time.
    settled: HashSet<String>,
    mailbox: mpsc::Receiver<Message>,
}

impl Wallet {
    pub fn new(initial: f64, catalog: Catalog, mailbox_size: usize) -> (Self, WalletMailbox) {
        let (sender, mailbox) = mpsc::channel(mailbox_size);
        (
            Self {
                balance: Balance::new(initial),
                catalog,
                settled: HashSet::new(),
                mailbox,
            },
            WalletMailbox { sender },
        )
    }

    /// Run until every mailbox clone is dropped, then yield the final balance.
    pub fn start(self) -> JoinHandle<Balance> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) -> Balance {
        while let Some(message) = self.mailbox.recv().await {
            match message {
                Message::Balance { response } => {
                    let _ = response.send(self.balance.amount());
                }
                Message::Purchase {
                    package_id,
                    response,
                } => {
                    let result = self.catalog.get(&package_id).map(|package| {
                        self.balance =
                            Balance::new(catalog::purchase(self.balance.amount(), package));
                        tracing::info!(
                            package = %package.id,
                            balance = self.balance.amount(),
                            "coins credited"
                        );
                        self.balance.amount()
                    });
                    if let Err(e) = &result {
                        tracing::warn!("purchase rejected: {}", e);
                    }
                    let _ = response.send(result);
                }
                Message::Settle { session, response } => {
                    if self.settled.insert(session.session_id.clone()) {
                        let taken = self.balance.settle(&session);
                        tracing::info!(
                            session = %session.session_id,
                            charged = taken,
                            balance = self.balance.amount(),
                            "call settled"
                        );
                    } else {
                        tracing::debug!(session = %session.session_id, "already settled");
                    }
                    let _ = response.send(self.balance.amount());
                }
            }
        }
        self.balance
    }
}
