// src/core/mod.rs — Call metering and coin economy

pub mod catalog;
pub mod meter;
pub mod ticker;
pub mod types;
pub mod wallet;

pub use catalog::{purchase, Catalog, CoinPackage};
pub use meter::{
    accrued_cost, is_low_balance, CallSession, MeterPolicy, SessionMeter, SessionState,
};
pub use ticker::{spawn_session, SessionHandle};
pub use types::{EndReason, FinalizedSession, MeterEvent, TickResult};
pub use wallet::{Balance, Wallet, WalletMailbox};
