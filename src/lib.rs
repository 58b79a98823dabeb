// src/lib.rs — Library root for callmeter

pub mod cli;
pub mod core;
pub mod infra;
