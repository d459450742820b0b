//! Core types and trait definitions for the Tally subscription ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::SubscriptionStore`]; transports talk to
//! [`service::SubscriptionService`].

// We intentionally use native `async fn` in traits.
#![allow(async_fn_in_trait)]

pub mod billing;
pub mod error;
pub mod period;
pub mod service;
pub mod store;
pub mod subscription;

pub use error::{Error, Result};
