//! Client core: lifecycle, actor and subscription handle.
//!
//! The public API from this module is [`StreamClient`] (with its builder) and
//! the [`Subscription`] it returns.
//!
//! Internal modules:
//! - [`lifecycle`]: I/O-free connection state machine emitting actions;
//! - [`actor`]: async task executing those actions against a transport;
//! - [`log`]: event log, published state and the delivery gate;
//! - [`subscription`]: caller-facing handle;
//! - [`client`] / [`builder`]: construction.

mod actor;
mod builder;
mod client;
mod lifecycle;
mod log;
mod subscription;

pub use builder::StreamClientBuilder;
pub use client::StreamClient;
pub use subscription::{Disconnector, Subscription};
