//! Moderation oracle over HTTP.
//!
//! The oracle service receives a locked rumor's content and aggregate vote
//! statistics and answers whether the result should be extended. The
//! engine never sees this crate directly; it only holds an
//! `Arc<dyn ModerationOracle>`.

pub mod client;

pub use client::{HttpModerationOracle, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
