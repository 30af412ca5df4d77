//! # vigil-common
//!
//! Types and helpers shared by every `vigil` crate:
//!
//! * **[`network`]**: address ranges, scan targets, host records and LAN detection.
//! * **[`security`]**: findings, severities and risk bands.
//! * **[`summary`]**: the network-wide roll-up produced at the end of an audit.
//! * **[`config`]**: knobs handed to the scanning engine by the caller.
//! * **[`logging`]**: thin macros over `tracing` used across the workspace.

pub mod config;
pub mod logging;
pub mod network;
pub mod security;
pub mod summary;

pub use tracing;
