//! # vigil-core
//!
//! The scanning engine. Discovery finds live hosts, the port scanner probes their
//! services, and the classifier and risk scorer turn what was seen into findings and
//! scores. [`audit::AuditService`] runs the whole pipeline.

pub mod audit;
pub mod classifier;
pub mod discovery;
pub mod liveness;
pub mod neighbors;
pub mod network;
pub mod os;
pub mod resolver;
pub mod risk;
pub mod scanner;
pub mod vendors;
