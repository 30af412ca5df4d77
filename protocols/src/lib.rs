//! Wire-level knowledge shared by the scanner: which service lives on which port,
//! what to say to it, how to read a version out of its reply, and how to phrase a
//! reverse DNS question.

pub mod dns;
pub mod fingerprint;
pub mod probe;
pub mod services;
