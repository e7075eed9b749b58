//! Types shared between the counter client library and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
