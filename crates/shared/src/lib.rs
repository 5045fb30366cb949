//! Types shared by the enrollment core and the conference server.

pub mod domain;
pub mod error;
pub mod protocol;
