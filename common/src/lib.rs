//! Types and constants shared by the deployment & migration scripts

#![deny(missing_docs)]

pub mod constants;
pub mod types;
