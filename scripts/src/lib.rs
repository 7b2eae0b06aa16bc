//! Scripts for deploying the platform contracts, recording their artifacts
//! & migrating state between deployment generations.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod address;
pub mod artifacts;
pub mod cli;
pub mod client;
mod commands;
pub mod config;
pub mod contracts;
pub mod environment;
pub mod errors;
pub mod migration;
mod solidity;
