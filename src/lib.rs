//! Device lifecycle wizard — three-step guided flow over static demo documents.

pub mod config;
pub mod contract;
pub mod error;
pub mod repl;
pub mod server;
pub mod source;
pub mod views;
pub mod wizard;
