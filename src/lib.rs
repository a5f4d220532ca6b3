//! Core library for the harga-tools command line application.
//!
//! The library scores spreadsheets of property records with a previously
//! trained price model. IO adapters live under [`io`], the shared table
//! representation in [`table`], cleaning in [`normalize`], model artifacts in
//! [`model`], scoring in [`predict`], presentation in [`present`], and the
//! orchestration in [`pipeline`] and [`session`].

pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod predict;
pub mod present;
pub mod session;
pub mod table;

pub use error::{Result, ToolError};
