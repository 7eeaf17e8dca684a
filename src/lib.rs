#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod error;
pub mod validation;
pub mod model;
pub mod db;
pub mod ops;
pub mod queries;
pub mod pagination;
pub mod import;
pub mod config;
pub mod logging;
pub mod server;
pub mod cli;
