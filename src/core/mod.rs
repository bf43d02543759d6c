//! Configuration, data model and the ports the workflow depends on

pub mod config;
pub mod models;
pub mod ports;
