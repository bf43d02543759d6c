//! Small text helpers

pub mod links;
