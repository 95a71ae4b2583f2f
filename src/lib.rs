//! Agrar Dashboard Library
//!
//! Weather-driven harvest recommendations for field crops. The binary wires
//! these modules into a terminal dashboard; they are exposed here for
//! integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod harvest;
pub mod outlook;
pub mod refresh;
pub mod ui;
