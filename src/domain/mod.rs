//! Core domain types and logic.

pub mod error;
pub mod prices;
pub mod returns;
pub mod selection;
pub mod simulation;
