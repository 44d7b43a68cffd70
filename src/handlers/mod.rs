// src/handlers/mod.rs

pub mod bracket;
pub mod employee;
pub mod entry;
pub mod general;
pub mod period;
