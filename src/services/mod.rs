// src/services/mod.rs

pub mod aggregate;
pub mod brackets;
pub mod calculator;
pub mod components;
pub mod lifecycle;
pub mod period;
