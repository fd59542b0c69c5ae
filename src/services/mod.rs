// src/services/mod.rs
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod fred;
pub mod inflation;
pub mod real_value;
pub mod yahoo;
