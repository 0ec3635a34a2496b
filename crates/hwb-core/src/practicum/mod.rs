//! Practicum homework-status API.

pub mod client;

pub use client::{HomeworkSource, PracticumClient};
