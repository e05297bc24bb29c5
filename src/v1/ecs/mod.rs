#![forbid(unsafe_code)]

pub mod welcome;
