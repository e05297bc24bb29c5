#![forbid(unsafe_code)]

pub mod ecs;
