//! Model adapter nodes

mod evaluate;

pub use evaluate::{EvaluateConfig, EvaluateError, EvaluateTask};
