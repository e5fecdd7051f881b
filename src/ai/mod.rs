//! 电脑对手模块（随机、启发式与 minimax 策略）。

pub mod minimax;

pub use minimax::{AiAgent, AiDecision, AiDifficulty};
