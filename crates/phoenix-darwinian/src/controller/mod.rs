//! Evolution orchestration: the pure generation step, the async engine
//! around it and its boundaries
pub mod engine;
pub mod generator;
pub mod hooks;
pub mod report;
pub mod step;

pub use self::engine::PhoenixEngine;
pub use self::generator::{OutputGenerator, SimulatedOutputGenerator, DISTILLATION_TASK, EVALUATION_TASK};
pub use self::hooks::{EvolutionHook, HookRegistry};
pub use self::report::{summarize, AgentSummary, ConfigSummary, EvolutionSummary, GenerationReport};
pub use self::step::{evolve, generation_seed};
