//! # Darwinian
//!
//! Evolutionary operators and the orchestrator of PHOENIX runs.
//!
//! ## Generation Step
//!
//! ```text
//! evaluate ──► distill top ⌈n/5⌉ ──► select ──► breed ──► mutate ──► elite ∪ offspring
//!                                                                        │
//!                              statistics + convergence ◄───────────────┘
//! ```
//!
//! Everything after distillation is the pure [`evolve`] function; the
//! [`PhoenixEngine`] adds the async output generator and hook boundaries.
//!
//! ## Convergence
//!
//! A run converges when the variance of the last five average fitness values
//! and of the last five diversity values are both below the configured
//! threshold.

pub mod breeding;
pub mod controller;
pub mod diversity;
pub mod mutation;
pub mod population;
pub mod selection;
pub mod statistics;

pub use breeding::{
    breed, clone_parent, genetic_compatibility, BreedingParams, BreedingResult, OffspringSlot,
};
pub use controller::{
    evolve, summarize, EvolutionHook, EvolutionSummary, GenerationReport, OutputGenerator,
    PhoenixEngine, SimulatedOutputGenerator,
};
pub use diversity::{diversity_metrics, diversity_score, maintain_diversity, trait_distance};
pub use mutation::{mutate, mutate_all, MutationReport};
pub use population::{fit_to_size, initial_population, synthesize_population};
pub use selection::{ranked_by_fitness, ParentSelector};
pub use statistics::{check_convergence, generation_statistics};
