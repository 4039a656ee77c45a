//! # Phoenix Store
//!
//! Persistence boundary for agent state.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 AgentStore                   │
//! │   save / load / list / delete (async)        │
//! ├──────────────────────┬───────────────────────┤
//! │ InMemoryAgentStore   │ JsonFileStore         │
//! │ (DashMap)            │ ({id}.json + cache)   │
//! └──────────────────────┴───────────────────────┘
//! ```
//!
//! Records round-trip without loss, including performance history and
//! its statistical significance. A [`PopulationRoster`] next to the store
//! names the agents of the latest population.

pub mod json;
pub mod memory;
pub mod roster;
pub mod store;

pub use json::JsonFileStore;
pub use memory::InMemoryAgentStore;
pub use roster::{PopulationRoster, ROSTER_FILE};
pub use store::{load_all, save_population, validate_id, AgentStore};
