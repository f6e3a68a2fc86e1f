// Library root for the pre-game state compiler: turns persisted league
// records into simulation-ready team and player states.

pub mod collaborators;
pub mod composite;
pub mod context;
pub mod error;
pub mod loader;
pub mod model;
pub mod player;
pub mod playoffs;
pub mod request;
pub mod rules;
pub mod store;
pub mod team;

pub use context::{LeagueContext, Phase, Sport};
pub use error::{LoadError, RulesError, StoreError};
pub use loader::{TeamStateLoader, TeamStates};
pub use rules::SimRules;
