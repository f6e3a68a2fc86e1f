// Read-side seam to the persistent league store.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{ExhibitionRoster, Player, PlayerId, Team, TeamId, TeamSeason};

pub use memory::MemoryStore;

/// Read access to persisted league records. Lookups of a single record
/// return `Ok(None)` when it does not exist.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    /// All players currently assigned to `tid`, in no particular order.
    async fn roster(&self, tid: TeamId) -> Result<Vec<Player>, StoreError>;

    async fn team(&self, tid: TeamId) -> Result<Option<Team>, StoreError>;

    async fn team_season(&self, tid: TeamId, season: i32) -> Result<Option<TeamSeason>, StoreError>;

    async fn player(&self, pid: PlayerId) -> Result<Option<Player>, StoreError>;
}

/// Source of the two selected sides of the season's exhibition game.
#[async_trait]
pub trait ExhibitionRosters: Send + Sync {
    /// The season's roster, creating an unfinalized one if none exists.
    async fn get_or_create(&self, season: i32) -> Result<ExhibitionRoster, StoreError>;

    /// Complete selection for the season and return the finalized roster.
    async fn finalize(&self, season: i32) -> Result<ExhibitionRoster, StoreError>;
}
