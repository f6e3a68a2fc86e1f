// Resolving requested team ids into regular teams or exhibition sides.

use std::collections::BTreeSet;

use crate::error::LoadError;
use crate::model::TeamId;

/// One side of the exhibition game. Each side has a reserved team id that
/// never belongs to a league team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExhibitionSide {
    First,
    Second,
}

impl ExhibitionSide {
    /// Index into [`crate::model::ExhibitionRoster::sides`].
    pub fn index(&self) -> usize {
        match self {
            ExhibitionSide::First => 0,
            ExhibitionSide::Second => 1,
        }
    }

    pub fn tid(&self) -> TeamId {
        match self {
            ExhibitionSide::First => -1,
            ExhibitionSide::Second => -2,
        }
    }

    pub fn from_tid(tid: TeamId) -> Option<Self> {
        match tid {
            -1 => Some(ExhibitionSide::First),
            -2 => Some(ExhibitionSide::Second),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeamRequest {
    Regular(TeamId),
    ExhibitionSide(ExhibitionSide),
}

impl TeamRequest {
    /// Classify a list of requested ids.
    ///
    /// Exactly the two reserved ids (in either order) make an exhibition
    /// request. Anything else must be a non-empty list of distinct league
    /// team ids.
    pub fn resolve(tids: &[TeamId]) -> Result<Vec<TeamRequest>, LoadError> {
        if tids.is_empty() {
            return Err(LoadError::InvalidRequest("no teams requested".into()));
        }

        let mut seen = BTreeSet::new();
        if let Some(dup) = tids.iter().find(|tid| !seen.insert(**tid)) {
            return Err(LoadError::InvalidRequest(format!("team {dup} requested twice")));
        }

        let sides: Vec<ExhibitionSide> = tids.iter().filter_map(|t| ExhibitionSide::from_tid(*t)).collect();
        if sides.len() == 2 && tids.len() == 2 {
            return Ok(sides.into_iter().map(TeamRequest::ExhibitionSide).collect());
        }
        if let Some(side) = sides.first() {
            return Err(LoadError::InvalidRequest(format!(
                "exhibition team {} can only be requested together with its opponent",
                side.tid()
            )));
        }

        Ok(tids.iter().copied().map(TeamRequest::Regular).collect())
    }

    pub fn tid(&self) -> TeamId {
        match self {
            TeamRequest::Regular(tid) => *tid,
            TeamRequest::ExhibitionSide(side) => side.tid(),
        }
    }

    pub fn is_exhibition(&self) -> bool {
        matches!(self, TeamRequest::ExhibitionSide(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_ids_pass_through_in_order() {
        let reqs = TeamRequest::resolve(&[4, 0, 9]).unwrap();
        assert_eq!(
            reqs,
            vec![TeamRequest::Regular(4), TeamRequest::Regular(0), TeamRequest::Regular(9)]
        );
        assert!(reqs.iter().all(|r| !r.is_exhibition()));
    }

    #[test]
    fn both_sentinels_make_an_exhibition_in_either_order() {
        let reqs = TeamRequest::resolve(&[-2, -1]).unwrap();
        assert_eq!(
            reqs,
            vec![
                TeamRequest::ExhibitionSide(ExhibitionSide::Second),
                TeamRequest::ExhibitionSide(ExhibitionSide::First),
            ]
        );
        assert_eq!(reqs[0].tid(), -2);
        assert_eq!(reqs[1].tid(), -1);
    }

    #[test]
    fn lone_or_mixed_sentinel_is_rejected() {
        assert!(matches!(
            TeamRequest::resolve(&[-1]),
            Err(LoadError::InvalidRequest(_))
        ));
        assert!(matches!(
            TeamRequest::resolve(&[-1, 3]),
            Err(LoadError::InvalidRequest(_))
        ));
        assert!(matches!(
            TeamRequest::resolve(&[-1, -2, 0]),
            Err(LoadError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_and_duplicate_requests_are_rejected() {
        assert!(matches!(TeamRequest::resolve(&[]), Err(LoadError::InvalidRequest(_))));
        let err = TeamRequest::resolve(&[1, 2, 1]).unwrap_err();
        assert_eq!(err.to_string(), "invalid team request: team 1 requested twice");
        assert!(matches!(
            TeamRequest::resolve(&[-1, -1]),
            Err(LoadError::InvalidRequest(_))
        ));
    }

    #[test]
    fn side_indices_and_ids() {
        assert_eq!(ExhibitionSide::First.index(), 0);
        assert_eq!(ExhibitionSide::Second.index(), 1);
        assert_eq!(ExhibitionSide::from_tid(-1), Some(ExhibitionSide::First));
        assert_eq!(ExhibitionSide::from_tid(0), None);
    }
}
