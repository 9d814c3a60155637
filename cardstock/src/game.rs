use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One board game, as normalized by the external collection fetcher.
///
/// Fields whose upstream value can be a textual sentinel ("Not Ranked",
/// "N/A") or missing entirely are `Option`s. A `None` feeds the sort-last
/// sentinel during selection and a blank placeholder during rendering, so
/// a single incomplete record never aborts a whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub name: String,
    /// Artwork reference, resolved against the artwork cache by game id.
    pub image: String,
    pub year_published: i32,
    pub min_players: u32,
    pub max_players: u32,
    pub min_playtime: u32,
    pub max_playtime: u32,
    /// Community average rating. `None` when the community has not rated
    /// the game.
    pub average_rating: Option<f64>,
    /// Overall BGG rank. `None` means "Not Ranked".
    pub bgg_rank: Option<u32>,
    pub owned_count: u64,
    /// Community complexity score. `None` when unavailable.
    pub average_weight: Option<f64>,
    /// The collection owner's own rating. `None` means "N/A".
    pub user_rating: Option<f64>,
    pub user_play_count: u32,
    /// Minimum recommended age in years.
    pub age_recommendation: u32,
    /// Community vote tallies per player count. The ascending iteration
    /// order of the map is what the poll aggregation relies on when
    /// collapsing a set of player counts to a `min-max` range.
    pub player_count_poll: BTreeMap<u32, VoteTally>,
    /// Taxonomy ids, used to filter out expansions before selection.
    pub category_ids: BTreeSet<u64>,
}

/// Vote tally for a single player count in the community poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub best: u32,
    pub recommended: u32,
    pub not_recommended: u32,
}

impl VoteTally {
    pub fn total(&self) -> u32 {
        self.best + self.recommended + self.not_recommended
    }

    /// Fraction of all votes that voted "Best". Zero when nobody voted.
    pub fn best_fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            f64::from(self.best) / f64::from(total)
        }
    }
}
