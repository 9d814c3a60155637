use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::SelectionError;
use crate::game::GameRecord;

/// Sort key for games a criterion cannot score, so they end up last
/// instead of aborting the run.
pub const SORT_LAST: f64 = 100_000.0;

/// A ranking criterion, mapping a game to an orderable key.
/// Lower key = selected earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Overall BGG rank; unranked games sort last.
    Rank,
    /// Games the community voted best with two players, favoring higher
    /// ratings and lower maximum player counts as tie breakers.
    BestForTwo,
    /// Games supporting many players, tie-broken by rating.
    BestForMany,
    /// Games the collection owner plays often, tie-broken by rating.
    PlayedOften,
}

impl Criterion {
    pub fn sort_key(&self, game: &GameRecord) -> f64 {
        match self {
            Criterion::Rank => match game.bgg_rank {
                Some(rank) => f64::from(rank),
                None => SORT_LAST,
            },
            Criterion::BestForTwo => {
                // A solo-only game can never be best for two.
                if game.max_players == 1 {
                    return SORT_LAST;
                }
                let Some(rating) = game.average_rating else {
                    warn!(id = game.id, "game has no average rating, sorting last");
                    return SORT_LAST;
                };
                let best_fraction = game
                    .player_count_poll
                    .get(&2)
                    .map(|tally| tally.best_fraction())
                    .unwrap_or(0.0);
                -best_fraction - rating / 10.0 + f64::from(game.max_players) / 10.0
            }
            Criterion::BestForMany => {
                let Some(rating) = game.average_rating else {
                    warn!(id = game.id, "game has no average rating, sorting last");
                    return SORT_LAST;
                };
                -f64::from(game.max_players) - rating / 10.0
            }
            Criterion::PlayedOften => {
                let Some(rating) = game.average_rating else {
                    warn!(id = game.id, "game has no average rating, sorting last");
                    return SORT_LAST;
                };
                -f64::from(game.user_play_count) - rating / 10.0
            }
        }
    }
}

/// One configured group: which criterion fills it, how it is labeled on
/// the cards, and its color pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupSpec {
    pub criterion: Criterion,
    pub category: String,
    pub base_color: String,
    pub header_color: String,
    pub size: usize,
}

/// One named, colored partition of the game pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionGroup {
    pub label: String,
    pub category: String,
    pub base_color: String,
    pub header_color: String,
    pub games: Vec<SelectedGame>,
}

/// A game consumed from the pool by one group. The index is its 0-based
/// position within the group, in rank order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectedGame {
    pub index: usize,
    pub group: String,
    pub record: GameRecord,
}

/// Sort the pool by `criterion` and move the first `size` games out of it.
///
/// The sort is stable: games with equal keys keep their pool order, so
/// repeated runs over the same collection select the same cards. When the
/// pool holds fewer than `size` games the whole pool is selected.
pub fn select(pool: &mut Vec<GameRecord>, criterion: Criterion, size: usize) -> Vec<GameRecord> {
    let keys: Vec<f64> = pool.iter().map(|game| criterion.sort_key(game)).collect();
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    order.truncate(size);

    // Remove the selected games by identity, preserving the order of the rest.
    let mut slots: Vec<Option<GameRecord>> = pool.drain(..).map(Some).collect();
    let selected = order.iter().map(|&i| slots[i].take().unwrap()).collect();
    pool.extend(slots.into_iter().flatten());
    selected
}

/// Drain the pool into the configured groups, in order.
///
/// Expansions and explicitly excluded games are dropped first. Each group
/// consumes its games from the pool left behind by the previous one, so no
/// game can appear on two cards. Group labels are `A`, `B`, `C`, … by
/// position.
pub fn partition(
    mut pool: Vec<GameRecord>,
    specs: &[GroupSpec],
    expansion_category: u64,
    exclude: &BTreeSet<u64>,
) -> Result<Vec<SelectionGroup>, SelectionError> {
    pool.retain(|game| !game.category_ids.contains(&expansion_category));
    pool.retain(|game| !exclude.contains(&game.id));

    let mut groups = Vec::with_capacity(specs.len());
    for (position, spec) in specs.iter().enumerate() {
        if spec.size == 0 {
            return Err(SelectionError::EmptyGroup {
                category: spec.category.clone(),
            });
        }
        let label = group_label(position);
        let games = select(&mut pool, spec.criterion, spec.size)
            .into_iter()
            .enumerate()
            .map(|(index, record)| SelectedGame {
                index,
                group: label.clone(),
                record,
            })
            .collect();
        groups.push(SelectionGroup {
            label,
            category: spec.category.clone(),
            base_color: spec.base_color.clone(),
            header_color: spec.header_color.clone(),
            games,
        });
    }
    Ok(groups)
}

// Spreadsheet-style labels: A..Z, then AA, AB, ...
fn group_label(position: usize) -> String {
    let mut rest = position;
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (rest % 26) as u8);
        rest /= 26;
        if rest == 0 {
            break;
        }
        rest -= 1;
    }
    label.reverse();
    String::from_utf8(label).unwrap()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::PoolInput;
    use crate::game::VoteTally;

    fn spec(criterion: Criterion, size: usize) -> GroupSpec {
        GroupSpec {
            criterion,
            category: format!("{:?}", criterion),
            base_color: String::from("#5d8aa8"),
            header_color: String::from("#00308f"),
            size,
        }
    }

    fn game(id: u64) -> GameRecord {
        GameRecord {
            id,
            name: format!("Game {}", id),
            image: format!("https://example.invalid/{}.jpg", id),
            year_published: 2000,
            min_players: 1,
            max_players: 4,
            min_playtime: 30,
            max_playtime: 60,
            average_rating: None,
            bgg_rank: None,
            owned_count: 100,
            average_weight: None,
            user_rating: None,
            user_play_count: 0,
            age_recommendation: 8,
            player_count_poll: BTreeMap::new(),
            category_ids: BTreeSet::new(),
        }
    }

    quickcheck! {
        fn groups_are_disjoint_and_drawn_from_the_pool(input: PoolInput, sizes: Vec<u8>) -> bool {
            let pool_ids: BTreeSet<u64> = input.0.iter().map(|game| game.id).collect();
            let specs: Vec<GroupSpec> = sizes
                .iter()
                .take(5)
                .map(|&size| spec(Criterion::Rank, usize::from(size) + 1))
                .collect();
            let groups = partition(input.0, &specs, 0, &BTreeSet::new()).unwrap();

            let mut seen = BTreeSet::new();
            for group in &groups {
                for selected in &group.games {
                    if !seen.insert(selected.record.id) {
                        return false; // the same game appeared twice
                    }
                }
            }
            seen.is_subset(&pool_ids)
        }
    }

    quickcheck! {
        fn selection_consumes_the_pool(input: PoolInput) -> bool {
            let mut pool = input.0;
            let pool_size = pool.len();
            let selected = select(&mut pool, Criterion::Rank, 3);
            selected.len() == pool_size.min(3) && pool.len() == pool_size - selected.len()
        }
    }

    #[test]
    fn equal_keys_preserve_pool_order() {
        // All games are unranked, so every Rank key is the same sentinel.
        let mut pool: Vec<GameRecord> = [7, 3, 9, 1].into_iter().map(game).collect();
        let selected = select(&mut pool, Criterion::Rank, 3);
        let ids: Vec<u64> = selected.iter().map(|game| game.id).collect();
        assert_eq!(ids, [7, 3, 9]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, 1);
    }

    #[test]
    fn rank_criterion_orders_ranked_before_unranked() {
        let mut ranked = game(1);
        ranked.bgg_rank = Some(12);
        let unranked = game(2);
        assert!(Criterion::Rank.sort_key(&ranked) < Criterion::Rank.sort_key(&unranked));
    }

    #[test]
    fn best_for_two_ignores_solo_games() {
        let mut solo = game(1);
        solo.max_players = 1;
        solo.average_rating = Some(8.0);
        assert_eq!(Criterion::BestForTwo.sort_key(&solo), SORT_LAST);
    }

    #[test]
    fn best_for_two_prefers_voted_games() {
        let mut voted = game(1);
        voted.max_players = 2;
        voted.average_rating = Some(7.0);
        voted.player_count_poll.insert(
            2,
            VoteTally {
                best: 9,
                recommended: 1,
                not_recommended: 0,
            },
        );
        let mut unvoted = game(2);
        unvoted.max_players = 2;
        unvoted.average_rating = Some(7.0);
        assert!(Criterion::BestForTwo.sort_key(&voted) < Criterion::BestForTwo.sort_key(&unvoted));
    }

    #[test]
    fn missing_rating_sorts_last_instead_of_failing() {
        let unrated = game(1);
        assert_eq!(Criterion::BestForMany.sort_key(&unrated), SORT_LAST);
        assert_eq!(Criterion::PlayedOften.sort_key(&unrated), SORT_LAST);
    }

    #[test]
    fn zero_group_size_is_a_configuration_error() {
        let result = partition(vec![game(1)], &[spec(Criterion::Rank, 0)], 0, &BTreeSet::new());
        assert!(matches!(result, Err(SelectionError::EmptyGroup { .. })));
    }

    #[test]
    fn partitions_a_filtered_pool_into_shrinking_groups() {
        const EXPANSION: u64 = 1042;

        let mut pool = Vec::new();
        for id in 1..=30 {
            let mut record = game(id);
            record.bgg_rank = Some(id as u32 * 10);
            record.average_rating = Some(5.0 + (id as f64) / 10.0);
            record.max_players = 2 + (id as u32 % 5);
            record.user_play_count = id as u32;
            if id <= 3 {
                record.category_ids.insert(EXPANSION);
            }
            pool.push(record);
        }
        let exclude = BTreeSet::from([4, 5]);

        let specs = [
            spec(Criterion::Rank, 10),
            spec(Criterion::BestForMany, 10),
            spec(Criterion::PlayedOften, 10),
        ];
        let groups = partition(pool, &specs, EXPANSION, &exclude).unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].label, "A");
        assert_eq!(groups[1].label, "B");
        assert_eq!(groups[2].label, "C");
        assert_eq!(groups[0].games.len(), 10);
        assert_eq!(groups[1].games.len(), 10);
        // 25 games remain after filtering, so the last group comes up short.
        assert_eq!(groups[2].games.len(), 5);

        let mut seen = BTreeSet::new();
        for group in &groups {
            for selected in &group.games {
                assert!(seen.insert(selected.record.id));
                assert!(selected.record.id > 5);
            }
        }

        // Group A is ordered by rank, which follows the ids here.
        let first_ids: Vec<u64> = groups[0].games.iter().map(|s| s.record.id).collect();
        assert_eq!(first_ids, [6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        for (index, selected) in groups[0].games.iter().enumerate() {
            assert_eq!(selected.index, index);
            assert_eq!(selected.group, "A");
        }
    }

    #[test]
    fn group_labels_extend_past_z() {
        assert_eq!(group_label(0), "A");
        assert_eq!(group_label(25), "Z");
        assert_eq!(group_label(26), "AA");
        assert_eq!(group_label(27), "AB");
    }
}
