use std::collections::{BTreeMap, BTreeSet};

use quickcheck::{Arbitrary, Gen};

use crate::{GameRecord, VoteTally};

/// A pool of games with pairwise distinct ids, the precondition the
/// selection engine works under.
#[derive(Clone, Debug)]
pub struct PoolInput(pub Vec<GameRecord>);

impl Arbitrary for VoteTally {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            best: u32::arbitrary(g) % 50,
            recommended: u32::arbitrary(g) % 50,
            not_recommended: u32::arbitrary(g) % 50,
        }
    }
}

impl Arbitrary for PoolInput {
    fn arbitrary(g: &mut Gen) -> Self {
        // Generating the id set first guarantees uniqueness.
        let ids = BTreeSet::<u64>::arbitrary(g);
        let games = ids.into_iter().map(|id| arbitrary_record(g, id)).collect();
        PoolInput(games)
    }
}

fn arbitrary_record(g: &mut Gen, id: u64) -> GameRecord {
    let max_players = 1 + u32::arbitrary(g) % 8;
    let min_playtime = u32::arbitrary(g) % 180;
    let mut player_count_poll = BTreeMap::new();
    for player_count in 1..=max_players {
        if bool::arbitrary(g) {
            player_count_poll.insert(player_count, VoteTally::arbitrary(g));
        }
    }
    GameRecord {
        id,
        name: format!("Game {}", id),
        image: format!("https://example.invalid/{}.jpg", id),
        year_published: 1990 + (u8::arbitrary(g) % 35) as i32,
        min_players: 1 + u32::arbitrary(g) % max_players,
        max_players,
        min_playtime,
        max_playtime: min_playtime + u32::arbitrary(g) % 120,
        average_rating: Option::<u8>::arbitrary(g).map(|r| f64::from(r % 100) / 10.0),
        bgg_rank: Option::<u32>::arbitrary(g).map(|r| 1 + r % 20_000),
        owned_count: u64::from(u16::arbitrary(g)),
        average_weight: Option::<u8>::arbitrary(g).map(|w| f64::from(w % 50) / 10.0),
        user_rating: Option::<u8>::arbitrary(g).map(|r| f64::from(r % 100) / 10.0),
        user_play_count: u32::from(u8::arbitrary(g)),
        age_recommendation: u32::arbitrary(g) % 18,
        player_count_poll,
        category_ids: BTreeSet::arbitrary(g),
    }
}
