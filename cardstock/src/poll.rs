use std::collections::BTreeMap;

use crate::format::compact_range;
use crate::game::VoteTally;

/// Reduce a per-player-count vote tally to a compact
/// `"recommended / best"` display string.
///
/// A player count is *best* when more than half of all its votes are
/// "Best", and *recommended* when "Best" and "Recommended" votes together
/// are more than half. The best counts are a subset of the recommended
/// ones by construction, so when both collapse to the same string only
/// one is shown.
pub fn poll_summary(poll: &BTreeMap<u32, VoteTally>) -> String {
    let mut best = Vec::new();
    let mut recommended = Vec::new();
    // Ascending player-count order, so first/last are the extremes.
    for (&player_count, tally) in poll {
        let total = tally.total();
        // An entry without votes qualifies for neither set.
        if tally.best * 2 > total {
            best.push(player_count);
        }
        if (tally.best + tally.recommended) * 2 > total {
            recommended.push(player_count);
        }
    }

    let best_str = group_to_str(&best);
    let recommended_str = group_to_str(&recommended);
    if best_str == recommended_str {
        best_str
    } else {
        format!("{} / {}", recommended_str, best_str)
    }
}

fn group_to_str(player_counts: &[u32]) -> String {
    match player_counts {
        [] => String::from("-"),
        [only] => only.to_string(),
        [first, .., last] => compact_range(*first, *last),
    }
}
