//
// ─── LEADERBOARD ───────────────────────────────────────────────────────────────
//

/// One row of a ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub xp: u32,
}

/// Ranks players by XP, highest first, ranks starting at 1.
///
/// The sort is stable so equal scores keep their input order.
#[must_use]
pub fn rank_by_xp(players: Vec<(String, u32)>) -> Vec<LeaderboardEntry> {
    let mut players = players;
    players.sort_by(|a, b| b.1.cmp(&a.1));

    players
        .into_iter()
        .enumerate()
        .map(|(i, (name, xp))| LeaderboardEntry {
            rank: i + 1,
            name,
            xp,
        })
        .collect()
}
