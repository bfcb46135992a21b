//! toolrank-ranker: Signal normalisation, composite scoring and rank history.
//!
//! Pipeline order: `merge` → `normalise` → `scorer` → `rank_history` → `leaderboard`.

pub mod merge;
pub mod normalise;
pub mod weights;
pub mod scorer;
pub mod rank_history;
pub mod leaderboard;

pub use merge::merge_history;
pub use normalise::Normalisation;
pub use weights::SignalWeights;
pub use scorer::compose_scores;
pub use rank_history::{build_rank_history, rank_values, RankMethod, RankTable};
pub use leaderboard::{
    build_leaderboard, build_rank_view, CurrentRank, Leaderboard, LeaderboardEntry, RankPoint, RankView,
    RankViewOptions,
};
