use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::entity::{User, UserProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Gold,
    Silver,
    Bronze,
}

impl Badge {
    pub fn for_rank(rank: usize) -> Option<Badge> {
        match rank {
            1 => Some(Badge::Gold),
            2 => Some(Badge::Silver),
            3 => Some(Badge::Bronze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub name: String,
    pub total_score: i64,
    pub badge: Option<Badge>,
    pub is_current_user: bool,
}

/// Sum of the non-null quiz scores in `progress`.
pub fn total_points<'a>(progress: impl IntoIterator<Item = &'a UserProgress>) -> i64 {
    progress
        .into_iter()
        .filter_map(|p| p.quiz_score())
        .map(i64::from)
        .sum()
}

pub fn display_name(user: &User) -> String {
    if user.name().is_empty() {
        let id = user.id().simple().to_string();
        format!("User {}", &id[..4])
    } else {
        user.name().to_string()
    }
}

/// Rank every user with a positive total, highest first.
///
/// `users` must be ordered by id; equal totals keep that order.
pub fn rank(
    users: &[User],
    progress: &[UserProgress],
    current_user: Option<Uuid>,
) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<Uuid, i64> = HashMap::new();
    for p in progress {
        if let Some(score) = p.quiz_score() {
            *totals.entry(p.user_id()).or_default() += i64::from(score);
        }
    }

    let mut scored: Vec<(&User, i64)> = users
        .iter()
        .map(|u| (u, totals.get(&u.id()).copied().unwrap_or(0)))
        .filter(|(_, total)| *total > 0)
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (user, total_score))| LeaderboardEntry {
            rank: i + 1,
            user_id: user.id(),
            name: display_name(user),
            total_score,
            badge: Badge::for_rank(i + 1),
            is_current_user: current_user == Some(user.id()),
        })
        .collect()
}
