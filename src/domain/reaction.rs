use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

impl ReactionType {
    /// Display order of the reaction bar.
    pub const ALL: [ReactionType; 6] = [
        ReactionType::Like,
        ReactionType::Love,
        ReactionType::Haha,
        ReactionType::Wow,
        ReactionType::Sad,
        ReactionType::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
            ReactionType::Haha => "haha",
            ReactionType::Wow => "wow",
            ReactionType::Sad => "sad",
            ReactionType::Angry => "angry",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ReactionType::Like => "👍",
            ReactionType::Love => "❤️",
            ReactionType::Haha => "😂",
            ReactionType::Wow => "😮",
            ReactionType::Sad => "😢",
            ReactionType::Angry => "😡",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReactionType::Like => "Like",
            ReactionType::Love => "Love",
            ReactionType::Haha => "Haha",
            ReactionType::Wow => "Wow",
            ReactionType::Sad => "Sad",
            ReactionType::Angry => "Angry",
        }
    }

    /// 1-based position in the bar, used for the number keys.
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown reaction '{}', expected one of: like, love, haha, wow, sad, angry",
                    s
                )
            })
    }
}

/// Per-type reaction counts for one item.
///
/// Counts are stored exactly as the server sends them. Display accessors
/// never return a negative number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionCounts(BTreeMap<ReactionType, i64>);

impl ReactionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reaction: ReactionType) -> i64 {
        self.0.get(&reaction).copied().unwrap_or(0)
    }

    pub fn set(&mut self, reaction: ReactionType, count: i64) {
        self.0.insert(reaction, count);
    }

    /// Add one, creating the entry at 1 when absent.
    pub fn increment(&mut self, reaction: ReactionType) {
        *self.0.entry(reaction).or_insert(0) += 1;
    }

    /// Remove one, but only from a positive count.
    pub fn decrement(&mut self, reaction: ReactionType) {
        if let Some(count) = self.0.get_mut(&reaction) {
            if *count > 0 {
                *count -= 1;
            }
        }
    }

    pub fn display_count(&self, reaction: ReactionType) -> u64 {
        self.get(reaction).max(0) as u64
    }

    /// Raw sum over all types, possibly negative if the server sent junk.
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    /// Aggregate for the main button; empty rather than negative.
    pub fn display_total(&self) -> String {
        let total = self.total();
        if total >= 0 {
            total.to_string()
        } else {
            String::new()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReactionType, i64)> + '_ {
        self.0.iter().map(|(t, c)| (*t, *c))
    }
}

impl FromIterator<(ReactionType, i64)> for ReactionCounts {
    fn from_iter<I: IntoIterator<Item = (ReactionType, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What the viewer sees for one item: counts plus their own reaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionState {
    #[serde(default, alias = "reaction_counts")]
    pub counts: ReactionCounts,
    #[serde(default)]
    pub user_reaction: Option<ReactionType>,
}

impl ReactionState {
    pub fn new(counts: ReactionCounts, user_reaction: Option<ReactionType>) -> Self {
        Self {
            counts,
            user_reaction,
        }
    }
}

/// Body returned by the reaction endpoint.
///
/// The server has answered with both `counts` and `reaction_counts` over
/// time; either is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReactionResponse {
    #[serde(default, alias = "reaction_counts")]
    pub counts: Option<ReactionCounts>,
    #[serde(default)]
    pub user_reaction: Option<ReactionType>,
}

impl ReactionResponse {
    /// The authoritative state, if the server sent counts.
    pub fn into_state(self) -> Option<ReactionState> {
        self.counts
            .map(|counts| ReactionState::new(counts, self.user_reaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reaction_type() {
        assert_eq!("LOVE".parse::<ReactionType>().unwrap(), ReactionType::Love);
        assert!("meh".parse::<ReactionType>().is_err());
    }

    #[test]
    fn test_from_index_is_one_based() {
        assert_eq!(ReactionType::from_index(1), Some(ReactionType::Like));
        assert_eq!(ReactionType::from_index(6), Some(ReactionType::Angry));
        assert_eq!(ReactionType::from_index(0), None);
        assert_eq!(ReactionType::from_index(7), None);
    }

    #[test]
    fn test_decrement_never_goes_below_zero() {
        let mut counts = ReactionCounts::new();
        counts.set(ReactionType::Like, 0);
        counts.decrement(ReactionType::Like);
        counts.decrement(ReactionType::Sad);
        assert_eq!(counts.get(ReactionType::Like), 0);
        assert_eq!(counts.get(ReactionType::Sad), 0);
    }

    #[test]
    fn test_negative_total_renders_empty() {
        let counts: ReactionCounts = [(ReactionType::Like, 2), (ReactionType::Wow, -5)]
            .into_iter()
            .collect();
        assert_eq!(counts.total(), -3);
        assert_eq!(counts.display_total(), "");
        assert_eq!(counts.display_count(ReactionType::Wow), 0);
    }

    #[test]
    fn test_total_sums_all_types() {
        let counts: ReactionCounts = [
            (ReactionType::Like, 3),
            (ReactionType::Love, 1),
            (ReactionType::Angry, 2),
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.display_total(), "6");
    }

    #[test]
    fn test_response_accepts_reaction_counts_alias() {
        let response: ReactionResponse = serde_json::from_str(
            r#"{"reaction_counts": {"like": 4, "love": 1}, "user_reaction": "love"}"#,
        )
        .unwrap();
        let state = response.into_state().unwrap();
        assert_eq!(state.counts.get(ReactionType::Like), 4);
        assert_eq!(state.user_reaction, Some(ReactionType::Love));
    }

    #[test]
    fn test_response_without_counts_has_no_state() {
        let response: ReactionResponse =
            serde_json::from_str(r#"{"detail": "ok"}"#).unwrap();
        assert!(response.into_state().is_none());
    }
}
