//! Core types for the student roster.
//!
//! These types model point totals and the rank tiers derived from them.
//! `rank` is never set independently: it is always recomputed from `points`,
//! so every entry satisfies `entry.rank == RankTier::for_points(entry.points)`.

use serde::{Deserialize, Serialize};

/// Rank tier hierarchy.
///
/// Five tiers with fixed ascending point thresholds. Tiers only ever go up:
/// points are monotonically non-decreasing, so an entry never downgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RankTier {
    /// Starting tier, below 50 points
    #[serde(rename = "Beginner")]
    Beginner,
    /// 50 - 199 points
    #[serde(rename = "Eco Scout")]
    EcoScout,
    /// 200 - 499 points
    #[serde(rename = "Green Hero")]
    GreenHero,
    /// 500 - 999 points
    #[serde(rename = "Planet Protector")]
    PlanetProtector,
    /// 1000 points and up
    #[serde(rename = "Eco Legend")]
    EcoLegend,
}

impl RankTier {
    /// Inclusive lower point bound for this tier.
    pub fn lower_bound(&self) -> u64 {
        match self {
            Self::Beginner => 0,
            Self::EcoScout => 50,
            Self::GreenHero => 200,
            Self::PlanetProtector => 500,
            Self::EcoLegend => 1000,
        }
    }

    /// Compute the tier for a point total.
    ///
    /// Evaluates thresholds from the highest downward and takes the first
    /// whose lower bound is at or below `points`, so boundary values resolve
    /// toward the higher tier.
    pub fn for_points(points: u64) -> Self {
        Self::all_descending()
            .into_iter()
            .find(|tier| points >= tier.lower_bound())
            .unwrap_or(Self::Beginner)
    }

    /// Get the display label, as stored in the `Rank` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::EcoScout => "Eco Scout",
            Self::GreenHero => "Green Hero",
            Self::PlanetProtector => "Planet Protector",
            Self::EcoLegend => "Eco Legend",
        }
    }

    /// All tiers in threshold order (highest first).
    pub fn all_descending() -> Vec<Self> {
        vec![
            Self::EcoLegend,
            Self::PlanetProtector,
            Self::GreenHero,
            Self::EcoScout,
            Self::Beginner,
        ]
    }
}

impl Default for RankTier {
    fn default() -> Self {
        Self::Beginner
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized rank label read back from the store.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown rank label: {0}")]
pub struct UnknownRankLabel(pub String);

impl std::str::FromStr for RankTier {
    type Err = UnknownRankLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Beginner" => Ok(Self::Beginner),
            "Eco Scout" => Ok(Self::EcoScout),
            "Green Hero" => Ok(Self::GreenHero),
            "Planet Protector" => Ok(Self::PlanetProtector),
            "Eco Legend" => Ok(Self::EcoLegend),
            other => Err(UnknownRankLabel(other.to_string())),
        }
    }
}

/// A single student's record on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Opaque unique identifier, primary key
    pub student_id: String,
    /// Display name
    pub name: String,
    /// Accumulated points, only ever increases
    pub points: u64,
    /// Rank tier, derived from `points`
    pub rank: RankTier,
}

impl RosterEntry {
    /// Create a fresh entry at zero points.
    pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            points: 0,
            rank: RankTier::Beginner,
        }
    }

    /// Credit points and recompute the rank.
    pub fn add_points(&mut self, delta: u64) {
        self.points += delta;
        self.rank = RankTier::for_points(self.points);
    }
}

/// The full collection of student records.
///
/// Keyed by `student_id`, insertion-ordered. Insertion order is the display
/// fallback ordering for ties on the leaderboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by student ID.
    pub fn get(&self, student_id: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.student_id == student_id)
    }

    /// Check whether a student ID is present.
    pub fn contains(&self, student_id: &str) -> bool {
        self.get(student_id).is_some()
    }

    /// Find an existing entry or append a fresh one.
    ///
    /// Returns the entry and whether it was newly created (a new entry means
    /// the caller must persist). Calling twice with the same ID never creates
    /// a duplicate row.
    pub fn ensure_entry(
        &mut self,
        student_id: impl Into<String>,
        name: impl Into<String>,
    ) -> (RosterEntry, bool) {
        let student_id = student_id.into();
        if let Some(existing) = self.get(&student_id) {
            return (existing.clone(), false);
        }
        let entry = RosterEntry::new(student_id, name);
        self.entries.push(entry.clone());
        (entry, true)
    }

    /// Insert an entry, replacing any existing row with the same student ID.
    pub fn upsert(&mut self, entry: RosterEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.student_id == entry.student_id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Append an entry only if its student ID is not already present.
    ///
    /// Used when loading rows from the store: the first occurrence of a
    /// duplicated ID wins.
    pub fn insert_if_absent(&mut self, entry: RosterEntry) -> bool {
        if self.contains(&entry.student_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Top entries by points, descending.
    ///
    /// The sort is stable, so ties keep their existing roster order.
    pub fn leaderboard(&self, limit: usize) -> Vec<RosterEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.points.cmp(&a.points));
        sorted.truncate(limit);
        sorted
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RankTier::for_points(0), RankTier::Beginner);
        assert_eq!(RankTier::for_points(49), RankTier::Beginner);
        assert_eq!(RankTier::for_points(50), RankTier::EcoScout);
        assert_eq!(RankTier::for_points(199), RankTier::EcoScout);
        assert_eq!(RankTier::for_points(200), RankTier::GreenHero);
        assert_eq!(RankTier::for_points(499), RankTier::GreenHero);
        assert_eq!(RankTier::for_points(500), RankTier::PlanetProtector);
        assert_eq!(RankTier::for_points(999), RankTier::PlanetProtector);
        assert_eq!(RankTier::for_points(1000), RankTier::EcoLegend);
        assert_eq!(RankTier::for_points(u64::MAX), RankTier::EcoLegend);
    }

    #[test]
    fn test_tier_monotone() {
        let mut last = RankTier::Beginner;
        for points in 0..2000u64 {
            let tier = RankTier::for_points(points);
            assert!(tier >= last, "tier regressed at {} points", points);
            last = tier;
        }
    }

    #[test]
    fn test_tier_labels_round_trip() {
        for tier in RankTier::all_descending() {
            let parsed: RankTier = tier.as_str().parse().unwrap();
            assert_eq!(parsed, tier);
        }
        assert!("Compost Captain".parse::<RankTier>().is_err());
    }

    #[test]
    fn test_add_points_recomputes_rank() {
        let mut entry = RosterEntry::new("STU001", "Ana");
        assert_eq!(entry.rank, RankTier::Beginner);

        entry.add_points(30);
        assert_eq!(entry.points, 30);
        assert_eq!(entry.rank, RankTier::Beginner);

        entry.add_points(20);
        assert_eq!(entry.points, 50);
        assert_eq!(entry.rank, RankTier::EcoScout);
    }

    #[test]
    fn test_ensure_entry_no_duplicates() {
        let mut roster = Roster::new();

        let (entry, created) = roster.ensure_entry("STU001", "Ana");
        assert!(created);
        assert_eq!(entry.points, 0);
        assert_eq!(roster.len(), 1);

        let (entry, created) = roster.ensure_entry("STU001", "Ana");
        assert!(!created);
        assert_eq!(entry.student_id, "STU001");
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_leaderboard_stable_ties() {
        let mut roster = Roster::new();
        for (id, name, points) in [
            ("STU001", "Ana", 120u64),
            ("STU002", "Ben", 300),
            ("STU003", "Cai", 120),
            ("STU004", "Dee", 10),
        ] {
            let mut entry = RosterEntry::new(id, name);
            entry.add_points(points);
            roster.upsert(entry);
        }

        let board = roster.leaderboard(3);
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].student_id, "STU002");
        // Tied at 120: insertion order breaks the tie
        assert_eq!(board[1].student_id, "STU001");
        assert_eq!(board[2].student_id, "STU003");
    }

    #[test]
    fn test_upsert_replaces() {
        let mut roster = Roster::new();
        roster.upsert(RosterEntry::new("STU001", "Ana"));

        let mut updated = RosterEntry::new("STU001", "Ana");
        updated.add_points(75);
        roster.upsert(updated);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("STU001").unwrap().points, 75);
        assert_eq!(roster.get("STU001").unwrap().rank, RankTier::EcoScout);
    }
}
