use std::fmt;

/// Achievements a player can unlock during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    /// Streak reached exactly three.
    HotStreak,
    /// Score reached 100 or more.
    Century,
    /// Time bonus of 8 or more on a single answer.
    SpeedDemon,
    /// Best streak reached five or more.
    PrecisionMaster,
    /// Answered in under five seconds.
    QuickThinker,
}

impl Badge {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Badge::HotStreak => "Hot Streak",
            Badge::Century => "Century",
            Badge::SpeedDemon => "Speed Demon",
            Badge::PrecisionMaster => "Precision Master",
            Badge::QuickThinker => "Quick Thinker",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Badge::HotStreak => "🔥",
            Badge::Century => "🌟",
            Badge::SpeedDemon | Badge::QuickThinker => "⚡",
            Badge::PrecisionMaster => "🎯",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

/// Badges earned in a session, in award order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeSet(Vec<Badge>);

impl BadgeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a badge. Returns false if it was already held.
    pub fn insert(&mut self, badge: Badge) -> bool {
        if self.0.contains(&badge) {
            return false;
        }
        self.0.push(badge);
        true
    }

    /// Adds every badge and returns the ones that were not held before.
    pub fn union(&mut self, badges: impl IntoIterator<Item = Badge>) -> Vec<Badge> {
        badges.into_iter().filter(|b| self.insert(*b)).collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Badge] {
        &self.0
    }
}
