//! Closed flag vocabulary carried by genealogy nodes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// Part of the primary narrative line (heavier stroke).
    Mainline,
    /// Descent through a non-default line (dashed stroke plus badge).
    Maternal,
    /// Historically or textually uncertain relationship (reduced opacity).
    Uncertain,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Mainline, Flag::Maternal, Flag::Uncertain];

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Mainline => "mainline",
            Flag::Maternal => "maternal",
            Flag::Uncertain => "uncertain",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Flag::Mainline => 1 << 0,
            Flag::Maternal => 1 << 1,
            Flag::Uncertain => 1 << 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown flag: {0}")]
pub struct UnknownFlag(pub String);

impl FromStr for Flag {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mainline" => Ok(Flag::Mainline),
            "maternal" => Ok(Flag::Maternal),
            "uncertain" => Ok(Flag::Uncertain),
            other => Err(UnknownFlag(other.to_string())),
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Flag`]s. A node without a `flags` field carries the empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagSet(u8);

impl FlagSet {
    pub const EMPTY: Self = Self(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, flag: Flag) -> bool {
        (self.0 & flag.bit()) != 0
    }

    pub fn insert(&mut self, flag: Flag) {
        self.0 |= flag.bit();
    }

    pub fn with(mut self, flag: Flag) -> Self {
        self.insert(flag);
        self
    }

    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut set = FlagSet::EMPTY;
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl Serialize for FlagSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
