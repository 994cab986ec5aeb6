//! Stage identifiers and port directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a stage inside one graph builder's arena.
///
/// Identifiers are dense indices handed out in creation order and are never
/// reused for the lifetime of the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StageId(pub u32);

impl StageId {
    /// The meta-operation's input boundary proxy.
    pub const INPUT: Self = Self(0);

    /// The meta-operation's output boundary proxy.
    pub const OUTPUT: Self = Self(1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this id names one of the two boundary proxies.
    #[inline]
    pub fn is_proxy(self) -> bool {
        self == Self::INPUT || self == Self::OUTPUT
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which way data flows through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}
