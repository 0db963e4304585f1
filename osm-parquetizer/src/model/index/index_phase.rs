use std::fmt::Display;

/// lifecycle phase of the coordinate index. the phase only ever moves
/// `Write` -> `Drain`, after which the index is destroyed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IndexPhase {
    /// node coordinates are being inserted
    Write,
    /// way encoding is consuming lookups; inserts are ignored
    Drain,
}

impl Display for IndexPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexPhase::Write => write!(f, "write"),
            IndexPhase::Drain => write!(f, "drain"),
        }
    }
}
