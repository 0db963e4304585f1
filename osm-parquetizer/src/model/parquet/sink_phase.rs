use std::fmt::Display;

/// processing phase of the sink, inferred from the type of each incoming
/// element. the derived ordering backs the monotonicity rule: the sink
/// only ever advances, never returns to an earlier phase.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum SinkPhase {
    CollectingNodes,
    EmittingWays,
    EmittingRelations,
}

impl Display for SinkPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkPhase::CollectingNodes => write!(f, "collecting nodes"),
            SinkPhase::EmittingWays => write!(f, "emitting ways"),
            SinkPhase::EmittingRelations => write!(f, "emitting relations"),
        }
    }
}
