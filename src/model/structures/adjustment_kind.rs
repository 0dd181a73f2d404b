use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AdjustmentKind {
    /// First entry into the store
    Initial = 0,
    /// Season-boundary pull toward the tier baseline
    Regression = 1,
    /// One batched week settlement
    Week = 2,
    /// One sequentially applied game
    Game = 3
}
