pub mod adjustment_kind;
pub mod strategy_kind;
pub mod tier;
pub mod week;
