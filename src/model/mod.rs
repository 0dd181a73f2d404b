pub mod config;
pub mod constants;
pub mod elo_model;
pub mod outcome;
pub mod rating_tracker;
pub mod regression;
pub mod roster;
pub mod settlement;
pub mod structures;
