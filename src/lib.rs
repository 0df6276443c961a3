//! # ML Backgammon
//!
//! A backgammon engine with a TD(lambda) self-play learner. The value
//! network is a single-hidden-layer sigmoid MLP built on the Burn ML
//! framework.
//!
//! ## Modules
//!
//! - [`game`]: board, dice, move generation, turn sequencing
//! - [`ai`]: agent traits, feature encoding, value network, TD(lambda) agent
//! - [`training`]: episode driver, self-play trainer, statistics
//! - [`checkpoint`]: model persistence and versioning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
