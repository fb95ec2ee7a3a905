//! NextStep Engine - AI Guide-Hint Generation
//!
//! This crate turns a player's in-game situation into a single reliable
//! next-step hint. It walks a configurable provider fallback chain,
//! generates several candidate replies in parallel, and scores them with
//! a deterministic heuristic before reporting one outcome.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;
