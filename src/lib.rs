//! Stepwise - activity sample ingestion with daily progress, streaks, insights
//! and next-day forecasts.
//!
//! # Overview
//!
//! A mobile collector posts timestamped step/distance/calorie samples. Stepwise
//! stores them, and on every read recomputes:
//!
//! - per-UTC-day totals, counting only each device's latest reading per day
//! - the streak of consecutive days meeting both daily goals
//! - 7-day averages, goal compliance and the best day on record
//! - a least-squares forecast for the next day
//!
//! # Modules
//!
//! - [`model`]: Stored samples, goals and derived payloads
//! - [`store`]: In-memory sample store and ingestion normalization
//! - [`aggregation`]: Per-day aggregation
//! - [`streak`], [`insights`], [`forecast`]: Derived metrics
//! - [`summary`]: Composition of all derived metrics
//! - [`storage`]: SQLite persistence
//! - [`tracker`]: Owned state handle, the only write path
//! - [`api`]: HTTP API handlers
//! - [`config`]: Environment configuration
//! - [`error`]: Error types

pub mod aggregation;
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod model;
pub mod storage;
pub mod store;
pub mod streak;
pub mod summary;
pub mod tracker;
