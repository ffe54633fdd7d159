//! HTTP service for the travel planner app: users, travel schedules,
//! feedback and photo metadata over a REST interface.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
