//! OrderLab Core: trading-day series, indicators, order generation.
//!
//! This crate turns one instrument's adjusted close prices into a daily
//! order series of single-unit trades:
//! - Domain types (trading index, prices, signals, orders, net position)
//! - Indicator feed (SMA, SMA ratio, momentum)
//! - Oracle strategy: hindsight-optimal orders from forward returns
//! - Rule-based strategy: SMA ratio and momentum joined by conjunction
//! - Constrained order scan with terminal flattening
//! - Order-series validation and configuration fingerprinting

pub mod config;
pub mod domain;
pub mod indicators;
pub mod strategy;
pub mod validation;
