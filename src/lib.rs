//! Payroll and contract settlement engine for Colombian labor law.
//!
//! This crate calculates periodic payroll entries (salary, transport
//! allowance, overtime, social security, solidarity fund, withholding tax)
//! and final contract settlements (cesantías, prima, vacation,
//! indemnification), with an audit trace for every step and an HTTP API in
//! front of the payroll period and settlement lifecycles.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
