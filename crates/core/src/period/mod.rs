//! Payroll period calculation

pub mod calculator;

pub use calculator::{
    available_periods, next_period, period_containing, period_start_for, previous_period,
};
