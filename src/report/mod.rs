//! The monthly cash-flow report for a financial year.

mod core;
mod report_page;

pub use core::{MonthlyReport, build_monthly_report};
pub use report_page::get_report_page;
