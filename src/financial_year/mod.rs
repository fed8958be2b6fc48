//! Financial years: the bookkeeping periods of a club.

mod core;
mod create_endpoint;
mod detail_page;

pub use core::{
    FinancialYear, create_financial_year_table, get_financial_year, get_financial_years_for_club,
    insert_financial_year,
};
pub use create_endpoint::post_create_financial_year;
pub use detail_page::get_financial_year_page;

pub(crate) use detail_page::{
    ContributionForm, FinancialYearPageForms, FinancialYearState, IndividualDueForm,
    TransactionForm, render_financial_year_page,
};
