//! Builds the monthly cash-flow report for a financial year.

use rusqlite::{Connection, named_params};

use crate::{
    Error,
    contribution::{Contribution, get_monthly_contributions},
    financial_year::FinancialYear,
    participant::{ParticipantListRow, get_participants},
    transaction::{FinancialTransaction, TRANSACTION_COLUMNS, map_row_to_transaction},
};

/// A financial year's cash position for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    /// The calendar month the report covers (1-12).
    pub month: u8,
    /// The number of monthly due periods elapsed up to and including `month`,
    /// counted from the financial year's start month. Negative when `month`
    /// falls before the start month.
    pub months_elapsed: i64,
    /// The total paid into the club during the month, in dollars.
    pub sum_credit: f64,
    /// The total paid out of the club during the month, in dollars.
    pub sum_debit: f64,
    /// The total contributions owed per participant by the end of the month.
    pub total_due: f64,
    pub monthly_contributions: Vec<Contribution>,
    pub participants: Vec<ParticipantListRow>,
    pub transactions: Vec<FinancialTransaction>,
}

/// Transactions are matched on calendar month alone, so a transaction dated in
/// a different year still counts as long as its month matches.
fn get_transactions_for_month(
    financial_year_id: i64,
    month: u8,
    connection: &Connection,
) -> Result<Vec<FinancialTransaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM financial_transaction
            WHERE financial_year_id = :financial_year_id
                AND CAST(strftime('%m', transaction_date) AS INTEGER) = :month
            ORDER BY transaction_date ASC, id ASC"
        ))?
        .query_map(
            named_params! {":financial_year_id": financial_year_id, ":month": month},
            map_row_to_transaction,
        )?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// Build the report for one calendar month of a financial year.
///
/// `total_due` multiplies the sum of the monthly contribution amounts by the
/// number of months elapsed since the year's start month.
pub fn build_monthly_report(
    financial_year: &FinancialYear,
    month: u8,
    connection: &Connection,
) -> Result<MonthlyReport, Error> {
    let monthly_contributions = get_monthly_contributions(financial_year.id, connection)?;
    let participants = get_participants(financial_year.id, connection)?;
    let transactions = get_transactions_for_month(financial_year.id, month, connection)?;

    let sum_credit = transactions
        .iter()
        .filter_map(|transaction| transaction.credit)
        .sum();
    let sum_debit = transactions
        .iter()
        .filter_map(|transaction| transaction.debit)
        .sum();

    let start_month = u8::from(financial_year.start_date.month());
    let months_elapsed = i64::from(month) - i64::from(start_month) + 1;

    let monthly_amount: f64 = monthly_contributions
        .iter()
        .map(|contribution| contribution.amount)
        .sum();
    let total_due = monthly_amount * months_elapsed as f64;

    Ok(MonthlyReport {
        month,
        months_elapsed,
        sum_credit,
        sum_debit,
        total_due,
        monthly_contributions,
        participants,
        transactions,
    })
}
