use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid analysis window: start date {start} is after end date {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Price series for '{instrument}' contains the date {date} more than once")]
    DuplicateDate { instrument: String, date: NaiveDate },
}
