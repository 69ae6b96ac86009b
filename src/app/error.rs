use thiserror::Error;

/// Request failures that end up as a message on the input form.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
  #[error("Please provide a company ticker or company name.")]
  MissingInput,
  #[error("Could not find a ticker symbol for \"{0}\". Please enter the ticker directly.")]
  TickerNotResolved(String),
  #[error("Error retrieving financial data. Please check the ticker symbol.")]
  DataUnavailable(String),
}
