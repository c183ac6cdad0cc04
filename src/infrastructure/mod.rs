pub mod demographics_client;
pub mod spreadsheet_reader;
