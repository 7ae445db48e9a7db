pub mod time_parser;

pub use time_parser::{format_duration, parse_duration};
