mod order_parser;

pub use order_parser::{parse_order, ParseFailure, ParsedItem, ParsedOrder};
