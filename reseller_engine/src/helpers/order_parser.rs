//! Free-text order parsing.
//!
//! Orders are typed by people, so there is no fixed grammar. The first token is the destination link and the rest
//! is scanned for known product names, each of which must be followed by a quantity:
//!
//! ```text
//! /order https://example.test/post Views 10000, likes 500 / comments 20
//! ```
//!
//! Anything between items (commas, slashes, words that are not product names) is ignored. Scanning stops at the first
//! product name that is not followed by digits.
use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("A link and at least one product with a quantity are required.")]
    MissingArguments,
    #[error("There are no products in the catalog yet.")]
    EmptyCatalog,
    #[error("No product with a quantity was found in the order.")]
    NoItemsParsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Catalog key of the matched product
    pub product_key: String,
    /// The product name as the customer typed it
    pub display_name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOrder {
    /// Passed through verbatim. The fulfillment panel decides whether it is a usable link.
    pub destination_link: String,
    pub items: Vec<ParsedItem>,
}

impl Display for ParsedOrder {
    /// Writes the order back out in canonical form, which parses to the same order again.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.destination_link)?;
        for item in &self.items {
            write!(f, " {} {}", item.display_name, item.quantity)?;
        }
        Ok(())
    }
}

static QUANTITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)\s*").expect("quantity pattern is a valid regex"));

/// Lower-cased copy of a string that remembers where each byte came from, so that matches can be reported with the
/// customer's original casing.
struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    origin: Vec<usize>,
}

impl<'a> FoldedText<'a> {
    fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len() + 1);
        for (offset, c) in original.char_indices() {
            for lower in c.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat(offset).take(lower.len_utf8()));
            }
        }
        origin.push(original.len());
        Self { original, folded, origin }
    }

    fn original_span(&self, start: usize, end: usize) -> &'a str {
        &self.original[self.origin[start]..self.origin[end]]
    }
}

/// Finds the product name that starts earliest at or after `from`. When several start at the same offset, the longest
/// one wins, so `views` beats `view`.
fn earliest_match<'k>(text: &str, from: usize, keys: &'k [String]) -> Option<(usize, &'k str)> {
    keys.iter()
        .filter_map(|key| text[from..].find(key.as_str()).map(|i| (from + i, key.as_str())))
        .min_by(|(a_start, a_key), (b_start, b_key)| a_start.cmp(b_start).then(b_key.len().cmp(&a_key.len())))
}

/// Parses an order command body against the given catalog keys.
///
/// Keys are compared case-insensitively and may match anywhere in the text, including inside longer words.
pub fn parse_order<S: AsRef<str>>(body: &str, catalog_keys: &[S]) -> Result<ParsedOrder, ParseFailure> {
    let body = body.trim();
    let (link, remainder) = match body.split_once(char::is_whitespace) {
        Some((link, rest)) if !rest.trim().is_empty() => (link, rest.trim()),
        _ => return Err(ParseFailure::MissingArguments),
    };
    let mut keys = catalog_keys
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect::<Vec<String>>();
    keys.sort();
    keys.dedup();
    if keys.is_empty() {
        return Err(ParseFailure::EmptyCatalog);
    }
    let text = FoldedText::new(remainder);
    let mut items = Vec::new();
    let mut pos = 0;
    while let Some((start, key)) = earliest_match(&text.folded, pos, &keys) {
        let end = start + key.len();
        let Some(caps) = QUANTITY_PATTERN.captures(&text.folded[end..]) else {
            break;
        };
        let Ok(quantity) = caps[1].parse::<u64>() else {
            break;
        };
        items.push(ParsedItem {
            product_key: key.to_string(),
            display_name: text.original_span(start, end).to_string(),
            quantity,
        });
        pos = end + caps[0].len();
    }
    if items.is_empty() {
        return Err(ParseFailure::NoItemsParsed);
    }
    Ok(ParsedOrder { destination_link: link.to_string(), items })
}
