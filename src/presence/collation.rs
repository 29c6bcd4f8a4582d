use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const POLISH_ALPHABET: &str = "aąbcćdeęfghijklłmnńoópqrsśtuvwxyzźż";

/// String ordering used for the user directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collation {
    /// Polish alphabetical order, case-insensitive with lowercase first on ties.
    #[default]
    Polish,
    /// Raw Unicode code point order.
    Codepoint,
}

impl Collation {
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Collation::Codepoint => a.cmp(b),
            Collation::Polish => {
                let primary = a
                    .chars()
                    .map(polish_weight)
                    .cmp(b.chars().map(polish_weight));
                primary.then_with(|| {
                    a.chars()
                        .map(char::is_uppercase)
                        .cmp(b.chars().map(char::is_uppercase))
                })
                .then_with(|| a.cmp(b))
            }
        }
    }
}

// Letters of the alphabet come first in alphabet order, everything else after
// them by code point.
fn polish_weight(c: char) -> (u32, u32) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match POLISH_ALPHABET.chars().position(|l| l == lower) {
        Some(rank) => (0, rank as u32),
        None => (1, lower as u32),
    }
}

impl FromStr for Collation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polish" => Ok(Collation::Polish),
            "codepoint" => Ok(Collation::Codepoint),
            other => Err(format!("Unknown collation '{other}', expected 'polish' or 'codepoint'")),
        }
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collation::Polish => write!(f, "polish"),
            Collation::Codepoint => write!(f, "codepoint"),
        }
    }
}
