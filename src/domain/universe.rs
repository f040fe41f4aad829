//! Symbol lists for multi-asset runs.
//!
//! Parses comma-separated symbol lists from configuration or the command
//! line into a normalized, de-duplicated universe.

use std::collections::HashSet;

pub const MAX_SYMBOL_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub symbols: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_single(&self) -> bool {
        self.symbols.len() == 1
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("symbol {0} is longer than {MAX_SYMBOL_LEN} characters")]
    SymbolTooLong(String),
}

/// Normalize one symbol: trimmed, upper-cased, 1..=20 characters.
pub fn normalize_symbol(input: &str) -> Result<String, UniverseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UniverseError::EmptyToken);
    }
    let symbol = trimmed.to_uppercase();
    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(UniverseError::SymbolTooLong(symbol));
    }
    Ok(symbol)
}

pub fn parse_symbols(input: &str) -> Result<Universe, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = normalize_symbol(token)?;
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(Universe { symbols })
}
