//! Symbol universe: parsing symbol lists from configuration or the command line.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("no symbols to screen")]
    Empty,
}

/// Splits a comma-separated list, trimming and upper-casing each symbol.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbols_basic() {
        let result = parse_symbols("AAPL,MSFT,NVDA").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn parse_symbols_with_whitespace() {
        let result = parse_symbols("  AAPL , MSFT ,NVDA  ").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn parse_symbols_uppercase() {
        let result = parse_symbols("aapl,brk.b").unwrap();
        assert_eq!(result, vec!["AAPL", "BRK.B"]);
    }

    #[test]
    fn parse_symbols_empty_token() {
        assert_eq!(parse_symbols("AAPL,,MSFT"), Err(UniverseError::EmptyToken));
        assert_eq!(parse_symbols(""), Err(UniverseError::EmptyToken));
    }

    #[test]
    fn parse_symbols_duplicate() {
        let result = parse_symbols("AAPL,msft,aapl");
        assert!(matches!(result, Err(UniverseError::DuplicateSymbol(s)) if s == "AAPL"));
    }
}
