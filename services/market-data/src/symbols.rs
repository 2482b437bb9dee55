//! Static symbol metadata for alert annotation

/// Company names for common large-cap tickers.
/// Symbols outside this map fall back to the raw ticker.
pub static COMPANY_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "AAPL" => "Apple Inc.",
    "MSFT" => "Microsoft Corporation",
    "GOOGL" => "Alphabet Inc.",
    "AMZN" => "Amazon.com, Inc.",
    "NVDA" => "NVIDIA Corporation",
    "META" => "Meta Platforms, Inc.",
    "TSLA" => "Tesla, Inc.",
    "NFLX" => "Netflix, Inc.",
    "AMD" => "Advanced Micro Devices, Inc.",
    "INTC" => "Intel Corporation",
    "JPM" => "JPMorgan Chase & Co.",
    "V" => "Visa Inc.",
    "DIS" => "The Walt Disney Company",
    "KO" => "The Coca-Cola Company",
    "PLTR" => "Palantir Technologies Inc.",
};

/// Display name for a ticker
pub fn company_name(symbol: &str) -> &str {
    COMPANY_NAMES
        .get(symbol.to_uppercase().as_str())
        .copied()
        .unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbol_resolves() {
        assert_eq!(company_name("AAPL"), "Apple Inc.");
        assert_eq!(company_name("aapl"), "Apple Inc.");
    }

    #[test]
    fn test_unknown_symbol_falls_back() {
        assert_eq!(company_name("ZZZZ"), "ZZZZ");
    }
}
