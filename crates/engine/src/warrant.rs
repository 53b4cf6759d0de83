//! Warrant ticker heuristics.
//!
//! Warrants usually trade under the underlying's symbol with a trailing "W"
//! (e.g. ABCDW for ABCD). The suffix rule misfires on a handful of ordinary
//! tickers, so those are excluded explicitly.

/// Known tickers ending in W that are NOT warrants.
const NOT_WARRANTS: &[&str] = &[
    "BMW", "SCHW", "SNOW", "FLOW", "GLOW", "GROW", "KNOW", "SHOW", "STEW", "VIEW",
];

/// Detects whether a ticker looks like a warrant by suffix pattern.
#[must_use]
pub fn is_warrant_ticker(ticker: &str) -> bool {
    if ticker.len() < 4 {
        return false;
    }

    let upper = ticker.to_uppercase();
    if NOT_WARRANTS.contains(&upper.as_str()) {
        return false;
    }

    upper.ends_with('W')
}

/// Strips the trailing W(s) to get the underlying stock symbol.
#[must_use]
pub fn underlying_ticker(warrant: &str) -> String {
    warrant.to_uppercase().trim_end_matches('W').to_string()
}

/// Expands a ticker list so every warrant's underlying is present too,
/// preserving order and skipping underlyings already in the list.
#[must_use]
pub fn expand_warrant_tickers(tickers: &[String]) -> Vec<String> {
    let mut seen: std::collections::HashSet<String> =
        tickers.iter().map(|t| t.to_uppercase()).collect();
    let mut out: Vec<String> = tickers.to_vec();

    for ticker in tickers {
        if is_warrant_ticker(ticker) {
            let underlying = underlying_ticker(ticker);
            if seen.insert(underlying.clone()) {
                out.push(underlying);
            }
        }
    }

    out
}
