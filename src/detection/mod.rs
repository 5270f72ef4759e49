//! Ticker detection
//!
//! Scans post text for sigil-prefixed ticker symbols (`$` followed by 2-10
//! uppercase alphanumerics) and maintains the bounded feed of tracked
//! signals.

mod feed;

pub use feed::{DetectionFeed, UpsertOutcome};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TICKER_RE: Regex = Regex::new(r"\$([A-Z0-9]{2,10})\b").expect("valid ticker regex");
}

/// Extracts ticker symbols from raw post text
pub struct TickerDetector;

impl TickerDetector {
    pub fn new() -> Self {
        Self
    }

    /// Distinct ticker symbols in `text`, preserving first-seen order.
    ///
    /// Empty or ticker-free text yields an empty set, not an error.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for cap in TICKER_RE.captures_iter(text) {
            let symbol = cap[1].to_string();
            if !seen.contains(&symbol) {
                seen.push(symbol);
            }
        }
        seen
    }
}

impl Default for TickerDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_single_ticker() {
        let detector = TickerDetector::new();
        let tickers = detector.detect("Just loaded up on $PEPE, this one is going parabolic");
        assert_eq!(tickers, vec!["PEPE"]);
    }

    #[test]
    fn test_detect_multiple_preserves_order() {
        let detector = TickerDetector::new();
        let tickers = detector.detect("The $SOL ecosystem is unmatched. $BONK looking primed.");
        assert_eq!(tickers, vec!["SOL", "BONK"]);
    }

    #[test]
    fn test_detect_dedupes_repeats() {
        let detector = TickerDetector::new();
        let tickers = detector.detect("$WIF $WIF $WIF entry looking clean");
        assert_eq!(tickers, vec!["WIF"]);
    }

    #[test]
    fn test_detect_empty_text() {
        let detector = TickerDetector::new();
        assert!(detector.detect("").is_empty());
        assert!(detector.detect("no tickers here, just vibes").is_empty());
    }

    #[test]
    fn test_detect_rejects_lowercase() {
        let detector = TickerDetector::new();
        assert!(detector.detect("$pepe is not a symbol").is_empty());
    }

    #[test]
    fn test_detect_length_bounds() {
        let detector = TickerDetector::new();
        // One char: too short. Eleven chars: too long.
        assert!(detector.detect("$A").is_empty());
        assert!(detector.detect("$ABCDEFGHIJK").is_empty());
        assert_eq!(detector.detect("$AB"), vec!["AB"]);
        assert_eq!(detector.detect("$ABCDEFGHIJ"), vec!["ABCDEFGHIJ"]);
    }

    #[test]
    fn test_detect_alphanumeric() {
        let detector = TickerDetector::new();
        assert_eq!(detector.detect("aping $MOG2 here"), vec!["MOG2"]);
    }

    #[test]
    fn test_detect_ignores_bare_dollar_amounts() {
        let detector = TickerDetector::new();
        // Mixed-case and punctuation-adjacent text should not produce symbols
        assert!(detector.detect("made $500usd today").is_empty());
        assert_eq!(detector.detect("made $500 on $WIF"), vec!["500", "WIF"]);
    }
}
