use crate::types::price::{AssetPrice, PriceTable};

/// Static prices served when the upstream is unreachable.
const FALLBACK_USD: &[(&str, f64)] = &[
    ("BTC", 65_000.0),
    ("ETH", 3_500.0),
    ("SOL", 150.0),
    ("USDC", 1.0),
    ("USDT", 1.0),
    ("BNB", 580.0),
    ("JUP", 0.9),
    ("BONK", 0.000_02),
    ("WIF", 2.5),
    ("RAY", 1.8),
    ("JTO", 2.7),
    ("PYTH", 0.35),
];

/// Fallback table restricted to `symbols`. Unknown symbols are omitted.
pub fn fallback_prices(symbols: &[String]) -> PriceTable {
    symbols
        .iter()
        .filter_map(|sym| {
            FALLBACK_USD
                .iter()
                .find(|(s, _)| *s == sym.as_str())
                .map(|(s, usd)| {
                    (
                        s.to_string(),
                        AssetPrice {
                            usd: *usd,
                            usd_24h_change: None,
                        },
                    )
                })
        })
        .collect()
}
