use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// `spot` or `swap` (spec.md §6's market identifier grammar).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Swap,
}

impl FromStr for MarketType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spot" => Ok(Self::Spot),
            "swap" => Ok(Self::Swap),
            other => Err(Error::UnknownMarketType(other.to_string())),
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spot => "spot",
            Self::Swap => "swap",
        })
    }
}

/// A parsed `"<market_type>:<BASE>/<QUOTE>"` identifier (spec.md §6). Every
/// `subscribe_*`/order operation takes one of these, not a raw string, so
/// the grammar is only ever parsed once per call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketId {
    pub base: String,
    pub quote: String,
    pub market_type: MarketType,
}

impl MarketId {
    pub fn symbol(&self) -> String { format!("{}{}", self.base, self.quote) }
}

impl FromStr for MarketId {
    type Err = Error;

    /// Splits `"<market_type>:<BASE>/<QUOTE>"` into its three parts — the
    /// adapter's first step for every capability per spec.md §6.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (market_type, pair) = s.split_once(':').ok_or_else(|| Error::MalformedMarketId(s.to_string()))?;
        let (base, quote) = pair.split_once('/').ok_or_else(|| Error::MalformedMarketId(s.to_string()))?;
        if base.is_empty() || quote.is_empty() {
            return Err(Error::MalformedMarketId(s.to_string()));
        }
        Ok(Self { base: base.to_string(), quote: quote.to_string(), market_type: market_type.parse()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_spot_identifier() {
        let m: MarketId = "spot:BTC/USDT".parse().unwrap();
        assert_eq!(m, MarketId { base: "BTC".into(), quote: "USDT".into(), market_type: MarketType::Spot });
        assert_eq!(m.symbol(), "BTCUSDT");
    }

    #[test]
    fn parses_a_swap_identifier() {
        let m: MarketId = "swap:ETH/USD".parse().unwrap();
        assert_eq!(m.market_type, MarketType::Swap);
    }

    #[test]
    fn rejects_an_unknown_market_type() {
        assert!(matches!("future:BTC/USDT".parse::<MarketId>(), Err(Error::UnknownMarketType(_))));
    }

    #[test]
    fn rejects_a_missing_separator() {
        assert!(matches!("spot:BTCUSDT".parse::<MarketId>(), Err(Error::MalformedMarketId(_))));
        assert!(matches!("spotBTC/USDT".parse::<MarketId>(), Err(Error::MalformedMarketId(_))));
    }
}
