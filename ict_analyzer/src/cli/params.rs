use anyhow::{Context, bail};
use chrono::NaiveDate;
use market_data_ingestor::models::{asset::AssetClass, timeframe::TimeFrame};

use super::commands::AnalyzeArgs;
use crate::{analysis::AnalysisRequest, config::AnalyzerConfig};

/// Timeframes offered for analysis.
pub const TIMEFRAME_PRESETS: [&str; 4] = ["1h", "4h", "1d", "1w"];

/// Uppercases `raw` and, for crypto, quotes a bare ticker in USD
/// (`btc` becomes `BTC-USD`). Dashed or slashed pairs are kept as given.
pub fn normalize_symbol(raw: &str, asset_class: AssetClass) -> String {
    let symbol = raw.trim().to_uppercase();
    if asset_class == AssetClass::Crypto && !symbol.contains(['-', '/']) {
        format!("{symbol}-USD")
    } else {
        symbol
    }
}

pub fn parse_timeframe(raw: &str) -> anyhow::Result<TimeFrame> {
    let timeframe: TimeFrame = raw.parse().with_context(|| format!("invalid timeframe {raw:?}"))?;
    if !TIMEFRAME_PRESETS.contains(&timeframe.to_string().as_str()) {
        bail!(
            "unsupported timeframe {raw:?}; choose one of {}",
            TIMEFRAME_PRESETS.join(", ")
        );
    }
    Ok(timeframe)
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

/// Merges command-line arguments over the config file. `today` fills in a
/// missing end date.
pub fn build_request(args: &AnalyzeArgs, config: &AnalyzerConfig, today: NaiveDate) -> anyhow::Result<AnalysisRequest> {
    let asset_class = config.provider.asset_class;
    let start = parse_date(&args.start)?;
    let end = match &args.end {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    if start > end {
        bail!("Start date must be on or before end date ({start} > {end})");
    }

    let request = AnalysisRequest::new(
        normalize_symbol(&args.symbol, asset_class),
        parse_timeframe(&args.timeframe)?,
        start,
        end,
    )
    .with_window(args.window.unwrap_or(config.analysis.window))
    .with_asset_class(asset_class);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::cli::commands::OutputFormat;

    fn args(start: &str, end: Option<&str>) -> AnalyzeArgs {
        AnalyzeArgs {
            symbol: "eth".into(),
            timeframe: "4h".into(),
            start: start.into(),
            end: end.map(Into::into),
            window: None,
            recent: None,
            provider: None,
            output_dir: None,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" btc ", AssetClass::Crypto), "BTC-USD");
        assert_eq!(normalize_symbol("eth-usd", AssetClass::Crypto), "ETH-USD");
        assert_eq!(normalize_symbol("SOL/USD", AssetClass::Crypto), "SOL/USD");
        assert_eq!(normalize_symbol("aapl", AssetClass::UsEquity), "AAPL");
    }

    #[test]
    fn test_parse_timeframe() {
        assert_eq!(parse_timeframe("4h").unwrap(), TimeFrame::hours(4));
        assert_eq!(parse_timeframe("240m").unwrap(), TimeFrame::hours(4));
        assert_eq!(parse_timeframe("1wk").unwrap(), TimeFrame::week());
        assert!(parse_timeframe("15m").is_err());
        assert!(parse_timeframe("1mo").is_err());
        assert!(parse_timeframe("soon").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-04-01").unwrap(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert!(parse_date("01/04/2025").is_err());
    }

    #[test]
    fn end_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();

        let request = build_request(&args("2025-04-01", None), &AnalyzerConfig::default(), today).unwrap();

        assert_eq!(request.symbol, "ETH-USD");
        assert_eq!(request.end, today);
        assert_eq!(request.window.get(), 3);
    }

    #[test]
    fn window_flag_beats_config() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let mut a = args("2025-04-01", Some("2025-04-30"));
        a.window = NonZeroUsize::new(7);

        let request = build_request(&a, &AnalyzerConfig::default(), today).unwrap();

        assert_eq!(request.window.get(), 7);
    }

    #[test]
    fn reversed_dates_fail_before_any_fetch() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let err = build_request(&args("2025-04-10", Some("2025-04-01")), &AnalyzerConfig::default(), today)
            .unwrap_err();
        assert!(err.to_string().starts_with("Start date must be on or before end date"));
    }
}
