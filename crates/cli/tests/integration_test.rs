use short_scan_engine::TickerSnapshot;

// The CLI's input contract: a JSON array of ticker snapshots in the shape
// the ingestion layer documents. A hand-written file must parse unchanged.
#[test]
fn snapshot_file_format_parses() {
    let raw = r#"[
      {
        "ticker": "TCGL",
        "current_price": "12.40",
        "change_percent": "140.0",
        "daily": {
          "ticker": "TCGL",
          "interval": "daily",
          "bars": [
            {
              "timestamp": "2025-05-30T20:00:00Z",
              "open": "5.10",
              "high": "5.40",
              "low": "5.00",
              "close": "5.17",
              "volume": 800000
            },
            {
              "timestamp": "2025-06-02T20:00:00Z",
              "open": "5.20",
              "high": "13.10",
              "low": "5.15",
              "close": "12.40",
              "volume": 9500000
            }
          ]
        },
        "intraday": null,
        "fundamentals": {
          "ticker": "TCGL",
          "name": null,
          "exchange": "NASDAQ",
          "sector": null,
          "industry": null,
          "market_cap": 80000000,
          "shares_outstanding": null,
          "float_shares": null,
          "beta": null,
          "avg_volume": 2000000,
          "week_52_high": null,
          "week_52_low": null,
          "ipo_date": null
        },
        "news": null,
        "as_of": "2025-06-02"
      }
    ]"#;

    let snapshots: Vec<TickerSnapshot> = serde_json::from_str(raw).unwrap();

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].ticker, "TCGL");
    assert_eq!(snapshots[0].daily.bars.len(), 2);
    assert_eq!(
        snapshots[0].fundamentals.as_ref().unwrap().market_cap,
        Some(80_000_000)
    );
}
