//! CLI integration tests for the run and validate command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_strategy_config, apply_overrides)
//! - Data adapter construction from the [data] section
//! - Full pipeline with MockDataPort and with real CSV files on disk
//! - Export of the trade ledger and annotated series
//! - Exit codes of the top-level commands

mod common;

use clap::Parser;
use common::*;
use macdtrader::adapters::csv_report_adapter::CsvReportAdapter;
use macdtrader::adapters::file_config_adapter::FileConfigAdapter;
use macdtrader::cli::{self, Cli, RunOverrides};
use macdtrader::domain::error::MacdTraderError;
use macdtrader::domain::indicator::MaMethod;
use macdtrader::domain::strategy::StrategyConfig;
use macdtrader::ports::data_port::DataPort;
use std::io::Write;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn assert_exit(actual: ExitCode, expected: ExitCode) {
    assert_eq!(format!("{actual:?}"), format!("{expected:?}"));
}

const VALID_INI: &str = r#"
[strategy]
method = SMA
short_period = 5
long_period = 20
signal_period = 4
fee = 0.002

[data]
date_column = Date
price_column = Close
fill_missing_dates = yes
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_strategy_config_from_file() {
        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let config = cli::build_strategy_config(&adapter).unwrap();

        assert_eq!(config.method, MaMethod::Sma);
        assert_eq!(config.short_period, 5);
        assert_eq!(config.long_period, 20);
        assert_eq!(config.signal_period, 4);
        assert_eq!(config.fee, 0.002);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        let config = cli::build_strategy_config(&adapter).unwrap();
        assert_eq!(config, StrategyConfig::default());
    }

    #[test]
    fn unknown_method_is_rejected() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nmethod = WMA\n").unwrap();
        let result = cli::build_strategy_config(&adapter);
        assert!(matches!(
            result,
            Err(MacdTraderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn negative_period_is_config_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nshort_period = -3\n").unwrap();
        let result = cli::build_strategy_config(&adapter);
        assert!(matches!(
            result,
            Err(MacdTraderError::ConfigInvalid { ref key, .. }) if key == "short_period"
        ));
    }

    #[test]
    fn unparseable_values_are_config_invalid() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nfee = 0.5%\n").unwrap();
        assert!(matches!(
            cli::build_strategy_config(&adapter),
            Err(MacdTraderError::ConfigInvalid { ref key, .. }) if key == "fee"
        ));

        let adapter =
            FileConfigAdapter::from_string("[strategy]\nshort_period = five\n").unwrap();
        assert!(matches!(
            cli::build_strategy_config(&adapter),
            Err(MacdTraderError::ConfigInvalid { ref key, .. }) if key == "short_period"
        ));
    }

    #[test]
    fn inverted_period_overrides_are_rejected() {
        let overrides = RunOverrides {
            short_period: Some(30),
            long_period: Some(10),
            ..RunOverrides::default()
        };
        let result = cli::apply_overrides(StrategyConfig::default(), &overrides);
        assert!(matches!(
            result,
            Err(MacdTraderError::InvalidParameter { ref name, .. }) if name == "short_period"
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = RunOverrides {
            method: Some("ema".into()),
            fee: Some(0.0),
            short_period: Some(3),
            long_period: None,
            signal_period: Some(2),
        };
        let config = cli::apply_overrides(StrategyConfig::default(), &overrides).unwrap();

        assert_eq!(config.method, MaMethod::Ema);
        assert_eq!(config.fee, 0.0);
        assert_eq!(config.short_period, 3);
        assert_eq!(config.long_period, 26);
        assert_eq!(config.signal_period, 2);
    }

    #[test]
    fn overrides_are_validated() {
        let overrides = RunOverrides {
            fee: Some(1.5),
            ..RunOverrides::default()
        };
        let result = cli::apply_overrides(StrategyConfig::default(), &overrides);
        assert!(matches!(
            result,
            Err(MacdTraderError::InvalidParameter { .. })
        ));
    }
}

mod data_loading {
    use super::*;

    #[test]
    fn adapter_honours_configured_columns() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("prices.csv");
        std::fs::write(
            &csv_path,
            "When,Open,Settle\n2024-01-01,1,10.0\n2024-01-02,1,11.0\n2024-01-04,1,12.0\n",
        )
        .unwrap();

        let adapter = FileConfigAdapter::from_string(
            "[data]\ndate_column = When\nprice_column = Settle\nfill_missing_dates = no\n",
        )
        .unwrap();
        let data = cli::build_data_adapter(&csv_path, Some(&adapter));
        let prices = data.fetch_prices().unwrap();

        assert_eq!(prices.prices(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn adapter_without_config_fills_gaps() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("prices.csv");
        std::fs::write(
            &csv_path,
            "Date,Close\n2024-01-01,10.0\n2024-01-02,11.0\n2024-01-04,12.0\n",
        )
        .unwrap();

        let prices = cli::build_data_adapter(&csv_path, None)
            .fetch_prices()
            .unwrap();
        assert_eq!(prices.prices(), vec![10.0, 11.0, 11.0, 12.0]);
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn run_strategy_with_mock_data() {
        let port = MockDataPort::with_prices(daily_series(&wave_prices(200)));
        let result = cli::run_strategy(&port, &StrategyConfig::default()).unwrap();

        assert_eq!(result.annotated.points.len(), 200);
        assert_eq!(result.ledger.len() % 2, 0);
    }

    #[test]
    fn run_strategy_propagates_data_errors() {
        let port = MockDataPort::with_error("feed offline");
        let err = cli::run_strategy(&port, &StrategyConfig::default()).unwrap_err();

        assert!(matches!(err, MacdTraderError::DataImport { .. }));
        assert_exit(ExitCode::from(&err), ExitCode::from(3));
    }

    #[test]
    fn summary_reports_profits_and_verdict() {
        let port = MockDataPort::with_prices(daily_series(&[50.0; 60]));
        let strategy = StrategyConfig::default();
        let result = cli::run_strategy(&port, &strategy).unwrap();
        let summary = cli::format_summary(&strategy, &result);

        assert!(summary.contains("no trades executed"));
        assert!(summary.contains("Buy-Sell strategy profit: 0.00"));
        assert!(summary.contains("Buy-Hold strategy profit: -0.06"));
        assert!(summary.contains("Buy-Sell strategy outperformed Buy-Hold."));
    }

    #[test]
    fn summary_lists_each_trade() {
        let port = MockDataPort::with_prices(daily_series(&wave_prices(200)));
        let strategy = StrategyConfig::default();
        let result = cli::run_strategy(&port, &strategy).unwrap();
        let summary = cli::format_summary(&strategy, &result);

        let trade_lines = summary
            .lines()
            .filter(|l| l.contains("BUY") || l.contains("SELL"))
            .count();
        assert_eq!(trade_lines, result.ledger.len());
    }
}

mod export {
    use super::*;

    #[test]
    fn export_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let port = MockDataPort::with_prices(daily_series(&wave_prices(200)));
        let result = cli::run_strategy(&port, &StrategyConfig::default()).unwrap();

        let trades = dir.path().join("trades.csv");
        let annotated = dir.path().join("annotated.csv");
        let written = cli::export_results(
            &CsvReportAdapter::new(false),
            &result,
            Some(&trades),
            Some(&annotated),
        )
        .unwrap();

        assert_eq!(written, vec![trades.clone(), annotated.clone()]);
        let ledger_rows = csv::Reader::from_path(&trades).unwrap().records().count();
        assert_eq!(ledger_rows, result.ledger.len());
        let annotated_rows = csv::Reader::from_path(&annotated)
            .unwrap()
            .records()
            .count();
        assert_eq!(annotated_rows, 200);
    }

    #[test]
    fn export_nothing_when_no_paths() {
        let port = MockDataPort::with_prices(daily_series(&wave_prices(60)));
        let result = cli::run_strategy(&port, &StrategyConfig::default()).unwrap();
        let written =
            cli::export_results(&CsvReportAdapter::new(false), &result, None, None).unwrap();
        assert!(written.is_empty());
    }
}

mod commands {
    use super::*;

    fn run_args(args: &[&str]) -> ExitCode {
        cli::run(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn run_command_end_to_end() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("prices.csv");
        std::fs::write(&csv_path, csv_content(&wave_prices(120))).unwrap();
        let ini = write_temp_ini(VALID_INI);
        let trades = dir.path().join("out/trades.csv");

        let code = run_args(&[
            "macdtrader",
            "run",
            "--input",
            csv_path.to_str().unwrap(),
            "--config",
            ini.path().to_str().unwrap(),
            "--trades",
            trades.to_str().unwrap(),
        ]);

        assert_exit(code, ExitCode::SUCCESS);
        assert!(trades.exists());
    }

    #[test]
    fn run_command_missing_input_is_data_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.csv");
        let code = run_args(&["macdtrader", "run", "--input", missing.to_str().unwrap()]);
        assert_exit(code, ExitCode::from(3));
    }

    #[test]
    fn run_command_bad_override_is_parameter_error() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("prices.csv");
        std::fs::write(&csv_path, csv_content(&wave_prices(60))).unwrap();
        let code = run_args(&[
            "macdtrader",
            "run",
            "--input",
            csv_path.to_str().unwrap(),
            "--short",
            "0",
        ]);
        assert_exit(code, ExitCode::from(4));
    }

    #[test]
    fn validate_accepts_good_config() {
        let ini = write_temp_ini(VALID_INI);
        let code = run_args(&["macdtrader", "validate", "--config", ini.path().to_str().unwrap()]);
        assert_exit(code, ExitCode::SUCCESS);
    }

    #[test]
    fn validate_rejects_inverted_periods() {
        let ini = write_temp_ini("[strategy]\nshort_period = 30\nlong_period = 10\n");
        let code = run_args(&["macdtrader", "validate", "--config", ini.path().to_str().unwrap()]);
        assert_exit(code, ExitCode::from(2));
    }

    #[test]
    fn validate_rejects_unparseable_fee() {
        let ini = write_temp_ini("[strategy]\nfee = 0.5%\nshort_period = five\n");
        let code = run_args(&["macdtrader", "validate", "--config", ini.path().to_str().unwrap()]);
        assert_exit(code, ExitCode::from(2));
    }

    #[test]
    fn run_command_inverted_periods_is_parameter_error() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("prices.csv");
        std::fs::write(&csv_path, csv_content(&wave_prices(60))).unwrap();
        let code = run_args(&[
            "macdtrader",
            "run",
            "--input",
            csv_path.to_str().unwrap(),
            "--short",
            "30",
            "--long",
            "10",
        ]);
        assert_exit(code, ExitCode::from(4));
    }

    #[test]
    fn validate_missing_file_is_config_error() {
        let code = run_args(&["macdtrader", "validate", "--config", "/nonexistent/macd.ini"]);
        assert_exit(code, ExitCode::from(2));
    }
}
