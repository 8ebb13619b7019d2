//! CLI integration tests for configuration loading and the screen command.
//!
//! Tests cover:
//! - Config files on disk (load_config, build_screen_config, build_data_port)
//! - Symbol resolution order (resolve_symbols)
//! - The screen pipeline with a mock data port and a recording report port
//! - End-to-end screening of CSV files in a temp directory

mod common;

use common::*;
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use vcpscreen::adapters::csv_report_adapter::CsvReportAdapter;
use vcpscreen::cli;
use vcpscreen::domain::error::VcpError;
use vcpscreen::domain::evaluator::Evaluation;
use vcpscreen::domain::forward_returns::ForwardReturns;
use vcpscreen::domain::screen_config::{DateRange, build_date_range, build_screen_config};
use vcpscreen::domain::universe::UniverseError;
use vcpscreen::ports::data_port::DataPort;
use vcpscreen::ports::report_port::ReportPort;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ExitCode has no PartialEq; compare through Debug
fn exit_code(err: &VcpError) -> String {
    format!("{:?}", std::process::ExitCode::from(err))
}

fn exit_code_of(code: u8) -> String {
    format!("{:?}", std::process::ExitCode::from(code))
}

#[derive(Default)]
struct RecordingReportPort {
    panels: RefCell<Vec<(String, PathBuf)>>,
    forwards: RefCell<Vec<(String, PathBuf)>>,
}

impl ReportPort for RecordingReportPort {
    fn write_panel(&self, evaluation: &Evaluation, output_path: &Path) -> Result<(), VcpError> {
        self.panels
            .borrow_mut()
            .push((evaluation.symbol.clone(), output_path.to_path_buf()));
        Ok(())
    }

    fn write_forward_returns(
        &self,
        forward: &ForwardReturns,
        output_path: &Path,
    ) -> Result<(), VcpError> {
        self.forwards
            .borrow_mut()
            .push((forward.symbol.clone(), output_path.to_path_buf()));
        Ok(())
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn full_config_round_trips_from_disk() {
        let ini = format!(
            "[data]\npath = /tmp/prices\n\n[universe]\nsymbols = aapl, msft\nstart_date = 2020-01-01\nend_date = 2020-12-31\n\n{}horizons = 2,10\n",
            SMALL_SCREEN_INI
        );
        let file = write_temp_ini(&ini);
        let config = cli::load_config(file.path()).unwrap();

        let screen = build_screen_config(&config).unwrap();
        assert_eq!(screen.ma_windows.all(), [2, 3, 4, 5]);
        assert_eq!(screen.horizons, vec![2, 10]);
        assert_eq!(screen.thresholds.contraction_max, 0.5);

        let range = build_date_range(&config).unwrap();
        assert_eq!(range.start, Some(date("2020-01-01")));
        assert_eq!(range.end, Some(date("2020-12-31")));

        assert!(cli::build_data_port(&config).is_ok());
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/vcpscreen.ini"))
            .err()
            .unwrap();
        assert!(matches!(err, VcpError::ConfigParse { .. }));
        assert_eq!(exit_code(&err), exit_code_of(2));
    }

    #[test]
    fn invalid_window_is_rejected() {
        let file = write_temp_ini("[screen]\nslope_window = 1\n");
        let config = cli::load_config(file.path()).unwrap();
        let err = build_screen_config(&config).unwrap_err();
        assert!(matches!(err, VcpError::ConfigInvalid { ref key, .. } if key == "slope_window"));
    }
}

mod symbol_resolution {
    use super::*;

    fn port() -> MockDataPort {
        MockDataPort::new()
            .with_series("ZZZ", &[1.0])
            .with_series("AAA", &[1.0])
    }

    #[test]
    fn override_wins() {
        let config = cli::load_config(write_temp_ini("[universe]\nsymbols = MSFT\n").path()).unwrap();
        let symbols = cli::resolve_symbols(Some("nvda, amd"), &config, &port()).unwrap();
        assert_eq!(symbols, vec!["NVDA", "AMD"]);
    }

    #[test]
    fn config_list_used_without_override() {
        let config = cli::load_config(write_temp_ini("[universe]\nsymbols = msft,aapl\n").path()).unwrap();
        let symbols = cli::resolve_symbols(None, &config, &port()).unwrap();
        assert_eq!(symbols, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn falls_back_to_data_port() {
        let config = cli::load_config(write_temp_ini("[data]\npath = .\n").path()).unwrap();
        let symbols = cli::resolve_symbols(None, &config, &port()).unwrap();
        assert_eq!(symbols, vec!["AAA", "ZZZ"]);
    }

    #[test]
    fn empty_universe_is_an_error() {
        let config = cli::load_config(write_temp_ini("[data]\npath = .\n").path()).unwrap();
        let err = cli::resolve_symbols(None, &config, &MockDataPort::new()).unwrap_err();
        assert!(matches!(err, VcpError::Universe(UniverseError::Empty)));
    }

    #[test]
    fn duplicate_override_is_an_error() {
        let config = cli::load_config(write_temp_ini("[data]\npath = .\n").path()).unwrap();
        let err = cli::resolve_symbols(Some("AAPL,aapl"), &config, &port()).unwrap_err();
        assert!(matches!(err, VcpError::Universe(UniverseError::DuplicateSymbol(_))));
    }
}

mod screen_pipeline {
    use super::*;

    #[test]
    fn writes_reports_only_for_flagged_symbols() {
        let port = MockDataPort::new()
            .with_series("UP", &BREAKOUT_CLOSES)
            .with_series("FLAT", &[20.0; 11]);
        let recorder = RecordingReportPort::default();
        let dir = tempfile::TempDir::new().unwrap();

        let report = cli::run_screen_pipeline(
            &port,
            &recorder,
            &["UP".to_string(), "FLAT".to_string()],
            &small_config(),
            DateRange::default(),
            Some(dir.path()),
        )
        .unwrap();

        assert_eq!(report.flagged(), vec!["UP"]);
        let panels = recorder.panels.borrow();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].0, "UP");
        assert_eq!(panels[0].1, dir.path().join("UP_panel.csv"));
        assert_eq!(
            recorder.forwards.borrow()[0].1,
            dir.path().join("UP_forward.csv")
        );
    }

    #[test]
    fn no_output_dir_writes_nothing() {
        let port = MockDataPort::new().with_series("UP", &BREAKOUT_CLOSES);
        let recorder = RecordingReportPort::default();

        cli::run_screen_pipeline(
            &port,
            &recorder,
            &["UP".to_string()],
            &small_config(),
            DateRange::default(),
            None,
        )
        .unwrap();

        assert!(recorder.panels.borrow().is_empty());
        assert!(recorder.forwards.borrow().is_empty());
    }

    #[test]
    fn skipped_symbols_are_returned_with_the_report() {
        let port = MockDataPort::new()
            .with_series("UP", &BREAKOUT_CLOSES)
            .with_error("BAD", "unreachable");
        let report = cli::run_screen_pipeline(
            &port,
            &RecordingReportPort::default(),
            &["UP".to_string(), "BAD".to_string()],
            &small_config(),
            DateRange::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].symbol, "BAD");
        assert!(report.skipped[0].reason.to_string().contains("unreachable"));
    }

    #[test]
    fn nothing_evaluated_is_no_data() {
        let port = MockDataPort::new().with_error("BAD", "unreachable");
        let err = cli::run_screen_pipeline(
            &port,
            &RecordingReportPort::default(),
            &["BAD".to_string()],
            &small_config(),
            DateRange::default(),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, VcpError::NoData { .. }));
        assert_eq!(exit_code(&err), exit_code_of(5));
    }
}

mod csv_end_to_end {
    use super::*;

    #[test]
    fn screens_csv_directory_and_writes_reports() {
        let data_dir = tempfile::TempDir::new().unwrap();
        let out_dir = tempfile::TempDir::new().unwrap();
        write_price_csv(
            data_dir.path(),
            "UP",
            &make_series("UP", "2024-01-01", &BREAKOUT_CLOSES),
        );
        write_price_csv(
            data_dir.path(),
            "FLAT",
            &make_series("FLAT", "2024-01-01", &[20.0; 11]),
        );

        let ini = format!(
            "[data]\npath = {}\n\n{}",
            data_dir.path().display(),
            SMALL_SCREEN_INI
        );
        let file = write_temp_ini(&ini);
        let config = cli::load_config(file.path()).unwrap();
        let screen_config = build_screen_config(&config).unwrap();
        let data_port = cli::build_data_port(&config).unwrap();
        let symbols = cli::resolve_symbols(None, &config, &data_port).unwrap();
        assert_eq!(symbols, vec!["FLAT", "UP"]);

        let report = cli::run_screen_pipeline(
            &data_port,
            &CsvReportAdapter,
            &symbols,
            &screen_config,
            DateRange::default(),
            Some(out_dir.path()),
        )
        .unwrap();
        assert_eq!(report.flagged(), vec!["UP"]);

        let panel = std::fs::read_to_string(out_dir.path().join("UP_panel.csv")).unwrap();
        let last = panel.lines().last().unwrap();
        assert!(last.starts_with("2024-01-11,28,"));
        assert!(last.ends_with(",1"));
        assert_eq!(panel.lines().count(), BREAKOUT_CLOSES.len() + 1);

        let forward = std::fs::read_to_string(out_dir.path().join("UP_forward.csv")).unwrap();
        assert!(forward.starts_with("date,close,horizon,forward_return"));
        assert!(forward.lines().any(|l| l == "2024-01-11,28.0,7,"));
        assert!(!out_dir.path().join("FLAT_panel.csv").exists());
    }

    #[test]
    fn lower_case_files_screen_through_symbol_override() {
        let data_dir = tempfile::TempDir::new().unwrap();
        write_price_csv(
            data_dir.path(),
            "up",
            &make_series("up", "2024-01-01", &BREAKOUT_CLOSES),
        );
        let ini = format!(
            "[data]\npath = {}\n\n{}",
            data_dir.path().display(),
            SMALL_SCREEN_INI
        );
        let config = cli::load_config(write_temp_ini(&ini).path()).unwrap();
        let data_port = cli::build_data_port(&config).unwrap();
        let symbols = cli::resolve_symbols(Some("up"), &config, &data_port).unwrap();
        assert_eq!(symbols, vec!["UP"]);

        let report = cli::run_screen_pipeline(
            &data_port,
            &RecordingReportPort::default(),
            &symbols,
            &build_screen_config(&config).unwrap(),
            DateRange::default(),
            None,
        )
        .unwrap();
        assert_eq!(report.flagged(), vec!["UP"]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn fetch_respects_config_date_range() {
        let data_dir = tempfile::TempDir::new().unwrap();
        write_price_csv(
            data_dir.path(),
            "UP",
            &make_series("UP", "2024-01-01", &BREAKOUT_CLOSES),
        );
        let ini = format!(
            "[data]\npath = {}\n[universe]\nstart_date = 2024-01-03\nend_date = 2024-01-05\n",
            data_dir.path().display()
        );
        let config = cli::load_config(write_temp_ini(&ini).path()).unwrap();
        let range = build_date_range(&config).unwrap();
        let series = cli::build_data_port(&config)
            .unwrap()
            .fetch_prices("UP", range)
            .unwrap();

        assert_eq!(series.closes(), vec![12.0, 13.0, 14.0]);
    }
}
