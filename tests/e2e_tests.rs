//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV fixtures. Each
//! test:
//! 1. Loads customers.csv and accounts.csv from a fixture directory
//! 2. Replays input.csv with the clock pinned to 2024-03-20
//! 3. Writes the resulting credits to a temporary file
//! 4. Compares the output byte-for-byte with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Credit card consumption, payment and third-party payment flows
//! - Loan installments through payoff
//! - Rejected creation requests and malformed rows
//! - The delinquency gate
//!
//! Each fixture runs with several batch sizes; the output must not depend on batching.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use credit_engine::config::{BatchConfig, EngineConfig};
    use credit_engine::core::FixedClock;
    use credit_engine::replay::{Replay, ReplayInputs};
    use credit_engine::types::CreditError;
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn replay(batch_size: usize) -> Replay {
        Replay::new(
            EngineConfig::default(),
            BatchConfig::new(batch_size, 2, 3),
            Arc::new(FixedClock::at_date(
                NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            )),
        )
    }

    /// Replay a fixture directory and compare the output with its expected.csv
    ///
    /// # Panics
    ///
    /// Panics if a fixture file is missing, the replay fails or the output differs.
    fn run_test_fixture(fixture_name: &str, batch_size: usize) {
        let fixture_dir = PathBuf::from(format!("tests/fixtures/{}", fixture_name));
        let inputs = ReplayInputs {
            operations: fixture_dir.join("input.csv"),
            customers: Some(fixture_dir.join("customers.csv")),
            accounts: Some(fixture_dir.join("accounts.csv")),
        };
        let expected_path = fixture_dir.join("expected.csv");

        for path in [&inputs.operations, &expected_path] {
            assert!(path.exists(), "Fixture file not found: {}", path.display());
        }

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        replay(batch_size)
            .run(&inputs, &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read expected file {}: {}",
                expected_path.display(),
                e
            )
        });

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (batch size: {})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, batch_size, actual_output, expected_output
        );
    }

    #[rstest]
    #[case("card_lifecycle")]
    #[case("loan_payoff")]
    #[case("invalid_requests")]
    #[case("delinquency_gate")]
    fn test_fixtures(#[case] fixture: &str, #[values(1, 3, 1000)] batch_size: usize) {
        run_test_fixture(fixture, batch_size);
    }

    #[test]
    fn test_missing_operations_file_is_fatal() {
        let inputs = ReplayInputs {
            operations: Path::new("tests/fixtures/does_not_exist.csv").to_path_buf(),
            customers: None,
            accounts: None,
        };

        let result = replay(10).run(&inputs, &mut Vec::<u8>::new());
        assert!(matches!(result, Err(CreditError::FileNotFound { .. })));
    }

    #[test]
    fn test_missing_directory_file_is_fatal() {
        let inputs = ReplayInputs {
            operations: PathBuf::from("tests/fixtures/card_lifecycle/input.csv"),
            customers: Some(PathBuf::from("tests/fixtures/card_lifecycle/nope.csv")),
            accounts: None,
        };

        let result = replay(10).run(&inputs, &mut Vec::<u8>::new());
        assert!(matches!(result, Err(CreditError::FileNotFound { .. })));
    }
}
