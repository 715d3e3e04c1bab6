mod common;

use proptest::prelude::*;

use covrep::aggregate::aggregate;
use covrep::model::{CoverageData, FileCoverage, FileLineStatuses, LineState};
use covrep::report::{build, generate, ReportOptions};

fn line_state() -> impl Strategy<Value = LineState> {
    prop_oneof![
        Just(LineState::NotApplicable),
        Just(LineState::Miss),
        Just(LineState::Partial),
        Just(LineState::Full),
    ]
}

fn file_states() -> impl Strategy<Value = Vec<LineState>> {
    prop::collection::vec(line_state(), 0..200)
}

fn files() -> impl Strategy<Value = Vec<(String, Vec<LineState>)>> {
    prop::collection::vec(("[a-z]{1,6}\\.py", file_states()), 0..12)
}

fn aggregate_files(files: &[(String, Vec<LineState>)]) -> Vec<FileCoverage> {
    files.iter().map(|(name, states)| aggregate(name, states)).collect()
}

proptest! {
    #[test]
    fn counts_add_up(states in file_states()) {
        let cov = aggregate("f.py", &states);
        prop_assert_eq!(cov.total_full + cov.total_partial + cov.total_misses, cov.total_statements);
        let statements = states.iter().filter(|s| s.is_statement()).count() as u64;
        prop_assert_eq!(cov.total_statements, statements);
    }

    #[test]
    fn line_rate_is_bounded(states in file_states()) {
        let cov = aggregate("f.py", &states);
        prop_assert!((0.0..=1.0).contains(&cov.line_rate));
        if cov.total_statements == 0 {
            prop_assert_eq!(cov.line_rate, 1.0);
        }
    }

    #[test]
    fn missed_ranges_are_maximal(states in file_states()) {
        let cov = aggregate("f.py", &states);
        let state_at = |line: u32| states[line as usize - 1];

        for range in &cov.missed_lines {
            prop_assert!(range.start <= range.end);
            for line in range.start..=range.end {
                prop_assert_eq!(state_at(line), LineState::Miss);
            }
            if range.start > 1 {
                prop_assert_ne!(state_at(range.start - 1), LineState::Miss);
            }
            if (range.end as usize) < states.len() {
                prop_assert_ne!(state_at(range.end + 1), LineState::Miss);
            }
        }
        for pair in cov.missed_lines.windows(2) {
            // Strictly increasing with at least one non-miss line between.
            prop_assert!(pair[0].end + 1 < pair[1].start);
        }
        prop_assert_eq!(cov.missed_line_count(), cov.total_misses);
    }

    #[test]
    fn footer_is_sum_not_mean(files in files()) {
        let rows = aggregate_files(&files);
        let model = build("t", rows.clone(), None, "");

        let statements: u64 = rows.iter().map(|r| r.total_statements).sum();
        let full: u64 = rows.iter().map(|r| r.total_full).sum();
        let partial: u64 = rows.iter().map(|r| r.total_partial).sum();
        let misses: u64 = rows.iter().map(|r| r.total_misses).sum();
        let gehalf: u64 = rows.iter().map(|r| r.total_gehalf).sum();
        prop_assert_eq!(model.footer.total_statements, statements);
        prop_assert_eq!(model.footer.total_full, full);
        prop_assert_eq!(model.footer.total_partial, partial);
        prop_assert_eq!(model.footer.total_misses, misses);
        prop_assert_eq!(model.footer.total_gehalf, gehalf);

        let expected = if statements == 0 { 1.0 } else { full as f64 / statements as f64 };
        prop_assert_eq!(model.footer.line_rate, expected);
        prop_assert!(model.footer.missed_lines.is_empty());
    }

    #[test]
    fn row_order_ignores_input_order(files in files()) {
        let rows = aggregate_files(&files);
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = build("t", rows, None, "");
        let b = build("t", reversed, None, "");
        prop_assert_eq!(&a, &b);
        for pair in a.rows.windows(2) {
            prop_assert!(pair[0].filename <= pair[1].filename);
        }
    }

    #[test]
    fn generate_is_idempotent(files in files()) {
        let refs: Vec<(&str, &[LineState])> =
            files.iter().map(|(n, s)| (n.as_str(), s.as_slice())).collect();
        let first = generate(common::coverage_data(&refs), &ReportOptions::default(), None);
        let second = generate(common::coverage_data(&refs), &ReportOptions::default(), None);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn gehalf_lies_between_full_and_partial(
        lines in prop::collection::vec((1u32..60, line_state(), any::<bool>()), 0..120)
    ) {
        let mut file = FileLineStatuses::new("f.py".to_string());
        for (number, state, gehalf) in lines {
            file.push_with_gehalf(number, state, gehalf);
        }
        let model = generate(CoverageData { files: vec![file] }, &ReportOptions::default(), None);
        for row in &model.rows {
            prop_assert!(row.total_full <= row.total_gehalf);
            prop_assert!(row.total_gehalf <= row.total_full + row.total_partial);
        }
    }
}
