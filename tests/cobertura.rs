use covrep::model::MissedRange;
use covrep::parsers::cobertura::CoberturaParser;
use covrep::parsers::Parser;
use covrep::report::{generate, ReportOptions};

#[test]
fn checked_cobertura_report() {
    let xml = include_bytes!("fixtures/checked_cobertura.xml");
    let data = CoberturaParser.parse(xml).unwrap();
    let model = generate(data, &ReportOptions::default(), None);

    let names: Vec<_> = model.rows.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["project/pkg/a.py", "project/pkg/b.py"]);

    let a = &model.rows[0];
    assert_eq!(a.total_misses, 2);
    assert_eq!(a.line_rate, 0.0);
    assert_eq!(a.missed_lines, vec![MissedRange::new(1, 2)]);

    assert_eq!(model.footer.total_statements, 5);
    assert_eq!(model.footer.total_full, 3);
    assert_eq!(model.footer.total_misses, 2);
    assert_eq!(model.footer.total_gehalf, 3);
    assert_eq!(model.footer.line_rate, 0.6);
}

#[test]
fn cobertura_method_and_class_lines_counted_once() {
    let xml = include_bytes!("fixtures/sample_cobertura.xml");
    let data = CoberturaParser.parse(xml).unwrap();
    let model = generate(data, &ReportOptions::default(), None);

    let main = &model.rows[0];
    assert_eq!(main.filename, "/home/user/project/src/main.py");
    assert_eq!(main.total_statements, 8);
    assert_eq!(main.total_full, 5);
    assert_eq!(main.total_partial, 1);
    assert_eq!(main.total_misses, 2);
    assert_eq!(main.partial_lines, vec![8]);
    assert_eq!(
        main.missed_lines,
        vec![MissedRange::single(3), MissedRange::single(9)]
    );
}
