use movie_trends::loader::{load_movies, parse_csv, parse_json};
use movie_trends::Error;
use std::fs;
use tempfile::TempDir;

#[test]
fn json_accepts_string_and_numeric_fields() {
    let data = r#"[
        {"Title": "Inception", "Year": "2010", "Released": "16 Jul 2010", "Genre": "Action, Sci-Fi", "BoxOffice": "$292,576,195"},
        {"Title": "Numeric", "Year": 2011, "BoxOffice": null}
    ]"#;
    let (records, report) = parse_json(data.as_bytes()).unwrap();
    assert_eq!(report.total_rows, 2);
    assert_eq!(report.loaded_rows, 2);
    assert_eq!(report.parse_errors, 0);
    assert_eq!(records[0].box_office.as_deref(), Some("$292,576,195"));
    assert_eq!(records[1].year.as_deref(), Some("2011"));
    assert_eq!(records[1].box_office, None);
    assert_eq!(records[1].genre, None);
}

#[test]
fn json_rows_that_are_not_movies_are_counted() {
    let data = r#"[
        {"Title": "Fine", "Year": "2010"},
        "not a movie",
        {"Title": {"nested": true}, "Year": "2010"}
    ]"#;
    let (records, report) = parse_json(data.as_bytes()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(report.parse_errors, 2);
}

#[test]
fn json_that_is_not_an_array_fails() {
    let err = parse_json(r#"{"Title": "alone"}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn csv_uses_the_same_headers() {
    let data = "Title,Year,Released,Genre,BoxOffice\n\
                Inception,2010,16 Jul 2010,\"Action, Sci-Fi\",\"$292,576,195\"\n\
                Short,2012,,,\n";
    let (records, report) = parse_csv(data.as_bytes()).unwrap();
    assert_eq!(report.total_rows, 2);
    assert_eq!(records[0].genre.as_deref(), Some("Action, Sci-Fi"));
    assert_eq!(records[0].year.as_deref(), Some("2010"));
    assert_eq!(records[1].title.as_deref(), Some("Short"));
}

#[test]
fn load_picks_format_from_extension() {
    let dir = TempDir::new().unwrap();

    let json_path = dir.path().join("movies.json");
    fs::write(&json_path, r#"[{"Title": "A", "Year": "2010"}]"#).unwrap();
    let (records, _) = load_movies(&json_path).unwrap();
    assert_eq!(records.len(), 1);

    let csv_path = dir.path().join("movies.CSV");
    fs::write(&csv_path, "Title,Year\nA,2010\nB,2011\n").unwrap();
    let (records, _) = load_movies(&csv_path).unwrap();
    assert_eq!(records.len(), 2);

    let txt_path = dir.path().join("movies.txt");
    fs::write(&txt_path, "whatever").unwrap();
    assert!(matches!(load_movies(&txt_path), Err(Error::UnsupportedFormat(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_movies(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
