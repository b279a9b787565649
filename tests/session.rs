//! End-to-end sessions driven by canned console input against fixture files.

use std::io::Cursor;
use std::path::Path;

use bikeshare_explorer::app::BikeshareApp;
use bikeshare_explorer::config::Config;
use bikeshare_explorer::error::LoadError;
use bikeshare_explorer::ui::prompt::Console;
use tempfile::TempDir;

const CHICAGO: &str = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
2017-03-06 08:15:00,2017-03-06 08:25:00,600,Canal St & Adams St,Clinton St & Madison St,Subscriber,Male,1985.0
2017-04-11 17:00:00,2017-04-11 17:30:00,1800,Streeter Dr & Grand Ave,Lake Shore Dr & Monroe St,Customer,,
2017-03-20 08:40:00,2017-03-20 09:00:00,1200,Canal St & Adams St,Streeter Dr & Grand Ave,Subscriber,Female,1990.0
";

const WASHINGTON: &str = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-01-02 07:00:00,2017-01-02 07:05:00,300,Lincoln Memorial,Jefferson Dr,Subscriber
2017-01-02 07:10:00,2017-01-02 07:20:00,600,Lincoln Memorial,Jefferson Dr,Subscriber
2017-01-03 07:20:00,2017-01-03 07:30:00,600,Jefferson Dr,Lincoln Memorial,Customer
2017-01-04 12:00:00,2017-01-04 12:10:00,600,Union Station,Lincoln Memorial,Subscriber
2017-01-05 12:30:00,2017-01-05 12:40:00,600,Union Station,Jefferson Dr,Subscriber
2017-01-06 13:00:00,2017-01-06 13:10:00,600,Union Station,Jefferson Dr,Customer
2017-01-07 14:00:00,2017-01-07 14:10:00,600,Lincoln Memorial,Union Station,Subscriber
2017-01-08 15:00:00,2017-01-08 15:10:00,600,Jefferson Dr,Union Station,Subscriber
";

fn data_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("chicago.csv"), CHICAGO).unwrap();
    std::fs::write(dir.path().join("washington.csv"), WASHINGTON).unwrap();
    dir
}

fn run_session(dir: &Path, input: &str) -> (anyhow::Result<()>, String) {
    let app = BikeshareApp::new(Config::from_data_dir(dir));
    let mut console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let result = app.run(&mut console);
    let output = String::from_utf8(console.into_output()).unwrap();
    (result, output)
}

/// Text printed after the raw-data prompt, i.e. excluding the dataset preview.
fn raw_section(output: &str) -> &str {
    let start = output
        .find("Do you want to see some raw data?")
        .expect("raw data prompt missing");
    &output[start..]
}

/// Leading row positions of the trip rows printed in `raw`.
fn shown_rows(raw: &str) -> Vec<&str> {
    raw.lines()
        .filter(|l| l.contains("2017-"))
        .filter_map(|l| l.split_whitespace().next())
        .collect()
}

#[test]
fn march_in_chicago_full_report() {
    let dir = data_dir();
    let (result, out) = run_session(
        dir.path(),
        "chicago\nmarch\nall\nyes\nyes\nyes\nno\nno\n",
    );
    result.unwrap();

    assert!(out.contains("You chose to analyze the dataset for Chicago."));
    assert!(out.contains(" Month: March\n Day: Monday\n Hour: 8:00"));

    assert!(out.contains("The most popular start station is Canal St & Adams St with 2 trips."));
    // The end-station count comes from the start-station counts.
    assert!(out.contains("The most popular end station is Clinton St & Madison St with 0 trips."));
    assert!(out.contains("The most popular route is from Canal St & Adams St to Clinton St & Madison St."));

    assert!(out.contains(
        "The total travel time in Chicago in your chosen timeframe is 0 days 00:30:00 hours."
    ));
    assert!(out.contains("The average time of a bike rental is 0 days 00:15:00 hours."));

    assert!(out.contains(" Subscriber: 2\n"));
    assert!(!out.contains(" Customer:"));
    assert!(out.contains(" Male: 1\n Female: 1\n"));
    assert!(out.contains("The youngest renter was born in the year 1990"));
    assert!(out.contains("The oldest renter was born in the year 1985"));
    assert!(out.contains("Most of our renters were born in the year 1985"));

    // Only the second March trip (source row 2) is on the first page.
    let raw = raw_section(&out);
    assert!(raw.lines().any(|l| l.starts_with("2  2017-03-20 08:40:00")));
    assert!(!raw.contains("2017-03-06 08:15:00"));
    assert!(!raw.contains("Birth Year  month"));
}

#[test]
fn invalid_answers_are_reprompted() {
    let dir = data_dir();
    let (result, out) = run_session(
        dir.path(),
        "boston\nChicago\njuly\nAPRIL\nfri\ntuesday\nno\nno\nno\nno\n",
    );
    result.unwrap();

    assert_eq!(out.matches("Your entry is not valid.").count(), 3);
    assert!(out.contains(" Month: April\n Day: Tuesday\n Hour: 17:00"));
    // Declined reports print nothing but their separator.
    assert!(!out.contains("Calculating Trip Duration"));
    assert!(!out.contains("Calculating User Stats"));
    assert!(!out.contains("Do you want to see more lines?"));
}

#[test]
fn gates_require_exact_yes() {
    let dir = data_dir();
    let (result, out) = run_session(dir.path(), "chicago\nall\nall\nYes\nyes \ny\nno\n");
    result.unwrap();
    assert!(!out.contains("Calculating Trip Duration"));
    assert!(!out.contains("Calculating User Stats"));
    assert!(!out.contains("Do you want to see more lines?"));
}

#[test]
fn washington_pages_and_restarts() {
    let dir = data_dir();
    let input = "washington\njanuary\nall\nyes\nyes\nyes\nyes\nyes\nno\nYES\n";
    let (result, out) = run_session(dir.path(), input);
    // Input ends during the second iteration's city prompt.
    result.unwrap();

    assert_eq!(out.matches("Hello! Let's explore some US bikeshare data!").count(), 2);
    assert!(out.contains("The total travel time in Washington in your chosen timeframe is 0 days 01:15:00 hours."));
    assert!(out.contains("The average time of a bike rental is 0 days 00:09:22 hours."));
    assert!(out.contains(" Subscriber: 6\n Customer: 2\n"));
    assert!(!out.contains("Gender distribution"));

    let raw = raw_section(&out);
    assert_eq!(shown_rows(raw), vec!["1", "2", "3", "4", "5", "6", "7"]);
    assert!(raw.contains("No more rows to show."));
}

#[test]
fn pager_starts_over_after_restart() {
    let dir = data_dir();
    let pass = "washington\nall\nall\nno\nno\nyes\nno\n";
    let (result, out) = run_session(dir.path(), &format!("{pass}yes\n{pass}no\n"));
    result.unwrap();

    let passes: Vec<&str> = out
        .split("Hello! Let's explore some US bikeshare data!")
        .skip(1)
        .collect();
    assert_eq!(passes.len(), 2);
    for pass in passes {
        assert_eq!(shown_rows(raw_section(pass)), vec!["1", "2", "3", "4", "5"]);
    }
}

#[test]
fn empty_selection_skips_reports() {
    let dir = data_dir();
    let (result, out) = run_session(dir.path(), "chicago\njune\nall\nno\n");
    result.unwrap();
    assert!(out.contains("No trips match the selected filters."));
    assert!(!out.contains("Calculating The Most Frequent Times of Travel"));
    assert!(out.contains("Would you like to restart?"));
}

#[test]
fn missing_city_file_is_fatal() {
    let dir = data_dir();
    let (result, _) = run_session(dir.path(), "new york city\nall\nall\n");
    let err = result.unwrap_err();
    assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::MissingFile(_))));
}

#[test]
fn duration_is_skipped_without_end_time() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("washington.csv"),
        "Start Time,Start Station,End Station,User Type\n\
         2017-02-01 10:00:00,A,B,Subscriber\n",
    )
    .unwrap();

    let (result, out) = run_session(dir.path(), "washington\nall\nall\nyes\nyes\nno\nno\n");
    result.unwrap();

    assert!(out.contains("Trip duration is not available for Washington."));
    assert!(!out.contains("Calculating Trip Duration"));
    assert!(out.contains("User Types: \n\n Subscriber: 1\n"));
    assert!(out.contains("Would you like to restart?"));
}

#[test]
fn malformed_start_time_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("chicago.csv"),
        "Start Time,End Time,Start Station,End Station,User Type,Gender,Birth Year\n\
         sometime,2017-02-01 10:00:00,A,B,Subscriber,Male,1980\n",
    )
    .unwrap();

    let (result, _) = run_session(dir.path(), "chicago\n");
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::BadTimestamp { row: 0, .. })
    ));
}
