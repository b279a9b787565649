use std::io::{self, Write};
use std::time::Duration;

use crate::data::model::{City, TripRecord};
use crate::stats::duration::DurationStats;
use crate::stats::station::StationStats;
use crate::stats::time::TimeStats;
use crate::stats::users::UserStats;

/// Rule printed between report sections.
pub const SEPARATOR: &str = "----------------------------------------";

// ---------------------------------------------------------------------------
// Report sections
// ---------------------------------------------------------------------------

pub fn write_time_stats(out: &mut impl Write, stats: &TimeStats) -> io::Result<()> {
    writeln!(
        out,
        "The most frequent times of starting a travel are:\n\n Month: {}\n Day: {}\n Hour: {}:00",
        stats.popular_month, stats.popular_day, stats.popular_hour
    )
}

pub fn write_station_stats(out: &mut impl Write, stats: &StationStats) -> io::Result<()> {
    writeln!(
        out,
        "The most popular start station is {} with {} trips.",
        stats.popular_start, stats.start_count
    )?;
    writeln!(
        out,
        "The most popular end station is {} with {} trips.",
        stats.popular_end, stats.end_count
    )?;
    writeln!(
        out,
        "The most popular route is from {} to {}.",
        stats.popular_route.0, stats.popular_route.1
    )
}

pub fn write_duration_stats(
    out: &mut impl Write,
    city: City,
    stats: &DurationStats,
) -> io::Result<()> {
    writeln!(
        out,
        "The total travel time in {} in your chosen timeframe is {} hours.",
        city.title(),
        stats.total_display()
    )?;
    writeln!(
        out,
        "\nThe average time of a bike rental is {} hours.",
        stats.mean_display()
    )
}

pub fn write_user_stats(out: &mut impl Write, stats: &UserStats) -> io::Result<()> {
    writeln!(out, "User Types: \n")?;
    for (user_type, count) in &stats.user_types {
        writeln!(out, " {user_type}: {count}")?;
    }

    if let Some(demo) = &stats.demographics {
        writeln!(out, "\nGender distribution: \n")?;
        for (gender, count) in &demo.genders {
            writeln!(out, " {gender}: {count}")?;
        }
        let years = demo.birth_years;
        writeln!(out, "\nThe youngest renter was born in the year {}", years.most_recent)?;
        writeln!(out, "The oldest renter was born in the year {}", years.earliest)?;
        writeln!(out, "Most of our renters were born in the year {}", years.most_common)?;
    }
    Ok(())
}

pub fn write_elapsed(out: &mut impl Write, elapsed: Duration) -> io::Result<()> {
    writeln!(out, "\nThis took {} seconds.", elapsed.as_secs_f64())
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// Print rows as an aligned table. The first, unlabeled column is each
/// row's position in the source file.
pub fn write_table(
    out: &mut impl Write,
    column_names: &[String],
    rows: &[TripRecord],
) -> io::Result<()> {
    let index: Vec<String> = rows.iter().map(|r| r.row_index.to_string()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            (0..column_names.len())
                .map(|i| r.cells.get(i).map(ToString::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    let index_width = index.iter().map(String::len).max().unwrap_or(0);
    let widths: Vec<usize> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write!(out, "{:index_width$}", "")?;
    for (name, width) in column_names.iter().zip(widths.iter().copied()) {
        write!(out, "  {name:>width$}")?;
    }
    writeln!(out)?;

    for (idx, row) in index.iter().zip(&cells) {
        write!(out, "{idx:<index_width$}")?;
        for (value, width) in row.iter().zip(widths.iter().copied()) {
            write!(out, "  {value:>width$}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
