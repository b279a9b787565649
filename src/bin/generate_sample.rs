use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use bikeshare_explorer::data::model::City;

const STATIONS: [&str; 8] = [
    "Streeter Dr & Grand Ave",
    "Lake Shore Dr & Monroe St",
    "Clinton St & Washington Blvd",
    "Canal St & Adams St",
    "Broadway & E 14 St",
    "Pershing Square North",
    "Columbus Circle / Union Station",
    "Lincoln Memorial",
];
const GENDERS: [&str; 2] = ["Male", "Female"];
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

/// Write synthetic trip files for all three cities.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory.
    #[arg(default_value = ".")]
    out_dir: PathBuf,

    /// Trips per city.
    #[arg(long, default_value_t = 500)]
    trips: usize,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// One trip in the Chicago / New York City layout.
#[derive(Serialize)]
struct TripRow {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: i64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type")]
    user_type: String,
    #[serde(rename = "Gender")]
    gender: Option<String>,
    #[serde(rename = "Birth Year")]
    birth_year: Option<f64>,
}

/// Washington publishes no gender or birth year.
#[derive(Serialize)]
struct WashingtonRow {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: i64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type")]
    user_type: String,
}

impl From<TripRow> for WashingtonRow {
    fn from(row: TripRow) -> Self {
        WashingtonRow {
            start_time: row.start_time,
            end_time: row.end_time,
            trip_duration: row.trip_duration,
            start_station: row.start_station,
            end_station: row.end_station,
            user_type: row.user_type,
        }
    }
}

fn generate_trips(n: usize, rng: &mut SimpleRng) -> Result<Vec<TripRow>> {
    let first_day = NaiveDate::from_ymd_opt(2017, 1, 1).context("invalid start date")?;
    let mut trips = Vec::with_capacity(n);

    for _ in 0..n {
        // January through June 2017 (181 days), busier at commute hours.
        let day = first_day + TimeDelta::days(rng.below(181) as i64);
        let hour = match rng.below(4) {
            0 => 8,
            1 => 17,
            _ => rng.below(24) as u32,
        };
        let start: NaiveDateTime = day
            .and_hms_opt(hour, rng.below(60) as u32, rng.below(60) as u32)
            .context("invalid start time")?;
        let duration = 60 + rng.below(45 * 60) as i64;
        let end = start + TimeDelta::seconds(duration);

        let subscriber = rng.below(5) != 0;
        let has_profile = subscriber || rng.below(3) == 0;

        trips.push(TripRow {
            start_time: start.format(TIME_FORMAT).to_string(),
            end_time: end.format(TIME_FORMAT).to_string(),
            trip_duration: duration,
            start_station: rng.pick(&STATIONS).to_string(),
            end_station: rng.pick(&STATIONS).to_string(),
            user_type: if subscriber { "Subscriber" } else { "Customer" }.to_string(),
            gender: has_profile.then(|| rng.pick(&GENDERS).to_string()),
            birth_year: has_profile.then(|| 1945.0 + rng.below(55) as f64),
        });
    }
    Ok(trips)
}

fn write_csv(path: &Path, city: City, trips: Vec<TripRow>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for trip in trips {
        if city.has_demographics() {
            writer.serialize(trip)?;
        } else {
            writer.serialize(WashingtonRow::from(trip))?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, city: City, trips: Vec<TripRow>) -> Result<()> {
    let text = |f: fn(&TripRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(trips.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("Start Time", DataType::Utf8, false),
        Field::new("End Time", DataType::Utf8, false),
        Field::new("Trip Duration", DataType::Int64, false),
        Field::new("Start Station", DataType::Utf8, false),
        Field::new("End Station", DataType::Utf8, false),
        Field::new("User Type", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        text(|t| t.start_time.as_str()),
        text(|t| t.end_time.as_str()),
        Arc::new(Int64Array::from(
            trips.iter().map(|t| t.trip_duration).collect::<Vec<_>>(),
        )),
        text(|t| t.start_station.as_str()),
        text(|t| t.end_station.as_str()),
        text(|t| t.user_type.as_str()),
    ];
    if city.has_demographics() {
        fields.push(Field::new("Gender", DataType::Utf8, true));
        fields.push(Field::new("Birth Year", DataType::Float64, true));
        columns.push(Arc::new(StringArray::from(
            trips.iter().map(|t| t.gender.as_deref()).collect::<Vec<_>>(),
        )));
        columns.push(Arc::new(Float64Array::from(
            trips.iter().map(|t| t.birth_year).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    std::fs::create_dir_all(&args.out_dir).context("creating output directory")?;

    for city in City::ALL {
        let trips = generate_trips(args.trips, &mut rng)?;
        let (ext, write): (&str, fn(&Path, City, Vec<TripRow>) -> Result<()>) = match args.format {
            Format::Csv => ("csv", write_csv),
            Format::Parquet => ("parquet", write_parquet),
        };
        let path = args.out_dir.join(format!("{}.{ext}", city.file_stem()));
        write(&path, city, trips).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} trips for {} to {}", args.trips, city.title(), path.display());
    }
    Ok(())
}
