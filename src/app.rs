use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::{Config, title_case};
use crate::data::filter::{FilterSpec, apply_filter, parse_city, parse_day, parse_month};
use crate::data::loader::load_file;
use crate::data::model::{self, Dataset};
use crate::error::SessionError;
use crate::pager::{PAGE_SIZE, RawPager};
use crate::stats::duration::duration_stats;
use crate::stats::station::station_stats;
use crate::stats::time::{time_stats, with_hours};
use crate::stats::users::user_stats;
use crate::ui::prompt::Console;
use crate::ui::report::{
    SEPARATOR, write_duration_stats, write_elapsed, write_station_stats, write_table,
    write_time_stats, write_user_stats,
};

const CITY_QUESTION: &str = "\nPlease choose one of the following cities you would like to analyze: Chicago, New York City, Washington: ";
const CITY_RETRY: &str = "\nYour entry is not valid.\nPlease choose one of the following cities: Chicago, New York City, Washington: ";
const DAY_QUESTION: &str = "\n Which day of week do you like to analyze? \n Please select between Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday. You can also choose to analyze all of them by typing \"all\": ";
const DAY_RETRY: &str = "\n Your entry is not valid.\n Please choose one of the following options: Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday, All: ";

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

/// Drives the prompt → load → filter → report → page → restart loop.
pub struct BikeshareApp {
    config: Config,
}

impl BikeshareApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run iterations until the user declines to restart. Closing the input
    /// ends the session without error.
    pub fn run<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> Result<()> {
        match self.run_iterations(console) {
            Err(err) if matches!(err.downcast_ref::<SessionError>(), Some(SessionError::InputClosed)) => {
                info!("input closed, ending session");
                Ok(())
            }
            other => other,
        }
    }

    fn run_iterations<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> Result<()> {
        loop {
            self.run_once(console)?;
            let restart = console.ask("\nWould you like to restart? Enter \"yes\" or \"no\".\n")?;
            if restart.to_lowercase() != "yes" {
                return Ok(());
            }
        }
    }

    /// One full pass: filters, reports and raw rows for a fresh dataset.
    pub fn run_once<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> Result<()> {
        writeln!(console.out(), "Hello! Let's explore some US bikeshare data!")?;

        let city = console.ask_until(CITY_QUESTION, CITY_RETRY, parse_city)?;
        let path = self
            .config
            .catalog
            .source(city)
            .with_context(|| format!("no data source configured for {city}"))?;
        let dataset = load_file(path, city)?;

        writeln!(
            console.out(),
            "\nYou chose to analyze the dataset for {}.\nHere you can see a snippet of the dataset:\n",
            city.title()
        )?;
        let head = &dataset.records[..dataset.len().min(PAGE_SIZE)];
        write_table(console.out(), &dataset.column_names, head)?;

        let months = &self.config.months;
        let listed: Vec<String> = months.names().iter().map(|m| title_case(m)).collect();
        let month = console.ask_until(
            &format!(
                "\n Which month do you like to analyze? \n Please select between {}. You can also choose to analyze all of them by typing \"all\": ",
                listed.join(", ")
            ),
            &format!(
                "\n Your entry is not valid.\n Please choose one of the following options: {}, All: ",
                listed.join(", ")
            ),
            |s| parse_month(s, months),
        )?;
        let day = console.ask_until(DAY_QUESTION, DAY_RETRY, parse_day)?;
        writeln!(console.out(), "{SEPARATOR}")?;

        let spec = FilterSpec { city, month, day };
        info!("analyzing {city} with month {month:?}, day {day:?}");
        let filtered = apply_filter(&dataset, &spec);
        if filtered.is_empty() {
            writeln!(console.out(), "\nNo trips match the selected filters.")?;
            writeln!(console.out(), "{SEPARATOR}")?;
            return Ok(());
        }

        let filtered = self.time_report(console, &filtered)?;
        self.station_report(console, &filtered)?;
        self.duration_report(console, &filtered)?;
        self.user_report(console, &filtered)?;
        self.raw_rows(console, &filtered)?;
        Ok(())
    }

    /// Returns the dataset with start hours derived, for the later stages.
    fn time_report<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        dataset: &Dataset,
    ) -> Result<Dataset> {
        writeln!(console.out(), "\nCalculating The Most Frequent Times of Travel...\n")?;
        let started = Instant::now();

        let dataset = with_hours(dataset);
        let stats = time_stats(&dataset, &self.config.months)?;
        write_time_stats(console.out(), &stats)?;

        write_elapsed(console.out(), started.elapsed())?;
        writeln!(console.out(), "{SEPARATOR}")?;
        Ok(dataset)
    }

    fn station_report<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        dataset: &Dataset,
    ) -> Result<()> {
        writeln!(console.out(), "\nCalculating The Most Popular Stations and Trip...\n")?;
        let started = Instant::now();

        let stats = station_stats(dataset)?;
        write_station_stats(console.out(), &stats)?;

        write_elapsed(console.out(), started.elapsed())?;
        writeln!(console.out(), "{SEPARATOR}")?;
        Ok(())
    }

    fn duration_report<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        dataset: &Dataset,
    ) -> Result<()> {
        let wanted = console.confirm(
            "If you want to see some statistics about the trip duration, please type in \"yes\": ",
        )?;
        if wanted && !dataset.has_column(model::END_TIME) {
            info!("{} has no end times, skipping trip durations", dataset.city);
            writeln!(
                console.out(),
                "\nTrip duration is not available for {}.",
                dataset.city.title()
            )?;
        } else if wanted {
            writeln!(console.out(), "\nCalculating Trip Duration...\n")?;
            let started = Instant::now();

            let stats = duration_stats(dataset)
                .with_context(|| format!("computing trip durations for {}", dataset.city))?;
            debug!("{} trips with both timestamps", stats.trips);
            write_duration_stats(console.out(), dataset.city, &stats)?;

            write_elapsed(console.out(), started.elapsed())?;
        }
        writeln!(console.out(), "{SEPARATOR}")?;
        Ok(())
    }

    fn user_report<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        dataset: &Dataset,
    ) -> Result<()> {
        let wanted = console.confirm(
            "If you want to see some statistics about the bikeshare users, please type in \"yes\": ",
        )?;
        if wanted {
            writeln!(console.out(), "\nCalculating User Stats...\n")?;
            let started = Instant::now();

            let stats = user_stats(dataset)
                .with_context(|| format!("computing user statistics for {}", dataset.city))?;
            write_user_stats(console.out(), &stats)?;

            write_elapsed(console.out(), started.elapsed())?;
        }
        writeln!(console.out(), "{SEPARATOR}")?;
        Ok(())
    }

    /// Page through the filtered source rows while the user answers "yes".
    fn raw_rows<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        dataset: &Dataset,
    ) -> Result<()> {
        let mut pager = RawPager::new(dataset);
        writeln!(console.out(), "\nDo you want to see some raw data?\n")?;

        while console.confirm("Please enter \"yes\": ")? {
            let page = pager.next_page();
            if page.is_empty() {
                writeln!(console.out(), "\nNo more rows to show.")?;
            } else {
                writeln!(console.out())?;
                write_table(console.out(), page.column_names, page.rows)?;
            }
            debug!("raw rows cursor now at {:?}", pager.cursor());
            writeln!(console.out(), "\nDo you want to see more lines?")?;
        }
        Ok(())
    }
}
