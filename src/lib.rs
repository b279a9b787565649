//! Interactive explorer for US bikeshare trip data.
//!
//! A session loads one city's trips, narrows them by month and weekday and
//! prints travel-time, station, duration and rider statistics before paging
//! through the matching raw rows.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod pager;
pub mod stats;
pub mod ui;
