//! Reduce 3-hourly forecast entries to one representative entry per day.

use std::collections::BTreeMap;

use crate::error::WeatherError;

/// Maximum number of days returned to callers.
pub const MAX_FORECAST_DAYS: usize = 5;

const NOON: &str = "12:00:00";

/// Pick one entry per calendar date from `entries`.
///
/// `dt_txt` reads an entry's `"YYYY-MM-DD HH:MM:SS"` stamp. Entries are grouped
/// by date in the order given. The first entry of a date becomes its candidate,
/// and every later entry of that date whose time is at or before noon replaces
/// it. The result is sorted by date and capped at [`MAX_FORECAST_DAYS`].
pub fn pick_daily<'a, T>(
    entries: &'a [T],
    dt_txt: impl Fn(&T) -> &str,
) -> Result<Vec<&'a T>, WeatherError> {
    let mut by_date: BTreeMap<&str, &T> = BTreeMap::new();

    for entry in entries {
        let stamp = dt_txt(entry);
        let (date, time) = stamp.split_once(' ').ok_or_else(|| {
            WeatherError::unexpected(format!("malformed forecast timestamp: {stamp:?}"))
        })?;

        by_date
            .entry(date)
            .and_modify(|candidate| {
                if time <= NOON {
                    *candidate = entry;
                }
            })
            .or_insert(entry);
    }

    Ok(by_date.into_values().take(MAX_FORECAST_DAYS).collect())
}
