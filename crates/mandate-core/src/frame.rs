//! Conversion from provider OHLCV frames to [`PriceSeries`].
//!
//! Providers hand back a polars [`DataFrame`]; the statistics engine only ever
//! sees a single ordered [`PriceSeries`]. This is the one place where a frame
//! is narrowed down to the price column the caller asked for.

use chrono::{Duration, NaiveDate};
use polars::prelude::{DataFrame, DataType};

use crate::{
    error::{DataError, Result},
    types::{PriceField, PricePoint, PriceSeries},
};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Extracts one price column of an OHLCV frame as a [`PriceSeries`].
///
/// The frame must have a `date` column (polars `Date` or days since the Unix
/// epoch as integers) and the column named by `field`. When the adjusted
/// close is requested but absent, the raw close is used instead. Rows with a
/// null date or price are skipped.
pub fn price_series_from_frame(df: &DataFrame, field: PriceField) -> Result<PriceSeries> {
    if df.height() == 0 {
        return Ok(PriceSeries::new());
    }

    let column_name = match field {
        PriceField::AdjustedClose if df.column(field.column()).is_err() => {
            PriceField::Close.column()
        }
        _ => field.column(),
    };

    let dates = df
        .column("date")
        .map_err(|e| DataError::Parse(format!("missing date column: {e}")))?
        .cast(&DataType::Int32)
        .map_err(|e| DataError::Parse(e.to_string()))?;
    let dates = dates
        .i32()
        .map_err(|e| DataError::Parse(e.to_string()))?;

    let prices = df
        .column(column_name)
        .map_err(|e| DataError::Parse(format!("missing {column_name} column: {e}")))?
        .cast(&DataType::Float64)
        .map_err(|e| DataError::Parse(e.to_string()))?;
    let prices = prices
        .f64()
        .map_err(|e| DataError::Parse(e.to_string()))?;

    let points = dates
        .into_iter()
        .zip(prices.into_iter())
        .filter_map(|(date, price)| Some(PricePoint::new(epoch_days_to_date(date?)?, price?)));

    Ok(PriceSeries::from_points(points))
}

/// Converts days since the Unix epoch to a calendar date.
#[must_use]
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Converts a calendar date to days since the Unix epoch.
///
/// Returns `None` when the day count does not fit in an `i32`.
#[must_use]
pub fn date_to_epoch_days(date: NaiveDate) -> Option<i32> {
    let days: Duration = date - NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from(days.num_days()).ok()
}
