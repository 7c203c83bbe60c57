//! Wall-clock calendar arithmetic.
//!
//! Every function works on `chrono::NaiveDateTime`: values carry no offset,
//! so adding a day keeps the time of day even across a DST change in
//! whatever zone the caller later resolves them in. Timezone conversion is
//! not done here.

mod arith;
mod iso8601;

pub use arith::{
    add_days, add_duration, add_minutes, add_months, add_weeks, add_years, day_begin, day_end,
    day_of_year, days_in_month, is_leap_year, month_begin, month_end, week_begin, week_end,
    year_begin, year_end,
};
pub use iso8601::{IsoDateTime, format_iso8601, format_iso8601_utc, parse_iso8601};
