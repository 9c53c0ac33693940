//! Stage 1: Expiration Classification
//!
//! Calendar-only logic. Dates are `NaiveDate`, so "today" comparisons never
//! depend on a timezone.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use super::{ExpirationConfig, ExpirationGroup};
use crate::core::{parse_expiration, HeatmapResult};

/// Select the expirations belonging to a group
///
/// Dates before `today` are always dropped. Duplicates collapse and the
/// output is ascending.
///
/// # Arguments
/// * `expirations` - Candidate dates, any order
/// * `group` - Which subset to keep
/// * `today` - Reference date
/// * `config` - Short-term count and LEAPS horizon
pub fn classify_expirations(
    expirations: &[NaiveDate],
    group: ExpirationGroup,
    today: NaiveDate,
    config: &ExpirationConfig,
) -> Vec<NaiveDate> {
    let mut upcoming: Vec<NaiveDate> = expirations
        .iter()
        .copied()
        .filter(|d| *d >= today)
        .collect();
    upcoming.sort_unstable();
    upcoming.dedup();

    match group {
        ExpirationGroup::All => upcoming,
        ExpirationGroup::Short => {
            upcoming.truncate(config.short_term_count);
            upcoming
        }
        ExpirationGroup::Weekly => upcoming.into_iter().filter(|d| is_friday(*d)).collect(),
        ExpirationGroup::Monthly => upcoming.into_iter().filter(|d| is_monthly_opex(*d)).collect(),
        ExpirationGroup::Leaps => match leaps_cutoff(today, config.leaps_horizon_months) {
            Some(cutoff) => upcoming.into_iter().filter(|d| *d > cutoff).collect(),
            None => Vec::new(),
        },
    }
}

/// String front-end for [`classify_expirations`]
///
/// Malformed dates are a caller error and are returned as such.
pub fn classify_expiration_strings(
    expirations: &[&str],
    group: ExpirationGroup,
    today: NaiveDate,
    config: &ExpirationConfig,
) -> HeatmapResult<Vec<String>> {
    let dates = expirations
        .iter()
        .map(|s| parse_expiration(s))
        .collect::<HeatmapResult<Vec<_>>>()?;

    Ok(classify_expirations(&dates, group, today, config)
        .into_iter()
        .map(|d| d.format(crate::core::EXPIRATION_FORMAT).to_string())
        .collect())
}

/// Is the date a Friday?
pub fn is_friday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri
}

/// First Friday of the date's month
pub fn first_friday(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let offset = (7 + Weekday::Fri.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first.checked_add_days(Days::new(u64::from(offset)))
}

/// Standard monthly expiration: third Friday of the month
pub fn is_monthly_opex(date: NaiveDate) -> bool {
    first_friday(date)
        .and_then(|f| f.checked_add_days(Days::new(14)))
        .map(|third| third == date)
        .unwrap_or(false)
}

/// Last date that is still *not* LEAPS: `today` plus N calendar months
///
/// Month arithmetic clamps to the end of shorter months (Jan 31 + 1 month is
/// the last day of February).
pub fn leaps_cutoff(today: NaiveDate, horizon_months: u32) -> Option<NaiveDate> {
    today.checked_add_months(Months::new(horizon_months))
}
