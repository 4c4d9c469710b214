//! Request periods and upstream period labels.
//!
//! Requests name periods as `YYYY`, `YYYY-M` or `YYYY-M-D`. Responses label
//! each observation in the series frequency's own style (`02.Jan.20`,
//! `Jan.2020`, `Q1.20`, `2020`), which [`label_to_date`] turns into
//! `YYYY-MM-DD`.

use crate::error::{BcrpError, BcrpResult};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// A validated request period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Year(i32),
    Month { year: i32, month: u32 },
    Day(NaiveDate),
}

impl FromStr for Period {
    type Err = BcrpError;

    fn from_str(s: &str) -> BcrpResult<Self> {
        let invalid = || BcrpError::InvalidPeriod(s.to_string());
        let parts: Vec<&str> = s.trim().split('-').collect();
        let number = |part: &str| -> BcrpResult<u32> {
            if part.is_empty() || part.len() > 4 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let year = match parts.first() {
            Some(&y) if y.len() == 4 => number(y)? as i32,
            _ => return Err(invalid()),
        };

        match parts.len() {
            1 => Ok(Period::Year(year)),
            2 => {
                let month = number(parts[1])?;
                if !(1..=12).contains(&month) {
                    return Err(invalid());
                }
                Ok(Period::Month { year, month })
            }
            3 => {
                let month = number(parts[1])?;
                let day = number(parts[2])?;
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(Period::Day)
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

/// Renders in the unpadded form the series API expects (`2020-1`, `2020-1-5`).
impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use chrono::Datelike;
        match self {
            Period::Year(year) => write!(f, "{}", year),
            Period::Month { year, month } => write!(f, "{}-{}", year, month),
            Period::Day(date) => write!(f, "{}-{}-{}", date.year(), date.month(), date.day()),
        }
    }
}

/// Month number for an English or Spanish abbreviation (`Jan`, `Ene`, `Set`, ...).
fn month_from_abbrev(abbrev: &str) -> Option<u32> {
    let lower = abbrev.trim().to_lowercase();
    let month = match lower.get(..3)? {
        "jan" | "ene" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" | "abr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" | "ago" => 8,
        "sep" | "set" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

/// Two-digit years pivot at 70: `20` is 2020, `95` is 1995.
fn parse_year(raw: &str) -> Option<i32> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if year < 70 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

/// Convert an upstream period label into `YYYY-MM-DD`.
pub fn label_to_date(label: &str) -> BcrpResult<String> {
    let unrecognized = || BcrpError::UnrecognizedPeriod(label.to_string());
    let trimmed = label.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.format("%Y-%m-%d").to_string());
    }

    let parts: Vec<&str> = trimmed.split('.').map(str::trim).collect();
    let date = match parts.as_slice() {
        [year] => NaiveDate::from_ymd_opt(parse_year(year).ok_or_else(unrecognized)?, 1, 1),
        [quarter, year] if quarter.len() == 2 && quarter.starts_with(['Q', 'q', 'T', 't']) => {
            let q: u32 = quarter[1..].parse().map_err(|_| unrecognized())?;
            if !(1..=4).contains(&q) {
                return Err(unrecognized());
            }
            NaiveDate::from_ymd_opt(parse_year(year).ok_or_else(unrecognized)?, (q - 1) * 3 + 1, 1)
        }
        [month, year] => NaiveDate::from_ymd_opt(
            parse_year(year).ok_or_else(unrecognized)?,
            month_from_abbrev(month).ok_or_else(unrecognized)?,
            1,
        ),
        [day, month, year] => NaiveDate::from_ymd_opt(
            parse_year(year).ok_or_else(unrecognized)?,
            month_from_abbrev(month).ok_or_else(unrecognized)?,
            day.parse().map_err(|_| unrecognized())?,
        ),
        _ => None,
    };

    date.map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_periods() {
        assert_eq!("2020".parse::<Period>().unwrap(), Period::Year(2020));
        assert_eq!(
            "2020-1".parse::<Period>().unwrap(),
            Period::Month { year: 2020, month: 1 }
        );
        assert_eq!(
            "2020-01-05".parse::<Period>().unwrap(),
            Period::Day(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap())
        );
    }

    #[test]
    fn test_reject_bad_request_periods() {
        for bad in ["", "20", "2020-13", "2020-2-30", "2020/01", "2020-1-1-1", "abcd-1", "2020--1"] {
            assert!(bad.parse::<Period>().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_period_display_is_unpadded() {
        assert_eq!("2020-01".parse::<Period>().unwrap().to_string(), "2020-1");
        assert_eq!("2020-03-09".parse::<Period>().unwrap().to_string(), "2020-3-9");
        assert_eq!("1999".parse::<Period>().unwrap().to_string(), "1999");
    }

    #[test]
    fn test_daily_labels() {
        assert_eq!(label_to_date("02.Jan.20").unwrap(), "2020-01-02");
        assert_eq!(label_to_date("15.Ago.2019").unwrap(), "2019-08-15");
        assert_eq!(label_to_date("31.Dec.99").unwrap(), "1999-12-31");
    }

    #[test]
    fn test_monthly_labels() {
        assert_eq!(label_to_date("Jan.2020").unwrap(), "2020-01-01");
        assert_eq!(label_to_date("Set.2021").unwrap(), "2021-09-01");
        assert_eq!(label_to_date("Dic.98").unwrap(), "1998-12-01");
    }

    #[test]
    fn test_quarterly_and_annual_labels() {
        assert_eq!(label_to_date("Q1.20").unwrap(), "2020-01-01");
        assert_eq!(label_to_date("T3.2019").unwrap(), "2019-07-01");
        assert_eq!(label_to_date("2015").unwrap(), "2015-01-01");
        assert_eq!(label_to_date("2015-06-30").unwrap(), "2015-06-30");
    }

    #[test]
    fn test_unrecognized_labels() {
        for bad in ["", "Foo.2020", "Q5.20", "32.Jan.20", "Jan.20201", "week 3"] {
            assert!(
                matches!(label_to_date(bad), Err(BcrpError::UnrecognizedPeriod(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
