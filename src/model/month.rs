//! The `YYYY-MM` key that scopes the monthly view.

use anyhow::{bail, ensure, Context};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Returns `None` unless `month` is in `1..=12` and the year has four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((0..=9999).contains(&year) && (1..=12).contains(&month)).then_some(Self { year, month })
    }

    /// The month that `date` falls in, taken from the date's own calendar fields.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current calendar month in local time.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Month::of(date) == *self
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        ensure!(
            bytes.len() == 7 && bytes[4] == b'-',
            "'{s}' is not a month, expected YYYY-MM"
        );
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            bail!("'{s}' is not a month, expected YYYY-MM");
        }
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in '{s}'"))?;
        Month::new(year, month).with_context(|| format!("Month out of range in '{s}'"))
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Month::from_str(&s).map_err(serde::de::Error::custom)
    }
}
