use std::{
    collections::HashMap,
    ops::RangeInclusive,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::errors::PeriodError;

use super::Month;

static GLOBAL: Lazy<MonthCache> = Lazy::new(MonthCache::new);

/// Interns [`Month`] values by year and month number.
///
/// Entries are created on first request and never evicted; the key space is
/// bounded by the years the system operates on. The cache is safe to share
/// between threads. [`MonthCache::global`] is created once per process and
/// lives until exit; tests build isolated caches with [`MonthCache::new`].
#[derive(Debug, Default)]
pub struct MonthCache {
    entries: RwLock<HashMap<(i32, u32), Arc<Month>>>,
}

impl MonthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static MonthCache {
        &GLOBAL
    }

    /// Returns the interned month, creating it on first use.
    pub fn get(&self, year: i32, month: u32) -> Result<Arc<Month>, PeriodError> {
        let key = (year, month);
        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(found));
        }

        let built = Month::of(year, month)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            entries.entry(key).or_insert_with(|| Arc::new(built)),
        ))
    }

    pub fn containing(&self, date: NaiveDate) -> Result<Arc<Month>, PeriodError> {
        self.get(date.year(), date.month())
    }

    /// Interns every month of the given years up front.
    pub fn prewarm(&self, years: RangeInclusive<i32>) -> Result<usize, PeriodError> {
        let mut created = 0;
        for year in years {
            for month in 1..=12 {
                self.get(year, month)?;
                created += 1;
            }
        }
        debug!(months = created, "month cache prewarmed");
        Ok(created)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
