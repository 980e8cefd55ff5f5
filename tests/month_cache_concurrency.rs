use std::{sync::Arc, thread};

use chrono::NaiveDate;
use payment_timeline::MonthCache;

#[test]
fn threads_share_one_instance_per_month() {
    let cache = Arc::new(MonthCache::new());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                (1..=12)
                    .map(|number| cache.get(2020 + worker % 2, number).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(cache.len(), 24);
    for months in &results {
        let year = months[0].year();
        for (index, month) in months.iter().enumerate() {
            let canonical = cache.get(year, index as u32 + 1).unwrap();
            assert!(Arc::ptr_eq(month, &canonical));
        }
    }
}

#[test]
fn global_cache_is_shared_across_threads() {
    let day = NaiveDate::from_ymd_opt(2031, 7, 14).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| thread::spawn(move || MonthCache::global().containing(day).unwrap()))
        .collect();
    let from_threads: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let canonical = MonthCache::global().get(2031, 7).unwrap();
    assert!(from_threads
        .iter()
        .all(|month| Arc::ptr_eq(month, &canonical)));
}
