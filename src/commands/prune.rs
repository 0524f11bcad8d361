use crate::cache::Cache;
use crate::home::{Home, HomePath};
use crate::ui;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

pub fn execute(home: &Home, older_than: Option<u32>) -> Result<()> {
    let cache = Cache::open(&home.path(HomePath::Cache))?;

    let removed = match older_than {
        Some(days) => match cutoff(Utc::now(), days) {
            Some(timestamp) => cache.delete_all_before(timestamp)?,
            // Earlier than any representable time, so nothing can be older
            None => 0,
        },
        None => cache.delete_all()?,
    };

    ui::success("Pruned", format!("{removed} notifications from the cache"));
    Ok(())
}

fn cutoff(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|age| now.checked_sub_signed(age))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cutoff_subtracts_days() {
        let now = Utc.with_ymd_and_hms(2022, 11, 23, 12, 0, 0).unwrap();
        assert_eq!(
            cutoff(now, 3),
            Some(Utc.with_ymd_and_hms(2022, 11, 20, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn cutoff_out_of_range_is_none() {
        assert_eq!(cutoff(Utc::now(), u32::MAX), None);
        assert_eq!(cutoff(Utc::now(), 100_000_000), None);
    }
}
