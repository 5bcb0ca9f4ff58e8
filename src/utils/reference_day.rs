use crate::error::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;

/// 时间来源，测试中可替换
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 参考日：全系统共用一个固定 UTC 偏移来判断"今天"，
/// 每日次数、额外次数与兑换码幂等窗口都以此为准
#[derive(Clone)]
pub struct ReferenceDay {
    offset: FixedOffset,
    clock: Arc<dyn Clock>,
}

impl ReferenceDay {
    pub fn new(utc_offset_minutes: i32, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            AppError::ConfigError(format!("Invalid UTC offset: {utc_offset_minutes} minutes"))
        })?;
        Ok(Self { offset, clock })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.offset).date_naive()
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// 手动推进的时钟
#[cfg(test)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_today_uses_reference_offset() {
        // 2026-01-10 17:30 UTC = 2026-01-11 00:30 (UTC+7)
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 10, 17, 30, 0).unwrap(),
        ));
        let day = ReferenceDay::new(420, clock.clone()).unwrap();
        assert_eq!(day.today(), NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());

        let utc_day = ReferenceDay::new(0, clock).unwrap();
        assert_eq!(utc_day.today(), NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
    }

    #[test]
    fn test_day_rolls_over_at_reference_midnight() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 10, 16, 59, 59).unwrap(),
        ));
        let day = ReferenceDay::new(420, clock.clone()).unwrap();
        assert_eq!(day.today(), NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
        clock.advance(Duration::seconds(1));
        assert_eq!(day.today(), NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());
    }

    #[test]
    fn test_invalid_offset() {
        assert!(ReferenceDay::new(24 * 60, Arc::new(SystemClock)).is_err());
    }
}
