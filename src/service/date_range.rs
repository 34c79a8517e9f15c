use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 时间范围标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationTag {
    SevenDays,
    LastMonth,
    Last3Months,
    Last6Months,
    LastYear,
    CurrentMonth,
}

impl DurationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationTag::SevenDays => "7days",
            DurationTag::LastMonth => "lastMonth",
            DurationTag::Last3Months => "last3Months",
            DurationTag::Last6Months => "last6Months",
            DurationTag::LastYear => "lastYear",
            DurationTag::CurrentMonth => "currentMonth",
        }
    }
}

/// 区分大小写; 无法识别的标签按当月处理
impl From<&str> for DurationTag {
    fn from(tag: &str) -> Self {
        match tag {
            "7days" => DurationTag::SevenDays,
            "lastMonth" => DurationTag::LastMonth,
            "last3Months" => DurationTag::Last3Months,
            "last6Months" => DurationTag::Last6Months,
            "lastYear" => DurationTag::LastYear,
            _ => DurationTag::CurrentMonth,
        }
    }
}

/// 闭区间 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// 以当前时间计算范围
pub fn date_range_for(tag: DurationTag) -> DateRange {
    date_range_for_duration(tag, Utc::now())
}

/// 以给定的 `now` 计算范围
///
/// 月份回退时日期按目标月最后一天截断 (如 5/31 往前 3 个月 => 2/28 或 2/29).
pub fn date_range_for_duration(tag: DurationTag, now: DateTime<Utc>) -> DateRange {
    let window = match tag {
        DurationTag::SevenDays => Some(DateRange { start: now - Duration::days(7), end: now }),
        DurationTag::LastMonth => {
            let (year, month) = previous_month(now.year(), now.month());
            month_window(year, month)
        }
        DurationTag::Last3Months => months_back(now, 3).map(|start| DateRange { start, end: now }),
        DurationTag::Last6Months => months_back(now, 6).map(|start| DateRange { start, end: now }),
        DurationTag::LastYear => {
            // 起点是 12 个月前那一年的 1 月 1 日, 终点是 12 个月前的此刻 (非对称窗口)
            months_back(now, 12).and_then(|anchor| {
                month_start(anchor.year(), 1).map(|start| DateRange { start, end: anchor })
            })
        }
        DurationTag::CurrentMonth => month_window(now.year(), now.month()),
    };

    // 仅在日期溢出 chrono 可表示范围时触发
    window.unwrap_or(DateRange { start: now, end: now })
}

fn months_back(now: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    now.checked_sub_months(Months::new(months))
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// 整月: 月初零点 ~ 月末最后一毫秒
fn month_window(year: i32, month: u32) -> Option<DateRange> {
    let start = month_start(year, month)?;
    let (next_year, next) = next_month(year, month);
    let end = month_start(next_year, next)? - Duration::milliseconds(1);
    Some(DateRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parses_tags_case_sensitively() {
        assert_eq!(DurationTag::from("7days"), DurationTag::SevenDays);
        assert_eq!(DurationTag::from("last6Months"), DurationTag::Last6Months);
        assert_eq!(DurationTag::from("LastMonth"), DurationTag::CurrentMonth);
        assert_eq!(DurationTag::from(""), DurationTag::CurrentMonth);
        assert_eq!(DurationTag::from("lastYear").as_str(), "lastYear");
    }

    #[test]
    fn seven_days() {
        let now = at("2024-05-15T10:00:00Z");
        let range = date_range_for_duration(DurationTag::SevenDays, now);
        assert_eq!(range.start, at("2024-05-08T10:00:00Z"));
        assert_eq!(range.end, now);
    }

    #[test]
    fn last_month_is_full_previous_calendar_month() {
        let range = date_range_for_duration(DurationTag::LastMonth, at("2024-03-15T10:00:00Z"));
        assert_eq!(range.start, at("2024-02-01T00:00:00Z"));
        assert_eq!(range.end, at("2024-02-29T23:59:59.999Z"));
    }

    #[test]
    fn last_month_in_january_wraps_year() {
        let range = date_range_for_duration(DurationTag::LastMonth, at("2024-01-10T00:00:00Z"));
        assert_eq!(range.start, at("2023-12-01T00:00:00Z"));
        assert_eq!(range.end, at("2023-12-31T23:59:59.999Z"));
    }

    #[test]
    fn rolling_month_windows() {
        let now = at("2024-05-31T08:00:00Z");
        let three = date_range_for_duration(DurationTag::Last3Months, now);
        assert_eq!(three.start, at("2024-02-29T08:00:00Z"));
        assert_eq!(three.end, now);

        let six = date_range_for_duration(DurationTag::Last6Months, now);
        assert_eq!(six.start, at("2023-11-30T08:00:00Z"));
    }

    #[test]
    fn last_year_window_is_asymmetric() {
        let now = at("2024-05-15T10:00:00Z");
        let range = date_range_for_duration(DurationTag::LastYear, now);
        assert_eq!(range.start, at("2023-01-01T00:00:00Z"));
        assert_eq!(range.end, at("2023-05-15T10:00:00Z"));
    }

    #[test]
    fn current_month_is_default() {
        let now = at("2024-12-05T10:00:00Z");
        let range = date_range_for_duration(DurationTag::from("bogus"), now);
        assert_eq!(range.start, at("2024-12-01T00:00:00Z"));
        assert_eq!(range.end, at("2024-12-31T23:59:59.999Z"));
        assert!(range.contains(now));
    }
}
