use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// 輸出格式，例如 `2024年12月03日 09:00`
pub const CANONICAL_FORMAT: &str = "%Y年%m月%d日 %H:%M";

/// 上游的當地時間 (JST)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

static RE_HOURS_AGO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)時間前").unwrap());
static RE_MINUTES_AGO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)分前").unwrap());
static RE_ABSOLUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]{4})年([0-9]{1,2})月([0-9]{1,2})日\s*([0-9]{1,2})時([0-9]{2})分\s*$").unwrap()
});

/// 上游時間字串的分類，依優先順序比對
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    RelativeHours(i64),
    RelativeMinutes(i64),
    Absolute(NaiveDateTime),
    Unrecognized,
}

impl DateFormat {
    /// 相對時間必須先於絕對時間判斷，否則 `3時間前` 會直接落到 Unrecognized
    pub fn classify(raw: &str) -> Self {
        relative_amount(&RE_HOURS_AGO, raw)
            .map(DateFormat::RelativeHours)
            .or_else(|| relative_amount(&RE_MINUTES_AGO, raw).map(DateFormat::RelativeMinutes))
            .or_else(|| absolute_datetime(raw).map(DateFormat::Absolute))
            .unwrap_or(DateFormat::Unrecognized)
    }
}

fn relative_amount(re: &Regex, raw: &str) -> Option<i64> {
    re.captures(raw)?.get(1)?.as_str().parse().ok()
}

fn absolute_datetime(raw: &str) -> Option<NaiveDateTime> {
    let caps = RE_ABSOLUTE.captures(raw)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?.and_hms_opt(num(4)?, num(5)?, 0)
}

#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    offset: FixedOffset,
}

impl DateNormalizer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.normalize_at(raw, self.now())
    }

    /// 以 `now` 為基準轉換；無法辨識的字串回傳 `now` 並記錄警告
    pub fn normalize_at(&self, raw: &str, now: DateTime<FixedOffset>) -> String {
        let resolved = match DateFormat::classify(raw) {
            DateFormat::RelativeHours(hours) => {
                TimeDelta::try_hours(hours).and_then(|d| now.checked_sub_signed(d))
            }
            DateFormat::RelativeMinutes(minutes) => {
                TimeDelta::try_minutes(minutes).and_then(|d| now.checked_sub_signed(d))
            }
            DateFormat::Absolute(naive) => return naive.format(CANONICAL_FORMAT).to_string(),
            DateFormat::Unrecognized => None,
        };

        match resolved {
            Some(ts) => ts.format(CANONICAL_FORMAT).to_string(),
            None => {
                tracing::warn!("Unable to parse date: {:?}, falling back to current time", raw);
                now.format(CANONICAL_FORMAT).to_string()
            }
        }
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::from_offset_hours(DEFAULT_UTC_OFFSET_HOURS).unwrap_or_else(|| Self::new(Utc.fix()))
    }
}
