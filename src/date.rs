//! HTTP-date パース (RFC 9110 Section 5.6.7)
//!
//! ## 概要
//!
//! Cookie の Expires 属性などで使われる HTTP-date をパースし、
//! Unix タイムスタンプ (秒) との相互変換を提供します。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::date::HttpDate;
//!
//! let date = HttpDate::parse("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
//! assert_eq!(date.to_unix_timestamp(), 784111777);
//!
//! let date = HttpDate::from_unix_timestamp(784111777);
//! assert_eq!(date.to_string(), "Sun, 06 Nov 1994 08:49:37 GMT");
//! ```

use core::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// HTTP-date パースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// 空の日付
    Empty,
    /// 不正な形式
    InvalidFormat,
    /// 不正な曜日
    InvalidDayName,
    /// 不正な日
    InvalidDay,
    /// 不正な月
    InvalidMonth,
    /// 不正な年
    InvalidYear,
    /// 不正な時刻
    InvalidTime,
    /// GMT ではない
    NotGmt,
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::Empty => write!(f, "empty date"),
            DateError::InvalidFormat => write!(f, "invalid date format"),
            DateError::InvalidDayName => write!(f, "invalid day name"),
            DateError::InvalidDay => write!(f, "invalid day"),
            DateError::InvalidMonth => write!(f, "invalid month"),
            DateError::InvalidYear => write!(f, "invalid year"),
            DateError::InvalidTime => write!(f, "invalid time"),
            DateError::NotGmt => write!(f, "timezone is not GMT"),
        }
    }
}

impl std::error::Error for DateError {}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const LONG_DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// パース済み HTTP-date (常に GMT)
///
/// 3 つの形式をパースできます:
/// - IMF-fixdate: `Sun, 06 Nov 1994 08:49:37 GMT`
/// - RFC 850: `Sunday, 06-Nov-94 08:49:37 GMT`
/// - ANSI C asctime: `Sun Nov  6 08:49:37 1994`
///
/// 曜日名は形式の検証にのみ使い、日付との整合性は確認しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpDate {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl HttpDate {
    /// HTTP-date 文字列をパース
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DateError::Empty);
        }

        // カンマの有無で形式を判別
        if let Some((day_name, rest)) = input.split_once(',') {
            check_day_name(day_name.trim())?;
            let rest = rest.trim_start();
            if rest.contains('-') {
                parse_rfc850(rest)
            } else {
                parse_imf_fixdate(rest)
            }
        } else {
            parse_asctime(input)
        }
    }

    /// 各フィールドを指定して作成
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateError> {
        if !(1..=12).contains(&month) {
            return Err(DateError::InvalidMonth);
        }
        if !(1..=31).contains(&day) {
            return Err(DateError::InvalidDay);
        }
        // 60 はうるう秒
        if hour > 23 || minute > 59 || second > 60 {
            return Err(DateError::InvalidTime);
        }
        Ok(HttpDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Unix タイムスタンプ (秒) から作成
    pub fn from_unix_timestamp(timestamp: i64) -> Self {
        let days = timestamp.div_euclid(86_400);
        let secs = timestamp.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        HttpDate {
            year: year.clamp(0, 9999) as u16,
            month: month as u8,
            day: day as u8,
            hour: (secs / 3600) as u8,
            minute: (secs % 3600 / 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    /// Unix タイムスタンプ (秒) に変換
    pub fn to_unix_timestamp(&self) -> i64 {
        let days = days_from_civil(self.year as i64, self.month as i64, self.day as i64);
        days * 86_400 + self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64
    }

    /// 年を取得
    pub fn year(&self) -> u16 {
        self.year
    }

    /// 月を取得 (1-12)
    pub fn month(&self) -> u8 {
        self.month
    }

    /// 日を取得 (1-31)
    pub fn day(&self) -> u8 {
        self.day
    }

    /// 曜日名を取得 (Sun-Sat)
    pub fn day_name(&self) -> &'static str {
        let days = days_from_civil(self.year as i64, self.month as i64, self.day as i64);
        // 1970-01-01 は木曜日
        DAY_NAMES[(days + 4).rem_euclid(7) as usize]
    }
}

impl fmt::Display for HttpDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IMF-fixdate 形式で出力
        write!(
            f,
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            self.day_name(),
            self.day,
            MONTH_NAMES[(self.month - 1) as usize],
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }
}

fn check_day_name(name: &str) -> Result<(), DateError> {
    if DAY_NAMES.contains(&name) || LONG_DAY_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(DateError::InvalidDayName)
    }
}

/// IMF-fixdate: `06 Nov 1994 08:49:37 GMT`
fn parse_imf_fixdate(rest: &str) -> Result<HttpDate, DateError> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(DateError::InvalidFormat);
    }
    if parts[4] != "GMT" {
        return Err(DateError::NotGmt);
    }

    let day = parts[0].parse::<u8>().map_err(|_| DateError::InvalidDay)?;
    let month = parse_month(parts[1])?;
    let year = parts[2]
        .parse::<u16>()
        .map_err(|_| DateError::InvalidYear)?;
    let (hour, minute, second) = parse_time(parts[3])?;

    HttpDate::new(year, month, day, hour, minute, second)
}

/// RFC 850: `06-Nov-94 08:49:37 GMT`
///
/// Set-Cookie では `01-Jan-1970` のように 4 桁年を使う実装も多いため、両方受け付ける。
fn parse_rfc850(rest: &str) -> Result<HttpDate, DateError> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(DateError::InvalidFormat);
    }
    if parts[2] != "GMT" {
        return Err(DateError::NotGmt);
    }

    let date_parts: Vec<&str> = parts[0].split('-').collect();
    if date_parts.len() != 3 {
        return Err(DateError::InvalidFormat);
    }

    let day = date_parts[0]
        .parse::<u8>()
        .map_err(|_| DateError::InvalidDay)?;
    let month = parse_month(date_parts[1])?;
    let raw_year = date_parts[2]
        .parse::<u16>()
        .map_err(|_| DateError::InvalidYear)?;
    let year = if raw_year < 100 {
        interpret_two_digit_year(raw_year)
    } else {
        raw_year
    };
    let (hour, minute, second) = parse_time(parts[1])?;

    HttpDate::new(year, month, day, hour, minute, second)
}

/// ANSI C asctime: `Sun Nov  6 08:49:37 1994`
fn parse_asctime(input: &str) -> Result<HttpDate, DateError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(DateError::InvalidFormat);
    }

    check_day_name(parts[0])?;
    let month = parse_month(parts[1])?;
    let day = parts[2].parse::<u8>().map_err(|_| DateError::InvalidDay)?;
    let (hour, minute, second) = parse_time(parts[3])?;
    let year = parts[4]
        .parse::<u16>()
        .map_err(|_| DateError::InvalidYear)?;

    HttpDate::new(year, month, day, hour, minute, second)
}

fn parse_month(s: &str) -> Result<u8, DateError> {
    MONTH_NAMES
        .iter()
        .position(|name| *name == s)
        .map(|i| (i + 1) as u8)
        .ok_or(DateError::InvalidMonth)
}

/// `HH:MM:SS`
fn parse_time(s: &str) -> Result<(u8, u8, u8), DateError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(DateError::InvalidFormat);
    }
    let field = |p: &str| p.parse::<u8>().map_err(|_| DateError::InvalidTime);
    Ok((field(parts[0])?, field(parts[1])?, field(parts[2])?))
}

/// 2 桁年を解釈する
///
/// RFC 9110 Section 5.6.7: 50 年以上未来に見える場合は 100 年前とみなす
fn interpret_two_digit_year(two_digit: u16) -> u16 {
    let current = current_year();
    let candidate = (current / 100) * 100 + two_digit;
    if candidate > current + 50 {
        candidate - 100
    } else {
        candidate
    }
}

/// 現在時刻の Unix タイムスタンプ (秒)
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(not(test))]
fn current_year() -> u16 {
    HttpDate::from_unix_timestamp(unix_now()).year()
}

#[cfg(test)]
fn current_year() -> u16 {
    2026
}

/// グレゴリオ暦の日付から 1970-01-01 からの日数を求める
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = if year >= 0 { year } else { year - 399 } / 400;
    let year_of_era = year - era * 400;
    let month_index = (month + 9) % 12;
    let day_of_year = (153 * month_index + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

/// 1970-01-01 からの日数をグレゴリオ暦の (年, 月, 日) に変換
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}
