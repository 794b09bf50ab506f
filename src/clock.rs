use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Storage form of every timestamp. Day filters are string-prefix matches
/// against this layout, so it must stay `YYYY-MM-DD HH:MM:SS`.
const STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DAY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn now_stamp() -> String {
    OffsetDateTime::now_utc()
        .format(&STAMP)
        .expect("static timestamp format")
}

pub fn today_stamp() -> String {
    OffsetDateTime::now_utc()
        .format(&DAY)
        .expect("static day format")
}

pub fn unix_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
