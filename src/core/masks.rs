//! Text helpers applied to form input and timestamps before display.

use chrono::{DateTime, Local, TimeZone};

/// Portuguese connectors left in lower case by
/// [`capitalize_text_without_connectors`] unless they open the text.
const CONNECTORS: [&str; 8] = ["de", "do", "da", "dos", "das", "e", "para", "com"];

/// Title-cases every word except connectors: `"maria DA silva"` becomes
/// `"Maria da Silva"`. Words are split on single spaces, so runs of spaces
/// survive as-is.
pub fn capitalize_text_without_connectors(text: &str) -> String {
    text.to_lowercase()
        .split(' ')
        .enumerate()
        .map(|(index, word)| {
            if index == 0 || !CONNECTORS.contains(&word) {
                capitalize_first(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn text_without_space(text: &str) -> String {
    text.trim().to_string()
}

/// `dd/mm/yyyy - HH:MM` in local time. Input that is not RFC 3339 comes
/// back unchanged.
pub fn format_date_time(date_time: &str) -> String {
    format_date_time_in(date_time, &Local)
}

pub fn format_date_time_in<Tz: TimeZone>(date_time: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(date_time) {
        Ok(parsed) => parsed
            .with_timezone(tz)
            .format("%d/%m/%Y - %H:%M")
            .to_string(),
        Err(_) => date_time.to_string(),
    }
}
