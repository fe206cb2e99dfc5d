//! Client-side downloads: asteroid CSV and plain-text chat transcripts.

use crate::chat::Turn;
use crate::feeds::Asteroid;
use chrono::{DateTime, Local, NaiveDate, Utc};

pub const ASTEROID_CSV_HEADER: &str =
    "id,name,approach_date,miss_distance_km,relative_velocity_km_s,hazard";

/// Wrap in double quotes, doubling any embedded quote.
pub fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn asteroid_row(a: &Asteroid) -> String {
    let miss_km = a
        .miss_distance_km()
        .map(|km| format!("{}", km.round() as i64))
        .unwrap_or_default();
    [
        a.id.clone(),
        quote_csv(&a.name),
        a.approach_date().unwrap_or_default().to_string(),
        miss_km,
        a.relative_velocity_raw().unwrap_or_default(),
        a.hazard_label().to_string(),
    ]
    .join(",")
}

/// Header plus one row per asteroid, `\n`-separated. `None` for an empty table.
pub fn asteroids_csv(records: &[&Asteroid]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(ASTEROID_CSV_HEADER.to_string());
    lines.extend(records.iter().map(|a| asteroid_row(a)));
    Some(lines.join("\n"))
}

/// `asteroids_2025-02-01.csv`
pub fn asteroids_csv_file_name(date: NaiveDate) -> String {
    format!("asteroids_{}.csv", date.format("%Y-%m-%d"))
}

fn transcript_line(turn: &Turn) -> String {
    let local: DateTime<Local> = turn.timestamp.with_timezone(&Local);
    format!(
        "[{}] {}: {}",
        local.format("%Y-%m-%d %H:%M:%S"),
        turn.sender.label(),
        turn.text
    )
}

/// One `[timestamp] SENDER: text` entry per turn, separated by blank lines.
pub fn transcript_text(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(transcript_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `astrobot_chat_<unix millis>.txt`
pub fn transcript_file_name(now: DateTime<Utc>) -> String {
    format!("astrobot_chat_{}.txt", now.timestamp_millis())
}
