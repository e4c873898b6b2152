use serde::{Deserialize, Serialize};
use url::Url;

pub const UNKNOWN: &str = "Unknown";

/// Column order of the raw dataset written by `collect`.
pub const RAW_COLUMNS: [&str; 17] = [
    "Rank",
    "Title",
    "Score",
    "Rating_Users",
    "Type",
    "Episodes",
    "Duration",
    "Source",
    "Aired",
    "Season",
    "Genres",
    "Watching",
    "Completed",
    "On_Hold",
    "Dropped",
    "Plan_to_Watch",
    "Season_Number",
];

/// Column order of the cleaned dataset written by `clean`.
pub const CLEANED_COLUMNS: [&str; 19] = [
    "Rank",
    "Title",
    "Score",
    "Rating_Users",
    "Type",
    "Episodes",
    "Duration",
    "Source",
    "Aired",
    "Season",
    "Genres",
    "Watching",
    "Completed",
    "On_Hold",
    "Dropped",
    "Plan_to_Watch",
    "Season_Number",
    "Total_Watchers",
    "Completion_Rate",
];

/// Summary fields read from one row of a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub rank: u32,
    pub title: String,
    pub link: Url,
    pub score: f64,
    pub rating_users: u64,
}

/// Extended fields read from a title's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub kind: String,
    pub episodes: String,
    pub duration: String,
    pub source: String,
    pub aired: String,
    pub season: String,
    pub genres: String,
    pub status: StatusCounts,
    pub season_number: u32,
}

impl Default for DetailFields {
    fn default() -> Self {
        Self {
            kind: UNKNOWN.to_owned(),
            episodes: UNKNOWN.to_owned(),
            duration: UNKNOWN.to_owned(),
            source: UNKNOWN.to_owned(),
            aired: UNKNOWN.to_owned(),
            season: UNKNOWN.to_owned(),
            genres: UNKNOWN.to_owned(),
            status: StatusCounts::default(),
            season_number: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub watching: u64,
    pub completed: u64,
    pub on_hold: u64,
    pub dropped: u64,
    pub plan_to_watch: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.watching
            .saturating_add(self.completed)
            .saturating_add(self.on_hold)
            .saturating_add(self.dropped)
            .saturating_add(self.plan_to_watch)
    }
}

/// One collected title, exactly as written to the raw CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Rank")]
    pub rank: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Rating_Users")]
    pub rating_users: u64,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Episodes")]
    pub episodes: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Aired")]
    pub aired: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Genres")]
    pub genres: String,
    #[serde(rename = "Watching")]
    pub watching: u64,
    #[serde(rename = "Completed")]
    pub completed: u64,
    #[serde(rename = "On_Hold")]
    pub on_hold: u64,
    #[serde(rename = "Dropped")]
    pub dropped: u64,
    #[serde(rename = "Plan_to_Watch")]
    pub plan_to_watch: u64,
    #[serde(rename = "Season_Number")]
    pub season_number: u32,
}

impl RawRecord {
    pub fn new(entry: ListingEntry, details: DetailFields) -> Self {
        Self {
            rank: entry.rank,
            title: entry.title,
            score: entry.score,
            rating_users: entry.rating_users,
            kind: details.kind,
            episodes: details.episodes,
            duration: details.duration,
            source: details.source,
            aired: details.aired,
            season: details.season,
            genres: details.genres,
            watching: details.status.watching,
            completed: details.status.completed,
            on_hold: details.status.on_hold,
            dropped: details.status.dropped,
            plan_to_watch: details.status.plan_to_watch,
            season_number: details.season_number,
        }
    }
}

/// A raw CSV row read leniently: every cell is optional text so that hand-edited
/// or truncated files still load. Missing columns deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(rename = "Rank")]
    pub rank: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Score")]
    pub score: Option<String>,
    #[serde(rename = "Rating_Users")]
    pub rating_users: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Episodes")]
    pub episodes: Option<String>,
    #[serde(rename = "Duration")]
    pub duration: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    #[serde(rename = "Aired")]
    pub aired: Option<String>,
    #[serde(rename = "Season")]
    pub season: Option<String>,
    #[serde(rename = "Genres")]
    pub genres: Option<String>,
    #[serde(rename = "Watching")]
    pub watching: Option<String>,
    #[serde(rename = "Completed")]
    pub completed: Option<String>,
    #[serde(rename = "On_Hold")]
    pub on_hold: Option<String>,
    #[serde(rename = "Dropped")]
    pub dropped: Option<String>,
    #[serde(rename = "Plan_to_Watch")]
    pub plan_to_watch: Option<String>,
    #[serde(rename = "Season_Number")]
    pub season_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    #[serde(rename = "Rank")]
    pub rank: Option<u32>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Score")]
    pub score: Option<f64>,
    #[serde(rename = "Rating_Users")]
    pub rating_users: Option<u64>,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Episodes")]
    pub episodes: Option<u32>,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Aired")]
    pub aired: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Genres")]
    pub genres: String,
    #[serde(rename = "Watching")]
    pub watching: u64,
    #[serde(rename = "Completed")]
    pub completed: u64,
    #[serde(rename = "On_Hold")]
    pub on_hold: u64,
    #[serde(rename = "Dropped")]
    pub dropped: u64,
    #[serde(rename = "Plan_to_Watch")]
    pub plan_to_watch: u64,
    #[serde(rename = "Season_Number")]
    pub season_number: Option<u32>,
    #[serde(rename = "Total_Watchers")]
    pub total_watchers: u64,
    #[serde(rename = "Completion_Rate")]
    pub completion_rate: f64,
}

impl CleanedRecord {
    pub fn status(&self) -> StatusCounts {
        StatusCounts {
            watching: self.watching,
            completed: self.completed,
            on_hold: self.on_hold,
            dropped: self.dropped,
            plan_to_watch: self.plan_to_watch,
        }
    }
}
