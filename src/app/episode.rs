use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::api::models::EpisodeRecord;

pub(crate) const DEFAULT_MAX_UPCOMING: usize = 5;
pub(crate) const DEFAULT_MAX_PAST: usize = 5;
pub(crate) const NONE_LABEL: &str = "(none)";
pub(crate) const UNKNOWN_TIME_LABEL: &str = "(unknown)";

const LOCAL_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// An episode whose air time resolved to a concrete instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedEpisode<'a> {
    pub(crate) episode: &'a EpisodeRecord,
    pub(crate) at: DateTime<Utc>,
}

/// Upcoming (soonest first) and past (most recent first), untruncated.
#[derive(Debug, Default)]
pub(crate) struct Partition<'a> {
    pub(crate) upcoming: Vec<ResolvedEpisode<'a>>,
    pub(crate) past: Vec<ResolvedEpisode<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AirTime {
    pub(crate) at: DateTime<Utc>,
    pub(crate) label: String,
    pub(crate) episode: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AirTimes {
    pub(crate) upcoming: Vec<AirTime>,
    pub(crate) past: Vec<AirTime>,
    pub(crate) next_air: Option<String>,
    pub(crate) last_air: Option<String>,
}

impl AirTimes {
    pub(crate) fn next_label(&self) -> &str {
        self.next_air.as_deref().unwrap_or(NONE_LABEL)
    }

    pub(crate) fn last_label(&self) -> &str {
        self.last_air.as_deref().unwrap_or(NONE_LABEL)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_local_date_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let joined = format!("{date}T{time}");
    let naive = LOCAL_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&joined, format).ok())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

// Date-only values are read as UTC midnight.
fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Instant from `airstamp`, else `airdate`+`airtime` (local), else
/// `airdate` alone. The first candidate that parses wins.
pub(crate) fn resolve_air_instant(episode: &EpisodeRecord) -> Option<DateTime<Utc>> {
    if let Some(at) = present(&episode.airstamp).and_then(parse_instant) {
        return Some(at);
    }

    if let (Some(date), Some(time)) = (present(&episode.airdate), present(&episode.airtime))
        && let Some(at) = parse_local_date_time(date, time)
    {
        return Some(at);
    }

    present(&episode.airdate).and_then(parse_date)
}

pub(crate) fn format_instant(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M %:z")
        .to_string()
}

pub(crate) fn format_episode_time(episode: &EpisodeRecord) -> String {
    if let Some(at) = present(&episode.airstamp).and_then(parse_instant) {
        return format_instant(at);
    }

    match (present(&episode.airdate), present(&episode.airtime)) {
        (Some(date), Some(time)) => format!("{date} {time}"),
        (Some(date), None) => date.to_string(),
        _ => UNKNOWN_TIME_LABEL.to_string(),
    }
}

pub(crate) fn episode_code(episode: &EpisodeRecord) -> String {
    let code = match (episode.season, episode.number) {
        (Some(season), Some(number)) => format!("S{season:02}E{number:02}"),
        (Some(season), None) => format!("S{season:02} special"),
        _ => "special".to_string(),
    };
    match present(&episode.name) {
        Some(name) => format!("{code} {name}"),
        None => code,
    }
}

pub(crate) fn partition_episodes(episodes: &[EpisodeRecord], now: DateTime<Utc>) -> Partition<'_> {
    let mut partition = Partition::default();
    for episode in episodes {
        let Some(at) = resolve_air_instant(episode) else {
            continue;
        };
        let resolved = ResolvedEpisode { episode, at };
        if at >= now {
            partition.upcoming.push(resolved);
        } else {
            partition.past.push(resolved);
        }
    }

    partition.upcoming.sort_by_key(|resolved| resolved.at);
    partition
        .past
        .sort_by(|left, right| right.at.cmp(&left.at));
    partition
}

fn air_time(resolved: &ResolvedEpisode<'_>) -> AirTime {
    AirTime {
        at: resolved.at,
        label: format_episode_time(resolved.episode),
        episode: episode_code(resolved.episode),
    }
}

pub(crate) fn extract_air_times(
    episodes: &[EpisodeRecord],
    max_upcoming: usize,
    max_past: usize,
    now: DateTime<Utc>,
) -> AirTimes {
    let partition = partition_episodes(episodes, now);

    AirTimes {
        next_air: partition.upcoming.first().map(|resolved| format_instant(resolved.at)),
        last_air: partition.past.first().map(|resolved| format_instant(resolved.at)),
        upcoming: partition
            .upcoming
            .iter()
            .take(max_upcoming)
            .map(air_time)
            .collect(),
        past: partition.past.iter().take(max_past).map(air_time).collect(),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}
