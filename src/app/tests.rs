use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::api::models::{
    AvailabilityAssessment, EpisodeRecord, RegionProviders, WatchProvider,
};

use super::episode::*;
use super::plan::*;
use super::providers::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().expect("valid now")
}

fn stamped(name: &str, season: u32, number: u32, airstamp: &str) -> EpisodeRecord {
    EpisodeRecord {
        name: Some(name.to_string()),
        season: Some(season),
        number: Some(number),
        airstamp: Some(airstamp.to_string()),
        ..EpisodeRecord::default()
    }
}

fn dated(airdate: &str, airtime: Option<&str>) -> EpisodeRecord {
    EpisodeRecord {
        airdate: Some(airdate.to_string()),
        airtime: airtime.map(str::to_string),
        ..EpisodeRecord::default()
    }
}

fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid rfc3339")
        .with_timezone(&Utc)
}

fn provider(id: u64, name: &str) -> WatchProvider {
    WatchProvider {
        provider_id: id,
        provider_name: Some(name.to_string()),
        display_priority: None,
        logo_path: None,
    }
}

fn assessment(service_id: &str) -> AvailabilityAssessment {
    serde_json::from_value(serde_json::json!({
        "title_id": "tmdb:tv:100",
        "country": "US",
        "service_id": service_id,
        "provider_category": "svod",
        "availability_now": "true",
        "confidence": "high",
        "reason_codes": [],
        "evidence": []
    }))
    .expect("assessment fixture")
}

fn inputs(country: &str, horizon_days: &str, permanent: &str) -> PlanInputs {
    PlanInputs {
        country: country.to_string(),
        horizon_days: horizon_days.to_string(),
        permanent_service_ids: permanent.to_string(),
    }
}

#[test]
fn airstamp_wins_over_date_fields() {
    let mut episode = stamped("Pilot", 1, 1, "2026-01-20T01:00:00+00:00");
    episode.airdate = Some("1999-01-01".to_string());
    episode.airtime = Some("20:00".to_string());
    assert_eq!(
        resolve_air_instant(&episode),
        Some(instant("2026-01-20T01:00:00Z"))
    );
}

#[test]
fn date_and_time_are_read_as_local_time() {
    let expected = Local
        .from_local_datetime(
            &NaiveDate::from_ymd_opt(2026, 2, 1)
                .and_then(|date| date.and_hms_opt(20, 30, 0))
                .expect("valid date"),
        )
        .earliest()
        .expect("local time exists")
        .with_timezone(&Utc);
    assert_eq!(
        resolve_air_instant(&dated("2026-02-01", Some("20:30"))),
        Some(expected)
    );
}

#[test]
fn date_only_is_utc_midnight() {
    assert_eq!(
        resolve_air_instant(&dated("2026-02-01", None)),
        Some(instant("2026-02-01T00:00:00Z"))
    );
    assert_eq!(
        resolve_air_instant(&dated("2026-02-01", Some("  "))),
        Some(instant("2026-02-01T00:00:00Z"))
    );
}

#[test]
fn unparseable_times_resolve_to_nothing() {
    assert_eq!(resolve_air_instant(&EpisodeRecord::default()), None);
    assert_eq!(resolve_air_instant(&dated("soon", None)), None);

    let mut garbage_stamp = dated("2026-03-01", None);
    garbage_stamp.airstamp = Some("not a time".to_string());
    assert_eq!(
        resolve_air_instant(&garbage_stamp),
        Some(instant("2026-03-01T00:00:00Z"))
    );
}

#[test]
fn timeline_splits_at_now_and_orders_each_side() {
    let episodes = vec![
        stamped("Past Two", 1, 2, "2026-01-08T12:00:00Z"),
        stamped("Future Two", 1, 4, "2026-01-29T12:00:00Z"),
        stamped("Past One", 1, 1, "2026-01-01T12:00:00Z"),
        stamped("Future One", 1, 3, "2026-01-22T12:00:00Z"),
        dated("TBA", None),
    ];

    let times = extract_air_times(&episodes, 5, 5, now());

    let upcoming: Vec<&str> = times.upcoming.iter().map(|item| item.episode.as_str()).collect();
    let past: Vec<&str> = times.past.iter().map(|item| item.episode.as_str()).collect();
    assert_eq!(upcoming, vec!["S01E03 Future One", "S01E04 Future Two"]);
    assert_eq!(past, vec!["S01E02 Past Two", "S01E01 Past One"]);
    assert_eq!(
        times.next_air.as_deref(),
        Some(format_instant(instant("2026-01-22T12:00:00Z")).as_str())
    );
    assert_eq!(
        times.last_air.as_deref(),
        Some(format_instant(instant("2026-01-08T12:00:00Z")).as_str())
    );
}

#[test]
fn episode_airing_exactly_now_is_upcoming() {
    let episodes = vec![stamped("Live", 2, 1, "2026-01-15T12:00:00Z")];
    let times = extract_air_times(&episodes, 5, 5, now());
    assert_eq!(times.upcoming.len(), 1);
    assert!(times.past.is_empty());
    assert_eq!(times.last_label(), NONE_LABEL);
}

#[test]
fn limits_truncate_lists_but_not_next_and_last() {
    let episodes: Vec<EpisodeRecord> = (1..=8)
        .map(|day| {
            stamped(
                &format!("Ep {day}"),
                1,
                day,
                &format!("2026-01-{:02}T00:00:00Z", day + 15),
            )
        })
        .chain((1..=3).map(|day| {
            stamped(
                &format!("Old {day}"),
                1,
                day + 20,
                &format!("2026-01-{:02}T00:00:00Z", day),
            )
        }))
        .collect();

    let times = extract_air_times(&episodes, 2, 0, now());

    assert_eq!(times.upcoming.len(), 2);
    assert!(times.past.is_empty());
    assert_eq!(
        times.last_air.as_deref(),
        Some(format_instant(instant("2026-01-03T00:00:00Z")).as_str())
    );
}

#[test]
fn empty_episode_list_yields_none_labels() {
    let times = extract_air_times(&[], DEFAULT_MAX_UPCOMING, DEFAULT_MAX_PAST, now());
    assert_eq!(times, AirTimes::default());
    assert_eq!(times.next_label(), "(none)");
    assert_eq!(times.last_label(), "(none)");
}

#[test]
fn display_time_falls_back_through_raw_fields() {
    assert_eq!(
        format_episode_time(&dated("2026-02-01", Some("20:30"))),
        "2026-02-01 20:30"
    );
    assert_eq!(format_episode_time(&dated("2026-02-01", None)), "2026-02-01");
    assert_eq!(format_episode_time(&EpisodeRecord::default()), UNKNOWN_TIME_LABEL);
    assert_eq!(
        format_episode_time(&stamped("x", 1, 1, "2026-02-01T00:00:00Z")),
        format_instant(instant("2026-02-01T00:00:00Z"))
    );
}

#[test]
fn episode_codes_handle_specials() {
    assert_eq!(episode_code(&stamped("Pilot", 1, 3, "x")), "S01E03 Pilot");
    let special = EpisodeRecord {
        season: Some(2),
        name: Some("Holiday".to_string()),
        ..EpisodeRecord::default()
    };
    assert_eq!(episode_code(&special), "S02 special Holiday");
    assert_eq!(episode_code(&EpisodeRecord::default()), "special");
}

#[test]
fn truncate_marks_cut_text() {
    assert_eq!(truncate("Short", 10), "Short");
    assert_eq!(truncate("A very long show title", 10), "A very ...");
}

#[test]
fn providers_keep_first_bucket_for_each_id() {
    let region = RegionProviders {
        flatrate: Some(vec![provider(8, "Netflix")]),
        free: Some(vec![provider(73, "Tubi")]),
        ads: Some(vec![provider(73, "Tubi"), provider(300, "Pluto TV")]),
        rent: Some(vec![provider(2, "Apple TV")]),
        buy: Some(vec![provider(2, "Apple TV"), provider(8, "Netflix")]),
        ..RegionProviders::default()
    };

    let listed = flatten_providers(&region);

    let summary: Vec<(ProviderBucket, u64)> = listed
        .iter()
        .map(|item| (item.bucket, item.provider.provider_id))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ProviderBucket::Flatrate, 8),
            (ProviderBucket::Free, 73),
            (ProviderBucket::Ads, 300),
            (ProviderBucket::Rent, 2),
        ]
    );
}

#[test]
fn providers_missing_buckets_are_empty() {
    assert!(flatten_providers(&RegionProviders::default()).is_empty());
    let only_buy = RegionProviders {
        buy: Some(vec![provider(10, "Amazon Video")]),
        ..RegionProviders::default()
    };
    let listed = flatten_providers(&only_buy);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].bucket.label(), "buy");
}

#[test]
fn dedupe_is_stable_and_idempotent() {
    let items = vec![3, 1, 3, 2, 1, 4];
    let once = dedupe_first_wins(items, |value| *value);
    assert_eq!(once, vec![3, 1, 2, 4]);
    let twice = dedupe_first_wins(once.clone(), |value| *value);
    assert_eq!(twice, once);
}

#[test]
fn dedupe_keeps_first_occurrence_payload() {
    let items = vec![(1, "first"), (2, "other"), (1, "second")];
    let kept = dedupe_first_wins(items, |(key, _)| *key);
    assert_eq!(kept, vec![(1, "first"), (2, "other")]);
}

#[test]
fn plan_request_defaults() {
    let request = build_plan_request(&inputs("", "", ""), &[]);
    assert_eq!(request.country, "US");
    assert_eq!(request.horizon_days, DEFAULT_HORIZON_DAYS);
    assert!(request.permanent_service_ids.is_empty());
    assert!(request.assessments.is_empty());
}

#[test]
fn plan_request_normalizes_free_text() {
    let assessments = vec![assessment("svc1"), assessment("svc2")];
    let request = build_plan_request(&inputs(" ca ", " 45 ", " youtube_tv , ,hulu,"), &assessments);
    assert_eq!(request.country, "CA");
    assert_eq!(request.horizon_days, 45);
    assert_eq!(
        request.permanent_service_ids,
        vec!["youtube_tv".to_string(), "hulu".to_string()]
    );
    assert_eq!(request.assessments, assessments);
}

#[test]
fn plan_request_serializes_expected_shape() {
    let request = build_plan_request(&inputs("US", "45", "svc9"), &[assessment("svc1")]);
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["country"], "US");
    assert_eq!(value["horizon_days"], 45);
    assert_eq!(value["permanent_service_ids"], serde_json::json!(["svc9"]));
    assert_eq!(value["assessments"][0]["service_id"], "svc1");
    assert!(value["assessments"][0].get("planning_hints").is_none());
}

#[test]
fn horizon_uses_leading_integer() {
    assert_eq!(parse_horizon_days("45"), 45);
    assert_eq!(parse_horizon_days("  60 days"), 60);
    assert_eq!(parse_horizon_days("12.9"), 12);
    assert_eq!(parse_horizon_days("+7"), 7);
    assert_eq!(parse_horizon_days("-5"), -5);
    assert_eq!(parse_horizon_days("0"), 0);
}

#[test]
fn horizon_without_digits_falls_back() {
    assert_eq!(parse_horizon_days(""), 30);
    assert_eq!(parse_horizon_days("   "), 30);
    assert_eq!(parse_horizon_days("abc"), 30);
    assert_eq!(parse_horizon_days("-"), 30);
    assert_eq!(parse_horizon_days("days 30"), 30);
    assert_eq!(parse_horizon_days("99999999999999999999999"), 30);
}

#[test]
fn service_ids_drop_blanks() {
    assert!(parse_service_ids("").is_empty());
    assert!(parse_service_ids(" , ,").is_empty());
    assert_eq!(parse_service_ids("a,b"), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn effective_country_keeps_case() {
    assert_eq!(effective_country("  gb "), "gb");
    assert_eq!(effective_country("   "), DEFAULT_COUNTRY);
}
