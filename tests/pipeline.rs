use chrono::NaiveDate;
use rail_weather::io::frame::observations_from_csv;
use rail_weather::io::json::{read_train_runs, read_train_runs_from_path, write_train_runs_to_path};
use rail_weather::{
    match_stations, IssueKind, LatLon, MatchTableCache, ObservationIndex, RailWeather,
    RailwayStation, StopIssue, WeatherJoiner, WeatherStation,
};
use serde_json::Value;
use std::fs;

const TRAINS: &str = r#"[
    {
        "trainNumber": 1, "departureDate": "2024-01-01", "trainType": "IC",
        "timeTableRows": [
            {"stationShortCode": "R1", "type": "DEPARTURE", "scheduledTime": "2024-01-01T10:29:00.000Z", "commercialTrack": "3"},
            {"stationShortCode": "R1", "type": "ARRIVAL", "scheduledTime": "2024-01-01T10:31:00.000Z"},
            {"stationShortCode": "R1", "type": "DEPARTURE", "scheduledTime": "2024-01-01T10:30:00.000Z"},
            {"stationShortCode": "R1", "type": "ARRIVAL", "scheduledTime": "2024-01-01T23:59:00.000Z"}
        ]
    },
    {
        "trainNumber": 2, "departureDate": "2024-01-01",
        "timeTableRows": [
            {"stationShortCode": "R2", "type": "DEPARTURE", "scheduledTime": "2024-01-01T10:00:00.000Z"},
            {"stationShortCode": "XX", "type": "ARRIVAL", "scheduledTime": "2024-01-01T11:00:00.000Z"}
        ]
    }
]"#;

fn registries() -> (Vec<RailwayStation>, Vec<WeatherStation>) {
    (
        vec![
            RailwayStation::new("R1", "Railway one", LatLon(60.1, 24.1)),
            RailwayStation::new("R2", "Railway two", LatLon(61.05, 25.05)),
        ],
        vec![
            WeatherStation::new("W1", LatLon(60.0, 24.0)),
            WeatherStation::new("W2", LatLon(61.0, 25.0)),
        ],
    )
}

fn write_observation_csv(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("observations.csv");
    fs::write(
        &path,
        "station_name,timestamp,Air temperature,Wind speed\n\
         W1,2024-01-01 12:00:00,-3.0,4.5\n\
         W1,2024-01-01 10:00:00,-1.0,5.0\n\
         W1,2024-01-01 11:00:00,-2.0,\n",
    )
    .unwrap();
    path
}

#[test]
fn test_small_registry_matches_nearest() {
    let (railway, weather) = registries();
    let table = match_stations(&railway, &weather).unwrap();
    assert_eq!(table.len(), 2);
    let r1 = table.get("R1").unwrap();
    assert_eq!(r1.weather_station, "W1");
    assert!((r1.distance_km - LatLon(60.1, 24.1).distance_km(LatLon(60.0, 24.0))).abs() < 1e-6);
    assert!((r1.distance_km - 12.43).abs() < 0.01);
    assert_eq!(table.get("R2").unwrap().weather_station, "W2");
}

#[test]
fn test_end_to_end_join() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = observations_from_csv(&write_observation_csv(dir.path())).unwrap();
    assert_eq!(loaded.skipped_rows, 0);

    let (railway, weather) = registries();
    let table = match_stations(&railway, &weather).unwrap();
    let index = ObservationIndex::build(loaded.observations);
    let joiner = WeatherJoiner::builder()
        .matches(&table)
        .observations(&index)
        .build();

    let mut runs = read_train_runs(TRAINS.as_bytes()).unwrap();
    let report = joiner.join(&mut runs);

    let temps: Vec<Option<f64>> = runs[0]
        .stops
        .iter()
        .map(|s| s.weather_observations.value("Air temperature"))
        .collect();
    // 10:29 -> 10:00, 10:31 -> 11:00, 10:30 -> 10:00, 23:59 -> 12:00
    assert_eq!(temps, vec![Some(-1.0), Some(-2.0), Some(-1.0), Some(-3.0)]);
    assert_eq!(runs[0].stops[1].weather_observations.value("Wind speed"), None);

    assert_eq!(report.total_stops, 6);
    assert_eq!(report.enriched_stops, 4);
    assert_eq!(report.count(IssueKind::NoObservations), 1);
    assert_eq!(report.count(IssueKind::UnmatchedStation), 1);
    assert_eq!(
        report.diagnostics[1].issue,
        StopIssue::UnmatchedStation {
            station: "XX".to_string()
        }
    );
    assert_eq!(report.diagnostics[1].departure_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(
        report.summary(),
        "2 of 6 stops had no weather match (no station match: 1, no weather data for station: 1)"
    );

    let out = dir.path().join("enriched.json");
    write_train_runs_to_path(&out, &runs).unwrap();
    let json: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let first = &json[0]["timeTableRows"][0];
    assert_eq!(first["commercialTrack"], Value::from("3"));
    assert_eq!(first["weather_observations"]["station_name"], Value::from("W1"));
    assert_eq!(first["weather_observations"]["Air temperature"], Value::from(-1.0));
    assert_eq!(json[1]["timeTableRows"][0]["weather_observations"], serde_json::json!({}));

    let back = read_train_runs_from_path(&out).unwrap();
    assert_eq!(back, runs);
}

#[test]
fn test_facade_with_cache_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = observations_from_csv(&write_observation_csv(dir.path())).unwrap();
    let (railway, weather) = registries();
    let cache = MatchTableCache::new(&dir.path().join("cache")).unwrap();

    let client = RailWeather::builder()
        .railway_stations(railway.clone())
        .weather_stations(weather.clone())
        .observations(loaded.observations)
        .cache(cache.clone())
        .build()
        .unwrap();
    assert_eq!(cache.load(&railway, &weather).unwrap().as_ref(), Some(client.matches()));

    let mut runs = read_train_runs(TRAINS.as_bytes()).unwrap();
    let first = client.enrich().runs(&mut runs).call();
    let once = runs.clone();
    let second = client.enrich().runs(&mut runs).call();
    assert_eq!(runs, once);
    assert_eq!(first, second);

    let numbers: Vec<u32> = runs.iter().map(|r| r.train_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    let times: Vec<&str> = runs[0].stops.iter().map(|s| s.scheduled_time.as_str()).collect();
    assert_eq!(
        times,
        vec![
            "2024-01-01T10:29:00.000Z",
            "2024-01-01T10:31:00.000Z",
            "2024-01-01T10:30:00.000Z",
            "2024-01-01T23:59:00.000Z"
        ]
    );
}

#[test]
fn test_incomplete_timetable_row_does_not_lose_the_feed() {
    let feed = r#"[
        {
            "trainNumber": 1, "departureDate": "2024-01-01",
            "timeTableRows": [
                {"stationShortCode": "R1", "type": "DEPARTURE", "scheduledTime": "2024-01-01T10:29:00.000Z"},
                {"stationShortCode": "R1", "type": "ARRIVAL"}
            ]
        },
        {
            "trainNumber": 2, "departureDate": "2024-01-01",
            "timeTableRows": [
                {"type": "ARRIVAL", "scheduledTime": "2024-01-01T11:00:00.000Z"},
                {"stationShortCode": "R1", "type": "ARRIVAL", "scheduledTime": "2024-01-01T11:40:00.000Z"}
            ]
        }
    ]"#;
    let mut runs = read_train_runs(feed.as_bytes()).unwrap();
    assert_eq!(runs.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let loaded = observations_from_csv(&write_observation_csv(dir.path())).unwrap();
    let (railway, weather) = registries();
    let client = RailWeather::builder()
        .railway_stations(railway)
        .weather_stations(weather)
        .observations(loaded.observations)
        .build()
        .unwrap();

    let report = client.enrich().runs(&mut runs).call();
    assert_eq!(report.total_stops, 4);
    assert_eq!(report.enriched_stops, 2);
    assert_eq!(report.count(IssueKind::Format), 1);
    assert_eq!(report.count(IssueKind::UnmatchedStation), 1);
    assert_eq!(runs[0].stops[0].weather_observations.value("Air temperature"), Some(-1.0));
    assert!(runs[0].stops[1].weather_observations.is_empty());
    assert_eq!(runs[1].stops[1].weather_observations.value("Air temperature"), Some(-3.0));
}
