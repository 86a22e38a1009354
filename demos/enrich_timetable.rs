use rail_weather::filtering::{group_by_month, retain_trains_through, HELSINKI_OULU_ROVANIEMI};
use rail_weather::io::json::{read_observations, read_railway_stations, read_train_runs, read_weather_stations, write_train_runs};
use rail_weather::{MatchStrategy, RailWeather, RailWeatherError};

const RAILWAY_STATIONS: &str = r#"[
    {"stationName": "Helsinki asema", "stationShortCode": "HKI", "latitude": 60.172097, "longitude": 24.941249, "passengerTraffic": true},
    {"stationName": "Oulu asema", "stationShortCode": "OL", "latitude": 65.012089, "longitude": 25.483694, "passengerTraffic": true},
    {"stationName": "Rovaniemi", "stationShortCode": "ROI", "latitude": 66.498850, "longitude": 25.714875, "passengerTraffic": true},
    {"stationName": "Tampere asema", "stationShortCode": "TPE", "latitude": 61.498214, "longitude": 23.773362, "passengerTraffic": true}
]"#;

const WEATHER_STATIONS: &str = r#"[
    {"station_name": "Helsinki Kaisaniemi", "latitude": 60.17523, "longitude": 24.94459},
    {"station_name": "Oulu Vihreäsaari satama", "latitude": 65.00639, "longitude": 25.39321},
    {"station_name": "Rovaniemi lentoasema", "latitude": 66.56442, "longitude": 25.83035},
    {"station_name": "Tampere Härmälä", "latitude": 61.46561, "longitude": 23.74678}
]"#;

const OBSERVATIONS: &str = r#"[
    {"station_name": "Helsinki Kaisaniemi", "timestamp": "2024-01-01 04:50:00", "Air temperature": -7.1, "Wind speed": 3.2, "Snow depth": 12.0},
    {"station_name": "Helsinki Kaisaniemi", "timestamp": "2024-01-01 05:00:00", "Air temperature": -7.3, "Wind speed": 3.5, "Snow depth": 12.0},
    {"station_name": "Oulu Vihreäsaari satama", "timestamp": "2024-01-01 11:00:00", "Air temperature": -21.4, "Wind speed": 1.1, "Snow depth": null},
    {"station_name": "Rovaniemi lentoasema", "timestamp": "2024-01-01 14:00:00", "Air temperature": -26.0, "Wind speed": 0.4, "Snow depth": 48.0},
    {"station_name": "Rovaniemi lentoasema", "timestamp": "2024-02-01 14:00:00", "Air temperature": -18.5, "Wind speed": 2.0, "Snow depth": 61.0}
]"#;

const TRAINS: &str = r#"[
    {
        "trainNumber": 265, "departureDate": "2024-01-01", "trainType": "IC", "cancelled": false,
        "timeTableRows": [
            {"stationShortCode": "HKI", "type": "DEPARTURE", "scheduledTime": "2024-01-01T04:57:00.000Z", "cancelled": false},
            {"stationShortCode": "OL", "type": "ARRIVAL", "scheduledTime": "2024-01-01T11:05:00.000Z", "cancelled": false},
            {"stationShortCode": "ROI", "type": "ARRIVAL", "scheduledTime": "2024-01-01T13:50:00.000Z", "cancelled": false}
        ]
    },
    {
        "trainNumber": 45, "departureDate": "2024-01-01", "trainType": "S", "cancelled": false,
        "timeTableRows": [
            {"stationShortCode": "HKI", "type": "DEPARTURE", "scheduledTime": "2024-01-01T05:10:00.000Z", "cancelled": false},
            {"stationShortCode": "TPE", "type": "ARRIVAL", "scheduledTime": "2024-01-01T06:40:00.000Z", "cancelled": false}
        ]
    },
    {
        "trainNumber": 273, "departureDate": "2024-02-01", "trainType": "IC", "cancelled": false,
        "timeTableRows": [
            {"stationShortCode": "HKI", "type": "DEPARTURE", "scheduledTime": "2024-02-01T07:00:00.000Z", "cancelled": false},
            {"stationShortCode": "OL", "type": "ARRIVAL", "scheduledTime": "2024-02-01T13:10:00.000Z", "cancelled": false},
            {"stationShortCode": "ROI", "type": "ARRIVAL", "scheduledTime": "2024-02-01T15:55:00.000Z", "cancelled": false}
        ]
    }
]"#;

fn main() -> Result<(), RailWeatherError> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let loaded = read_observations(OBSERVATIONS.as_bytes())?;
    let client = RailWeather::builder()
        .railway_stations(read_railway_stations(RAILWAY_STATIONS.as_bytes())?)
        .weather_stations(read_weather_stations(WEATHER_STATIONS.as_bytes())?)
        .observations(loaded.observations)
        .strategy(MatchStrategy::Indexed)
        .build()?;

    for m in client.matches() {
        println!(
            "{:>4} -> {:<26} {:>6.2} km",
            m.railway_station, m.weather_station, m.distance_km
        );
    }

    let mut runs = read_train_runs(TRAINS.as_bytes())?;
    retain_trains_through(&mut runs, &HELSINKI_OULU_ROVANIEMI);

    for (month, mut month_runs) in group_by_month(runs) {
        let report = client
            .enrich()
            .runs(&mut month_runs)
            .max_time_gap(chrono::Duration::hours(3))
            .annotate_station_names(true)
            .call();
        println!("{month}: {}", report.summary());
        for diagnostic in &report.diagnostics {
            println!("  {diagnostic}");
        }
        write_train_runs(std::io::stdout().lock(), &month_runs)?;
        println!();
    }
    Ok(())
}
