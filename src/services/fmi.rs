//! FMI open-data client and WFS response parser.
//!
//! Fetches gridded-model forecasts (HARMONIE short range, ECMWF long
//! range) and ground-station observations from the Finnish
//! Meteorological Institute WFS endpoint.
//! See: https://en.ilmatieteenlaitos.fi/open-data-manual
//!
//! Responses are feature-collection XML where each `wfs:member` carries
//! one (timestamp, parameter name, parameter value, location) tuple;
//! the parser regroups those flat tuples into one record per timestamp.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

use crate::config::WeatherOptions;
use crate::dates::next_hour_dates;
use crate::errors::WeatherError;
use crate::models::Coordinate;

const FMI_API_URL: &str = "http://opendata.fmi.fi/wfs";

/// All requests use hourly timesteps; the precipitation summing in the
/// aggregators assumes this.
const TIMESTEP_MINUTES: u32 = 60;

/// The HARMONIE endpoint serves up to a 50 h forecast from request time.
const HARMONIE_FORECAST_HOURS: i64 = 50;

/// Half-width of the bounding box used to pick an observation station.
const OBSERVATION_BBOX_RADIUS_KM: f64 = 5.0;

/// One kilometre expressed in degrees of latitude.
const KM_PER_DEGREE_LAT: f64 = 110.574;
/// One kilometre expressed in degrees of longitude at the equator.
const KM_PER_DEGREE_LON: f64 = 111.320;

/// Short-range high-resolution model forecast data point.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonieForecastPoint {
    pub time: DateTime<Utc>,
    pub location: Coordinate,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed_ms: f64,
    pub wind_gust_ms: f64,
    pub wind_direction: f64,
    pub pressure: f64,
    pub visibility: f64,
    pub precipitation_amount: f64,
    pub precipitation_1h: f64,
    pub dew_point: f64,
    /// FMI `WeatherSymbol3` code; 0 when the reading was not a valid code.
    pub weather_symbol: u8,
}

/// Longer-range coarse model forecast data point. This model returns a
/// reduced parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct EcmwfForecastPoint {
    pub time: DateTime<Utc>,
    pub location: Coordinate,
    pub temperature: f64,
    pub wind_speed_ms: f64,
    pub pressure: f64,
    pub precipitation_1h: f64,
}

/// Ground-station observation data point. Carries no weather symbol;
/// the aggregators borrow one from Open-Meteo's hourly forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationPoint {
    pub time: DateTime<Utc>,
    pub location: Coordinate,
    pub temperature: f64,
    pub wind_speed_ms: f64,
    pub wind_direction: f64,
    pub precipitation_1h: f64,
}

/// One timestamp's worth of parameter readings, as parsed from the
/// feature collection before typed conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FmiRawRecord {
    pub time: DateTime<Utc>,
    pub location: Coordinate,
    pub values: HashMap<String, f64>,
}

impl FmiRawRecord {
    /// Parameter reading by name; missing parameters read as NaN so they
    /// poison precipitation sums instead of disappearing silently.
    fn value(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(f64::NAN)
    }
}

/// Client for the FMI open-data WFS endpoint.
#[derive(Debug, Clone)]
pub struct FmiClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for FmiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FmiClient {
    pub fn new() -> Self {
        Self::with_base_url(FMI_API_URL)
    }

    /// Client against a non-default endpoint (tests point this at a mock
    /// server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch the short-range HARMONIE forecast: hourly data points from
    /// `now` up to 50 hours ahead.
    pub async fn fetch_harmonie_forecast(
        &self,
        opts: &WeatherOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<HarmonieForecastPoint>, WeatherError> {
        let start = now;
        let end = now + Duration::hours(HARMONIE_FORECAST_HOURS);
        let params = [
            ("service", "WFS".to_string()),
            ("version", "2.0.0".to_string()),
            ("request", "getFeature".to_string()),
            (
                "storedquery_id",
                "fmi::forecast::harmonie::surface::point::simple".to_string(),
            ),
            ("starttime", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("endtime", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            (
                "latlon",
                format!("{},{}", opts.location.lat, opts.location.lon),
            ),
            ("timestep", TIMESTEP_MINUTES.to_string()),
            (
                "parameters",
                [
                    "Temperature",
                    "Humidity",
                    "WindSpeedMS",
                    "WindGust",
                    "WindDirection",
                    "Pressure",
                    "Visibility",
                    "PrecipitationAmount",
                    "Precipitation1h",
                    "DewPoint",
                    "WeatherSymbol3",
                ]
                .join(","),
            ),
            ("crs", "EPSG::3857".to_string()),
        ];

        let xml = self.get_feature(&params).await?;
        let records = parse_feature_collection(&xml)?;
        Ok(records.into_iter().map(to_harmonie_point).collect())
    }

    /// Fetch the longer-range ECMWF forecast: hourly data points for the
    /// six days following the active day.
    pub async fn fetch_ecmwf_forecast(
        &self,
        opts: &WeatherOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<EcmwfForecastPoint>, WeatherError> {
        let dates = next_hour_dates(opts.switch_day_at_hour, opts.timezone, now);
        let start = dates.start_of_local_day + Duration::days(1);
        let end = start + Duration::days(6);
        let params = [
            ("service", "WFS".to_string()),
            ("version", "2.0.0".to_string()),
            ("request", "getFeature".to_string()),
            (
                "storedquery_id",
                "ecmwf::forecast::surface::point::simple".to_string(),
            ),
            ("starttime", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("endtime", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            (
                "latlon",
                format!("{},{}", opts.location.lat, opts.location.lon),
            ),
            ("timestep", TIMESTEP_MINUTES.to_string()),
            (
                "parameters",
                ["Temperature", "WindSpeedMS", "Pressure", "Precipitation1h"].join(","),
            ),
            ("crs", "EPSG::3857".to_string()),
        ];

        let xml = self.get_feature(&params).await?;
        let records = parse_feature_collection(&xml)?;
        Ok(records.into_iter().map(to_ecmwf_point).collect())
    }

    /// Fetch hourly ground-station observations from the station nearest
    /// to the coordinate (bounding-box query, one location).
    pub async fn fetch_observations(
        &self,
        opts: &WeatherOptions,
    ) -> Result<Vec<ObservationPoint>, WeatherError> {
        let params = [
            ("service", "WFS".to_string()),
            ("version", "2.0.0".to_string()),
            ("request", "getFeature".to_string()),
            (
                "storedquery_id",
                "fmi::observations::weather::hourly::simple".to_string(),
            ),
            ("bbox", observation_bbox(opts.location)),
            ("maxlocations", "1".to_string()),
            ("timestep", TIMESTEP_MINUTES.to_string()),
            (
                "parameters",
                [
                    "TA_PT1H_AVG",  // Air temperature
                    "WS_PT1H_AVG",  // Wind speed
                    "WD_PT1H_AVG",  // Wind direction
                    "PRA_PT1H_ACC", // Precipitation amount
                ]
                .join(","),
            ),
        ];

        let xml = self.get_feature(&params).await?;
        let records = parse_feature_collection(&xml)?;
        Ok(records.into_iter().map(to_observation_point).collect())
    }

    async fn get_feature(&self, params: &[(&str, String)]) -> Result<String, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                WeatherError::ExternalServiceError(format!("FMI request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(WeatherError::ExternalServiceError(format!(
                "FMI returned HTTP {}",
                response.status()
            )));
        }

        response.text().await.map_err(|e| {
            WeatherError::ExternalServiceError(format!("FMI response read failed: {}", e))
        })
    }
}

/// `left,bottom,right,top` box of ±5 km around the coordinate, degrees
/// with 4 decimals.
fn observation_bbox(location: Coordinate) -> String {
    let lat_delta = OBSERVATION_BBOX_RADIUS_KM / KM_PER_DEGREE_LAT;
    let lon_delta =
        OBSERVATION_BBOX_RADIUS_KM / (KM_PER_DEGREE_LON * location.lat.to_radians().cos());
    format!(
        "{:.4},{:.4},{:.4},{:.4}",
        location.lon - lon_delta,
        location.lat - lat_delta,
        location.lon + lon_delta,
        location.lat + lat_delta,
    )
}

/// One member's flat (location, time, name, value) tuple.
struct MemberTuple {
    location: Coordinate,
    time: DateTime<Utc>,
    name: String,
    value: f64,
}

/// Parse an FMI feature-collection XML payload into one record per
/// timestamp.
///
/// Tuples sharing an exact timestamp merge into a single record keyed by
/// parameter name; records come out in first-appearance order of each
/// timestamp and are otherwise unsorted. Non-numeric parameter values
/// become NaN, never dropped.
pub fn parse_feature_collection(xml: &str) -> Result<Vec<FmiRawRecord>, WeatherError> {
    let tuples = parse_member_tuples(xml)?;

    let mut records: Vec<FmiRawRecord> = Vec::new();
    let mut index_by_time: HashMap<DateTime<Utc>, usize> = HashMap::new();
    for tuple in tuples {
        match index_by_time.get(&tuple.time) {
            Some(&i) => {
                records[i].values.insert(tuple.name, tuple.value);
            }
            None => {
                index_by_time.insert(tuple.time, records.len());
                let mut values = HashMap::new();
                values.insert(tuple.name, tuple.value);
                records.push(FmiRawRecord {
                    time: tuple.time,
                    location: tuple.location,
                    values,
                });
            }
        }
    }

    Ok(records)
}

fn parse_member_tuples(xml: &str) -> Result<Vec<MemberTuple>, WeatherError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut saw_collection = false;
    let mut member_count = 0usize;
    let mut tuples: Vec<MemberTuple> = Vec::new();

    // State while inside one wfs:member
    let mut in_member = false;
    let mut saw_element = false;
    let mut pos_text: Option<String> = None;
    let mut time_text: Option<String> = None;
    let mut name_text: Option<String> = None;
    let mut value_text: Option<String> = None;

    // Leaf element whose text is being captured
    let mut current_element: Option<&'static str> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = local_name_str(e.name().as_ref());
                match local.as_str() {
                    "FeatureCollection" => saw_collection = true,
                    "member" => {
                        in_member = true;
                        saw_element = false;
                        pos_text = None;
                        time_text = None;
                        name_text = None;
                        value_text = None;
                    }
                    "BsWfsElement" if in_member => saw_element = true,
                    "pos" if in_member => current_element = Some("pos"),
                    "Time" if in_member => current_element = Some("time"),
                    "ParameterName" if in_member => current_element = Some("name"),
                    "ParameterValue" if in_member => current_element = Some("value"),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(elem) = current_element {
                    let text = e.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        match elem {
                            "pos" => pos_text = Some(text),
                            "time" => time_text = Some(text),
                            "name" => name_text = Some(text),
                            "value" => value_text = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                current_element = None;
                let local = local_name_str(e.name().as_ref());
                if local == "member" {
                    if !saw_element {
                        return Err(WeatherError::MalformedResponse(
                            "BsWfs:BsWfsElement missing from wfs:member".to_string(),
                        ));
                    }
                    tuples.push(finalize_member_tuple(
                        pos_text.take(),
                        time_text.take(),
                        name_text.take(),
                        value_text.take(),
                    )?);
                    member_count += 1;
                    in_member = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(WeatherError::MalformedResponse(format!(
                    "XML parsing error: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_collection {
        return Err(WeatherError::MalformedResponse(
            "wfs:FeatureCollection missing".to_string(),
        ));
    }
    if member_count == 0 {
        return Err(WeatherError::MalformedResponse(
            "wfs:member missing from wfs:FeatureCollection".to_string(),
        ));
    }

    Ok(tuples)
}

fn finalize_member_tuple(
    pos: Option<String>,
    time: Option<String>,
    name: Option<String>,
    value: Option<String>,
) -> Result<MemberTuple, WeatherError> {
    let time = time.ok_or_else(|| {
        WeatherError::MalformedResponse("BsWfs:Time missing from member".to_string())
    })?;
    let time = DateTime::parse_from_rfc3339(&time)
        .map_err(|e| {
            WeatherError::MalformedResponse(format!("invalid BsWfs:Time '{}': {}", time, e))
        })?
        .with_timezone(&Utc);

    let name = name.ok_or_else(|| {
        WeatherError::MalformedResponse("BsWfs:ParameterName missing from member".to_string())
    })?;

    // Non-numeric readings become NaN so downstream sums degrade to
    // "unknown" instead of being silently wrong.
    let value = value
        .as_deref()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(f64::NAN);

    let location = match pos.as_deref() {
        Some(pos) => {
            let mut parts = pos.split_whitespace();
            let lat = parts.next().and_then(|p| p.parse().ok()).unwrap_or(f64::NAN);
            let lon = parts.next().and_then(|p| p.parse().ok()).unwrap_or(f64::NAN);
            Coordinate { lat, lon }
        }
        None => {
            return Err(WeatherError::MalformedResponse(
                "gml:pos missing from member".to_string(),
            ))
        }
    };

    Ok(MemberTuple {
        location,
        time,
        name,
        value,
    })
}

fn to_harmonie_point(rec: FmiRawRecord) -> HarmonieForecastPoint {
    HarmonieForecastPoint {
        time: rec.time,
        location: rec.location,
        temperature: rec.value("Temperature"),
        humidity: rec.value("Humidity"),
        wind_speed_ms: rec.value("WindSpeedMS"),
        wind_gust_ms: rec.value("WindGust"),
        wind_direction: rec.value("WindDirection"),
        pressure: rec.value("Pressure"),
        visibility: rec.value("Visibility"),
        precipitation_amount: rec.value("PrecipitationAmount"),
        precipitation_1h: rec.value("Precipitation1h"),
        dew_point: rec.value("DewPoint"),
        weather_symbol: to_symbol_code(rec.value("WeatherSymbol3")),
    }
}

fn to_ecmwf_point(rec: FmiRawRecord) -> EcmwfForecastPoint {
    EcmwfForecastPoint {
        time: rec.time,
        location: rec.location,
        temperature: rec.value("Temperature"),
        wind_speed_ms: rec.value("WindSpeedMS"),
        pressure: rec.value("Pressure"),
        precipitation_1h: rec.value("Precipitation1h"),
    }
}

/// Observations use FMI's internal parameter names; rename them into the
/// observation schema.
fn to_observation_point(rec: FmiRawRecord) -> ObservationPoint {
    ObservationPoint {
        time: rec.time,
        location: rec.location,
        temperature: rec.value("TA_PT1H_AVG"),
        wind_speed_ms: rec.value("WS_PT1H_AVG"),
        wind_direction: rec.value("WD_PT1H_AVG"),
        precipitation_1h: rec.value("PRA_PT1H_ACC"),
    }
}

/// Weather symbol readings arrive as floats; anything that is not a
/// valid code maps to 0, which no symbol table registers.
fn to_symbol_code(value: f64) -> u8 {
    if value.is_finite() && (0.0..=255.0).contains(&value) && value.fract() == 0.0 {
        value as u8
    } else {
        0
    }
}

/// Extract the local name from a potentially namespaced XML element name.
/// e.g. `wfs:member` -> `member`, `member` -> `member`
fn local_name_str(full: &[u8]) -> String {
    let s = std::str::from_utf8(full).unwrap_or("");
    if let Some(pos) = s.rfind(':') {
        return s[pos + 1..].to_string();
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn member(time: &str, name: &str, value: &str) -> String {
        format!(
            r#"<wfs:member>
    <BsWfs:BsWfsElement gml:id="BsWfsElement.1">
      <BsWfs:Location>
        <gml:Point gml:id="Point.1" srsName="http://www.opengis.net/def/crs/EPSG/0/4258">
          <gml:pos>60.222 24.83 </gml:pos>
        </gml:Point>
      </BsWfs:Location>
      <BsWfs:Time>{}</BsWfs:Time>
      <BsWfs:ParameterName>{}</BsWfs:ParameterName>
      <BsWfs:ParameterValue>{}</BsWfs:ParameterValue>
    </BsWfs:BsWfsElement>
  </wfs:member>"#,
            time, name, value
        )
    }

    fn feature_collection(members: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:FeatureCollection timeStamp="2022-11-07T07:50:46Z" numberMatched="{n}" numberReturned="{n}"
    xmlns:wfs="http://www.opengis.net/wfs/2.0"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:BsWfs="http://xml.fmi.fi/schema/wfs/2.0">
  {members}
</wfs:FeatureCollection>"#,
            n = members.len(),
            members = members.join("\n  ")
        )
    }

    #[test]
    fn test_parse_groups_by_time_and_casts_numbers() {
        let xml = feature_collection(&[
            member("2022-11-07T07:00:00Z", "Anything here", "100"),
            member("2022-11-07T07:00:00Z", "Temperature", "8"),
            member("2022-11-07T07:00:01Z", "not_number", "this is not a number"),
            member("2022-11-07T07:00:01Z", "Another", "NaN"),
        ]);

        let records = parse_feature_collection(&xml).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.time, "2022-11-07T07:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(first.location, Coordinate { lat: 60.222, lon: 24.83 });
        assert_eq!(first.values["Anything here"], 100.0);
        assert_eq!(first.values["Temperature"], 8.0);

        let second = &records[1];
        assert_eq!(second.time, "2022-11-07T07:00:01Z".parse::<DateTime<Utc>>().unwrap());
        assert!(second.values["not_number"].is_nan());
        assert!(second.values["Another"].is_nan());
    }

    #[test]
    fn test_parse_preserves_first_appearance_order() {
        let xml = feature_collection(&[
            member("2022-11-07T09:00:00Z", "Temperature", "3"),
            member("2022-11-07T07:00:00Z", "Temperature", "1"),
            member("2022-11-07T09:00:00Z", "WindSpeedMS", "5"),
        ]);
        let records = parse_feature_collection(&xml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time, "2022-11-07T09:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(records[1].time, "2022-11-07T07:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(records[0].values["WindSpeedMS"], 5.0);
    }

    #[test]
    fn test_parse_missing_feature_collection_fails() {
        let err = parse_feature_collection("<foo><bar/></foo>").unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
        assert!(err.to_string().contains("FeatureCollection"));
    }

    #[test]
    fn test_parse_missing_members_fails() {
        let xml = feature_collection(&[]);
        let err = parse_feature_collection(&xml).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
        assert!(err.to_string().contains("member"));
    }

    #[test]
    fn test_parse_member_without_element_fails() {
        let xml = r#"<?xml version="1.0"?>
<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs/2.0">
  <wfs:member><somethingelse/></wfs:member>
</wfs:FeatureCollection>"#;
        let err = parse_feature_collection(xml).unwrap_err();
        assert!(err.to_string().contains("BsWfsElement"));
    }

    #[test]
    fn test_parse_invalid_time_fails() {
        let xml = feature_collection(&[member("yesterday-ish", "Temperature", "8")]);
        let err = parse_feature_collection(&xml).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
        assert!(err.to_string().contains("BsWfs:Time"));
    }

    #[test]
    fn test_harmonie_point_mapping() {
        let xml = feature_collection(&[
            member("2022-11-02T06:00:00Z", "Temperature", "9"),
            member("2022-11-02T06:00:00Z", "Humidity", "49"),
            member("2022-11-02T06:00:00Z", "WindSpeedMS", "5"),
            member("2022-11-02T06:00:00Z", "WindGust", "15"),
            member("2022-11-02T06:00:00Z", "WindDirection", "200"),
            member("2022-11-02T06:00:00Z", "Pressure", "1000"),
            member("2022-11-02T06:00:00Z", "Visibility", "10000"),
            member("2022-11-02T06:00:00Z", "PrecipitationAmount", "5"),
            member("2022-11-02T06:00:00Z", "Precipitation1h", "7"),
            member("2022-11-02T06:00:00Z", "DewPoint", "8.5"),
            member("2022-11-02T06:00:00Z", "WeatherSymbol3", "31"),
        ]);
        let records = parse_feature_collection(&xml).unwrap();
        let point = to_harmonie_point(records[0].clone());
        assert_eq!(point.temperature, 9.0);
        assert_eq!(point.wind_gust_ms, 15.0);
        assert_eq!(point.dew_point, 8.5);
        assert_eq!(point.weather_symbol, 31);
    }

    #[test]
    fn test_harmonie_point_missing_parameter_is_nan() {
        let xml = feature_collection(&[member("2022-11-02T06:00:00Z", "Temperature", "9")]);
        let records = parse_feature_collection(&xml).unwrap();
        let point = to_harmonie_point(records[0].clone());
        assert!(point.wind_speed_ms.is_nan());
        assert_eq!(point.weather_symbol, 0);
    }

    #[test]
    fn test_observation_point_renames_internal_parameters() {
        let xml = feature_collection(&[
            member("2022-11-02T06:00:00Z", "TA_PT1H_AVG", "2"),
            member("2022-11-02T06:00:00Z", "WS_PT1H_AVG", "4"),
            member("2022-11-02T06:00:00Z", "WD_PT1H_AVG", "200"),
            member("2022-11-02T06:00:00Z", "PRA_PT1H_ACC", "10"),
        ]);
        let records = parse_feature_collection(&xml).unwrap();
        let point = to_observation_point(records[0].clone());
        assert_eq!(point.temperature, 2.0);
        assert_eq!(point.wind_speed_ms, 4.0);
        assert_eq!(point.wind_direction, 200.0);
        assert_eq!(point.precipitation_1h, 10.0);
    }

    #[test]
    fn test_to_symbol_code_rejects_bad_readings() {
        assert_eq!(to_symbol_code(31.0), 31);
        assert_eq!(to_symbol_code(f64::NAN), 0);
        assert_eq!(to_symbol_code(-100000.0), 0);
        assert_eq!(to_symbol_code(31.5), 0);
    }

    #[test]
    fn test_observation_bbox_format() {
        let bbox = observation_bbox(Coordinate { lat: 60.222, lon: 24.83 });
        let parts: Vec<f64> = bbox.split(',').map(|p| p.parse().unwrap()).collect();
        assert_eq!(parts.len(), 4);
        // left < right, bottom < top, centred on the coordinate
        assert!(parts[0] < 24.83 && parts[2] > 24.83);
        assert!(parts[1] < 60.222 && parts[3] > 60.222);
        // ±5 km is below a tenth of a degree everywhere in the Nordics
        assert!((parts[2] - parts[0]) < 0.2);
        assert!((parts[3] - parts[1]) < 0.1);
    }

    #[tokio::test]
    async fn test_fetch_harmonie_forecast_against_mock() {
        let server = MockServer::start().await;
        let xml = feature_collection(&[
            member("2022-11-02T06:00:00Z", "Temperature", "9"),
            member("2022-11-02T06:00:00Z", "WindSpeedMS", "5"),
            member("2022-11-02T07:00:00Z", "Temperature", "10"),
            member("2022-11-02T07:00:00Z", "WindSpeedMS", "6"),
        ]);
        Mock::given(method("GET"))
            .and(query_param(
                "storedquery_id",
                "fmi::forecast::harmonie::surface::point::simple",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml))
            .mount(&server)
            .await;

        let client = FmiClient::with_base_url(server.uri());
        let opts = test_options();
        let now = "2022-11-02T06:59:00Z".parse().unwrap();
        let points = client.fetch_harmonie_forecast(&opts, now).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].temperature, 9.0);
        assert_eq!(points[1].wind_speed_ms, 6.0);
    }

    #[tokio::test]
    async fn test_fetch_observations_against_mock() {
        let server = MockServer::start().await;
        let xml = feature_collection(&[
            member("2022-11-02T06:00:00Z", "TA_PT1H_AVG", "2"),
            member("2022-11-02T06:00:00Z", "WS_PT1H_AVG", "4"),
        ]);
        Mock::given(method("GET"))
            .and(query_param(
                "storedquery_id",
                "fmi::observations::weather::hourly::simple",
            ))
            .and(query_param("maxlocations", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml))
            .mount(&server)
            .await;

        let client = FmiClient::with_base_url(server.uri());
        let points = client.fetch_observations(&test_options()).await.unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].temperature, 2.0);
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = FmiClient::with_base_url(server.uri());
        let now = "2022-11-02T06:59:00Z".parse().unwrap();
        let err = client
            .fetch_harmonie_forecast(&test_options(), now)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::ExternalServiceError(_)));
    }

    fn test_options() -> WeatherOptions {
        WeatherOptions {
            location: Coordinate { lat: 60.222, lon: 24.83 },
            timezone: chrono_tz::Europe::Helsinki,
            switch_day_at_hour: 9,
        }
    }
}
