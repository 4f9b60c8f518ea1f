use std::time::Duration;

use log::{debug, error};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use tokio::runtime::{Builder, Runtime};
use url::Url;

use super::{
    LapTime, Race, RaceDataSource, SessionResult, SessionType, TelemetrySample,
    types::{LapTimesResponse, ResultsResponse, TelemetryResponse},
};
use crate::{
    LaptraceError,
    config::{AppConfig, CredentialsMode, ThrottleUnit},
    errors::{
        ClientInitSnafu, HttpRequestSnafu, HttpStatusSnafu, InvalidUrlSnafu,
        MalformedResponseSnafu, RuntimeInitSnafu,
    },
    state::LapKey,
};

const TUNNEL_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Blocking facade over an async reqwest client. Each call runs to completion
/// on a private current-thread runtime, so the client is meant to live on a
/// worker thread rather than the UI thread.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    runtime: Runtime,
    throttle_unit: ThrottleUnit,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, LaptraceError> {
        // validate the base url once so request urls can be built from it later
        Url::parse(&config.api_base_url).context(InvalidUrlSnafu {
            url: config.api_base_url.as_str(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if config.skip_tunnel_warning {
            headers.insert(
                HeaderName::from_static(TUNNEL_WARNING_HEADER),
                HeaderValue::from_static("true"),
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_s))
            .cookie_store(config.credentials == CredentialsMode::Include)
            .build()
            .context(ClientInitSnafu)?;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context(RuntimeInitSnafu)?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
            runtime,
            throttle_unit: config.throttle_unit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, LaptraceError> {
        let raw = format!("{}/{}", self.base_url, path);
        let mut url = Url::parse(&raw).context(InvalidUrlSnafu { url: raw.as_str() })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T, LaptraceError> {
        debug!("GET {}", url);
        let result = self.runtime.block_on(async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .context(HttpRequestSnafu { url: url.as_str() })?;
            let status = response.status();
            let body = response
                .text()
                .await
                .context(HttpRequestSnafu { url: url.as_str() })?;
            debug!("Response status: {}", status);

            if !status.is_success() {
                return HttpStatusSnafu {
                    url: url.as_str(),
                    status: status.as_u16(),
                    body,
                }
                .fail();
            }
            serde_json::from_str::<T>(&body).context(MalformedResponseSnafu { endpoint })
        });
        if let Err(e) = &result {
            error!("Error fetching {}: {}", url, e);
        }
        result
    }
}

impl RaceDataSource for ApiClient {
    fn calendar(&self, year: i32) -> Result<Vec<Race>, LaptraceError> {
        let url = self.endpoint_url(&format!("calendar/{}", year), &[])?;
        self.get_json(url, "calendar")
    }

    fn session_results(
        &self,
        year: i32,
        race_name: &str,
        session: SessionType,
    ) -> Result<Vec<SessionResult>, LaptraceError> {
        let endpoint = session.results_endpoint();
        let url = self.endpoint_url(
            endpoint,
            &[("year", year.to_string()), ("race_name", race_name.to_string())],
        )?;
        let response: ResultsResponse = self.get_json(url, endpoint)?;
        Ok(response
            .results
            .into_iter()
            .filter_map(SessionResult::from_raw)
            .collect())
    }

    fn lap_times(
        &self,
        year: i32,
        race_name: &str,
        session: SessionType,
        driver_number: &str,
    ) -> Result<Vec<LapTime>, LaptraceError> {
        let url = self.endpoint_url(
            "lap-times",
            &[
                ("year", year.to_string()),
                ("race_name", race_name.to_string()),
                ("driver_number", driver_number.to_string()),
                ("session_type", session.as_str().to_string()),
            ],
        )?;
        let response: LapTimesResponse = self.get_json(url, "lap-times")?;
        Ok(response.lap_times)
    }

    fn telemetry(
        &self,
        year: i32,
        race_name: &str,
        session: SessionType,
        key: &LapKey,
    ) -> Result<Vec<TelemetrySample>, LaptraceError> {
        let url = self.endpoint_url(
            "telemetry",
            &[
                ("year", year.to_string()),
                ("race_name", race_name.to_string()),
                ("driver_number", key.driver_number.clone()),
                ("lap_number", key.lap_number.to_string()),
                ("session_type", session.as_str().to_string()),
            ],
        )?;
        let response: TelemetryResponse = self.get_json(url, "telemetry")?;
        Ok(response
            .telemetry
            .into_iter()
            .map(|raw| TelemetrySample::from_raw(raw, self.throttle_unit))
            .collect())
    }
}
