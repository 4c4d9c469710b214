//! HTTP client for the BCRP statistics service.

use crate::catalog::Catalog;
use crate::config::BcrpConfig;
use crate::error::{BcrpError, BcrpResult};
use crate::matching::Matcher;
use crate::period::{label_to_date, Period};
use crate::types::{SeriesObservation, SeriesSummary};
use encoding_rs::Encoding;
use reqwest::Client;
use serde::Deserialize;
use std::borrow::Cow;
use tracing::debug;
use url::Url;

/// The series API sometimes prefixes its JSON with an HTML error page.
/// The payload proper always starts here.
pub const PAYLOAD_MARKER: &str = "{\"config\"";

/// Client for the metadata catalog and the series API.
#[derive(Debug, Clone)]
pub struct BcrpClient {
    http: Client,
    config: BcrpConfig,
    base: Url,
    metadata_encoding: &'static Encoding,
}

impl BcrpClient {
    pub fn new(config: BcrpConfig) -> BcrpResult<Self> {
        config.validate()?;
        let base = config.base()?;
        let metadata_encoding = Encoding::for_label(config.metadata_encoding.as_bytes())
            .ok_or_else(|| BcrpError::UnknownEncoding(config.metadata_encoding.clone()))?;

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            config,
            base,
            metadata_encoding,
        })
    }

    pub fn config(&self) -> &BcrpConfig {
        &self.config
    }

    fn matcher(&self) -> Matcher {
        Matcher::new(self.config.match_mode, self.config.match_cutoff)
    }

    async fn get_bytes(&self, url: Url) -> BcrpResult<Vec<u8>> {
        debug!(url = %url, "GET request");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BcrpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Download and parse the metadata catalog.
    pub async fn fetch_catalog(&self) -> BcrpResult<Catalog> {
        let url = self.config.metadata_url()?;
        let bytes = self.get_bytes(url).await?;
        Catalog::from_bytes(&bytes, self.metadata_encoding)
    }

    /// Group names matching any of `keywords`.
    pub async fn search_groups(&self, keywords: &[String]) -> BcrpResult<Vec<String>> {
        let catalog = self.fetch_catalog().await?;
        Ok(catalog.matching_groups(keywords, &self.matcher()))
    }

    /// Code and name of the series in groups containing `group`.
    pub async fn series_by_group(&self, group: &str) -> BcrpResult<Vec<SeriesSummary>> {
        if group.trim().is_empty() {
            return Err(BcrpError::InvalidInput(
                "time series group must not be empty".to_string(),
            ));
        }
        let catalog = self.fetch_catalog().await?;
        catalog.series_in_group(group, self.config.series_limit())
    }

    /// URL of the series API for one code and period range.
    pub fn series_url(&self, code: &str, start: &Period, end: &Period) -> BcrpResult<Url> {
        let (start, end) = (start.to_string(), end.to_string());
        let mut url = self.base.join("api/")?;
        url.path_segments_mut()
            .map_err(|_| {
                BcrpError::InvalidInput(format!("base URL cannot carry a path: {}", self.base))
            })?
            .pop_if_empty()
            .extend([
                code,
                "json",
                start.as_str(),
                end.as_str(),
                self.config.language.as_str(),
            ]);
        Ok(url)
    }

    /// Observations of `code` between `start` and `end` (`YYYY-M` or `YYYY-M-D`).
    pub async fn fetch_series(
        &self,
        code: &str,
        start: &str,
        end: &str,
    ) -> BcrpResult<Vec<SeriesObservation>> {
        let code = code.trim();
        if code.is_empty() {
            return Err(BcrpError::InvalidInput(
                "time series code must not be empty".to_string(),
            ));
        }
        let start: Period = start.parse()?;
        let end: Period = end.parse()?;

        let url = self.series_url(code, &start, &end)?;
        let bytes = self.get_bytes(url).await?;
        parse_series_body(&decode_body(&bytes))
    }
}

/// UTF-8 when valid, latin-1 otherwise.
fn decode_body(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0,
    }
}

#[derive(Debug, Deserialize)]
struct SeriesPayload {
    #[serde(default)]
    config: PayloadConfig,
    #[serde(default)]
    periods: Vec<RawPeriod>,
}

#[derive(Debug, Default, Deserialize)]
struct PayloadConfig {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
    name: String,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

fn value_text(value: &serde_json::Value) -> Option<Cow<'_, str>> {
    match value {
        serde_json::Value::String(s) => Some(Cow::Borrowed(s)),
        serde_json::Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Extract observations from a series API body, skipping anything before
/// [`PAYLOAD_MARKER`] and anything after the JSON document.
pub fn parse_series_body(body: &str) -> BcrpResult<Vec<SeriesObservation>> {
    let start = body.find(PAYLOAD_MARKER).ok_or(BcrpError::MissingPayload)?;
    let payload = serde_json::Deserializer::from_str(&body[start..])
        .into_iter::<SeriesPayload>()
        .next()
        .ok_or(BcrpError::MissingPayload)??;

    debug!(
        title = %payload.config.title,
        periods = payload.periods.len(),
        "Parsed series payload"
    );

    payload
        .periods
        .iter()
        .map(|period| -> BcrpResult<SeriesObservation> {
            let date = label_to_date(&period.name)?;
            let value = period.values.first().and_then(value_text);
            Ok(SeriesObservation::new(date, value.as_deref()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAYLOAD: &str = r#"{"config":{"title":"Tipo de cambio","series":[{"name":"TC Venta","dec":"3"}]},"periods":[{"name":"02.Jan.20","values":["3.314"]},{"name":"03.Jan.20","values":["n.d."]},{"name":"06.Jan.20","values":[]}]}"#;

    fn create_client(base_url: &str) -> BcrpClient {
        BcrpClient::new(BcrpConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_series_body_skips_html_prefix() {
        let body = format!("<html><body>Error de servidor</body></html>\n{}\n<!-- tail -->", PAYLOAD);
        let observations = parse_series_body(&body).unwrap();
        assert_eq!(
            observations,
            vec![
                SeriesObservation::new("2020-01-02", Some("3.314")),
                SeriesObservation::new("2020-01-03", None),
                SeriesObservation::new("2020-01-06", None),
            ]
        );
        assert_eq!(observations[1].value, "n.d.");
    }

    #[test]
    fn test_parse_series_body_without_marker() {
        assert!(matches!(
            parse_series_body("<html>Serie no encontrada</html>"),
            Err(BcrpError::MissingPayload)
        ));
    }

    #[test]
    fn test_parse_series_body_truncated_json() {
        assert!(matches!(
            parse_series_body(r#"{"config":{"title":"x"},"periods":[{"name""#),
            Err(BcrpError::Json(_))
        ));
    }

    #[test]
    fn test_parse_series_body_numeric_values() {
        let body = r#"{"config":{},"periods":[{"name":"Q2.21","values":[4.5]}]}"#;
        let observations = parse_series_body(body).unwrap();
        assert_eq!(observations[0].date, "2021-04-01");
        assert_eq!(observations[0].value, "4.5");
    }

    #[test]
    fn test_decode_body_latin1_fallback() {
        let bytes = [b'P', 0xe9, b'r', b'u'];
        assert_eq!(decode_body(&bytes), "Péru");
    }

    #[test]
    fn test_series_url() {
        let client = create_client("https://estadisticas.bcrp.gob.pe/estadisticas/series");
        let url = client
            .series_url(
                "PD04638PD",
                &"2020-01-02".parse().unwrap(),
                &"2020-01-31".parse().unwrap(),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://estadisticas.bcrp.gob.pe/estadisticas/series/api/PD04638PD/json/2020-1-2/2020-1-31/eng"
        );
    }

    #[tokio::test]
    async fn test_fetch_series() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/PD04638PD/json/2020-1-1/2020-1-31/eng"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<br /><b>Warning</b>: something broke<br />{}",
                PAYLOAD
            )))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let observations = client
            .fetch_series("PD04638PD", "2020-1-1", "2020-1-31")
            .await
            .unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].date, "2020-01-02");
        assert_eq!(observations[0].value, "3.314");
    }

    #[tokio::test]
    async fn test_fetch_series_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let err = client
            .fetch_series("PD04638PD", "2020-1", "2020-2")
            .await
            .unwrap_err();
        assert!(matches!(err, BcrpError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_series_invalid_period_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAYLOAD))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let err = client
            .fetch_series("PD04638PD", "January 2020", "2020-2")
            .await
            .unwrap_err();
        assert!(matches!(err, BcrpError::InvalidPeriod(_)));
    }

    #[tokio::test]
    async fn test_search_groups_and_series_by_group() {
        let server = MockServer::start().await;
        let csv = "Código de serie;Categoría de serie;Grupo de serie;Nombre de serie\n\
                   PN01270PM;Precios;Inflación;IPC (var% mensual)\n\
                   PD04638PD;Tipo de cambio;Tipo de cambio nominal;TC Venta\n";
        let (latin1, _, _) = encoding_rs::WINDOWS_1252.encode(csv);

        Mock::given(method("GET"))
            .and(path("/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(latin1.into_owned()))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());

        let groups = client
            .search_groups(&["inflacion".to_string()])
            .await
            .unwrap();
        assert_eq!(groups, vec!["Inflación".to_string()]);

        let series = client.series_by_group("cambio").await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].code, "PD04638PD");
        assert_eq!(series[0].name, "TC Venta");
    }

    #[tokio::test]
    async fn test_catalog_fetch_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = create_client(&server.uri());
        let err = client.search_groups(&["pbi".to_string()]).await.unwrap_err();
        assert!(err.is_upstream());
    }
}
