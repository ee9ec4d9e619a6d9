use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://ptable.com";
pub const NO_NAME: &str = "(no name)";

#[derive(Debug, Clone)]
pub struct CompoundConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl CompoundConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for CompoundConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// One entry of the `matches` array returned by the compounds endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CompoundMatch {
    #[serde(rename = "molecularformula", default)]
    pub molecular_formula: String,
    #[serde(rename = "allnames", default)]
    pub all_names: Vec<String>,
}

impl CompoundMatch {
    /// `"<formula>: <first name>"`, falling back to `(no name)`.
    pub fn entry(&self) -> String {
        let name = self.all_names.first().map(String::as_str).unwrap_or(NO_NAME);
        format!("{}: {}", self.molecular_formula, name)
    }
}

#[derive(Debug, Deserialize)]
struct CompoundResponse {
    #[serde(default)]
    matches: Vec<CompoundMatch>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid formula: {0:?}")]
    InvalidFormula(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn formula_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9()\[\]]+$").expect("valid formula regex"))
}

/// Whether `formula` looks like a plain chemical formula (letters, digits, brackets).
pub fn is_formula(formula: &str) -> bool {
    formula_regex().is_match(formula)
}

/// Parse a compounds response body into `"formula: name"` entries, preserving order.
pub fn format_matches(body: &str) -> Result<Vec<String>> {
    let response: CompoundResponse = serde_json::from_str(body)?;
    Ok(response.matches.iter().map(CompoundMatch::entry).collect())
}

/// Secondary lookup keyed by formula. Implementations never fail: a broken
/// source degrades to an empty list.
#[async_trait]
pub trait CompoundSource: Send + Sync {
    async fn compounds(&self, formula: &str) -> Vec<String>;
}

pub struct CompoundClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CompoundClient {
    pub fn new(config: &CompoundConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// `{base}/JSON/compounds/formula={formula}`
    pub fn endpoint(&self, formula: &str) -> Result<Url> {
        if !is_formula(formula) {
            return Err(Error::InvalidFormula(formula.to_string()));
        }
        Ok(self
            .base_url
            .join(&format!("JSON/compounds/formula={}", formula))?)
    }

    pub async fn fetch(&self, formula: &str) -> Result<Vec<String>> {
        let url = self.endpoint(formula)?;
        debug!("GET {}", url);
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        format_matches(&body)
    }
}

#[async_trait]
impl CompoundSource for CompoundClient {
    async fn compounds(&self, formula: &str) -> Vec<String> {
        match self.fetch(formula).await {
            Ok(list) => {
                debug!("{} compounds for {}", list.len(), formula);
                list
            }
            Err(e) => {
                warn!("compound lookup for {:?} failed: {}", formula, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> CompoundClient {
        let config = CompoundConfig::new(server.base_url()).timeout(Duration::from_secs(2));
        CompoundClient::new(&config).unwrap()
    }

    // --- format_matches ---

    #[test]
    fn format_first_name_per_match() {
        let body = r#"{"matches":[
            {"molecularformula":"FeO","allnames":["iron(II) oxide","ferrous oxide"]},
            {"molecularformula":"Fe2O3","allnames":["iron(III) oxide"]}
        ]}"#;
        assert_eq!(
            format_matches(body).unwrap(),
            vec!["FeO: iron(II) oxide", "Fe2O3: iron(III) oxide"]
        );
    }

    #[test]
    fn format_missing_names() {
        let body = r#"{"matches":[{"molecularformula":"AgBr","allnames":[]},{"molecularformula":"AgCl"}]}"#;
        assert_eq!(
            format_matches(body).unwrap(),
            vec!["AgBr: (no name)", "AgCl: (no name)"]
        );
    }

    #[test]
    fn format_no_matches_key() {
        assert!(format_matches("{}").unwrap().is_empty());
    }

    #[test]
    fn format_rejects_garbage() {
        assert!(matches!(format_matches("<html>"), Err(Error::Parse(_))));
    }

    // --- endpoint ---

    #[test]
    fn endpoint_shape() {
        let client = CompoundClient::new(&CompoundConfig::default()).unwrap();
        assert_eq!(
            client.endpoint("Fe").unwrap().as_str(),
            "https://ptable.com/JSON/compounds/formula=Fe"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = CompoundClient::new(&CompoundConfig::new("http://localhost:9000/api")).unwrap();
        assert_eq!(
            client.endpoint("NaCl").unwrap().as_str(),
            "http://localhost:9000/api/JSON/compounds/formula=NaCl"
        );
    }

    #[test]
    fn endpoint_rejects_non_formula() {
        let client = CompoundClient::new(&CompoundConfig::default()).unwrap();
        assert!(matches!(client.endpoint(""), Err(Error::InvalidFormula(_))));
        assert!(matches!(client.endpoint("../admin"), Err(Error::InvalidFormula(_))));
        assert!(matches!(client.endpoint("Fe?x=1"), Err(Error::InvalidFormula(_))));
    }

    // --- HTTP ---

    #[tokio::test]
    async fn fetch_preserves_source_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/JSON/compounds/formula=Fe");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({
                        "matches": [
                            {"molecularformula": "FeCl3", "allnames": ["iron(III) chloride"]},
                            {"molecularformula": "FeS", "allnames": ["iron(II) sulfide"]},
                            {"molecularformula": "Fe3O4", "allnames": ["magnetite", "iron(II,III) oxide"]}
                        ]
                    }));
            })
            .await;

        let client = client_for(&server);
        let list = client.compounds("Fe").await;
        mock.assert_async().await;
        assert_eq!(
            list,
            vec![
                "FeCl3: iron(III) chloride",
                "FeS: iron(II) sulfide",
                "Fe3O4: magnetite"
            ]
        );
    }

    #[tokio::test]
    async fn server_error_degrades_to_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/JSON/compounds/formula=Og");
                then.status(500);
            })
            .await;

        let client = client_for(&server);
        assert!(matches!(client.fetch("Og").await, Err(Error::Transport(_))));
        assert!(client.compounds("Og").await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/JSON/compounds/formula=He");
                then.status(200).body("not json");
            })
            .await;

        let client = client_for(&server);
        assert!(matches!(client.fetch("He").await, Err(Error::Parse(_))));
        assert!(client.compounds("He").await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_source_degrades_to_empty() {
        let config = CompoundConfig::new("http://127.0.0.1:9").timeout(Duration::from_millis(500));
        let client = CompoundClient::new(&config).unwrap();
        assert!(client.compounds("Fe").await.is_empty());
    }

    #[tokio::test]
    async fn invalid_formula_never_hits_network() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("{}");
            })
            .await;

        let client = client_for(&server);
        assert!(client.compounds("").await.is_empty());
        mock.assert_hits_async(0).await;
    }
}
