use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use chem_extract::{resolver, ElementSearch, LookupError, SearchHistory};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupRequest {
    #[schemars(description = "Element symbol, case-insensitive (e.g. Fe, o, NA)")]
    pub symbol: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolveRequest {
    #[schemars(description = "Element symbol, case-insensitive")]
    pub symbol: String,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

fn err(e: impl std::fmt::Display) -> ErrorData {
    ErrorData::internal_error(e.to_string(), None::<Value>)
}

fn text_ok(s: impl Into<String>) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::text(s.into())]))
}

#[derive(Clone)]
pub struct ChemServer {
    search: ElementSearch,
    history: Arc<Mutex<SearchHistory>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ChemServer {
    pub fn new(search: ElementSearch) -> Self {
        Self {
            search,
            history: Arc::new(Mutex::new(SearchHistory::new())),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Look up a chemical element by symbol. Returns its properties and common compounds as JSON. Cached after the first lookup."
    )]
    async fn lookup_element(
        &self,
        req: Parameters<LookupRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.search.lookup_element(&req.0.symbol).await {
            Ok(record) => {
                self.history.lock().await.record(&record);
                text_ok(serde_json::to_string_pretty(&record).map_err(err)?)
            }
            Err(LookupError::UnknownSymbol(s)) => Err(ErrorData::invalid_params(
                format!("Unknown element symbol: {:?}", s),
                None::<Value>,
            )),
            Err(e) => Err(err(e)),
        }
    }

    #[tool(description = "Resolve an element symbol to its atomic number without opening a browser.")]
    async fn resolve_symbol(
        &self,
        req: Parameters<ResolveRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let symbol = req.0.symbol.trim();
        match resolver::atomic_id(symbol) {
            Some(id) => text_ok(format!("{} = {}", resolver::capitalize(symbol), id)),
            None => Err(ErrorData::invalid_params(
                format!("Unknown element symbol: {:?}", symbol),
                None::<Value>,
            )),
        }
    }

    #[tool(description = "List elements looked up in this session, most recent first.")]
    async fn search_history(&self) -> Result<CallToolResult, ErrorData> {
        let history = self.history.lock().await;
        if history.is_empty() {
            return text_ok("No elements looked up yet.");
        }
        let lines: Vec<String> = history
            .entries()
            .iter()
            .map(|r| format!("{} {} ({})", r.atomic_number.value, r.symbol.value, r.name.value))
            .collect();
        text_ok(lines.join("\n"))
    }
}

#[tool_handler]
impl ServerHandler for ChemServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "chem-search".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Chemical element lookup. Use 'lookup_element' with a symbol such as 'Fe' to get \
                 atomic number, mass, energy levels, electronegativity, melting and boiling points, \
                 electron affinity and common compounds. 'resolve_symbol' checks a symbol without \
                 a browser. 'search_history' lists what was looked up this session."
                    .into(),
            ),
        }
    }
}

pub async fn run_server(search: ElementSearch) -> anyhow::Result<()> {
    use rmcp::ServiceExt;

    let server = ChemServer::new(search);
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
