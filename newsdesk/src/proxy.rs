//! Development reverse proxy.
//!
//! Each configured rule is mounted at its prefix and forwards every method to
//! its target origin, optionally rewriting the prefix and pinning `referer`.
//! Only meant for local development; production talks to the backend directly.

use std::io::Cursor;

use anyhow::{anyhow, Result};
use common::{ProxyConfig, ProxyRuleConfig};
use rocket::data::{Data, ToByteUnit};
use rocket::http::{Method, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::route::{Handler, Outcome, Route};
use rocket::{get, routes, Build, Rocket};
use tracing::{debug, info, warn};

/// Largest request body forwarded upstream, in MiB.
const BODY_LIMIT_MIB: u64 = 16;

/// Headers that describe a single hop and are never relayed.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

const METHODS: [Method; 7] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
    Method::Head,
    Method::Options,
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// One prefix-to-target forwarding rule, usable as a Rocket route handler.
#[derive(Clone)]
pub struct ProxyRule {
    prefix: String,
    target: String,
    rewrite: Option<String>,
    referer: Option<String>,
    client: reqwest::Client,
}

impl ProxyRule {
    pub fn new(config: &ProxyRuleConfig, client: reqwest::Client) -> Self {
        let prefix = match config.prefix.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self {
            prefix: prefix.to_string(),
            target: config.target.trim_end_matches('/').to_string(),
            rewrite: config.rewrite.clone(),
            referer: config.referer.clone(),
            client,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Upstream URL for an incoming request path (which includes the prefix) and query.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> String {
        let forwarded = match &self.rewrite {
            Some(replacement) => {
                let rest = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);
                format!("{}{}", replacement, rest)
            }
            None => path.to_string(),
        };
        let mut url = format!("{}{}", self.target, forwarded);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(q);
        }
        url
    }

    fn routes(&self) -> Vec<Route> {
        METHODS
            .iter()
            .map(|method| Route::new(*method, "/<path..>", self.clone()))
            .collect()
    }

    async fn forward(&self, req: &Request<'_>, data: Data<'_>) -> std::result::Result<Forwarded, Status> {
        let url = self.upstream_url(
            req.uri().path().as_str(),
            req.uri().query().map(|q| q.as_str()),
        );
        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|_| Status::MethodNotAllowed)?;

        let body = data
            .open(BODY_LIMIT_MIB.mebibytes())
            .into_bytes()
            .await
            .map_err(|e| {
                warn!(%e, "failed to read request body");
                Status::BadRequest
            })?;
        if !body.is_complete() {
            return Err(Status::PayloadTooLarge);
        }

        let mut builder = self.client.request(method.clone(), &url);
        for header in req.headers().iter() {
            let name = header.name().as_str();
            // Host comes from the target; the body is re-encoded by the upstream client
            if is_hop_by_hop(name)
                || name.eq_ignore_ascii_case("host")
                || name.eq_ignore_ascii_case("accept-encoding")
                || (self.referer.is_some() && name.eq_ignore_ascii_case("referer"))
            {
                continue;
            }
            builder = builder.header(name, header.value());
        }
        if let Some(referer) = &self.referer {
            builder = builder.header("referer", referer.as_str());
        }
        let body = body.into_inner();
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%e, %url, "upstream request failed");
            Status::BadGateway
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| {
            warn!(%e, %url, "failed to read upstream body");
            Status::BadGateway
        })?;
        debug!(%method, %url, status, "proxied request");

        Ok(Forwarded {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[rocket::async_trait]
impl Handler for ProxyRule {
    async fn handle<'r>(&self, req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r> {
        match self.forward(req, data).await {
            Ok(forwarded) => Outcome::from(req, forwarded),
            Err(status) => Outcome::from(req, status),
        }
    }
}

/// Upstream response relayed to the caller.
struct Forwarded {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl<'r> Responder<'r, 'static> for Forwarded {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut builder = Response::build();
        builder.status(Status::new(self.status));
        for (name, value) in self.headers {
            builder.raw_header_adjoin(name, value);
        }
        builder.sized_body(self.body.len(), Cursor::new(self.body));
        Ok(builder.finalize())
    }
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Build the proxy server with one mount per rule.
pub fn build_rocket(config: &ProxyConfig) -> Result<Rocket<Build>> {
    config.validate()?;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let fig = rocket::Config::figment()
        .merge(("address", config.bind.clone()))
        .merge(("port", config.port));

    let mut rocket = rocket::custom(fig).mount("/", routes![health]);
    for rule_config in &config.rules {
        let rule = ProxyRule::new(rule_config, client.clone());
        info!(prefix = %rule.prefix(), target = %rule_config.target, rewrite = ?rule_config.rewrite, "proxy rule");
        let routes = rule.routes();
        rocket = rocket.mount(rule.prefix(), routes);
    }
    Ok(rocket)
}

/// Run the proxy until shutdown (SIGINT/SIGTERM etc.).
pub async fn launch_proxy(config: &ProxyConfig) -> Result<()> {
    let rocket = build_rocket(config)?;

    info!(bind = %config.bind, port = config.port, "Starting dev proxy");
    rocket
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    info!("Dev proxy has shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(prefix: &str, rewrite: Option<&str>) -> ProxyRule {
        ProxyRule::new(
            &ProxyRuleConfig {
                prefix: prefix.to_string(),
                target: "https://upstream.example/".to_string(),
                rewrite: rewrite.map(str::to_string),
                referer: None,
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn rewrite_replaces_prefix_only() {
        let gold = rule("/gold-api", Some("/api"));
        assert_eq!(
            gold.upstream_url("/gold-api/quote/gold-api", Some("a=1")),
            "https://upstream.example/api/quote/gold-api?a=1"
        );
        assert_eq!(gold.upstream_url("/gold-api", None), "https://upstream.example/api");
    }

    #[test]
    fn no_rewrite_keeps_path() {
        let api = rule("/api", None);
        assert_eq!(
            api.upstream_url("/api/news/latest", Some("")),
            "https://upstream.example/api/news/latest"
        );
    }

    #[test]
    fn hop_by_hop_is_case_insensitive() {
        assert!(is_hop_by_hop("Transfer-Encoding"));
        assert!(!is_hop_by_hop("content-type"));
    }
}
