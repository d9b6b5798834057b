use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Username/password pair sent to login and user creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// First-run admin account creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub username: String,
    pub password: String,
    pub setup_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteCategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteFilter {
    pub category_id: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchFilter {
    /// "morning", "noon" or "evening"
    pub batch_type: Option<String>,
    pub created_at_start: Option<String>,
    pub created_at_end: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    pub batch_id: Option<u64>,
    pub keyword: Option<String>,
    pub created_at_start: Option<String>,
    pub created_at_end: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisFilter {
    pub batch_id: Option<u64>,
    /// "3_day" or "7_day"
    pub analysis_type: Option<String>,
    pub created_at_start: Option<String>,
    pub created_at_end: Option<String>,
}

/// Full response handed back by the public client.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: Value,
}

/// Backend envelope `{ code, msg, data | rows }`; only `msg` is ever read.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub msg: Option<String>,
}

/// Session token inside a login or setup response (`data.token`).
pub fn token_from_body(body: &Value) -> Option<&str> {
    body.pointer("/data/token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn setup_request_uses_camel_case_key() {
        let req = SetupRequest {
            username: "root".into(),
            password: "pw".into(),
            setup_key: "k".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"username": "root", "password": "pw", "setupKey": "k"})
        );
    }

    #[test]
    fn absent_sort_is_not_serialized() {
        let input = SiteCategoryInput {
            name: "Metals".into(),
            sort: None,
        };
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"name": "Metals"}));
    }

    #[test]
    fn token_is_read_from_data() {
        let body = json!({"code": 200, "msg": "success", "data": {"token": "t0k", "user": {"id": 1}}});
        assert_eq!(token_from_body(&body), Some("t0k"));
        assert_eq!(token_from_body(&json!({"code": 401, "msg": "invalid credentials"})), None);
        assert_eq!(token_from_body(&json!({"data": {"token": ""}})), None);
    }
}
