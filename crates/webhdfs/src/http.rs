//! WebHDFS REST transport over a blocking reqwest client.

use reqwest::blocking::Client;
use reqwest::{Method, Url};
use serde_json::Value;

use crate::config::WebhdfsConfig;
use crate::error::{Result, WebhdfsError};
use crate::transport::{MutableTransport, Transport};
use crate::types::{ContentSummary, MetadataRecord};

const USER_AGENT: &str = concat!("webhdfs-rs/", env!("CARGO_PKG_VERSION"));

/// Transport bound to one responsive NameNode.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    path_prefix: String,
    user: String,
}

impl HttpTransport {
    /// Tries each candidate URL in order with a root listing and keeps the
    /// first that answers.
    pub fn connect(config: &WebhdfsConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        let candidates = config.base_urls();
        for base_url in &candidates {
            let transport = Self::with_client(client.clone(), base_url, config);
            match transport.list_status("/") {
                Ok(_) => {
                    log::info!("connected to webhdfs url={} user={}", base_url, transport.user);
                    return Ok(transport);
                }
                Err(error) => {
                    log::warn!("webhdfs host unavailable url={} error={}", base_url, error);
                }
            }
        }
        Err(WebhdfsError::Connection(candidates.join(", ")))
    }

    /// Builds a transport for `base_url` without probing it.
    pub fn with_client(client: Client, base_url: &str, config: &WebhdfsConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            path_prefix: config.path_prefix.trim_matches('/').to_string(),
            user: config.effective_user(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn call(
        &self,
        method: Method,
        path: &str,
        operation: &'static str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let url = operation_url(
            &self.base_url,
            &self.path_prefix,
            path,
            &self.user,
            operation,
            params,
        )?;
        log::debug!("webhdfs request method={} op={} path={}", method, operation, path);
        let response = self.client.request(method, url).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        decode_response(status, &body, path, operation)
    }

    fn get(&self, path: &str, operation: &'static str) -> Result<Value> {
        self.call(Method::GET, path, operation, &[])
    }

    fn put(&self, path: &str, operation: &'static str, params: &[(&str, String)]) -> Result<Value> {
        self.call(Method::PUT, path, operation, params)
    }
}

impl Transport for HttpTransport {
    fn list_status(&self, path: &str) -> Result<Vec<MetadataRecord>> {
        decode_listing(self.get(path, "LISTSTATUS")?)
    }

    fn content_summary(&self, path: &str) -> Result<ContentSummary> {
        decode_summary(self.get(path, "GETCONTENTSUMMARY")?)
    }

    fn file_status(&self, path: &str) -> Result<MetadataRecord> {
        decode_status(self.get(path, "GETFILESTATUS")?)
    }
}

impl MutableTransport for HttpTransport {
    fn make_dirs(&self, path: &str, permission: Option<&str>) -> Result<bool> {
        let params: Vec<(&str, String)> = permission
            .map(|permission| ("permission", permission.to_string()))
            .into_iter()
            .collect();
        decode_boolean(self.put(path, "MKDIRS", &params)?)
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<bool> {
        let params = [("recursive", recursive.to_string())];
        decode_boolean(self.call(Method::DELETE, path, "DELETE", &params)?)
    }

    fn rename(&self, path: &str, destination: &str) -> Result<bool> {
        let params = [("destination", destination.to_string())];
        decode_boolean(self.put(path, "RENAME", &params)?)
    }

    fn set_owner(&self, path: &str, owner: Option<&str>, group: Option<&str>) -> Result<()> {
        let mut params = Vec::new();
        if let Some(owner) = owner {
            params.push(("owner", owner.to_string()));
        }
        if let Some(group) = group {
            params.push(("group", group.to_string()));
        }
        if params.is_empty() {
            return Err(WebhdfsError::MissingArgument("owner or group".to_string()));
        }
        self.put(path, "SETOWNER", &params).map(drop)
    }

    fn set_permission(&self, path: &str, permission: &str) -> Result<()> {
        let params = [("permission", permission.to_string())];
        self.put(path, "SETPERMISSION", &params).map(drop)
    }

    fn create_symlink(&self, path: &str, destination: &str, create_parent: bool) -> Result<()> {
        let params = [
            ("destination", destination.to_string()),
            ("createParent", create_parent.to_string()),
        ];
        self.put(path, "CREATESYMLINK", &params).map(drop)
    }

    fn concat(&self, path: &str, sources: &[&str]) -> Result<()> {
        let params = [("sources", sources.join(","))];
        self.call(Method::POST, path, "CONCAT", &params).map(drop)
    }
}

/// `{base}/{prefix}{path}?user.name={user}&op={operation}&...`
///
/// Each path component is percent-encoded, so names containing `#`, `?`,
/// `%` or spaces address the file itself.
pub fn operation_url(
    base_url: &str,
    path_prefix: &str,
    path: &str,
    user: &str,
    operation: &str,
    params: &[(&str, String)],
) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|error| WebhdfsError::InvalidInput(format!("{base_url}: {error}")))?;
    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            WebhdfsError::InvalidInput(format!("{base_url} cannot carry a path"))
        })?;
        segments.pop_if_empty();
        segments.extend(path_prefix.split('/').filter(|part| !part.is_empty()));
        let mut components = path.split('/').filter(|part| !part.is_empty()).peekable();
        if components.peek().is_none() {
            segments.push("");
        }
        segments.extend(components);
    }
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("user.name", user);
        query.append_pair("op", operation);
        for (name, value) in params {
            query.append_pair(name, value);
        }
    }
    Ok(url)
}

/// Turns a response body into JSON, surfacing `RemoteException` payloads and
/// non-success statuses as errors. Empty bodies decode to `null`.
pub fn decode_response(status: u16, body: &str, path: &str, operation: &'static str) -> Result<Value> {
    let parsed = if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(body)
    };

    if let Ok(value) = &parsed {
        if let Some(exception) = value.get("RemoteException") {
            return Err(remote_exception(exception, path, operation));
        }
    }
    if !(200..300).contains(&status) {
        let detail = body.trim();
        return Err(WebhdfsError::Remote(if detail.is_empty() {
            format!("{operation} {path} returned HTTP {status}")
        } else {
            format!("{operation} {path} returned HTTP {status}: {detail}")
        }));
    }
    parsed.map_err(|error| {
        WebhdfsError::MalformedResponse(format!("{operation} {path}: {error}"))
    })
}

fn remote_exception(exception: &Value, path: &str, operation: &'static str) -> WebhdfsError {
    let message = exception
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown remote exception");
    let name = exception
        .get("exception")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if message.contains("No enum constant") {
        return WebhdfsError::Remote(format!(
            "Operation not supported by the webhdfs service: {operation}"
        ));
    }
    match name {
        "FileNotFoundException" | "AccessControlException" | "SecurityException" => {
            WebhdfsError::path_unavailable(path, operation, message)
        }
        "" => WebhdfsError::Remote(message.to_string()),
        _ => WebhdfsError::Remote(format!("{name}: {message}")),
    }
}

/// `{"FileStatuses": {"FileStatus": [...]}}`
pub fn decode_listing(value: Value) -> Result<Vec<MetadataRecord>> {
    match take_field(value, "FileStatuses").and_then(|inner| take_field(inner, "FileStatus")) {
        Some(Value::Array(statuses)) => statuses.into_iter().map(MetadataRecord::from_value).collect(),
        _ => Err(WebhdfsError::MalformedResponse(
            "expected FileStatuses.FileStatus array".to_string(),
        )),
    }
}

/// `{"ContentSummary": {...}}`
pub fn decode_summary(value: Value) -> Result<ContentSummary> {
    let summary = take_field(value, "ContentSummary").ok_or_else(|| {
        WebhdfsError::MalformedResponse("expected ContentSummary object".to_string())
    })?;
    serde_json::from_value(summary)
        .map_err(|error| WebhdfsError::MalformedResponse(format!("ContentSummary: {error}")))
}

/// `{"FileStatus": {...}}`
pub fn decode_status(value: Value) -> Result<MetadataRecord> {
    let status = take_field(value, "FileStatus").ok_or_else(|| {
        WebhdfsError::MalformedResponse("expected FileStatus object".to_string())
    })?;
    MetadataRecord::from_value(status)
}

/// `{"boolean": true}`
pub fn decode_boolean(value: Value) -> Result<bool> {
    value
        .get("boolean")
        .and_then(Value::as_bool)
        .ok_or_else(|| WebhdfsError::MalformedResponse("expected boolean result".to_string()))
}

fn take_field(value: Value, field: &str) -> Option<Value> {
    match value {
        Value::Object(mut map) => map.remove(field),
        _ => None,
    }
}
