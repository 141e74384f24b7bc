use crate::error::{ZabbixError, ZabbixResult};
use crate::types::{
    HistoryGetParams, HistoryRecord, HostGetParams, HostRecord, ItemGetParams, ItemRecord,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Methods that must be called without credentials
const UNAUTHENTICATED_METHODS: &[&str] = &["user.login", "apiinfo.version"];

/// Where the session or API token is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// `Authorization: Bearer <token>` header, supported from Zabbix 6.4
    #[default]
    Header,
    /// `auth` member of the JSON-RPC request, for servers older than 6.4
    RequestBody,
}

/// Client for the JSON-RPC endpoint of a single Zabbix server, usually
/// `https://<server>/api_jsonrpc.php`.
///
/// Credentials go in the `Authorization` header by default, which needs Zabbix 6.4 or later.
/// Use [AuthMethod::RequestBody] for older servers.
pub struct ZabbixClient {
    http: reqwest::Client,
    api_url: Url,
    token: Option<String>,
    auth_method: AuthMethod,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a P,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth: Option<&'a str>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Serialize)]
struct LoginParams<'a> {
    username: &'a str,
    password: &'a str,
}

impl ZabbixClient {
    pub fn new(api_url: Url) -> Self {
        Self::with_http_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`], for example one configured with
    /// custom TLS roots or proxies.
    pub fn with_http_client(http: reqwest::Client, api_url: Url) -> Self {
        Self {
            http,
            api_url,
            token: None,
            auth_method: AuthMethod::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Authenticate with an API token created in the Zabbix frontend.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_auth_method(mut self, auth_method: AuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Open a session with `user.login` and use its token for all later calls.
    pub async fn login(mut self, username: &str, password: &str) -> ZabbixResult<Self> {
        let token: String = self
            .call("user.login", &LoginParams { username, password })
            .await?;
        log::debug!("Logged in to {} as {}", self.api_url, username);
        self.token = Some(token);
        Ok(self)
    }

    /// End the session opened by [ZabbixClient::login].
    pub async fn logout(&self) -> ZabbixResult<()> {
        let _: bool = self.call("user.logout", &[(); 0]).await?;
        Ok(())
    }

    pub async fn host_get(&self, params: &HostGetParams) -> ZabbixResult<Vec<HostRecord>> {
        self.call("host.get", params).await
    }

    pub async fn item_get(&self, params: &ItemGetParams) -> ZabbixResult<Vec<ItemRecord>> {
        self.call("item.get", params).await
    }

    pub async fn history_get(
        &self,
        params: &HistoryGetParams,
    ) -> ZabbixResult<Vec<HistoryRecord>> {
        self.call("history.get", params).await
    }

    /// Call any API method.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> ZabbixResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = self.envelope(method, params, id);

        let mut request = self.http.post(self.api_url.clone()).json(&body);
        if let (Some(token), AuthMethod::Header) = (self.token_for(method), self.auth_method) {
            request = request.bearer_auth(token);
        }

        log::debug!("Calling {} (id {})", method, id);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ZabbixError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        log::trace!("Received {} bytes for {} (id {})", bytes.len(), method, id);

        decode_response(method, &bytes)
    }
}

impl ZabbixClient {
    /// The token to send with `method`, if any
    fn token_for(&self, method: &str) -> Option<&str> {
        self.token
            .as_deref()
            .filter(|_| !UNAUTHENTICATED_METHODS.contains(&method))
    }

    fn envelope<'a, P>(&'a self, method: &'a str, params: &'a P, id: u64) -> RpcRequest<'a, P> {
        RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            auth: match self.auth_method {
                AuthMethod::RequestBody => self.token_for(method),
                AuthMethod::Header => None,
            },
            id,
        }
    }
}

fn decode_response<R: DeserializeOwned>(method: &str, body: &[u8]) -> ZabbixResult<R> {
    let response: RpcResponse<R> = serde_json::from_slice(body)?;
    match response {
        RpcResponse {
            error: Some(error), ..
        } => Err(ZabbixError::Api {
            method: method.to_string(),
            code: error.code,
            message: error.message,
            data: error.data,
        }),
        RpcResponse {
            result: Some(result),
            ..
        } => Ok(result),
        RpcResponse { .. } => Err(ZabbixError::EmptyResponse {
            method: method.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_result() {
        let hosts: Vec<HostRecord> = decode_response(
            "host.get",
            br#"{"jsonrpc":"2.0","result":[{"hostid":"10084","name":"adsysprd101","host":"adsysprd101.example.org"}],"id":1}"#,
        )
        .unwrap();

        assert_eq!(
            vec![HostRecord {
                hostid: "10084".to_string(),
                name: "adsysprd101".to_string(),
                host: "adsysprd101.example.org".to_string(),
            }],
            hosts
        );
    }

    #[test]
    fn decode_error() {
        let err = decode_response::<Vec<HostRecord>>(
            "host.get",
            br#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid params.","data":"Session terminated, re-login, please."},"id":1}"#,
        )
        .unwrap_err();

        match &err {
            ZabbixError::Api { code, data, .. } => {
                assert_eq!(-32602, *code);
                assert_eq!("Session terminated, re-login, please.", data);
            }
            other => panic!("Expected an API error, got {other:?}"),
        }
        assert!(err.is_auth_failure());
    }

    #[test]
    fn decode_empty() {
        let err =
            decode_response::<Vec<HostRecord>>("host.get", br#"{"jsonrpc":"2.0","id":1}"#)
                .unwrap_err();
        assert!(matches!(err, ZabbixError::EmptyResponse { .. }));
    }

    #[test]
    fn decode_garbage() {
        let err = decode_response::<Vec<HostRecord>>("host.get", b"<html>502</html>").unwrap_err();
        assert!(matches!(err, ZabbixError::Decode(_)));
    }

    #[test]
    fn request_envelope() {
        let params = HostGetParams::by_ids(vec!["1".to_string()]);
        let client = ZabbixClient::new(api_url()).with_token("abc");
        let request = client.envelope("host.get", &params, 7);

        assert_eq!(
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "host.get",
                "params": { "hostids": ["1"], "output": ["hostid", "name", "host"] },
                "id": 7,
            }),
            serde_json::to_value(&request).unwrap()
        );
    }

    #[test]
    fn token_goes_in_the_body_for_older_servers() {
        let params = HostGetParams::by_ids(vec!["1".to_string()]);
        let client = ZabbixClient::new(api_url())
            .with_token("abc")
            .with_auth_method(AuthMethod::RequestBody);

        let request = serde_json::to_value(client.envelope("host.get", &params, 7)).unwrap();
        assert_eq!("abc", request["auth"]);
        assert_eq!(None, client.token_for("user.login"));

        let login = serde_json::to_value(client.envelope("user.login", &params, 8)).unwrap();
        assert!(login.get("auth").is_none());
    }

    fn api_url() -> Url {
        Url::parse("https://zabbix.example.org/api_jsonrpc.php").unwrap()
    }

    #[test]
    fn token_is_kept() {
        let client = ZabbixClient::new(api_url()).with_token("abc");
        assert!(client.is_authenticated());
        assert_eq!("zabbix.example.org", client.api_url().host_str().unwrap());
    }
}
