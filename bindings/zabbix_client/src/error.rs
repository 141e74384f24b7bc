/// Result type for Zabbix API calls.
pub type ZabbixResult<T> = Result<T, ZabbixError>;

/// Errors from the Zabbix API layer.
#[derive(Debug, thiserror::Error)]
pub enum ZabbixError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API endpoint returned a non-2xx status code.
    #[error("Zabbix API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The JSON-RPC call returned an error object.
    #[error("Zabbix API error calling {method} ({code}): {message} {data}")]
    Api {
        method: String,
        code: i64,
        message: String,
        data: String,
    },

    /// The response body was not the expected JSON.
    #[error("Could not decode Zabbix API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response carried neither a result nor an error.
    #[error("Zabbix API returned neither a result nor an error for {method}")]
    EmptyResponse { method: String },
}

/// Fragments Zabbix puts in error details when a session or token is not accepted.
const AUTH_FAILURE_HINTS: &[&str] = &[
    "Not authorized",
    "Not authorised",
    "re-login",
    "Incorrect user name or password",
    "API token expired",
];

impl ZabbixError {
    /// Whether the API rejected the credentials rather than the query.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ZabbixError::Status { status, .. } => *status == 401 || *status == 403,
            ZabbixError::Api {
                method,
                message,
                data,
                ..
            } => {
                method == "user.login"
                    || AUTH_FAILURE_HINTS
                        .iter()
                        .any(|hint| data.contains(hint) || message.contains(hint))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(method: &str, data: &str) -> ZabbixError {
        ZabbixError::Api {
            method: method.to_string(),
            code: -32602,
            message: "Invalid params.".to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn login_failures_are_auth_failures() {
        assert!(api_error(
            "user.login",
            "Incorrect user name or password or account is temporarily blocked."
        )
        .is_auth_failure());
    }

    #[test]
    fn expired_sessions_are_auth_failures() {
        assert!(api_error("host.get", "Session terminated, re-login, please.").is_auth_failure());
        assert!(ZabbixError::Status {
            status: 401,
            body: String::new()
        }
        .is_auth_failure());
    }

    #[test]
    fn query_errors_are_not_auth_failures() {
        assert!(!api_error("item.get", "Invalid parameter \"/1/hostids\".").is_auth_failure());
        assert!(!ZabbixError::EmptyResponse {
            method: "history.get".to_string()
        }
        .is_auth_failure());
    }
}
