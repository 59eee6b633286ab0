use std::collections::HashMap;

use rand::{thread_rng, Rng};
use serde_json::Value;
use url::Url;

use crate::config::CrowdinConfig;
use crate::error::{CrowdinError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Implicit flow: the token came straight back.
    AccessToken(String),
    /// Authorization-code flow: still needs exchanging.
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub grant: Grant,
    pub state: Option<String>,
}

pub fn new_state() -> String {
    let bytes: [u8; 16] = thread_rng().gen();
    hex::encode(bytes)
}

pub fn authorize_url(config: &CrowdinConfig, state: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &config.authorize_url,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", config.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| CrowdinError::OAuth(format!("invalid authorize URL: {e}")))?;
    Ok(url.into())
}

pub fn is_callback(config: &CrowdinConfig, uri: &str) -> bool {
    !config.redirect_uri.is_empty() && uri.starts_with(&config.redirect_uri)
}

/// Reads the grant out of `poedit://auth/crowdin/?code=..&state=..` or
/// `poedit://auth/crowdin/#access_token=..`.
pub fn parse_callback(uri: &str) -> Result<Callback> {
    let url = Url::parse(uri).map_err(|e| CrowdinError::OAuth(format!("bad callback URI: {e}")))?;

    let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    if let Some(fragment) = url.fragment() {
        params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
    }

    if let Some(error) = params.get("error") {
        let detail = params.get("error_description").unwrap_or(error);
        return Err(CrowdinError::OAuth(detail.clone()));
    }

    let state = params.remove("state");
    let grant = if let Some(token) = params.remove("access_token") {
        Grant::AccessToken(token)
    } else if let Some(code) = params.remove("code") {
        Grant::Code(code)
    } else {
        return Err(CrowdinError::OAuth(
            "callback carries neither a token nor a code".into(),
        ));
    };

    Ok(Callback { grant, state })
}

pub fn token_request_form(config: &CrowdinConfig, code: &str) -> Vec<(String, String)> {
    [
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code", code),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn access_token_from(response: &Value) -> Result<String> {
    response
        .get("access_token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CrowdinError::InvalidResponse("token response without access_token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_client_and_state() {
        let config = CrowdinConfig::default();
        let url = Url::parse(&authorize_url(&config, "abc").unwrap()).unwrap();
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.crowdin.com"));
        assert_eq!(params["client_id"], config.client_id);
        assert_eq!(params["redirect_uri"], "poedit://auth/crowdin/");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "abc");
    }

    #[test]
    fn states_are_random_hex() {
        let a = new_state();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, new_state());
    }

    #[test]
    fn recognizes_only_configured_scheme() {
        let config = CrowdinConfig::default();
        assert!(is_callback(&config, "poedit://auth/crowdin/?code=1"));
        assert!(!is_callback(&config, "poedit://open?file=x.po"));
        assert!(!is_callback(&config, "https://crowdin.com/"));
    }

    #[test]
    fn parses_code_callback() {
        let cb = parse_callback("poedit://auth/crowdin/?code=c0de&state=s1").unwrap();
        assert_eq!(cb.grant, Grant::Code("c0de".into()));
        assert_eq!(cb.state.as_deref(), Some("s1"));
    }

    #[test]
    fn parses_token_in_fragment() {
        let cb = parse_callback("poedit://auth/crowdin/#access_token=t0k&state=s2").unwrap();
        assert_eq!(cb.grant, Grant::AccessToken("t0k".into()));
        assert_eq!(cb.state.as_deref(), Some("s2"));
    }

    #[test]
    fn error_callback_fails() {
        let err = parse_callback("poedit://auth/crowdin/?error=access_denied&error_description=User+declined")
            .unwrap_err();
        assert_eq!(err.to_string(), "authorization failed: User declined");
    }

    #[test]
    fn empty_callback_fails() {
        assert!(parse_callback("poedit://auth/crowdin/").is_err());
    }

    #[test]
    fn token_response_needs_access_token() {
        let ok = serde_json::json!({"access_token": "abc", "token_type": "bearer"});
        assert_eq!(access_token_from(&ok).unwrap(), "abc");
        assert!(access_token_from(&serde_json::json!({})).is_err());
    }
}
