//! Magic-link redirect parsing.
//!
//! The identity service redirects back with its result in the URL fragment
//! (`#access_token=...` or `#error=...&error_code=otp_expired`). Some flows put
//! errors in the query string instead, so both are read, fragment first.
use anyhow::{Context, Result};
use url::Url;

const ERROR_PARAMS: [&str; 3] = ["error", "error_code", "error_description"];
const TOKEN_PARAMS: [&str; 5] = [
    "access_token",
    "refresh_token",
    "expires_at",
    "expires_in",
    "token_type",
];

/// Tokens carried by a successful redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<u64>,
}

/// Parsed outcome of a redirect back from the identity service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRedirect {
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub description: Option<String>,
    pub tokens: Option<RedirectTokens>,
}

impl AuthRedirect {
    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.error_code.is_some()
    }

    pub fn is_expired_link(&self) -> bool {
        self.error_code.as_deref() == Some("otp_expired")
            || self
                .description
                .as_deref()
                .map(|text| text.to_ascii_lowercase().contains("expired"))
                .unwrap_or(false)
    }
}

pub fn parse_redirect(raw: &str) -> Result<AuthRedirect> {
    let url = Url::parse(raw.trim()).with_context(|| format!("parse redirect URL {raw:?}"))?;
    let mut pairs: Vec<(String, String)> = url
        .fragment()
        .map(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    pairs.extend(url.query_pairs().into_owned());

    let lookup = |key: &str| {
        pairs
            .iter()
            .find(|(name, value)| name == key && !value.is_empty())
            .map(|(_, value)| value.clone())
    };

    let expires_at = lookup("expires_at").and_then(|value| value.parse::<u64>().ok());
    let tokens = lookup("access_token").map(|access_token| RedirectTokens {
        access_token,
        refresh_token: lookup("refresh_token"),
        expires_at,
    });

    Ok(AuthRedirect {
        error: lookup("error"),
        error_code: lookup("error_code"),
        description: lookup("error_description"),
        tokens,
    })
}

/// Remove auth result parameters so revisiting the URL does not replay them.
pub fn scrub_redirect_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("parse redirect URL {raw:?}"))?;
    let is_auth_param =
        |name: &str| ERROR_PARAMS.contains(&name) || TOKEN_PARAMS.contains(&name) || name == "type";

    let kept_query: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(name, _)| !is_auth_param(name))
        .collect();
    if kept_query.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept_query);
    }

    let kept_fragment: Vec<(String, String)> = url
        .fragment()
        .map(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .into_owned()
                .filter(|(name, _)| !is_auth_param(name))
                .collect()
        })
        .unwrap_or_default();
    if kept_fragment.is_empty() {
        url.set_fragment(None);
    } else {
        let fragment = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept_fragment)
            .finish();
        url.set_fragment(Some(&fragment));
    }
    Ok(url.to_string())
}
