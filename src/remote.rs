//! Blocking HTTP client for the hosted backend (REST tables + auth).
//!
//! Calls are fire-and-await with the transport's default timeouts and no
//! automatic retry; a failed call surfaces as an error for the caller to
//! translate into a user-facing message.
use crate::config::BackendConfig;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    agent: ureq::Agent,
}

impl SupabaseClient {
    pub fn new(backend: &BackendConfig) -> Self {
        // Non-2xx responses are read as normal responses so their bodies can be logged.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            base_url: backend.url.trim_end_matches('/').to_string(),
            anon_key: backend.anon_key.clone(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body, discarding any response payload.
    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &T,
        bearer: Option<&str>,
        prefer: Option<&str>,
    ) -> Result<()> {
        let url = self.endpoint(path);
        let mut request = self
            .agent
            .post(&url)
            .header("apikey", self.anon_key.as_str())
            .header(
                "Authorization",
                format!("Bearer {}", bearer.unwrap_or(&self.anon_key)),
            );
        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let start = Instant::now();
        let mut response = request
            .send_json(body)
            .with_context(|| format!("POST {path}"))?;
        let status = response.status();
        tracing::info!(
            path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "backend POST complete"
        );
        if !status.is_success() {
            let detail = response.body_mut().read_to_string().unwrap_or_default();
            return Err(anyhow!("POST {path} returned {status}: {}", detail.trim()));
        }
        Ok(())
    }

    /// GET a JSON document on behalf of the bearer token's user.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str, bearer: &str) -> Result<T> {
        let url = self.endpoint(path);
        let start = Instant::now();
        let mut response = self
            .agent
            .get(&url)
            .header("apikey", self.anon_key.as_str())
            .header("Authorization", format!("Bearer {bearer}"))
            .call()
            .with_context(|| format!("GET {path}"))?;
        let status = response.status();
        tracing::info!(
            path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "backend GET complete"
        );
        if !status.is_success() {
            let detail = response.body_mut().read_to_string().unwrap_or_default();
            return Err(anyhow!("GET {path} returned {status}: {}", detail.trim()));
        }
        response
            .body_mut()
            .read_json::<T>()
            .with_context(|| format!("decode GET {path} response"))
    }
}
