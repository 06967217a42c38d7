//! Request payloads sent to the rendering backend.

use serde::Serialize;

use rvid_models::VisualizationSettings;

/// Body forwarded to the backend's start endpoint.
///
/// `access_token`, when present, carries the TokenCipher output
/// (`hex(iv):hex(ciphertext)`), never the caller's plaintext credential.
#[derive(Debug, Clone, Serialize)]
pub struct StartJobPayload {
    pub repo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub settings: VisualizationSettings,
}
