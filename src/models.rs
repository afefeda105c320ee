// src/models.rs
use serde::{Deserialize, Serialize};

/// Body of `POST /compile`. A missing `code` field is treated as empty.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CompileRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Success,
    Error,
}

/// The final answer for one compile request, ready for the transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResponse {
    pub output: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip)]
    pub http_status: u16,
}

impl ClassifiedResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            kind: ResponseKind::Success,
            http_status: 200,
        }
    }

    pub fn client_error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            kind: ResponseKind::Error,
            http_status: 400,
        }
    }

    pub fn server_error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            kind: ResponseKind::Error,
            http_status: 500,
        }
    }
}
