//! Services and their rpcs.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::location::RSElementLocation;
use crate::option::RSOptions;
use crate::value::{Language, RSDeclarationUrl, StreamableRSTypeUrl};

/// An rpc service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSService {
    /// Service name.
    pub name: String,
    /// Declared rpcs.
    pub rpcs: Vec<RSRpc>,
    /// Options applied to the service.
    pub options: RSOptions,
    /// Declaration url.
    pub type_url: RSDeclarationUrl,
    /// Declaration site.
    pub location: RSElementLocation,
}

/// One method of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RSRpc {
    /// Name exactly as declared. Generators adapt it with
    /// [`RSRpc::language_specific_name`] but must keep the declared form in
    /// any metadata they emit.
    pub name: String,
    /// Client to server payload.
    pub request_type: StreamableRSTypeUrl,
    /// Server to client payload.
    pub response_type: StreamableRSTypeUrl,
    /// Options applied to the rpc.
    pub options: RSOptions,
    /// Doc comment.
    pub documentation: String,
    /// Declaration site.
    pub location: RSElementLocation,
}

impl RSService {
    /// Rpc with the given declared name.
    pub fn rpc(&self, name: &str) -> Option<&RSRpc> { self.rpcs.iter().find(|rpc| rpc.name == name) }
}

fn word_boundary() -> Option<&'static Regex> {
    static WORD_BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
    WORD_BOUNDARY.get_or_init(|| Regex::new("([a-z])([A-Z])").ok()).as_ref()
}

impl RSRpc {
    /// Creates a request/response rpc.
    pub fn new(
        name: impl Into<String>,
        request: RSDeclarationUrl,
        response: RSDeclarationUrl,
    ) -> Self {
        Self {
            name: name.into(),
            request_type: StreamableRSTypeUrl::single(request),
            response_type: StreamableRSTypeUrl::single(response),
            ..Self::default()
        }
    }

    /// Name adapted to the naming convention of `language`.
    pub fn language_specific_name(&self, language: Language) -> String {
        match language {
            Language::Java | Language::Kotlin | Language::Python | Language::Go => {
                let mut chars = self.name.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            Language::Php | Language::Ruby => match word_boundary() {
                Some(boundary) => boundary.replace_all(&self.name, "${1}_${2}").to_lowercase(),
                None => self.name.to_lowercase(),
            },
            Language::CSharp => {
                let mut chars = self.name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Neither side streams.
    pub fn is_request_response(&self) -> bool {
        !self.request_type.is_streaming && !self.response_type.is_streaming
    }

    /// Single request, streamed response.
    pub fn is_request_stream(&self) -> bool {
        !self.request_type.is_streaming && self.response_type.is_streaming
    }

    /// Both sides stream.
    pub fn is_request_channel(&self) -> bool {
        self.request_type.is_streaming && self.response_type.is_streaming
    }

    /// Request with a payload, acknowledged without one.
    pub fn is_fire_and_forget(&self) -> bool {
        self.request_type.type_url != RSDeclarationUrl::ACK
            && self.response_type.type_url == RSDeclarationUrl::ACK
    }

    /// Neither side carries a payload.
    pub fn is_metadata_push(&self) -> bool {
        self.request_type.type_url == RSDeclarationUrl::ACK
            && self.response_type.type_url == RSDeclarationUrl::ACK
    }
}
