//! GoldenGate Microservices REST control plane client.
//!
//! Commands are looked up by name in a [`CommandRegistry`], turned into a
//! URL below `services/v2/` and sent with basic auth or a client
//! certificate. Responses with status 200 or 201 are parsed as JSON.

mod http;
mod registry;
mod request;

pub use http::{
    Auth, ConnectionOverrides, ConnectionSettings, DEFAULT_REQUEST_TIMEOUT, RestControlPlane,
};
pub use registry::{CommandDef, CommandRegistry, HttpOp};
pub use request::{ADMIN_URL_PATH_PREFIX, build_url, lines_body, request_body};

use async_trait::async_trait;
use ggops_utils::error::ControlPlaneError;
use serde_json::Value;

/// Seam between the deployment workflow and the HTTP transport.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Run the named command.
    ///
    /// `arg` fills the `$url_arg` placeholder of the command's URL and
    /// `body` is sent as JSON. Returns the parsed response body, or
    /// `Value::Null` when the response has none.
    async fn call(
        &self,
        command: &str,
        arg: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, ControlPlaneError>;
}
