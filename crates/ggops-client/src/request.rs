//! URL and request body construction.

use camino::Utf8Path;
use ggops_utils::error::ControlPlaneError;
use reqwest::Url;
use serde_json::{Value, json};

use crate::registry::CommandDef;

/// Path prefix of the GoldenGate admin REST API.
pub const ADMIN_URL_PATH_PREFIX: &str = "services/v2";

const URL_ARG_PLACEHOLDERS: [&str; 2] = ["${url_arg}", "$url_arg"];

/// Resolve the URL of `command` against the endpoint base URL.
///
/// The URL is joined the way a browser resolves a relative link, so a base
/// URL path without trailing slash loses its last segment.
pub fn build_url(
    base_url: &str,
    name: &str,
    command: &CommandDef,
    arg: Option<&str>,
) -> Result<Url, ControlPlaneError> {
    let suffix = &command.url_suffix;
    let arg = arg.filter(|a| !a.is_empty());

    let substituted = match (suffix.contains('$'), arg) {
        (true, None) => {
            return Err(ControlPlaneError::MissingCommandArg {
                command: name.to_string(),
                url_suffix: suffix.clone(),
            });
        }
        (false, Some(arg)) => {
            return Err(ControlPlaneError::UnexpectedCommandArg {
                command: name.to_string(),
                arg: arg.to_string(),
            });
        }
        (true, Some(arg)) => URL_ARG_PLACEHOLDERS
            .iter()
            .fold(suffix.clone(), |acc, placeholder| acc.replace(placeholder, arg)),
        (false, None) => suffix.clone(),
    };

    let base = Url::parse(base_url).map_err(|e| {
        ControlPlaneError::Misconfiguration(format!("invalid endpoint url '{base_url}': {e}"))
    })?;
    let path = format!("{ADMIN_URL_PATH_PREFIX}/{}", substituted.trim_start_matches('/'));
    base.join(&path).map_err(|e| {
        ControlPlaneError::Misconfiguration(format!("cannot join '{path}' to '{base_url}': {e}"))
    })
}

/// Request body of a configuration file upload.
#[must_use]
pub fn lines_body(content: &str) -> Value {
    json!({ "lines": content.lines().collect::<Vec<_>>() })
}

/// Request body from either inline JSON or a file whose lines are sent as
/// `{"lines": [...]}`.
pub fn request_body(
    json_arg: Option<&str>,
    file_arg: Option<&Utf8Path>,
) -> Result<Option<Value>, ControlPlaneError> {
    match (json_arg, file_arg) {
        (Some(_), Some(_)) => Err(ControlPlaneError::ConflictingBody),
        (Some(raw), None) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| ControlPlaneError::InvalidBody(format!("not valid JSON: {e}"))),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(|content| Some(lines_body(&content)))
            .map_err(|e| ControlPlaneError::InvalidBody(format!("{path}: {e}"))),
        (None, None) => Ok(None),
    }
}
