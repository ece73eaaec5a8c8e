//! Response bodies for messages and errors.
//!
//! Failures carry a single `msg`, except validation failures which list every
//! offending field under `errors`.

use serde::{Deserialize, Serialize};

/// `{"msg": "..."}` body used for confirmations and most errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }

    pub fn server_error() -> Self {
        Self::new("Server Error")
    }
}

/// One rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
    pub location: String,
}

impl FieldError {
    pub fn body(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
            location: "body".to_string(),
        }
    }
}

/// `{"errors": [...]}` body returned with 400 Bad Request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}
