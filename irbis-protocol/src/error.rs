//! Protocol error types and the server return-code table.

use thiserror::Error;

/// Errors raised while encoding a request or interpreting a response.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("text cannot be represented in {encoding}: {text:?}")]
    Encoding { encoding: &'static str, text: String },

    #[error("bytes are not valid {encoding}")]
    Decoding { encoding: &'static str },

    #[error("expected an integer, got {0:?}")]
    InvalidInteger(String),

    #[error("server error {code}: {message}")]
    Server { code: i32, message: &'static str },

    #[error("malformed {what}: {line:?}")]
    Malformed { what: &'static str, line: String },
}

impl ProtocolError {
    /// Builds a `Server` error for the given return code.
    pub fn server(code: i32) -> Self {
        ProtocolError::Server {
            code,
            message: describe_return_code(code),
        }
    }

    /// Returns the server return code if this is a `Server` error.
    pub fn server_code(&self) -> Option<i32> {
        match self {
            ProtocolError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the error indicates a framing or version mismatch rather than
    /// a rejection by the server.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ProtocolError::Decoding { .. }
                | ProtocolError::InvalidInteger(_)
                | ProtocolError::Malformed { .. }
        )
    }
}

/// Message for non-negative return codes.
pub const NORMAL_COMPLETION: &str = "Normal completion";

/// Message for negative return codes missing from the table.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Returns the human-readable description of a server return code.
///
/// Non-negative codes are not looked up and always describe success.
pub fn describe_return_code(code: i32) -> &'static str {
    if code >= 0 {
        return NORMAL_COMPLETION;
    }

    match code {
        -100 => "Given MFN is outside the database range",
        -101 => "Invalid shelf size",
        -102 => "Invalid shelf number",
        -140 => "MFN is outside the database range",
        -141 => "Read error",
        -200 => "Field is absent",
        -201 => "Previous version of the record is absent",
        -202 => "Term not found",
        -203 => "Last term in the list",
        -204 => "First term in the list",
        -300 => "Database is exclusively locked",
        -301 => "Database is exclusively locked",
        -400 => "Error opening MST or XRF file (data file error)",
        -401 => "Error opening IFP file (index file error)",
        -402 => "Write error",
        -403 => "Actualization error",
        -600 => "Record is logically deleted",
        -601 => "Record is physically deleted",
        -602 => "Record is locked for input",
        -603 => "Record is logically deleted",
        -605 => "Record is physically deleted",
        -607 => "autoin.gbl error",
        -608 => "Record version error",
        -700 => "Backup creation error",
        -701 => "Backup restore error",
        -702 => "Sort error",
        -703 => "Invalid term",
        -704 => "Dictionary creation error",
        -705 => "Dictionary load error",
        -800 => "Global correction parameter error",
        -801 => "Global correction error (ERR_GBL_REP)",
        -802 => "Global correction error (ERR_GBL_MET)",
        -1111 => "Server execution error (SERVER_EXECUTE_ERROR)",
        -2222 => "Protocol error (WRONG_PROTOCOL)",
        -3333 => "Unregistered client (client is not in the list)",
        -3334 => "Client is not logged in (client is not in use)",
        -3335 => "Invalid client identifier",
        -3336 => "Workstation has no access to the command",
        -3337 => "Client already registered",
        -3338 => "Client is not allowed",
        -4444 => "Invalid password",
        -5555 => "File does not exist",
        -6666 => "Server overloaded: maximum number of processing threads reached",
        -7777 => "Failed to start or stop the administrator thread (process error)",
        -8888 => "General error",
        _ => UNKNOWN_ERROR,
    }
}
