//! Error types for the crate.

use crate::types::TradeOfferId;

/// An error occurred when working with a file.
#[derive(thiserror::Error, Debug)]
pub enum FileError {
    /// A filesystem error occurred.
    #[error("Filesystem error: {}", .0)]
    FileSystem(#[from] std::io::Error),
    /// An error occurred parsing the file contents.
    #[error("Error parsing file contents: {}", .0)]
    Parse(#[from] serde_json::Error),
}

/// Any error that can occur when reconciling inventories or composing trades.
///
/// Variants split into three classes. Transient transport failures are
/// detected with [`Error::is_transient`] and retried by callers. Terminal
/// business conditions (private profiles, escrow holds, shortfalls) surface
/// to the customer and are never retried. Everything else is unexpected and
/// logged at error level.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An invalid parameter was supplied.
    #[error("Invalid parameter: {}", .0)]
    Parameter(&'static str),
    /// An unexpected response was received.
    #[error("Unexpected response: {}", .0)]
    Response(String),
    /// An error occurred making a request.
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    /// An error occurred in the request middleware.
    #[error("Request middleware error: {}", .0)]
    ReqwestMiddleware(anyhow::Error),
    /// An error occurred parsing a response.
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    /// The response returned an HTTP error status.
    #[error("Error {}", .0)]
    Http(reqwest::StatusCode),
    /// Steam rejected a trade offer. The inner error carries the EResult
    /// classification parsed from the response.
    #[error("Trade error: {}", .0)]
    Trade(TradeOfferError),
    /// An error occurred reading or writing a data file.
    #[error("{}", .0)]
    File(#[from] FileError),
    /// The profile yielded no badge data. Usually means the profile is
    /// private.
    #[error("Profile yielded no badge data")]
    EmptyProfile,
    /// The inventory could not be read because the profile is private.
    #[error("Inventory is private")]
    PrivateInventory,
    /// The trade partner is not available to trade.
    #[error("Partner is not available to trade")]
    NotAvailableToTrade,
    /// Sending the offer would place it on hold. Held offers are refused,
    /// never queued.
    #[error("Trade would be held in escrow for {} day(s)", .0)]
    EscrowHold(u32),
    /// The bot does not hold enough sets to fill the request.
    #[error("Have {available} set(s), need {needed}")]
    MissingSets {
        available: u32,
        needed: u32,
    },
    /// The bot does not hold enough keys to fill the request.
    #[error("Have {available} key(s), need {needed}")]
    MissingKeys {
        available: u32,
        needed: u32,
    },
    /// The customer does not hold enough complete sets for the trade.
    #[error("Customer has {available} set(s), trade needs {needed}")]
    CustomerMissingSets {
        available: u32,
        needed: u32,
    },
    /// The customer does not hold enough keys for the trade.
    #[error("Customer has {available} key(s), trade needs {needed}")]
    CustomerMissingKeys {
        available: u32,
        needed: u32,
    },
    /// No confirmation exists for the given offer.
    #[error("No confirmation for offer {}", .0)]
    NoConfirmationForOffer(TradeOfferId),
}

impl Error {
    /// Whether this error is a short-lived transport failure worth retrying
    /// after a delay. Timeouts, connection resets and 5xx responses qualify;
    /// business conditions never do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Reqwest(error) => error.is_timeout() || error.is_connect(),
            Self::Http(status) => status.is_server_error(),
            _ => false,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Error::ReqwestMiddleware(e),
        }
    }
}

/// An error related to a trade offer, parsed out of Steam's response
/// messages. Steam appends the EResult code to failure messages in
/// parentheses.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TradeOfferError {
    /// A message that did not carry a known EResult code.
    #[error("{}", .0)]
    Unknown(String),
    /// An EResult code with no specific mapping.
    #[error("EResult {}", .0)]
    UnknownEResult(i32),
    #[error("Fail")]
    Fail,
    #[error("InvalidState")]
    InvalidState,
    #[error("AccessDenied")]
    AccessDenied,
    #[error("Timeout")]
    Timeout,
    #[error("ServiceUnavailable")]
    ServiceUnavailable,
    /// The account has sent too many trade offers. Surfaces to the customer
    /// as a rate-limit message; never retried.
    #[error("LimitExceeded")]
    LimitExceeded,
    #[error("AlreadyRedeemed")]
    AlreadyRedeemed,
}

impl TradeOfferError {
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::Fail,
            11 => Self::InvalidState,
            15 => Self::AccessDenied,
            16 => Self::Timeout,
            20 => Self::ServiceUnavailable,
            25 | 26 => Self::LimitExceeded,
            28 => Self::AlreadyRedeemed,
            _ => Self::UnknownEResult(code),
        }
    }
}

impl From<&str> for TradeOfferError {
    fn from(message: &str) -> Self {
        // The code is the last word of the message, wrapped in parentheses.
        if let Some(code) = message.trim().split(' ').next_back() {
            let mut chars = code.chars();

            if chars.next() != Some('(') {
                return Self::Unknown(message.into());
            }

            if chars.next_back() != Some(')') {
                return Self::Unknown(message.into());
            }

            if let Ok(code) = chars.as_str().parse::<i32>() {
                return Self::from_code(code);
            }
        }

        Self::Unknown(message.into())
    }
}
