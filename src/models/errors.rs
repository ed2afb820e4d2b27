//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so that logs and API responses
//! can be correlated without leaking internal detail to clients.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - GEOCODE_xxx: geocoding collaborator failures
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Message safe to show to API clients.
    ///
    /// Geocoding failures are collapsed into one generic message; the
    /// detailed message stays in the logs.
    pub fn public_message(&self) -> String {
        if self.code.is_upstream() {
            "Delivery estimate unavailable".to_string()
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ============================================
    // Estimate Errors
    // ============================================
    /// Empty or missing address
    Validation,
    /// Geocoder returned no candidates
    GeocodeNotFound,
    /// Geocoder returned a non-success status or garbage
    GeocodeUpstream,
    /// Geocoder did not answer in time
    GeocodeTimeout,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Resource not found
    ApiNotFound,
    /// Request conflicts with current resource state
    ApiConflict,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::GeocodeNotFound => "GEOCODE_NOT_FOUND",
            Self::GeocodeUpstream => "GEOCODE_UPSTREAM",
            Self::GeocodeTimeout => "GEOCODE_TIMEOUT",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiNotFound => "API_NOT_FOUND",
            Self::ApiConflict => "API_CONFLICT",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation | Self::ApiBadRequest => 400,
            Self::ApiNotFound => 404,
            Self::ApiConflict => 409,
            Self::ApiRateLimited => 429,
            Self::GeocodeNotFound | Self::GeocodeUpstream | Self::GeocodeTimeout => 502,
            _ => 500,
        }
    }

    /// True for failures of the external geocoding collaborator
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::GeocodeNotFound | Self::GeocodeUpstream | Self::GeocodeTimeout
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Empty or missing input
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, msg)
    }

    /// Address resolved to zero candidates
    pub fn geocode_not_found(address: &str) -> Self {
        Self::new(
            ErrorCode::GeocodeNotFound,
            format!("No geocoding results for '{}'", address),
        )
    }

    /// Geocoder answered with an error or unusable payload
    pub fn geocode_upstream(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::GeocodeUpstream, msg)
    }

    /// Geocoder exceeded the lookup timeout
    pub fn geocode_timeout(timeout_ms: u64) -> Self {
        Self::new(
            ErrorCode::GeocodeTimeout,
            format!("Geocoding timed out after {}ms", timeout_ms),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Resource not found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiNotFound, msg)
    }

    /// State conflict
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiConflict, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: '{}'", key, value),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::GeocodeTimeout, "Geocoding request timeout")
        } else if err.is_connect() {
            Self::with_source(ErrorCode::GeocodeUpstream, "Geocoder connection failed", err)
        } else {
            Self::with_source(ErrorCode::GeocodeUpstream, "Geocoder request failed", err)
        }
    }
}
