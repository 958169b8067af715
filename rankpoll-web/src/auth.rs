//! Identity gate for the results and admin surfaces
//!
//! An opaque equality check against a configured secret. An unconfigured
//! (absent or empty) secret refuses every attempt; there is no open-access
//! fallback because these gates protect destructive operations.

/// Secrets resolved at startup
#[derive(Debug, Clone, Default)]
pub struct GateSecrets {
    pub results_password: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
}

/// Verify a provided secret against the expected one
pub fn verify(provided: &str, expected: Option<&str>) -> bool {
    match expected {
        Some(secret) if !secret.is_empty() => provided == secret,
        _ => false,
    }
}
