//! Billing-specific error types.
//!
//! # Taxonomy
//!
//! | Error | Kind | Retryable |
//! |-------|------|-----------|
//! | Configuration | bad price/duration on a membership type, halts computation | no |
//! | InvalidAmount | non-positive tender, split not summing to total | no |
//! | ClientNotFound / MembershipNotFound / MembershipTypeNotFound | caller error | no |
//! | NothingToSettle | settlement requested with no membership to receive it | no |
//! | ConcurrentModification | payment ledger changed between read and write | yes |
//! | ValidationFailed | malformed record | no |
//! | Infrastructure | storage failure | yes |
//!
//! No debt, zero debt and lapsed memberships are normal states and never
//! surface as errors.

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, MembershipId, MembershipTypeId, ValidationError,
};

/// Billing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// Membership type has an unusable price or period length.
    Configuration {
        membership_type_id: MembershipTypeId,
        reason: String,
    },

    /// Tendered amount or split breakdown is not acceptable.
    InvalidAmount { reason: String },

    /// Client missing from the supplied snapshot.
    ClientNotFound(ClientId),

    /// Membership missing from the supplied snapshot.
    MembershipNotFound(MembershipId),

    /// Membership type missing from the supplied snapshot.
    MembershipTypeNotFound(MembershipTypeId),

    /// There is no membership to attribute the payment to.
    NothingToSettle,

    /// The payment ledger of a membership changed since it was read.
    ConcurrentModification(MembershipId),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BillingError {
    pub fn configuration(membership_type_id: MembershipTypeId, reason: impl Into<String>) -> Self {
        BillingError::Configuration {
            membership_type_id,
            reason: reason.into(),
        }
    }

    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        BillingError::InvalidAmount {
            reason: reason.into(),
        }
    }

    pub fn client_not_found(id: ClientId) -> Self {
        BillingError::ClientNotFound(id)
    }

    pub fn membership_not_found(id: MembershipId) -> Self {
        BillingError::MembershipNotFound(id)
    }

    pub fn membership_type_not_found(id: MembershipTypeId) -> Self {
        BillingError::MembershipTypeNotFound(id)
    }

    pub fn concurrent_modification(id: MembershipId) -> Self {
        BillingError::ConcurrentModification(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::Configuration { .. } => ErrorCode::InvalidConfiguration,
            BillingError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            BillingError::ClientNotFound(_) => ErrorCode::ClientNotFound,
            BillingError::MembershipNotFound(_) => ErrorCode::MembershipNotFound,
            BillingError::MembershipTypeNotFound(_) => ErrorCode::MembershipTypeNotFound,
            BillingError::NothingToSettle => ErrorCode::NothingToSettle,
            BillingError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::Configuration {
                membership_type_id,
                reason,
            } => format!(
                "Membership type {} is misconfigured: {}",
                membership_type_id, reason
            ),
            BillingError::InvalidAmount { reason } => format!("Invalid amount: {}", reason),
            BillingError::ClientNotFound(id) => format!("Client not found: {}", id),
            BillingError::MembershipNotFound(id) => format!("Membership not found: {}", id),
            BillingError::MembershipTypeNotFound(id) => {
                format!("Membership type not found: {}", id)
            }
            BillingError::NothingToSettle => "No membership to settle against".to_string(),
            BillingError::ConcurrentModification(id) => {
                format!("Payments for membership {} changed concurrently", id)
            }
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the caller may retry the whole read-allocate-write cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::ConcurrentModification(_) | BillingError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        BillingError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidAmount => BillingError::InvalidAmount {
                reason: err.message,
            },
            ErrorCode::NothingToSettle => BillingError::NothingToSettle,
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => BillingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
