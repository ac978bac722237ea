//! Remote status classification.
//!
//! The verification endpoint reports ticket state as a free-form status
//! string. The classifier maps it onto a closed set of outcome categories;
//! there is no "unknown" escape hatch, every input lands in exactly one
//! category.

/// Status strings used by the remote authority, matched exactly.
///
/// These values are the contract with the remote side and are case-sensitive.
const STATUS_CONFIRMED: &str = "Confirmado";
const STATUS_CANCELLED: &str = "Cancelado";
const STATUS_PREPAID: &str = "Pagamento Antecipado";
const STATUS_ALREADY_USED: &str = "QR Code já foi utilizado para entrada.";

/// Outcome categories for a verification attempt.
///
/// Every attempt resolves to exactly one of these; unmapped remote statuses
/// fall back to [`OutcomeCategory::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    /// Ticket is valid; entry is allowed.
    Confirmed,
    /// Ticket was cancelled.
    Cancelled,
    /// Ticket was paid in advance of the event.
    PrepaidEarly,
    /// Code has already been used for entry.
    AlreadyUsed,
    /// No matching ticket.
    NotFound,
    /// The verification call itself failed.
    VerificationError,
}

/// Visual tone for presentation surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Idle, nothing noteworthy on screen.
    Neutral,
    /// Work in progress.
    Busy,
    /// Entry allowed.
    Success,
    /// Informational, entry allowed with a remark.
    Notice,
    /// Needs operator attention.
    Warning,
    /// Entry denied or verification failed.
    Danger,
}

/// Map the remote status text to an outcome category.
///
/// Total over all inputs: matching is exact and case-sensitive, and any
/// unmapped value (including the empty string) is `NotFound`.
#[must_use]
pub fn classify(remote_status: &str) -> OutcomeCategory {
    match remote_status {
        STATUS_CONFIRMED => OutcomeCategory::Confirmed,
        STATUS_CANCELLED => OutcomeCategory::Cancelled,
        STATUS_PREPAID => OutcomeCategory::PrepaidEarly,
        STATUS_ALREADY_USED => OutcomeCategory::AlreadyUsed,
        _ => OutcomeCategory::NotFound,
    }
}

impl OutcomeCategory {
    /// Display title for the result card.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Confirmed => "Ticket confirmed",
            Self::Cancelled => "Ticket cancelled",
            Self::PrepaidEarly => "Prepaid ticket",
            Self::AlreadyUsed => "Already used",
            Self::NotFound => "Not found",
            Self::VerificationError => "Verification failed",
        }
    }

    /// One-line explanatory message for the operator.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Confirmed => "Entry confirmed, let the guest through.",
            Self::Cancelled => "This ticket was cancelled and is no longer valid.",
            Self::PrepaidEarly => "Paid in advance, entry is allowed.",
            Self::AlreadyUsed => "This code has already been used for entry.",
            Self::NotFound => "No matching ticket was found for this code.",
            Self::VerificationError => "Could not reach the ticket service, try again.",
        }
    }

    /// Visual tone of the result.
    #[must_use]
    pub fn tone(&self) -> Tone {
        match self {
            Self::Confirmed => Tone::Success,
            Self::PrepaidEarly => Tone::Notice,
            Self::AlreadyUsed => Tone::Warning,
            Self::Cancelled | Self::NotFound | Self::VerificationError => Tone::Danger,
        }
    }

    /// Returns true if the holder should be admitted.
    #[must_use]
    pub fn allows_entry(&self) -> bool {
        matches!(self, Self::Confirmed | Self::PrepaidEarly)
    }
}
