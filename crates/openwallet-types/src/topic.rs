//! Logical message topics and request → result routing.
//!
//! Payloads are JSON-encoded [`Transaction`](crate::Transaction) records.
//! Each request topic has exactly one result topic; a distribution run
//! additionally emits one message per member on
//! [`Topic::DistributionResultMember`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transaction::TransactionKind;

/// A logical broker topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    TopUpRequest,
    TopUpResult,
    DeductRequest,
    DeductResult,
    DistributionRequest,
    DistributionResult,
    /// One message per affected member of a distribution run.
    DistributionResultMember,
}

impl Topic {
    /// The wire name of this topic.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::TopUpRequest => "topup.request",
            Self::TopUpResult => "topup.result",
            Self::DeductRequest => "deduct.request",
            Self::DeductResult => "deduct.result",
            Self::DistributionRequest => "distribution.request",
            Self::DistributionResult => "distribution.result",
            Self::DistributionResultMember => "distribution.result.member",
        }
    }

    /// Parse a wire topic name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "topup.request" => Some(Self::TopUpRequest),
            "topup.result" => Some(Self::TopUpResult),
            "deduct.request" => Some(Self::DeductRequest),
            "deduct.result" => Some(Self::DeductResult),
            "distribution.request" => Some(Self::DistributionRequest),
            "distribution.result" => Some(Self::DistributionResult),
            "distribution.result.member" => Some(Self::DistributionResultMember),
            _ => None,
        }
    }

    /// The result topic a processed request is answered on, if this is a
    /// request topic.
    #[must_use]
    pub fn result_topic(self) -> Option<Self> {
        match self {
            Self::TopUpRequest => Some(Self::TopUpResult),
            Self::DeductRequest => Some(Self::DeductResult),
            Self::DistributionRequest => Some(Self::DistributionResult),
            _ => None,
        }
    }

    /// The transaction kind carried on this request topic.
    #[must_use]
    pub fn request_kind(self) -> Option<TransactionKind> {
        match self {
            Self::TopUpRequest => Some(TransactionKind::TopUp),
            Self::DeductRequest => Some(TransactionKind::Payment),
            Self::DistributionRequest => Some(TransactionKind::Distribution),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
