use warrant_identity::IdentityError;

/// Failure taxonomy of the delegation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DelegationError {
    /// The presentation failed cryptographic verification.
    #[error("invalid verifiable presentation: {0}")]
    InvalidPresentation(String),

    /// A required embedded credential or type tag is absent.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The policy engine returned deny. Carries no policy detail.
    #[error("access delegation credential is not valid or has been revoked")]
    AuthorizationDenied,

    /// The delegated resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The secure envelope could not be unpacked.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A collaborator could not be reached or answered with garbage.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl DelegationError {
    /// Short machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPresentation(_) => "INVALID_PRESENTATION",
            Self::MissingCredential(_) => "MISSING_CREDENTIAL",
            Self::AuthorizationDenied => "AUTHORIZATION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::MalformedMessage(_) => "MALFORMED_MESSAGE",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
        }
    }

    /// Log a collaborator failure with its full cause. Other variants pass through unlogged.
    pub(crate) fn log_upstream(self, operation: &'static str) -> Self {
        if let Self::UpstreamUnavailable(cause) = &self {
            tracing::error!(operation, cause = %cause, "collaborator unavailable");
        }
        self
    }
}

impl From<IdentityError> for DelegationError {
    fn from(err: IdentityError) -> Self {
        Self::UpstreamUnavailable(format!("identity service: {}", err))
    }
}
