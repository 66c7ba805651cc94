//! Credential issuance.

use crate::canonical::canonical_bytes;
use crate::error::IssueError;
use tracing::info;
use vouch_crypto::{hmac_sha256, random_credential_id, SigningKey};
use vouch_types::{
    Applicant, Credential, CredentialStatus, LoanId, LoanTerms, Timestamp,
};

/// Default guarantors required to complete a credential.
pub const DEFAULT_GUARANTORS_REQUIRED: u32 = 3;

/// Default credential lifetime: 7 days.
pub const DEFAULT_EXPIRY_SECS: u64 = 7 * vouch_types::time::SECS_PER_DAY;

/// Issuance options with spec defaults.
#[derive(Clone, Copy, Debug)]
pub struct IssueOptions {
    /// Credential lifetime in seconds from issuance.
    pub expiry_secs: u64,
    /// Number of guarantor approvals needed for completion.
    pub guarantors_required: u32,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            expiry_secs: DEFAULT_EXPIRY_SECS,
            guarantors_required: DEFAULT_GUARANTORS_REQUIRED,
        }
    }
}

/// Builds and signs credentials from a loan/applicant snapshot.
pub struct Issuer {
    key: SigningKey,
}

impl Issuer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Issue a fresh credential for the given loan and applicant snapshot.
    ///
    /// Validates required fields, assigns a collision-resistant id, and
    /// signs the canonical field subset with the server key. Any later
    /// alteration of a canonical field makes verification fail.
    pub fn issue(
        &self,
        loan_id: LoanId,
        applicant: Applicant,
        terms: LoanTerms,
        options: IssueOptions,
        now: Timestamp,
    ) -> Result<Credential, IssueError> {
        validate_snapshot(&loan_id, &applicant, &terms)?;
        if options.guarantors_required == 0 {
            return Err(IssueError::InvalidOption("guarantors_required must be >= 1"));
        }
        if options.expiry_secs == 0 {
            return Err(IssueError::InvalidOption("expiry_secs must be > 0"));
        }

        let id = random_credential_id();
        let issued_at = now;
        let expires_at = now.plus_secs(options.expiry_secs);

        let bytes = canonical_bytes(&id, &loan_id, &applicant, &terms, issued_at, expires_at);
        let signature = hex::encode(hmac_sha256(&self.key, &bytes));

        info!(credential = %id, loan = %loan_id, expires_at = %expires_at, "issued credential");

        Ok(Credential {
            id,
            loan_id,
            applicant,
            loan: terms,
            signature,
            issued_at,
            expires_at,
            status: CredentialStatus::Active,
            scan_count: 0,
            guarantors_found: 0,
            guarantors_required: options.guarantors_required,
            actions: Vec::new(),
        })
    }
}

fn validate_snapshot(
    loan_id: &LoanId,
    applicant: &Applicant,
    terms: &LoanTerms,
) -> Result<(), IssueError> {
    if !loan_id.is_valid() {
        return Err(IssueError::MissingField("loanId"));
    }
    if applicant.name.trim().is_empty() {
        return Err(IssueError::MissingField("applicantName"));
    }
    if applicant.phone.trim().is_empty() {
        return Err(IssueError::MissingField("applicantPhone"));
    }
    if terms.amount_minor == 0 {
        return Err(IssueError::MissingField("loanAmount"));
    }
    if terms.currency.trim().is_empty() {
        return Err(IssueError::MissingField("loanCurrency"));
    }
    if terms.tenure_months == 0 {
        return Err(IssueError::MissingField("loanTenure"));
    }
    if terms.monthly_repayment_minor == 0 {
        return Err(IssueError::MissingField("monthlyRepayment"));
    }
    if terms.total_repayment_minor == 0 {
        return Err(IssueError::MissingField("totalRepayment"));
    }
    if terms.purpose.trim().is_empty() {
        return Err(IssueError::MissingField("purpose"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> Issuer {
        Issuer::new(SigningKey::new(b"issuer-secret".to_vec()))
    }

    fn sample_terms() -> LoanTerms {
        LoanTerms {
            amount_minor: 50_000_000,
            currency: "NGN".into(),
            tenure_months: 12,
            interest_rate_bps: 1000,
            monthly_repayment_minor: 4_583_300,
            total_repayment_minor: 55_000_000,
            purpose: "Business expansion".into(),
        }
    }

    #[test]
    fn issue_sets_defaults() {
        let cred = issuer()
            .issue(
                LoanId::new("LOAN-TEST"),
                Applicant::new("John Doe", "+2348012345678"),
                sample_terms(),
                IssueOptions::default(),
                Timestamp::new(1_000_000),
            )
            .unwrap();
        assert_eq!(cred.status, CredentialStatus::Active);
        assert_eq!(cred.guarantors_required, 3);
        assert_eq!(cred.guarantors_found, 0);
        assert_eq!(cred.scan_count, 0);
        assert_eq!(
            cred.expires_at.as_secs(),
            1_000_000 + 7 * vouch_types::time::SECS_PER_DAY
        );
        assert!(cred.expires_at > cred.issued_at);
        assert!(cred.id.is_valid());
        assert!(cred.actions.is_empty());
    }

    #[test]
    fn fresh_ids_every_issue() {
        let iss = issuer();
        let a = iss
            .issue(
                LoanId::new("LOAN-A"),
                Applicant::new("A", "1"),
                sample_terms(),
                IssueOptions::default(),
                Timestamp::new(1),
            )
            .unwrap();
        let b = iss
            .issue(
                LoanId::new("LOAN-A"),
                Applicant::new("A", "1"),
                sample_terms(),
                IssueOptions::default(),
                Timestamp::new(1),
            )
            .unwrap();
        assert_ne!(a.id, b.id);
        // Same snapshot, different id: signatures must differ too.
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn missing_fields_rejected() {
        let err = issuer()
            .issue(
                LoanId::new("LOAN-TEST"),
                Applicant::new("", "+234"),
                sample_terms(),
                IssueOptions::default(),
                Timestamp::new(1),
            )
            .unwrap_err();
        assert!(matches!(err, IssueError::MissingField("applicantName")));

        let mut terms = sample_terms();
        terms.amount_minor = 0;
        let err = issuer()
            .issue(
                LoanId::new("LOAN-TEST"),
                Applicant::new("John", "+234"),
                terms,
                IssueOptions::default(),
                Timestamp::new(1),
            )
            .unwrap_err();
        assert!(matches!(err, IssueError::MissingField("loanAmount")));
    }

    #[test]
    fn zero_guarantors_rejected() {
        let err = issuer()
            .issue(
                LoanId::new("LOAN-TEST"),
                Applicant::new("John", "+234"),
                sample_terms(),
                IssueOptions {
                    guarantors_required: 0,
                    ..Default::default()
                },
                Timestamp::new(1),
            )
            .unwrap_err();
        assert!(matches!(err, IssueError::InvalidOption(_)));
    }
}
