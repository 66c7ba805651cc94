use proptest::prelude::*;

use vouch_credential::{CredentialPayload, IssueOptions, Issuer, Verifier};
use vouch_crypto::SigningKey;
use vouch_types::{Applicant, LoanId, LoanTerms, Timestamp};

fn key() -> SigningKey {
    SigningKey::new(b"prop-secret".to_vec())
}

prop_compose! {
    fn arb_terms()(
        amount in 1u64..1_000_000_000,
        tenure in 1u32..=60,
        rate in 0u32..10_000,
        monthly in 1u64..100_000_000,
        total in 1u64..1_000_000_000,
        purpose in "[A-Za-z ]{1,40}",
    ) -> LoanTerms {
        LoanTerms {
            amount_minor: amount,
            currency: "NGN".to_string(),
            tenure_months: tenure,
            interest_rate_bps: rate,
            monthly_repayment_minor: monthly,
            total_repayment_minor: total,
            purpose,
        }
    }
}

proptest! {
    /// For all valid snapshots, validate(encode(issue(snapshot))) succeeds
    /// and returns the input loan fields unchanged.
    #[test]
    fn issue_encode_validate_round_trip(
        terms in arb_terms(),
        name in "[A-Za-z ]{1,30}",
        phone in "\\+[0-9]{7,14}",
        now in 1u64..4_000_000_000,
    ) {
        let issuer = Issuer::new(key());
        let cred = issuer.issue(
            LoanId::new("LOAN-PROP"),
            Applicant::new(name.clone(), phone.clone()),
            terms.clone(),
            IssueOptions::default(),
            Timestamp::new(now),
        ).unwrap();

        let raw = CredentialPayload::from_credential(&cred).to_json();
        let view = Verifier::new(key()).validate(&raw, Timestamp::new(now)).unwrap();

        prop_assert_eq!(view.loan, terms);
        prop_assert_eq!(view.applicant.name, name);
        prop_assert_eq!(view.applicant.phone, phone);
        prop_assert_eq!(view.credential_id, cred.id);
    }

    /// Flipping any single byte of the hex signature breaks verification.
    #[test]
    fn corrupted_signature_never_validates(
        terms in arb_terms(),
        flip_pos in 0usize..64,
    ) {
        let issuer = Issuer::new(key());
        let cred = issuer.issue(
            LoanId::new("LOAN-PROP"),
            Applicant::new("Ada", "+2348000000000"),
            terms,
            IssueOptions::default(),
            Timestamp::new(1_000),
        ).unwrap();

        let mut payload = CredentialPayload::from_credential(&cred);
        let mut sig: Vec<char> = payload.signature.chars().collect();
        sig[flip_pos] = if sig[flip_pos] == '0' { '1' } else { '0' };
        payload.signature = sig.into_iter().collect();

        let result = Verifier::new(key()).validate(&payload.to_json(), Timestamp::new(1_000));
        prop_assert!(result.is_err());
    }
}
