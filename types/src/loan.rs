//! Loan-terms snapshot embedded in a credential.

use serde::{Deserialize, Serialize};

/// The loan terms shown to a guarantor, frozen at issuance.
///
/// Money is in integer minor units (e.g. kobo for NGN) and rates are in
/// basis points so the canonical signed encoding is deterministic across
/// platforms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// Principal amount in minor currency units.
    pub amount_minor: u64,
    /// ISO 4217 currency code, e.g. "NGN".
    pub currency: String,
    /// Repayment tenure in months.
    pub tenure_months: u32,
    /// Effective interest rate in basis points (750 = 7.5%).
    pub interest_rate_bps: u32,
    /// Monthly repayment in minor currency units.
    pub monthly_repayment_minor: u64,
    /// Total repayment in minor currency units.
    pub total_repayment_minor: u64,
    /// Free-form purpose statement, e.g. "Business expansion".
    pub purpose: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let terms = LoanTerms {
            amount_minor: 500_000_00,
            currency: "NGN".into(),
            tenure_months: 12,
            interest_rate_bps: 1000,
            monthly_repayment_minor: 45_833_00,
            total_repayment_minor: 550_000_00,
            purpose: "Business expansion".into(),
        };
        let json = serde_json::to_value(&terms).unwrap();
        assert!(json.get("amountMinor").is_some());
        assert!(json.get("interestRateBps").is_some());
    }
}
