//! INSS social-security contributions.
//!
//! Both the employee and the employer contribute a fraction of taxable gross,
//! optionally limited by a contribution ceiling.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Which side of the employment relationship a contribution belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InssParty {
    /// The employee's share, withheld from pay.
    Employee,
    /// The employer's share, added to employment cost.
    Employer,
}

impl InssParty {
    fn rule_id(&self) -> &'static str {
        match self {
            InssParty::Employee => "inss_employee",
            InssParty::Employer => "inss_employer",
        }
    }

    fn rule_name(&self) -> &'static str {
        match self {
            InssParty::Employee => "INSS Employee Contribution",
            InssParty::Employer => "INSS Employer Contribution",
        }
    }
}

/// The result of an INSS contribution calculation.
#[derive(Debug, Clone)]
pub struct InssContributionResult {
    /// The contribution, un-rounded and after any cap.
    pub amount: Decimal,
    /// Whether the cap reduced the contribution.
    pub capped: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns `min(base * rate, cap)`, or `base * rate` when there is no cap.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::inss_amount;
/// use rust_decimal::Decimal;
///
/// let base = Decimal::new(200_000, 0);
/// assert_eq!(inss_amount(base, Decimal::new(3, 2), None)?, Decimal::new(6_000, 0));
/// assert_eq!(
///     inss_amount(base, Decimal::new(3, 2), Some(Decimal::new(5_000, 0)))?,
///     Decimal::new(5_000, 0)
/// );
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn inss_amount(base: Decimal, rate: Decimal, cap: Option<Decimal>) -> EngineResult<Decimal> {
    let amount = base
        .checked_mul(rate)
        .ok_or_else(|| EngineError::overflow("inss"))?;
    Ok(match cap {
        Some(cap) => amount.min(cap),
        None => amount,
    })
}

/// Calculates an INSS contribution and records an audit step.
pub fn calculate_inss(
    party: InssParty,
    base: Decimal,
    rate: Decimal,
    cap: Option<Decimal>,
    step_number: u32,
) -> EngineResult<InssContributionResult> {
    let uncapped = base
        .checked_mul(rate)
        .ok_or_else(|| EngineError::overflow(party.rule_id()))?;
    let amount = match cap {
        Some(cap) => uncapped.min(cap),
        None => uncapped,
    };
    let capped = amount < uncapped;

    let reasoning = if capped {
        format!(
            "{} x {} = {}, capped at {}",
            base.normalize(),
            rate.normalize(),
            uncapped.normalize(),
            amount.normalize()
        )
    } else {
        format!(
            "{} x {} = {}",
            base.normalize(),
            rate.normalize(),
            amount.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: party.rule_id().to_string(),
        rule_name: party.rule_name().to_string(),
        input: serde_json::json!({
            "taxable_gross": base.normalize().to_string(),
            "rate": rate.normalize().to_string(),
            "cap": cap.map(|c| c.normalize().to_string())
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string(),
            "capped": capped
        }),
        reasoning,
    };

    Ok(InssContributionResult {
        amount,
        capped,
        audit_step,
    })
}
