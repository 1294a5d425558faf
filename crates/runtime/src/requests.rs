//! Operation requests and their validation schemas.
//!
//! Requests carry operator-typed strings; schema rules check shape before a
//! handler parses them into domain types. Amounts are checked at the maximum
//! supported precision here — the coin's own scale is only known after the
//! capability read, and the handler re-parses against it.

use crate::adapter::TransactionOutcome;
use bus::{Request, Schema, ValidationError};
use capability::{Amount, CoinCapabilities, EntityId, MAX_DECIMALS, Role};

fn check_entity(field_value: &str) -> Vec<ValidationError> {
    match field_value.parse::<EntityId>() {
        Ok(_) => Vec::new(),
        Err(e) => vec![ValidationError::new("invalid_entity_id", e.to_string())],
    }
}

fn check_amount(field_value: &str) -> Vec<ValidationError> {
    match Amount::parse(field_value, MAX_DECIMALS) {
        Ok(amount) if amount.is_zero() => vec![ValidationError::new(
            "invalid_amount",
            "amount must be greater than zero",
        )],
        Ok(_) => Vec::new(),
        Err(e) => vec![ValidationError::new("invalid_amount", e.to_string())],
    }
}

macro_rules! target_amount_request {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub token: String,
            pub target: String,
            pub amount: String,
        }

        impl Request for $name {
            type Response = TransactionOutcome;

            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn schema() -> Schema<Self> {
                Schema::new()
                    .rule("token", |r: &Self| check_entity(&r.token))
                    .rule("target", |r: &Self| check_entity(&r.target))
                    .rule("amount", |r: &Self| check_amount(&r.amount))
            }
        }
    };
}

macro_rules! target_request {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub token: String,
            pub target: String,
        }

        impl Request for $name {
            type Response = TransactionOutcome;

            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn schema() -> Schema<Self> {
                Schema::new()
                    .rule("token", |r: &Self| check_entity(&r.token))
                    .rule("target", |r: &Self| check_entity(&r.target))
            }
        }
    };
}

macro_rules! token_request {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub token: String,
        }

        impl Request for $name {
            type Response = TransactionOutcome;

            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn schema() -> Schema<Self> {
                Schema::new().rule("token", |r: &Self| check_entity(&r.token))
            }
        }
    };
}

target_amount_request! {
    /// Mint new supply into the treasury or a target account.
    CashInRequest
}

target_amount_request! {
    /// Remove supply from a target account without its consent.
    WipeRequest
}

target_request! {
    /// Block a target account from transacting with the coin.
    FreezeRequest
}

target_request! {
    /// Lift a previous freeze.
    UnfreezeRequest
}

token_request! {
    /// Suspend all transfers of the coin.
    PauseRequest
}

token_request! {
    /// Resume transfers after a pause.
    UnpauseRequest
}

token_request! {
    /// Permanently delete the coin.
    DeleteRequest
}

/// Destroy supply held by the treasury.
#[derive(Debug, Clone)]
pub struct BurnRequest {
    pub token: String,
    pub amount: String,
}

impl Request for BurnRequest {
    type Response = TransactionOutcome;

    fn type_name() -> &'static str {
        "BurnRequest"
    }

    fn schema() -> Schema<Self> {
        Schema::new()
            .rule("token", |r: &Self| check_entity(&r.token))
            .rule("amount", |r: &Self| check_amount(&r.amount))
    }
}

/// Move treasury supply back to the rescue account.
#[derive(Debug, Clone)]
pub struct RescueRequest {
    pub token: String,
    pub amount: String,
}

impl Request for RescueRequest {
    type Response = TransactionOutcome;

    fn type_name() -> &'static str {
        "RescueRequest"
    }

    fn schema() -> Schema<Self> {
        Schema::new()
            .rule("token", |r: &Self| check_entity(&r.token))
            .rule("amount", |r: &Self| check_amount(&r.amount))
    }
}

fn check_role_targets(targets: &[String]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if targets.is_empty() {
        errors.push(ValidationError::new("empty", "at least one target required"));
    }
    for (i, target) in targets.iter().enumerate() {
        errors.extend(check_entity(target));
        if targets[..i].contains(target) {
            errors.push(ValidationError::new(
                "duplicate_target",
                format!("target {target} listed more than once"),
            ));
        }
    }
    errors
}

/// Supply allowances are only meaningful for the cash-in role; for any other
/// role the amounts list must be absent. When present it pairs with targets
/// one to one.
fn check_role_amounts(role: Role, targets: &[String], amounts: &[String]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if role == Role::CashIn || !amounts.is_empty() {
        if amounts.len() != targets.len() {
            errors.push(ValidationError::new(
                "length_mismatch",
                format!("{} amounts for {} targets", amounts.len(), targets.len()),
            ));
        }
        for amount in amounts {
            errors.extend(check_amount(amount));
        }
    }
    errors
}

/// Grant a contract role to one or more accounts, with per-target cash-in
/// allowances when the role is cash-in.
#[derive(Debug, Clone)]
pub struct GrantRoleRequest {
    pub token: String,
    pub role: Role,
    pub targets: Vec<String>,
    pub amounts: Vec<String>,
}

impl Request for GrantRoleRequest {
    type Response = Vec<TransactionOutcome>;

    fn type_name() -> &'static str {
        "GrantRoleRequest"
    }

    fn schema() -> Schema<Self> {
        Schema::new()
            .rule("token", |r: &Self| check_entity(&r.token))
            .rule("targets", |r: &Self| check_role_targets(&r.targets))
            .rule("amounts", |r: &Self| {
                check_role_amounts(r.role, &r.targets, &r.amounts)
            })
    }
}

/// Revoke a contract role from one or more accounts.
#[derive(Debug, Clone)]
pub struct RevokeRoleRequest {
    pub token: String,
    pub role: Role,
    pub targets: Vec<String>,
}

impl Request for RevokeRoleRequest {
    type Response = Vec<TransactionOutcome>;

    fn type_name() -> &'static str {
        "RevokeRoleRequest"
    }

    fn schema() -> Schema<Self> {
        Schema::new()
            .rule("token", |r: &Self| check_entity(&r.token))
            .rule("targets", |r: &Self| check_role_targets(&r.targets))
    }
}

/// Read the active account's capabilities over a coin.
#[derive(Debug, Clone)]
pub struct GetCapabilitiesRequest {
    pub token: String,
}

impl Request for GetCapabilitiesRequest {
    type Response = CoinCapabilities;

    fn type_name() -> &'static str {
        "GetCapabilitiesRequest"
    }

    fn schema() -> Schema<Self> {
        Schema::new().rule("token", |r: &Self| check_entity(&r.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::validate;

    #[test]
    fn well_formed_cash_in_validates() {
        let request = CashInRequest {
            token: "0.0.100".into(),
            target: "0.0.300".into(),
            amount: "12.5".into(),
        };
        assert!(validate(&request).is_empty());
    }

    #[test]
    fn malformed_fields_each_get_reported() {
        let request = CashInRequest {
            token: "not-an-id".into(),
            target: "0.0.300".into(),
            amount: "-3".into(),
        };
        let failures = validate(&request);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].field, "token");
        assert_eq!(failures[0].errors[0].code, "invalid_entity_id");
        assert_eq!(failures[1].field, "amount");
        assert_eq!(failures[1].errors[0].code, "invalid_amount");
    }

    #[test]
    fn zero_amount_rejected() {
        let request = BurnRequest {
            token: "0.0.100".into(),
            amount: "0.00".into(),
        };
        let failures = validate(&request);
        assert_eq!(failures[0].errors[0].code, "invalid_amount");
    }

    #[test]
    fn cash_in_role_requires_paired_amounts() {
        let request = GrantRoleRequest {
            token: "0.0.100".into(),
            role: Role::CashIn,
            targets: vec!["0.0.1".into(), "0.0.2".into()],
            amounts: vec!["5".into()],
        };
        let failures = validate(&request);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "amounts");
        assert_eq!(failures[0].errors[0].code, "length_mismatch");
    }

    #[test]
    fn non_cash_in_role_needs_no_amounts() {
        let request = GrantRoleRequest {
            token: "0.0.100".into(),
            role: Role::Freeze,
            targets: vec!["0.0.1".into()],
            amounts: vec![],
        };
        assert!(validate(&request).is_empty());
    }

    #[test]
    fn stray_amounts_on_other_roles_must_still_pair() {
        let request = GrantRoleRequest {
            token: "0.0.100".into(),
            role: Role::Freeze,
            targets: vec!["0.0.1".into()],
            amounts: vec!["5".into(), "6".into()],
        };
        let failures = validate(&request);
        assert_eq!(failures[0].field, "amounts");
        assert_eq!(failures[0].errors[0].code, "length_mismatch");
    }

    #[test]
    fn duplicate_role_targets_rejected() {
        let request = RevokeRoleRequest {
            token: "0.0.100".into(),
            role: Role::Wipe,
            targets: vec!["0.0.1".into(), "0.0.1".into()],
        };
        let failures = validate(&request);
        assert_eq!(failures[0].field, "targets");
        assert_eq!(failures[0].errors[0].code, "duplicate_target");
    }

    #[test]
    fn empty_targets_rejected() {
        let request = RevokeRoleRequest {
            token: "0.0.100".into(),
            role: Role::Wipe,
            targets: vec![],
        };
        let failures = validate(&request);
        assert_eq!(failures[0].errors[0].code, "empty");
    }
}
