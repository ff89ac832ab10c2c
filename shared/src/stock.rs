//! Stock accounting model
//!
//! The rules by which scale readings become net product weight, ledger rows
//! fold into running balances, and withdrawals are checked against available
//! stock. Everything here is a pure function of the rows it is handed:
//! balances are never cached, they are recomputed from the full ledger on
//! every call.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::models::{StockBalance, StockMovement};
use crate::types::MovementType;

/// Returnable box kinds tracked per client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Plastic,
    Wood,
}

impl fmt::Display for BoxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxKind::Plastic => f.write_str("plastic"),
            BoxKind::Wood => f.write_str("wood"),
        }
    }
}

/// Rejections produced by the accounting checks
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("box counts and box weights cannot be negative")]
    NegativeBoxInput,

    #[error("net product weight is negative ({0}); box weight exceeds total weight")]
    NegativeNetWeight(Decimal),

    #[error("insufficient stock of {product}: {available:.2} available, {requested:.2} requested")]
    InsufficientProduct {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("insufficient {kind} boxes: {available} available, {requested} requested")]
    InsufficientBoxes {
        kind: BoxKind,
        available: i64,
        requested: i64,
    },
}

/// Net product weight: gross scale reading minus the weight contributed by
/// returnable boxes. Missing box fields count as zero.
pub fn net_product_weight(
    total_weight: Decimal,
    plastic_box_count: Option<i32>,
    plastic_box_weight: Option<Decimal>,
    wood_box_count: Option<i32>,
    wood_box_weight: Option<Decimal>,
) -> Decimal {
    let plastic = Decimal::from(plastic_box_count.unwrap_or(0))
        * plastic_box_weight.unwrap_or(Decimal::ZERO);
    let wood =
        Decimal::from(wood_box_count.unwrap_or(0)) * wood_box_weight.unwrap_or(Decimal::ZERO);
    total_weight - plastic - wood
}

/// Derive the net product weight for a proposed movement, rejecting
/// negative box inputs and a negative result. A negative count or unit
/// weight would inflate the net weight above the scale reading. Applies to
/// deposits and withdrawals alike.
pub fn derive_product_weight(
    total_weight: Decimal,
    plastic_box_count: Option<i32>,
    plastic_box_weight: Option<Decimal>,
    wood_box_count: Option<i32>,
    wood_box_weight: Option<Decimal>,
) -> Result<Decimal, StockError> {
    if plastic_box_count.unwrap_or(0) < 0
        || wood_box_count.unwrap_or(0) < 0
        || plastic_box_weight.unwrap_or(Decimal::ZERO) < Decimal::ZERO
        || wood_box_weight.unwrap_or(Decimal::ZERO) < Decimal::ZERO
    {
        return Err(StockError::NegativeBoxInput);
    }
    let net = net_product_weight(
        total_weight,
        plastic_box_count,
        plastic_box_weight,
        wood_box_count,
        wood_box_weight,
    );
    if net < Decimal::ZERO {
        return Err(StockError::NegativeNetWeight(net));
    }
    Ok(net)
}

/// Fold a client's full ledger into its current stock position.
///
/// Each row contributes with sign +1 for `in` and -1 for `out`; missing box
/// counts are treated as zero. The sum is commutative, so row order does not
/// matter.
pub fn client_balance(movements: &[StockMovement]) -> StockBalance {
    let mut balance = StockBalance {
        total_weight: Decimal::ZERO,
        product_weight: Decimal::ZERO,
        plastic_boxes: 0,
        wood_boxes: 0,
    };

    for m in movements {
        let sign = m.movement_type.sign();
        let weight_sign = Decimal::from(sign);
        balance.total_weight += m.total_weight * weight_sign;
        balance.product_weight += m.product_weight * weight_sign;
        balance.plastic_boxes += i64::from(m.plastic_box_count.unwrap_or(0)) * sign;
        balance.wood_boxes += i64::from(m.wood_box_count.unwrap_or(0)) * sign;
    }

    balance
}

/// The same fold restricted to one product, summing net product weight only.
///
/// Products are bucketed by case-sensitive exact string equality; two
/// spellings of the same name are two separate stocks.
pub fn product_balance(movements: &[StockMovement], product: &str) -> Decimal {
    movements
        .iter()
        .filter(|m| m.product == product)
        .map(|m| m.product_weight * Decimal::from(m.movement_type.sign()))
        .sum()
}

/// Check a proposed withdrawal against the client's ledger.
///
/// `net_weight` is the already-derived net product weight of the request.
/// Equality with the available amount is allowed at every boundary; only
/// strict excess is rejected. Deposits skip these checks entirely.
pub fn check_withdrawal(
    movements: &[StockMovement],
    product: &str,
    net_weight: Decimal,
    plastic_box_count: Option<i32>,
    wood_box_count: Option<i32>,
) -> Result<(), StockError> {
    let available_product = product_balance(movements, product);
    if net_weight > available_product {
        return Err(StockError::InsufficientProduct {
            product: product.to_string(),
            available: available_product,
            requested: net_weight,
        });
    }

    let balance = client_balance(movements);
    let requested_plastic = i64::from(plastic_box_count.unwrap_or(0));
    if requested_plastic > balance.plastic_boxes {
        return Err(StockError::InsufficientBoxes {
            kind: BoxKind::Plastic,
            available: balance.plastic_boxes,
            requested: requested_plastic,
        });
    }
    let requested_wood = i64::from(wood_box_count.unwrap_or(0));
    if requested_wood > balance.wood_boxes {
        return Err(StockError::InsufficientBoxes {
            kind: BoxKind::Wood,
            available: balance.wood_boxes,
            requested: requested_wood,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn movement(
        movement_type: MovementType,
        product: &str,
        total: &str,
        plastic: Option<(i32, &str)>,
        wood: Option<(i32, &str)>,
    ) -> StockMovement {
        let (plastic_box_count, plastic_box_weight) = match plastic {
            Some((c, w)) => (Some(c), Some(dec(w))),
            None => (None, None),
        };
        let (wood_box_count, wood_box_weight) = match wood {
            Some((c, w)) => (Some(c), Some(dec(w))),
            None => (None, None),
        };
        let total_weight = dec(total);
        let product_weight = net_product_weight(
            total_weight,
            plastic_box_count,
            plastic_box_weight,
            wood_box_count,
            wood_box_weight,
        );
        StockMovement {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            movement_type,
            product: product.to_string(),
            total_weight,
            plastic_box_count,
            plastic_box_weight,
            wood_box_count,
            wood_box_weight,
            product_weight,
            recorded_by: Uuid::new_v4(),
            comment: None,
            farmer_comment: None,
            is_comment_read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_net_weight_subtracts_both_box_kinds() {
        let net = net_product_weight(dec("100"), Some(2), Some(dec("5")), Some(1), Some(dec("8")));
        assert_eq!(net, dec("82"));
    }

    #[test]
    fn test_net_weight_missing_boxes_count_as_zero() {
        assert_eq!(net_product_weight(dec("50"), None, None, None, None), dec("50"));
        assert_eq!(
            net_product_weight(dec("50"), Some(3), None, None, Some(dec("4"))),
            dec("50")
        );
    }

    #[test]
    fn test_derive_rejects_negative_net_weight() {
        let result = derive_product_weight(dec("10"), Some(3), Some(dec("5")), None, None);
        assert_eq!(result, Err(StockError::NegativeNetWeight(dec("-5"))));
    }

    #[test]
    fn test_derive_rejects_negative_box_inputs() {
        // A negative unit weight would net more product than the scale read.
        assert_eq!(
            derive_product_weight(dec("10"), Some(1), Some(dec("-5")), None, None),
            Err(StockError::NegativeBoxInput)
        );
        assert_eq!(
            derive_product_weight(dec("10"), Some(-1), Some(dec("5")), None, None),
            Err(StockError::NegativeBoxInput)
        );
        assert_eq!(
            derive_product_weight(dec("10"), None, None, Some(2), Some(dec("-0.5"))),
            Err(StockError::NegativeBoxInput)
        );
    }

    #[test]
    fn test_derive_allows_zero_net_weight() {
        let result = derive_product_weight(dec("15"), Some(3), Some(dec("5")), None, None);
        assert_eq!(result, Ok(Decimal::ZERO));
    }

    #[test]
    fn test_client_balance_signed_fold() {
        let history = vec![
            movement(MovementType::In, "apples", "100", Some((2, "5")), None),
            movement(MovementType::In, "pears", "40", None, Some((4, "2.5"))),
            movement(MovementType::Out, "apples", "30", Some((1, "5")), None),
        ];
        let balance = client_balance(&history);
        assert_eq!(balance.total_weight, dec("110"));
        assert_eq!(balance.product_weight, dec("90") + dec("30") - dec("25"));
        assert_eq!(balance.plastic_boxes, 1);
        assert_eq!(balance.wood_boxes, 4);
    }

    #[test]
    fn test_product_balance_is_case_sensitive() {
        let history = vec![
            movement(MovementType::In, "Apples", "100", None, None),
            movement(MovementType::In, "apples", "20", None, None),
        ];
        assert_eq!(product_balance(&history, "Apples"), dec("100"));
        assert_eq!(product_balance(&history, "apples"), dec("20"));
        assert_eq!(product_balance(&history, "APPLES"), Decimal::ZERO);
    }

    #[test]
    fn test_withdrawal_equal_to_available_is_accepted() {
        // One deposit: total 100, 2 plastic boxes of 5kg -> net 90.
        let history = vec![movement(MovementType::In, "apples", "100", Some((2, "5")), None)];
        assert_eq!(check_withdrawal(&history, "apples", dec("90"), None, None), Ok(()));
    }

    #[test]
    fn test_withdrawal_one_over_is_rejected_with_amounts() {
        let history = vec![movement(MovementType::In, "apples", "100", Some((2, "5")), None)];
        let err = check_withdrawal(&history, "apples", dec("91"), None, None).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientProduct {
                product: "apples".to_string(),
                available: dec("90"),
                requested: dec("91"),
            }
        );
        let message = err.to_string();
        assert!(message.contains("90.00"), "message was: {}", message);
        assert!(message.contains("91.00"), "message was: {}", message);
    }

    #[test]
    fn test_full_withdrawal_leaves_zero_balance() {
        let mut history = vec![movement(MovementType::In, "apples", "100", Some((2, "5")), None)];
        assert!(check_withdrawal(&history, "apples", dec("90"), None, None).is_ok());
        history.push(movement(MovementType::Out, "apples", "90", None, None));
        assert_eq!(product_balance(&history, "apples"), Decimal::ZERO);
    }

    #[test]
    fn test_box_overdraft_is_rejected() {
        let history = vec![movement(MovementType::In, "apples", "100", Some((2, "5")), None)];
        // Product amount fine, but three plastic boxes against two deposited.
        let err = check_withdrawal(&history, "apples", dec("10"), Some(3), None).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientBoxes {
                kind: BoxKind::Plastic,
                available: 2,
                requested: 3,
            }
        );
    }

    #[test]
    fn test_box_withdrawal_equal_to_available_is_accepted() {
        let history = vec![
            movement(MovementType::In, "apples", "100", Some((2, "5")), Some((1, "8"))),
        ];
        assert!(check_withdrawal(&history, "apples", dec("82"), Some(2), Some(1)).is_ok());
    }

    #[test]
    fn test_box_balance_spans_products() {
        // Boxes are tracked per client, not per product.
        let history = vec![
            movement(MovementType::In, "apples", "100", Some((2, "5")), None),
            movement(MovementType::In, "pears", "60", Some((2, "5")), None),
        ];
        assert!(check_withdrawal(&history, "apples", dec("50"), Some(4), None).is_ok());
    }

    #[test]
    fn test_withdrawal_against_empty_ledger_is_rejected() {
        let err = check_withdrawal(&[], "apples", dec("1"), None, None).unwrap_err();
        assert!(matches!(err, StockError::InsufficientProduct { .. }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn weight_strategy() -> impl Strategy<Value = Decimal> {
            (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
        }

        fn type_strategy() -> impl Strategy<Value = MovementType> {
            prop_oneof![Just(MovementType::In), Just(MovementType::Out)]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// The net balance equals the signed sum of product weights and
            /// does not depend on row order.
            #[test]
            fn prop_product_balance_is_commutative_signed_sum(
                rows in prop::collection::vec((type_strategy(), weight_strategy()), 1..20)
            ) {
                let history: Vec<StockMovement> = rows
                    .iter()
                    .map(|(t, w)| movement(*t, "apples", &w.to_string(), None, None))
                    .collect();

                let expected: Decimal = rows
                    .iter()
                    .map(|(t, w)| *w * Decimal::from(t.sign()))
                    .sum();
                prop_assert_eq!(product_balance(&history, "apples"), expected);

                let mut reversed = history.clone();
                reversed.reverse();
                prop_assert_eq!(product_balance(&reversed, "apples"), expected);
            }

            /// The derivation formula holds whenever it is accepted.
            #[test]
            fn prop_derived_weight_matches_formula(
                total in weight_strategy(),
                plastic_count in 0i32..20,
                plastic_unit in weight_strategy(),
                wood_count in 0i32..20,
                wood_unit in weight_strategy(),
            ) {
                let expected = total
                    - Decimal::from(plastic_count) * plastic_unit
                    - Decimal::from(wood_count) * wood_unit;
                let derived = derive_product_weight(
                    total,
                    Some(plastic_count),
                    Some(plastic_unit),
                    Some(wood_count),
                    Some(wood_unit),
                );
                if expected < Decimal::ZERO {
                    prop_assert_eq!(derived, Err(StockError::NegativeNetWeight(expected)));
                } else {
                    prop_assert_eq!(derived, Ok(expected));
                }
            }

            /// A withdrawal of exactly the deposited amount always passes.
            #[test]
            fn prop_exact_withdrawal_accepted(total in weight_strategy()) {
                let history = vec![movement(MovementType::In, "apples", &total.to_string(), None, None)];
                prop_assert!(check_withdrawal(&history, "apples", total, None, None).is_ok());
            }
        }
    }
}
