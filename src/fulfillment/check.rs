//! Independent verification of an output against its input.
//!
//! Recomputes every property a plan must satisfy without looking at the MIP:
//! exact fulfillment, carrier capacity, inventory, carton accounting and the
//! reported objective value.

use super::types::{Assignment, CarrierKey, FulfillmentInput, FulfillmentOutput};
use std::collections::{BTreeMap, BTreeSet};

/// Default absolute tolerance, scaled by the magnitude of the compared values.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

/// Checks `output` against `input` and lists every violated property.
///
/// Outputs without a plan (`infeasible`) pass trivially.
pub fn check(
    input: &FulfillmentInput,
    output: &FulfillmentOutput,
    tol: f64,
) -> Result<(), Vec<String>> {
    if !output.is_solved() {
        return Ok(());
    }
    let mut violations = Vec::new();

    let mut seen: BTreeSet<&Assignment> = BTreeSet::new();
    let mut shipped: BTreeMap<&str, f64> = BTreeMap::new();
    let mut volume: BTreeMap<CarrierKey, f64> = BTreeMap::new();
    let mut taken: BTreeMap<(&str, &str), f64> = BTreeMap::new();

    for a in &output.assignments {
        if !seen.insert(a) {
            violations.push(format!("assignment {a} selected twice"));
            continue;
        }
        let Some(item) = input.item(&a.item_id) else {
            violations.push(format!("assignment {a} references unknown item"));
            continue;
        };
        if input.dc(&a.dc_id).is_none() {
            violations.push(format!("assignment {a} references unknown dc"));
            continue;
        }
        let key = a.carrier_key();
        if input.capacity(&key).is_none() {
            violations.push(format!("assignment {a} uses carrier {key} which is not offered"));
            continue;
        }
        if a.quantity == 0 || a.quantity > item.units() {
            violations.push(format!("assignment {a} has quantity outside 1..={}", item.units()));
        }
        let q = f64::from(a.quantity);
        *shipped.entry(a.item_id.as_str()).or_default() += q;
        *volume.entry(key).or_default() += q * item.volume;
        *taken.entry((a.item_id.as_str(), a.dc_id.as_str())).or_default() += q;
    }

    for item in &input.items {
        let total = shipped.get(item.item_id.as_str()).copied().unwrap_or(0.0);
        if !close(total, item.quantity, tol) {
            violations.push(format!(
                "item {} ships {total} units, ordered {}",
                item.item_id, item.quantity
            ));
        }
    }

    for ((item_id, dc_id), &units) in &taken {
        let stock = input.dc(dc_id).map_or(0, |dc| dc.stock(item_id)) as f64;
        if units > stock + tol {
            violations.push(format!("{item_id} at {dc_id}: {units} units taken, {stock} in stock"));
        }
    }

    let mut recomputed = 0.0;
    for dc in &input.dcs {
        for carrier in input.carriers_at(&dc.dc_id) {
            let key = CarrierKey::new(&dc.dc_id, carrier);
            let used = volume.get(&key).copied().unwrap_or(0.0);
            if let Some(capacity) = input.capacity(&key) {
                if used > capacity + tol * (1.0 + capacity.abs()) {
                    violations.push(format!(
                        "{key} carries volume {used} over capacity {capacity}"
                    ));
                }
            }

            let expected = used / input.carton_volume;
            match output.cartons.get(&key.to_string()) {
                Some(&cartons) => {
                    if !close(cartons, expected, tol) {
                        violations.push(format!(
                            "{key} reports {cartons} cartons, expected {expected}"
                        ));
                    }
                    let rate = input.delivery_cost(&key).unwrap_or(0.0) + dc.handling_cost;
                    recomputed += rate * cartons;
                }
                None => violations.push(format!("{key} missing from cartons")),
            }
        }
    }

    if let Some(value) = output.value {
        if !close(value, recomputed, tol) {
            violations.push(format!("objective {value} differs from recomputed {recomputed}"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::types::{DistributionCenter, Item, Statistics, Status};

    fn input() -> FulfillmentInput {
        FulfillmentInput {
            items: vec![Item { item_id: "a".into(), quantity: 3.0, volume: 2.0 }],
            weight_capacity: 0,
            dcs: vec![DistributionCenter {
                dc_id: "dc1".into(),
                inventory: BTreeMap::from([("a".to_string(), 5)]),
                handling_cost: 1.0,
            }],
            carrier_capacities: BTreeMap::from([(
                "dc1".to_string(),
                BTreeMap::from([("ups".to_string(), 100.0)]),
            )]),
            delivery_costs: BTreeMap::from([(
                "dc1".to_string(),
                BTreeMap::from([("ups".to_string(), 0.5)]),
            )]),
            carton_volume: 10.0,
        }
    }

    fn assignment(quantity: u32) -> Assignment {
        Assignment {
            item_id: "a".into(),
            dc_id: "dc1".into(),
            carrier: "ups".into(),
            quantity,
        }
    }

    fn output(assignments: Vec<Assignment>, cartons: f64, value: f64) -> FulfillmentOutput {
        FulfillmentOutput {
            status: Status::Optimal,
            runtime: "1ms".into(),
            value: Some(value),
            assignments,
            cartons: BTreeMap::from([("dc1-ups".to_string(), cartons)]),
            statistics: Statistics::default(),
        }
    }

    #[test]
    fn test_valid_plan() {
        let input = input();
        let whole = output(vec![assignment(3)], 0.6, 0.9);
        assert_eq!(check(&input, &whole, DEFAULT_TOLERANCE), Ok(()));
        let split = output(vec![assignment(1), assignment(2)], 0.6, 0.9);
        assert_eq!(check(&input, &split, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn test_under_fulfillment() {
        let input = input();
        let short = output(vec![assignment(2)], 0.4, 0.6);
        let violations = check(&input, &short, DEFAULT_TOLERANCE).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("ships 2"));
    }

    #[test]
    fn test_wrong_cartons_and_objective() {
        let input = input();
        let wrong = output(vec![assignment(3)], 0.5, 0.9);
        let violations = check(&input, &wrong, DEFAULT_TOLERANCE).unwrap_err();
        assert!(violations.iter().any(|v| v.contains("cartons")));
        assert!(violations.iter().any(|v| v.contains("objective")));
    }

    #[test]
    fn test_capacity_and_inventory() {
        let mut input = input();
        input.dcs[0].inventory.insert("a".into(), 2);
        input
            .carrier_capacities
            .get_mut("dc1")
            .unwrap()
            .insert("ups".into(), 4.0);
        let plan = output(vec![assignment(3)], 0.6, 0.9);
        let violations = check(&input, &plan, DEFAULT_TOLERANCE).unwrap_err();
        assert!(violations.iter().any(|v| v.contains("over capacity")));
        assert!(violations.iter().any(|v| v.contains("in stock")));
    }

    #[test]
    fn test_unknown_references() {
        let input = input();
        let mut bad = assignment(3);
        bad.carrier = "dhl".into();
        let plan = output(vec![bad], 0.0, 0.0);
        let violations = check(&input, &plan, DEFAULT_TOLERANCE).unwrap_err();
        assert!(violations.iter().any(|v| v.contains("not offered")));
    }

    #[test]
    fn test_infeasible_output_passes() {
        let input = input();
        let mut out = output(Vec::new(), 0.0, 0.0);
        out.status = Status::Infeasible;
        out.value = None;
        assert_eq!(check(&input, &out, DEFAULT_TOLERANCE), Ok(()));
    }
}
