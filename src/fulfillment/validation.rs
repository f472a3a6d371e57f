//! Input checks run before any model is built.

use super::types::{CarrierKey, CarrierTable, FulfillmentInput};
use std::collections::BTreeSet;
use thiserror::Error;

/// Malformed input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{kind} #{index} has an empty id")]
    EmptyId { kind: &'static str, index: usize },

    #[error("duplicate item id: {0}")]
    DuplicateItem(String),

    #[error("duplicate dc id: {0}")]
    DuplicateDc(String),

    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidNumber { field: String, value: f64 },

    #[error("inventory of {item_id} at {dc_id} is negative: {value}")]
    NegativeInventory {
        dc_id: String,
        item_id: String,
        value: i64,
    },

    #[error("carton_volume must be positive and finite, got {0}")]
    InvalidCartonVolume(f64),

    #[error("{table} references unknown dc {dc_id}")]
    UnknownDc { table: &'static str, dc_id: String },

    #[error("no capacity declared for carrier {carrier} at {dc_id}")]
    MissingCapacity { dc_id: String, carrier: String },

    #[error("no delivery cost declared for carrier {carrier} at {dc_id}")]
    MissingDeliveryCost { dc_id: String, carrier: String },
}

impl ValidationError {
    pub(crate) fn missing_capacity(key: &CarrierKey) -> Self {
        Self::MissingCapacity {
            dc_id: key.dc_id.clone(),
            carrier: key.carrier.clone(),
        }
    }

    pub(crate) fn missing_delivery_cost(key: &CarrierKey) -> Self {
        Self::MissingDeliveryCost {
            dc_id: key.dc_id.clone(),
            carrier: key.carrier.clone(),
        }
    }
}

fn non_negative(field: impl FnOnce() -> String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidNumber {
            field: field(),
            value,
        })
    }
}

fn check_table(
    table: &CarrierTable,
    name: &'static str,
    dc_ids: &BTreeSet<&str>,
) -> Result<(), ValidationError> {
    for (dc_id, carriers) in table {
        if !dc_ids.contains(dc_id.as_str()) {
            return Err(ValidationError::UnknownDc {
                table: name,
                dc_id: dc_id.clone(),
            });
        }
        for (carrier, &value) in carriers {
            non_negative(|| format!("{name}.{dc_id}.{carrier}"), value)?;
        }
    }
    Ok(())
}

/// Validates an instance.
///
/// Rejects duplicate or empty ids, negative or non-finite numbers, a
/// non-positive carton volume, carrier tables naming unknown DCs and offered
/// (DC, carrier) pairs without a delivery cost. Missing inventory entries
/// are allowed and mean no stock.
///
/// Fractional quantities are accepted with a warning: only whole units are
/// generated, so such an item cannot be fulfilled exactly.
pub fn validate(input: &FulfillmentInput) -> Result<(), ValidationError> {
    if !(input.carton_volume.is_finite() && input.carton_volume > 0.0) {
        return Err(ValidationError::InvalidCartonVolume(input.carton_volume));
    }

    let mut item_ids = BTreeSet::new();
    for (index, item) in input.items.iter().enumerate() {
        if item.item_id.is_empty() {
            return Err(ValidationError::EmptyId { kind: "item", index });
        }
        if !item_ids.insert(item.item_id.as_str()) {
            return Err(ValidationError::DuplicateItem(item.item_id.clone()));
        }
        non_negative(|| format!("items.{}.quantity", item.item_id), item.quantity)?;
        non_negative(|| format!("items.{}.volume", item.item_id), item.volume)?;
        if item.quantity.fract() != 0.0 {
            tracing::warn!(
                item = %item.item_id,
                quantity = item.quantity,
                "fractional quantity, only {} whole units can be assigned",
                item.units()
            );
        }
    }

    let mut dc_ids = BTreeSet::new();
    for (index, dc) in input.dcs.iter().enumerate() {
        if dc.dc_id.is_empty() {
            return Err(ValidationError::EmptyId { kind: "dc", index });
        }
        if !dc_ids.insert(dc.dc_id.as_str()) {
            return Err(ValidationError::DuplicateDc(dc.dc_id.clone()));
        }
        non_negative(|| format!("dcs.{}.handling_cost", dc.dc_id), dc.handling_cost)?;
        if let Some((item_id, &value)) = dc.inventory.iter().find(|&(_, &v)| v < 0) {
            return Err(ValidationError::NegativeInventory {
                dc_id: dc.dc_id.clone(),
                item_id: item_id.clone(),
                value,
            });
        }
    }

    check_table(&input.carrier_capacities, "carrier_capacities", &dc_ids)?;
    check_table(&input.delivery_costs, "carrier_deliverycost", &dc_ids)?;

    for dc in &input.dcs {
        for carrier in input.carriers_at(&dc.dc_id) {
            let key = CarrierKey::new(&dc.dc_id, carrier);
            if input.delivery_cost(&key).is_none() {
                return Err(ValidationError::missing_delivery_cost(&key));
            }
        }
    }

    if input.weight_capacity != 0 {
        tracing::debug!(
            weight_capacity = input.weight_capacity,
            "weight_capacity is ignored"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::types::{DistributionCenter, Item};
    use std::collections::BTreeMap;

    fn valid() -> FulfillmentInput {
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

    #[test]
    fn test_valid_input() {
        assert_eq!(validate(&valid()), Ok(()));
    }

    #[test]
    fn test_carton_volume() {
        for volume in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut input = valid();
            input.carton_volume = volume;
            assert!(matches!(
                validate(&input),
                Err(ValidationError::InvalidCartonVolume(_))
            ));
        }
    }

    #[test]
    fn test_duplicates() {
        let mut input = valid();
        input.items.push(input.items[0].clone());
        assert_eq!(
            validate(&input),
            Err(ValidationError::DuplicateItem("a".into()))
        );

        let mut input = valid();
        input.dcs.push(input.dcs[0].clone());
        assert_eq!(
            validate(&input),
            Err(ValidationError::DuplicateDc("dc1".into()))
        );
    }

    #[test]
    fn test_empty_id() {
        let mut input = valid();
        input.items[0].item_id.clear();
        assert_eq!(
            validate(&input),
            Err(ValidationError::EmptyId { kind: "item", index: 0 })
        );
    }

    #[test]
    fn test_negative_numbers() {
        let mut input = valid();
        input.items[0].volume = -2.0;
        assert!(matches!(
            validate(&input),
            Err(ValidationError::InvalidNumber { .. })
        ));

        let mut input = valid();
        input.dcs[0].inventory.insert("a".into(), -1);
        assert!(matches!(
            validate(&input),
            Err(ValidationError::NegativeInventory { value: -1, .. })
        ));

        let mut input = valid();
        input
            .carrier_capacities
            .get_mut("dc1")
            .unwrap()
            .insert("ups".into(), f64::NAN);
        assert!(matches!(
            validate(&input),
            Err(ValidationError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_missing_delivery_cost() {
        let mut input = valid();
        input.delivery_costs.clear();
        assert_eq!(
            validate(&input),
            Err(ValidationError::MissingDeliveryCost {
                dc_id: "dc1".into(),
                carrier: "ups".into()
            })
        );
    }

    #[test]
    fn test_unknown_dc_in_table() {
        let mut input = valid();
        input
            .carrier_capacities
            .insert("ghost".into(), BTreeMap::from([("ups".to_string(), 1.0)]));
        assert_eq!(
            validate(&input),
            Err(ValidationError::UnknownDc {
                table: "carrier_capacities",
                dc_id: "ghost".into()
            })
        );
    }

    #[test]
    fn test_missing_inventory_and_fraction_allowed() {
        let mut input = valid();
        input.dcs[0].inventory.clear();
        input.items[0].quantity = 2.5;
        assert_eq!(validate(&input), Ok(()));
    }
}
