//! Input and output records of the order-fulfillment problem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An order line: `quantity` units of an item, each occupying `volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub item_id: String,
    pub quantity: f64,
    pub volume: f64,
}

impl Item {
    /// Number of unit-level assignments generated for this item
    /// (`quantity` truncated to whole units).
    pub fn units(&self) -> u32 {
        if self.quantity.is_finite() && self.quantity >= 1.0 {
            self.quantity.trunc().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }
}

/// A distribution center with its on-hand inventory and per-carton handling cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionCenter {
    pub dc_id: String,
    /// Item id → units on hand. Missing items have no stock.
    #[serde(default)]
    pub inventory: BTreeMap<String, i64>,
    #[serde(default)]
    pub handling_cost: f64,
}

impl DistributionCenter {
    /// Units of `item_id` on hand.
    pub fn stock(&self, item_id: &str) -> i64 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }
}

/// Nested DC id → carrier name → value mapping.
pub type CarrierTable = BTreeMap<String, BTreeMap<String, f64>>;

/// The problem instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentInput {
    pub items: Vec<Item>,
    /// Carried for compatibility with existing input files; not used by the model.
    #[serde(default)]
    pub weight_capacity: i64,
    pub dcs: Vec<DistributionCenter>,
    /// DC id → carrier → capacity in volume. Defines which carriers a DC offers.
    #[serde(default)]
    pub carrier_capacities: CarrierTable,
    /// DC id → carrier → delivery cost per carton.
    #[serde(default, rename = "carrier_deliverycost")]
    pub delivery_costs: CarrierTable,
    /// Volume of one shipping carton.
    pub carton_volume: f64,
}

impl FulfillmentInput {
    /// Looks up a DC by id.
    pub fn dc(&self, dc_id: &str) -> Option<&DistributionCenter> {
        self.dcs.iter().find(|dc| dc.dc_id == dc_id)
    }

    /// Looks up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    /// Declared capacity of a (DC, carrier) pair.
    pub fn capacity(&self, key: &CarrierKey) -> Option<f64> {
        lookup(&self.carrier_capacities, key)
    }

    /// Declared delivery cost of a (DC, carrier) pair.
    pub fn delivery_cost(&self, key: &CarrierKey) -> Option<f64> {
        lookup(&self.delivery_costs, key)
    }

    /// Carriers offered at a DC, in name order.
    pub fn carriers_at<'a>(&'a self, dc_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.carrier_capacities
            .get(dc_id)
            .into_iter()
            .flat_map(|carriers| carriers.keys().map(String::as_str))
    }
}

fn lookup(table: &CarrierTable, key: &CarrierKey) -> Option<f64> {
    table.get(&key.dc_id)?.get(&key.carrier).copied()
}

/// One transportation channel: a carrier out of a DC.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CarrierKey {
    pub dc_id: String,
    pub carrier: String,
}

impl CarrierKey {
    pub fn new(dc_id: impl Into<String>, carrier: impl Into<String>) -> Self {
        Self {
            dc_id: dc_id.into(),
            carrier: carrier.into(),
        }
    }
}

/// Composite `"<dc>-<carrier>"` key used in the output's carton map.
impl fmt::Display for CarrierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.dc_id, self.carrier)
    }
}

/// A candidate unit-level decision: ship `quantity` units of an item from a
/// DC with a carrier. `quantity` is the unit sequence number 1..=item units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub item_id: String,
    pub dc_id: String,
    pub carrier: String,
    pub quantity: u32,
}

impl Assignment {
    /// The (DC, carrier) channel of this assignment.
    pub fn carrier_key(&self) -> CarrierKey {
        CarrierKey::new(&self.dc_id, &self.carrier)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.item_id, self.dc_id, self.carrier, self.quantity)
    }
}

/// Outcome of a solve as reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Optimal,
    Suboptimal,
    Infeasible,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Optimal => "optimal",
            Status::Suboptimal => "suboptimal",
            Status::Infeasible => "infeasible",
        })
    }
}

/// Size and provenance of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub provider: String,
    pub variables: usize,
    pub constraints: usize,
    pub assignments: usize,
}

/// The result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentOutput {
    pub status: Status,
    pub runtime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// `"<dc>-<carrier>"` → carton count.
    #[serde(default)]
    pub cartons: BTreeMap<String, f64>,
    #[serde(default)]
    pub statistics: Statistics,
}

impl FulfillmentOutput {
    /// Whether the output carries a feasible plan.
    pub fn is_solved(&self) -> bool {
        self.status != Status::Infeasible
    }

    /// Units shipped per item.
    pub fn fulfilled(&self) -> BTreeMap<&str, u64> {
        let mut totals = BTreeMap::new();
        for a in &self.assignments {
            *totals.entry(a.item_id.as_str()).or_insert(0) += u64::from(a.quantity);
        }
        totals
    }
}
