//! Seeded random instances.
//!
//! Generated instances are always feasible: the first DC stocks every item
//! in full and every carrier can carry the whole order on its own.

use super::types::{DistributionCenter, FulfillmentInput, Item};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const CARRIER_NAMES: [&str; 5] = ["ups", "dhl", "fedex", "usps", "ontrac"];

/// Shape of a random instance.
///
/// # Examples
///
/// ```
/// use u_fulfill::fulfillment::InstanceConfig;
///
/// let config = InstanceConfig::default().with_items(4).with_seed(7);
/// let input = config.generate();
/// assert_eq!(input.items.len(), 4);
/// assert_eq!(input, config.generate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Number of order lines.
    pub items: usize,
    /// Number of distribution centers.
    pub dcs: usize,
    /// Carriers offered at every DC.
    pub carriers_per_dc: usize,
    /// Upper bound on the units ordered per line.
    pub max_quantity: u32,
    /// Random seed.
    pub seed: u64,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            items: 5,
            dcs: 3,
            carriers_per_dc: 2,
            max_quantity: 4,
            seed: 42,
        }
    }
}

impl InstanceConfig {
    pub fn with_items(mut self, n: usize) -> Self {
        self.items = n;
        self
    }

    pub fn with_dcs(mut self, n: usize) -> Self {
        self.dcs = n;
        self
    }

    pub fn with_carriers_per_dc(mut self, n: usize) -> Self {
        self.carriers_per_dc = n;
        self
    }

    pub fn with_max_quantity(mut self, n: u32) -> Self {
        self.max_quantity = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.dcs == 0 {
            return Err("dcs must be at least 1".into());
        }
        if self.carriers_per_dc == 0 {
            return Err("carriers_per_dc must be at least 1".into());
        }
        if self.max_quantity == 0 {
            return Err("max_quantity must be at least 1".into());
        }
        Ok(())
    }

    /// Generates the instance. The same configuration always yields the same
    /// instance.
    pub fn generate(&self) -> FulfillmentInput {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let max_quantity = self.max_quantity.max(1);

        let items: Vec<Item> = (0..self.items)
            .map(|i| Item {
                item_id: format!("item{i}"),
                quantity: f64::from(rng.random_range(1..=max_quantity)),
                volume: f64::from(rng.random_range(1..=20_u32)) / 2.0,
            })
            .collect();
        let total_volume: f64 = items.iter().map(|item| item.quantity * item.volume).sum();

        let carriers: Vec<String> = (0..self.carriers_per_dc.max(1))
            .map(|k| match CARRIER_NAMES.get(k) {
                Some(name) => name.to_string(),
                None => format!("carrier{k}"),
            })
            .collect();

        let mut dcs = Vec::with_capacity(self.dcs);
        let mut carrier_capacities = BTreeMap::new();
        let mut delivery_costs = BTreeMap::new();
        for d in 0..self.dcs.max(1) {
            let dc_id = format!("dc{d}");
            let inventory = items
                .iter()
                .map(|item| {
                    let stock = if d == 0 {
                        item.units()
                    } else {
                        rng.random_range(0..=max_quantity)
                    };
                    (item.item_id.clone(), i64::from(stock))
                })
                .collect();
            dcs.push(DistributionCenter {
                dc_id: dc_id.clone(),
                inventory,
                handling_cost: f64::from(rng.random_range(1..=30_u32)) / 10.0,
            });

            let mut capacities = BTreeMap::new();
            let mut costs = BTreeMap::new();
            for carrier in &carriers {
                let slack = f64::from(rng.random_range(0..=100_u32)) / 100.0;
                capacities.insert(carrier.clone(), (total_volume * (1.0 + slack)).ceil().max(1.0));
                costs.insert(carrier.clone(), f64::from(rng.random_range(2..=20_u32)) / 10.0);
            }
            carrier_capacities.insert(dc_id.clone(), capacities);
            delivery_costs.insert(dc_id, costs);
        }

        FulfillmentInput {
            items,
            weight_capacity: 0,
            dcs,
            carrier_capacities,
            delivery_costs,
            carton_volume: f64::from(rng.random_range(5..=20_u32)),
        }
    }
}
