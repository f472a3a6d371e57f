//! Order-fulfillment optimization as a mixed-integer program.
//!
//! Decides which distribution center and carrier ship each unit of each
//! order line, minimizing delivery and handling cost per carton while
//! respecting carrier capacity and DC inventory.
//!
//! - **MIP layer** ([`mip`]): solver-independent model (binary, integer and
//!   continuous variables, linear constraints, linear objective) and the
//!   [`MipSolver`](mip::MipSolver) backend trait, with an exact
//!   branch-and-bound backend and an LP-rounding heuristic.
//! - **Fulfillment** ([`fulfillment`]): assignment generation, model
//!   construction, solve orchestration and result extraction, plus input
//!   validation, an independent solution checker and a random instance
//!   generator.
//!
//! # Quick start
//!
//! ```
//! use u_fulfill::fulfillment::{fulfill, FulfillmentConfig, InstanceConfig};
//!
//! let input = InstanceConfig::default().with_items(2).with_dcs(2).with_seed(1).generate();
//! let output = fulfill(&input, &FulfillmentConfig::default()).unwrap();
//! assert!(output.is_solved());
//! ```
//!
//! # Features
//!
//! - `parallel`: solve batches on the rayon thread pool
//!   ([`fulfillment::solve_all`]).

pub mod error;
pub mod fulfillment;
pub mod io;
pub mod logging;
pub mod mip;

pub use error::{Error, Result};
