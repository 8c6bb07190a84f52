//! Core data types
//!
//! Defines fundamental types:
//! - OptionQuote: validated market inputs for one European option
//! - GreeksResult: price and sensitivities at a given volatility
//! - SolverConfig: implied volatility solver settings
//! - IVError: typed failures shared by the pricer and the solver

pub mod option;
pub mod quote;
pub mod greeks;
pub mod config;
pub mod error;

pub use option::*;
pub use quote::*;
pub use greeks::*;
pub use config::*;
pub use error::*;
