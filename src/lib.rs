//! tolstack: tolerance stack-up calculator
//!
//! Worst-case, RSS and Cpk-weighted statistical stack-ups over a list of
//! dimensional contributors, with capability metrics, an acceptance verdict
//! and a Pareto ranking of variance contributions. The engine in [`core`] is
//! pure computation; [`store`] and [`cli`] host it over a JSON stack file.

pub mod cli;
pub mod core;
pub mod entities;
pub mod logging;
pub mod report;
pub mod store;
