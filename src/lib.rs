//! Order Parser: turns pasted shipping orders into sheet rows.
//!
//! A pasted order is sent to a language model with a fixed layout
//! instruction. The reply is scanned for fenced 13-column tab-separated rows,
//! each followed by a USPS validation line. Results are kept in a local
//! history that can be edited, copied, and exported as CSV.
//!
//! See `DESIGN.md` for how the pieces fit together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod history;
pub mod order;
