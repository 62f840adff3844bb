//! A client for the [Sisense](https://www.sisense.com) REST API.
//!
//! This crate provides a Rust SDK for managing users, groups, dashboards and
//! data models on a Sisense deployment, and for turning the JSON it returns
//! into tables.
//!
//! # Dispatching requests
//!
//! A [`Client`] is built from a [`Profile`]. Every call carries the
//! profile's bearer token, runs exactly once, and is classified by status
//! code in the client's own log file. Only transport failures (DNS,
//! connection refused, timeouts) and malformed calls are returned as
//! errors; a 4xx or 5xx response is handed back to the caller.
//!
//! ```no_run
//! use sisense::{Client, Profile, Query};
//!
//! # fn main() -> anyhow::Result<()> {
//! let profile = Profile::read("config.yaml")?;
//! let client = Client::new(profile)?;
//!
//! let mut query = Query::new();
//! query.insert("expand".into(), "groups,role".into());
//!
//! let resp = client.get("/api/v1/users", Some(&query))?;
//! if let Some(users) = resp.json() {
//!     let table = client.normalize(users)?;
//!     println!("{} users, columns: {:?}", table.len(), table.columns());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Typed requests
//!
//! The resource helpers are built on [`ApiRequest`] and [`ApiResponse`],
//! which can also be used directly:
//!
//! ```no_run
//! use sisense::{Client, Profile, user::GetGroups};
//!
//! # fn main() -> anyhow::Result<()> {
//! let client = Client::new(Profile::from_default_env()?)?;
//! for group in client.roundtrip(GetGroups)? {
//!     println!("{} ({})", group.name, group.id);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

mod api;
mod client;
mod config;
mod logging;
mod table;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::*;
pub use client::{Client, Transport};
pub use config::{Error as ConfigError, Profile};
pub use table::{SCALAR_COLUMN, Shape, Table, cell_text, export_csv, normalize};
