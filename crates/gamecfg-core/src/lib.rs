//! # gamecfg-core - Catalog, Values and Validation
//!
//! Foundation crate for gamecfg. Provides the settings catalog schema, the
//! typed value model with its per-type coercion table, advisory validation,
//! error handling and logging setup.
//!
//! This crate has **zero internal dependencies**.
//!
//! ## Public API
//!
//! ### Catalog (`catalog`)
//! - [`Catalog`] - Ordered, name-indexed set of setting definitions
//! - [`SettingDefinition`] - Name, category, type, bounds/options/pattern, default
//! - [`SettingType`] - `bool | int | float | string | enum`
//!
//! ### Values (`value`)
//! - [`TypedValue`] - Decoded representation of a raw string
//! - [`decode()`], [`encode()`], [`canonical_raw()`], [`normalize()`]
//! - [`RawSettings`] - Ordered name → raw string mapping
//!
//! ### Validation (`validation`)
//! - [`validate()`], [`validate_raw()`] - Collect every [`ValidationIssue`]
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! ```rust
//! use gamecfg_core::prelude::*;
//! ```

pub mod catalog;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod validation;
pub mod value;

pub use catalog::{Catalog, Pattern, SettingDefinition, SettingType};
pub use error::{Error, Result, ResultExt};
pub use validation::{validate, validate_raw, IssueKind, ValidationIssue};
pub use value::{
    canonical_raw, decode, encode, is_quoted, normalize, quote, unquote, RawSettings,
    TypedValue, FLOAT_PRECISION,
};
