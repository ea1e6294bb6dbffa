// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bearer token authentication and authorization
//!
//! - [`TokenService`] issues tokens at login and validates them on every
//!   request against the [`TokenLedger`]
//! - [`gate`] decides whether an identity holds a role
//! - [`Authenticated`] and [`AdminOnly`] wire both into Rocket routes

pub mod claims;
pub mod clock;
mod error;
pub mod gate;
pub mod guards;
pub mod ledger;
pub mod password;
pub mod token_service;

pub use claims::{Identity, TokenClaims};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use gate::{authorize, require, Role};
pub use guards::{AdminOnly, Authenticated};
pub use ledger::{LedgerEntry, LedgerStore, StoredExpiry, TokenLedger};
pub use token_service::{strip_bearer, TokenService};
