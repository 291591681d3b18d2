// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod account;
pub mod bin;
pub mod identity;

pub use account::{Account, Role};
pub use bin::{AggregatedBin, BinAction, BinOverride, BinPrediction, BinStatus};
pub use identity::{FederatedProfile, Identity, LocalIdentity};
