// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pointer registry for VaultGuard.
//!
//! Each identity owns exactly one slot holding the content id of its most
//! recent record. [`PointerRegistry`] models the contract; [`LocalRegistry`]
//! and [`JsonRpcRegistry`] are the two [`RegistryClient`] implementations.

pub mod abi;
pub mod contract;
pub mod local;
pub mod rpc;

use std::sync::Arc;

use vaultguard_config::model::RegistryConfig;
use vaultguard_core::{Identity, RegistryClient, VaultError};

pub use contract::{MAX_POINTER_LEN, PointerRegistry, SlotState};
pub use local::{LocalRegistry, SharedRegistry};
pub use rpc::JsonRpcRegistry;

/// Build the chain-backed registry client writing as `identity`.
pub fn from_config(
    config: &RegistryConfig,
    identity: Identity,
) -> Result<Arc<dyn RegistryClient>, VaultError> {
    let client: Arc<dyn RegistryClient> = Arc::new(JsonRpcRegistry::new(config, identity)?);
    Ok(client)
}
