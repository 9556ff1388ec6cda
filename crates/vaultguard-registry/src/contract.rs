// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State machine of the on-chain PointerRegistry.
//!
//! One slot per identity, `Empty` until the first write, then `Set(cid)`
//! forever; every write overwrites. Mirrors `contracts/PointerRegistry.sol`
//! so the vault can run against an in-process registry.

use std::collections::HashMap;

use tokio::sync::broadcast;
use vaultguard_core::{ContentId, Identity, PointerChanged, VaultError};

/// Longest pointer the contract accepts, in bytes.
pub const MAX_POINTER_LEN: usize = 512;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// State of one identity's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Set(ContentId),
}

#[derive(Debug)]
pub struct PointerRegistry {
    slots: HashMap<Identity, ContentId>,
    events: Vec<PointerChanged>,
    notify: broadcast::Sender<PointerChanged>,
}

impl Default for PointerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerRegistry {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            slots: HashMap::new(),
            events: Vec::new(),
            notify,
        }
    }

    /// Overwrite `sender`'s slot and emit `PointerChanged`.
    ///
    /// The slot is keyed by the sender; there is no way to write another
    /// identity's slot. Invalid input reverts: neither the slot nor the
    /// event log changes.
    pub fn set_pointer(
        &mut self,
        sender: &Identity,
        content_id: &str,
    ) -> Result<PointerChanged, VaultError> {
        let content_id = validate_pointer(content_id)?;

        self.slots.insert(sender.clone(), content_id.clone());
        let event = PointerChanged {
            identity: sender.clone(),
            content_id,
        };
        self.events.push(event.clone());
        // No subscribers is fine.
        let _ = self.notify.send(event.clone());
        Ok(event)
    }

    /// The current pointer, or `""` when the identity has never written.
    pub fn get_pointer(&self, identity: &Identity) -> &str {
        self.slots.get(identity).map_or("", ContentId::as_str)
    }

    pub fn slot(&self, identity: &Identity) -> SlotState {
        match self.slots.get(identity) {
            Some(cid) => SlotState::Set(cid.clone()),
            None => SlotState::Empty,
        }
    }

    /// Every `PointerChanged` emitted so far, oldest first.
    pub fn events(&self) -> &[PointerChanged] {
        &self.events
    }

    /// Receive events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PointerChanged> {
        self.notify.subscribe()
    }
}

/// Same rule as the contract: 1 to [`MAX_POINTER_LEN`] bytes of visible
/// ASCII (0x21 to 0x7e).
fn validate_pointer(value: &str) -> Result<ContentId, VaultError> {
    let revert = |reason: String| VaultError::RegistryWriteFailed {
        message: format!("setPointer reverted: {reason}"),
        tx_hash: None,
    };
    if value.is_empty() {
        return Err(revert("empty content id".to_string()));
    }
    if value.len() > MAX_POINTER_LEN {
        return Err(revert(format!(
            "content id is {} bytes, limit is {MAX_POINTER_LEN}",
            value.len()
        )));
    }
    if let Some(pos) = value.bytes().position(|b| !(0x21..0x7f).contains(&b)) {
        return Err(revert(format!("invalid character at byte {pos}")));
    }
    ContentId::new(value).map_err(|e| revert(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    #[test]
    fn slot_starts_empty() {
        let registry = PointerRegistry::new();
        let alice = id("0xa11ce");
        assert_eq!(registry.slot(&alice), SlotState::Empty);
        assert_eq!(registry.get_pointer(&alice), "");
        assert!(registry.events().is_empty());
    }

    #[test]
    fn overwrite_keeps_only_latest_and_logs_both() {
        let mut registry = PointerRegistry::new();
        let alice = id("0xa11ce");

        registry.set_pointer(&alice, "cidA").unwrap();
        registry.set_pointer(&alice, "cidB").unwrap();

        assert_eq!(registry.get_pointer(&alice), "cidB");
        let logged: Vec<&str> = registry
            .events()
            .iter()
            .map(|e| e.content_id.as_str())
            .collect();
        assert_eq!(logged, vec!["cidA", "cidB"]);
        assert!(registry.events().iter().all(|e| e.identity == alice));
    }

    #[test]
    fn slots_are_per_sender() {
        let mut registry = PointerRegistry::new();
        let alice = id("0xa11ce");
        let bob = id("0xb0b");

        registry.set_pointer(&alice, "cidA").unwrap();
        assert_eq!(registry.slot(&bob), SlotState::Empty);
        registry.set_pointer(&bob, "cidB").unwrap();
        assert_eq!(registry.get_pointer(&alice), "cidA");
    }

    #[test]
    fn revert_leaves_state_and_log_unchanged() {
        let mut registry = PointerRegistry::new();
        let alice = id("0xa11ce");
        registry.set_pointer(&alice, "cidA").unwrap();

        let too_long = "b".repeat(MAX_POINTER_LEN + 1);
        for bad in ["", "cid\u{7}", too_long.as_str()] {
            let err = registry.set_pointer(&alice, bad).unwrap_err();
            assert!(
                matches!(err, VaultError::RegistryWriteFailed { .. }),
                "{err:?}"
            );
        }

        assert_eq!(registry.slot(&alice), SlotState::Set(ContentId::new("cidA").unwrap()));
        assert_eq!(registry.events().len(), 1);
    }

    #[test]
    fn only_visible_ascii_accepted() {
        let mut registry = PointerRegistry::new();
        let alice = id("0xa11ce");
        for bad in ["cid A", "cid\u{7f}", "cid\u{85}", "cidé", "cid\u{a0}"] {
            assert!(
                matches!(
                    registry.set_pointer(&alice, bad),
                    Err(VaultError::RegistryWriteFailed { .. })
                ),
                "{bad:?} accepted"
            );
        }
        assert!(registry.events().is_empty());

        registry.set_pointer(&alice, "!bafkrei~").unwrap();
        assert_eq!(registry.get_pointer(&alice), "!bafkrei~");
    }

    #[test]
    fn pointer_at_limit_accepted() {
        let mut registry = PointerRegistry::new();
        let at_limit = "b".repeat(MAX_POINTER_LEN);
        assert!(registry.set_pointer(&id("0xa"), &at_limit).is_ok());
    }

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let mut registry = PointerRegistry::new();
        let mut rx = registry.subscribe();
        let alice = id("0xa11ce");

        registry.set_pointer(&alice, "cidA").unwrap();
        registry.set_pointer(&alice, "cidB").unwrap();

        assert_eq!(rx.recv().await.unwrap().content_id.as_str(), "cidA");
        assert_eq!(rx.recv().await.unwrap().content_id.as_str(), "cidB");
    }
}
