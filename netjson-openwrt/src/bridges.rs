//! Bridge index construction.
//!
//! NetJSON declares a bridge as one interface listing all of its members,
//! wired and wireless alike. OpenWrt splits that: the bridge is declared in
//! `/etc/config/network` on its wired members only, and every wireless member
//! joins it from `/etc/config/wireless` through a `network` reference.
//!
//! [`BridgeIndex::build`] reconciles the two models once per document:
//!
//! - each bridge gets a *representative*, the first member that is not a
//!   wireless interface, mapped to the ordered list of non-wireless members
//! - each wireless member is annotated with `_attached`, holding that same
//!   list, so the wireless renderer can point it at the right network
//!
//! A wireless interface listed by two bridges keeps the annotation of the
//! bridge declared last.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::{
    interface_name, interfaces, interfaces_mut, string_list, InterfaceKind, ATTACHED_KEY,
};
use crate::error::BackendError;

/// Representative member name to the bridge's non-wireless members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeIndex {
    net_bridges: IndexMap<String, Vec<String>>,
    bridge_names: IndexMap<String, String>,
}

impl BridgeIndex {
    /// Scan `config.interfaces`, record bridge representatives and annotate
    /// wireless bridge members in place.
    pub fn build(config: &mut Map<String, Value>) -> Result<Self, BackendError> {
        let mut wifi: IndexMap<String, usize> = IndexMap::new();
        let mut bridges: IndexMap<String, Vec<String>> = IndexMap::new();
        for (pos, interface) in interfaces(config).iter().enumerate() {
            match InterfaceKind::of(interface) {
                InterfaceKind::Wireless => {
                    wifi.insert(interface_name(interface).to_string(), pos);
                }
                InterfaceKind::Bridge => {
                    bridges.insert(
                        interface_name(interface).to_string(),
                        string_list(interface.get("bridge_members")),
                    );
                }
                _ => {}
            }
        }

        let mut net_bridges = IndexMap::new();
        let mut bridge_names = IndexMap::new();
        let mut attachments: Vec<(usize, Vec<String>)> = Vec::new();
        let mut attached_by: HashMap<&str, &str> = HashMap::new();
        for (bridge, members) in &bridges {
            let net_names: Vec<String> = members
                .iter()
                .filter(|name| !wifi.contains_key(name.as_str()))
                .cloned()
                .collect();
            let Some(representative) = net_names.first() else {
                return Err(BackendError::Index {
                    bridge: bridge.clone(),
                });
            };
            tracing::debug!(
                bridge = %bridge,
                representative = %representative,
                members = net_names.len(),
                "resolved bridge representative"
            );
            net_bridges.insert(representative.clone(), net_names.clone());
            bridge_names.insert(representative.clone(), bridge.clone());

            for name in members {
                let Some(&pos) = wifi.get(name.as_str()) else {
                    continue;
                };
                if let Some(previous) = attached_by.insert(name.as_str(), bridge.as_str()) {
                    tracing::warn!(
                        interface = %name,
                        previous = %previous,
                        bridge = %bridge,
                        "wireless interface is a member of several bridges, keeping the last one"
                    );
                }
                attachments.push((pos, net_names.clone()));
            }
        }

        if let Some(list) = interfaces_mut(config) {
            for (pos, net_names) in attachments {
                if let Some(Value::Object(interface)) = list.get_mut(pos) {
                    let names = net_names.into_iter().map(Value::String).collect();
                    interface.insert(ATTACHED_KEY.to_string(), Value::Array(names));
                }
            }
        }

        Ok(Self {
            net_bridges,
            bridge_names,
        })
    }

    /// Members of the bridge represented by `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.net_bridges.get(name).map(Vec::as_slice)
    }

    /// Name of the bridge interface that `representative` stands for.
    pub fn bridge_of(&self, representative: &str) -> Option<&str> {
        self.bridge_names.get(representative).map(String::as_str)
    }

    pub fn is_representative(&self, name: &str) -> bool {
        self.net_bridges.contains_key(name)
    }

    /// Representatives and members in bridge declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.net_bridges
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.net_bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.net_bridges.is_empty()
    }
}
