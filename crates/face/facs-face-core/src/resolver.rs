//! Capability resolution: bind catalog names to the morph indices an asset exposes.
//!
//! Assets name their morph channels inconsistently ("jawOpen", "jaw_open",
//! "ARKit_jawOpen", ...). For every catalog entry the resolver walks an ordered
//! [`AliasTable`] and binds the first candidate found in the runtime dictionary.
//! Channels with no match are simply absent from the resulting [`CapabilityMap`].

use std::collections::BTreeMap;
use std::hash::BuildHasher;

use hashbrown::HashMap;
use serde::Serialize;

use crate::catalog::{BlendshapeDef, Catalog};
use crate::error::FaceError;

/// Runtime-native name -> morph index lookup supplied by the host once an asset loads.
pub trait MorphDictionary {
    fn index_of(&self, name: &str) -> Option<usize>;
}

impl<S: BuildHasher> MorphDictionary for std::collections::HashMap<String, usize, S> {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.get(name).copied()
    }
}

impl<S: BuildHasher> MorphDictionary for HashMap<String, usize, S> {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.get(name).copied()
    }
}

impl MorphDictionary for BTreeMap<String, usize> {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.get(name).copied()
    }
}

/// Positional name list: a channel's index is its position.
impl MorphDictionary for [String] {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.iter().position(|n| n == name)
    }
}

impl MorphDictionary for Vec<String> {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.as_slice().index_of(name)
    }
}

pub type AliasFn = fn(&str) -> String;

#[derive(Copy, Clone, Debug)]
pub struct AliasRule {
    pub label: &'static str,
    pub alias: AliasFn,
}

fn exact(name: &str) -> String {
    name.to_string()
}

fn lower_case(name: &str) -> String {
    name.to_lowercase()
}

fn arkit_prefixed(name: &str) -> String {
    format!("ARKit_{name}")
}

/// "eyeBlinkLeft" -> "eye_blink_left"
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out
}

/// "jawOpen" -> "JawOpen"
fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ordered alias generators. Earlier rules win when a dictionary satisfies several.
#[derive(Clone, Debug)]
pub struct AliasTable {
    rules: Vec<AliasRule>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl AliasTable {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                AliasRule {
                    label: "exact",
                    alias: exact,
                },
                AliasRule {
                    label: "lowercase",
                    alias: lower_case,
                },
                AliasRule {
                    label: "arkit_prefix",
                    alias: arkit_prefixed,
                },
                AliasRule {
                    label: "snake_case",
                    alias: snake_case,
                },
                AliasRule {
                    label: "capitalized",
                    alias: capitalized,
                },
            ],
        }
    }

    /// Append a lower-priority naming convention.
    pub fn push(&mut self, label: &'static str, alias: AliasFn) -> &mut Self {
        self.rules.push(AliasRule { label, alias });
        self
    }

    pub fn rules(&self) -> &[AliasRule] {
        &self.rules
    }

    /// Candidate runtime names for `name`, in priority order.
    pub fn candidates<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'static str, String)> + 'a {
        self.rules.iter().map(move |r| (r.label, (r.alias)(name)))
    }
}

/// One resolved channel.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Binding {
    pub index: usize,
    pub def: &'static BlendshapeDef,
    /// Label of the alias rule that matched.
    pub via: &'static str,
}

/// Sparse catalog name -> morph index map for one loaded asset.
#[derive(Clone, Debug, Default)]
pub struct CapabilityMap {
    catalog: Catalog,
    bindings: HashMap<&'static str, Binding>,
}

impl CapabilityMap {
    pub fn empty(catalog: Catalog) -> Self {
        Self {
            catalog,
            bindings: HashMap::new(),
        }
    }

    #[inline]
    pub fn index(&self, name: &str) -> Option<usize> {
        self.bindings.get(name).map(|b| b.index)
    }

    #[inline]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// Catalog channels the asset does not expose.
    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.catalog
            .iter()
            .filter(|d| !self.bindings.contains_key(d.name))
            .map(|d| d.name)
    }

    /// name -> index view, convenient for serialization to hosts.
    pub fn to_index_map(&self) -> BTreeMap<String, usize> {
        self.bindings
            .iter()
            .map(|(name, b)| (name.to_string(), b.index))
            .collect()
    }
}

/// Resolve with the standard alias table.
pub fn resolve<D: MorphDictionary + ?Sized>(catalog: Catalog, dictionary: &D) -> CapabilityMap {
    resolve_with(catalog, dictionary, &AliasTable::standard())
}

pub fn resolve_with<D: MorphDictionary + ?Sized>(
    catalog: Catalog,
    dictionary: &D,
    aliases: &AliasTable,
) -> CapabilityMap {
    let mut map = CapabilityMap::empty(catalog);
    for def in catalog.iter() {
        let hit = aliases
            .candidates(def.name)
            .find_map(|(label, candidate)| dictionary.index_of(&candidate).map(|i| (label, i)));
        if let Some((via, index)) = hit {
            map.bindings.insert(def.name, Binding { index, def, via });
        }
    }
    log::debug!(
        "capability resolution: {}/{} channels bound",
        map.len(),
        catalog.len()
    );
    map
}

/// Parse a `{ "name": index, ... }` JSON object into a dictionary.
pub fn parse_dictionary_json(s: &str) -> Result<HashMap<String, usize>, FaceError> {
    serde_json::from_str(s).map_err(|e| FaceError::DictionaryParse(e.to_string()))
}
