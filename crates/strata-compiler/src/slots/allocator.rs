use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use strata_core::QualifiedName;
use strata_core::utils::{friendly_identifier, is_reserved_file_name, is_reserved_word};

/// Character regime of rendered slots, fixed per allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotStyle {
    /// `[a-zA-Z][a-zA-Z0-9]*`
    CaseSensitive,
    /// `[a-z][a-z0-9]*`, safe as a file name on case-insensitive file systems.
    Lowercase,
}

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LOWER_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MIXED: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const MIXED_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl SlotStyle {
    fn alphabets(self) -> (&'static [u8], &'static [u8]) {
        match self {
            Self::CaseSensitive => (MIXED, MIXED_DIGITS),
            Self::Lowercase => (LOWER, LOWER_DIGITS),
        }
    }
}

/// Runtime types with fixed slots in the metadata-defining assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intrinsic {
    Object,
    Type,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 2] = [Intrinsic::Object, Intrinsic::Type];

    /// Rendered slot; `$` keeps it disjoint from generated slots.
    pub fn slot(self) -> &'static str {
        match self {
            Self::Object => "$o",
            Self::Type => "$t",
        }
    }

    /// Name the runtime knows the intrinsic by.
    pub fn runtime_name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Type => "type",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotKey {
    Type(QualifiedName),
    AssemblyRef(String),
    /// Field, event, property or method; overrides use their slot identity.
    Member(QualifiedName),
    Literal(String),
    Intrinsic(Intrinsic),
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => write!(f, "type {name}"),
            Self::AssemblyRef(name) => write!(f, "assembly reference [{name}]"),
            Self::Member(name) => write!(f, "member {name}"),
            Self::Literal(value) => write!(f, "literal {value:?}"),
            Self::Intrinsic(i) => write!(f, "intrinsic {}", i.runtime_name()),
        }
    }
}

/// Resolving a key that was never registered: a compiler bug, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("slot requested for unregistered {0}")]
pub struct UnregisteredSlot(pub String);

/// Injective key → slot mapping for one scope.
///
/// Keys keep registration order; registering a key twice returns its first slot.
#[derive(Clone, Debug)]
pub struct SlotAllocator {
    style: SlotStyle,
    friendly_len: Option<usize>,
    slots: IndexMap<SlotKey, String>,
    taken: HashSet<String>,
    counter: u64,
}

impl SlotAllocator {
    /// `friendly_len` enables friendly candidates capped at that length.
    pub fn new(style: SlotStyle, friendly_len: Option<usize>) -> Self {
        Self {
            style,
            friendly_len,
            slots: IndexMap::new(),
            taken: HashSet::new(),
            counter: 0,
        }
    }

    pub fn style(&self) -> SlotStyle {
        self.style
    }

    /// Assign a slot to `key`, using `human` for the friendly candidate.
    pub fn register(&mut self, key: SlotKey, human: &str) -> &str {
        if let Some(index) = self.slots.get_index_of(&key) {
            return &self.slots[index];
        }

        let slot = match self.friendly_candidate(human) {
            Some(candidate) => candidate,
            None => self.next_synthetic(),
        };
        log::trace!("slot {slot} <- {key}");

        self.taken.insert(slot.clone());
        let (index, _) = self.slots.insert_full(key, slot);
        &self.slots[index]
    }

    /// Bind `key` to a fixed rendered slot.
    pub fn reserve(&mut self, key: SlotKey, slot: &str) {
        self.taken.insert(slot.to_owned());
        self.slots.insert(key, slot.to_owned());
    }

    pub fn resolve(&self, key: &SlotKey) -> Result<&str, UnregisteredSlot> {
        self.slots
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| UnregisteredSlot(key.to_string()))
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered keys and their slots, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &str)> {
        self.slots.iter().map(|(k, v)| (k, v.as_str()))
    }

    fn friendly_candidate(&self, human: &str) -> Option<String> {
        let candidate = friendly_identifier(human, self.friendly_len?)?;
        self.acceptable(&candidate).then_some(candidate)
    }

    fn acceptable(&self, slot: &str) -> bool {
        if self.taken.contains(slot) || is_reserved_word(slot) {
            return false;
        }
        self.style != SlotStyle::Lowercase || !is_reserved_file_name(slot)
    }

    fn next_synthetic(&mut self) -> String {
        loop {
            let slot = synthetic(self.counter, self.style);
            self.counter += 1;
            if self.acceptable(&slot) {
                return slot;
            }
        }
    }
}

/// Bijective numbering: 0 → `a`, shortest identifiers first.
fn synthetic(mut n: u64, style: SlotStyle) -> String {
    let (first, rest) = style.alphabets();
    let (first_len, rest_len) = (first.len() as u64, rest.len() as u64);

    let mut width = 1;
    let mut block = first_len;
    while n >= block {
        n -= block;
        block *= rest_len;
        width += 1;
    }

    let mut tail = Vec::with_capacity(width);
    for _ in 1..width {
        tail.push(rest[(n % rest_len) as usize]);
        n /= rest_len;
    }

    let mut out = String::with_capacity(width);
    out.push(first[n as usize] as char);
    out.extend(tail.iter().rev().map(|&b| b as char));
    out
}

#[cfg(test)]
pub(super) fn synthetic_for_tests(n: u64, style: SlotStyle) -> String {
    synthetic(n, style)
}
