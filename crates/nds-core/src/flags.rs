//! Bit-flag enumerations with multi-key lookup.
//!
//! NDS2 describes channel types and sample encodings as integer bit flags,
//! each with an upper-case member name (`MTREND`) and a protocol name
//! (`m-trend`). Users type any of these, in any case, plus a few common
//! synonyms (`reduced`, `double`). [`NdsFlag`] gives every such enumeration:
//!
//! - [`NdsFlag::any`]: the union of every flag value, `2 * max - 1`
//! - [`NdsFlag::find`]: lookup by name, value, protocol name or synonym
//!
//! Lookups go through a [`FlagIndex`] built once per enumeration on first use.
//! Keys are compared case-insensitively with `-` and `_` ignored, so
//! `mtrend`, `m-trend` and `MTREND` resolve to the same member.

use std::collections::HashMap;
use std::fmt;

use crate::error::LookupError;

/// Key accepted by [`NdsFlag::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKey<'a> {
    /// Member name, protocol name or synonym.
    Name(&'a str),
    /// Integer flag value.
    Value(u32),
}

impl<'a> From<&'a str> for FlagKey<'a> {
    fn from(name: &'a str) -> Self {
        FlagKey::Name(name)
    }
}

impl<'a> From<&'a String> for FlagKey<'a> {
    fn from(name: &'a String) -> Self {
        FlagKey::Name(name.as_str())
    }
}

impl From<u32> for FlagKey<'_> {
    fn from(value: u32) -> Self {
        FlagKey::Value(value)
    }
}

impl fmt::Display for FlagKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKey::Name(name) => f.write_str(name),
            FlagKey::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Lookup table for one [`NdsFlag`] enumeration.
#[derive(Debug)]
pub struct FlagIndex<F> {
    by_key: HashMap<String, F>,
    by_value: HashMap<u32, F>,
    any: u32,
}

impl<F: NdsFlag> FlagIndex<F> {
    /// Build the index from [`NdsFlag::members`].
    ///
    /// When two members claim the same normalised key the first declared wins.
    pub fn build() -> Self {
        let mut by_key = HashMap::new();
        let mut by_value = HashMap::new();

        for &member in F::members() {
            by_value.entry(member.value()).or_insert(member);
            let keys = [member.name(), member.nds2name()]
                .into_iter()
                .chain(member.synonyms().iter().copied());
            for key in keys {
                by_key.entry(normalize_key(key)).or_insert(member);
            }
        }

        let max = F::members().iter().map(|m| m.value()).max().unwrap_or(0);

        Self {
            by_key,
            by_value,
            any: (2 * max).saturating_sub(1),
        }
    }

    /// Union mask of every member.
    #[must_use]
    pub fn any(&self) -> u32 {
        self.any
    }

    fn lookup(&self, key: FlagKey<'_>) -> Option<F> {
        match key {
            FlagKey::Value(value) => self.by_value.get(&value).copied(),
            FlagKey::Name(name) => self
                .by_key
                .get(&normalize_key(name.trim()))
                .copied()
                .or_else(|| {
                    name.trim()
                        .parse::<u32>()
                        .ok()
                        .and_then(|value| self.by_value.get(&value).copied())
                }),
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// An enumeration of NDS2 bit flags.
pub trait NdsFlag: Copy + Eq + fmt::Debug + Sized + 'static {
    /// Enumeration name used in lookup error messages.
    const TYPE_NAME: &'static str;

    /// Every member, in declaration order.
    fn members() -> &'static [Self];

    /// Integer flag value.
    fn value(self) -> u32;

    /// Upper-case member name, e.g. `MTREND`.
    fn name(self) -> &'static str;

    /// Name used by the NDS2 protocol, e.g. `m-trend`.
    fn nds2name(self) -> &'static str;

    /// Extra accepted spellings.
    fn synonyms(self) -> &'static [&'static str] {
        &[]
    }

    /// The lazily built lookup table for this enumeration.
    fn index() -> &'static FlagIndex<Self>;

    /// Mask matching every member (`2 * max(value) - 1`).
    fn any() -> u32 {
        Self::index().any()
    }

    /// Protocol names of every member.
    fn nds2names() -> Vec<&'static str> {
        Self::members().iter().map(|m| m.nds2name()).collect()
    }

    /// Find the member matching `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] naming `key` and [`Self::TYPE_NAME`] when
    /// nothing matches.
    fn find<'a>(key: impl Into<FlagKey<'a>>) -> Result<Self, LookupError> {
        let key = key.into();
        Self::index()
            .lookup(key)
            .ok_or_else(|| LookupError::new(key.to_string(), Self::TYPE_NAME))
    }
}
