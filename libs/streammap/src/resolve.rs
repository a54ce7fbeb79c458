//! Pluggable layer-name resolution policies.
//!
//! The parser groups records under the key produced by a [`NameResolver`].
//! Resolvers are injected at parser construction; any value implementing the
//! single [`NameResolver::resolve`] operation is acceptable.

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use thiserror::Error;

/// Resolves a stream map record to the key under which it is grouped.
pub trait NameResolver {
    /// Produces the grouping key for a record.
    ///
    /// `alias` is the design-manual layer name from the record's trailing
    /// comment, if present. `purpose` is accepted so policies can fold
    /// sub-purposes into the key; the default policy ignores it.
    ///
    /// Must be pure: no side effects, same key for same inputs.
    fn resolve(&self, alias: Option<&str>, layer: &str, purpose: &str) -> ArcStr;
}

/// The default policy: the design-manual alias when present and non-empty,
/// else the vendor layer name.
///
/// This lets design teams assign a canonical cross-tool layer name
/// independent of the vendor-specific layer/purpose pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasResolver;

impl NameResolver for AliasResolver {
    fn resolve(&self, alias: Option<&str>, layer: &str, _purpose: &str) -> ArcStr {
        match alias {
            Some(alias) if !alias.is_empty() => ArcStr::from(alias),
            _ => ArcStr::from(layer),
        }
    }
}

/// Groups by the raw vendor layer name, ignoring aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerNameResolver;

impl NameResolver for LayerNameResolver {
    fn resolve(&self, _alias: Option<&str>, layer: &str, _purpose: &str) -> ArcStr {
        ArcStr::from(layer)
    }
}

/// Groups by the full layer-purpose pair, as `layer.purpose`.
///
/// Useful when distinct purposes of the same layer (e.g. "net" sub-purposes)
/// must not share a group.
#[derive(Debug, Clone, Copy, Default)]
pub struct LppResolver;

impl NameResolver for LppResolver {
    fn resolve(&self, _alias: Option<&str>, layer: &str, purpose: &str) -> ArcStr {
        arcstr::format!("{}.{}", layer, purpose)
    }
}

/// A named built-in resolution policy, selectable from the command line.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub enum Policy {
    /// Alias when present, else layer name.
    ///
    /// Selected by default.
    #[default]
    Alias,
    /// Always the raw layer name.
    Layer,
    /// The layer-purpose pair.
    Lpp,
}

/// An error parsing a resolution policy from a string.
#[derive(Copy, Clone, Debug, Error)]
#[error("unknown layer name mapper; expected one of `alias`, `layer`, `lpp`")]
pub struct ParsePolicyError;

impl Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alias => write!(f, "alias"),
            Self::Layer => write!(f, "layer"),
            Self::Lpp => write!(f, "lpp"),
        }
    }
}

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alias" => Ok(Self::Alias),
            "layer" => Ok(Self::Layer),
            "lpp" => Ok(Self::Lpp),
            _ => Err(ParsePolicyError),
        }
    }
}

impl NameResolver for Policy {
    fn resolve(&self, alias: Option<&str>, layer: &str, purpose: &str) -> ArcStr {
        match self {
            Self::Alias => AliasResolver.resolve(alias, layer, purpose),
            Self::Layer => LayerNameResolver.resolve(alias, layer, purpose),
            Self::Lpp => LppResolver.resolve(alias, layer, purpose),
        }
    }
}
