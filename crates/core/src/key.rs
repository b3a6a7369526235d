//! Datastore keys
//!
//! A [`Key`] names one entity: a kind, an optional identifier (numeric id or
//! string name), a namespace and an optional parent key. The parent chain is
//! owned (`Option<Box<Key>>`), so a key is an independent tree value that can
//! be cloned and moved across threads freely.
//!
//! ## Encodings
//!
//! | Form | Producer | Consumer |
//! |------|----------|----------|
//! | structured JSON | `serde` | `serde` |
//! | literal `KEY(Kind, 1)` | [`Key::to_literal`] / `Display` | [`Key::parse_literal`] |
//! | opaque token | [`Key::encode`] | [`Key::decode`] |
//! | wire-proto text | [`Key::encode_wire_proto`] | [`Key::parse_wire_proto`] |

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::literal::LiteralParser;
use crate::wire;

/// Property name that refers to an entity's own key in queries.
pub const KEY_PROPERTY: &str = "__key__";

/// The identifier carried by one key level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Numeric id (never zero)
    Id(i64),
    /// String name (never empty)
    Name(String),
}

/// Hierarchical entity key.
///
/// Keys are built once and never mutated; the builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeyRepr", into = "KeyRepr")]
pub struct Key {
    kind: String,
    identifier: Option<Identifier>,
    namespace: String,
    parent: Option<Box<Key>>,
}

impl Key {
    /// Key with a numeric id. The id must be positive.
    pub fn with_id(kind: impl Into<String>, id: i64) -> Result<Self> {
        Self::new(kind, Some(Identifier::Id(id)))
    }

    /// Key with a string name. The name must not be empty.
    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Self::new(kind, Some(Identifier::Name(name.into())))
    }

    /// Partial key awaiting a server-assigned id.
    pub fn incomplete(kind: impl Into<String>) -> Result<Self> {
        Self::new(kind, None)
    }

    /// Key with an explicit (possibly absent) identifier.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`] for an empty kind, an id that is not positive
    /// or an empty name.
    pub fn new(kind: impl Into<String>, identifier: Option<Identifier>) -> Result<Self> {
        let kind = kind.into();
        validate_level(&kind, identifier.as_ref())?;
        Ok(Key {
            kind,
            identifier,
            namespace: String::new(),
            parent: None,
        })
    }

    /// Build a chain from root-first levels, every level in `namespace`.
    /// Only the last level may be incomplete.
    pub fn from_path<I, S>(namespace: impl Into<String>, levels: I) -> Result<Key>
    where
        I: IntoIterator<Item = (S, Option<Identifier>)>,
        S: Into<String>,
    {
        let mut key: Option<Key> = None;
        for (kind, identifier) in levels {
            let level = Key::new(kind, identifier)?;
            key = Some(match key {
                Some(parent) => level.parent_key(parent)?,
                None => level,
            });
        }
        key.map(|k| k.in_namespace(namespace))
            .ok_or_else(|| Error::InvalidKey("key has no path".to_string()))
    }

    /// Attach a parent key. The parent must be complete, and it moves into
    /// this key's namespace.
    pub fn parent_key(mut self, parent: Key) -> Result<Self> {
        if parent.is_incomplete() {
            return Err(Error::InvalidKey(format!(
                "ancestor {} has no id or name",
                parent.to_literal()
            )));
        }
        self.parent = Some(Box::new(parent.in_namespace(self.namespace.clone())));
        Ok(self)
    }

    /// Move the whole chain into `namespace`.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.parent = self
            .parent
            .map(|parent| Box::new(parent.in_namespace(namespace.clone())));
        self.namespace = namespace;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    /// Numeric id, if this level has one.
    pub fn id(&self) -> Option<i64> {
        match self.identifier {
            Some(Identifier::Id(id)) => Some(id),
            _ => None,
        }
    }

    /// String name, if this level has one.
    pub fn name(&self) -> Option<&str> {
        match &self.identifier {
            Some(Identifier::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    /// True when this level has neither id nor name.
    pub fn is_incomplete(&self) -> bool {
        self.identifier.is_none()
    }

    /// Levels of the chain, root first.
    pub fn path(&self) -> Vec<&Key> {
        let mut levels: Vec<&Key> = std::iter::successors(Some(self), |k| k.parent()).collect();
        levels.reverse();
        levels
    }

    // ========================================================================
    // Wire form
    // ========================================================================

    /// Build the protocol key: root-first path plus a partition carrying the
    /// namespace when it is non-empty.
    pub fn to_wire(&self) -> wire::Key {
        let path = self
            .path()
            .into_iter()
            .map(|level| wire::key::PathElement {
                kind: level.kind.clone(),
                id_type: level.identifier.as_ref().map(|ident| match ident {
                    Identifier::Id(id) => wire::key::path_element::IdType::Id(*id),
                    Identifier::Name(name) => wire::key::path_element::IdType::Name(name.clone()),
                }),
            })
            .collect();

        let partition_id = (!self.namespace.is_empty()).then(|| wire::PartitionId {
            namespace_id: self.namespace.clone(),
            ..Default::default()
        });

        wire::Key { partition_id, path }
    }

    /// Inverse of [`Key::to_wire`]. Every level receives the partition's
    /// namespace; an id of 0 or an empty name reads as incomplete.
    pub fn from_wire(src: &wire::Key) -> Result<Key> {
        let namespace = src
            .partition_id
            .as_ref()
            .map(|p| p.namespace_id.as_str())
            .unwrap_or_default();

        let levels = src.path.iter().map(|element| {
            let identifier = match &element.id_type {
                Some(wire::key::path_element::IdType::Id(0)) | None => None,
                Some(wire::key::path_element::IdType::Id(id)) => Some(Identifier::Id(*id)),
                Some(wire::key::path_element::IdType::Name(name)) if name.is_empty() => None,
                Some(wire::key::path_element::IdType::Name(name)) => {
                    Some(Identifier::Name(name.clone()))
                }
            };
            (element.kind.as_str(), identifier)
        });
        Key::from_path(namespace, levels)
    }

    // ========================================================================
    // Opaque token
    // ========================================================================

    /// The store's compact token: URL-safe base64 (unpadded) of the binary
    /// wire key.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_wire().encode_to_vec())
    }

    /// Decode an opaque token. Trailing `=` padding is tolerated.
    pub fn decode(token: &str) -> Result<Key> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim_end_matches('='))?;
        let wire_key = wire::Key::decode(bytes.as_slice())?;
        Key::from_wire(&wire_key)
    }

    // ========================================================================
    // Wire-proto text token
    // ========================================================================

    /// Text form of the wire key, percent-encoded into one shell-safe token.
    pub fn encode_wire_proto(&self) -> String {
        crate::prototext::encode_key(&self.to_wire())
    }

    /// Inverse of [`Key::encode_wire_proto`].
    pub fn parse_wire_proto(token: &str) -> Result<Key> {
        let wire_key = crate::prototext::decode_key(token)?;
        Key::from_wire(&wire_key)
    }

    // ========================================================================
    // Literal form
    // ========================================================================

    /// Parse `KEY([NAMESPACE("ns"),] Kind, idOrName[, Kind, idOrName]*)`.
    ///
    /// Every level receives the literal's namespace when present, otherwise
    /// `default_namespace`.
    pub fn parse_literal(text: &str, default_namespace: &str) -> Result<Key> {
        LiteralParser::new(text).parse(default_namespace)
    }

    /// Parse a command-line key: opaque token first, literal second.
    pub fn parse(text: &str, default_namespace: &str) -> Result<Key> {
        match Key::decode(text) {
            Ok(key) => Ok(key),
            Err(err) => {
                tracing::debug!(input = text, error = %err, "not an opaque key, trying literal form");
                Key::parse_literal(text, default_namespace)
            }
        }
    }

    /// Render the literal form, e.g. `KEY(NAMESPACE("ns"), Org, 1, Person, "alice")`.
    pub fn to_literal(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KEY(")?;
        if !self.namespace.is_empty() {
            write!(f, "NAMESPACE({}), ", quote_string(&self.namespace))?;
        }
        for (i, level) in self.path().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&quote_kind(&level.kind))?;
            match &level.identifier {
                Some(Identifier::Id(id)) => write!(f, ", {}", id)?,
                Some(Identifier::Name(name)) => write!(f, ", {}", quote_string(name))?,
                None => {}
            }
        }
        f.write_str(")")
    }
}

fn validate_level(kind: &str, identifier: Option<&Identifier>) -> Result<()> {
    if kind.is_empty() {
        return Err(Error::InvalidKey("kind must not be empty".to_string()));
    }
    match identifier {
        Some(Identifier::Id(id)) if *id <= 0 => Err(Error::InvalidKey(format!(
            "id of {} must be positive, got {}",
            kind, id
        ))),
        Some(Identifier::Name(name)) if name.is_empty() => Err(Error::InvalidKey(format!(
            "name of {} must not be empty",
            kind
        ))),
        _ => Ok(()),
    }
}

/// Quote a kind for the literal form. Bare kinds are limited to identifier
/// characters; anything else is back-quoted with embedded back-quotes
/// doubled.
pub fn quote_kind(kind: &str) -> String {
    if kind.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        kind.to_string()
    } else {
        format!("`{}`", kind.replace('`', "``"))
    }
}

/// Double-quote a name or namespace for the literal form.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

// ============================================================================
// JSON form
// ============================================================================

/// `{"kind", "id"?, "name"?, "parent"?, "namespace"?}`
#[derive(Clone, Serialize, Deserialize)]
struct KeyRepr {
    kind: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Box<Key>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    namespace: String,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

impl TryFrom<KeyRepr> for Key {
    type Error = Error;

    fn try_from(repr: KeyRepr) -> Result<Self> {
        if repr.kind.is_empty() {
            return Err(Error::InvalidEncoding("key kind must not be empty".to_string()));
        }
        let identifier = match (repr.id, repr.name) {
            (0, name) if name.is_empty() => None,
            (0, name) => Some(Identifier::Name(name)),
            (id, name) if name.is_empty() => Some(Identifier::Id(id)),
            (_, _) => {
                return Err(Error::InvalidEncoding(
                    "key must not carry both id and name".to_string(),
                ))
            }
        };
        let key = Key::new(repr.kind, identifier)?;
        let key = match repr.parent {
            Some(parent) => key.parent_key(*parent)?,
            None => key,
        };
        Ok(key.in_namespace(repr.namespace))
    }
}

impl From<Key> for KeyRepr {
    fn from(key: Key) -> Self {
        let (id, name) = match key.identifier {
            Some(Identifier::Id(id)) => (id, String::new()),
            Some(Identifier::Name(name)) => (0, name),
            None => (0, String::new()),
        };
        KeyRepr {
            kind: key.kind,
            id,
            name,
            parent: key.parent,
            namespace: key.namespace,
        }
    }
}
