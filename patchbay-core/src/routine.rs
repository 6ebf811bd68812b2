//! # Routine Identity
//!
//! A [`RoutineId`] names one patchable routine: a constructor or a method
//! declared on a type. It is the only key into the shared patch store.
//!
//! Two identities compare equal exactly when they describe the same declaring
//! type, kind, name and parameter signature, no matter which resolver (or
//! which lookup path) produced them.

use std::{fmt, sync::Arc};

/// Whether a routine is a constructor or an ordinary method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoutineKind {
    /// A type constructor.
    Constructor,
    /// A named method.
    Method,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct RoutineKey {
    declaring_type: Arc<str>,
    kind: RoutineKind,
    name: Arc<str>,
    parameters: Box<[Arc<str>]>,
}

/// Opaque, cheaply cloneable handle identifying one patchable routine.
///
/// # Example
///
/// ```rust
/// use patchbay_core::RoutineId;
///
/// let a = RoutineId::method("Game.Player", "Update", ["float"]);
/// let b = RoutineId::method("Game.Player", "Update", ["float"]);
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "Game.Player::Update(float)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutineId(Arc<RoutineKey>);

impl RoutineId {
    /// Name used for constructors in diagnostics.
    pub const CONSTRUCTOR_NAME: &'static str = ".ctor";

    /// Identify a method by declaring type, name and parameter type names.
    pub fn method<P, S>(declaring_type: &str, name: &str, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(declaring_type, RoutineKind::Method, name, parameters)
    }

    /// Identify a constructor by declaring type and parameter type names.
    pub fn constructor<P, S>(declaring_type: &str, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(
            declaring_type,
            RoutineKind::Constructor,
            Self::CONSTRUCTOR_NAME,
            parameters,
        )
    }

    fn build<P, S>(declaring_type: &str, kind: RoutineKind, name: &str, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(Arc::new(RoutineKey {
            declaring_type: Arc::from(declaring_type),
            kind,
            name: Arc::from(name),
            parameters: parameters
                .into_iter()
                .map(|p| Arc::from(p.as_ref()))
                .collect(),
        }))
    }

    /// The fully qualified name of the declaring type.
    pub fn declaring_type(&self) -> &str {
        &self.0.declaring_type
    }

    /// Constructor or method.
    pub fn kind(&self) -> RoutineKind {
        self.0.kind
    }

    /// Member name (`.ctor` for constructors).
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Parameter type names in declaration order.
    pub fn parameters(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.0.parameters.iter().map(|p| &**p)
    }

    /// Whether the parameter list matches `expected` exactly.
    pub fn has_parameters<S: AsRef<str>>(&self, expected: &[S]) -> bool {
        self.0.parameters.len() == expected.len()
            && self
                .0
                .parameters
                .iter()
                .zip(expected)
                .all(|(have, want)| &**have == want.as_ref())
    }

    /// Whether this routine is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.0.kind == RoutineKind::Constructor
    }
}

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.0.declaring_type, self.0.name)?;
        for (i, param) in self.0.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param)?;
        }
        f.write_str(")")
    }
}

/// Identity of a patch owner (a plugin or module).
///
/// Owners scope removal: an owner can only strip its own records unless it
/// uses the [`OwnerId::wildcard`] identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(Arc<str>);

impl OwnerId {
    const WILDCARD: &'static str = "*";

    /// Create an owner identity.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identity that matches every owner during removal.
    pub fn wildcard() -> Self {
        Self::new(Self::WILDCARD)
    }

    /// Whether this is the match-all identity.
    pub fn is_wildcard(&self) -> bool {
        &*self.0 == Self::WILDCARD
    }

    /// Whether a record owned by `owner` is selected by this identity.
    pub fn matches(&self, owner: &OwnerId) -> bool {
        self.is_wildcard() || self == owner
    }

    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}
