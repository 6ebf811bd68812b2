//! Hook methods and layered patch descriptors.
//!
//! A [`PatchDescriptor`] is the structured form of the declarative metadata a
//! container carries: the hook routine plus optional targeting and ordering
//! fields. Descriptors are layered with [`PatchDescriptor::merge`], where the
//! more specific (leaf) layer wins field by field.

use crate::routine::{OwnerId, RoutineId};
use std::fmt;

/// Ordering hints for patch records. Higher values run first.
pub mod priority {
    /// Run before everything else.
    pub const FIRST: i32 = 800;
    /// Run early.
    pub const HIGH: i32 = 400;
    /// Default priority.
    pub const NORMAL: i32 = 0;
    /// Run late.
    pub const LOW: i32 = -400;
    /// Run after everything else.
    pub const LAST: i32 = -800;
}

/// How a hook routine is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// Free-standing routine, callable without an instance.
    Static,
    /// Routine bound to an instance of its declaring type.
    Instance,
}

/// Reference to the routine that implements a hook.
///
/// Hook references are compared by routine identity; two records that point
/// at the same hook routine are the same hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookMethod {
    routine: RoutineId,
    receiver: Receiver,
}

impl HookMethod {
    /// A static hook routine.
    pub fn new(routine: RoutineId) -> Self {
        Self {
            routine,
            receiver: Receiver::Static,
        }
    }

    /// An instance-bound hook routine. Processors reject these.
    pub fn instance(routine: RoutineId) -> Self {
        Self {
            routine,
            receiver: Receiver::Instance,
        }
    }

    /// The hook routine.
    pub fn routine(&self) -> &RoutineId {
        &self.routine
    }

    /// How the routine is bound.
    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    /// Whether the routine can be called without an instance.
    pub fn is_static(&self) -> bool {
        self.receiver == Receiver::Static
    }
}

impl fmt::Display for HookMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.receiver {
            Receiver::Static => write!(f, "static {}", self.routine),
            Receiver::Instance => write!(f, "{}", self.routine),
        }
    }
}

/// Layered declarative metadata for one hook.
///
/// Every field is optional so that layers can be merged: container-level
/// defaults first, then the hook's own attributes on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchDescriptor {
    /// The hook routine. A descriptor without one contributes no record.
    pub method: Option<HookMethod>,
    /// Declaring type of the routine to patch.
    pub target_type: Option<String>,
    /// Member name of the routine to patch; absent selects a constructor.
    pub member_name: Option<String>,
    /// Parameter signature of the routine to patch.
    pub parameters: Option<Vec<String>>,
    /// Ordering hint, see [`priority`].
    pub priority: Option<i32>,
    /// Owners whose records this hook must run before.
    pub before: Option<Vec<OwnerId>>,
    /// Owners whose records this hook must run after.
    pub after: Option<Vec<OwnerId>>,
}

impl PatchDescriptor {
    /// Empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for a hook routine with no other metadata.
    pub fn hook(method: HookMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Set the hook routine.
    pub fn with_method(mut self, method: HookMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the target type.
    pub fn with_target_type(mut self, ty: impl Into<String>) -> Self {
        self.target_type = Some(ty.into());
        self
    }

    /// Set the target member name.
    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }

    /// Set the target parameter signature.
    pub fn with_parameters<P, S>(mut self, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = Some(parameters.into_iter().map(Into::into).collect());
        self
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Require this hook to run before `owner`'s records.
    pub fn run_before(mut self, owner: impl Into<OwnerId>) -> Self {
        self.before.get_or_insert_with(Vec::new).push(owner.into());
        self
    }

    /// Require this hook to run after `owner`'s records.
    pub fn run_after(mut self, owner: impl Into<OwnerId>) -> Self {
        self.after.get_or_insert_with(Vec::new).push(owner.into());
        self
    }

    /// Layer `leaf` over `self`. Fields set in `leaf` win.
    pub fn merge(&self, leaf: &PatchDescriptor) -> PatchDescriptor {
        PatchDescriptor {
            method: leaf.method.clone().or_else(|| self.method.clone()),
            target_type: leaf.target_type.clone().or_else(|| self.target_type.clone()),
            member_name: leaf.member_name.clone().or_else(|| self.member_name.clone()),
            parameters: leaf.parameters.clone().or_else(|| self.parameters.clone()),
            priority: leaf.priority.or(self.priority),
            before: leaf.before.clone().or_else(|| self.before.clone()),
            after: leaf.after.clone().or_else(|| self.after.clone()),
        }
    }

    /// Fold layers in order; later layers win.
    pub fn merge_all<'a, I>(layers: I) -> PatchDescriptor
    where
        I: IntoIterator<Item = &'a PatchDescriptor>,
    {
        layers
            .into_iter()
            .fold(PatchDescriptor::default(), |acc, layer| acc.merge(layer))
    }
}

/// The three hook descriptors one processor contributes to each routine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchHooks {
    /// Before-hook descriptor.
    pub before: PatchDescriptor,
    /// After-hook descriptor.
    pub after: PatchDescriptor,
    /// Override descriptor.
    pub overrides: PatchDescriptor,
}

impl PatchHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the before-hook.
    pub fn before(mut self, descriptor: PatchDescriptor) -> Self {
        self.before = descriptor;
        self
    }

    /// Set the after-hook.
    pub fn after(mut self, descriptor: PatchDescriptor) -> Self {
        self.after = descriptor;
        self
    }

    /// Set the override hook.
    pub fn overrides(mut self, descriptor: PatchDescriptor) -> Self {
        self.overrides = descriptor;
        self
    }
}
