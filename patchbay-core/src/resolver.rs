//! Routine lookup boundary.

use crate::routine::RoutineId;

/// Locates patchable routines by declaration metadata.
///
/// A `parameters` value of `None` means "no signature given": for methods the
/// first overload with the requested name matches, for constructors the
/// parameterless constructor does.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve routines",
    label = "missing `RoutineResolver` implementation",
    note = "Implement `RoutineResolver` to look routines up by type, name and signature."
)]
pub trait RoutineResolver: Send + Sync {
    /// Whether the type is known at all.
    fn contains_type(&self, ty: &str) -> bool;

    /// Look up a constructor.
    fn constructor(&self, ty: &str, parameters: Option<&[String]>) -> Option<RoutineId>;

    /// Look up a method.
    fn method(&self, ty: &str, name: &str, parameters: Option<&[String]>) -> Option<RoutineId>;

    /// Every constructor declared directly on the type.
    fn declared_constructors(&self, ty: &str) -> Vec<RoutineId>;

    /// Every method declared directly on the type.
    fn declared_methods(&self, ty: &str) -> Vec<RoutineId>;
}
