//! Distributed container registration via `inventory`.
//!
//! Plugins submit containers from anywhere in the program with
//! [`submit_container!`](crate::submit_container); the host applies every
//! collected container at startup.

use patchbay_core::PatchContainer;

/// A container submitted to the distributed collection.
///
/// Holds a factory rather than the container itself, since containers are
/// built at runtime.
pub struct CollectedContainer {
    /// Name for ordering and diagnostics.
    pub name: &'static str,
    build: fn() -> Box<dyn PatchContainer>,
}

impl CollectedContainer {
    /// Create a collection entry.
    pub const fn new(name: &'static str, build: fn() -> Box<dyn PatchContainer>) -> Self {
        Self { name, build }
    }

    /// Build the container.
    pub fn build(&self) -> Box<dyn PatchContainer> {
        (self.build)()
    }
}

inventory::collect!(CollectedContainer);

/// Every collected container, sorted by name so that application order does
/// not depend on link order.
pub fn collected_containers() -> Vec<&'static CollectedContainer> {
    let mut entries: Vec<&'static CollectedContainer> =
        inventory::iter::<CollectedContainer>.into_iter().collect();
    entries.sort_by(|a, b| a.name.cmp(b.name));
    entries
}

/// Submit a container to the distributed collection.
///
/// The expression is wrapped in a factory and evaluated each time the
/// collection is applied.
///
/// # Example
///
/// ```rust,ignore
/// patchbay_std::submit_container!("PlayerPatches", PatchClass::new("PlayerPatches")
///     .target_type("Game.Player")
///     .member("Update")
///     .before(prefix()));
/// ```
#[macro_export]
macro_rules! submit_container {
    ($name:expr, $container:expr) => {
        $crate::inventory::submit! {
            $crate::collected::CollectedContainer::new(
                $name,
                || -> ::std::boxed::Box<dyn $crate::patchbay_core::PatchContainer> {
                    ::std::boxed::Box::new($container)
                },
            )
        }
    };
}
