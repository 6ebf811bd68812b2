//! Builder-style patch container.

use patchbay_core::{
    DeclaredHook, DeclaredHooks, HookMethod, LifecycleHook, LifecycleHooks, PatchContainer,
    PatchDescriptor, RoutineId,
};

/// A [`PatchContainer`] assembled at runtime.
///
/// # Example
///
/// ```rust
/// use patchbay_core::{HookMethod, LifecycleHook, PatchContainer, RoutineId};
/// use patchbay_std::container::PatchClass;
///
/// let class = PatchClass::new("PlayerPatches")
///     .target_type("Game.Player")
///     .member("Update")
///     .before(HookMethod::new(RoutineId::method(
///         "PlayerPatches",
///         "Prefix",
///         Vec::<&str>::new(),
///     )))
///     .prepare(LifecycleHook::bare(|| Ok(true)));
///
/// assert_eq!(class.name(), "PlayerPatches");
/// assert!(class.hooks().before.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatchClass {
    name: String,
    attributes: PatchDescriptor,
    patch_all: bool,
    hooks: DeclaredHooks,
    lifecycle: LifecycleHooks,
}

impl PatchClass {
    /// Create an empty container.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Replace the container-level metadata.
    pub fn with_attributes(mut self, attributes: PatchDescriptor) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the target type.
    pub fn target_type(mut self, ty: impl Into<String>) -> Self {
        self.attributes.target_type = Some(ty.into());
        self
    }

    /// Set the target member. Without one, a constructor is targeted.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.attributes.member_name = Some(name.into());
        self
    }

    /// Set the target parameter signature.
    pub fn parameters<P, S>(mut self, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.parameters = Some(parameters.into_iter().map(Into::into).collect());
        self
    }

    /// Set the default priority for every hook.
    pub fn priority(mut self, priority: i32) -> Self {
        self.attributes.priority = Some(priority);
        self
    }

    /// Patch every declared constructor and method of the target type.
    pub fn patch_all_members(mut self) -> Self {
        self.patch_all = true;
        self
    }

    /// Declare the before-hook.
    pub fn before(self, method: HookMethod) -> Self {
        self.before_hook(DeclaredHook::new(method))
    }

    /// Declare the before-hook with its own metadata.
    pub fn before_hook(mut self, hook: DeclaredHook) -> Self {
        self.hooks.before = Some(hook);
        self
    }

    /// Declare the after-hook.
    pub fn after(self, method: HookMethod) -> Self {
        self.after_hook(DeclaredHook::new(method))
    }

    /// Declare the after-hook with its own metadata.
    pub fn after_hook(mut self, hook: DeclaredHook) -> Self {
        self.hooks.after = Some(hook);
        self
    }

    /// Declare the override hook.
    pub fn overrides(self, method: HookMethod) -> Self {
        self.override_hook(DeclaredHook::new(method))
    }

    /// Declare the override hook with its own metadata.
    pub fn override_hook(mut self, hook: DeclaredHook) -> Self {
        self.hooks.overrides = Some(hook);
        self
    }

    /// Declare a `prepare` overload.
    pub fn prepare(mut self, hook: LifecycleHook<bool>) -> Self {
        self.lifecycle.prepare.declare(hook);
        self
    }

    /// Declare a `cleanup` overload.
    pub fn cleanup(mut self, hook: LifecycleHook<()>) -> Self {
        self.lifecycle.cleanup.declare(hook);
        self
    }

    /// Declare a `target_method` overload.
    pub fn target_method(mut self, hook: LifecycleHook<Option<RoutineId>>) -> Self {
        self.lifecycle.target_method.declare(hook);
        self
    }

    /// Declare a `target_methods` overload.
    pub fn target_methods(mut self, hook: LifecycleHook<Option<Vec<RoutineId>>>) -> Self {
        self.lifecycle.target_methods.declare(hook);
        self
    }
}

impl PatchContainer for PatchClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> PatchDescriptor {
        self.attributes.clone()
    }

    fn patch_all(&self) -> bool {
        self.patch_all
    }

    fn hooks(&self) -> DeclaredHooks {
        self.hooks.clone()
    }

    fn lifecycle(&self) -> LifecycleHooks {
        self.lifecycle.clone()
    }
}
