//! Static hook metadata.
//!
//! A [`HookDescriptor`] carries everything the engine needs to know about a
//! hook before it exists: its phase, requirements, reload policy, and the
//! factory that builds it. Descriptors are identified by their [`HookKey`],
//! never by their id: ids only appear in log lines and need not be unique.
//!
//! Descriptors come from a typed [`Hook`] via [`HookDescriptor::of`] or from
//! the [`HookDescriptorBuilder`] for hooks assembled at runtime.
//!
//! ```
//! use hookstage_engine::component::{Component, ReloadPolicy};
//! use hookstage_engine::descriptor::HookDescriptor;
//! use hookstage_engine::phase::Phase;
//! use hookstage_engine::requirement::Requirement;
//!
//! struct Metrics;
//! impl Component for Metrics {}
//!
//! let descriptor = HookDescriptor::builder("metrics")
//!     .phase(Phase::Late)
//!     .require(Requirement::new("config", "metrics.enabled"))
//!     .reloadable(ReloadPolicy::asynchronous())
//!     .factory(|| Ok(Metrics))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.phase(), Phase::Late);
//! assert!(descriptor.is_async());
//! ```

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::borrow::Cow;
use std::sync::Arc;

use crate::component::{BoxError, Component, Hook, ReloadPolicy};
use crate::phase::Phase;
use crate::requirement::Requirement;

/// Factory producing a fresh, type-erased component.
pub type Factory = Arc<dyn Fn() -> Result<Arc<dyn Component>, BoxError> + Send + Sync>;

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

// ─────────────────────────────────────────────────────────────────────────────
// HookKey
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of a descriptor.
///
/// Every descriptor receives a fresh key when it is created. Clones of a
/// descriptor share its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookKey(u64);

impl HookKey {
    fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw key value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DescriptorError
// ─────────────────────────────────────────────────────────────────────────────

/// A descriptor that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// The builder was finished without a factory.
    #[error("hook '{0}' has no factory")]
    MissingFactory(String),
    /// Load hooks run before anything can be reloaded and may not be reloadable.
    #[error("hook '{0}' loads in the load phase and cannot be reloadable")]
    ReloadableLoadHook(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// HookDescriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable metadata and factory for one hook.
#[derive(Clone)]
pub struct HookDescriptor {
    key: HookKey,
    id: Cow<'static, str>,
    path: Option<Cow<'static, str>>,
    phase: Phase,
    requirements: Vec<Requirement>,
    reload: Option<ReloadPolicy>,
    factory: Factory,
}

impl HookDescriptor {
    /// Builds the descriptor of a typed hook.
    ///
    /// The descriptor's path is the hook's type path, which discovery
    /// sources match against scan roots.
    pub fn of<H: Hook>() -> Result<Self, DescriptorError> {
        let descriptor = Self {
            key: HookKey::next(),
            id: Cow::Borrowed(H::ID),
            path: Some(Cow::Borrowed(core::any::type_name::<H>())),
            phase: H::PHASE,
            requirements: H::requirements(),
            reload: H::reload_policy(),
            factory: Arc::new(|| H::create().map(|hook| Arc::new(hook) as Arc<dyn Component>)),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Starts building a descriptor for a runtime-assembled hook.
    #[must_use]
    pub fn builder(id: impl Into<Cow<'static, str>>) -> HookDescriptorBuilder {
        HookDescriptorBuilder::new(id)
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        if self.phase == Phase::Load && self.reload.is_some() {
            return Err(DescriptorError::ReloadableLoadHook(self.id.to_string()));
        }
        Ok(())
    }

    /// The descriptor's identity.
    #[must_use]
    pub fn key(&self) -> HookKey {
        self.key
    }

    /// The hook id used in log lines.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn shared_id(&self) -> Cow<'static, str> {
        self.id.clone()
    }

    /// Module path of the hook, if known.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Phase in which the hook is activated.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Requirements in declaration order.
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// The reload policy, if the hook is reloadable.
    #[must_use]
    pub fn reload_policy(&self) -> Option<ReloadPolicy> {
        self.reload
    }

    /// Returns true if the hook may be restarted by a reload.
    #[must_use]
    pub fn is_reloadable(&self) -> bool {
        self.reload.is_some()
    }

    /// Returns true if reloads of this hook run on the async runner.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.reload.is_some_and(|policy| policy.is_async())
    }

    /// Invokes the factory.
    pub fn instantiate(&self) -> Result<Arc<dyn Component>, BoxError> {
        (self.factory)()
    }

    /// Returns true if this descriptor lives under `root`.
    ///
    /// Descriptors without a path were registered explicitly and match
    /// every root.
    #[must_use]
    pub fn is_under(&self, root: &str) -> bool {
        let Some(path) = self.path() else {
            return true;
        };
        match path.strip_prefix(root) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}

impl fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDescriptor")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("path", &self.path)
            .field("phase", &self.phase)
            .field("requirements", &self.requirements)
            .field("reload", &self.reload)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookDescriptorBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`HookDescriptor`].
///
/// The phase defaults to [`Phase::Enable`].
#[must_use]
pub struct HookDescriptorBuilder {
    id: Cow<'static, str>,
    path: Option<Cow<'static, str>>,
    phase: Phase,
    requirements: Vec<Requirement>,
    reload: Option<ReloadPolicy>,
    factory: Option<Factory>,
}

impl HookDescriptorBuilder {
    fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            path: None,
            phase: Phase::default(),
            requirements: Vec::new(),
            reload: None,
            factory: None,
        }
    }

    /// Sets the module path matched against scan roots.
    pub fn path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the activation phase.
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Appends a requirement.
    pub fn require(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Marks the hook reloadable.
    pub fn reloadable(mut self, policy: ReloadPolicy) -> Self {
        self.reload = Some(policy);
        self
    }

    /// Sets the factory.
    pub fn factory<C, F>(mut self, factory: F) -> Self
    where
        C: Component,
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move || {
            factory().map(|component| Arc::new(component) as Arc<dyn Component>)
        }));
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> Result<HookDescriptor, DescriptorError> {
        let Some(factory) = self.factory else {
            return Err(DescriptorError::MissingFactory(self.id.into_owned()));
        };
        let descriptor = HookDescriptor {
            key: HookKey::next(),
            id: self.id,
            path: self.path,
            phase: self.phase,
            requirements: self.requirements,
            reload: self.reload,
            factory,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
