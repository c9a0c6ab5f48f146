//! Namespace registration for embedding hosts.
//!
//! [`register_capabilities`] is the whole load-time sequence: create the
//! outer namespace, create the inner one, add `num_cores` to it, attach it to
//! the outer namespace. Each step only runs if the previous one succeeded,
//! and a failure leaves the host without the capability instead of failing
//! the load.
//!
//! The host side is abstracted by [`EmbeddingHost`]. [`InProcessHost`] is a
//! plain Rust implementation used by the `cmi` binary and the tests; the
//! Python host lives in `crate::python`.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::CStr;
use std::fmt;
use std::sync::Arc;

use crate::config::{
    INNER_NAMESPACE, INNER_NAMESPACE_PATH, NUM_CORES_DOC, NUM_CORES_DOC_C, NUM_CORES_NAME,
    NUM_CORES_NAME_C, OUTER_NAMESPACE,
};
use crate::displaylevel;
use crate::topology::{CoreCountQuery, TopologyError};

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while registering or calling the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The host could not create the named namespace.
    NamespaceCreation(String),
    /// No namespace or callable exists at the given path.
    NotFound(String),
    /// A zero-argument callable received arguments.
    InvalidArgument { function: &'static str, given: usize },
    /// The core-count query failed.
    Query(TopologyError),
    /// The count does not fit the host's native integer.
    Overflow(usize),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::NamespaceCreation(name) => {
                write!(f, "cannot create namespace '{name}'")
            }
            BindingError::NotFound(path) => write!(f, "name '{path}' is not defined"),
            BindingError::InvalidArgument { function, given } => {
                write!(f, "{function}() takes no arguments ({given} given)")
            }
            BindingError::Query(err) => write!(f, "{err}"),
            BindingError::Overflow(count) => {
                write!(f, "core count {count} does not fit a native integer")
            }
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindingError::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopologyError> for BindingError {
    fn from(err: TopologyError) -> Self {
        BindingError::Query(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Values and callables
// ─────────────────────────────────────────────────────────────────────────────

/// A value passed to or returned from an in-process call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
}

/// A zero-argument callable backed by a [`CoreCountQuery`].
#[derive(Clone)]
pub struct NativeFunction {
    name: &'static str,
    doc: &'static str,
    c_name: &'static CStr,
    c_doc: &'static CStr,
    query: Arc<dyn CoreCountQuery>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

impl NativeFunction {
    /// The `num_cores` callable.
    pub fn num_cores(query: Arc<dyn CoreCountQuery>) -> Self {
        NativeFunction {
            name: NUM_CORES_NAME,
            doc: NUM_CORES_DOC,
            c_name: NUM_CORES_NAME_C,
            c_doc: NUM_CORES_DOC_C,
            query,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// [`NativeFunction::name`] as a C string.
    pub fn c_name(&self) -> &'static CStr {
        self.c_name
    }

    /// [`NativeFunction::doc`] as a C string.
    pub fn c_doc(&self) -> &'static CStr {
        self.c_doc
    }

    /// Reject any call that passes arguments.
    pub fn check_arity(&self, given: usize) -> Result<(), BindingError> {
        if given == 0 {
            Ok(())
        } else {
            Err(BindingError::InvalidArgument {
                function: self.name,
                given,
            })
        }
    }

    /// Query the core count and convert it to a native integer.
    pub fn call_native(&self) -> Result<i64, BindingError> {
        let count = self.query.query_core_count()?;
        i64::try_from(count).map_err(|_| BindingError::Overflow(count))
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, BindingError> {
        self.check_arity(args.len())?;
        self.call_native().map(Value::Int)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host abstraction and registration
// ─────────────────────────────────────────────────────────────────────────────

/// The namespace operations an embedding environment must provide.
pub trait EmbeddingHost {
    /// Host handle for a namespace.
    type Module;

    /// Create (or, for the top-level namespace, obtain) the namespace with
    /// the fully-qualified `name`.
    fn init_module(&mut self, name: &str) -> Result<Self::Module, BindingError>;

    fn add_function(
        &mut self,
        module: &Self::Module,
        function: NativeFunction,
    ) -> Result<(), BindingError>;

    /// Make `child` reachable as attribute `name` of `parent`.
    fn add_submodule(
        &mut self,
        parent: &Self::Module,
        name: &str,
        child: Self::Module,
    ) -> Result<(), BindingError>;
}

/// Load-time state of the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Unregistered,
    Registered,
}

impl Registration {
    pub fn is_registered(self) -> bool {
        self == Registration::Registered
    }
}

/// Build `charm` and `charm.cmi`, registering `num_cores` backed by `query`.
///
/// Failures are logged at display level 3 and reported only through the
/// returned [`Registration`]; the host is never left with a half-attached
/// inner namespace.
pub fn register_capabilities<H: EmbeddingHost>(
    host: &mut H,
    query: Arc<dyn CoreCountQuery>,
) -> Registration {
    let outer = match host.init_module(OUTER_NAMESPACE) {
        Ok(module) => module,
        Err(err) => {
            displaylevel!(3, "{}: not registered: {}\n", OUTER_NAMESPACE, err);
            return Registration::Unregistered;
        }
    };

    let inner = match host.init_module(INNER_NAMESPACE_PATH) {
        Ok(module) => module,
        Err(err) => {
            displaylevel!(3, "{}: not registered: {}\n", INNER_NAMESPACE_PATH, err);
            return Registration::Unregistered;
        }
    };

    if let Err(err) = host.add_function(&inner, NativeFunction::num_cores(query)) {
        displaylevel!(3, "{}: not registered: {}\n", INNER_NAMESPACE_PATH, err);
        return Registration::Unregistered;
    }

    if let Err(err) = host.add_submodule(&outer, INNER_NAMESPACE, inner) {
        displaylevel!(3, "{}: not attached: {}\n", INNER_NAMESPACE_PATH, err);
        return Registration::Unregistered;
    }

    displaylevel!(4, "registered {}.{}\n", INNER_NAMESPACE_PATH, NUM_CORES_NAME);
    Registration::Registered
}

// ─────────────────────────────────────────────────────────────────────────────
// In-process host
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a namespace owned by an [`InProcessHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleId(usize);

#[derive(Debug, Default)]
struct ModuleData {
    name: String,
    functions: BTreeMap<&'static str, NativeFunction>,
    submodules: BTreeMap<String, ModuleId>,
}

/// A minimal embedding host living entirely in Rust.
///
/// Top-level namespaces are reachable by name as soon as they are created;
/// dotted namespaces are reachable only once attached to their parent.
#[derive(Debug, Default)]
pub struct InProcessHost {
    modules: Vec<ModuleData>,
    roots: BTreeMap<String, ModuleId>,
    refused: BTreeSet<String>,
}

impl InProcessHost {
    pub fn new() -> Self {
        InProcessHost::default()
    }

    /// Host with the capability registered against `query`.
    pub fn with_capabilities(query: Arc<dyn CoreCountQuery>) -> (Self, Registration) {
        let mut host = InProcessHost::new();
        let registration = register_capabilities(&mut host, query);
        (host, registration)
    }

    /// Make every later `init_module(name)` fail.
    pub fn refuse_module(mut self, name: &str) -> Self {
        self.refused.insert(name.to_string());
        self
    }

    /// `true` if a namespace is reachable at the dotted `path`.
    pub fn has_namespace(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        self.find_module(&segments).is_some()
    }

    /// Look up the callable at the dotted `path`.
    pub fn resolve(&self, path: &str) -> Result<&NativeFunction, BindingError> {
        let not_found = || BindingError::NotFound(path.to_string());
        let segments: Vec<&str> = path.split('.').collect();
        let (function, namespace) = segments.split_last().ok_or_else(not_found)?;
        let module = self.find_module(namespace).ok_or_else(not_found)?;
        self.modules[module.0]
            .functions
            .get(*function)
            .ok_or_else(not_found)
    }

    /// Call the callable at `path` with `args`.
    pub fn call(&self, path: &str, args: &[Value]) -> Result<Value, BindingError> {
        self.resolve(path)?.invoke(args)
    }

    /// Help text of the callable at `path`.
    pub fn doc(&self, path: &str) -> Result<&'static str, BindingError> {
        self.resolve(path).map(NativeFunction::doc)
    }

    /// Names of the top-level namespaces.
    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    fn find_module(&self, segments: &[&str]) -> Option<ModuleId> {
        let (first, rest) = segments.split_first()?;
        let mut current = *self.roots.get(*first)?;
        for segment in rest {
            current = *self.modules[current.0].submodules.get(*segment)?;
        }
        Some(current)
    }

    fn module_mut(&mut self, id: ModuleId) -> Result<&mut ModuleData, BindingError> {
        self.modules
            .get_mut(id.0)
            .ok_or_else(|| BindingError::NotFound(format!("<module #{}>", id.0)))
    }
}

impl EmbeddingHost for InProcessHost {
    type Module = ModuleId;

    fn init_module(&mut self, name: &str) -> Result<ModuleId, BindingError> {
        if name.is_empty() || self.refused.contains(name) {
            return Err(BindingError::NamespaceCreation(name.to_string()));
        }
        let id = ModuleId(self.modules.len());
        self.modules.push(ModuleData {
            name: name.to_string(),
            ..ModuleData::default()
        });
        if !name.contains('.') {
            self.roots.insert(name.to_string(), id);
        }
        Ok(id)
    }

    fn add_function(
        &mut self,
        module: &ModuleId,
        function: NativeFunction,
    ) -> Result<(), BindingError> {
        let data = self.module_mut(*module)?;
        displaylevel!(4, "{}: adding {}\n", data.name, function.name());
        data.functions.insert(function.name(), function);
        Ok(())
    }

    fn add_submodule(
        &mut self,
        parent: &ModuleId,
        name: &str,
        child: ModuleId,
    ) -> Result<(), BindingError> {
        if child.0 >= self.modules.len() {
            return Err(BindingError::NotFound(format!("<module #{}>", child.0)));
        }
        self.module_mut(*parent)?
            .submodules
            .insert(name.to_string(), child);
        Ok(())
    }
}
