use std::collections::HashMap;
use std::fmt::Debug;

use mp_tensor::Tensor;

use crate::artifact::CompiledArtifact;
use crate::error::{HarnessError, Result};

/// The conventional entry point exposed by every compiled model.
pub const DEFAULT_ENTRY_POINT: &str = "forward";

/// A boxed entry-point function mapping an input tensor to an output tensor.
pub type EntryPointFn = Box<dyn Fn(&Tensor) -> Result<Tensor> + Send + Sync>;

/// A callable wrapper around a loaded artifact's entry points.
///
/// Entry points are an explicit name-to-callable map built by
/// `Runtime::load`, so an unknown function lookup fails fast with
/// `HarnessError::UnknownEntryPoint` instead of an ambiguous dispatch
/// error. Stateless across calls; its lifetime is bound to whatever the
/// runtime captured in the callables.
pub struct Invoker {
    backend_name: String,
    entry_points: HashMap<String, EntryPointFn>,
}

impl Invoker {
    /// Create an invoker with no entry points.
    pub fn new(backend_name: impl Into<String>) -> Self {
        Invoker {
            backend_name: backend_name.into(),
            entry_points: HashMap::new(),
        }
    }

    /// The name of the backend that loaded this invoker.
    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Register an entry point under the given name, replacing any
    /// previous registration.
    pub fn register(&mut self, name: impl Into<String>, f: EntryPointFn) {
        self.entry_points.insert(name.into(), f);
    }

    /// Returns true if an entry point with this name is registered.
    pub fn has_entry_point(&self, name: &str) -> bool {
        self.entry_points.contains_key(name)
    }

    /// Returns the registered entry-point names, sorted.
    pub fn entry_point_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entry_points.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke the named entry point on an input tensor.
    ///
    /// # Errors
    /// Returns `HarnessError::UnknownEntryPoint` if no entry point with
    /// this name is registered, or whatever the entry point itself raises.
    pub fn invoke(&self, name: &str, input: &Tensor) -> Result<Tensor> {
        let f = self
            .entry_points
            .get(name)
            .ok_or_else(|| HarnessError::UnknownEntryPoint(name.to_string()))?;
        f(input)
    }
}

impl Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("backend_name", &self.backend_name)
            .field("entry_points", &self.entry_point_names())
            .finish()
    }
}

/// Trait for runtimes that instantiate compiled artifacts.
///
/// Instantiation failures (corrupt bytes, missing modules) are reported as
/// `HarnessError::Load`, keeping them distinct from compilation failures.
pub trait Runtime: Send + Sync + Debug {
    /// Returns the name of this runtime (e.g., "reference").
    fn name(&self) -> &str;

    /// Load a compiled artifact into an executable `Invoker`.
    ///
    /// # Errors
    /// Returns `HarnessError::Load` if the artifact cannot be instantiated.
    fn load(&self, artifact: &CompiledArtifact) -> Result<Invoker>;
}
