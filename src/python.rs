//! Python embedding host.
//!
//! Built with `--features python` (or `extension-module` for a loadable
//! `charm` extension). `PyInit_charm` runs [`register_capabilities`] against
//! a [`PyHost`], so after `import charm` the callable is reachable as
//! `charm.cmi.num_cores()`, and `import charm.cmi` works too.

use pyo3::exceptions::{PyRuntimeError, PyTypeError};
use pyo3::prelude::*;
use pyo3::types::{PyCFunction, PyDict, PyTuple};

use crate::config::OUTER_NAMESPACE;
use crate::registry::{register_capabilities, BindingError, EmbeddingHost, NativeFunction};

fn to_py_err(err: BindingError) -> PyErr {
    match err {
        BindingError::InvalidArgument { .. } => PyTypeError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn to_binding_err(name: &str, err: PyErr) -> BindingError {
    crate::displaylevel!(3, "{}: {}\n", name, err);
    BindingError::NamespaceCreation(name.to_string())
}

/// [`EmbeddingHost`] over the module object handed to `PyInit_charm`.
pub struct PyHost<'py> {
    top: Bound<'py, PyModule>,
}

impl<'py> PyHost<'py> {
    pub fn new(top: Bound<'py, PyModule>) -> Self {
        PyHost { top }
    }
}

impl<'py> EmbeddingHost for PyHost<'py> {
    type Module = Bound<'py, PyModule>;

    fn init_module(&mut self, name: &str) -> Result<Self::Module, BindingError> {
        if name == OUTER_NAMESPACE {
            return Ok(self.top.clone());
        }
        let py = self.top.py();
        let module = PyModule::new_bound(py, name).map_err(|e| to_binding_err(name, e))?;
        py.import_bound("sys")
            .and_then(|sys| sys.getattr("modules"))
            .and_then(|modules| modules.set_item(name, &module))
            .map_err(|e| to_binding_err(name, e))?;
        Ok(module)
    }

    fn add_function(
        &mut self,
        module: &Self::Module,
        function: NativeFunction,
    ) -> Result<(), BindingError> {
        let name = function.name();
        let c_name = function.c_name();
        let c_doc = function.c_doc();
        let callable = PyCFunction::new_closure_bound(
            module.py(),
            Some(c_name),
            Some(c_doc),
            move |args: &Bound<'_, PyTuple>, kwargs: Option<&Bound<'_, PyDict>>| -> PyResult<i64> {
                let given = args.len() + kwargs.map_or(0, |k| k.len());
                function.check_arity(given).map_err(to_py_err)?;
                function.call_native().map_err(to_py_err)
            },
        )
        .map_err(|e| to_binding_err(name, e))?;
        module.add(name, callable).map_err(|e| to_binding_err(name, e))
    }

    fn add_submodule(
        &mut self,
        parent: &Self::Module,
        name: &str,
        child: Self::Module,
    ) -> Result<(), BindingError> {
        parent.add(name, child).map_err(|e| to_binding_err(name, e))
    }
}

#[pymodule]
pub fn charm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    crate::display::init_display_level();
    let mut host = PyHost::new(m.clone());
    register_capabilities(&mut host, crate::default_query());
    Ok(())
}
