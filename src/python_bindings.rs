use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::Counter;
use crate::Lookahead;

/// Count repeated pairs of chars in a string.
#[pyfunction]
fn count_doubles(val: &str) -> usize {
    crate::count_doubles(val)
}

fn lookahead() -> PyResult<&'static Lookahead> {
    Lookahead::shared().map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Same count through the `(?=(.)\1)` lookahead, compiled once per process.
#[pyfunction]
fn count_doubles_regex(val: &str) -> PyResult<usize> {
    lookahead()?
        .count(val)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn doublecount(_py: Python, m: &PyModule) -> PyResult<()> {
    // Compile at import so calls only pay for the search.
    lookahead()?;
    m.add_function(wrap_pyfunction!(count_doubles, m)?)?;
    m.add_function(wrap_pyfunction!(count_doubles_regex, m)?)?;
    Ok(())
}
