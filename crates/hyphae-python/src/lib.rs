//! PyO3 bindings for the Hyphae analytics engine.

use std::path::Path;

use pyo3::exceptions::{PyLookupError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyAny;

use hyphae_core::config::AnalyticsConfig;
use hyphae_core::pipeline;
use hyphae_core::{Engine, HyphaeError};

/// Python-visible analytics configuration.
#[pyclass]
#[derive(Clone)]
struct PyAnalyticsConfig {
    #[pyo3(get, set)]
    min_coverage: f64,
    #[pyo3(get, set)]
    high_risk_max_contributors: usize,
    #[pyo3(get, set)]
    hero_skewness: f64,
    #[pyo3(get, set)]
    hero_dominance_ratio: f64,
    #[pyo3(get, set)]
    summary_top_n: usize,
    #[pyo3(get, set)]
    jack_limit: usize,
    #[pyo3(get, set)]
    maven_limit: usize,
    #[pyo3(get, set)]
    connector_limit: usize,
    #[pyo3(get, set)]
    replacement_limit: usize,
    #[pyo3(get, set)]
    collaboration_limit: usize,
    #[pyo3(get, set)]
    critical_file_limit: usize,
    #[pyo3(get, set)]
    bus_factor_limit: usize,
    #[pyo3(get, set)]
    contribution_limit: usize,
}

#[pymethods]
#[allow(clippy::too_many_arguments)]
impl PyAnalyticsConfig {
    #[new]
    #[pyo3(signature = (
        min_coverage = 0.3,
        high_risk_max_contributors = 2,
        hero_skewness = 1.0,
        hero_dominance_ratio = 3.0,
        summary_top_n = 3,
        jack_limit = 10,
        maven_limit = 10,
        connector_limit = 10,
        replacement_limit = 3,
        collaboration_limit = 20,
        critical_file_limit = 20,
        bus_factor_limit = 3,
        contribution_limit = 50,
    ))]
    fn new(
        min_coverage: f64,
        high_risk_max_contributors: usize,
        hero_skewness: f64,
        hero_dominance_ratio: f64,
        summary_top_n: usize,
        jack_limit: usize,
        maven_limit: usize,
        connector_limit: usize,
        replacement_limit: usize,
        collaboration_limit: usize,
        critical_file_limit: usize,
        bus_factor_limit: usize,
        contribution_limit: usize,
    ) -> Self {
        Self {
            min_coverage,
            high_risk_max_contributors,
            hero_skewness,
            hero_dominance_ratio,
            summary_top_n,
            jack_limit,
            maven_limit,
            connector_limit,
            replacement_limit,
            collaboration_limit,
            critical_file_limit,
            bus_factor_limit,
            contribution_limit,
        }
    }
}

impl From<PyAnalyticsConfig> for AnalyticsConfig {
    fn from(py_config: PyAnalyticsConfig) -> Self {
        AnalyticsConfig {
            min_coverage: py_config.min_coverage,
            high_risk_max_contributors: py_config.high_risk_max_contributors,
            hero_skewness: py_config.hero_skewness,
            hero_dominance_ratio: py_config.hero_dominance_ratio,
            summary_top_n: py_config.summary_top_n,
            jack_limit: py_config.jack_limit,
            maven_limit: py_config.maven_limit,
            connector_limit: py_config.connector_limit,
            replacement_limit: py_config.replacement_limit,
            collaboration_limit: py_config.collaboration_limit,
            critical_file_limit: py_config.critical_file_limit,
            bus_factor_limit: py_config.bus_factor_limit,
            contribution_limit: py_config.contribution_limit,
        }
    }
}

fn to_py_err(err: HyphaeError) -> PyErr {
    match err {
        HyphaeError::NotFound(_) => PyLookupError::new_err(err.to_string()),
        HyphaeError::InvalidArgument(_) | HyphaeError::Json { .. } => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Serialize to JSON then parse into a Python object.
fn to_python<T: serde::Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json_str = serde_json::to_string(value)
        .map_err(|e: serde_json::Error| PyRuntimeError::new_err(e.to_string()))?;
    let json_module = py.import("json")?;
    let obj: Bound<'_, PyAny> = json_module.call_method1("loads", (json_str,))?;
    Ok(obj.unbind())
}

fn load_engine(path: &str, config: Option<PyAnalyticsConfig>) -> PyResult<Engine> {
    let engine = Engine::new(config.map(Into::into).unwrap_or_default());
    engine.ingest_path(Path::new(path)).map_err(to_py_err)?;
    Ok(engine)
}

/// Ingest commit facts from `path` and return the full report for `repository` as a dict.
#[pyfunction]
#[pyo3(signature = (path, repository, config = None, progress = None))]
fn analyze(
    py: Python<'_>,
    path: &str,
    repository: &str,
    config: Option<PyAnalyticsConfig>,
    progress: Option<PyObject>,
) -> PyResult<PyObject> {
    let engine = load_engine(path, config)?;

    // Wrap the Python callable as a Rust ProgressCallback
    let progress_callback = progress.map(|py_cb| -> pipeline::ProgressCallback {
        Box::new(move |phase: &str, label: &str| {
            Python::with_gil(|py| {
                let _ = py_cb.call1(py, (phase, label));
            });
        })
    });

    let report = pipeline::run_report(&engine, repository, progress_callback).map_err(to_py_err)?;
    to_python(py, &report)
}

/// Ingest commit facts from `path` and run one query against `repository`.
#[pyfunction]
#[pyo3(signature = (path, repository, kind, limit = None, developer = None, config = None))]
fn query(
    py: Python<'_>,
    path: &str,
    repository: &str,
    kind: &str,
    limit: Option<usize>,
    developer: Option<&str>,
    config: Option<PyAnalyticsConfig>,
) -> PyResult<PyObject> {
    let engine = load_engine(path, config)?;
    let cfg = engine.config().clone();
    let repo = repository;
    match kind {
        "jacks" => {
            let result = engine
                .jacks(repo, cfg.min_coverage, limit.unwrap_or(cfg.jack_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "mavens" => {
            let result = engine
                .mavens(repo, limit.unwrap_or(cfg.maven_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "connectors" => {
            let result = engine
                .connectors(repo, limit.unwrap_or(cfg.connector_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "knowledge_distribution" => {
            let result = engine.knowledge_distribution(repo).map_err(to_py_err)?;
            to_python(py, &result)
        }
        "bus_factor" => {
            let result = engine
                .bus_factor_overview(repo, limit.unwrap_or(cfg.bus_factor_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "replacements" => {
            let developer = developer
                .ok_or_else(|| PyValueError::new_err("replacements requires a developer"))?;
            let result = engine
                .replacements(repo, developer, limit.unwrap_or(cfg.replacement_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "collaborations" => {
            let result = engine
                .collaborations(repo, limit.unwrap_or(cfg.collaboration_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "critical_files" => {
            let result = engine
                .critical_files(repo, limit.unwrap_or(cfg.critical_file_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "contributions" => {
            let result = engine
                .developer_contributions(repo, limit.unwrap_or(cfg.contribution_limit))
                .map_err(to_py_err)?;
            to_python(py, &result)
        }
        "summary" => {
            let result = engine.repository_summary(repo).map_err(to_py_err)?;
            to_python(py, &result)
        }
        other => Err(PyValueError::new_err(format!("unknown query kind: {other}"))),
    }
}

/// Return the Hyphae engine version.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Hyphae Rust analytics engine.
#[pymodule]
fn _hyphae_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_function(wrap_pyfunction!(query, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_class::<PyAnalyticsConfig>()?;
    Ok(())
}
