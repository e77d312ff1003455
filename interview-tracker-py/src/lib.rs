//! Python bindings for the interview-tracker Rust library.
//!
//! Exposes the stage graph and the health evaluator to the Python
//! application. Stages and outcomes cross the boundary as their snake_case
//! names; timestamps as ISO 8601 strings.

use chrono::{DateTime, Utc};
use interview_tracker::core::{Interview, InterviewOutcome, Stage};
use interview_tracker::graph;
use interview_tracker::health::HealthEvaluator;
use interview_tracker::utils::{now_utc, parse_timestamp};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::collections::HashMap;
use uuid::Uuid;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_stage(value: &str) -> PyResult<Stage> {
    value.parse().map_err(value_error)
}

fn parse_time(value: &str) -> PyResult<DateTime<Utc>> {
    parse_timestamp(value).map_err(value_error)
}

fn parse_outcome(value: &str) -> PyResult<InterviewOutcome> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| value_error(format!("Unknown interview outcome: {value}")))
}

fn stage_names(stages: &[Stage]) -> Vec<String> {
    stages.iter().map(|s| s.as_str().to_string()).collect()
}

/// Reads `{"scheduled_at": str | None, "outcome": str}` dicts.
fn extract_interviews(interviews: &Bound<'_, PyList>, stage: Stage) -> PyResult<Vec<Interview>> {
    let mut parsed = Vec::with_capacity(interviews.len());
    for item in interviews.iter() {
        let dict = item.downcast::<PyDict>()?;
        let mut interview = Interview::new(Uuid::nil(), stage);

        if let Some(value) = dict.get_item("scheduled_at")? {
            if let Some(at) = value.extract::<Option<String>>()? {
                interview = interview.with_scheduled_at(parse_time(&at)?);
            }
        }
        if let Some(value) = dict.get_item("outcome")? {
            interview = interview.with_outcome(parse_outcome(&value.extract::<String>()?)?);
        }
        parsed.push(interview);
    }
    Ok(parsed)
}

/// Raises `ValueError` with the rejection message if the move is illegal.
#[pyfunction]
fn validate_transition(from_stage: String, to_stage: String) -> PyResult<()> {
    let (from, to) = (parse_stage(&from_stage)?, parse_stage(&to_stage)?);
    graph::validate_transition(from, to).map_err(value_error)
}

/// Returns the rejection as a dict, or None if the move is legal.
#[pyfunction]
fn transition_error(py: Python<'_>, from_stage: String, to_stage: String) -> PyResult<Option<PyObject>> {
    let (from, to) = (parse_stage(&from_stage)?, parse_stage(&to_stage)?);
    Ok(graph::validate_transition(from, to)
        .err()
        .map(|e| map_to_py(py, &e.to_dict())))
}

/// Returns true if `to_stage` is reachable from `from_stage` in one step.
#[pyfunction]
fn can_transition(from_stage: String, to_stage: String) -> PyResult<bool> {
    Ok(graph::can_transition(parse_stage(&from_stage)?, parse_stage(&to_stage)?))
}

/// Legal next stages.
#[pyfunction]
fn transitions(stage: String) -> PyResult<Vec<String>> {
    Ok(stage_names(graph::transitions(parse_stage(&stage)?)))
}

/// Legal next stages without Rejected and Dropped.
#[pyfunction]
fn next_logical_stages(stage: String) -> PyResult<Vec<String>> {
    Ok(stage_names(&graph::next_logical_stages(parse_stage(&stage)?)))
}

/// Progress as a percentage in 0..=100.
#[pyfunction]
fn progress_percentage(stage: String) -> PyResult<u8> {
    Ok(graph::progress_percentage(parse_stage(&stage)?))
}

/// Returns true if the move is forward progress.
#[pyfunction]
fn is_progressing(from_stage: String, to_stage: String) -> PyResult<bool> {
    Ok(graph::is_progressing(parse_stage(&from_stage)?, parse_stage(&to_stage)?))
}

/// Returns true for Offer, Rejected and Dropped.
#[pyfunction]
fn is_terminal(stage: String) -> PyResult<bool> {
    Ok(graph::is_terminal(parse_stage(&stage)?))
}

/// Human-readable stage label.
#[pyfunction]
fn stage_label(stage: String) -> PyResult<&'static str> {
    Ok(graph::label(parse_stage(&stage)?))
}

/// Every stage, in pipeline order.
#[pyfunction]
fn stages() -> Vec<String> {
    stage_names(&Stage::ALL)
}

/// Classifies a pipeline. Returns `(health, reason)`.
#[pyfunction]
#[pyo3(signature = (stage, updated_at_iso, interviews, now_iso = None))]
fn evaluate_health(
    stage: String,
    updated_at_iso: Option<String>,
    interviews: &Bound<'_, PyList>,
    now_iso: Option<String>,
) -> PyResult<(String, String)> {
    let stage = parse_stage(&stage)?;
    let updated_at = updated_at_iso.as_deref().map(parse_time).transpose()?;
    let now = now_iso.as_deref().map(parse_time).transpose()?.unwrap_or_else(now_utc);
    let interviews = extract_interviews(interviews, stage)?;

    let report = HealthEvaluator::default().classify(stage, updated_at, &interviews, now);
    Ok((report.health.to_string(), report.reason))
}

fn map_to_py(py: Python<'_>, map: &HashMap<String, serde_json::Value>) -> PyObject {
    let dict = PyDict::new_bound(py);
    for (k, v) in map {
        // Setting a str key on a fresh dict cannot fail.
        let _ = dict.set_item(k, json_to_py(py, v));
    }
    dict.into_py(py)
}

fn json_to_py(py: Python<'_>, value: &serde_json::Value) -> PyObject {
    match value {
        serde_json::Value::Null => py.None(),
        serde_json::Value::Bool(b) => b.into_py(py),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into_py(py)
            } else if let Some(f) = n.as_f64() {
                f.into_py(py)
            } else {
                py.None()
            }
        }
        serde_json::Value::String(s) => s.into_py(py),
        serde_json::Value::Array(arr) => {
            PyList::new_bound(py, arr.iter().map(|v| json_to_py(py, v))).into_py(py)
        }
        serde_json::Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (k, v) in map {
                let _ = dict.set_item(k, json_to_py(py, v));
            }
            dict.into_py(py)
        }
    }
}

/// The interview_tracker_py Python module.
#[pymodule]
fn interview_tracker_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(validate_transition, m)?)?;
    m.add_function(wrap_pyfunction!(transition_error, m)?)?;
    m.add_function(wrap_pyfunction!(can_transition, m)?)?;
    m.add_function(wrap_pyfunction!(transitions, m)?)?;
    m.add_function(wrap_pyfunction!(next_logical_stages, m)?)?;
    m.add_function(wrap_pyfunction!(progress_percentage, m)?)?;
    m.add_function(wrap_pyfunction!(is_progressing, m)?)?;
    m.add_function(wrap_pyfunction!(is_terminal, m)?)?;
    m.add_function(wrap_pyfunction!(stage_label, m)?)?;
    m.add_function(wrap_pyfunction!(stages, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_health, m)?)?;

    m.add("__version__", "0.1.0")?;
    m.add("__rust_version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
