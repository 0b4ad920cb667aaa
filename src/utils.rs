#[cfg(feature = "python-bindings")]
use ndarray::{Array2, Array3, ArrayD, ArrayViewD, Axis, Ix2, Ix3};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    extraction::{
        Atom, AtomQuantity, CARTESIAN_LABELS, Pressure, STRESS_LABELS, SnapshotRecord,
        StressTensor,
    },
    pipeline::{AnalysisConfig, Property},
    spectral::CorrelationMethod,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Array → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArrayDyn,
};

/// Accept a numpy array of any rank, a pandas DataFrame, or a 2-D or 3-D
/// nested sequence of floats. Rank is checked later by the analyzer.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array_dyn<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArrayDyn<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArrayDyn<f64>>() {
        return Ok(arr_ro);
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArrayDyn<f64>>() {
            return Ok(frame_ro);
        }
    }

    let array = if let Ok(rows) = raw_data.extract::<Vec<Vec<f64>>>() {
        array_from_rows(rows)
    } else if let Ok(blocks) = raw_data.extract::<Vec<Vec<Vec<f64>>>>() {
        array_from_blocks(blocks)
    } else {
        return Err(pyo3::exceptions::PyTypeError::new_err(
            "expected a numpy.ndarray, pandas.DataFrame, or 2-D/3-D nested sequence of float64",
        ));
    };
    Ok(array.map_err(PyValueError::new_err)?.into_pyarray(py).readonly())
}

/// Stack equal-length rows into an `(rows, cols)` array.
#[cfg(feature = "python-bindings")]
fn array_from_rows(rows: Vec<Vec<f64>>) -> Result<ArrayD<f64>, String> {
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err("nested sequence is ragged: all rows must have the same length".to_string());
    }
    let n_rows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let matrix = Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| e.to_string())?;
    Ok(matrix.into_dyn())
}

/// Stack equal-shape blocks, e.g. `(timesteps, atoms, 3)`, into a rank-3 array.
#[cfg(feature = "python-bindings")]
fn array_from_blocks(blocks: Vec<Vec<Vec<f64>>>) -> Result<ArrayD<f64>, String> {
    let n_mid = blocks.first().map_or(0, Vec::len);
    let n_inner = blocks.first().and_then(|b| b.first()).map_or(0, Vec::len);
    let ragged = blocks
        .iter()
        .any(|block| block.len() != n_mid || block.iter().any(|row| row.len() != n_inner));
    if ragged {
        return Err("nested sequence is ragged: all blocks must have the same shape".to_string());
    }
    let n_outer = blocks.len();
    let flat: Vec<f64> = blocks.into_iter().flatten().flatten().collect();
    let cube =
        Array3::from_shape_vec((n_outer, n_mid, n_inner), flat).map_err(|e| e.to_string())?;
    Ok(cube.into_dyn())
}

#[cfg(feature = "python-bindings")]
pub fn extract_method(method: Option<&str>) -> PyResult<CorrelationMethod> {
    match method.unwrap_or("direct") {
        "direct" => Ok(CorrelationMethod::Direct),
        "fft" => Ok(CorrelationMethod::Fft),
        other => Err(PyValueError::new_err(format!(
            "Invalid method: {other}. Use 'direct' or 'fft'."
        ))),
    }
}

/// Build a validated [`AnalysisConfig`] from Python keyword arguments;
/// `None` falls back to the default of each field.
#[cfg(feature = "python-bindings")]
pub fn build_config(
    first_step: Option<usize>, window_size: Option<usize>, property: Option<i64>,
    method: Option<&str>, parallel: Option<bool>, timestep: Option<f64>,
) -> PyResult<AnalysisConfig> {
    let defaults = AnalysisConfig::default();
    let config = AnalysisConfig {
        first_step: first_step.unwrap_or(defaults.first_step),
        window_size: window_size.unwrap_or(defaults.window_size),
        property: property.map(Property::try_from).transpose()?.unwrap_or(defaults.property),
        method: extract_method(method)?,
        parallel: parallel.unwrap_or(defaults.parallel),
        timestep: timestep.unwrap_or(defaults.timestep),
        ..defaults
    };
    config.validate()?;
    Ok(config)
}

/// Rebuild snapshot records from a per-property array.
///
/// - Viscosity: `(T, 6)` stress components in Voigt order.
/// - Vibrational: `(T, N, 3)` velocities or positions of `N` atoms.
#[cfg(feature = "python-bindings")]
pub fn snapshots_from_array(
    data: &PyReadonlyArrayDyn<'_, f64>, property: Property,
) -> PyResult<Vec<SnapshotRecord>> {
    snapshots_from_array_view(&data.as_array(), property)
}

#[cfg(feature = "python-bindings")]
fn snapshots_from_array_view(
    view: &ArrayViewD<'_, f64>, property: Property,
) -> PyResult<Vec<SnapshotRecord>> {
    let view = view.view();
    match property.quantity() {
        None => {
            let stress = view.into_dimensionality::<Ix2>().map_err(|_| {
                PyValueError::new_err("viscosity input must be a (timesteps, 6) array")
            })?;
            if stress.ncols() != STRESS_LABELS.len() {
                return Err(PyValueError::new_err(format!(
                    "viscosity input must have 6 stress columns, got {}",
                    stress.ncols()
                )));
            }
            Ok(stress
                .outer_iter()
                .map(|row| {
                    let tensor =
                        StressTensor::new([row[0], row[1], row[2], row[3], row[4], row[5]]);
                    SnapshotRecord::new(Vec::new(), Pressure::Tensor(tensor), 0.0, tensor)
                })
                .collect())
        }
        Some(quantity) => {
            let atoms = view.into_dimensionality::<Ix3>().map_err(|_| {
                PyValueError::new_err("vibrational input must be a (timesteps, atoms, 3) array")
            })?;
            if atoms.len_of(Axis(2)) != CARTESIAN_LABELS.len() {
                return Err(PyValueError::new_err("vibrational input must have 3 components"));
            }
            Ok(atoms
                .outer_iter()
                .map(|step| {
                    let atoms = step
                        .outer_iter()
                        .map(|v| {
                            let v = [v[0], v[1], v[2]];
                            match quantity {
                                AtomQuantity::Position => Atom::new("X", v, [0.0; 3]),
                                AtomQuantity::Velocity => Atom::new("X", [0.0; 3], v),
                            }
                        })
                        .collect();
                    let zero = StressTensor::default();
                    SnapshotRecord::new(atoms, Pressure::Tensor(zero), 0.0, zero)
                })
                .collect())
        }
    }
}

#[cfg(all(test, feature = "python-bindings"))]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover stacking of nested sequences into arrays. Conversion
    // from Python objects needs an interpreter and is tested from Python.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A `(timesteps, atoms, 3)` nested list becomes a rank-3 array that the
    // vibrational path accepts.
    //
    // Given
    // -----
    // - Two steps of two atoms with three velocity components each.
    //
    // Expect
    // ------
    // - Shape `[2, 2, 3]` with values in row-major order.
    // - `snapshots_from_array` yields two snapshots of two atoms.
    fn blocks_stack_into_rank_three_array() {
        let blocks = vec![
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
            vec![vec![7.0, 8.0, 9.0], vec![10.0, 11.0, 12.0]],
        ];

        let arr = array_from_blocks(blocks).unwrap();

        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 2]], 9.0);
        let snaps =
            snapshots_from_array_view(&arr.view(), Property::VibrationalFromVelocities).unwrap();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[1].atoms.len(), 2);
    }

    #[test]
    // Purpose
    // -------
    // Ragged nested sequences are reported, at either depth.
    fn ragged_sequences_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let blocks = vec![vec![vec![1.0, 2.0, 3.0]], vec![vec![4.0, 5.0]]];

        assert!(array_from_rows(rows).unwrap_err().contains("ragged"));
        assert!(array_from_blocks(blocks).unwrap_err().contains("ragged"));
        assert_eq!(array_from_rows(vec![vec![1.0, 2.0]; 3]).unwrap().shape(), &[3, 2]);
    }
}
