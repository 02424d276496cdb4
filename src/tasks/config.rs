/* ************************************************************************ **
** This file is part of lchol, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Input file for the `lchol` program.
//!
//! ```yaml
//! matrix:
//!   - [4, 2]
//!   - [2, 3]
//! precision: f64      # or f32
//! backend: lapack     # or reference
//! rhs:
//!   - [1, 2]
//! transform:
//!   - [1, 0]
//! want-inverse: true
//! ```

use crate::FailResult;
use ndarray::Array2;
use std::io::Read;

/// Alternative to `serde_yaml::from_reader` that warns about unused keys.
///
/// NOTE: Please use this for anything read from the user. Silently ignoring a
///       misspelled `want-invrese` is a great way to lose an afternoon.
pub trait YamlRead: for<'de> serde::Deserialize<'de> {
    fn from_reader(mut r: impl Read) -> Result<Self, serde_yaml::Error>
    { Self::from_dyn_reader(&mut r) }

    fn from_dyn_reader(r: &mut dyn Read) -> Result<Self, serde_yaml::Error> {
        // serde_ignored needs a Deserializer, and serde_yaml::Value is one.
        Self::from_value(serde_yaml::from_reader(r)?)
    }

    fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        serde_ignored::deserialize(
            value,
            |path| warn!("Unused config item (possible typo?): {}", path),
        )
    }
}

impl YamlRead for Settings {}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Rows of the matrix to factorize.  Only the lower triangle is used.
    pub matrix: Vec<Vec<f64>>,

    #[serde(default)]
    pub precision: Precision,

    #[serde(default)]
    pub backend: Backend,

    /// Vectors to solve against (and take the Mahalanobis form of).
    #[serde(default)]
    pub rhs: Vec<Vec<f64>>,

    /// Rows of a matrix `M` for which to compute `M A^-1 M^T`.
    #[serde(default)]
    pub transform: Option<Vec<Vec<f64>>>,

    #[serde(default = "self::defaults::settings::want_inverse")]
    pub want_inverse: bool,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Precision {
    F32,
    F64,
}

impl Default for Precision {
    fn default() -> Self { Precision::F64 }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// The system LAPACK.  Only available when built with the `lapack` feature.
    Lapack,
    /// Unblocked pure-Rust kernels.
    Reference,
}

impl Default for Backend {
    #[cfg(feature = "lapack")]
    fn default() -> Self { Backend::Lapack }
    #[cfg(not(feature = "lapack"))]
    fn default() -> Self { Backend::Reference }
}

mod defaults {
    pub(crate) mod settings {
        pub(crate) fn want_inverse() -> bool { true }
    }
}

/// Build a matrix from a list of rows, checking that it isn't ragged.
pub(crate) fn matrix_from_rows(what: &str, rows: &[Vec<f64>]) -> FailResult<Array2<f64>> {
    let width = rows.first().map_or(0, |row| row.len());
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
        bail!("row {} of {} has {} entries, but row 0 has {}", i, what, row.len(), width);
    }
    let data = rows.iter().flat_map(|row| row.iter().cloned()).collect();
    Ok(Array2::from_shape_vec((rows.len(), width), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal() {
        let settings = Settings::from_reader("matrix: [[4, 2], [2, 3]]".as_bytes()).unwrap();
        assert_eq!(settings, Settings {
            matrix: vec![vec![4.0, 2.0], vec![2.0, 3.0]],
            precision: Precision::F64,
            backend: Backend::default(),
            rhs: vec![],
            transform: None,
            want_inverse: true,
        });
    }

    #[test]
    fn full() {
        let yaml = "\
matrix:
  - [1, 0]
  - [0, 1]
precision: f32
backend: reference
rhs:
  - [1, 2]
  - [3, 4]
transform: [[1, 1]]
want-inverse: false
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        assert_eq!(settings.precision, Precision::F32);
        assert_eq!(settings.backend, Backend::Reference);
        assert_eq!(settings.rhs.len(), 2);
        assert_eq!(settings.transform, Some(vec![vec![1.0, 1.0]]));
        assert!(!settings.want_inverse);
    }

    #[test]
    fn unknown_keys_are_not_fatal() {
        let settings = Settings::from_reader("matrix: [[1]]\nwant-invrese: false".as_bytes()).unwrap();
        assert!(settings.want_inverse);
    }

    #[test]
    fn bad_enum() {
        assert!(Settings::from_reader("matrix: [[1]]\nprecision: f16".as_bytes()).is_err());
    }

    #[test]
    fn ragged() {
        let err = matrix_from_rows("matrix", &[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.to_string().contains("row 1 of matrix"), "{}", err);

        let mat = matrix_from_rows("matrix", &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(mat.dim(), (3, 2));
        assert_eq!(mat[(2, 0)], 5.0);

        assert_eq!(matrix_from_rows("matrix", &[]).unwrap().dim(), (0, 0));
    }
}
