//! Labeled n-dimensional arrays.
//!
//! A [`LabeledArray`] is a row-major `f32` buffer with named dimensions and
//! one coordinate per dimension. Plotting only reads arrays; selection
//! produces new arrays and records the fixed coordinate as a scalar
//! coordinate so titles can name it.

use std::fmt;

use crate::error::{Error, Result};

/// A single coordinate value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CoordValue {
    /// Numeric label (positions, timestamps as numbers, levels).
    Number(f64),
    /// Text label (categories, formatted dates).
    Label(String),
}

impl fmt::Display for CoordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Self::Number(v) => write!(f, "{v}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CoordValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for CoordValue {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

/// Coordinate labels along one dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    /// Numeric positions.
    Numeric(Vec<f64>),
    /// Text labels; plotted at positions `0, 1, 2, ...`.
    Labels(Vec<String>),
}

impl Coordinate {
    /// Text labels from anything string-like.
    #[must_use]
    pub fn labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::Labels(labels.iter().map(|s| s.as_ref().to_string()).collect())
    }

    /// Default integer positions `0..n`.
    #[must_use]
    pub fn range(n: usize) -> Self {
        Self::Numeric((0..n).map(|i| i as f64).collect())
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    /// Whether there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<CoordValue> {
        match self {
            Self::Numeric(v) => v.get(index).copied().map(CoordValue::Number),
            Self::Labels(v) => v.get(index).cloned().map(CoordValue::Label),
        }
    }

    /// Plot positions: the numbers themselves, or label indices.
    #[must_use]
    pub fn positions(&self) -> Vec<f64> {
        match self {
            Self::Numeric(v) => v.clone(),
            Self::Labels(v) => (0..v.len()).map(|i| i as f64).collect(),
        }
    }

    /// First index holding `value`.
    #[must_use]
    pub fn position_of(&self, value: &CoordValue) -> Option<usize> {
        match (self, value) {
            (Self::Numeric(v), CoordValue::Number(x)) => v.iter().position(|c| c == x),
            (Self::Labels(v), CoordValue::Label(x)) => v.iter().position(|c| c == x),
            _ => None,
        }
    }

    /// Distinct labels in order of first appearance, each with its first
    /// index. No resorting.
    #[must_use]
    pub fn distinct(&self) -> Vec<(CoordValue, usize)> {
        let mut out: Vec<(CoordValue, usize)> = Vec::new();
        for i in 0..self.len() {
            if let Some(value) = self.value(i) {
                if !out.iter().any(|(seen, _)| *seen == value) {
                    out.push((value, i));
                }
            }
        }
        out
    }
}

/// A numeric coordinate spanning one or two dimensions, such as 2D
/// longitude/latitude of a curvilinear grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxCoord {
    dims: Vec<String>,
    values: Vec<f64>,
}

impl AuxCoord {
    /// Dimensions the coordinate spans, in storage order.
    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Row-major values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// The capability set plotting needs from an array.
pub trait LabeledData {
    /// Dimension names in storage order.
    fn dims(&self) -> &[String];

    /// Extent along each dimension.
    fn shape(&self) -> &[usize];

    /// Coordinate of a dimension.
    fn coord(&self, dim: &str) -> Option<&Coordinate>;

    /// Every finite value (NaN and infinities skipped).
    fn finite_values(&self) -> impl Iterator<Item = f32> + '_;

    /// Auxiliary (non-dimension) coordinate by name.
    fn aux_coord(&self, _name: &str) -> Option<&AuxCoord> {
        None
    }

    /// Number of declared dimensions.
    fn ndim(&self) -> usize {
        self.dims().len()
    }

    /// Extent along `dim`.
    fn extent(&self, dim: &str) -> Option<usize> {
        self.dims()
            .iter()
            .position(|d| d == dim)
            .map(|i| self.shape()[i])
    }

    /// Number of dimensions longer than one.
    fn effective_rank(&self) -> usize {
        self.shape().iter().filter(|&&n| n > 1).count()
    }
}

/// Row-major `f32` array with named dimensions and coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    name: Option<String>,
    units: Option<String>,
    data: Vec<f32>,
    dims: Vec<String>,
    shape: Vec<usize>,
    coords: Vec<Coordinate>,
    aux_coords: Vec<(String, AuxCoord)>,
    scalar_coords: Vec<(String, CoordValue)>,
}

impl LabeledArray {
    /// Create an array with default `0..n` coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if `dims` and `shape` differ in length, a dimension
    /// name repeats, or `data` does not hold `product(shape)` values.
    ///
    /// # Example
    ///
    /// ```
    /// use labelplot::array::{LabeledArray, LabeledData};
    ///
    /// let arr = LabeledArray::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &["y", "x"], &[2, 3]).unwrap();
    /// assert_eq!(arr.ndim(), 2);
    /// assert_eq!(arr.extent("x"), Some(3));
    /// ```
    pub fn new(data: Vec<f32>, dims: &[&str], shape: &[usize]) -> Result<Self> {
        if dims.len() != shape.len() {
            return Err(Error::DataLengthMismatch {
                expected: dims.len(),
                actual: shape.len(),
            });
        }
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(Error::config(format!("duplicate dimension name '{d}'")));
            }
        }

        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            name: None,
            units: None,
            data,
            dims: dims.iter().map(|d| (*d).to_string()).collect(),
            shape: shape.to_vec(),
            coords: shape.iter().map(|&n| Coordinate::range(n)).collect(),
            aux_coords: Vec::new(),
            scalar_coords: Vec::new(),
        })
    }

    /// A one-dimensional array with the given coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate length differs from the data length.
    pub fn from_1d(data: Vec<f32>, dim: &str, coord: Coordinate) -> Result<Self> {
        let n = data.len();
        Self::new(data, &[dim], &[n])?.with_coord(dim, coord)
    }

    /// Replace the coordinate of `dim`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown dimension or a length mismatch.
    pub fn with_coord(mut self, dim: &str, coord: Coordinate) -> Result<Self> {
        let axis = self.axis(dim)?;
        if coord.len() != self.shape[axis] {
            return Err(Error::DataLengthMismatch {
                expected: self.shape[axis],
                actual: coord.len(),
            });
        }
        self.coords[axis] = coord;
        Ok(self)
    }

    /// Attach a numeric coordinate spanning one or two dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown dimensions, a name clash with a
    /// dimension, or a length mismatch.
    pub fn with_aux_coord(mut self, name: &str, dims: &[&str], values: Vec<f64>) -> Result<Self> {
        if self.dims.iter().any(|d| d == name) {
            return Err(Error::config(format!(
                "auxiliary coordinate '{name}' clashes with a dimension name"
            )));
        }
        if dims.is_empty() || dims.len() > 2 {
            return Err(Error::config(format!(
                "auxiliary coordinate '{name}' must span one or two dimensions"
            )));
        }

        let mut expected = 1;
        for d in dims {
            expected *= self.shape[self.axis(d)?];
        }
        if values.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: values.len(),
            });
        }

        self.aux_coords.retain(|(n, _)| n != name);
        self.aux_coords.push((
            name.to_string(),
            AuxCoord {
                dims: dims.iter().map(|d| (*d).to_string()).collect(),
                values,
            },
        ));
        Ok(self)
    }

    /// Set the variable name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the units.
    #[must_use]
    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    /// Variable name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Units.
    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Axis/colorbar label: `name [units]`, `name`, or empty.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.name, &self.units) {
            (Some(n), Some(u)) => format!("{n} [{u}]"),
            (Some(n), None) => n.clone(),
            (None, Some(u)) => format!("[{u}]"),
            (None, None) => String::new(),
        }
    }

    /// Raw row-major values.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Coordinates fixed by earlier selections.
    #[must_use]
    pub fn scalar_coords(&self) -> &[(String, CoordValue)] {
        &self.scalar_coords
    }

    /// Storage axis of `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDimension`] if the array has no such dimension.
    pub fn axis(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| Error::UnknownDimension(dim.to_string()))
    }

    fn strides(&self) -> Vec<usize> {
        strides_for(&self.shape)
    }

    /// Value at a multi-index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return None;
        }
        let offset: usize = index.iter().zip(self.strides()).map(|(i, s)| i * s).sum();
        self.data.get(offset).copied()
    }

    /// Select position `index` along `dim`, dropping the dimension.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown dimension or an out-of-range index.
    pub fn isel(&self, dim: &str, index: usize) -> Result<Self> {
        let axis = self.axis(dim)?;
        if index >= self.shape[axis] {
            return Err(Error::config(format!(
                "index {index} out of range for dimension '{dim}' of length {}",
                self.shape[axis]
            )));
        }

        let data = take_along(&self.data, &self.shape, axis, index);

        let mut dims = self.dims.clone();
        let mut shape = self.shape.clone();
        let mut coords = self.coords.clone();
        dims.remove(axis);
        shape.remove(axis);
        let fixed = coords.remove(axis);

        let mut scalar_coords = self.scalar_coords.clone();
        if let Some(value) = fixed.value(index) {
            scalar_coords.push((dim.to_string(), value));
        }

        let aux_coords = self
            .aux_coords
            .iter()
            .filter_map(|(name, aux)| {
                let Some(aux_axis) = aux.dims.iter().position(|d| d == dim) else {
                    return Some((name.clone(), aux.clone()));
                };
                if aux.dims.len() == 1 {
                    return None;
                }
                let aux_shape: Vec<usize> =
                    aux.dims.iter().filter_map(|d| self.extent(d)).collect();
                let mut aux_dims = aux.dims.clone();
                aux_dims.remove(aux_axis);
                Some((
                    name.clone(),
                    AuxCoord {
                        dims: aux_dims,
                        values: take_along(&aux.values, &aux_shape, aux_axis, index),
                    },
                ))
            })
            .collect();

        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            data,
            dims,
            shape,
            coords,
            aux_coords,
            scalar_coords,
        })
    }

    /// Select the first position whose coordinate equals `value`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown dimension or a missing value.
    pub fn sel(&self, dim: &str, value: &CoordValue) -> Result<Self> {
        let axis = self.axis(dim)?;
        let index = self.coords[axis].position_of(value).ok_or_else(|| {
            Error::config(format!("coordinate value '{value}' not found along '{dim}'"))
        })?;
        self.isel(dim, index)
    }

    /// Drop every dimension of length one.
    #[must_use]
    pub fn squeeze(&self) -> Self {
        let mut out = self.clone();
        while let Some(axis) = out.shape.iter().position(|&n| n == 1) {
            let dim = out.dims[axis].clone();
            match out.isel(&dim, 0) {
                Ok(next) => out = next,
                Err(_) => break,
            }
        }
        out
    }

    /// Reorder dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error unless `order` is a permutation of the dimensions.
    pub fn transpose(&self, order: &[&str]) -> Result<Self> {
        if order.len() != self.dims.len() {
            return Err(Error::config(format!(
                "transpose needs all {} dimensions, got {}",
                self.dims.len(),
                order.len()
            )));
        }
        let perm: Vec<usize> = order.iter().map(|d| self.axis(d)).collect::<Result<_>>()?;
        for (i, p) in perm.iter().enumerate() {
            if perm[..i].contains(p) {
                return Err(Error::config("transpose order repeats a dimension"));
            }
        }

        let new_shape: Vec<usize> = perm.iter().map(|&p| self.shape[p]).collect();
        let old_strides = self.strides();
        let total = self.data.len();
        let mut data = Vec::with_capacity(total);
        let mut index = vec![0usize; new_shape.len()];

        for _ in 0..total {
            let offset: usize = index
                .iter()
                .zip(&perm)
                .map(|(&i, &p)| i * old_strides[p])
                .sum();
            data.push(self.data[offset]);
            for axis in (0..index.len()).rev() {
                index[axis] += 1;
                if index[axis] < new_shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }

        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            data,
            dims: perm.iter().map(|&p| self.dims[p].clone()).collect(),
            shape: new_shape,
            coords: perm.iter().map(|&p| self.coords[p].clone()).collect(),
            aux_coords: self.aux_coords.clone(),
            scalar_coords: self.scalar_coords.clone(),
        })
    }

    /// Title fragment naming the fixed coordinates: `time = 2020, level = 5`.
    #[must_use]
    pub fn scalar_title(&self) -> String {
        self.scalar_coords
            .iter()
            .map(|(d, v)| format!("{d} = {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl LabeledData for LabeledArray {
    fn dims(&self) -> &[String] {
        &self.dims
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.dims.iter().position(|d| d == dim).map(|i| &self.coords[i])
    }

    fn finite_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|v| v.is_finite())
    }

    fn aux_coord(&self, name: &str) -> Option<&AuxCoord> {
        self.aux_coords.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }
}

pub(crate) fn strides_for(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Row-major values of the hyperplane `index` along `axis`.
fn take_along<T: Copy>(values: &[T], shape: &[usize], axis: usize, index: usize) -> Vec<T> {
    let outer: usize = shape[..axis].iter().product();
    let inner: usize = shape[axis + 1..].iter().product();
    let extent = shape[axis];

    let mut out = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        let start = (o * extent + index) * inner;
        out.extend_from_slice(&values[start..start + inner]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> LabeledArray {
        // time x y x x: 2 x 2 x 3
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        LabeledArray::new(data, &["time", "y", "x"], &[2, 2, 3])
            .unwrap()
            .with_coord("time", Coordinate::labels(&["jan", "feb"]))
            .unwrap()
            .with_coord("x", Coordinate::Numeric(vec![10.0, 20.0, 30.0]))
            .unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert!(LabeledArray::new(vec![1.0; 5], &["x"], &[6]).is_err());
        assert!(LabeledArray::new(vec![1.0; 6], &["x", "y"], &[6]).is_err());
        assert!(LabeledArray::new(vec![1.0; 4], &["x", "x"], &[2, 2]).is_err());
    }

    #[test]
    fn test_with_coord_length_checked() {
        let arr = LabeledArray::new(vec![1.0; 3], &["x"], &[3]).unwrap();
        assert!(arr.clone().with_coord("x", Coordinate::range(4)).is_err());
        assert!(matches!(
            arr.with_coord("z", Coordinate::range(3)),
            Err(Error::UnknownDimension(_))
        ));
    }

    #[test]
    fn test_get_row_major() {
        let arr = grid();
        assert_eq!(arr.get(&[0, 0, 0]), Some(0.0));
        assert_eq!(arr.get(&[0, 1, 2]), Some(5.0));
        assert_eq!(arr.get(&[1, 0, 1]), Some(7.0));
        assert_eq!(arr.get(&[2, 0, 0]), None);
    }

    #[test]
    fn test_isel_drops_dim_and_records_scalar() {
        let arr = grid();
        let feb = arr.isel("time", 1).unwrap();
        assert_eq!(feb.dims(), &["y".to_string(), "x".to_string()]);
        assert_eq!(feb.data(), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(feb.scalar_title(), "time = feb");

        let middle = arr.isel("x", 1).unwrap();
        assert_eq!(middle.data(), &[1.0, 4.0, 7.0, 10.0]);
        assert_eq!(middle.scalar_title(), "x = 20");
    }

    #[test]
    fn test_sel_by_label() {
        let arr = grid();
        let jan = arr.sel("time", &CoordValue::from("jan")).unwrap();
        assert_eq!(jan.data(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(arr.sel("time", &CoordValue::from("mar")).is_err());
        assert!(arr.sel("time", &CoordValue::Number(0.0)).is_err());
    }

    #[test]
    fn test_squeeze() {
        let arr = LabeledArray::new(vec![1.0, 2.0, 3.0], &["a", "b", "c"], &[1, 3, 1]).unwrap();
        assert_eq!(arr.effective_rank(), 1);
        let squeezed = arr.squeeze();
        assert_eq!(squeezed.dims(), &["b".to_string()]);
        assert_eq!(squeezed.scalar_coords().len(), 2);
    }

    #[test]
    fn test_transpose() {
        let arr = LabeledArray::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &["y", "x"], &[2, 3]).unwrap();
        let t = arr.transpose(&["x", "y"]).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert!(arr.transpose(&["x"]).is_err());
        assert!(arr.transpose(&["x", "x"]).is_err());
    }

    #[test]
    fn test_aux_coord_sliced_with_data() {
        let lon: Vec<f64> = (0..6).map(f64::from).collect();
        let arr = LabeledArray::new(vec![0.0; 6], &["y", "x"], &[2, 3])
            .unwrap()
            .with_aux_coord("lon", &["y", "x"], lon)
            .unwrap();
        let row = arr.isel("y", 1).unwrap();
        let aux = row.aux_coord("lon").unwrap();
        assert_eq!(aux.dims(), &["x".to_string()]);
        assert_eq!(aux.values(), &[3.0, 4.0, 5.0]);

        let col = row.isel("x", 0).unwrap();
        assert!(col.aux_coord("lon").is_none());
    }

    #[test]
    fn test_aux_coord_validation() {
        let arr = LabeledArray::new(vec![0.0; 6], &["y", "x"], &[2, 3]).unwrap();
        assert!(arr.clone().with_aux_coord("lon", &["x"], vec![0.0; 2]).is_err());
        assert!(arr.clone().with_aux_coord("x", &["x"], vec![0.0; 3]).is_err());
        assert!(arr.with_aux_coord("lon", &["q"], vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_distinct_preserves_order() {
        let coord = Coordinate::labels(&["b", "a", "b", "c"]);
        let distinct = coord.distinct();
        let labels: Vec<String> = distinct.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
        assert_eq!(distinct[2].1, 3);
    }

    #[test]
    fn test_label_and_display() {
        let arr = LabeledArray::new(vec![1.0], &["x"], &[1])
            .unwrap()
            .with_name("air")
            .with_units("K");
        assert_eq!(arr.label(), "air [K]");
        assert_eq!(CoordValue::Number(2020.0).to_string(), "2020");
        assert_eq!(CoordValue::Number(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_finite_values_skip_nan() {
        let arr = LabeledArray::new(vec![1.0, f32::NAN, 3.0], &["x"], &[3]).unwrap();
        assert_eq!(arr.finite_values().collect::<Vec<_>>(), vec![1.0, 3.0]);
    }
}
