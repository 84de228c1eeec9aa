//! Facet grids: small multiples of one array.
//!
//! A [`FacetGrid`] splits an array along a `col` and/or `row` dimension and
//! lays the slices out on a grid. Rendering validates everything and infers
//! one [`ColorScale`] from the union of all cells before the first cell is
//! drawn; every cell then holds the same `Arc<ColorScale>`.
//!
//! Layout rules:
//!
//! - `col` only: `1 x N`, or `ceil(N / w) x w` with `col_wrap = w`, filled
//!   left to right and top to bottom. Trailing cells stay unused.
//! - `row` only: `N x 1`.
//! - `row` and `col`: the full cross product. A pair without finite values
//!   is an empty cell. It is laid out and labeled but draws no data.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::array::{CoordValue, LabeledArray, LabeledData};
use crate::axes::Axes;
use crate::dispatch::{resolve_plot_spec, PlotKind, PlotSpec};
use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::inference::infer_color_scale;
use crate::options::PlotOptions;
use crate::plot::{draw, scale_options, set_axis_labels, Extent, Layer};
use crate::stats::finite_extent;

/// Grouping dimensions of a facet grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FacetOptions {
    /// Dimension spread over columns.
    pub col: Option<String>,
    /// Dimension spread over rows.
    pub row: Option<String>,
    /// Wrap a column-only grid after this many columns.
    pub col_wrap: Option<usize>,
}

impl FacetOptions {
    /// No grouping yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Facet columns by `dim`.
    #[must_use]
    pub fn col(mut self, dim: &str) -> Self {
        self.col = Some(dim.to_string());
        self
    }

    /// Facet rows by `dim`.
    #[must_use]
    pub fn row(mut self, dim: &str) -> Self {
        self.row = Some(dim.to_string());
        self
    }

    /// Wrap after `wrap` columns.
    #[must_use]
    pub fn col_wrap(mut self, wrap: usize) -> Self {
        self.col_wrap = Some(wrap);
        self
    }

    /// The grouping part of plot options.
    #[must_use]
    pub fn from_plot_options(options: &PlotOptions) -> Self {
        Self {
            col: options.col.clone(),
            row: options.row.clone(),
            col_wrap: options.col_wrap,
        }
    }
}

/// Coordinate values selecting one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetKey {
    /// Row dimension and value.
    pub row: Option<(String, CoordValue)>,
    /// Column dimension and value.
    pub col: Option<(String, CoordValue)>,
}

impl FacetKey {
    /// Value selected along `dim`.
    #[must_use]
    pub fn get(&self, dim: &str) -> Option<&CoordValue> {
        [&self.row, &self.col]
            .into_iter()
            .flatten()
            .find(|(d, _)| d == dim)
            .map(|(_, v)| v)
    }

    fn part(pair: Option<&(String, CoordValue)>) -> Option<String> {
        pair.map(|(d, v)| format!("{d} = {v}"))
    }

    /// Title for the column value: `dim = value`.
    #[must_use]
    pub fn col_title(&self) -> Option<String> {
        Self::part(self.col.as_ref())
    }

    /// Title for the row value.
    #[must_use]
    pub fn row_title(&self) -> Option<String> {
        Self::part(self.row.as_ref())
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [self.row_title(), self.col_title()].into_iter().flatten().collect();
        f.write_str(&parts.join(", "))
    }
}

/// One laid-out cell: its key and the indices that select its slice.
#[derive(Debug, Clone)]
struct FacetCell {
    key: FacetKey,
    row_index: Option<usize>,
    col_index: Option<usize>,
}

/// Small multiples of one array.
#[derive(Debug, Clone)]
pub struct FacetGrid<'a> {
    array: &'a LabeledArray,
    options: FacetOptions,
    nrows: usize,
    ncols: usize,
    cells: Vec<Option<FacetCell>>,
}

impl<'a> FacetGrid<'a> {
    /// Lay out the grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when neither `row` nor `col` is given, for
    /// `col_wrap` with `row`, `col_wrap == 0`, `row == col`, or a dimension
    /// the array does not have.
    ///
    /// # Example
    ///
    /// ```
    /// use labelplot::array::LabeledArray;
    /// use labelplot::facet::{FacetGrid, FacetOptions};
    ///
    /// let arr = LabeledArray::new(vec![0.0; 6 * 4], &["t", "x"], &[6, 4]).unwrap();
    /// let grid = FacetGrid::new(&arr, FacetOptions::new().col("t").col_wrap(3)).unwrap();
    /// assert_eq!(grid.shape(), (2, 3));
    /// ```
    pub fn new(array: &'a LabeledArray, options: FacetOptions) -> Result<Self> {
        if options.row.is_none() && options.col.is_none() {
            return Err(Error::config("a facet grid needs 'row' or 'col'"));
        }
        if options.col_wrap.is_some() && options.row.is_some() {
            return Err(Error::config("cannot use 'col_wrap' together with 'row'"));
        }
        if options.col_wrap == Some(0) {
            return Err(Error::config("'col_wrap' must be at least 1"));
        }
        if options.row.is_some() && options.row == options.col {
            return Err(Error::config("'row' and 'col' must be different dimensions"));
        }

        let groups = |dim: &Option<String>| -> Result<Option<(String, Vec<(CoordValue, usize)>)>> {
            let Some(dim) = dim else {
                return Ok(None);
            };
            let coord = array.coord(dim).ok_or_else(|| {
                Error::config(format!(
                    "facet dimension '{dim}' not found (dims: {:?})",
                    array.dims()
                ))
            })?;
            Ok(Some((dim.clone(), coord.distinct())))
        };
        let rows = groups(&options.row)?;
        let cols = groups(&options.col)?;

        let pair = |dim: &str, (value, _): &(CoordValue, usize)| Some((dim.to_string(), value.clone()));
        let (nrows, ncols, cells) = match (&rows, &cols) {
            (Some((rdim, rvals)), Some((cdim, cvals))) => {
                let cells = rvals
                    .iter()
                    .flat_map(|r| cvals.iter().map(move |c| (r, c)))
                    .map(|(r, c)| {
                        Some(FacetCell {
                            key: FacetKey {
                                row: pair(rdim, r),
                                col: pair(cdim, c),
                            },
                            row_index: Some(r.1),
                            col_index: Some(c.1),
                        })
                    })
                    .collect();
                (rvals.len(), cvals.len(), cells)
            }
            (Some((rdim, rvals)), None) => {
                let cells = rvals
                    .iter()
                    .map(|r| {
                        Some(FacetCell {
                            key: FacetKey {
                                row: pair(rdim, r),
                                col: None,
                            },
                            row_index: Some(r.1),
                            col_index: None,
                        })
                    })
                    .collect();
                (rvals.len(), 1, cells)
            }
            (None, Some((cdim, cvals))) => {
                let n = cvals.len();
                let ncols = options.col_wrap.unwrap_or(n).max(1);
                let nrows = n.div_ceil(ncols).max(1);
                let mut cells: Vec<Option<FacetCell>> = cvals
                    .iter()
                    .map(|c| {
                        Some(FacetCell {
                            key: FacetKey {
                                row: None,
                                col: pair(cdim, c),
                            },
                            row_index: None,
                            col_index: Some(c.1),
                        })
                    })
                    .collect();
                cells.resize(nrows * ncols, None);
                (nrows, ncols, cells)
            }
            (None, None) => return Err(Error::config("a facet grid needs 'row' or 'col'")),
        };

        debug!(
            nrows,
            ncols,
            row = ?options.row,
            col = ?options.col,
            col_wrap = ?options.col_wrap,
            "facet layout"
        );

        Ok(Self {
            array,
            options,
            nrows,
            ncols,
            cells,
        })
    }

    /// Grid shape `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of rows.
    #[must_use]
    pub const fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[must_use]
    pub const fn ncols(&self) -> usize {
        self.ncols
    }

    /// Grouping options.
    #[must_use]
    pub fn options(&self) -> &FacetOptions {
        &self.options
    }

    fn cell(&self, row: usize, col: usize) -> Option<&FacetCell> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells[row * self.ncols + col].as_ref()
    }

    /// Coordinate values selecting cell `(row, col)`; `None` for unused
    /// trailing cells and out-of-range positions.
    #[must_use]
    pub fn name_dict(&self, row: usize, col: usize) -> Option<&FacetKey> {
        self.cell(row, col).map(|c| &c.key)
    }

    /// All keys, row-major.
    #[must_use]
    pub fn keys(&self) -> Vec<Option<FacetKey>> {
        self.cells.iter().map(|c| c.as_ref().map(|c| c.key.clone())).collect()
    }

    /// The slice shown in cell `(row, col)`, or `None` for an unused cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection fails.
    pub fn select(&self, row: usize, col: usize) -> Result<Option<LabeledArray>> {
        let Some(cell) = self.cell(row, col) else {
            return Ok(None);
        };
        let mut slice = self.array.clone();
        if let (Some(dim), Some(i)) = (&self.options.row, cell.row_index) {
            slice = slice.isel(dim, i)?;
        }
        if let (Some(dim), Some(i)) = (&self.options.col, cell.col_index) {
            slice = slice.isel(dim, i)?;
        }
        Ok(Some(slice))
    }

    /// Whether a column-only grid wraps onto several rows.
    fn wraps(&self) -> bool {
        self.options.row.is_none() && self.options.col_wrap.is_some()
    }

    /// Render every cell into a [`Figure`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::Shape`] when the options do not
    /// fit the slices, and [`Error::EmptyData`] when a color-mapped kind has
    /// no finite values in any cell. Nothing is drawn when an error is
    /// returned.
    pub fn plot(&self, options: &PlotOptions) -> Result<Figure> {
        options.validate()?;

        // Per-cell options: grouping is handled here, labels below.
        let mut cell_options = options.clone();
        cell_options.row = None;
        cell_options.col = None;
        cell_options.col_wrap = None;

        let slices: Vec<Option<LabeledArray>> = (0..self.nrows * self.ncols)
            .map(|i| {
                self.select(i / self.ncols, i % self.ncols)
                    .map(|s| s.map(|s| s.squeeze()))
            })
            .collect::<Result<_>>()?;

        let has_data = |s: &LabeledArray| s.finite_values().next().is_some();
        let representative = slices
            .iter()
            .flatten()
            .find(|s| has_data(s))
            .or_else(|| slices.iter().flatten().next())
            .ok_or(Error::EmptyData)?;

        let mut spec = resolve_plot_spec(representative, &cell_options)?;
        let union: Vec<f32> = slices.iter().flatten().flat_map(|s| s.finite_values()).collect();

        let color_scale = if spec.kind.is_color_mapped() {
            let scale = infer_color_scale(&union, &scale_options(spec.kind, &cell_options))?;
            Some(Arc::new(scale))
        } else {
            None
        };
        spec.color_scale = color_scale.clone();

        let bin_range = if spec.kind == PlotKind::Histogram {
            finite_extent(&union)
        } else {
            None
        };

        let layers: Vec<Option<Layer>> = slices
            .iter()
            .map(|slice| match slice {
                Some(s) if has_data(s) => Layer::build(s, &spec, &cell_options, bin_range).map(Some),
                Some(_) => Ok(Some(Layer::Empty)),
                None => Ok(None),
            })
            .collect::<Result<_>>()?;

        let shared = union_extent(layers.iter().flatten().filter_map(Layer::extent));

        // Validation and inference are done; draw.
        let draw_options = PlotOptions {
            add_labels: false,
            add_colorbar: Some(false),
            ..cell_options
        };
        let mut cells = Vec::with_capacity(layers.len());
        for (i, (slice, layer)) in slices.iter().zip(&layers).enumerate() {
            let (Some(slice), Some(layer)) = (slice, layer) else {
                cells.push(None);
                continue;
            };
            let (row, col) = (i / self.ncols, i % self.ncols);
            let axes = self.draw_cell(row, col, slice, &spec, layer, shared, &draw_options, options)?;
            cells.push(Some(axes));
        }

        let colorbar = options
            .add_colorbar
            .unwrap_or(spec.kind.is_color_mapped())
            .then_some(color_scale)
            .flatten();
        let label = self.array.label();
        Ok(Figure::new(
            self.nrows,
            self.ncols,
            cells,
            self.keys(),
            colorbar,
            (!label.is_empty()).then_some(label),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cell(
        &self,
        row: usize,
        col: usize,
        slice: &LabeledArray,
        spec: &PlotSpec,
        layer: &Layer,
        shared: Option<Extent>,
        draw_options: &PlotOptions,
        options: &PlotOptions,
    ) -> Result<Axes> {
        let mut axes = Axes::new(options.width, options.height)?;
        draw(slice, spec, draw_options, layer, shared, &mut axes)?;

        let bottom = row + 1 == self.nrows || self.cell(row + 1, col).is_none();
        axes.show_axes(bottom, col == 0);

        if let Some(key) = self.name_dict(row, col) {
            if layer.is_empty() {
                warn!(cell = %key, "facet cell has no finite values");
            }
            if options.add_labels {
                set_axis_labels(slice, spec, layer, &mut axes);
                let top = row == 0 || self.wraps();
                if let Some(title) = key.col_title().filter(|_| top) {
                    axes.set_title(title);
                }
                let right = col + 1 == self.ncols;
                if let Some(title) = key.row_title().filter(|_| right) {
                    axes.set_row_title(title);
                }
            }
            trace!(row, col, cell = %key, empty = layer.is_empty(), "drew facet cell");
        }
        Ok(axes)
    }
}

fn union_extent(extents: impl Iterator<Item = Extent>) -> Option<Extent> {
    extents.reduce(|((ax0, ax1), (ay0, ay1)), ((bx0, bx1), (by0, by1))| {
        ((ax0.min(bx0), ax1.max(bx1)), (ay0.min(by0), ay1.max(by1)))
    })
}
