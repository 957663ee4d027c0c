//! Line charts from [Rust][] through the [Matplotlib][] Python
//! visualization library.
//!
//! Usage
//! -----
//!
//! Build a [`Series`] from your x and y values, plot it on an [`Axes`],
//! label the chart and either [`show`] it or save it to a file.
//!
//! ```no_run
//! use lineplot as plt;
//! let series = plt::Series::new(vec![1., 2., 3., 4., 5.],
//!                               vec![2., 4., 6., 8., 10.])?;
//! let (fig, mut ax) = plt::figure()?;
//! ax.line(&series).plot()?;
//! ax.set_xlabel("X-axis").set_ylabel("Y-axis").set_title("Line Plot");
//! fig.save().to_file("target/line.pdf")?;
//! # Ok::<(), plt::Error>(())
//! ```
//!
//! [Rust]: https://www.rust-lang.org/
//! [Matplotlib]: https://matplotlib.org/

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter},
    path::Path,
};
use lazy_static::lazy_static;
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::{IntoPyDict, PyDict, PyList},
};
use numpy::PyArray1;

macro_rules! getattr {
    ($py: ident, $lib: expr, $f: literal) => {
        $lib.getattr($py, intern!($py, $f)).unwrap()
    };
}

macro_rules! meth {
    ($obj: expr, $m: ident, $args: expr, $kwargs: expr) => {
        Python::with_gil(|py| {
            $obj.call_method(py, intern!(py, stringify!($m)), $args, $kwargs)
        })
    };
    ($obj: expr, $m: ident, $args: expr) => {
        Python::with_gil(|py| {
            $obj.call_method1(py, intern!(py, stringify!($m)), $args)
        })
    };
}

/// Possible errors when building or rendering a chart.
#[derive(Debug)]
pub enum Error {
    /// The x and y sequences cannot form a series (mismatched lengths
    /// or no points at all).
    InvalidInput(String),
    /// The Python library "matplotlib" was not found.
    NoMatplotlib,
    /// The rendering backend could not display the figure.
    Rendering(PyErr),
    /// The path contains an element that is not a directory or does
    /// not exist.
    FileNotFoundError,
    /// Permission denied to access or create the filesystem path.
    PermissionError,
    /// Other Python errors.
    Python(PyErr),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::InvalidInput(reason) =>
                write!(f, "Invalid series data: {}", reason),
            Error::NoMatplotlib =>
                write!(f, "The matplotlib library has not been found.\n\
Please install it.  See https://matplotlib.org/\n\
If you use Anaconda, see https://github.com/PyO3/pyo3/issues/1554"),
            Error::Rendering(e) =>
                write!(f, "The rendering backend could not display the \
                           figure: {}", e),
            Error::FileNotFoundError =>
                write!(f, "A path contains an element that is not a \
                           directory or does not exist"),
            Error::PermissionError =>
                write!(f, "Permission denied to access or create the \
                           filesystem path"),
            Error::Python(e) =>
                write!(f, "Python error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py|
        PyModule::import(py, intern!(py, $m)).map(|m| m.into()))
}}

lazy_static! {
    static ref PYPLOT: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.pyplot")
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}

/// Paired x and y columns defining the points of a line chart.
///
/// A `Series` always holds the same number of x and y values and at
/// least one point; [`Series::new`] rejects anything else, so a value
/// of this type can be plotted without further checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Series {
    /// Return a series pairing `x[i]` with `y[i]`.
    ///
    /// # Example
    ///
    /// ```
    /// use lineplot as plt;
    /// let s = plt::Series::new(vec![1., 2.], vec![2., 4.])?;
    /// assert_eq!(s.len(), 2);
    /// # Ok::<(), plt::Error>(())
    /// ```
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Series, Error> {
        if x.len() != y.len() {
            return Err(Error::InvalidInput(format!(
                "x has {} values but y has {}", x.len(), y.len())));
        }
        if x.is_empty() {
            return Err(Error::InvalidInput(
                "a series needs at least one point".to_string()));
        }
        Ok(Series { x, y })
    }

    /// Build a series from (x, y) pairs.
    ///
    /// # Example
    ///
    /// ```
    /// use lineplot as plt;
    /// let s = plt::Series::from_points([(1., 2.), (2., 4.), (3., 6.)])?;
    /// assert_eq!(s.y(), &[2., 4., 6.]);
    /// # Ok::<(), plt::Error>(())
    /// ```
    pub fn from_points<I>(points: I) -> Result<Series, Error>
    where I: IntoIterator,
          <I as IntoIterator>::Item: Borrow<(f64, f64)> {
        // (f64, f64) chosen for compatibility with `zip`.
        let points = points.into_iter();
        let n = points.size_hint().0;
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for p in points {
            let &(xi, yi) = p.borrow();
            x.push(xi);
            y.push(yi);
        }
        Series::new(x, y)
    }

    pub fn x(&self) -> &[f64] { &self.x }

    pub fn y(&self) -> &[f64] { &self.y }

    /// Number of points in the series.  Always ≥ 1.
    pub fn len(&self) -> usize { self.x.len() }
}

/// A set of chart axes, the drawing area of a [`Figure`].
#[derive(Debug, Clone)]
pub struct Axes {
    ax: PyObject,
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
}

/// Handle on the lines drawn by a single [`Line::plot`] call.
pub struct Line2D {
    lines: Py<PyList>,
}

/// Return a new figure together with its single axes.
pub fn figure() -> Result<(Figure, Axes), Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let fig_ax = pyplot
            .call_method0(py, intern!(py, "subplots"))
            .map_err(Error::Python)?;
        let (fig, ax): (PyObject, PyObject) =
            fig_ax.extract(py).map_err(Error::Python)?;
        Ok((Figure { fig }, Axes { ax }))
    })
}

/// Display all open figures and block until their windows are closed.
///
/// Under a non-interactive backend this returns immediately.
pub fn show() -> Result<(), Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        match getattr!(py, pyplot, "show").call0(py) {
            Ok(_) => Ok(()),
            Err(e) => Err(Error::Rendering(e)),
        }
    })
}

impl Figure {
    pub fn save(&self) -> Savefig {
        Savefig { fig: self.fig.clone(), dpi: None }
    }
}

pub struct Savefig {
    fig: PyObject,
    dpi: Option<f64>,
}

impl Savefig {
    pub fn dpi(&mut self, dpi: f64) -> &mut Self {
        if dpi > 0. {
            self.dpi = Some(dpi);
        } else {
            self.dpi = None;
        }
        self
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            if let Some(dpi) = self.dpi {
                kwargs.set_item("dpi", dpi).unwrap()
            }
            self.fig.call_method(
                py, intern!(py, "savefig"),
                (path.as_ref(),), Some(kwargs)
            ).map_err(|e| {
                    if e.is_instance_of::<PyFileNotFoundError>(py) {
                        Error::FileNotFoundError
                    } else if e.is_instance_of::<PyPermissionError>(py) {
                        Error::PermissionError
                    } else {
                        Error::Python(e)
                    }
                })
        })?;
        Ok(())
    }
}

impl Axes {
    /// Plot the points of `series` as a connected line.
    ///
    /// A one-point series renders as a single point with no segment.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lineplot as plt;
    /// let s = plt::Series::new(vec![1., 2., 3.], vec![1., 4., 2.])?;
    /// let (fig, mut ax) = plt::figure()?;
    /// ax.line(&s).plot()?;
    /// fig.save().to_file("target/line_doc.pdf")?;
    /// # Ok::<(), plt::Error>(())
    /// ```
    #[must_use]
    pub fn line<'a>(&'a mut self, series: &'a Series) -> Line<'a> {
        // Mutably borrow `self` to reflect that the final `.plot()`
        // will mutate the underlying Python object.
        Line { axes: self,
               options: PlotOptions::new(),
               series }
    }

    pub fn set_title(&mut self, v: &str) -> &mut Self {
        meth!(self.ax, set_title, (v,)).unwrap();
        self
    }

    pub fn set_xlabel(&mut self, label: &str) -> &mut Self {
        meth!(self.ax, set_xlabel, (label,)).unwrap();
        self
    }

    pub fn set_ylabel(&mut self, label: &str) -> &mut Self {
        meth!(self.ax, set_ylabel, (label,)).unwrap();
        self
    }

    /// The current title of the chart.
    pub fn title(&self) -> Result<String, Error> {
        self.text_of("get_title")
    }

    /// The current label of the horizontal axis.
    pub fn xlabel(&self) -> Result<String, Error> {
        self.text_of("get_xlabel")
    }

    /// The current label of the vertical axis.
    pub fn ylabel(&self) -> Result<String, Error> {
        self.text_of("get_ylabel")
    }

    fn text_of(&self, getter: &str) -> Result<String, Error> {
        Python::with_gil(|py| {
            self.ax.call_method0(py, getter)
                .and_then(|v| v.extract(py))
                .map_err(Error::Python)
        })
    }
}

#[derive(Clone)]
struct PlotOptions<'a> {
    fmt: &'a str,
    antialiased: bool,
    label: &'a str,
    linewidth: Option<f64>,
}

impl<'a> PlotOptions<'a> {
    fn new() -> PlotOptions<'static> {
        PlotOptions { fmt: "", antialiased: true,
                      label: "", linewidth: None }
    }

    fn kwargs(&'a self, py: Python<'a>) -> &'a PyDict {
        let kwargs = PyDict::new(py);
        kwargs.set_item("antialiased", self.antialiased).unwrap();
        if !self.label.is_empty() {
            kwargs.set_item("label", self.label).unwrap()
        }
        if let Some(w) = self.linewidth {
            kwargs.set_item("linewidth", w).unwrap()
        }
        kwargs
    }
}

/// A pending line plot: a [`Series`] plus its drawing options.
#[must_use]
pub struct Line<'a> {
    axes: &'a Axes,
    options: PlotOptions<'a>,
    series: &'a Series,
}

impl<'a> Line<'a> {
    /// Matplotlib format string, e.g. `"r."` for red dots.
    #[must_use]
    pub fn fmt(mut self, fmt: &'a str) -> Self {
        self.options.fmt = fmt;
        self
    }

    #[must_use]
    pub fn antialiased(mut self, b: bool) -> Self {
        self.options.antialiased = b;
        self
    }

    #[must_use]
    pub fn label(mut self, label: &'a str) -> Self {
        self.options.label = label;
        self
    }

    #[must_use]
    pub fn linewidth(mut self, w: f64) -> Self {
        self.options.linewidth = Some(w);
        self
    }

    /// Draw the series on the axes with the options specified in
    /// [`Line`].
    pub fn plot(self) -> Result<Line2D, Error> {
        Python::with_gil(|py| {
            let xn = PyArray1::from_slice(py, self.series.x()).to_object(py);
            let yn = PyArray1::from_slice(py, self.series.y()).to_object(py);
            let lines = self.axes.ax
                .call_method(py, intern!(py, "plot"),
                             (xn, yn, self.options.fmt),
                             Some(self.options.kwargs(py)))
                .map_err(Error::Python)?;
            let lines: Py<PyList> =
                lines.extract(py).map_err(Error::Python)?;
            Ok(Line2D { lines })
        })
    }
}

impl Line2D {
    fn set_kw<'a, I>(&'a self, kwargs: I) -> &'a Self
    where I: IntoPyDict {
        Python::with_gil(|py| {
            let kwargs = Some(kwargs.into_py_dict(py));
            for l in self.lines.as_ref(py).iter() {
                l.call_method("set", (), kwargs).unwrap();
            }
        });
        self
    }

    pub fn label(&self, label: &str) -> &Self {
        self.set_kw([("label", label)])
    }

    /// The x values actually plotted, read back from the chart.
    pub fn xdata(&self) -> Result<Vec<f64>, Error> {
        self.column("get_xdata")
    }

    /// The y values actually plotted, read back from the chart.
    pub fn ydata(&self) -> Result<Vec<f64>, Error> {
        self.column("get_ydata")
    }

    fn column(&self, getter: &str) -> Result<Vec<f64>, Error> {
        Python::with_gil(|py| {
            let line = self.lines.as_ref(py).get_item(0)
                .map_err(Error::Python)?;
            let data = line.call_method0(getter)
                .map_err(Error::Python)?;
            let data: &PyArray1<f64> = data.downcast()
                .map_err(|e| Error::Python(e.into()))?;
            data.to_vec().map_err(|e| Error::Python(e.into()))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let r = Series::new(vec![1., 2.], vec![1., 2., 3.]);
        match r {
            Err(Error::InvalidInput(reason)) => {
                assert!(reason.contains('2') && reason.contains('3'))
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(Series::new(vec![], vec![]),
                         Err(Error::InvalidInput(_))));
        assert!(matches!(Series::from_points::<[(f64, f64); 0]>([]),
                         Err(Error::InvalidInput(_))));
    }

    #[test]
    fn from_points_splits_columns() -> Result<(), Error> {
        let s = Series::from_points([(1., 2.), (2., 4.), (3., 6.)])?;
        assert_eq!(s.x(), &[1., 2., 3.]);
        assert_eq!(s.y(), &[2., 4., 6.]);
        assert_eq!(s.len(), 3);
        Ok(())
    }

    #[test]
    fn a_basic_pdf() -> Result<(), Error> {
        let s = Series::new(vec![1., 2., 3., 4.], vec![1., 4., 2., 3.])?;
        let (fig, mut ax) = figure()?;
        ax.line(&s).plot()?;
        fig.save().to_file("target/a_basic.pdf")?;
        Ok(())
    }

    #[test]
    fn plotted_points_follow_series() -> Result<(), Error> {
        let s = Series::new(vec![1., 2., 3., 4., 5.],
                            vec![2., 4., 6., 8., 10.])?;
        let (_fig, mut ax) = figure()?;
        let line = ax.line(&s).plot()?;
        let x = line.xdata()?;
        let y = line.ydata()?;
        assert_eq!(x.len(), 5);
        assert_eq!(x, s.x());
        assert_eq!(y, s.y());
        for (xi, yi) in x.iter().zip(&y) {
            assert_eq!(*yi, 2. * xi);
        }
        Ok(())
    }

    #[test]
    fn labels_and_title_round_trip() -> Result<(), Error> {
        let s = Series::new(vec![1., 2.], vec![2., 4.])?;
        let (_fig, mut ax) = figure()?;
        ax.line(&s).plot()?;
        ax.set_xlabel("X-axis").set_ylabel("Y-axis").set_title("Line Plot");
        assert_eq!(ax.xlabel()?, "X-axis");
        assert_eq!(ax.ylabel()?, "Y-axis");
        assert_eq!(ax.title()?, "Line Plot");
        Ok(())
    }

    #[test]
    fn single_point_series_plots() -> Result<(), Error> {
        let s = Series::new(vec![1.], vec![5.])?;
        let (fig, mut ax) = figure()?;
        let line = ax.line(&s).fmt("o").plot()?;
        assert_eq!(line.xdata()?, &[1.]);
        assert_eq!(line.ydata()?, &[5.]);
        fig.save().to_file("target/single_point.pdf")?;
        Ok(())
    }
}
