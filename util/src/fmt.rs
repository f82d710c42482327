//! Utilities for writing [`std::fmt`] implementations.

use std::fmt::{Debug, Display, Formatter};
struct FmtClosure<T>(T);

impl<T> Debug for FmtClosure<T>
where
    T: Fn(&mut Formatter<'_>) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0(f)
    }
}

impl<T> Display for FmtClosure<T>
where
    T: Fn(&mut Formatter<'_>) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0(f)
    }
}

/// Turns a closure that writes to a [`Formatter`] into a type that implements [`Display`] and
/// [`Debug`] by calling that closure.
pub fn fmt_closure<T: Fn(&mut Formatter<'_>) -> std::fmt::Result>(
    closure: T,
) -> impl Display + Debug {
    FmtClosure(closure)
}

/// Writes each item yielded by `items` using its [`Display`] impl, with `sep` between consecutive
/// items.
pub fn write_separated<I>(f: &mut Formatter<'_>, sep: &str, items: I) -> std::fmt::Result
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut first = true;
    for item in items {
        if !first {
            f.write_str(sep)?;
        }
        first = false;
        write!(f, "{item}")?;
    }
    Ok(())
}
