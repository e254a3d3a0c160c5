//! # Published arguments.
//!
//! Every callback shares one invocation contract: it receives `&Args`, an ordered
//! list of type-erased values, and destructures it with typed accessors.
//! A wrong count or type becomes a [`CallbackError`] at the point of invocation
//! instead of being discovered through reflection.
//!
//! ## Example
//! ```rust
//! use observable::{args, Args, CallbackError};
//!
//! let args: Args = args![true, "bar"];
//!
//! assert_eq!(args.len(), 2);
//! assert_eq!(*args.get::<bool>(0)?, true);
//! assert_eq!(args.str(1)?, "bar");
//! assert!(args.get::<u32>(0).is_err());
//! # Ok::<(), CallbackError>(())
//! ```

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::CallbackError;

/// One published value.
///
/// Cheap to clone: the value itself is shared behind an `Arc`.
#[derive(Clone)]
pub struct Arg {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Arg {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the value if it has type `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Type name recorded when the value was wrapped.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg<{}>", self.type_name)
    }
}

/// Ordered argument list handed to callbacks.
#[derive(Clone, Default, Debug)]
pub struct Args {
    items: Vec<Arg>,
}

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value (builder style).
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.items.push(Arg::new(value));
        self
    }

    /// Appends a value.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.items.push(Arg::new(value));
    }

    /// Number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no arguments were published.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw access to the argument at `index`.
    #[inline]
    pub fn arg(&self, index: usize) -> Option<&Arg> {
        self.items.get(index)
    }

    /// Iterates over the raw arguments.
    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.items.iter()
    }

    /// Returns the argument at `index` as `&T`.
    ///
    /// # Errors
    /// - [`CallbackError::MissingArgument`] if there is no argument at `index`;
    /// - [`CallbackError::ArgumentMismatch`] if it has another type.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, CallbackError> {
        let arg = self
            .items
            .get(index)
            .ok_or(CallbackError::MissingArgument {
                index,
                expected: type_name::<T>(),
            })?;

        arg.downcast_ref::<T>()
            .ok_or(CallbackError::ArgumentMismatch {
                index,
                expected: type_name::<T>(),
                found: arg.type_name,
            })
    }

    /// Returns the argument at `index` as a string slice.
    ///
    /// Accepts both `String` and `&'static str` values; the event name that is
    /// prepended for multi-name and wildcard subscriptions is always a `String`.
    pub fn str(&self, index: usize) -> Result<&str, CallbackError> {
        let arg = self
            .items
            .get(index)
            .ok_or(CallbackError::MissingArgument {
                index,
                expected: "str",
            })?;

        if let Some(s) = arg.downcast_ref::<String>() {
            return Ok(s.as_str());
        }
        if let Some(s) = arg.downcast_ref::<&'static str>() {
            return Ok(s);
        }
        Err(CallbackError::ArgumentMismatch {
            index,
            expected: "str",
            found: arg.type_name,
        })
    }

    /// Fails unless exactly `n` arguments are present.
    pub fn expect_len(&self, n: usize) -> Result<(), CallbackError> {
        if self.items.len() < n {
            return Err(CallbackError::MissingArgument {
                index: self.items.len(),
                expected: "argument",
            });
        }
        if self.items.len() > n {
            return Err(CallbackError::fail(format!(
                "expected {n} argument(s), got {}",
                self.items.len()
            )));
        }
        Ok(())
    }

    /// Returns a copy with `first` inserted at position 0.
    pub(crate) fn prepended(&self, first: Arg) -> Args {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(first);
        items.extend(self.items.iter().cloned());
        Args { items }
    }
}

impl From<Vec<Arg>> for Args {
    fn from(items: Vec<Arg>) -> Self {
        Self { items }
    }
}

impl FromIterator<Arg> for Args {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Builds [`Args`] from a list of values of any `Send + Sync + 'static` type.
///
/// ```rust
/// use observable::args;
///
/// let empty = args![];
/// assert!(empty.is_empty());
///
/// let two = args![1u8, String::from("x")];
/// assert_eq!(two.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::from(vec![$($crate::Arg::new($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let args = Args::new().with(42i32).with(String::from("x"));
        assert_eq!(*args.get::<i32>(0).unwrap(), 42);
        assert_eq!(args.str(1).unwrap(), "x");
    }

    #[test]
    fn test_missing_and_mismatch() {
        let args = Args::new().with(1u8);

        assert_eq!(
            args.get::<u8>(1),
            Err(CallbackError::MissingArgument {
                index: 1,
                expected: "u8"
            })
        );
        assert_eq!(
            args.get::<bool>(0),
            Err(CallbackError::ArgumentMismatch {
                index: 0,
                expected: "bool",
                found: "u8"
            })
        );
        assert!(args.str(0).is_err());
    }

    #[test]
    fn test_prepended_keeps_order() {
        let args = Args::new().with(1u8).with(2u8);
        let typed = args.prepended(Arg::new(String::from("foo")));

        assert_eq!(typed.len(), 3);
        assert_eq!(typed.str(0).unwrap(), "foo");
        assert_eq!(*typed.get::<u8>(1).unwrap(), 1);
        assert_eq!(*typed.get::<u8>(2).unwrap(), 2);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_expect_len() {
        let args = Args::new().with(true);
        assert!(args.expect_len(1).is_ok());
        assert!(args.expect_len(2).is_err());
        assert!(args.expect_len(0).is_err());
    }

    #[test]
    fn test_macro_and_debug() {
        let args = crate::args![true, "bar"];
        assert_eq!(format!("{:?}", args.arg(0).unwrap()), "Arg<bool>");
        assert_eq!(args.str(1).unwrap(), "bar");
    }
}
