use std::borrow::Cow;
use std::fmt;

/// The error type a fallible predicate may return.
pub type PredicateError = Box<dyn std::error::Error + Send + Sync + 'static>;

type CheckFn<'a, S> = dyn Fn(&S) -> Result<bool, PredicateError> + Send + Sync + 'a;

/// A condition over a subject of type `S`, paired with a human-readable description.
///
/// The description is what shows up in failure messages, so it should read like the
/// condition itself. The [`predicate!`](crate::predicate) macro uses the source text of a
/// closure as its description:
///
/// ```
/// use testy::predicate;
///
/// let has_three = predicate!(|items: &Vec<i32>| items.len() == 3);
/// assert_eq!(has_three.description(), "|items: &Vec<i32>| items.len() == 3");
/// ```
///
/// Predicates may be evaluated any number of times, so they should be free of side effects.
pub struct Predicate<'a, S: ?Sized> {
    description: Cow<'static, str>,
    check: Box<CheckFn<'a, S>>,
}

impl<'a, S: ?Sized> Predicate<'a, S> {
    pub fn new(
        description: impl Into<Cow<'static, str>>,
        check: impl Fn(&S) -> bool + Send + Sync + 'a,
    ) -> Self {
        Self {
            description: description.into(),
            check: Box::new(move |subject: &S| Ok(check(subject))),
        }
    }

    /// Creates a predicate whose evaluation can fail.
    /// An `Err` aborts the wait immediately with `ErrorDetails::PredicateFault`.
    pub fn fallible<E>(
        description: impl Into<Cow<'static, str>>,
        check: impl Fn(&S) -> Result<bool, E> + Send + Sync + 'a,
    ) -> Self
    where
        E: Into<PredicateError>,
    {
        Self {
            description: description.into(),
            check: Box::new(move |subject: &S| check(subject).map_err(Into::into)),
        }
    }

    /// A predicate that is never satisfied.
    pub fn never() -> Self {
        Self::new("never", |_| false)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn evaluate(&self, subject: &S) -> Result<bool, PredicateError> {
        (self.check)(subject)
    }
}

impl<S: ?Sized> fmt::Display for Predicate<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<S: ?Sized> fmt::Debug for Predicate<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Predicate`](crate::wait::Predicate) from a closure, using the closure's
/// source text as the description.
#[macro_export]
macro_rules! predicate {
    ($($check:tt)+) => {
        $crate::wait::Predicate::new(stringify!($($check)+), $($check)+)
    };
}
