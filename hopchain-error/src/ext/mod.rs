use crate::BoxError;
use std::fmt::Display;

mod chain;
mod context;

mod wrapper;
pub use wrapper::OpaqueError;
pub(crate) use wrapper::MessageError;

/// Extends the `Result` and `Option` types with methods for adding context to errors.
///
/// # Examples
///
/// ```
/// use hopchain_error::ErrorContext;
///
/// let result = "hello".parse::<i32>().context("parse integer");
/// assert_eq!("parse integer: invalid digit found in string", result.unwrap_err().to_string());
/// ```
pub trait ErrorContext: private::SealedErrorContext {
    /// The resulting context type after adding context to the contained error.
    type Context;

    /// Add a static context to the contained error.
    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static;

    /// Lazily add a context to the contained error, if it exists.
    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext for Result<T, E>
where
    E: Into<BoxError>,
{
    type Context = Result<T, OpaqueError>;

    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static,
    {
        self.map_err(|error| wrap_context(context, error.into()))
    }

    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| wrap_context(context(), error.into()))
    }
}

impl<T> ErrorContext for Option<T> {
    type Context = Result<T, OpaqueError>;

    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| wrap_context(context, Box::new(MessageError("Option is None"))))
    }

    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| wrap_context(context(), Box::new(MessageError("Option is None"))))
    }
}

fn wrap_context<C>(context: C, error: BoxError) -> OpaqueError
where
    C: Display + Send + Sync + 'static,
{
    OpaqueError::from_std(context::ContextError { context, error })
}

/// Extends the `Error` type with methods for working with errors.
///
/// # Examples
///
/// ```
/// use hopchain_error::ErrorExt;
///
/// #[derive(Debug)]
/// struct CustomError;
///
/// impl std::fmt::Display for CustomError {
///  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
///    write!(f, "Custom error")
///  }
/// }
///
/// impl std::error::Error for CustomError {}
///
/// let error = CustomError.context("whoops");
/// let root_cause = error.root_cause();
/// assert!(root_cause.downcast_ref::<CustomError>().is_some());
/// ```
pub trait ErrorExt: private::SealedErrorExt {
    /// Wrap the error in a context.
    fn context<M>(self, context: M) -> OpaqueError
    where
        M: Display + Send + Sync + 'static;

    /// Lazily wrap the error with a context.
    fn with_context<C, F>(self, context: F) -> OpaqueError
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Iterate over the chain of errors.
    fn chain(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)>;

    /// Get the root cause of the error.
    fn root_cause(&self) -> &(dyn std::error::Error + 'static);
}

impl<Error: std::error::Error + Send + Sync + 'static> ErrorExt for Error {
    fn context<M>(self, context: M) -> OpaqueError
    where
        M: Display + Send + Sync + 'static,
    {
        wrap_context(context, Box::new(self))
    }

    fn with_context<C, F>(self, context: F) -> OpaqueError
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        wrap_context(context(), Box::new(self))
    }

    fn chain(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
        chain::Chain::new(self)
    }

    fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        let mut cause: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = cause.source() {
            cause = next;
        }
        cause
    }
}

mod private {
    pub trait SealedErrorContext {}

    impl<T, E> SealedErrorContext for Result<T, E> where E: Into<crate::BoxError> {}
    impl<T> SealedErrorContext for Option<T> {}

    pub trait SealedErrorExt {}

    impl<Error: std::error::Error + Send + Sync + 'static> SealedErrorExt for Error {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_error_context() {
        let error = MessageError("foo").context("context");
        assert_eq!(error.to_string(), "context: foo");
    }

    #[test]
    fn option_none_context() {
        let error = None::<()>.context("lookup").unwrap_err();
        assert_eq!(error.to_string(), "lookup: Option is None");
    }

    #[test]
    fn box_error_result_context() {
        let result: Result<(), BoxError> = Err("boom".into());
        let error = result.with_context(|| "dial").unwrap_err();
        assert_eq!(error.to_string(), "dial: boom");
    }

    #[derive(Debug)]
    struct CustomError;

    impl std::fmt::Display for CustomError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Custom error")
        }
    }

    impl std::error::Error for CustomError {}

    #[test]
    fn custom_error_root_cause() {
        let error = CustomError;
        let root_cause = error.root_cause();
        assert!(root_cause.is::<CustomError>());
    }

    #[test]
    fn custom_error_context_chain_len() {
        let error = CustomError.context("context");
        // opaque wrapper is transparent: context + custom error
        let n = error.chain().count();
        assert_eq!(2, n);
    }

    #[test]
    fn custom_error_context_context_context_root_cause_downcast() {
        let error = CustomError.context("a").context("b").context("c");
        let root_cause = error.root_cause();
        assert!(root_cause.downcast_ref::<CustomError>().is_some());
    }
}
