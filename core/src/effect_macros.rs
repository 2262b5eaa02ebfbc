//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for the request → success/failure mapping every remote operation follows.

/// Create an `Effect::Future` that awaits a fallible operation and maps the
/// outcome onto exactly one follow-up action
///
/// The operation expression is evaluated inside the spawned future, so it
/// must only capture owned values (clone `Arc`s before the macro).
///
/// # Example
///
/// ```rust,ignore
/// use roster_core::request_effect;
///
/// let api = self.api.clone();
/// request_effect! {
///     run: api.list_users(),
///     on_success: |users| UserAction::LoadUsersSuccess { users },
///     on_error: |error| UserAction::LoadUsersFailure { error: error.to_string() }
/// }
/// ```
#[macro_export]
macro_rules! request_effect {
    (
        run: $run:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $run.await {
                ::std::result::Result::Ok($success_param) => ::std::option::Option::Some($success_body),
                ::std::result::Result::Err($error_param) => ::std::option::Option::Some($error_body),
            }
        }))
    };
}
