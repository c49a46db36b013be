// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// A macro to generate `Fn` like wrapper types with consistent patterns.
///
/// The generated type wraps a function in an `Arc<dyn Fn...>`, providing
/// `Clone`, `Debug`, and a `call` method. We need this to store user-provided
/// hooks in a thread-safe, clonable way without spreading trait-object
/// signatures through the acquirer.
///
/// # Syntax
///
/// ```rust,ignore
/// define_fn_wrapper!(TypeName(Fn(param: ParamType, ...) -> ReturnType));
/// ```
///
/// The return type may be omitted and defaults to unit.
macro_rules! define_fn_wrapper {
    ($name:ident(Fn($($param_name:ident: $param_ty:ty),*) -> $return_ty:ty)) => {
        pub(crate) struct $name(std::sync::Arc<dyn Fn($($param_ty),*) -> $return_ty + Send + Sync>);

        impl $name {
            pub(crate) fn new<F>(hook: F) -> Self
            where
                F: Fn($($param_ty),*) -> $return_ty + Send + Sync + 'static,
            {
                Self(std::sync::Arc::new(hook))
            }

            pub(crate) fn call(&self, $($param_name: $param_ty),*) -> $return_ty {
                (self.0)($($param_name),*)
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                Self(std::sync::Arc::clone(&self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish()
            }
        }
    };

    // Match pattern without return type (defaults to unit)
    ($name:ident(Fn($($param_name:ident: $param_ty:ty),*))) => {
        $crate::define_fn_wrapper!($name(Fn($($param_name: $param_ty),*) -> ()));
    };
}

pub(crate) use define_fn_wrapper;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    define_fn_wrapper!(Add(Fn(left: u32, right: u32) -> u32));
    define_fn_wrapper!(Log(Fn(line: &str)));

    #[test]
    fn static_assertions() {
        static_assertions::assert_impl_all!(Add: Send, Sync, Debug, Clone);
        static_assertions::assert_impl_all!(Log: Send, Sync, Debug, Clone);
    }

    #[test]
    fn call_ok() {
        let add = Add::new(|left, right| left + right);
        assert_eq!(add.call(2, 3), 5);
    }

    #[test]
    fn clone_shares_the_function() {
        let count = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));

        let log = {
            let count = std::sync::Arc::clone(&count);
            Log::new(move |_| {
                count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
        };

        log.call("one");
        log.clone().call("two");

        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn debug_ok() {
        let log = Log::new(|_| {});

        let debug_str = format!("{log:?}");

        assert_eq!(debug_str, "Log");
    }
}
