/// Expands to a `caps()` method for a `Function` impl.
///
/// ```ignore
/// impl Function for VSumFn {
///     func_caps!(PURE, COLUMN_WISE, NUMERIC_ONLY);
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! func_caps {
    ( $($cap:ident),+ $(,)? ) => {
        fn caps(&self) -> $crate::function::FnCaps {
            $( $crate::function::FnCaps::$cap )|+
        }
    };
}
