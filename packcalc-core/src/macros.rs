#[macro_export]
/// Generates a String similar to output of `dbg` but without printing
macro_rules! format_dbg {
    ($dbg_expr:expr) => {
        format!(
            "[{}:{}] {}: {:?}",
            file!(),
            line!(),
            stringify!($dbg_expr),
            $dbg_expr
        )
    };
    () => {
        format!("[{}:{}]", file!(), line!())
    };
}

#[macro_export]
/// Returns early with [`CalcError::DegenerateParameter`](crate::error::CalcError::DegenerateParameter)
/// if `$cond` does not hold.  A `NaN` operand fails the check.
macro_rules! ensure_param {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            return Err($crate::error::CalcError::DegenerateParameter(format!($($arg)+)));
        }
    };
}
