/// Builds a [`Dictionary`](crate::Dictionary) from `key => value` pairs
///
/// ```
/// use collections::dict;
///
/// let d = dict! { "username" => "alex", "role" => "admin" };
/// assert_eq!(d.get("role"), Some(&"admin"));
/// ```
#[macro_export]
macro_rules! dict {
    () => {
        $crate::Dictionary::new()
    };
    ( $( $key: expr => $value: expr ),+ $(,)? ) => {{
        let mut d = $crate::Dictionary::new();
        $( d.put($key, $value); )+
        d
    }};
}
