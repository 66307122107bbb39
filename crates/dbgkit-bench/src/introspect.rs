//! Type-name introspection.
//!
//! Names come from [`std::any::type_name`]; their exact text is not a
//! stable contract and may differ between compiler versions.

/// Fully qualified name of `T`.
#[must_use]
pub fn type_name<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// Name of the static type of `value`.
///
/// Passing `&x` names `x`'s type; passing `&&x` names the reference type.
#[must_use]
pub fn type_name_of_val<T: ?Sized>(_value: &T) -> &'static str {
    std::any::type_name::<T>()
}

/// Name of `T` with module paths removed from every segment.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> String {
    shorten(std::any::type_name::<T>())
}

fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(last_path_component(&segment));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(last_path_component(&segment));
    out
}

fn last_path_component(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    #[test]
    fn test_primitive_names() {
        assert_eq!(type_name::<u64>(), "u64");
        assert_eq!(type_name::<&str>(), "&str");
        assert_eq!(type_name::<&mut [u8]>(), "&mut [u8]");
    }

    #[test]
    fn test_type_name_of_val() {
        let x = 5i32;
        assert_eq!(type_name_of_val(&x), "i32");
        assert_eq!(type_name_of_val(&&x), "&i32");
        let s: &str = "hi";
        assert_eq!(type_name_of_val(s), "str");
    }

    #[test]
    fn test_qualified_user_type() {
        assert!(type_name::<Probe>().ends_with("introspect::tests::Probe"));
    }

    #[test]
    fn test_short_names() {
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<String>");
        assert_eq!(
            short_type_name::<Option<Result<Probe, std::io::ErrorKind>>>(),
            "Option<Result<Probe, ErrorKind>>"
        );
        assert_eq!(short_type_name::<(i32, &str)>(), "(i32, &str)");
    }
}
