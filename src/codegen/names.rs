//! Name conversions between the wire schema and target languages.
//!
//! The wire schema uses `package:ns/kebab-interface` paths; every
//! downstream artifact needs the same identifier spelled its own way.
//! Checksums are 64-bit digests of normalized signatures so generated
//! stubs can detect contract drift at load time.

use crate::util::hash::digest64;

/// Convert an identifier to wire format: underscores removed, dash
/// before every interior uppercase letter, lowercased.
/// `DoSomething1` becomes `do-something1`.
pub fn to_wire_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);

    for ch in name.chars() {
        if ch == '_' {
            continue;
        }
        if ch.is_uppercase() && !result.is_empty() {
            result.push('-');
        }
        result.extend(ch.to_lowercase());
    }

    result
}

/// Full wire interface path: `engine:sample/i-sample`.
pub fn wire_interface_path(package_name: &str, interface_name: &str) -> String {
    format!("{}/{}", package_name, to_wire_name(interface_name))
}

/// Wire path to C++ namespace form: `engine:sample/i-sample` becomes
/// `::engine::sample::i_sample`.
pub fn wire_to_cxx_path(wire_path: &str) -> String {
    let result = wire_path
        .replace(':', "::")
        .replace('/', "::")
        .replace('-', "_");
    if result.starts_with("::") {
        result
    } else {
        format!("::{}", result)
    }
}

/// Wire function name to C++ PascalCase: `do-something1` becomes
/// `DoSomething1`.
pub fn wire_to_pascal(wire_name: &str) -> String {
    wire_name
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Wire function name to Rust snake_case: `do-something1` becomes
/// `do_something1`.
pub fn wire_to_snake(wire_name: &str) -> String {
    wire_name.replace('-', "_").to_lowercase()
}

/// Wire interface path to the managed-runtime interop type name:
/// `engine:sample/i-sample` becomes
/// `ApplicationWorld.wit.imports.engine.sample.ISampleInterop`.
pub fn wire_to_csharp_path(wire_path: &str) -> String {
    let Some((package, interface)) = wire_path.split_once('/') else {
        return wire_path.to_string();
    };

    let namespace = package.replace(':', ".");
    let type_name: String = wire_to_pascal(interface);

    format!(
        "ApplicationWorld.wit.imports.{}.{}Interop",
        namespace, type_name
    )
}

/// Wire interface path to Rust module path: `engine:sample/i-sample`
/// becomes `crate::engine::sample::i_sample`.
pub fn wire_to_rust_path(wire_path: &str) -> String {
    let result = wire_path
        .replace(':', "::")
        .replace('/', "::")
        .replace('-', "_");
    if result.starts_with("crate::") {
        result
    } else {
        format!("crate::{}", result)
    }
}

/// Wire package name to C++ namespace: `engine:sample` becomes
/// `::engine::sample`.
pub fn package_to_cxx_namespace(package_name: &str) -> String {
    format!("::{}", package_name.replace(':', "::"))
}

/// Wire package name to managed namespace: `engine:sample` becomes
/// `ApplicationWorld.wit.imports.engine.sample`.
pub fn package_to_csharp_namespace(package_name: &str) -> String {
    format!("ApplicationWorld.wit.imports.{}", package_name.replace(':', "."))
}

/// Wire package name to Rust module path: `engine:sample` becomes
/// `crate::engine::sample`.
pub fn package_to_rust_namespace(package_name: &str) -> String {
    format!("crate::{}", package_name.replace(':', "::"))
}

/// Convert a mixed-case C++ method name to Rust snake_case:
/// `doSomething_1` becomes `do_something_1`.
pub fn method_to_snake_case(method_name: &str) -> String {
    let mut result = String::with_capacity(method_name.len() + 4);
    let mut prev_lower = false;

    for ch in method_name.chars() {
        if ch.is_uppercase() && prev_lower {
            result.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        result.extend(ch.to_lowercase());
    }

    result
}

/// Map a C++ native type to the target language's spelling.
/// Unknown types pass through unchanged.
pub fn convert_type(native: &str, lang: TargetLang) -> String {
    conversion_entry(native)
        .map(|(csharp, rust)| match lang {
            TargetLang::CSharp => csharp.to_string(),
            TargetLang::Rust => rust.to_string(),
        })
        .unwrap_or_else(|| native.to_string())
}

/// Target language for type conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLang {
    CSharp,
    Rust,
}

fn conversion_entry(native: &str) -> Option<(&'static str, &'static str)> {
    let entry = match native {
        "std::int8_t" | "char" => ("sbyte", "i8"),
        "std::uint8_t" | "unsigned char" => ("byte", "u8"),
        "std::int16_t" => ("Int16", "i16"),
        "std::uint16_t" => ("UInt16", "u16"),
        "std::int32_t" => ("Int32", "i32"),
        "std::uint32_t" => ("UInt32", "u32"),
        "std::int64_t" => ("Int64", "i64"),
        "std::uint64_t" => ("UInt64", "u64"),
        "int" => ("int", "i32"),
        "unsigned int" => ("uint", "u32"),
        "long" | "long long" => ("long", "i64"),
        "unsigned long" | "unsigned long long" => ("ulong", "u64"),
        "short" => ("short", "i16"),
        "unsigned short" => ("ushort", "u16"),
        "float" => ("float", "f32"),
        "double" => ("double", "f64"),
        "bool" => ("bool", "bool"),
        "size_t" | "std::size_t" => ("ulong", "usize"),
        "void" => ("void", "()"),
        _ => return None,
    };
    Some(entry)
}

/// 64-bit checksum of one function signature:
/// `name(type1:param1, type2:param2)`.
pub fn function_checksum(name: &str, params: &[(String, String)]) -> u64 {
    let mut signature = String::from(name);
    signature.push('(');
    for (i, (ty, param)) in params.iter().enumerate() {
        if i > 0 {
            signature.push_str(", ");
        }
        signature.push_str(ty);
        signature.push(':');
        signature.push_str(param);
    }
    signature.push(')');

    digest64(&signature)
}

/// 64-bit checksum of one interface: name plus its function checksums,
/// sorted so declaration order does not matter.
pub fn interface_checksum(interface_name: &str, function_checksums: &[u64]) -> u64 {
    let mut sorted = function_checksums.to_vec();
    sorted.sort_unstable();

    let list = sorted
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",");

    digest64(&format!("{}{{{}}}", interface_name, list))
}

/// 64-bit hash of a fully qualified name, used as a stable identifier.
pub fn name_hash(qualified_name: &str) -> u64 {
    digest64(qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wire_name() {
        assert_eq!(to_wire_name("DoSomething1"), "do-something1");
        assert_eq!(to_wire_name("ISample"), "i-sample");
        assert_eq!(to_wire_name("do_something"), "dosomething");
    }

    #[test]
    fn test_wire_interface_path() {
        assert_eq!(
            wire_interface_path("engine:sample", "ISample"),
            "engine:sample/i-sample"
        );
    }

    #[test]
    fn test_wire_to_cxx_path() {
        assert_eq!(
            wire_to_cxx_path("engine:sample/i-sample"),
            "::engine::sample::i_sample"
        );
    }

    #[test]
    fn test_wire_to_pascal_and_snake() {
        assert_eq!(wire_to_pascal("do-something1"), "DoSomething1");
        assert_eq!(wire_to_snake("do-something1"), "do_something1");
    }

    #[test]
    fn test_wire_to_csharp_path() {
        assert_eq!(
            wire_to_csharp_path("engine:sample/i-sample"),
            "ApplicationWorld.wit.imports.engine.sample.ISampleInterop"
        );
    }

    #[test]
    fn test_wire_to_rust_path() {
        assert_eq!(
            wire_to_rust_path("engine:sample/i-sample"),
            "crate::engine::sample::i_sample"
        );
    }

    #[test]
    fn test_package_namespaces() {
        assert_eq!(package_to_cxx_namespace("engine:sample"), "::engine::sample");
        assert_eq!(
            package_to_csharp_namespace("engine:sample"),
            "ApplicationWorld.wit.imports.engine.sample"
        );
        assert_eq!(package_to_rust_namespace("engine:sample"), "crate::engine::sample");
    }

    #[test]
    fn test_method_to_snake_case() {
        assert_eq!(method_to_snake_case("doSomething_1"), "do_something_1");
        assert_eq!(method_to_snake_case("Update"), "update");
    }

    #[test]
    fn test_convert_type() {
        assert_eq!(convert_type("std::int32_t", TargetLang::CSharp), "Int32");
        assert_eq!(convert_type("std::int32_t", TargetLang::Rust), "i32");
        assert_eq!(convert_type("void", TargetLang::Rust), "()");
        assert_eq!(
            convert_type("MyCustomType", TargetLang::Rust),
            "MyCustomType"
        );
    }

    #[test]
    fn test_function_checksum_depends_on_signature() {
        let a = function_checksum(
            "Update",
            &[("float".to_string(), "delta".to_string())],
        );
        let b = function_checksum(
            "Update",
            &[("float".to_string(), "delta".to_string())],
        );
        let c = function_checksum(
            "Update",
            &[("double".to_string(), "delta".to_string())],
        );

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_interface_checksum_order_insensitive() {
        let a = interface_checksum("ISample", &[1, 2, 3]);
        let b = interface_checksum("ISample", &[3, 1, 2]);
        let c = interface_checksum("IOther", &[1, 2, 3]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
