//! Post-processing of the front-end's AST dump.
//!
//! The raw clang JSON is front-end-shaped: annotations are bare
//! `AnnotateAttr` nodes pointing back into the source, and declarations
//! carry no cross-language names. This module turns the dump into the
//! extraction document templates consume: annotation strings attached,
//! wire/binding/script names and stable identifiers on every interface
//! and method, signature details with converted types, and first/last
//! flags for template comma handling.

use std::path::Path;

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::codegen::names::{
    self, convert_type, function_checksum, interface_checksum, name_hash, TargetLang,
};

/// Parse one or more concatenated JSON documents.
///
/// With a namespace filter the front-end emits one top-level object per
/// occurrence of the namespace, back to back.
pub fn parse_concatenated(content: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for value in serde_json::Deserializer::from_str(content).into_iter::<Value>() {
        match value {
            Ok(v) => documents.push(v),
            Err(e) if documents.is_empty() => bail!("no valid JSON in front-end output: {}", e),
            Err(_) => break,
        }
    }
    if documents.is_empty() {
        bail!("front-end produced no JSON output");
    }
    Ok(documents)
}

/// Merge several dump objects into one by concatenating `inner` arrays.
pub fn merge_documents(documents: Vec<Value>) -> Value {
    let mut iter = documents.into_iter();
    let mut merged = iter.next().unwrap_or_else(|| json!({}));

    if merged.get("inner").is_none() {
        merged["inner"] = json!([]);
    }

    for doc in iter {
        if let Some(Value::Array(extra)) = doc.get("inner") {
            if let Some(Value::Array(inner)) = merged.get_mut("inner") {
                inner.extend(extra.iter().cloned());
            }
        }
    }

    merged
}

/// Run the full post-processing pass and assemble the final document.
pub fn post_process(
    ast: Value,
    header_content: &str,
    header_path: &Path,
    package_name: &str,
    root_namespace: &str,
) -> Value {
    let mut ast = ast;

    attach_annotations(&mut ast, header_content, header_path);
    decorate_declarations(&mut ast, package_name, root_namespace, None);
    mark_group_edges(&mut ast);

    let mut document = Map::new();
    document.insert("root_namespace".into(), json!(root_namespace));
    document.insert(
        "root_namespace_dotnet".into(),
        json!(root_namespace.replace("::", ".")),
    );
    document.insert(
        "root_namespace_rust".into(),
        json!(root_namespace.replace("::", ".").to_lowercase()),
    );
    let last = root_namespace.rsplit("::").next().unwrap_or(root_namespace);
    document.insert("root_namespace_last".into(), json!(last));
    document.insert("root_namespace_rust_last".into(), json!(last.to_lowercase()));

    document.insert("package_name".into(), json!(package_name));
    document.insert(
        "binding_cxx_namespace".into(),
        json!(names::package_to_cxx_namespace(package_name)),
    );
    document.insert(
        "binding_dotnet_namespace".into(),
        json!(names::package_to_csharp_namespace(package_name)),
    );
    document.insert(
        "binding_rust_namespace".into(),
        json!(names::package_to_rust_namespace(package_name)),
    );

    if let Value::Object(fields) = ast {
        for (key, value) in fields {
            document.entry(key).or_insert(value);
        }
    }

    Value::Object(document)
}

/// Attach annotation strings to `AnnotateAttr` nodes.
///
/// The front-end records only the source location of the attribute; the
/// annotation text itself is recovered from the `METADATA(...)` macro on
/// that line of the header.
fn attach_annotations(node: &mut Value, header_content: &str, header_path: &Path) {
    let lines: Vec<&str> = header_content.lines().collect();
    let re = Regex::new(r"METADATA\s*\(\s*([A-Za-z0-9_]+)\s*\)").unwrap();

    fn walk(node: &mut Value, lines: &[&str], re: &Regex, header_path: &Path) {
        if let Value::Object(map) = node {
            if map.get("kind").and_then(Value::as_str) == Some("AnnotateAttr") {
                if let Some(line) = annotation_line(map, header_path) {
                    if line >= 1 && line <= lines.len() {
                        if let Some(cap) = re.captures(lines[line - 1]) {
                            map.insert("annotation".into(), json!(cap[1].to_string()));
                        }
                    }
                }
            }

            for value in map.values_mut() {
                walk(value, lines, re, header_path);
            }
        } else if let Value::Array(items) = node {
            for item in items {
                walk(item, lines, re, header_path);
            }
        }
    }

    walk(node, &lines, &re, header_path);
}

/// Line of the macro expansion, if it points into the processed header.
fn annotation_line(attr: &Map<String, Value>, header_path: &Path) -> Option<usize> {
    let begin = attr.get("range")?.get("begin")?;
    let loc = begin.get("expansionLoc").unwrap_or(begin);

    if let Some(file) = loc.get("file").and_then(Value::as_str) {
        if Path::new(file) != header_path {
            return None;
        }
    }

    loc.get("line").and_then(Value::as_u64).map(|l| l as usize)
}

/// Names carried from an enclosing interface down to its methods.
struct InterfaceScope {
    qualified_name: String,
    wire_path: String,
    binding_cxx_path: String,
    binding_csharp_path: String,
    binding_rust_path: String,
    script_cxx_path: String,
    script_csharp_name: String,
    script_rust_path: String,
}

/// Decorate interface classes and their methods with cross-language
/// names, signature details and checksums.
fn decorate_declarations(
    node: &mut Value,
    package_name: &str,
    root_namespace: &str,
    scope: Option<&InterfaceScope>,
) {
    match node {
        Value::Object(map) => {
            let kind = map
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();

            if kind == "CXXRecordDecl" {
                if let Some(name) = map.get("name").and_then(Value::as_str).map(String::from) {
                    let new_scope = decorate_interface(map, &name, package_name, root_namespace);
                    for value in map.values_mut() {
                        decorate_declarations(
                            value,
                            package_name,
                            root_namespace,
                            Some(&new_scope),
                        );
                    }
                    finish_interface(map, &name);
                    return;
                }
            }

            if kind == "CXXMethodDecl" {
                if let Some(name) = map.get("name").and_then(Value::as_str).map(String::from) {
                    decorate_method(map, &name, scope);
                }
            }

            for value in map.values_mut() {
                decorate_declarations(value, package_name, root_namespace, scope);
            }
        }
        Value::Array(items) => {
            for item in items {
                decorate_declarations(item, package_name, root_namespace, scope);
            }
        }
        _ => {}
    }
}

fn decorate_interface(
    map: &mut Map<String, Value>,
    name: &str,
    package_name: &str,
    root_namespace: &str,
) -> InterfaceScope {
    let wire_path = names::wire_interface_path(package_name, name);
    let wire_name = wire_path
        .rsplit('/')
        .next()
        .unwrap_or(&wire_path)
        .to_string();

    let binding_cxx_path = names::wire_to_cxx_path(&wire_path);
    let binding_csharp_path = names::wire_to_csharp_path(&wire_path);
    let binding_rust_path = names::wire_to_rust_path(&wire_path);

    // Script-facing names keep the header's own spelling; only the
    // binding layer speaks wire case.
    let script_cxx_path = format!("{}::{}", root_namespace, name);
    let script_rust_path = format!("crate::{}::{}", root_namespace.to_lowercase(), name);

    let qualified_name = format!("::{}::{}", root_namespace, name);
    let id = name_hash(&qualified_name);

    let scope = InterfaceScope {
        qualified_name: qualified_name.clone(),
        wire_path: wire_path.clone(),
        binding_cxx_path: binding_cxx_path.clone(),
        binding_csharp_path: binding_csharp_path.clone(),
        binding_rust_path: binding_rust_path.clone(),
        script_cxx_path: script_cxx_path.clone(),
        script_csharp_name: name.to_string(),
        script_rust_path: script_rust_path.clone(),
    };

    map.insert("wire_interface_path".into(), json!(wire_path));
    map.insert("wire_interface_name".into(), json!(wire_name));
    map.insert("binding_cxx_interface_path".into(), json!(binding_cxx_path));
    map.insert(
        "binding_csharp_interface_path".into(),
        json!(binding_csharp_path),
    );
    map.insert("binding_rust_interface_path".into(), json!(binding_rust_path));
    map.insert("script_cxx_interface_path".into(), json!(script_cxx_path));
    map.insert("script_cxx_interface_name".into(), json!(name));
    map.insert("script_csharp_interface_name".into(), json!(name));
    map.insert("script_rust_interface_path".into(), json!(script_rust_path));
    map.insert("script_rust_interface_name".into(), json!(name));
    map.insert("script_cxx_namespace".into(), json!(root_namespace));
    map.insert(
        "script_dotnet_namespace".into(),
        json!(root_namespace.replace("::", ".")),
    );
    map.insert(
        "script_rust_namespace".into(),
        json!(root_namespace.replace("::", ".").to_lowercase()),
    );
    map.insert("qualified_name".into(), json!(qualified_name));
    map.insert("interface_id".into(), json!(id));

    scope
}

/// Interface checksum folds in the method checksums, so it runs after
/// the children are decorated.
fn finish_interface(map: &mut Map<String, Value>, name: &str) {
    let mut checksums = Vec::new();
    if let Some(Value::Array(inner)) = map.get("inner") {
        for child in inner {
            if child.get("kind").and_then(Value::as_str) == Some("CXXMethodDecl") {
                if let Some(c) = child.get("function_checksum").and_then(Value::as_u64) {
                    checksums.push(c);
                }
            }
        }
    }
    map.insert(
        "interface_checksum".into(),
        json!(interface_checksum(name, &checksums)),
    );
}

fn decorate_method(map: &mut Map<String, Value>, name: &str, scope: Option<&InterfaceScope>) {
    let wire_name = names::to_wire_name(name);
    let binding_cxx = names::wire_to_pascal(&wire_name);
    let binding_rust = names::wire_to_snake(&wire_name);
    let script_rust = names::method_to_snake_case(name);

    map.insert("wire_function_name".into(), json!(wire_name));
    map.insert("binding_cxx_function_name".into(), json!(binding_cxx));
    map.insert("binding_csharp_function_name".into(), json!(binding_cxx));
    map.insert("binding_rust_function_name".into(), json!(binding_rust));
    map.insert("script_cxx_function_name".into(), json!(name));
    map.insert("script_csharp_function_name".into(), json!(name));
    map.insert("script_rust_function_name".into(), json!(script_rust));

    if let Some(scope) = scope {
        map.insert("wire_interface_path".into(), json!(scope.wire_path));
        map.insert(
            "binding_cxx_function_path".into(),
            json!(format!("{}::{}", scope.binding_cxx_path, binding_cxx)),
        );
        map.insert(
            "binding_csharp_function_path".into(),
            json!(format!("{}.{}", scope.binding_csharp_path, binding_cxx)),
        );
        map.insert(
            "binding_rust_function_path".into(),
            json!(format!("{}::{}", scope.binding_rust_path, binding_rust)),
        );
        map.insert(
            "script_cxx_function_path".into(),
            json!(format!("{}::{}", scope.script_cxx_path, name)),
        );
        map.insert(
            "script_csharp_function_path".into(),
            json!(format!("{}.{}", scope.script_csharp_name, name)),
        );
        map.insert(
            "script_rust_function_path".into(),
            json!(format!("{}::{}", scope.script_rust_path, script_rust)),
        );

        let qualified = format!("{}::{}", scope.qualified_name, name);
        map.insert("function_id".into(), json!(name_hash(&qualified)));
    }

    let params = extract_parameters(map);
    map.insert(
        "function_checksum".into(),
        json!(function_checksum(name, &params)),
    );

    let parameters: Vec<Value> = params
        .iter()
        .map(|(ty, param)| {
            json!({
                "name": param,
                "native_type": ty,
                "csharp_type": convert_type(ty, TargetLang::CSharp),
                "rust_type": convert_type(ty, TargetLang::Rust),
            })
        })
        .collect();
    map.insert("parameters".into(), json!(parameters));

    // Return type is everything before the parameter list in the
    // function's qualType signature.
    if let Some(qual_type) = map
        .get("type")
        .and_then(|t| t.get("qualType"))
        .and_then(Value::as_str)
    {
        if let Some(paren) = qual_type.find('(') {
            let return_type = qual_type[..paren].trim().to_string();
            map.insert(
                "csharp_return_type".into(),
                json!(convert_type(&return_type, TargetLang::CSharp)),
            );
            map.insert(
                "rust_return_type".into(),
                json!(convert_type(&return_type, TargetLang::Rust)),
            );
            map.insert("native_return_type".into(), json!(return_type));
        }
    }
}

/// Parameter (type, name) pairs from a method's `ParmVarDecl` children.
fn extract_parameters(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(Value::Array(inner)) = map.get("inner") {
        for child in inner {
            if child.get("kind").and_then(Value::as_str) != Some("ParmVarDecl") {
                continue;
            }
            let name = child
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let ty = child
                .get("type")
                .and_then(|t| t.get("qualType"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            params.push((ty, name));
        }
    }

    params
}

/// Mark the first and last item of each kind group inside every array,
/// for `{{^last}},{{/last}}`-style comma handling in templates.
/// Implicit methods group separately from explicit ones.
fn mark_group_edges(node: &mut Value) {
    match node {
        Value::Object(map) => {
            for value in map.values_mut() {
                if let Value::Array(items) = value {
                    let mut groups: std::collections::HashMap<String, Vec<usize>> =
                        std::collections::HashMap::new();
                    for (i, item) in items.iter().enumerate() {
                        if let Value::Object(obj) = item {
                            let kind = obj
                                .get("kind")
                                .and_then(Value::as_str)
                                .unwrap_or("_no_kind");
                            let key = if kind == "CXXMethodDecl" {
                                let implicit = obj
                                    .get("isImplicit")
                                    .and_then(Value::as_bool)
                                    .unwrap_or(false);
                                format!("{}+implicit={}", kind, implicit)
                            } else {
                                kind.to_string()
                            };
                            groups.entry(key).or_default().push(i);
                        }
                    }

                    for indices in groups.values() {
                        if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
                            items[first]["first"] = json!(true);
                            items[last]["last"] = json!(true);
                        }
                    }

                    for item in items.iter_mut() {
                        if let Value::Object(obj) = item {
                            obj.entry("first").or_insert(json!(false));
                            obj.entry("last").or_insert(json!(false));
                        }
                        mark_group_edges(item);
                    }
                } else {
                    mark_group_edges(value);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mark_group_edges(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ast() -> Value {
        json!({
            "kind": "TranslationUnitDecl",
            "inner": [{
                "kind": "NamespaceDecl",
                "name": "Engine",
                "inner": [{
                    "kind": "CXXRecordDecl",
                    "name": "ISample",
                    "inner": [
                        {
                            "kind": "CXXMethodDecl",
                            "name": "DoSomething",
                            "type": {"qualType": "std::int32_t (std::int32_t)"},
                            "inner": [
                                {
                                    "kind": "ParmVarDecl",
                                    "name": "value",
                                    "type": {"qualType": "std::int32_t"}
                                },
                                {
                                    "kind": "AnnotateAttr",
                                    "range": {"begin": {
                                        "expansionLoc": {"line": 3, "file": "i_sample.h"}
                                    }}
                                }
                            ]
                        }
                    ]
                }]
            }]
        })
    }

    const HEADER: &str = "#pragma once\n\nMETADATA(EXPORT_TO_SCRIPT)\nvoid DoSomething(int);\n";

    fn processed() -> Value {
        post_process(
            sample_ast(),
            HEADER,
            Path::new("i_sample.h"),
            "engine:sample",
            "Engine::Interface::Sample",
        )
    }

    fn interface(doc: &Value) -> &Value {
        &doc["inner"][0]["inner"][0]
    }

    fn method(doc: &Value) -> &Value {
        &interface(doc)["inner"][0]
    }

    #[test]
    fn test_root_level_fields() {
        let doc = processed();
        assert_eq!(doc["package_name"], "engine:sample");
        assert_eq!(doc["root_namespace"], "Engine::Interface::Sample");
        assert_eq!(doc["root_namespace_dotnet"], "Engine.Interface.Sample");
        assert_eq!(doc["root_namespace_last"], "Sample");
        assert_eq!(doc["binding_cxx_namespace"], "::engine::sample");
    }

    #[test]
    fn test_interface_names() {
        let doc = processed();
        let iface = interface(&doc);

        assert_eq!(iface["wire_interface_path"], "engine:sample/i-sample");
        assert_eq!(iface["wire_interface_name"], "i-sample");
        assert_eq!(
            iface["binding_cxx_interface_path"],
            "::engine::sample::i_sample"
        );
        assert_eq!(
            iface["script_cxx_interface_path"],
            "Engine::Interface::Sample::ISample"
        );
        assert_eq!(
            iface["qualified_name"],
            "::Engine::Interface::Sample::ISample"
        );
        assert!(iface["interface_id"].as_u64().is_some());
        assert!(iface["interface_checksum"].as_u64().is_some());
    }

    #[test]
    fn test_method_names_and_signature() {
        let doc = processed();
        let m = method(&doc);

        assert_eq!(m["wire_function_name"], "do-something");
        assert_eq!(m["binding_rust_function_name"], "do_something");
        assert_eq!(m["script_rust_function_name"], "do_something");
        assert_eq!(m["native_return_type"], "std::int32_t");
        assert_eq!(m["rust_return_type"], "i32");
        assert_eq!(m["parameters"][0]["name"], "value");
        assert_eq!(m["parameters"][0]["csharp_type"], "Int32");
        assert!(m["function_id"].as_u64().is_some());
    }

    #[test]
    fn test_annotation_attached() {
        let doc = processed();
        let attr = &method(&doc)["inner"][1];
        assert_eq!(attr["annotation"], "EXPORT_TO_SCRIPT");
    }

    #[test]
    fn test_group_edges_marked() {
        let doc = processed();
        let m = method(&doc);
        assert_eq!(m["first"], true);
        assert_eq!(m["last"], true);
    }

    #[test]
    fn test_parse_concatenated() {
        let docs = parse_concatenated("{\"a\": 1}\n{\"b\": 2}").unwrap();
        assert_eq!(docs.len(), 2);

        assert!(parse_concatenated("not json").is_err());
    }

    #[test]
    fn test_merge_documents() {
        let merged = merge_documents(vec![
            json!({"kind": "TU", "inner": [{"kind": "A"}]}),
            json!({"inner": [{"kind": "B"}]}),
        ]);

        let inner = merged["inner"].as_array().unwrap();
        assert_eq!(inner.len(), 2);
    }
}
