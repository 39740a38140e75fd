//! Solidity type translation for generated schema, mapping and test code.

use crate::abi::AbiParam;

/// An event parameter flattened into a single entity field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventField {
  /// Entity field name, e.g. `order_maker`.
  pub field: String,
  /// Accessor below `event.params`, e.g. `order.maker`.
  pub accessor: String,
  /// Solidity type of the leaf value.
  pub kind: String,
}

/// Name of the `index`th parameter, inventing one when the ABI leaves it blank.
pub fn param_name(param: &AbiParam, index: usize) -> String {
  if param.name.is_empty() {
    format!("param{}", index)
  } else {
    param.name.clone()
  }
}

/// Flatten event inputs into entity fields.
///
/// Plain tuples are expanded into `parent_child` fields; tuple arrays stay a
/// single field. A parameter called `id` is renamed so it cannot shadow the
/// entity id.
pub fn event_fields(inputs: &[AbiParam]) -> Vec<EventField> {
  let mut fields = Vec::new();
  for (index, param) in inputs.iter().enumerate() {
    let name = param_name(param, index);
    let field = if name == "id" { "internal_id".to_string() } else { name.clone() };
    flatten(param, field, name, &mut fields);
  }
  fields
}

fn flatten(param: &AbiParam, field: String, accessor: String, out: &mut Vec<EventField>) {
  match (&param.components, param.kind.as_str()) {
    (Some(components), "tuple") => {
      for (index, component) in components.iter().enumerate() {
        let name = param_name(component, index);
        flatten(component, format!("{}_{}", field, name), format!("{}.{}", accessor, name), out);
      }
    }
    _ => out.push(EventField {
      field,
      accessor,
      kind: param.kind.clone(),
    }),
  }
}

/// Element type of an array type (`uint256[][3]` gives `uint256[]`), `None` for scalars.
fn array_element(kind: &str) -> Option<&str> {
  if !kind.ends_with(']') {
    return None;
  }
  kind.rfind('[').map(|open| &kind[..open])
}

fn int_bits(kind: &str, prefix: &str) -> Option<u32> {
  let bits = kind.strip_prefix(prefix)?;
  if bits.is_empty() {
    return Some(256);
  }
  bits.parse().ok()
}

enum Scalar {
  Address,
  Bool,
  String,
  Bytes,
  FixedBytes,
  SmallInt,
  BigInt,
  UnsignedBigInt,
  Tuple,
}

fn scalar(kind: &str) -> Scalar {
  match kind {
    "address" => Scalar::Address,
    "bool" => Scalar::Bool,
    "string" => Scalar::String,
    "bytes" => Scalar::Bytes,
    "tuple" => Scalar::Tuple,
    _ if kind.starts_with("bytes") => Scalar::FixedBytes,
    _ => {
      if let Some(bits) = int_bits(kind, "uint") {
        // graph-ts only fits values below 2^31 into i32
        if bits <= 24 { Scalar::SmallInt } else { Scalar::UnsignedBigInt }
      } else if let Some(bits) = int_bits(kind, "int") {
        if bits <= 32 { Scalar::SmallInt } else { Scalar::BigInt }
      } else {
        Scalar::Bytes
      }
    }
  }
}

/// GraphQL field type for a Solidity type.
pub fn graphql_type(kind: &str) -> String {
  if let Some(element) = array_element(kind) {
    return format!("[{}!]", graphql_type(element));
  }
  match scalar(kind) {
    Scalar::Address | Scalar::Bytes | Scalar::FixedBytes | Scalar::Tuple => "Bytes",
    Scalar::Bool => "Boolean",
    Scalar::String => "String",
    Scalar::SmallInt => "Int",
    Scalar::BigInt | Scalar::UnsignedBigInt => "BigInt",
  }
  .to_string()
}

/// AssemblyScript type of a decoded event parameter.
pub fn asc_type(kind: &str) -> String {
  if let Some(element) = array_element(kind) {
    return format!("Array<{}>", asc_type(element));
  }
  match scalar(kind) {
    Scalar::Address => "Address",
    Scalar::Bool => "boolean",
    Scalar::String => "string",
    Scalar::Bytes | Scalar::FixedBytes => "Bytes",
    Scalar::SmallInt => "i32",
    Scalar::BigInt | Scalar::UnsignedBigInt => "BigInt",
    Scalar::Tuple => "ethereum.Tuple",
  }
  .to_string()
}

/// `ethereum.Value` constructor wrapping a value of this type.
///
/// Nested arrays are not constructible and yield `None`.
pub fn value_constructor(kind: &str) -> Option<&'static str> {
  let (element, array) = match array_element(kind) {
    Some(element) if array_element(element).is_some() => return None,
    Some(element) => (element, true),
    None => (kind, false),
  };
  let constructor = match (scalar(element), array) {
    (Scalar::Address, false) => "fromAddress",
    (Scalar::Address, true) => "fromAddressArray",
    (Scalar::Bool, false) => "fromBoolean",
    (Scalar::Bool, true) => "fromBooleanArray",
    (Scalar::String, false) => "fromString",
    (Scalar::String, true) => "fromStringArray",
    (Scalar::Bytes, false) => "fromBytes",
    (Scalar::Bytes, true) => "fromBytesArray",
    (Scalar::FixedBytes, false) => "fromFixedBytes",
    (Scalar::FixedBytes, true) => "fromFixedBytesArray",
    (Scalar::SmallInt, false) => "fromI32",
    (Scalar::SmallInt, true) => "fromI32Array",
    (Scalar::BigInt, false) => "fromSignedBigInt",
    (Scalar::BigInt, true) => "fromSignedBigIntArray",
    (Scalar::UnsignedBigInt, false) => "fromUnsignedBigInt",
    (Scalar::UnsignedBigInt, true) => "fromUnsignedBigIntArray",
    (Scalar::Tuple, false) => "fromTuple",
    (Scalar::Tuple, true) => "fromTupleArray",
  };
  Some(constructor)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn graphql_types() {
    assert_eq!(graphql_type("address"), "Bytes");
    assert_eq!(graphql_type("bytes32"), "Bytes");
    assert_eq!(graphql_type("bool"), "Boolean");
    assert_eq!(graphql_type("string"), "String");
    assert_eq!(graphql_type("uint8"), "Int");
    assert_eq!(graphql_type("uint32"), "BigInt");
    assert_eq!(graphql_type("int32"), "Int");
    assert_eq!(graphql_type("uint"), "BigInt");
    assert_eq!(graphql_type("int256"), "BigInt");
    assert_eq!(graphql_type("address[]"), "[Bytes!]");
    assert_eq!(graphql_type("uint256[2][]"), "[[BigInt!]!]");
  }

  #[test]
  fn asc_types_and_constructors() {
    assert_eq!(asc_type("address"), "Address");
    assert_eq!(asc_type("uint16"), "i32");
    assert_eq!(asc_type("uint256[]"), "Array<BigInt>");
    assert_eq!(asc_type("tuple"), "ethereum.Tuple");

    assert_eq!(value_constructor("uint256"), Some("fromUnsignedBigInt"));
    assert_eq!(value_constructor("int64"), Some("fromSignedBigInt"));
    assert_eq!(value_constructor("bytes4[]"), Some("fromFixedBytesArray"));
    assert_eq!(value_constructor("tuple[]"), Some("fromTupleArray"));
    assert_eq!(value_constructor("uint8[][]"), None);
  }

  #[test]
  fn tuples_are_flattened() {
    let inputs = vec![
      AbiParam::new("id", "uint256"),
      AbiParam::new("order", "tuple")
        .with_components(vec![AbiParam::new("maker", "address"), AbiParam::new("", "uint8")]),
      AbiParam::new("fills", "tuple[]").with_components(vec![AbiParam::new("amount", "uint256")]),
    ];

    let fields = event_fields(&inputs);

    let names: Vec<_> = fields.iter().map(|f| (f.field.as_str(), f.accessor.as_str())).collect();
    assert_eq!(
      names,
      vec![
        ("internal_id", "id"),
        ("order_maker", "order.maker"),
        ("order_param1", "order.param1"),
        ("fills", "fills"),
      ]
    );
  }
}
