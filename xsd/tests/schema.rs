use std::collections::HashMap;

use xfb_xsd::xstypes::QName;
use xfb_xsd::{
    ImportResolver, InsertOrderTree, Schema, SchemaComponentTable, SchemaError, TypeDefinition,
};

fn parse(text: &str) -> Result<(Schema, SchemaComponentTable), SchemaError> {
    xfb_xsd::read_schema_text(text, &[])
}

fn local(name: &str) -> QName {
    QName::with_optional_namespace(None::<String>, name)
}

#[test]
fn named_types_resolve_regardless_of_declaration_order() {
    // The element references a type that is only declared later in the document.
    let (schema, components) = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record" type="recordType"/>
  <xs:complexType name="recordType">
    <xs:sequence>
      <xs:element name="title" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>
"#,
    )
    .unwrap();

    assert!(matches!(
        schema.type_definition(&local("recordType")),
        Some(TypeDefinition::Complex(_))
    ));
    let tree = InsertOrderTree::for_element(&schema, &components, "record").unwrap();
    let names: Vec<&str> = tree
        .element_leaves()
        .into_iter()
        .filter_map(|leaf| tree.node(leaf).element_name())
        .collect();
    assert_eq!(names, vec!["title"]);
}

#[test]
fn mutually_recursive_complex_types_are_accepted() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="chapterType">
    <xs:sequence>
      <xs:element name="section" type="sectionType" minOccurs="0"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="sectionType">
    <xs:sequence>
      <xs:element name="chapter" type="chapterType" minOccurs="0"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="book" type="chapterType"/>
</xs:schema>
"#,
    );
    assert!(result.is_ok());
}

#[test]
fn builtin_type_names_need_no_definition() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="count" type="xs:nonNegativeInteger"/>
</xs:schema>
"#,
    );
    assert!(result.is_ok());
}

#[test]
fn unresolved_type_reference_fails_construction() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record" type="missingType"/>
</xs:schema>
"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::UnresolvedTypeReference(name)) if name.local_name == "missingType"
    ));
}

#[test]
fn unresolved_element_reference_fails_construction() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:element ref="missingElement"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::UnresolvedElementReference(name)) if name.local_name == "missingElement"
    ));
}

#[test]
fn unresolved_substitution_group_head_fails_construction() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="doi" type="xs:string" substitutionGroup="identifier"/>
</xs:schema>
"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::UnresolvedElementReference(name)) if name.local_name == "identifier"
    ));
}

#[test]
fn model_group_definitions_expand_at_their_reference_site() {
    let (schema, components) = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:group name="core">
    <xs:sequence>
      <xs:element name="title" type="xs:string"/>
      <xs:element name="creator" type="xs:string"/>
    </xs:sequence>
  </xs:group>
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:group ref="core"/>
        <xs:element name="date" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    )
    .unwrap();

    assert_eq!(schema.model_group_definitions, vec![local("core")]);
    let tree = InsertOrderTree::for_element(&schema, &components, "record").unwrap();
    let names: Vec<&str> = tree
        .element_leaves()
        .into_iter()
        .filter_map(|leaf| tree.node(leaf).element_name())
        .collect();
    assert_eq!(names, vec!["title", "creator", "date"]);
}

#[test]
fn unresolved_group_reference_fails_construction() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:group ref="missingGroup"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::UnresolvedGroupReference(name)) if name.local_name == "missingGroup"
    ));
}

#[test]
fn cyclic_group_references_are_detected() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:group name="ga">
    <xs:sequence>
      <xs:group ref="gb"/>
    </xs:sequence>
  </xs:group>
  <xs:group name="gb">
    <xs:sequence>
      <xs:group ref="ga"/>
    </xs:sequence>
  </xs:group>
  <xs:element name="record">
    <xs:complexType>
      <xs:group ref="ga"/>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    );
    assert!(matches!(result, Err(SchemaError::CyclicTypeDefinition(_))));
}

#[test]
fn min_occurs_above_max_occurs_is_rejected() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="title" type="xs:string" minOccurs="3" maxOccurs="2"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::InvalidOccurs { min: 3, max: 2 })
    ));
}

#[test]
fn malformed_occurrence_values_are_rejected() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="title" type="xs:string" maxOccurs="lots"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    );
    assert!(matches!(result, Err(SchemaError::InvalidValue { .. })));
}

#[test]
fn malformed_xml_is_reported_as_such() {
    let result = parse("<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">");
    assert!(matches!(result, Err(SchemaError::Xml(_))));
}

#[test]
fn non_schema_documents_are_rejected() {
    let result = parse("<html/>");
    assert!(matches!(result, Err(SchemaError::NotASchema(name)) if name == "html"));
}

struct FixtureResolver(HashMap<&'static str, &'static str>);

impl ImportResolver for FixtureResolver {
    fn resolve(&self, location: &str) -> Option<String> {
        self.0.get(location).map(|text| text.to_string())
    }
}

#[test]
fn included_documents_contribute_their_definitions() {
    let resolver = FixtureResolver(HashMap::from([(
        "types.xsd",
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="recordType">
    <xs:sequence>
      <xs:element name="title" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>
"#,
    )]));
    let resolvers: Vec<Box<dyn ImportResolver>> = vec![Box::new(resolver)];

    let (schema, components) = xfb_xsd::read_schema_text(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:include schemaLocation="types.xsd"/>
  <xs:element name="record" type="recordType"/>
</xs:schema>
"#,
        &resolvers,
    )
    .unwrap();

    let tree = InsertOrderTree::for_element(&schema, &components, "record").unwrap();
    let names: Vec<&str> = tree
        .element_leaves()
        .into_iter()
        .filter_map(|leaf| tree.node(leaf).element_name())
        .collect();
    assert_eq!(names, vec!["title"]);
}

#[test]
fn unresolvable_schema_locations_fail_construction() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:include schemaLocation="nowhere.xsd"/>
</xs:schema>
"#,
    );
    assert!(matches!(
        result,
        Err(SchemaError::UnresolvedImport(location)) if location == "nowhere.xsd"
    ));
}

#[test]
fn imports_without_a_location_fetch_nothing() {
    let result = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:import namespace="http://example.org/elsewhere"/>
  <xs:element name="record" type="xs:string"/>
</xs:schema>
"#,
    );
    assert!(result.is_ok());
}

#[test]
fn target_namespace_qualifies_top_level_declarations() {
    let (schema, components) = parse(
        r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://example.org/records">
  <xs:element name="record">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="title" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#,
    )
    .unwrap();

    assert_eq!(
        schema.target_namespace.as_deref(),
        Some("http://example.org/records")
    );
    let name = QName::with_namespace("http://example.org/records", "record");
    let declaration = schema.top_level_element(&components, &name);
    assert!(declaration.is_some());
}
