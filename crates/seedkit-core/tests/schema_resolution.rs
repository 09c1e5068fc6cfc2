use seedkit_core::{
    Error, FieldDefinition, FieldKey, MemorySchemaProvider, Schema, SchemaDefinition,
    SchemaProvider, TypeCatalog,
};

fn field(id: u32, name: &str, field_type: &str, order: i32) -> FieldDefinition {
    FieldDefinition {
        id,
        label: name.to_string(),
        name: name.to_string(),
        field_type: field_type.to_string(),
        required: false,
        max_length: None,
        order,
        cells: Vec::new(),
    }
}

fn blog_schema() -> SchemaDefinition {
    SchemaDefinition {
        id: 4,
        title: "Blog".to_string(),
        fields: vec![
            field(12, "body", "rte", 2),
            field(10, "summary", "textarea", 1),
            field(14, "map", "google_maps", 3),
        ],
    }
}

#[test]
fn title_field_is_synthesized_first() {
    let schema = Schema::from_definition(blog_schema()).expect("resolve schema");

    let title = &schema.fields[0];
    assert_eq!(title.id, 0);
    assert_eq!(title.name, "title");
    assert!(title.required);
    assert!(title.is_title);
    assert_eq!(title.key(), FieldKey::Title);
    assert_eq!(title.max_length, Some(100));
}

#[test]
fn empty_schema_still_has_a_title() {
    let schema = Schema::from_definition(SchemaDefinition {
        id: 1,
        title: "Empty".to_string(),
        fields: Vec::new(),
    })
    .expect("resolve schema");

    assert_eq!(schema.fields.len(), 1);
    assert!(schema.title_field().is_ok());
}

#[test]
fn custom_fields_follow_sort_order() {
    let schema = Schema::from_definition(blog_schema()).expect("resolve schema");
    let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["title", "summary", "body", "map"]);
}

#[test]
fn reserved_title_id_is_rejected() {
    let mut definition = blog_schema();
    definition.fields.push(field(0, "headline", "text", 0));
    let result = Schema::from_definition(definition);
    assert!(matches!(result, Err(Error::InvalidSchema(_))));
}

#[test]
fn duplicate_field_ids_are_rejected() {
    let mut definition = blog_schema();
    definition.fields.push(field(12, "other", "text", 9));
    assert!(matches!(
        Schema::from_definition(definition),
        Err(Error::InvalidSchema(_))
    ));
}

#[test]
fn memory_provider_reports_missing_schema() {
    let provider: MemorySchemaProvider = vec![blog_schema()].into_iter().collect();
    assert!(provider.get_schema(4).is_some());
    assert!(provider.get_schema(5).is_none());
}

#[test]
fn unknown_types_fall_back_and_are_flagged() {
    let catalog = TypeCatalog::default();
    for declared in ["google_maps", "date", "file"] {
        let resolved = catalog.resolve(declared);
        assert_eq!(resolved.name, "text");
        assert!(resolved.is_unknown);
        assert!(!resolved.is_overridden);
    }
}

#[test]
fn overridden_types_are_never_unknown() {
    let catalog = TypeCatalog::default();
    for (from, to) in &catalog.overrides {
        let resolved = catalog.resolve(from);
        assert_eq!(&resolved.name, to);
        assert!(resolved.is_overridden);
        assert!(!resolved.is_unknown);
    }
}

#[test]
fn resolution_is_idempotent() {
    let catalog = TypeCatalog::default();
    for declared in ["rte", "text", "matrix", "google_maps"] {
        let once = catalog.resolve(declared);
        let twice = catalog.resolve(&once.name);
        assert_eq!(once.name, twice.name);
    }
}

#[test]
fn settings_types_are_flagged() {
    let catalog = TypeCatalog::default();
    assert!(catalog.needs_settings("playa"));
    assert!(catalog.needs_settings("matrix"));
    assert!(!catalog.needs_settings("text"));
}
