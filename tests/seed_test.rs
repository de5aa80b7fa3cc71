//! Integration tests for schema template seeding

use bastion::adapters::store::MemoryStore;
use bastion::core::schema::{SchemaProvisioner, TemplateKind};
use bastion::domain::{fields_from_json, BastionError, DocumentPath, FieldValue};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_weapon_seed_is_idempotent_and_drops_stale_fields() {
    let store = Arc::new(
        MemoryStore::new()
            .with_document(
                "utils/schema_arma",
                fields_from_json(json!({"obsolete": 1, "Specific": {"Gittata": 30}})),
            )
            .unwrap(),
    );
    let provisioner = SchemaProvisioner::new(store.clone());
    let path = DocumentPath::parse("utils/schema_arma").unwrap();

    provisioner.seed_schema("weapon").await.unwrap();
    let first = store.peek(&path).unwrap();
    provisioner.seed_schema("weapon").await.unwrap();
    let second = store.peek(&path).unwrap();

    assert_eq!(first, second);
    assert!(!first.contains_key("obsolete"));
    let specific = first["Specific"].as_map().unwrap();
    assert!(!specific.contains_key("Gittata"));
    assert_eq!(
        specific["Hands"],
        FieldValue::Array(vec![FieldValue::Integer(1), FieldValue::Integer(2)])
    );
}

#[tokio::test]
async fn test_every_template_has_three_sections_and_progression_keys() {
    let store = Arc::new(MemoryStore::new());
    let provisioner = SchemaProvisioner::new(store.clone());

    let reports = provisioner.seed_all().await.unwrap();

    assert_eq!(reports.len(), TemplateKind::ALL.len());
    for report in reports {
        let stored = store.peek(&report.path).unwrap();
        let mut sections: Vec<_> = stored.keys().cloned().collect();
        sections.sort();
        assert_eq!(sections, vec!["General", "Parametri", "Specific"]);

        let base = stored["Parametri"].as_map().unwrap()["Base"]
            .as_map()
            .unwrap()
            .clone();
        for table in base.values() {
            let mut keys: Vec<_> = table.as_map().unwrap().keys().cloned().collect();
            keys.sort_by_key(|k| k.parse::<i64>().unwrap_or(i64::MAX));
            assert_eq!(keys, vec!["1", "4", "7", "10"]);
        }
    }
}

#[tokio::test]
async fn test_unknown_name_is_rejected_without_writes() {
    let store = Arc::new(MemoryStore::new());
    let provisioner = SchemaProvisioner::new(store.clone());

    let err = provisioner.seed_schema("scroll").await.unwrap_err();

    assert!(matches!(err, BastionError::UnknownTemplate(_)));
    assert!(err.is_caller_error());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_italian_names_seed_same_documents() {
    let store = Arc::new(MemoryStore::new());
    let provisioner = SchemaProvisioner::new(store.clone());

    let report = provisioner.seed_schema("CONSUMABILE").await.unwrap();

    assert_eq!(report.template, TemplateKind::Consumable);
    assert_eq!(report.path.to_string(), "utils/schema_consumabile");
    let specific = report.content["Specific"].as_map().unwrap();
    assert_eq!(specific["stackable"], FieldValue::Boolean(true));
}
