use jsonschema::JSONSchema;
use serde_json::json;

use scheinfirmen_at::parse::parse_bmf_extract;
use scheinfirmen_at::schema::JSON_SCHEMA;

const SAMPLE: &[u8] = include_bytes!("fixtures/sample_raw.csv");

fn compiled_schema() -> JSONSchema {
    let schema_json: serde_json::Value = serde_json::from_str(JSON_SCHEMA).unwrap();
    let schema_static: &'static serde_json::Value = Box::leak(Box::new(schema_json));
    JSONSchema::options().compile(schema_static).unwrap()
}

#[test]
fn every_parsed_record_is_schema_valid() {
    let compiled = compiled_schema();
    let result = parse_bmf_extract(SAMPLE).unwrap();
    assert!(!result.records.is_empty());

    for record in &result.records {
        let instance = serde_json::to_value(record).unwrap();
        assert!(
            compiled.is_valid(&instance),
            "record {:?} violates the schema",
            record.name
        );
    }
}

#[test]
fn missing_required_field_is_rejected() {
    let compiled = compiled_schema();
    let result = parse_bmf_extract(SAMPLE).unwrap();

    let mut instance = serde_json::to_value(&result.records[0]).unwrap();
    instance.as_object_mut().unwrap().remove("name");

    assert!(!compiled.is_valid(&instance), "name is required");
}

#[test]
fn invalid_uid_format_is_rejected() {
    let compiled = compiled_schema();
    let result = parse_bmf_extract(SAMPLE).unwrap();

    let mut invalid = serde_json::to_value(&result.records[0]).unwrap();
    invalid["uid_nr"] = json!("DE123456789");

    assert!(!compiled.is_valid(&invalid), "UID regex should fail");
}

#[test]
fn unknown_property_is_rejected() {
    let compiled = compiled_schema();
    let result = parse_bmf_extract(SAMPLE).unwrap();

    let mut extended = serde_json::to_value(&result.records[0]).unwrap();
    extended["steuernummer"] = json!("12-345/6789");

    assert!(!compiled.is_valid(&extended), "additionalProperties is false");
}

#[test]
fn null_optionals_are_accepted() {
    let compiled = compiled_schema();

    let instance = json!({
        "name": "Test Handel GmbH",
        "anschrift": "1010 Wien, Teststraße 1",
        "veroeffentlichung": "2026-01-15",
        "rechtskraeftig": "2026-01-10",
        "seit": null,
        "geburtsdatum": null,
        "firmenbuch_nr": null,
        "uid_nr": null,
        "kennziffer_ur": null
    });

    assert!(compiled.is_valid(&instance));
}
