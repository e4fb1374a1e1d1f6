use catalog_core::{Author, Entity, EntityMeta, ValidationError, UNASSIGNED_ID};

#[test]
fn author_new_is_unsaved_with_defaults() {
    let author = Author::new("Author 1", "");

    assert_eq!(author.id(), UNASSIGNED_ID);
    assert!(!author.meta.is_assigned());
    assert_eq!(author.name, "Author 1");
    assert_eq!(author.biography, "");
    assert_eq!(author.validate(), Ok(()));
}

#[test]
fn author_with_id_keeps_identity() {
    let author = Author::with_id(1, "Author 1", "bio");
    assert_eq!(author.id(), 1);
    assert_eq!(author.meta, EntityMeta::with_id(1));
}

#[test]
fn validate_accepts_short_and_long_names() {
    for length in [1, 100] {
        let author = Author::with_id(1, "a".repeat(length), "");
        assert_eq!(author.validate(), Ok(()), "length {length}");
    }
}

#[test]
fn validate_rejects_missing_name() {
    for name in ["", " \t "] {
        let err = Author::with_id(1, name, "").validate().unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "Name" });
        assert_eq!(err.to_string(), "The Name field is required.");
    }
}

#[test]
fn author_serialization_uses_flat_snake_case_fields() {
    let mut author = Author::with_id(3, "Mark Twain", "Humorist");
    author.meta.created_at = 1_724_914_964_481;
    author.meta.last_modified_at = 1_724_914_964_999;

    let json = serde_json::to_value(&author).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["name"], "Mark Twain");
    assert_eq!(json["biography"], "Humorist");
    assert_eq!(json["created_at"], 1_724_914_964_481_i64);
    assert_eq!(json["last_modified_at"], 1_724_914_964_999_i64);

    let decoded: Author = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, author);
}

#[test]
fn deserialize_defaults_missing_optional_fields() {
    let decoded: Author = serde_json::from_value(serde_json::json!({
        "name": "Dan Brown"
    }))
    .unwrap();

    assert_eq!(decoded, Author::new("Dan Brown", ""));
}

#[test]
fn deserialize_rejects_missing_name() {
    let err = serde_json::from_value::<Author>(serde_json::json!({
        "id": 1,
        "biography": "no name"
    }))
    .unwrap_err();
    assert!(
        err.to_string().contains("The Name field is required."),
        "unexpected error: {err}"
    );
}
