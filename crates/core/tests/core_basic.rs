use pseudoview_core::actions::Action;
use pseudoview_core::services::decompiler::{DecompilerRegistry, FixtureDecompiler};
use pseudoview_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn registry_selects_decompilers_by_name() {
    let mut registry = DecompilerRegistry::new();
    registry.register(FixtureDecompiler::new());
    assert_eq!(registry.names(), vec!["fixture".to_string()]);
    assert!(registry.get("fixture").is_some());
    assert!(registry.get("missing").is_none());
}

#[test]
fn actions_serialize_in_snake_case() {
    let json = serde_json::to_string(&Action::ChangeDeclaration).expect("serialize");
    assert_eq!(json, "\"change_declaration\"");
    let back: Action = serde_json::from_str("\"move_back\"").expect("deserialize");
    assert_eq!(back, Action::MoveBack);
}
