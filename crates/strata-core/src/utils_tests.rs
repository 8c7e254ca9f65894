use crate::utils::{file_stem, friendly_identifier, is_identifier, is_reserved_file_name};

#[test]
fn friendly_keeps_last_segment() {
    assert_eq!(friendly_identifier("App.Models.Customer", 15).as_deref(), Some("customer"));
    assert_eq!(friendly_identifier("Outer+Inner", 15).as_deref(), Some("inner"));
    assert_eq!(friendly_identifier("Outer/Inner", 15).as_deref(), Some("inner"));
}

#[test]
fn friendly_drops_generic_arity() {
    assert_eq!(friendly_identifier("Dictionary`2", 15).as_deref(), Some("dictionary"));
}

#[test]
fn friendly_truncates() {
    assert_eq!(
        friendly_identifier("AVeryLongTypeNameIndeed", 15).as_deref(),
        Some("averylongtypena")
    );
    assert_eq!(friendly_identifier("Customer", 4).as_deref(), Some("cust"));
}

#[test]
fn friendly_trims_leading_digits_and_underscores() {
    assert_eq!(friendly_identifier("__9lives", 15).as_deref(), Some("lives"));
}

#[test]
fn friendly_rejects_reserved_and_empty() {
    assert_eq!(friendly_identifier("Function", 15), None);
    assert_eq!(friendly_identifier("New", 15), None);
    assert_eq!(friendly_identifier("123", 15), None);
    assert_eq!(friendly_identifier("", 15), None);
}

#[test]
fn friendly_signature_is_kept_whole() {
    assert_eq!(
        friendly_identifier("Void Run(System.String)", 30).as_deref(),
        Some("void_run_system_string")
    );
}

#[test]
fn identifier_shape() {
    assert!(is_identifier("abc"));
    assert!(is_identifier("$t"));
    assert!(is_identifier("_a1"));
    assert!(!is_identifier("1a"));
    assert!(!is_identifier("a-b"));
    assert!(!is_identifier(""));
}

#[test]
fn reserved_file_names_ignore_case() {
    assert!(is_reserved_file_name("CON"));
    assert!(is_reserved_file_name("nul"));
    assert!(!is_reserved_file_name("console"));
}

#[test]
fn file_stem_escapes_device_names() {
    assert_eq!(file_stem("System.Core"), "System.Core");
    assert_eq!(file_stem("Aux"), "_Aux");
    assert_eq!(file_stem("My Lib"), "My_Lib");
}
