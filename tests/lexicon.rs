use ilpinfer::error::InferenceError;
use ilpinfer::lexicon::VariableLexicon;

#[test]
fn registration_and_lookup() {
    let mut lexicon = VariableLexicon::new();
    lexicon.add_variable("arg:0:A0", 0).expect("register");
    lexicon.add_variable("arg:0:A1", 1).expect("register");

    assert_eq!(lexicon.size(), 2);
    assert_eq!(lexicon.get_variable("arg:0:A0"), Some(0));
    assert_eq!(lexicon.get_variable("arg:0:A1"), Some(1));
}

#[test]
fn duplicate_registration_fails() {
    let mut lexicon = VariableLexicon::new();
    lexicon.add_variable("sense:1", 7).expect("register");

    let err = lexicon.add_variable("sense:1", 8).expect_err("must fail");
    assert_eq!(err, InferenceError::DuplicateVariable("sense:1".to_string()));
    // the original binding is untouched
    assert_eq!(lexicon.get_variable("sense:1"), Some(7));
    assert_eq!(lexicon.size(), 1);
}

#[test]
fn unknown_identifiers_are_not_instantiated() {
    let lexicon = VariableLexicon::new();
    assert_eq!(lexicon.get_variable("never-created"), None);
    assert!(lexicon.is_empty());
}

#[test]
fn reverse_lookup_is_for_diagnostics() {
    let mut lexicon = VariableLexicon::new();
    lexicon.add_variable("a", 3).expect("register");
    lexicon.add_variable("b", 5).expect("register");

    assert_eq!(lexicon.variable_name(5), Some("b"));
    assert_eq!(lexicon.variable_name(4), None);
}
