//! Parameter cell parsing and validation.

use proptest::prelude::*;
use xlsform_compile::params::{self, Parameters};

fn parsed(raw: &str) -> Parameters {
    params::parse(raw).expect("parses")
}

#[test]
fn semicolon_comma_and_space_delimiters_agree() {
    let expected = parsed("start=1;end=10;step=2");
    assert_eq!(parsed("start=1,end=10,step=2"), expected);
    assert_eq!(parsed("start=1 end=10 step=2"), expected);
    assert_eq!(expected.get("end").map(String::as_str), Some("10"));
}

#[test]
fn keys_are_lowercased_and_trimmed() {
    let parameters = parsed(" Randomize = TRUE ; Seed = 42 ");
    assert_eq!(parameters.get("randomize").map(String::as_str), Some("true"));
    assert_eq!(parameters.get("seed").map(String::as_str), Some("42"));
}

#[test]
fn label_and_value_keep_their_case() {
    let parameters = parsed("value=VehicleID;label=Vehicle_Name");
    assert_eq!(parameters.get("value").map(String::as_str), Some("VehicleID"));
    assert_eq!(parameters.get("label").map(String::as_str), Some("Vehicle_Name"));
}

#[test]
fn token_without_equals_is_rejected() {
    let message = params::parse("randomize").expect_err("malformed").to_string();
    assert_eq!(
        message,
        "Expecting parameters to be in the form of 'parameter1=value parameter2=value'."
    );
}

#[test]
fn token_with_two_equals_is_rejected() {
    assert!(params::parse("seed=4=2").is_err());
}

#[test]
fn unknown_keys_are_listed_sorted() {
    let parameters = parsed("randomize=true;zeed=1;apple=2");
    let message = params::validate(&parameters, &["randomize", "seed"])
        .expect_err("invalid keys")
        .to_string();
    assert_eq!(
        message,
        "Accepted parameters are 'randomize, seed'. The following are invalid \
         parameter(s): 'apple, zeed'."
    );
}

#[test]
fn empty_cell_parses_to_no_parameters() {
    assert!(parsed("").is_empty());
}

proptest! {
    /// Any single-token cell either parses or errors; it never panics.
    #[test]
    fn parse_never_panics(raw in ".{0,40}") {
        let _ = params::parse(&raw);
    }

    /// Well-formed parameter lists survive a format/parse cycle no matter
    /// which supported delimiter joins them.
    #[test]
    fn delimiters_are_interchangeable(
        entries in proptest::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{1,8}", 1..5),
    ) {
        let tokens: Vec<String> = entries
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        let semicolons = params::parse(&tokens.join(";")).expect("parses");
        let commas = params::parse(&tokens.join(",")).expect("parses");
        let spaces = params::parse(&tokens.join(" ")).expect("parses");
        prop_assert_eq!(&semicolons, &entries);
        prop_assert_eq!(&commas, &entries);
        prop_assert_eq!(&spaces, &entries);
    }
}
