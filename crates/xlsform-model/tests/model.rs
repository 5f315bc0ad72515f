//! Tests for the survey data model.

use std::collections::BTreeMap;

use xlsform_model::{CellValue, Choice, Survey, SurveyNode, SurveyTree, Workbook};

fn text_map(entries: &[(&str, &str)]) -> CellValue {
    CellValue::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::text(*v)))
            .collect(),
    )
}

#[test]
fn merge_scalar_into_localized_map() {
    let merged = CellValue::text("Hello").merged(text_map(&[("French", "Bonjour")]), "default");
    assert_eq!(
        merged,
        text_map(&[("default", "Hello"), ("French", "Bonjour")])
    );
}

#[test]
fn merge_scalar_dropped_when_default_present() {
    let merged = CellValue::text("Hello").merged(text_map(&[("default", "Hi")]), "default");
    assert_eq!(merged, text_map(&[("default", "Hi")]));

    let merged = text_map(&[("default", "Hi")]).merged(CellValue::text("Hello"), "default");
    assert_eq!(merged, text_map(&[("default", "Hi")]));
}

#[test]
fn merge_maps_recursively_first_wins() {
    let a = text_map(&[("en", "A")]);
    let b = text_map(&[("en", "B"), ("fr", "C")]);
    // Colliding scalars inside a map nest under the default key, first wins.
    let mut expected = BTreeMap::new();
    expected.insert("en".to_string(), text_map(&[("default", "A")]));
    expected.insert("fr".to_string(), CellValue::text("C"));
    assert_eq!(a.clone().merged(b, "default"), CellValue::Map(expected));
    assert_eq!(
        CellValue::Map(BTreeMap::new()).merged(a.clone(), "default"),
        a
    );
}

#[test]
fn workbook_lookup_is_case_insensitive() {
    let mut row = BTreeMap::new();
    row.insert("type".to_string(), "text".to_string());
    let workbook = Workbook::from_sheets([("Survey".to_string(), vec![row])]);

    assert!(workbook.contains("survey"));
    assert!(workbook.contains("SURVEY"));
    assert_eq!(workbook.sheet("survey").map(<[_]>::len), Some(1));
    let names: Vec<&str> = workbook.sheet_names().collect();
    assert_eq!(names, vec!["Survey"]);
}

#[test]
fn tree_children_keep_insertion_order() {
    let mut tree = SurveyTree::new(SurveyNode::new("survey", "data"));
    let root = tree.root_id();
    let group = tree.append_child(root, SurveyNode::new("group", "g1"));
    tree.append_child(group, SurveyNode::new("text", "q1"));
    tree.append_child(group, SurveyNode::new("text", "q2"));

    let names: Vec<&str> = tree
        .children_of(group)
        .iter()
        .map(|&id| tree.node(id).name.as_str())
        .collect();
    assert_eq!(names, vec!["q1", "q2"]);
}

#[test]
fn survey_serializes_nested_children() {
    let mut tree = SurveyTree::new(SurveyNode::new("survey", "data"));
    let root = tree.root_id();
    let mut question = SurveyNode::new("text", "q1");
    question.label = Some(CellValue::text("Q1"));
    tree.append_child(root, question);

    let mut choice = Choice::new("a");
    choice.label = Some(CellValue::text("A"));
    let mut choices = xlsform_model::ChoiceLists::new();
    choices.insert("yes_no".to_string(), vec![choice]);

    let mut settings = BTreeMap::new();
    settings.insert("id_string".to_string(), CellValue::text("form1"));
    let survey = Survey {
        tree,
        settings,
        choices,
    };

    let json = serde_json::to_value(&survey).expect("serialize survey");
    assert_eq!(json["type"], "survey");
    assert_eq!(json["name"], "data");
    assert_eq!(json["id_string"], "form1");
    assert_eq!(json["children"][0]["type"], "text");
    assert_eq!(json["children"][0]["label"], "Q1");
    assert_eq!(json["choices"]["yes_no"][0]["name"], "a");
}
