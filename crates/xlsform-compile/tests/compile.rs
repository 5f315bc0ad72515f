//! End-to-end workbook compilation scenarios.
//!
//! Each test builds a small in-memory workbook, compiles it, and inspects
//! either the serialized survey tree or the error/warning output.

use serde_json::Value;
use xlsform_compile::{CompileOptions, compile};
use xlsform_model::{Diagnostics, RawRow, Workbook};

fn row(cells: &[(&str, &str)]) -> RawRow {
    cells
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn compile_ok(sheets: Vec<(&str, Vec<RawRow>)>) -> (Value, Diagnostics) {
    let workbook = Workbook::from_sheets(sheets);
    let mut diagnostics = Diagnostics::new();
    let survey = compile(&workbook, &CompileOptions::default(), &mut diagnostics)
        .expect("compilation should succeed");
    let value = serde_json::to_value(&survey).expect("survey serializes");
    (value, diagnostics)
}

fn compile_err(sheets: Vec<(&str, Vec<RawRow>)>) -> String {
    let workbook = Workbook::from_sheets(sheets);
    let mut diagnostics = Diagnostics::new();
    compile(&workbook, &CompileOptions::default(), &mut diagnostics)
        .expect_err("compilation should fail")
        .to_string()
}

#[test]
fn minimal_survey_compiles_with_defaults() {
    let (value, diagnostics) = compile_ok(vec![(
        "survey",
        vec![row(&[("type", "text"), ("name", "age"), ("label", "Age")])],
    )]);

    assert_eq!(value["type"], "survey");
    assert_eq!(value["name"], "data");
    assert_eq!(value["id_string"], "data");
    assert_eq!(value["title"], "data");
    assert_eq!(value["sms_keyword"], "data");
    assert_eq!(value["default_language"], "default");

    let children = value["children"].as_array().expect("children");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["type"], "text");
    assert_eq!(children[0]["name"], "age");
    assert_eq!(children[0]["label"], "Age");
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.warnings());
}

#[test]
fn meta_block_carries_instance_id() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![row(&[("type", "text"), ("name", "age"), ("label", "Age")])],
    )]);

    let meta = &value["children"][1];
    assert_eq!(meta["type"], "group");
    assert_eq!(meta["name"], "meta");
    assert_eq!(meta["control"]["bodyless"], true);

    let instance_id = &meta["children"][0];
    assert_eq!(instance_id["type"], "calculate");
    assert_eq!(instance_id["name"], "instanceID");
    assert_eq!(instance_id["bind"]["readonly"], "true()");
    assert_eq!(instance_id["bind"]["jr:preload"], "uid");
}

#[test]
fn settings_sheet_overrides_defaults() {
    let (value, _) = compile_ok(vec![
        (
            "survey",
            vec![row(&[("type", "text"), ("name", "age"), ("label", "Age")])],
        ),
        (
            "settings",
            vec![row(&[
                ("form_title", "Household Survey"),
                ("form_id", "household"),
                ("default_language", "English"),
            ])],
        ),
    ]);

    assert_eq!(value["title"], "Household Survey");
    assert_eq!(value["id_string"], "household");
    assert_eq!(value["default_language"], "English");
}

#[test]
fn in_sheet_settings_rows_write_settings() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![
            row(&[("type", "text"), ("name", "age"), ("label", "Age")]),
            row(&[("type", "form_title"), ("name", "Inline Title")]),
        ],
    )]);

    assert_eq!(value["title"], "Inline Title");
    // Settings rows never become nodes.
    assert_eq!(value["children"].as_array().expect("children").len(), 2);
}

#[test]
fn groups_nest_their_children() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![
            row(&[("type", "begin group"), ("name", "g1"), ("label", "G")]),
            row(&[("type", "text"), ("name", "a"), ("label", "A")]),
            row(&[("type", "end group")]),
            row(&[("type", "text"), ("name", "b"), ("label", "B")]),
        ],
    )]);

    let children = value["children"].as_array().expect("children");
    assert_eq!(children.len(), 3);
    assert_eq!(children[0]["type"], "group");
    assert_eq!(children[0]["name"], "g1");
    assert_eq!(children[0]["children"][0]["name"], "a");
    assert_eq!(children[1]["name"], "b");
    assert_eq!(children[2]["name"], "meta");
}

#[test]
fn unmatched_begin_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![
            row(&[("type", "begin group"), ("name", "g1"), ("label", "G")]),
            row(&[("type", "text"), ("name", "a"), ("label", "A")]),
        ],
    )]);
    assert_eq!(message, "[row : 2] Unmatched begin statement: group (g1)");
}

#[test]
fn unmatched_end_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![
            row(&[("type", "text"), ("name", "a"), ("label", "A")]),
            row(&[("type", "end group")]),
        ],
    )]);
    assert_eq!(
        message,
        "[row : 3] Unmatched end statement. Previous control type: None, \
         Control type: group, Control name: None"
    );
}

#[test]
fn mismatched_end_names_both_controls() {
    let message = compile_err(vec![(
        "survey",
        vec![
            row(&[("type", "begin repeat"), ("name", "r1"), ("label", "R")]),
            row(&[("type", "end group"), ("name", "r1")]),
        ],
    )]);
    assert_eq!(
        message,
        "[row : 3] Unmatched end statement. Previous control type: repeat, \
         Control type: group, Control name: r1"
    );
}

#[test]
fn missing_survey_sheet_is_fatal() {
    let message = compile_err(vec![("choices", vec![])]);
    assert_eq!(message, "You must have a sheet named 'survey'.");
}

#[test]
fn misspelled_survey_sheet_is_suggested() {
    let message = compile_err(vec![(
        "surveyy",
        vec![row(&[("type", "text"), ("name", "a"), ("label", "A")])],
    )]);
    assert!(message.starts_with("You must have a sheet named 'survey'."), "{message}");
    assert!(message.contains("'surveyy'"), "{message}");
}

#[test]
fn empty_survey_sheet_is_fatal() {
    let message = compile_err(vec![("survey", vec![])]);
    assert_eq!(
        message,
        "The survey sheet is either empty or missing important column headers."
    );
}

#[test]
fn misspelled_settings_sheet_warns() {
    let (_, diagnostics) = compile_ok(vec![
        (
            "survey",
            vec![row(&[("type", "text"), ("name", "a"), ("label", "A")])],
        ),
        ("stetings", vec![row(&[("form_title", "X")])]),
    ]);
    let warning = &diagnostics.warnings()[0];
    assert!(warning.contains("'stetings'"), "{warning}");
    assert!(warning.contains("'settings'"), "{warning}");
}

#[test]
fn question_with_no_type_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![
            row(&[("type", "text"), ("name", "a"), ("label", "A")]),
            row(&[("name", "b"), ("label", "B")]),
        ],
    )]);
    assert_eq!(message, "[row : 3] Question with no type.");
}

#[test]
fn row_with_neither_type_nor_name_nor_label_is_skipped() {
    let (value, diagnostics) = compile_ok(vec![(
        "survey",
        vec![
            row(&[("type", "text"), ("name", "a"), ("label", "A")]),
            row(&[("notes", "reviewer comment")]),
        ],
    )]);
    assert_eq!(value["children"].as_array().expect("children").len(), 2);
    assert!(diagnostics.warnings()[0].contains("skipped"));
    assert!(diagnostics.warnings()[0].starts_with("[row : 3]"));
}

#[test]
fn note_without_name_gets_a_generated_name() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![row(&[("type", "note"), ("label", "Read this aloud")])],
    )]);
    assert_eq!(value["children"][0]["name"], "generated_note_name_2");
}

#[test]
fn invalid_question_name_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![row(&[("type", "text"), ("name", "bad name"), ("label", "B")])],
    )]);
    assert!(message.starts_with("[row : 2] Invalid question name 'bad name'."), "{message}");
}

#[test]
fn disabled_rows_warn_and_are_dropped() {
    let (value, diagnostics) = compile_ok(vec![(
        "survey",
        vec![
            row(&[
                ("type", "text"),
                ("name", "a"),
                ("label", "A"),
                ("disabled", "yes"),
            ]),
            row(&[("type", "text"), ("name", "b"), ("label", "B")]),
        ],
    )]);
    let children = value["children"].as_array().expect("children");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["name"], "b");
    assert!(diagnostics.warnings()[0].contains("disabled"));
}

#[test]
fn calculate_without_calculation_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![row(&[("type", "calculate"), ("name", "c")])],
    )]);
    assert_eq!(message, "[row : 2] Missing calculation.");
}

#[test]
fn calculation_lands_in_bind() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![row(&[
            ("type", "calculate"),
            ("name", "c"),
            ("calculation", "1 + 1"),
        ])],
    )]);
    assert_eq!(value["children"][0]["bind"]["calculate"], "1 + 1");
}

#[test]
fn select_attaches_and_publishes_choices() {
    let (value, _) = compile_ok(vec![
        (
            "survey",
            vec![row(&[
                ("type", "select_one pets"),
                ("name", "pet"),
                ("label", "Pet"),
            ])],
        ),
        (
            "choices",
            vec![
                row(&[("list_name", "pets"), ("name", "cat"), ("label", "Cat")]),
                row(&[("list_name", "pets"), ("name", "dog"), ("label", "Dog")]),
            ],
        ),
    ]);

    let question = &value["children"][0];
    assert_eq!(question["type"], "select one");
    assert_eq!(question["itemset"], "pets");
    assert_eq!(question["choices"][0]["name"], "cat");
    assert_eq!(question["choices"][1]["name"], "dog");
    // The list is also published at the root for downstream lookup.
    assert_eq!(value["choices"]["pets"][0]["name"], "cat");
}

#[test]
fn select_with_unknown_list_is_fatal() {
    let message = compile_err(vec![
        (
            "survey",
            vec![row(&[
                ("type", "select_one pets"),
                ("name", "pet"),
                ("label", "Pet"),
            ])],
        ),
        (
            "choices",
            vec![row(&[("list_name", "colors"), ("name", "red"), ("label", "Red")])],
        ),
    ]);
    assert_eq!(message, "[row : 2] List name not in choices sheet: pets");
}

#[test]
fn select_without_a_choices_sheet_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![row(&[
            ("type", "select_one pets"),
            ("name", "pet"),
            ("label", "Pet"),
        ])],
    )]);
    assert!(
        message.starts_with("There should be a choices sheet in this xlsform."),
        "{message}"
    );
    assert!(message.contains("'list_name', 'name', and 'label'"), "{message}");
}

#[test]
fn or_other_extends_the_select_kind() {
    let (value, _) = compile_ok(vec![
        (
            "survey",
            vec![row(&[
                ("type", "select_one pets or_other"),
                ("name", "pet"),
                ("label", "Pet"),
            ])],
        ),
        (
            "choices",
            vec![row(&[("list_name", "pets"), ("name", "cat"), ("label", "Cat")])],
        ),
    ]);
    assert_eq!(value["children"][0]["type"], "select one or specify other");
}

#[test]
fn duplicate_choice_names_are_gated_by_setting() {
    let survey = vec![row(&[
        ("type", "select_one pets"),
        ("name", "pet"),
        ("label", "Pet"),
    ])];
    let choices = vec![
        row(&[("list_name", "pets"), ("name", "cat"), ("label", "Cat")]),
        row(&[("list_name", "pets"), ("name", "cat"), ("label", "Also Cat")]),
    ];

    let message = compile_err(vec![
        ("survey", survey.clone()),
        ("choices", choices.clone()),
    ]);
    assert!(message.contains("duplicates: 'cat'"), "{message}");

    let (value, _) = compile_ok(vec![
        ("survey", survey),
        ("choices", choices),
        (
            "settings",
            vec![row(&[("allow_choice_duplicates", "Yes")])],
        ),
    ]);
    assert_eq!(value["children"][0]["choices"].as_array().expect("choices").len(), 2);
}

#[test]
fn select_multiple_rejects_spaced_choice_names() {
    let message = compile_err(vec![
        (
            "survey",
            vec![row(&[
                ("type", "select_multiple pets"),
                ("name", "pet"),
                ("label", "Pet"),
            ])],
        ),
        (
            "choices",
            vec![row(&[
                ("list_name", "pets"),
                ("name", "big cat"),
                ("label", "Big Cat"),
            ])],
        ),
    ]);
    assert_eq!(
        message,
        "Choice names with spaces cannot be added to multiple choice selects. \
         See [big cat] in [pets]"
    );
}

#[test]
fn from_file_selects_skip_the_choices_sheet() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![row(&[
            ("type", "select_one_from_file pets.csv"),
            ("name", "pet"),
            ("label", "Pet"),
        ])],
    )]);
    let question = &value["children"][0];
    assert_eq!(question["type"], "select one");
    assert_eq!(question["itemset"], "pets.csv");
    assert!(question.get("choices").is_none());
}

#[test]
fn from_file_selects_require_a_supported_extension() {
    let message = compile_err(vec![(
        "survey",
        vec![row(&[
            ("type", "select_one_from_file pets.txt"),
            ("name", "pet"),
            ("label", "Pet"),
        ])],
    )]);
    assert!(
        message.contains("should end with one of the supported file extensions"),
        "{message}"
    );
    assert!(message.contains("'.csv'"), "{message}");
}

#[test]
fn repeat_count_expression_gets_a_generated_calculate() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![
            row(&[("type", "integer"), ("name", "n"), ("label", "N")]),
            row(&[
                ("type", "begin repeat"),
                ("name", "kids"),
                ("label", "Kids"),
                ("repeat_count", "${n} + 1"),
            ]),
            row(&[("type", "text"), ("name", "kid_name"), ("label", "Name")]),
            row(&[("type", "end repeat")]),
        ],
    )]);

    let children = value["children"].as_array().expect("children");
    assert_eq!(children[0]["name"], "n");
    assert_eq!(children[1]["type"], "calculate");
    assert_eq!(children[1]["name"], "kids_count");
    assert_eq!(children[1]["bind"]["calculate"], "${n} + 1");
    assert_eq!(children[1]["bind"]["readonly"], "true()");
    assert_eq!(children[2]["name"], "kids");
    assert_eq!(children[2]["control"]["jr:count"], "${kids_count}");
}

#[test]
fn simple_repeat_count_reference_is_left_alone() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![
            row(&[("type", "integer"), ("name", "n"), ("label", "N")]),
            row(&[
                ("type", "begin repeat"),
                ("name", "kids"),
                ("label", "Kids"),
                ("repeat_count", "${n}"),
            ]),
            row(&[("type", "text"), ("name", "kid_name"), ("label", "Name")]),
            row(&[("type", "end repeat")]),
        ],
    )]);
    let children = value["children"].as_array().expect("children");
    assert_eq!(children[1]["name"], "kids");
    assert_eq!(children[1]["control"]["jr:count"], "${n}");
}

#[test]
fn table_list_rewrites_appearance_and_aligns_lists() {
    let (value, _) = compile_ok(vec![
        (
            "survey",
            vec![
                row(&[
                    ("type", "begin group"),
                    ("name", "t"),
                    ("label", "Ratings"),
                    ("appearance", "table-list"),
                ]),
                row(&[("type", "select_one yn"), ("name", "q1"), ("label", "Q1")]),
                row(&[("type", "select_one yn"), ("name", "q2"), ("label", "Q2")]),
                row(&[("type", "end group")]),
            ],
        ),
        (
            "choices",
            vec![
                row(&[("list_name", "yn"), ("name", "yes"), ("label", "Yes")]),
                row(&[("list_name", "yn"), ("name", "no"), ("label", "No")]),
            ],
        ),
    ]);

    let group = &value["children"][0];
    assert_eq!(group["control"]["appearance"], "field-list");
    let children = group["children"].as_array().expect("group children");
    // Hoisted label note, generated header select, then the questions.
    assert_eq!(children[0]["name"], "generated_table_list_label_2");
    assert_eq!(children[0]["label"], "Ratings");
    assert_eq!(children[1]["name"], "reserved_name_for_field_list_labels_3");
    assert_eq!(children[1]["control"]["appearance"], "label");
    assert_eq!(children[2]["name"], "q1");
    assert_eq!(children[2]["control"]["appearance"], "list-nolabel");
    assert_eq!(children[3]["name"], "q2");
}

#[test]
fn table_list_with_mismatched_lists_is_fatal() {
    let message = compile_err(vec![
        (
            "survey",
            vec![
                row(&[
                    ("type", "begin group"),
                    ("name", "t"),
                    ("label", "Ratings"),
                    ("appearance", "table-list"),
                ]),
                row(&[("type", "select_one yn"), ("name", "q1"), ("label", "Q1")]),
                row(&[("type", "select_one other"), ("name", "q2"), ("label", "Q2")]),
                row(&[("type", "end group")]),
            ],
        ),
        (
            "choices",
            vec![
                row(&[("list_name", "yn"), ("name", "yes"), ("label", "Yes")]),
                row(&[("list_name", "other"), ("name", "x"), ("label", "X")]),
            ],
        ),
    ]);
    assert!(
        message.contains("list names don't match: yn vs. other"),
        "{message}"
    );
}

#[test]
fn audit_rows_land_in_the_meta_block() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![
            row(&[("type", "text"), ("name", "a"), ("label", "A")]),
            row(&[("type", "audit")]),
        ],
    )]);
    let meta = &value["children"][1];
    assert_eq!(meta["name"], "meta");
    assert_eq!(meta["children"][0]["name"], "audit");
    assert_eq!(meta["children"][1]["name"], "instanceID");
}

#[test]
fn audit_with_a_custom_name_is_fatal() {
    let message = compile_err(vec![(
        "survey",
        vec![row(&[("type", "audit"), ("name", "my_audit")])],
    )]);
    assert!(message.contains("Audits must always be named 'audit.'"), "{message}");
}

#[test]
fn omitting_instance_id_conflicts_with_encryption() {
    let message = compile_err(vec![
        (
            "survey",
            vec![row(&[("type", "text"), ("name", "a"), ("label", "A")])],
        ),
        (
            "settings",
            vec![row(&[("omit_instanceID", "yes"), ("public_key", "KEY")])],
        ),
    ]);
    assert_eq!(message, "Cannot omit instanceID, it is required for encryption.");
}

#[test]
fn flat_setting_pushes_relevance_onto_leaves() {
    let (value, _) = compile_ok(vec![
        (
            "survey",
            vec![
                row(&[("type", "integer"), ("name", "x"), ("label", "X")]),
                row(&[
                    ("type", "begin group"),
                    ("name", "g"),
                    ("label", "G"),
                    ("relevant", "${x} > 1"),
                ]),
                row(&[("type", "text"), ("name", "a"), ("label", "A")]),
                row(&[("type", "end group")]),
            ],
        ),
        ("settings", vec![row(&[("flat", "yes")])]),
    ]);

    let group = &value["children"][1];
    assert_eq!(group["flat"], true);
    assert_eq!(group["children"][0]["bind"]["relevant"], "${x} > 1");
}

#[test]
fn image_alias_compiles_as_photo_with_advisory_warning() {
    let (value, diagnostics) = compile_ok(vec![(
        "survey",
        vec![row(&[("type", "image"), ("name", "pic"), ("label", "Pic")])],
    )]);
    assert_eq!(value["children"][0]["type"], "photo");
    assert!(
        diagnostics.warnings().iter().any(|w| w.contains("max-pixels")),
        "{:?}",
        diagnostics.warnings()
    );
}

#[test]
fn range_parameters_are_filled_and_typed() {
    let (value, _) = compile_ok(vec![(
        "survey",
        vec![row(&[
            ("type", "range"),
            ("name", "r"),
            ("label", "R"),
            ("parameters", "start=1;end=5;step=0.5"),
        ])],
    )]);
    let question = &value["children"][0];
    assert_eq!(question["parameters"]["start"], "1");
    assert_eq!(question["parameters"]["end"], "5");
    assert_eq!(question["parameters"]["step"], "0.5");
    assert_eq!(question["bind"]["type"], "decimal");
}

#[test]
fn compilation_is_deterministic() {
    let sheets = || {
        vec![
            (
                "survey",
                vec![
                    row(&[("type", "select_one pets"), ("name", "pet"), ("label", "Pet")]),
                    row(&[("type", "text"), ("name", "why"), ("label", "Why?")]),
                ],
            ),
            (
                "choices",
                vec![row(&[("list_name", "pets"), ("name", "cat"), ("label", "Cat")])],
            ),
        ]
    };
    let (first, first_diagnostics) = compile_ok(sheets());
    let (second, second_diagnostics) = compile_ok(sheets());
    assert_eq!(first, second);
    assert_eq!(first_diagnostics, second_diagnostics);
}

#[test]
fn warnings_preserve_discovery_order() {
    let (_, diagnostics) = compile_ok(vec![
        (
            "survey",
            vec![
                row(&[("type", "select_one pets"), ("name", "pet"), ("label", "Pet")]),
                row(&[("notes", "dangling comment")]),
            ],
        ),
        (
            "choices",
            vec![row(&[("list_name", "pets"), ("name", "cat")])],
        ),
        ("stetings", vec![row(&[("form_title", "X")])]),
    ]);

    let warnings = diagnostics.warnings();
    // Sheet-level, then choices-sheet, then survey-row warnings.
    assert!(warnings[0].contains("'stetings'"), "{warnings:?}");
    assert!(warnings[1].contains("no label"), "{warnings:?}");
    assert!(warnings[2].contains("skipped"), "{warnings:?}");
}
