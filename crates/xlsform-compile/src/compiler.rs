//! The survey row compiler: one left-to-right scan over the normalized
//! survey sheet, driven by an explicit scope stack.
//!
//! Rows are classified in a fixed precedence order (disabled, empty,
//! comment, in-sheet setting, end control, begin control, select, osm,
//! kind-specific, fallback). Containers push a [`ScopeFrame`] holding the
//! arena id of the node that collects their children; `end` rows pop it.
//! The stack must return to depth 1 at end of stream.

use std::collections::BTreeMap;

use tracing::debug;

use xlsform_model::{
    CellValue, ChoiceLists, CompileError, Diagnostics, NodeId, Result, Settings, Survey,
    SurveyNode, SurveyTree, Workbook,
};
use xlsform_standards::aliases;
use xlsform_standards::constants::{
    CHOICES, DEFAULT_FORM_NAME, DEFAULT_LANGUAGE, EXTERNAL_CHOICES, EXTERNAL_INSTANCE_EXTENSIONS,
    FIELD_LIST, LIST_NOLABEL, MSG_SUPPRESS_SPELLING, OSM, SETTINGS, SURVEY, TABLE_LIST,
    XML_IDENTIFIER_ERROR_MESSAGE,
};
use xlsform_standards::kinds::{ControlKind, SelectKind};

use crate::headers::{self, NormalizedRow};
use crate::tokens::{self, TypeToken};
use crate::{choices, expression, params, questions, settings, spelling, xml_name};

/// Caller-level configuration for one compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Root node name; defaults to `data`.
    pub form_name: Option<String>,
    /// Fallback `id_string` when the settings sheet does not provide one
    /// (conventionally the workbook's file stem).
    pub fallback_form_name: Option<String>,
    /// Default language unless the settings sheet overrides it.
    pub default_language: Option<String>,
}

struct ScopeFrame {
    control_type: Option<ControlKind>,
    control_name: Option<String>,
    opened_row: u32,
    node: NodeId,
}

enum TableListState {
    /// A table-list group was opened; the first select decides the list.
    Pending,
    /// All further selects in the group must reference this list.
    Active(String),
}

/// Compile a workbook into a survey tree.
///
/// Non-fatal issues are appended to `diagnostics` in discovery order;
/// fatal conditions abort with no partial tree.
pub fn compile(
    workbook: &Workbook,
    options: &CompileOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Survey> {
    let Some(survey_rows) = workbook.sheet(SURVEY) else {
        let mut msg = format!("You must have a sheet named '{SURVEY}'.");
        if let Some(similar) = spelling::find_sheet_misspellings(SURVEY, workbook.sheet_names()) {
            msg.push(' ');
            msg.push_str(&similar);
        }
        return Err(CompileError::Message(msg));
    };
    let has_type_header = survey_rows
        .iter()
        .any(|row| row.keys().any(|header| header.to_lowercase() == "type"));
    if !has_type_header {
        return Err(CompileError::message(
            "The survey sheet is either empty or missing important column headers.",
        ));
    }

    let form_name = options.form_name.as_deref().unwrap_or(DEFAULT_FORM_NAME);
    let fallback_name = options
        .fallback_form_name
        .as_deref()
        .unwrap_or(DEFAULT_FORM_NAME);
    let use_double_colons = headers::has_double_colon(workbook);
    debug!(
        sheets = workbook.sheet_names().count(),
        use_double_colons, "compiling workbook"
    );

    if !workbook.contains(SETTINGS)
        && let Some(similar) = spelling::find_sheet_misspellings(SETTINGS, workbook.sheet_names())
    {
        diagnostics.warn(format!("{similar}{MSG_SUPPRESS_SPELLING}"));
    }
    let settings = settings::resolve(
        workbook.sheet(SETTINGS).unwrap_or_default(),
        use_double_colons,
        fallback_name,
        options.default_language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
        diagnostics,
    );
    let default_language = settings.default_language().to_string();

    let external_lists = choices::build_unchecked(
        workbook.sheet(EXTERNAL_CHOICES).unwrap_or_default(),
        use_double_colons,
        &default_language,
    );
    let allow_duplicates = settings
        .text("allow_choice_duplicates")
        .is_some_and(|value| value.eq_ignore_ascii_case("yes"));
    let choice_lists = choices::build(
        workbook.sheet(CHOICES).unwrap_or_default(),
        use_double_colons,
        &default_language,
        allow_duplicates,
        diagnostics,
    )?;
    debug!(
        choice_lists = choice_lists.len(),
        external_lists = external_lists.len(),
        "built choice lists"
    );

    // OSM sheets always use double colons; single colons are part of the
    // tag vocabulary there.
    let osm_lists =
        choices::build_unchecked(workbook.sheet(OSM).unwrap_or_default(), true, &default_language);

    let clean_enabled = aliases::yes_no(settings.text("clean_text_values").unwrap_or("true()"))
        .unwrap_or(false);
    let mut rows = headers::normalize(
        survey_rows,
        aliases::survey_header,
        use_double_colons,
        &default_language,
        clean_enabled,
    );
    dealias_types(&mut rows);

    let mut survey_settings: BTreeMap<String, CellValue> = settings.clone().into_values();
    let mut published_choices = ChoiceLists::new();
    let mut survey_meta: Vec<SurveyNode> = Vec::new();
    let mut tree = SurveyTree::new(SurveyNode::new(SURVEY, form_name));
    let mut stack: Vec<ScopeFrame> = vec![ScopeFrame {
        control_type: None,
        control_name: None,
        opened_row: 1,
        node: tree.root_id(),
    }];
    let mut table_list: Option<TableListState> = None;

    // Row 1 is the column header row, so data rows start at 2.
    let mut row_number: u32 = 1;
    for row in rows {
        row_number += 1;
        let mut row = row;

        if let Some(disabled) = row.remove("disabled") {
            diagnostics.warn(format!(
                "[row : {row_number}] The 'disabled' column header is not part of the \
                 current spec. We recommend using relevant instead."
            ));
            let truthy = disabled
                .as_text()
                .and_then(aliases::yes_no)
                .unwrap_or(false);
            if truthy {
                continue;
            }
        }
        if row.is_empty() {
            continue;
        }

        let Some(question_type) = row_text(&row, "type").map(str::to_string) else {
            if !row.contains_key("name") && !row.contains_key("label") {
                diagnostics.warn(format!(
                    "[row : {row_number}] Row without name, text, or label is being \
                     skipped:\n{row:?}"
                ));
                continue;
            }
            return Err(CompileError::row(row_number, "Question with no type."));
        };

        let raw_parameters = row_text(&row, "parameters").unwrap_or("").to_string();
        let parameters = params::parse(&raw_parameters)?;

        // Audit rows live in the meta block, not the body, and their name
        // is fixed by the client spec.
        if question_type == "audit" {
            if let Some(name) = row_text(&row, "name")
                && !name.is_empty()
                && name != "audit"
            {
                return Err(CompileError::row(
                    row_number,
                    "Audits must always be named 'audit.' The name column should be \
                     left blank.",
                ));
            }
            row.insert("name".to_string(), CellValue::text("audit"));
            let mut node = node_from_row(row);
            node.parameters = parameters.clone();
            questions::apply_audit(&mut node, &parameters)?;
            survey_meta.push(node);
            continue;
        }

        if question_type == "calculate" {
            let has_calculation = nested_text(&row, "bind", "calculate").is_some();
            let dynamic_default = row_text(&row, "default")
                .is_some_and(|default| expression::default_is_dynamic(default, &question_type));
            if !has_calculation && !dynamic_default {
                return Err(CompileError::row(row_number, "Missing calculation."));
            }
        }

        if aliases::is_deprecated_device_id(&question_type) {
            diagnostics.warn(format!(
                "[row : {row_number}] {question_type} is no longer supported on most \
                 devices. Only old versions of Collect on Android versions older \
                 than 11 still support it."
            ));
        }

        // Legacy in-sheet settings declarations: the name cell is the value.
        if let Some(target) = aliases::settings_header(&question_type) {
            let value = row_text(&row, "name").unwrap_or("").to_string();
            survey_settings.insert(target.to_string(), CellValue::Text(value));
            continue;
        }

        let token = tokens::classify(&question_type);

        if let TypeToken::End { kind } = &token {
            let kind = *kind;
            let frame = stack.last().ok_or_else(|| {
                CompileError::row(row_number, "Unmatched end statement.")
            })?;
            if frame.control_type != Some(kind) || stack.len() == 1 {
                let previous = frame
                    .control_type
                    .map_or("None", ControlKind::as_str);
                let name = row_text(&row, "name").unwrap_or("None");
                return Err(CompileError::row(
                    row_number,
                    format!(
                        "Unmatched end statement. Previous control type: {previous}, \
                         Control type: {kind}, Control name: {name}"
                    ),
                ));
            }
            stack.pop();
            table_list = None;
            continue;
        }

        if !row.contains_key("name") {
            if question_type == "note" {
                row.insert(
                    "name".to_string(),
                    CellValue::Text(format!("generated_note_name_{row_number}")),
                );
            } else {
                return Err(CompileError::row(
                    row_number,
                    "Question or group with no name.",
                ));
            }
        }
        let question_name = row_text(&row, "name").unwrap_or("").to_string();
        if !xml_name::is_valid_xml_tag(&question_name) {
            return Err(CompileError::row(
                row_number,
                format!(
                    "Invalid question name '{question_name}'. \
                     Names {XML_IDENTIFIER_ERROR_MESSAGE}"
                ),
            ));
        }

        let parent = stack.last().map(|frame| frame.node).unwrap_or(tree.root_id());

        match token {
            TypeToken::Begin { kind, list_name } => {
                check_container_label(
                    &row,
                    kind,
                    &question_type,
                    &question_name,
                    row_number,
                    diagnostics,
                );

                let mut node = node_from_row(row);
                node.kind = kind.as_str().to_string();
                if !parameters.is_empty() {
                    node.parameters = parameters.clone();
                }

                if kind == ControlKind::Loop {
                    let Some(list_name) = &list_name else {
                        return Err(CompileError::row(
                            row_number,
                            "Repeat loop without list name.",
                        ));
                    };
                    let Some(columns) = choice_lists.get(list_name) else {
                        return Err(CompileError::row(
                            row_number,
                            format!("List name not in columns sheet: {list_name}"),
                        ));
                    };
                    node.columns = columns.clone();
                }

                // A non-trivial jr:count expression gets its own read-only
                // calculate sibling, so the repeat references a single
                // source of truth.
                if let Some(expr) = node
                    .control
                    .get("jr:count")
                    .and_then(CellValue::as_text)
                    .map(str::to_string)
                    && !expression::is_single_reference(&expr)
                {
                    let generated_name = format!("{}_count", node.name);
                    let mut count_node = SurveyNode::new("calculate", generated_name.clone());
                    count_node
                        .bind
                        .insert("readonly".to_string(), CellValue::text("true()"));
                    count_node
                        .bind
                        .insert("calculate".to_string(), CellValue::Text(expr));
                    tree.append_child(parent, count_node);
                    node.control.insert(
                        "jr:count".to_string(),
                        CellValue::Text(format!("${{{generated_name}}}")),
                    );
                }

                let mut generated_label: Option<SurveyNode> = None;
                if let Some(appearance) = node
                    .control
                    .get("appearance")
                    .and_then(CellValue::as_text)
                    .map(str::to_string)
                {
                    let mods: Vec<&str> = appearance.split_whitespace().collect();
                    if mods.contains(&TABLE_LIST) {
                        table_list = Some(TableListState::Pending);
                        let mut rewritten = FIELD_LIST.to_string();
                        for modifier in &mods {
                            if *modifier != TABLE_LIST {
                                rewritten.push(' ');
                                rewritten.push_str(modifier);
                            }
                        }
                        node.control
                            .insert("appearance".to_string(), CellValue::Text(rewritten));

                        // Hoist the group's own label/hint into a leading
                        // note so the table header renders once.
                        if node.label.is_some() || node.hint.is_some() {
                            let mut label_node = SurveyNode::new(
                                "note",
                                format!("generated_table_list_label_{row_number}"),
                            );
                            label_node.label = node.label.take();
                            label_node.hint = node.hint.take();
                            generated_label = Some(label_node);
                        }
                    }
                }
                if let Some(intent) = node.extra.get("intent").cloned() {
                    node.control.insert("intent".to_string(), intent);
                }

                let node_id = tree.append_child(parent, node);
                if let Some(label_node) = generated_label {
                    tree.append_child(node_id, label_node);
                }
                stack.push(ScopeFrame {
                    control_type: Some(kind),
                    control_name: Some(question_name),
                    opened_row: row_number,
                    node: node_id,
                });
            }

            TypeToken::Select {
                alias,
                command,
                list_name,
                or_other,
            } => {
                let node = compile_select(SelectContext {
                    row,
                    row_number,
                    alias,
                    command,
                    list_name,
                    or_other,
                    parameters: &parameters,
                    choice_lists: &choice_lists,
                    external_lists: &external_lists,
                    workbook,
                    published_choices: &mut published_choices,
                    table_list: &mut table_list,
                    tree: &mut tree,
                    parent,
                    diagnostics,
                })?;
                tree.append_child(parent, node);
            }

            TypeToken::Osm { list_name } => {
                let mut node = node_from_row(row);
                node.kind = OSM.to_string();
                if !parameters.is_empty() {
                    node.parameters = parameters.clone();
                }
                if let Some(tags) = osm_lists.get(&list_name) {
                    let mut tags = tags.clone();
                    for tag in &mut tags {
                        if let Some(nested) = osm_lists.get(&tag.name) {
                            tag.choices = nested.clone();
                        }
                    }
                    node.tags = tags;
                }
                tree.append_child(parent, node);
            }

            // End rows were consumed above; the stack pop never reaches here.
            TypeToken::End { .. } => {}

            TypeToken::Other => {
                if question_type == "background-geopoint"
                    && row_text(&row, "trigger").is_none_or(str::is_empty)
                {
                    return Err(CompileError::message(format!(
                        "background-geopoint question '{question_name}' must have a \
                         non-null trigger."
                    )));
                }

                let mut node = node_from_row(row);
                if !parameters.is_empty() {
                    node.parameters = parameters.clone();
                }
                match question_type.as_str() {
                    "range" => questions::apply_range(&mut node, &parameters)?,
                    "text" => questions::apply_text(&mut node, &parameters, row_number)?,
                    "photo" => {
                        questions::apply_photo(&mut node, &parameters, row_number, diagnostics)?;
                    }
                    "audio" => questions::apply_audio(&mut node, &parameters)?,
                    "background-audio" => {
                        questions::apply_background_audio(&mut node, &parameters)?;
                    }
                    "geopoint" | "geoshape" | "geotrace" => {
                        questions::apply_geo(&mut node, &question_type, &parameters)?;
                    }
                    _ => {}
                }
                tree.append_child(parent, node);
            }
        }
    }

    if stack.len() != 1
        && let Some(frame) = stack.last()
    {
        let kind = frame.control_type.map_or("None", ControlKind::as_str);
        let name = frame.control_name.as_deref().unwrap_or("None");
        return Err(CompileError::row(
            frame.opened_row,
            format!("Unmatched begin statement: {kind} ({name})"),
        ));
    }

    if settings
        .text("flat")
        .and_then(aliases::yes_no)
        .unwrap_or(false)
    {
        let root_id = tree.root_id();
        annotate_flat(&mut tree, root_id, "");
    }

    append_meta(&mut tree, &settings, survey_meta)?;

    debug!(
        nodes = tree.len(),
        warnings = diagnostics.len(),
        "compiled survey"
    );
    Ok(Survey {
        tree,
        settings: survey_settings,
        choices: published_choices,
    })
}

struct SelectContext<'a> {
    row: NormalizedRow,
    row_number: u32,
    alias: aliases::SelectAlias,
    command: String,
    list_name: String,
    or_other: bool,
    parameters: &'a params::Parameters,
    choice_lists: &'a ChoiceLists,
    external_lists: &'a ChoiceLists,
    workbook: &'a Workbook,
    published_choices: &'a mut ChoiceLists,
    table_list: &'a mut Option<TableListState>,
    tree: &'a mut SurveyTree,
    parent: NodeId,
    diagnostics: &'a mut Diagnostics,
}

fn compile_select(ctx: SelectContext<'_>) -> Result<SurveyNode> {
    let SelectContext {
        row,
        row_number,
        alias,
        command,
        list_name,
        or_other,
        parameters,
        choice_lists,
        external_lists,
        workbook,
        published_choices,
        table_list,
        tree,
        parent,
        diagnostics,
    } = ctx;
    let kind = alias.kind;
    let has_choice_filter = row.contains_key("choice_filter");

    if kind == SelectKind::OneExternal && !has_choice_filter {
        diagnostics.warn(format!(
            "[row : {row_number}] select one external is only meant for filtered selects."
        ));
    }

    let extension = expression::file_extension(&list_name).to_string();
    if kind == SelectKind::OneExternal && !external_lists.contains_key(&list_name) {
        if external_lists.is_empty() {
            let mut msg =
                format!("There should be an {EXTERNAL_CHOICES} sheet in this xlsform.");
            if let Some(similar) =
                spelling::find_sheet_misspellings(EXTERNAL_CHOICES, workbook.sheet_names())
            {
                msg.push(' ');
                msg.push_str(&similar);
            }
            msg.push_str(
                " Please ensure that the external_choices sheet has columns \
                 'list name', and 'name'.",
            );
            return Err(CompileError::Message(msg));
        }
        return Err(CompileError::row(
            row_number,
            format!("List name not in external choices sheet: {list_name}"),
        ));
    }

    if alias.from_file
        && (expression::suffix_count(&list_name) != 1
            || !EXTERNAL_INSTANCE_EXTENSIONS.contains(&extension.as_str()))
    {
        let extensions: Vec<String> = EXTERNAL_INSTANCE_EXTENSIONS
            .iter()
            .map(|ext| format!("'{ext}'"))
            .collect();
        return Err(CompileError::row(
            row_number,
            format!(
                "File name for '{command} {list_name}' should end with one of the \
                 supported file extensions: {}",
                extensions.join(", ")
            ),
        ));
    }

    let is_external_instance = EXTERNAL_INSTANCE_EXTENSIONS.contains(&extension.as_str());
    let is_reference = expression::contains_reference(&list_name);
    if !choice_lists.contains_key(&list_name)
        && kind != SelectKind::OneExternal
        && !is_external_instance
        && !is_reference
    {
        if choice_lists.is_empty() {
            let mut msg = format!("There should be a {CHOICES} sheet in this xlsform.");
            if let Some(similar) =
                spelling::find_sheet_misspellings(CHOICES, workbook.sheet_names())
            {
                msg.push(' ');
                msg.push_str(&similar);
            }
            msg.push_str(
                " Please ensure that the choices sheet has the mandatory columns \
                 'list_name', 'name', and 'label'.",
            );
            return Err(CompileError::Message(msg));
        }
        return Err(CompileError::row(
            row_number,
            format!("List name not in choices sheet: {list_name}"),
        ));
    }

    // Spaces in select_multiple values break downstream exports.
    if kind == SelectKind::Multiple
        && !is_external_instance
        && let Some(list) = choice_lists.get(&list_name)
    {
        for choice in list {
            if choice.name.contains(' ') {
                return Err(CompileError::message(format!(
                    "Choice names with spaces cannot be added to multiple choice \
                     selects. See [{}] in [{list_name}]",
                    choice.name
                )));
            }
        }
    }

    let mut node_kind = kind.as_str().to_string();
    if or_other {
        if has_choice_filter {
            return Err(CompileError::row(
                row_number,
                "Choice filter not supported with or_other.",
            ));
        }
        node_kind.push_str(" or specify other");
    }

    let mut allowed: Vec<&str> = vec!["randomize", "seed"];
    if alias.from_file {
        allowed.extend(["value", "label"]);
    }
    params::validate(parameters, &allowed)?;

    if let Some(randomize) = parameters.get("randomize") {
        if randomize != "true" && randomize != "false" {
            return Err(CompileError::Parameter(format!(
                "randomize must be set to true or false: '{randomize}' is an \
                 invalid value"
            )));
        }
        if let Some(seed) = parameters.get("seed")
            && !seed.starts_with("${")
            && seed.parse::<f64>().is_err()
        {
            return Err(CompileError::Parameter(
                "seed value must be a number or a reference to another field.".to_string(),
            ));
        }
    } else if parameters.contains_key("seed") {
        return Err(CompileError::Parameter(
            "Parameters must include randomize=true to use a seed.".to_string(),
        ));
    }
    for key in ["value", "label"] {
        if let Some(value) = parameters.get(key)
            && !xml_name::is_valid_xml_tag(value)
        {
            return Err(CompileError::row(
                row_number,
                format!(
                    "Invalid parameters ({key}) value '{value}'. \
                     Values {XML_IDENTIFIER_ERROR_MESSAGE}"
                ),
            ));
        }
    }

    let choice_filter = row
        .get("choice_filter")
        .and_then(CellValue::as_text)
        .unwrap_or("")
        .to_string();
    let mut node = node_from_row(row);
    node.kind = node_kind.clone();
    node.parameters = parameters.clone();
    node.itemset = Some(list_name.clone());

    if !choice_filter.is_empty() {
        if kind == SelectKind::OneExternal {
            node.query = Some(list_name.clone());
        } else if let Some(list) = choice_lists.get(&list_name) {
            node.list_name = Some(list_name.clone());
            node.choices = list.clone();
        }
    } else {
        let randomized = parameters.get("randomize").is_some_and(|value| value == "true");
        if !(randomized || is_external_instance || is_reference)
            && let Some(list) = choice_lists.get(&list_name)
        {
            node.list_name = Some(list_name.clone());
            node.choices = list.clone();
        }
    }

    // Publish in-sheet lists used as itemsets at the root for downstream
    // export tools.
    if let Some(list) = choice_lists.get(&list_name) {
        published_choices.insert(list_name.clone(), list.clone());
    }

    if table_list.is_some() {
        if matches!(*table_list, Some(TableListState::Pending)) {
            // First select in the table decides the shared list and gets a
            // label-only header row.
            if has_choice_filter {
                return Err(CompileError::row(
                    row_number,
                    "Choice filter not supported for table-list appearance.",
                ));
            }
            let mut header = SurveyNode::new(
                node_kind.clone(),
                format!("reserved_name_for_field_list_labels_{row_number}"),
            );
            header
                .control
                .insert("appearance".to_string(), CellValue::text("label"));
            header.choices = choice_lists.get(&list_name).cloned().unwrap_or_default();
            header.itemset = Some(list_name.clone());
            tree.append_child(parent, header);
            *table_list = Some(TableListState::Active(list_name.clone()));
        }
        if let Some(TableListState::Active(active)) = table_list.as_ref()
            && *active != list_name
        {
            return Err(CompileError::row(
                row_number,
                format!(
                    "Badly formatted table list, list names don't match: \
                     {active} vs. {list_name}"
                ),
            ));
        }
        node.control
            .insert("appearance".to_string(), CellValue::text(LIST_NOLABEL));
    }

    Ok(node)
}

fn check_container_label(
    row: &NormalizedRow,
    kind: ControlKind,
    question_type: &str,
    question_name: &str,
    row_number: u32,
    diagnostics: &mut Diagnostics,
) {
    let dynamic_default = row_text(row, "default")
        .is_some_and(|default| expression::default_is_dynamic(default, question_type));
    let field_list_group = kind == ControlKind::Group
        && nested_text(row, "control", "appearance") == Some(FIELD_LIST);
    if !row.contains_key("label")
        && !row.contains_key("media")
        && !aliases::is_label_optional(question_type)
        && nested_text(row, "bind", "calculate").is_none()
        && !dynamic_default
        && !field_list_group
    {
        diagnostics.warn(format!(
            "[row : {row_number}] {} has no label: {{name: '{question_name}', \
             type: '{question_type}'}}",
            kind.title()
        ));
    }
}

fn dealias_types(rows: &mut [NormalizedRow]) {
    for row in rows {
        if let Some(canonical) = row_text(row, "type").and_then(aliases::question_type) {
            row.insert("type".to_string(), CellValue::text(canonical));
        }
    }
}

/// AND each container's relevance into its leaf descendants and mark the
/// containers flat, for flattened table exports.
fn annotate_flat(tree: &mut SurveyTree, id: NodeId, parent_relevant: &str) {
    let child_ids: Vec<NodeId> = tree.children_of(id).to_vec();
    for child in child_ids {
        let (own_relevant, is_container) = {
            let node = tree.node(child);
            let own = node
                .bind
                .get("relevant")
                .and_then(CellValue::as_text)
                .unwrap_or("")
                .to_string();
            (own, !node.children.is_empty())
        };
        let combined = if parent_relevant.is_empty() {
            own_relevant
        } else if own_relevant.is_empty() {
            parent_relevant.to_string()
        } else {
            format!("{parent_relevant} and ({own_relevant})")
        };
        if is_container {
            tree.node_mut(child).flat = true;
            annotate_flat(tree, child, &combined);
        } else if !combined.is_empty() {
            tree.node_mut(child)
                .bind
                .insert("relevant".to_string(), CellValue::Text(combined));
        }
    }
}

/// Assemble the hidden meta group: collected audit rows, the automatic
/// instanceID calculate, and an instanceName calculate when configured.
fn append_meta(tree: &mut SurveyTree, settings: &Settings, audits: Vec<SurveyNode>) -> Result<()> {
    let mut meta_children = audits;

    let omit_instance_id = settings
        .text("omit_instanceid")
        .and_then(aliases::yes_no)
        .unwrap_or(false);
    if omit_instance_id {
        if settings.text("public_key").is_some_and(|key| !key.is_empty()) {
            return Err(CompileError::message(
                "Cannot omit instanceID, it is required for encryption.",
            ));
        }
    } else {
        let mut node = SurveyNode::new("calculate", "instanceID");
        node.bind
            .insert("readonly".to_string(), CellValue::text("true()"));
        node.bind.insert(
            "jr:preload".to_string(),
            CellValue::text(settings.text("instance_id").unwrap_or("uid")),
        );
        meta_children.push(node);
    }

    if let Some(expression) = settings.text("instance_name") {
        let mut node = SurveyNode::new("calculate", "instanceName");
        node.bind
            .insert("calculate".to_string(), CellValue::text(expression));
        meta_children.push(node);
    }

    if !meta_children.is_empty() {
        let mut meta = SurveyNode::new("group", "meta");
        meta.control
            .insert("bodyless".to_string(), CellValue::Bool(true));
        let meta_id = tree.append_child(tree.root_id(), meta);
        for child in meta_children {
            tree.append_child(meta_id, child);
        }
    }
    Ok(())
}

fn row_text<'a>(row: &'a NormalizedRow, key: &str) -> Option<&'a str> {
    row.get(key).and_then(CellValue::as_text)
}

fn nested_text<'a>(row: &'a NormalizedRow, outer: &str, inner: &str) -> Option<&'a str> {
    row.get(outer)?.as_map()?.get(inner)?.as_text()
}

fn take_map(row: &mut NormalizedRow, key: &str) -> BTreeMap<String, CellValue> {
    if matches!(row.get(key), Some(CellValue::Map(_)))
        && let Some(CellValue::Map(map)) = row.remove(key)
    {
        return map;
    }
    BTreeMap::new()
}

fn take_text(row: &mut NormalizedRow, key: &str) -> Option<String> {
    match row.get(key) {
        Some(CellValue::Text(_)) => match row.remove(key) {
            Some(CellValue::Text(text)) => Some(text),
            _ => None,
        },
        _ => None,
    }
}

/// Move a normalized row's recognized columns into typed node fields;
/// anything unrecognized passes through in `extra`.
fn node_from_row(mut row: NormalizedRow) -> SurveyNode {
    // The raw parameters string was parsed separately; the node carries
    // the parsed map instead.
    row.remove("parameters");
    SurveyNode {
        kind: take_text(&mut row, "type").unwrap_or_default(),
        name: take_text(&mut row, "name").unwrap_or_default(),
        label: row.remove("label"),
        hint: row.remove("hint"),
        bind: take_map(&mut row, "bind"),
        control: take_map(&mut row, "control"),
        media: take_map(&mut row, "media"),
        action: take_map(&mut row, "action"),
        default: row.remove("default"),
        trigger: take_text(&mut row, "trigger"),
        choice_filter: take_text(&mut row, "choice_filter"),
        extra: row,
        ..SurveyNode::default()
    }
}
