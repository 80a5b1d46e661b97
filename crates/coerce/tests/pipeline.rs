//! End-to-end pipeline suite.
//!
//! Each case feeds a realistic model-output blob through the full
//! extract -> repair -> coerce pipeline and checks the adopted result and
//! its score. Shapes are built by hand the way an adapter layer would.

use salvage_coerce::{
    parse, parse_with_options, repair_json, CandidateError, CoerceError, Field, Flag, IntWidth,
    ParseError, ParseOptions, Shape,
};

fn user_shape() -> Shape {
    Shape::record([
        Field::new("name", Shape::string()),
        Field::new("age", Shape::int(IntWidth::W64)),
        Field::new("email", Shape::string()),
    ])
}

fn company_shape() -> Shape {
    Shape::record([
        Field::new("name", Shape::string()),
        Field::new(
            "employees",
            Shape::sequence(Shape::record([
                Field::new("name", Shape::string()),
                Field::new("email", Shape::string()),
            ])),
        ),
        Field::new("department", Shape::optional(Shape::string())).optional(),
    ])
}

fn project_shape() -> Shape {
    Shape::record([
        Field::new("title", Shape::string()),
        Field::new("status", Shape::string()),
        Field::new("tasks", Shape::sequence(Shape::string())),
        Field::new("priority", Shape::optional(Shape::int(IntWidth::W64))).optional(),
    ])
}

// -- boundary behaviors ------------------------------------------

#[test]
fn empty_input_is_no_json_found() {
    let err = parse("", &user_shape()).unwrap_err();
    assert!(matches!(err, ParseError::NoJsonFound));
}

#[test]
fn prose_without_structure_is_no_json_found() {
    let err = parse("I could not produce any structured data, sorry.", &user_shape()).unwrap_err();
    assert!(matches!(err, ParseError::NoJsonFound));
}

#[test]
fn empty_object_fills_a_record_with_zero_values() {
    let (user, score) = parse("{}", &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some(""));
    assert_eq!(user.field("age").unwrap().as_i64(), Some(0));
    assert_eq!(score.total(), 0);
}

#[test]
fn array_against_a_record_shape_is_a_type_mismatch() {
    let err = parse("[1, 2, 3]", &user_shape()).unwrap_err();
    assert!(matches!(
        err,
        ParseError::AllCandidatesFailed {
            last: CandidateError::Coerce(CoerceError::TypeMismatch { from: "array", .. })
        }
    ));
}

// -- concrete scenarios ------------------------------------------

#[test]
fn scenario_clean_json() {
    let input = r#"{"name":"John","age":30,"email":"john@example.com"}"#;
    let (user, score) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("John"));
    assert_eq!(user.field("age").unwrap().as_i64(), Some(30));
    assert_eq!(user.field("email").unwrap().as_str(), Some("john@example.com"));
    assert_eq!(score.total(), 0);
}

#[test]
fn scenario_stringly_typed_age() {
    let input = r#"{"name":"Charlie","age":"35","email":"c@x"}"#;
    let (user, score) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("Charlie"));
    assert_eq!(user.field("age").unwrap().as_i64(), Some(35));
    assert!(score.total() >= 2);
    assert_eq!(score.count(Flag::StringToInt), 2);
}

#[test]
fn scenario_fenced_json_with_prose() {
    let input = "Sure! Here is the record you asked for:\n```json\n{\"name\":\"Alice\",\"age\":25,\"email\":\"a@x\"}\n```\nLet me know if you need more.";
    let (user, score) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("Alice"));
    assert_eq!(user.field("age").unwrap().as_i64(), Some(25));
    assert_eq!(score.total(), 0);
}

#[test]
fn scenario_sloppy_object_needs_repair() {
    let input = r#"{title: "Engineer", experience: ["Go","Rust"], active: "yes"}"#;
    let shape = Shape::record([
        Field::new("title", Shape::string()),
        Field::new("experience", Shape::sequence(Shape::string())),
        Field::new("active", Shape::boolean()),
    ]);
    let (resume, score) = parse(input, &shape).unwrap();
    assert_eq!(resume.field("title").unwrap().as_str(), Some("Engineer"));
    let exp = resume.field("experience").unwrap().as_seq().unwrap();
    assert_eq!(exp.len(), 2);
    assert_eq!(exp[0].as_str(), Some("Go"));
    assert_eq!(resume.field("active").unwrap().as_bool(), Some(true));
    assert!(score.total() >= 1);
}

#[test]
fn scenario_later_candidate_wins_after_earlier_failure() {
    let input = "[1,2,3]\n\n{\"name\":\"Success Corp\",\"employees\":[]}";
    let (company, _) = parse(input, &company_shape()).unwrap();
    assert_eq!(company.field("name").unwrap().as_str(), Some("Success Corp"));
    assert_eq!(
        company.field("employees").unwrap().as_seq().unwrap().len(),
        0
    );
}

#[test]
fn scenario_null_optionals_are_no_value_without_penalty() {
    let input = r#"{"name":"T","due_date":null,"count":null}"#;
    let shape = Shape::record([
        Field::new("name", Shape::string()),
        Field::new("due_date", Shape::optional(Shape::string())).optional(),
        Field::new("count", Shape::optional(Shape::int(IntWidth::W64))).optional(),
    ]);
    let (task, score) = parse(input, &shape).unwrap();
    assert_eq!(task.field("name").unwrap().as_str(), Some("T"));
    assert!(task.field("due_date").unwrap().is_none());
    assert!(task.field("count").unwrap().is_none());
    assert_eq!(score.total(), 0);
}

// -- multiple candidates -----------------------------------------

#[test]
fn fenced_object_with_nested_arrays_parses_whole() {
    let input = "```json\n{\n  \"name\": \"Acme Corp\",\n  \"employees\": [\n    {\"name\": \"Alice\", \"email\": \"alice@acme.com\"},\n    {\"name\": \"Bob\", \"email\": \"bob@acme.com\"}\n  ],\n  \"department\": \"Engineering\"\n}\n```";
    let (company, _) = parse(input, &company_shape()).unwrap();
    assert_eq!(company.field("name").unwrap().as_str(), Some("Acme Corp"));
    let employees = company.field("employees").unwrap().as_seq().unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].field("name").unwrap().as_str(), Some("Alice"));
    assert_eq!(
        company.field("department").unwrap().as_str(),
        Some("Engineering")
    );
}

#[test]
fn preamble_and_postscript_around_bare_object() {
    let input = "Here is the company data you requested:\n\n{\n  \"name\": \"TechStart\",\n  \"employees\": [\n    {\"name\": \"Carol\", \"email\": \"carol@techstart.io\"}\n  ]\n}\n\nLet me know if you need anything else!";
    let (company, _) = parse(input, &company_shape()).unwrap();
    assert_eq!(company.field("name").unwrap().as_str(), Some("TechStart"));
}

#[test]
fn outer_candidate_beats_inner_nested_object() {
    // The nested employee object is itself a candidate, but the complete
    // outer object resolves more fields and must be adopted first.
    let input = "prose {\"name\": \"Outer\", \"employees\": [{\"name\": \"Inner\", \"email\": \"i@x\"}]} prose";
    let (company, score) = parse(input, &company_shape()).unwrap();
    assert_eq!(company.field("name").unwrap().as_str(), Some("Outer"));
    assert_eq!(score.total(), 0);
}

#[test]
fn failed_candidate_after_success_does_not_clobber_the_result() {
    // The fenced object succeeds; the nested task array also surfaces as a
    // candidate and fails against the record shape. The adopted result must
    // survive.
    let input = "```json\n{\n  \"title\": \"Important Project\",\n  \"status\": \"in_progress\",\n  \"tasks\": [\"task1\", \"task2\", \"task3\"]\n}\n```";
    let (project, _) = parse(input, &project_shape()).unwrap();
    assert_eq!(
        project.field("title").unwrap().as_str(),
        Some("Important Project")
    );
    assert_eq!(
        project.field("status").unwrap().as_str(),
        Some("in_progress")
    );
    assert_eq!(project.field("tasks").unwrap().as_seq().unwrap().len(), 3);
}

#[test]
fn empty_employee_list_round_trips() {
    let input = "```json\n{\n  \"name\": \"Empty Corp\",\n  \"employees\": []\n}\n```";
    let (company, _) = parse(input, &company_shape()).unwrap();
    assert_eq!(company.field("name").unwrap().as_str(), Some("Empty Corp"));
    assert_eq!(
        company.field("employees").unwrap().as_seq().unwrap().len(),
        0
    );
}

#[test]
fn best_scoring_candidate_wins_not_first_success() {
    // The first object coerces with penalties (stringly-typed age); the
    // later one is clean and must replace it.
    let input = "{\"name\": \"First\", \"age\": \"40\", \"email\": \"f@x\"}\n\n{\"name\": \"Second\", \"age\": 41, \"email\": \"s@x\"}";
    let (user, score) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("Second"));
    assert_eq!(score.total(), 0);
}

#[test]
fn equal_scores_keep_the_earlier_candidate() {
    let input = "{\"name\": \"First\", \"age\": 1, \"email\": \"f@x\"}\n\n{\"name\": \"Second\", \"age\": 2, \"email\": \"s@x\"}";
    let (user, _) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("First"));
}

// -- strict mode and options -------------------------------------

#[test]
fn strict_mode_still_accepts_valid_candidates() {
    let input = "noise {\"name\": \"V\", \"age\": 9, \"email\": \"v@x\"} noise";
    let options = ParseOptions {
        strict: true,
        ..ParseOptions::default()
    };
    let (user, score) = parse_with_options(input, &user_shape(), &options).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("V"));
    assert_eq!(score.total(), 0);
}

#[test]
fn strict_mode_rejects_what_only_repair_could_save() {
    let input = r#"{name: "Bob", age: 28, email: "bob@example.com"}"#;
    let options = ParseOptions {
        strict: true,
        ..ParseOptions::default()
    };
    let err = parse_with_options(input, &user_shape(), &options).unwrap_err();
    assert!(matches!(err, ParseError::AllCandidatesFailed { .. }));
}

#[test]
fn reserved_options_change_nothing() {
    let input = r#"{"name": "R", "age": 5, "email": "r@x"}"#;
    let plain = parse(input, &user_shape()).unwrap();
    let with_reserved = parse_with_options(
        input,
        &user_shape(),
        &ParseOptions {
            strict: false,
            allow_incomplete_json: true,
            track_completion_state: true,
        },
    )
    .unwrap();
    assert_eq!(plain.0, with_reserved.0);
    assert_eq!(plain.1, with_reserved.1);
}

// -- repair interplay --------------------------------------------

#[test]
fn trailing_comma_and_comments_survive_the_pipeline() {
    let input = "{\n  // user record\n  \"name\": \"Eve\",\n  \"age\": 29,\n  \"email\": \"eve@example.com\",\n}";
    let (user, score) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("Eve"));
    assert_eq!(score.total(), 0);
}

#[test]
fn single_quoted_object_parses() {
    let input = r#"{'name': 'David', 'age': 40, 'email': 'david@example.com'}"#;
    let (user, _) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("David"));
    assert_eq!(user.field("age").unwrap().as_i64(), Some(40));
}

#[test]
fn unquoted_keys_in_a_fence_parse() {
    let input = "Here's the extracted user:\n```json\n{\n  name: \"Alice\",\n  age: 30,\n  email: \"alice@example.com\"\n}\n```";
    let (user, _) = parse(input, &user_shape()).unwrap();
    assert_eq!(user.field("name").unwrap().as_str(), Some("Alice"));
    assert_eq!(user.field("age").unwrap().as_i64(), Some(30));
}

#[test]
fn repair_json_is_exposed_for_inspection() {
    let fixed = repair_json(r#"{name: John, age: 30}"#);
    let v: serde_json::Value = serde_json::from_str(&fixed).unwrap();
    assert_eq!(v["name"], "John");
    assert_eq!(v["age"], 30);
}

// -- fuzzy matching through the pipeline -------------------------

#[test]
fn enum_field_fuzzy_matches_through_the_pipeline() {
    let shape = Shape::record([
        Field::new("title", Shape::string()),
        Field::new(
            "status",
            Shape::enumeration(["Active", "OnHold", "Canceled"]),
        ),
    ]);
    let input = r#"{"title": "Q4", "status": "cancelled"}"#;
    let (project, score) = parse(input, &shape).unwrap();
    assert_eq!(project.field("status").unwrap().as_str(), Some("Canceled"));
    assert_eq!(score.count(Flag::EnumFuzzyMatch), 2);
}

#[test]
fn aliased_and_case_shifted_fields_resolve() {
    let shape = Shape::record([
        Field::new("title", Shape::string()).alias("job_title"),
        Field::new("years", Shape::int(IntWidth::W64)),
    ]);
    let input = r#"{"job_title": "Engineer", "Years": "7"}"#;
    let (r, score) = parse(input, &shape).unwrap();
    assert_eq!(r.field("title").unwrap().as_str(), Some("Engineer"));
    assert_eq!(r.field("years").unwrap().as_i64(), Some(7));
    assert_eq!(score.count(Flag::FuzzyFieldMatch), 1);
    assert_eq!(score.count(Flag::StringToInt), 2);
}

// -- numbers through the pipeline --------------------------------

#[test]
fn fraction_and_currency_strings_coerce() {
    let shape = Shape::record([
        Field::new("ratio", Shape::int(IntWidth::W64)),
        Field::new("budget", Shape::int(IntWidth::W64)),
    ]);
    let input = r#"{"ratio": "3/2", "budget": "$12,500"}"#;
    let (r, score) = parse(input, &shape).unwrap();
    assert_eq!(r.field("ratio").unwrap().as_i64(), Some(1));
    assert_eq!(r.field("budget").unwrap().as_i64(), Some(12500));
    assert_eq!(score.count(Flag::StringToInt), 4);
}
