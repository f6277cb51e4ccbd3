//! End-to-end flow: gate a plan, then compile it against a directory

use pretty_assertions::assert_eq;
use serde_json::json;
use todo_plan::{
    compile_plan, prepare_plan, ActionKind, ErrorKind, Method, PlanError, PrepareDeps, PrepareInput,
    Resolvers, SchemaError, SchemaValidator,
};
use todo_refs::{DirectoryResolver, Section};
use todo_test_utils::{
    body_json, confirmed_plan, fixture_resolver, fixture_snapshot, ActionBuilder, RecordingLoader,
    RecordingPlanner, FIXTURE_TOKEN,
};

#[test]
fn loaded_plan_compiles_with_resolved_references() {
    let plan = confirmed_plan([
        ActionBuilder::new(ActionKind::TaskAdd)
            .content("Write agenda")
            .project("Work")
            .section("Next")
            .labels(&["meetings"])
            .priority(3)
            .due("tomorrow")
            .build(),
        ActionBuilder::new(ActionKind::TaskUpdate)
            .task_id("t-launch")
            .assignee("ada")
            .build(),
        ActionBuilder::new(ActionKind::CommentAdd)
            .task_id("t-launch")
            .content("kickoff moved")
            .build(),
    ]);
    let loader = RecordingLoader::new(plan);
    let deps = PrepareDeps::new()
        .with_loader(&loader)
        .with_validator(&SchemaValidator);
    let input = PrepareInput::from_path("plan.json")
        .with_confirm(FIXTURE_TOKEN)
        .with_expected_version(1);

    let plan = prepare_plan(&input, &deps).unwrap();
    assert_eq!(loader.calls.borrow().as_slice(), ["plan.json"]);
    assert_eq!(plan.summary.tasks, 2);
    assert_eq!(plan.summary.comments, 1);

    let directory = fixture_resolver();
    let requests = compile_plan(&plan, &Resolvers::all(&directory)).unwrap();
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/tasks");
    assert_eq!(
        body_json(&requests[0]),
        json!({
            "content": "Write agenda",
            "project_id": "2203306141",
            "section_id": "7025",
            "labels": ["meetings"],
            "priority": 3,
            "due_string": "tomorrow"
        })
    );

    assert_eq!(requests[1].path, "/tasks/t-launch");
    assert_eq!(body_json(&requests[1]), json!({"assignee_id": "u-ada"}));

    assert_eq!(requests[2].path, "/comments");
    assert_eq!(
        body_json(&requests[2]),
        json!({"content": "kickoff moved", "task_id": "t-launch"})
    );
}

#[test]
fn planner_path_is_used_when_no_plan_file_is_given() {
    let planner = RecordingPlanner::new(confirmed_plan([ActionBuilder::new(ActionKind::LabelAdd)
        .name("focus")
        .color("red")
        .build()]));
    let loader = RecordingLoader::default();
    let deps = PrepareDeps::new().with_loader(&loader).with_planner(&planner);

    let plan = prepare_plan(&PrepareInput::from_instruction("add a focus label").forced(), &deps).unwrap();
    assert!(loader.calls.borrow().is_empty());
    assert_eq!(planner.calls.borrow().as_slice(), ["add a focus label"]);

    let requests = compile_plan(&plan, &Resolvers::none()).unwrap();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/labels");
    assert_eq!(body_json(&requests[0]), json!({"name": "focus", "color": "red"}));
}

#[test]
fn move_into_scoped_section() {
    let plan = confirmed_plan([ActionBuilder::new(ActionKind::TaskMove)
        .task_id("t9")
        .project("Home")
        .section("next")
        .build()]);
    let directory = fixture_resolver();
    let requests = compile_plan(&plan, &Resolvers::all(&directory)).unwrap();
    assert_eq!(requests[0].path, "/tasks/t9/move");
    assert_eq!(
        body_json(&requests[0]),
        json!({"project_id": "2203306143", "section_id": "7027"})
    );
}

#[test]
fn explicit_project_id_scopes_section_without_name_lookup() {
    let plan = confirmed_plan([ActionBuilder::new(ActionKind::TaskMove)
        .task_id("t9")
        .project_id("p9")
        .section("next")
        .build()]);
    let directory = DirectoryResolver::new(fixture_snapshot().with_section(Section::new("s9", "Next", "p9")));
    let requests = compile_plan(&plan, &Resolvers::all(&directory)).unwrap();
    assert_eq!(requests[0].path, "/tasks/t9/move");
    assert_eq!(body_json(&requests[0]), json!({"project_id": "p9", "section_id": "s9"}));
}

#[test]
fn unscoped_duplicate_section_is_ambiguous() {
    let plan = confirmed_plan([ActionBuilder::new(ActionKind::TaskMove)
        .task_id("t9")
        .section("Next")
        .build()]);
    let directory = fixture_resolver();
    let err = compile_plan(&plan, &Resolvers::all(&directory)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ambiguous);
    let ids: Vec<&str> = err.candidates().unwrap().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["7025", "7027"]);
}

#[test]
fn invalid_move_fails_before_any_resolution() {
    let plan = confirmed_plan([ActionBuilder::new(ActionKind::TaskMove).task_id("t9").build()]);
    let err = compile_plan(&plan, &Resolvers::none()).unwrap_err();
    assert!(matches!(err, PlanError::Schema(SchemaError::MissingField { .. })));
    assert_eq!(
        err.to_string(),
        "task_move requires project/project_id, section/section_id, or parent"
    );
}

#[test]
fn compilation_halts_at_first_failure() {
    let plan = confirmed_plan([
        ActionBuilder::new(ActionKind::TaskComplete).task_id("t1").build(),
        ActionBuilder::new(ActionKind::TaskAdd)
            .content("orphan")
            .project("Nowhere")
            .build(),
        ActionBuilder::new(ActionKind::TaskDelete).task_id("t2").build(),
    ]);
    let directory = fixture_resolver();
    let err = compile_plan(&plan, &Resolvers::all(&directory)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "project \"Nowhere\" not found");
}

#[test]
fn destructive_actions_compile_to_deletes() {
    let plan = confirmed_plan([
        ActionBuilder::new(ActionKind::ProjectDelete).project_id("2203306142").build(),
        ActionBuilder::new(ActionKind::SectionDelete).section_id("7026").build(),
        ActionBuilder::new(ActionKind::CommentDelete).comment_id("c1").build(),
    ]);
    let requests = compile_plan(&plan, &Resolvers::none()).unwrap();
    let lines: Vec<String> = requests.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        [
            "DELETE /projects/2203306142",
            "DELETE /sections/7026",
            "DELETE /comments/c1"
        ]
    );
    assert!(requests.iter().all(|r| r.body.is_none()));
}

#[test]
fn me_resolves_to_current_user() {
    let plan = confirmed_plan([ActionBuilder::new(ActionKind::TaskAdd)
        .content("review")
        .project("Launch")
        .assignee("ME")
        .build()]);
    let directory = fixture_resolver();
    let requests = compile_plan(&plan, &Resolvers::all(&directory)).unwrap();
    assert_eq!(
        body_json(&requests[0]),
        json!({"content": "review", "project_id": "2203306144", "assignee_id": "u-me"})
    );
}
