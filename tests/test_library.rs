use schedsat::{
    conditions::{ComponentSet, Condition, SlotRef},
    error::SchedError,
    model::{Cardinality, Problem, SlotDefinition},
    rules::Hardness,
    solvers::{Model, ScheduleSolver, SolveOutcome, SolverOptions},
};

fn room_problem(meetings: &[&str]) -> Problem {
    let mut problem = Problem::default();
    problem.new_component_type("Room").unwrap();
    problem.new_component("R1", "Room").unwrap();
    problem.new_component("R2", "Room").unwrap();
    for m in meetings {
        problem.new_assignment(m).unwrap();
        problem
            .add_slot(m, "room", SlotDefinition::variable("Room", Cardinality::Exactly(1)))
            .unwrap();
    }
    problem
}

fn add_distinct_rooms(problem: &mut Problem) {
    problem
        .new_rule(
            "distinct_rooms",
            Condition::distinct(vec![SlotRef::new(0, "room"), SlotRef::new(1, "room")]),
            Hardness::Hard,
        )
        .unwrap();
}

fn room_of(model: &Model, meeting: &str) -> String {
    let rooms = model.assignment(meeting).unwrap().slot("room").unwrap();
    assert_eq!(1, rooms.len());
    rooms[0].clone()
}

fn all_models(problem: &Problem) -> Vec<Model> {
    let enumeration = ScheduleSolver::new(problem).enumerate_all(false).unwrap();
    assert!(enumeration.is_complete());
    let models = enumeration.into_models();
    for (i, m) in models.iter().enumerate() {
        assert!(!models[i + 1..].contains(m), "duplicate model");
        for rule in problem.rules().iter().filter(|r| r.is_hard()) {
            assert!(m.satisfies(problem, rule).unwrap());
        }
    }
    models
}

#[test]
fn test_single_meeting_in_r1() {
    let mut problem = room_problem(&["Meeting"]);
    problem
        .new_rule(
            "in_r1",
            Condition::component_is(SlotRef::new(0, "room"), "R1"),
            Hardness::Hard,
        )
        .unwrap();
    let models = all_models(&problem);
    assert_eq!(1, models.len());
    assert_eq!("R1", room_of(&models[0], "Meeting"));
}

#[test]
fn test_two_meetings_distinct_rooms() {
    let mut problem = room_problem(&["M1", "M2"]);
    add_distinct_rooms(&mut problem);
    let mut bindings = all_models(&problem)
        .iter()
        .map(|m| (room_of(m, "M1"), room_of(m, "M2")))
        .collect::<Vec<(String, String)>>();
    bindings.sort();
    assert_eq!(
        vec![
            ("R1".to_string(), "R2".to_string()),
            ("R2".to_string(), "R1".to_string())
        ],
        bindings
    );
}

#[test]
fn test_two_meetings_distinct_rooms_with_symmetry_breaking() {
    let mut problem = room_problem(&["M1", "M2"]);
    add_distinct_rooms(&mut problem);
    let options = SolverOptions {
        symmetry_breaking: true,
        ..Default::default()
    };
    let enumeration = ScheduleSolver::new_with_options(&problem, options)
        .enumerate_all(false)
        .unwrap();
    assert_eq!(2, enumeration.models().len());
}

#[test]
fn test_two_meetings_distinct_rooms_m1_in_r1() {
    let mut problem = room_problem(&["M1", "M2"]);
    add_distinct_rooms(&mut problem);
    problem
        .new_restricted_rule(
            "m1_in_r1",
            Condition::component_is(SlotRef::new(0, "room"), "R1"),
            Hardness::Hard,
            &[&["M1"]],
        )
        .unwrap();
    let models = all_models(&problem);
    assert_eq!(1, models.len());
    assert_eq!("R1", room_of(&models[0], "M1"));
    assert_eq!("R2", room_of(&models[0], "M2"));
}

#[test]
fn test_conflict_names_both_rules() {
    let mut problem = room_problem(&["M1", "M2"]);
    add_distinct_rooms(&mut problem);
    problem
        .new_rule(
            "all_in_r1",
            Condition::component_is(SlotRef::new(0, "room"), "R1"),
            Hardness::Hard,
        )
        .unwrap();
    problem
        .new_rule(
            "any_room",
            Condition::component_in(SlotRef::new(0, "room"), ComponentSet::Type("Room".to_string())),
            Hardness::Hard,
        )
        .unwrap();
    let explanation = match ScheduleSolver::new(&problem).solve().unwrap() {
        SolveOutcome::Unsatisfiable(Some(e)) => e,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert!(explanation.is_minimal());
    let mut labels = explanation.rule_labels();
    labels.sort_unstable();
    assert_eq!(vec!["all_in_r1", "distinct_rooms"], labels);
    assert!(all_models(&problem).is_empty());
}

#[test]
fn test_no_explanation_when_not_requested() {
    let mut problem = room_problem(&["M1", "M2", "M3"]);
    add_distinct_rooms(&mut problem);
    let options = SolverOptions {
        explain: false,
        ..Default::default()
    };
    let outcome = ScheduleSolver::new_with_options(&problem, options)
        .solve()
        .unwrap();
    assert_eq!(SolveOutcome::Unsatisfiable(None), outcome);
}

#[test]
fn test_fixed_slot_is_kept() {
    let mut problem = room_problem(&["M1"]);
    problem.new_component_type("Host").unwrap();
    problem.new_component("Alice", "Host").unwrap();
    problem.new_component("Bob", "Host").unwrap();
    problem
        .add_slot("M1", "host", SlotDefinition::fixed("Host", &["Bob"]))
        .unwrap();
    let models = all_models(&problem);
    assert_eq!(2, models.len());
    for m in models {
        assert_eq!(
            &["Bob".to_string()],
            m.assignment("M1").unwrap().slot("host").unwrap()
        );
    }
}

#[test]
fn test_soft_rule_minimizes_cost() {
    let mut problem = room_problem(&["M1", "M2"]);
    add_distinct_rooms(&mut problem);
    problem
        .new_restricted_rule(
            "m2_prefers_r1",
            Condition::component_is(SlotRef::new(0, "room"), "R1"),
            Hardness::Soft(4),
            &[&["M2"]],
        )
        .unwrap();
    match ScheduleSolver::new(&problem).solve().unwrap() {
        SolveOutcome::Satisfiable(model) => {
            assert_eq!(0, model.cost());
            assert!(model.is_optimal());
            assert_eq!("R1", room_of(&model, "M2"));
            assert_eq!("R2", room_of(&model, "M1"));
        }
        other => panic!("unexpected outcome {:?}", other),
    };
}

#[test]
fn test_schema_error_on_unknown_slot() {
    let mut problem = room_problem(&["M1"]);
    assert!(problem
        .new_restricted_rule(
            "bad",
            Condition::component_is(SlotRef::new(0, "desk"), "R1"),
            Hardness::Hard,
            &[&["M1"]],
        )
        .is_err());
}

#[test]
fn test_schema_error_on_misspelled_slot_in_unrestricted_rule() {
    let mut problem = room_problem(&["M1"]);
    assert!(matches!(
        problem.new_rule(
            "in_r1",
            Condition::component_is(SlotRef::new(0, "rom"), "R1"),
            Hardness::Hard,
        ),
        Err(SchedError::Schema(_))
    ));
    assert!(matches!(
        problem.new_rule(
            "at_most_one_in_r1",
            Condition::max_assignments(Condition::component_is(SlotRef::new(0, "rom"), "R1"), 1),
            Hardness::Hard,
        ),
        Err(SchedError::Schema(_))
    ));
    assert!(problem.rules().is_empty());
}

#[test]
fn test_schema_error_on_rule_applying_nowhere() {
    let mut problem = room_problem(&["M1"]);
    problem.new_component_type("Host").unwrap();
    problem.new_component("Alice", "Host").unwrap();
    problem.new_assignment("Lunch").unwrap();
    problem
        .add_slot("Lunch", "host", SlotDefinition::variable("Host", Cardinality::Exactly(1)))
        .unwrap();
    add_distinct_rooms(&mut problem);
    assert!(matches!(
        ScheduleSolver::new(&problem).solve(),
        Err(SchedError::Schema(_))
    ));
}
