use assert_cmd::Command;
use assert_fs::{prelude::FileWriteStr, NamedTempFile};
use predicates::prelude::{predicate, PredicateBooleanExt};

const SINGLE_MEETING: &str = r#"
type Room
component R1 Room
component R2 Room
assignment Meeting
slot Meeting room Room 1
rule in_r1 hard (component-is 0.room R1)
"#;

const TWO_MEETINGS: &str = r#"
type Room
component R1 Room
component R2 Room
assignment M1
assignment M2
slot M1 room Room 1
slot M2 room Room 1
rule distinct_rooms hard (distinct 0.room 1.room)
"#;

fn run_on_instance(
    instance: &str,
    args: &[&str],
) -> Result<(assert_cmd::assert::Assert, NamedTempFile), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("instance.sched")?;
    file.write_str(instance)?;
    let mut cmd = Command::cargo_bin("schedsat")?;
    cmd.arg(args[0])
        .arg("-f")
        .arg(file.path())
        .args(&args[1..])
        .arg("--logging-level")
        .arg("off");
    Ok((cmd.assert(), file))
}

#[test]
fn test_solve_single_meeting() -> Result<(), Box<dyn std::error::Error>> {
    let (assert, file) = run_on_instance(SINGLE_MEETING, &["solve"])?;
    assert
        .success()
        .stdout(predicate::eq("s SATISFIABLE\nc cost 0 (optimal)\nv Meeting.room R1\n"));
    file.close()?;
    Ok(())
}

#[test]
fn test_solve_all_two_meetings() -> Result<(), Box<dyn std::error::Error>> {
    let (assert, file) = run_on_instance(TWO_MEETINGS, &["solve", "--all"])?;
    assert.success().stdout(
        predicate::str::contains("v M1.room R1\nv M2.room R2\n")
            .and(predicate::str::contains("v M1.room R2\nv M2.room R1\n"))
            .and(predicate::str::ends_with("c 2 model(s)\ns SATISFIABLE\n")),
    );
    file.close()?;
    Ok(())
}

#[test]
fn test_solve_unsat_with_explanation() -> Result<(), Box<dyn std::error::Error>> {
    let instance = format!("{}rule all_in_r1 hard (component-is 0.room R1)\n", TWO_MEETINGS);
    let (assert, file) = run_on_instance(&instance, &["solve"])?;
    assert.success().stdout(
        predicate::str::starts_with("s UNSATISFIABLE\n")
            .and(predicate::str::contains("e rule distinct_rooms"))
            .and(predicate::str::contains("e rule all_in_r1")),
    );
    file.close()?;
    Ok(())
}

#[test]
fn test_solve_unsat_without_explanation() -> Result<(), Box<dyn std::error::Error>> {
    let instance = format!("{}rule all_in_r1 hard (component-is 0.room R1)\n", TWO_MEETINGS);
    let (assert, file) = run_on_instance(&instance, &["solve", "--no-explain"])?;
    assert.success().stdout(predicate::eq("s UNSATISFIABLE\n"));
    file.close()?;
    Ok(())
}

#[test]
fn test_optimal_only_requires_all() -> Result<(), Box<dyn std::error::Error>> {
    let (assert, file) = run_on_instance(SINGLE_MEETING, &["solve", "--optimal-only"])?;
    assert.failure();
    file.close()?;
    Ok(())
}

#[test]
fn test_check() -> Result<(), Box<dyn std::error::Error>> {
    let (assert, file) = run_on_instance(TWO_MEETINGS, &["check"])?;
    assert
        .success()
        .stdout(predicate::eq("c the problem is well-formed\n"));
    file.close()?;
    Ok(())
}

#[test]
fn test_check_syntax_error() -> Result<(), Box<dyn std::error::Error>> {
    let instance = format!("{}rule broken hard (component-is 0.room\n", TWO_MEETINGS);
    let (assert, file) = run_on_instance(&instance, &["check"])?;
    assert.failure();
    file.close()?;
    Ok(())
}

#[test]
fn test_missing_input_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("schedsat")?;
    cmd.arg("solve")
        .arg("-f")
        .arg("/this/file/does/not/exist.sched")
        .arg("--logging-level")
        .arg("off");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_encode() -> Result<(), Box<dyn std::error::Error>> {
    let (assert, file) = run_on_instance(TWO_MEETINGS, &["encode"])?;
    assert.success().stdout(
        predicate::str::contains("c selector")
            .and(predicate::str::contains("c fulfilled M1"))
            .and(predicate::str::contains("\np cnf ")),
    );
    file.close()?;
    Ok(())
}

#[test]
fn test_encode_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let output = NamedTempFile::new("encoding.cnf")?;
    let (assert, file) = run_on_instance(
        SINGLE_MEETING,
        &["encode", "-o", output.path().to_str().unwrap()],
    )?;
    assert.success().stdout(predicate::str::is_empty());
    let content = std::fs::read_to_string(output.path())?;
    assert!(content.contains("p cnf "));
    file.close()?;
    output.close()?;
    Ok(())
}
