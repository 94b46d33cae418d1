//! Student command handlers

use anyhow::{Context, Result};

use libris_core::{KeyValueStore, Library, NewStudent, Session, StudentPatch};

use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// Register a student
pub fn add<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    student: NewStudent,
    output: &Output,
) -> Result<()> {
    let id = library
        .add_student(session, student)
        .context("Failed to add student")?;
    let student = library.require_student(&id)?;

    output.success(&format!("Added student: {}", id));
    output.print_student(&student);
    Ok(())
}

/// List students, optionally filtered by course
pub fn list<S: KeyValueStore>(library: &Library<S>, course: Option<String>, output: &Output) -> Result<()> {
    let students = match course {
        Some(ref code) => library.students_by_course(code)?,
        None => library.students()?,
    };

    output.print_students(&students);
    Ok(())
}

pub fn show<S: KeyValueStore>(library: &Library<S>, id: String, output: &Output) -> Result<()> {
    let student = library.require_student(&id)?;
    output.print_student(&student);
    Ok(())
}

pub fn search<S: KeyValueStore>(library: &Library<S>, query: String, output: &Output) -> Result<()> {
    let students = library.search_students(&query)?;
    output.print_students(&students);
    Ok(())
}

/// Edit a student's name or contact number
pub fn edit<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    id: String,
    mut patch: StudentPatch,
    output: &Output,
) -> Result<()> {
    let student = library.require_student(&id)?;

    if patch.is_empty() && output.should_prompt() {
        println!("Editing student: {}", student.id);
        println!("Press Enter to keep current value, or type new value.\n");

        patch.full_name = prompt_with_default("Name", &student.full_name)?;
        patch.contact_no = prompt_with_default("Contact", &student.contact_no)?;
    }

    if patch.is_empty() {
        output.message("Nothing to change.");
        return Ok(());
    }

    library
        .update_student(session, &id, patch)
        .context("Failed to update student")?;

    output.success("Student updated");
    output.print_student(&library.require_student(&id)?);
    Ok(())
}

/// Delete a student
pub fn delete<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    id: String,
    output: &Output,
) -> Result<()> {
    let student = library.require_student(&id)?;

    if output.should_prompt() {
        println!("Delete student: {} - {}", student.id, student.full_name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    library.delete_student(session, &id)?;

    output.success(&format!("Deleted student: {}", id));
    Ok(())
}

/// Preview the id the next student of a course and year would get
pub fn next_id<S: KeyValueStore>(library: &Library<S>, course: String, year: i32, output: &Output) -> Result<()> {
    let id = library.generate_student_id(&course, year)?;

    if output.is_json() {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("{}", id);
    }
    Ok(())
}
