//! Course command handlers

use anyhow::{Context, Result};

use libris_core::{Course, CoursePatch, KeyValueStore, Library, LibraryError, Session};

use crate::output::Output;
use crate::prompt::confirm;

pub fn add<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    course: Course,
    output: &Output,
) -> Result<()> {
    library
        .add_course(session, course.clone())
        .context("Failed to add course")?;

    output.success(&format!("Added course: {}", course.code));
    output.print_course(&course);
    Ok(())
}

pub fn list<S: KeyValueStore>(library: &Library<S>, output: &Output) -> Result<()> {
    output.print_courses(&library.courses()?);
    Ok(())
}

pub fn show<S: KeyValueStore>(library: &Library<S>, code: String, output: &Output) -> Result<()> {
    let course = library
        .course(&code)?
        .ok_or_else(|| LibraryError::not_found("Course", &code))?;
    output.print_course(&course);
    Ok(())
}

/// Change a course's name, and optionally its duration or credits
pub fn rename<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    code: String,
    patch: CoursePatch,
    output: &Output,
) -> Result<()> {
    let updated = library
        .update_course(session, &code, patch)
        .context("Failed to update course")?;
    if !updated {
        return Err(LibraryError::not_found("Course", &code).into());
    }

    output.success("Course updated");
    if let Some(course) = library.course(&code)? {
        output.print_course(&course);
    }
    Ok(())
}

pub fn delete<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    code: String,
    output: &Output,
) -> Result<()> {
    let course = library
        .course(&code)?
        .ok_or_else(|| LibraryError::not_found("Course", &code))?;

    if output.should_prompt() {
        println!("Delete course: {} - {}", course.code, course.name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    library.delete_course(session, &code)?;

    output.success(&format!("Deleted course: {}", code));
    Ok(())
}
