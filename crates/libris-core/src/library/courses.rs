//! Course catalogue

use tracing::info;

use crate::error::{LibraryError, LibraryResult, Violation};
use crate::models::{Course, CoursePatch};
use crate::repository::{Record, RecordKey};
use crate::session::Session;
use crate::storage::KeyValueStore;

use super::accounts::actions;
use super::Library;

impl<S: KeyValueStore> Library<S> {
    /// Add a course under a new code
    pub fn add_course(&mut self, session: &Session, course: Course) -> LibraryResult<()> {
        if course.code.trim().is_empty() || course.name.trim().is_empty() {
            return Err(
                Violation::InvalidInput("course code and name must not be empty".to_string()).into(),
            );
        }

        let details = format!("Created new course: {} - {}", course.code, course.name);
        let code = course.code.clone();
        if !self.courses_repo().insert(course)? {
            return Err(Violation::DuplicateKey {
                entity: "Course",
                key: code,
            }
            .into());
        }

        info!("Added course {}", code);
        self.audit(session, actions::COURSE_CREATION, &details);
        Ok(())
    }

    pub fn course(&self, code: &str) -> LibraryResult<Option<Course>> {
        Ok(self.courses_repo().get(&RecordKey::from(code))?)
    }

    /// Every course, in catalogue order
    pub fn courses(&self) -> LibraryResult<Vec<Course>> {
        Ok(self.courses_repo().get_all()?)
    }

    /// Change a course's name, duration or credits; returns `false` if the code is unknown
    pub fn update_course(&mut self, session: &Session, code: &str, patch: CoursePatch) -> LibraryResult<bool> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(Violation::InvalidInput("course name must not be empty".to_string()).into());
        }
        if patch.is_empty() {
            return Ok(self.course(code)?.is_some());
        }

        if !self.courses_repo().update(&RecordKey::from(code), &patch)? {
            return Ok(false);
        }

        let name = self
            .course(code)?
            .map(|course| course.name)
            .unwrap_or_default();
        self.audit(
            session,
            actions::COURSE_EDIT,
            &format!("Updated course: {} to {}", code, name),
        );
        Ok(true)
    }

    /// Delete a course that no book or student refers to
    pub fn delete_course(&mut self, session: &Session, code: &str) -> LibraryResult<()> {
        let course = self
            .course(code)?
            .ok_or_else(|| LibraryError::not_found(Course::ENTITY, code))?;

        let books = self.books_repo().count_where(|book| book.course == code)?;
        let students = self.students_repo().count_where(|student| student.course == code)?;
        if books > 0 || students > 0 {
            return Err(Violation::CourseInUse {
                code: code.to_string(),
                books,
                students,
            }
            .into());
        }

        self.courses_repo().delete(&RecordKey::from(code))?;

        info!("Deleted course {}", code);
        self.audit(
            session,
            actions::COURSE_DELETION,
            &format!("Deleted course: {} - {}", code, course.name),
        );
        Ok(())
    }
}
