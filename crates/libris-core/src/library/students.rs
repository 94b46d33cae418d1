//! Student registration

use tracing::info;

use crate::error::{LibraryError, LibraryResult, Violation};
use crate::models::{NewStudent, Student, StudentPatch};
use crate::repository::{Record, RecordKey};
use crate::session::Session;
use crate::storage::KeyValueStore;

use super::accounts::actions;
use super::Library;

impl<S: KeyValueStore> Library<S> {
    /// Next id for a student in `course` enrolled in `year`
    ///
    /// The id is `{course}{year}` followed by a three-digit sequence number:
    /// one more than the number of students already carrying that prefix.
    pub fn generate_student_id(&self, course: &str, year: i32) -> LibraryResult<String> {
        let prefix = format!("{}{}", course, year);
        let taken = self
            .students_repo()
            .count_where(|student| student.id.starts_with(&prefix))?;
        Ok(format!("{}{:03}", prefix, taken + 1))
    }

    /// Register a student; returns the generated id
    pub fn add_student(&mut self, session: &Session, student: NewStudent) -> LibraryResult<String> {
        if student.full_name.trim().is_empty() {
            return Err(Violation::InvalidInput("student name must not be empty".to_string()).into());
        }
        if student.course.trim().is_empty() {
            return Err(Violation::InvalidInput("student course must not be empty".to_string()).into());
        }

        let id = self.generate_student_id(&student.course, student.enrolled_year)?;
        let record = Student {
            id: id.clone(),
            full_name: student.full_name,
            contact_no: student.contact_no,
            course: student.course,
            enrolled_year: student.enrolled_year,
        };
        let details = format!("Added student: {} ({})", record.full_name, id);

        if !self.students_repo().insert(record)? {
            return Err(Violation::DuplicateKey {
                entity: "Student",
                key: id,
            }
            .into());
        }

        info!("Added student {}", id);
        self.audit(session, actions::STUDENT_ADDED, &details);
        Ok(id)
    }

    pub fn student(&self, id: &str) -> LibraryResult<Option<Student>> {
        Ok(self.students_repo().get(&RecordKey::from(id))?)
    }

    /// Find a student by id, failing with `NotFound` when absent
    pub fn require_student(&self, id: &str) -> LibraryResult<Student> {
        self.student(id)?
            .ok_or_else(|| LibraryError::not_found(Student::ENTITY, id))
    }

    pub fn students(&self) -> LibraryResult<Vec<Student>> {
        Ok(self.students_repo().get_all()?)
    }

    pub fn students_by_course(&self, course: &str) -> LibraryResult<Vec<Student>> {
        Ok(self.students_repo().filter(|student| student.course == course)?)
    }

    /// Students whose id, name, contact number or course contains `query`
    pub fn search_students(&self, query: &str) -> LibraryResult<Vec<Student>> {
        Ok(self.students_repo().search(query)?)
    }

    /// Change name or contact number; returns `false` if the student does not exist
    pub fn update_student(
        &mut self,
        session: &Session,
        id: &str,
        patch: StudentPatch,
    ) -> LibraryResult<bool> {
        if patch.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(Violation::InvalidInput("student name must not be empty".to_string()).into());
        }
        if patch.is_empty() {
            return Ok(self.student(id)?.is_some());
        }

        if !self.students_repo().update(&RecordKey::from(id), &patch)? {
            return Ok(false);
        }

        let name = self
            .student(id)?
            .map(|student| student.full_name)
            .unwrap_or_default();
        self.audit(
            session,
            actions::STUDENT_UPDATED,
            &format!("Updated student: {} ({})", name, id),
        );
        Ok(true)
    }

    /// Delete a student with no books checked out
    pub fn delete_student(&mut self, session: &Session, id: &str) -> LibraryResult<()> {
        let student = self.require_student(id)?;

        let open = self
            .transactions_repo()
            .count_where(|t| t.student_id == id && t.is_open())?;
        if open > 0 {
            return Err(Violation::StudentHasLoans {
                student_id: id.to_string(),
                open,
            }
            .into());
        }

        self.students_repo().delete(&RecordKey::from(id))?;

        info!("Deleted student {}", id);
        self.audit(
            session,
            actions::STUDENT_DELETED,
            &format!("Deleted student: {} ({})", student.full_name, id),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::{admin, library, new_book};

    fn new_student(name: &str, course: &str, year: i32) -> NewStudent {
        NewStudent {
            full_name: name.to_string(),
            contact_no: "9800000000".to_string(),
            course: course.to_string(),
            enrolled_year: year,
        }
    }

    #[test]
    fn test_generate_student_id_sequence() {
        let mut library = library();
        let session = admin(&mut library);

        assert_eq!(library.generate_student_id("BCA", 2024).unwrap(), "BCA2024001");

        let id = library.add_student(&session, new_student("Sita", "BCA", 2024)).unwrap();
        assert_eq!(id, "BCA2024001");
        assert_eq!(library.generate_student_id("BCA", 2024).unwrap(), "BCA2024002");

        // Other courses and years keep their own sequence
        assert_eq!(library.generate_student_id("BBA", 2024).unwrap(), "BBA2024001");
        assert_eq!(library.generate_student_id("BCA", 2023).unwrap(), "BCA2023001");
    }

    #[test]
    fn test_add_student_keeps_existing_records() {
        let mut library = library();
        let session = admin(&mut library);

        let first = library.add_student(&session, new_student("Sita", "BCA", 2024)).unwrap();
        let second = library.add_student(&session, new_student("Ram", "BCA", 2024)).unwrap();

        assert_eq!(second, "BCA2024002");
        let students = library.students().unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(library.require_student(&first).unwrap().full_name, "Sita");
        assert_eq!(library.require_student(&second).unwrap().full_name, "Ram");

        let last = library.logs().unwrap().pop().unwrap();
        assert_eq!(last.action, actions::STUDENT_ADDED);
        assert_eq!(last.details, "Added student: Ram (BCA2024002)");
    }

    #[test]
    fn test_id_collision_is_refused() {
        let mut library = library();
        let session = admin(&mut library);

        library.add_student(&session, new_student("One", "BCA", 2024)).unwrap();
        library.add_student(&session, new_student("Two", "BCA", 2024)).unwrap();
        library.delete_student(&session, "BCA2024001").unwrap();

        // One student left with the prefix, so the next id is 002 again
        let err = library
            .add_student(&session, new_student("Three", "BCA", 2024))
            .unwrap_err();
        assert_eq!(
            err.violation(),
            Some(&Violation::DuplicateKey {
                entity: "Student",
                key: "BCA2024002".to_string(),
            })
        );
        assert_eq!(library.require_student("BCA2024002").unwrap().full_name, "Two");
    }

    #[test]
    fn test_add_student_validates_input() {
        let mut library = library();
        let session = admin(&mut library);

        assert!(library
            .add_student(&session, new_student("", "BCA", 2024))
            .unwrap_err()
            .is_violation());
        assert!(library
            .add_student(&session, new_student("Sita", " ", 2024))
            .unwrap_err()
            .is_violation());
        assert!(library.students().unwrap().is_empty());
    }

    #[test]
    fn test_search_and_filter_students() {
        let mut library = library();
        let session = admin(&mut library);
        library.add_student(&session, new_student("Sita Sharma", "BCA", 2024)).unwrap();
        library.add_student(&session, new_student("Ram Thapa", "BBA", 2023)).unwrap();

        assert_eq!(library.search_students("sharma").unwrap().len(), 1);
        assert_eq!(library.search_students("BBA2023").unwrap().len(), 1);
        assert_eq!(library.search_students("98000").unwrap().len(), 2);
        assert_eq!(library.students_by_course("BCA").unwrap().len(), 1);
    }

    #[test]
    fn test_update_student() {
        let mut library = library();
        let session = admin(&mut library);
        let id = library.add_student(&session, new_student("Sita", "BCA", 2024)).unwrap();

        let patch = StudentPatch {
            contact_no: Some("9811111111".to_string()),
            ..StudentPatch::default()
        };
        assert!(library.update_student(&session, &id, patch.clone()).unwrap());
        assert!(!library.update_student(&session, "BCA2024999", patch).unwrap());

        let student = library.require_student(&id).unwrap();
        assert_eq!(student.contact_no, "9811111111");
        assert_eq!(student.full_name, "Sita");
        assert_eq!(student.course, "BCA");
    }

    #[test]
    fn test_delete_student_with_open_loan_is_refused() {
        let mut library = library();
        let session = admin(&mut library);
        let book = library.add_book(&session, new_book("Physics", "BCA", 1)).unwrap();
        let id = library.add_student(&session, new_student("Sita", "BCA", 2024)).unwrap();
        let txn = library.checkout(&session, book, &id).unwrap();

        let err = library.delete_student(&session, &id).unwrap_err();
        assert_eq!(
            err.violation(),
            Some(&Violation::StudentHasLoans {
                student_id: id.clone(),
                open: 1,
            })
        );
        assert!(library.student(&id).unwrap().is_some());

        library.checkin(&session, txn.id).unwrap();
        library.delete_student(&session, &id).unwrap();
        assert!(library.student(&id).unwrap().is_none());

        // History survives the student
        assert_eq!(library.transactions().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_missing_student() {
        let mut library = library();
        let session = admin(&mut library);

        let err = library.delete_student(&session, "MBA2020001").unwrap_err();
        assert!(err.is_not_found());
    }
}
