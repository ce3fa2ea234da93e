use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::domain::{EmploymentStatus, Student, StudentCard, UnknownStatus};
use super::repository::{RepositoryError, StudentRepository};

/// Status filter offered by the public directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(EmploymentStatus),
}

impl StatusFilter {
    pub fn matches(self, student: &Student) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => student.profile.status == status,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        trimmed.parse().map(StatusFilter::Only)
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub employed: usize,
    pub internship: usize,
    pub looking: usize,
}

impl StatusCounts {
    pub fn tally(students: &[Student]) -> Self {
        students
            .iter()
            .fold(Self::default(), |mut counts, student| {
                match student.profile.status {
                    EmploymentStatus::Employed => counts.employed += 1,
                    EmploymentStatus::Internship => counts.internship += 1,
                    EmploymentStatus::Looking => counts.looking += 1,
                }
                counts
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryView {
    pub filter: StatusFilter,
    /// Size of the unfiltered listing.
    pub total: usize,
    pub counts: StatusCounts,
    pub students: Vec<StudentCard>,
}

pub fn filter_students(students: &[Student], filter: StatusFilter) -> Vec<&Student> {
    students
        .iter()
        .filter(|student| filter.matches(student))
        .collect()
}

/// Read-only public listing. The whole collection is fetched per visit and
/// filtered in memory.
pub struct DirectoryService {
    students: Arc<dyn StudentRepository>,
}

impl DirectoryService {
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }

    pub fn browse(&self, filter: StatusFilter) -> Result<DirectoryView, RepositoryError> {
        let students = self.students.list()?;
        let cards = filter_students(&students, filter)
            .into_iter()
            .map(StudentCard::from)
            .collect();

        Ok(DirectoryView {
            filter,
            total: students.len(),
            counts: StatusCounts::tally(&students),
            students: cards,
        })
    }
}
