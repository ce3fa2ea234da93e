//! CSV import of published students for development and demo environments.
//!
//! Expected headers: `name,specialization,status,description,portfolio_link,
//! profile_photo_url,email,phone_number`. A blank status defaults to `looking`.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::workflows::showcase::domain::{EmploymentStatus, NewStudent, ProfileFields};
use crate::workflows::showcase::intake::{IntakeGuard, ValidationError};
use crate::workflows::showcase::repository::{RepositoryError, StudentRepository};

use parser::SeedRecord;

#[derive(Debug)]
pub enum SeedImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidStatus { row: usize, value: String },
    Invalid { row: usize, source: ValidationError },
    Repository(RepositoryError),
}

impl std::fmt::Display for SeedImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedImportError::Io(err) => write!(f, "failed to read student seed file: {}", err),
            SeedImportError::Csv(err) => write!(f, "invalid student CSV data: {}", err),
            SeedImportError::InvalidStatus { row, value } => {
                write!(f, "row {}: unknown employment status '{}'", row, value)
            }
            SeedImportError::Invalid { row, source } => write!(f, "row {}: {}", row, source),
            SeedImportError::Repository(err) => {
                write!(f, "could not store seeded students: {}", err)
            }
        }
    }
}

impl std::error::Error for SeedImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedImportError::Io(err) => Some(err),
            SeedImportError::Csv(err) => Some(err),
            SeedImportError::InvalidStatus { .. } => None,
            SeedImportError::Invalid { source, .. } => Some(source),
            SeedImportError::Repository(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SeedImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SeedImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for SeedImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

pub struct StudentSeedImporter;

impl StudentSeedImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<NewStudent>, SeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses and validates every row. Seeded students are unowned.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<NewStudent>, SeedImportError> {
        let guard = IntakeGuard;
        parser::parse_records(reader)?
            .into_iter()
            .map(|record| to_new_student(&guard, record))
            .collect()
    }

    /// Inserts `seeds` in order and returns how many were stored.
    pub fn load_into(
        students: &dyn StudentRepository,
        seeds: Vec<NewStudent>,
    ) -> Result<usize, SeedImportError> {
        let mut stored = 0;
        for seed in seeds {
            students.insert(seed)?;
            stored += 1;
        }
        info!(count = stored, "seeded students");
        Ok(stored)
    }
}

fn to_new_student(guard: &IntakeGuard, record: SeedRecord) -> Result<NewStudent, SeedImportError> {
    let row = record.row;
    let status = match record.status {
        Some(raw) => raw
            .parse::<EmploymentStatus>()
            .map_err(|_| SeedImportError::InvalidStatus { row, value: raw })?,
        None => EmploymentStatus::default(),
    };

    let profile = guard
        .check_profile(ProfileFields {
            name: record.name,
            specialization: record.specialization,
            status,
            description: record.description,
            portfolio_link: record.portfolio_link,
            profile_photo_url: record.profile_photo_url,
            email: record.email,
            phone_number: record.phone_number,
        })
        .map_err(|source| SeedImportError::Invalid { row, source })?;

    Ok(NewStudent {
        owner: None,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::showcase::memory::InMemoryStudents;
    use std::io::Cursor;

    const HEADER: &str =
        "name,specialization,status,description,portfolio_link,profile_photo_url,email,phone_number\n";

    #[test]
    fn imports_rows_and_defaults_blank_status() {
        let csv = format!(
            "{HEADER}Ada Lovelace,Analytical Engines,employed,First programmer,https://ada.example.com,,ada@example.com,\n\
Grace Hopper,Compilers,,COBOL pioneer,,,,+1 555 0100\n"
        );
        let seeds = StudentSeedImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].profile.status, EmploymentStatus::Employed);
        assert_eq!(seeds[0].profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(seeds[0].profile.profile_photo_url, None);
        assert_eq!(seeds[1].profile.status, EmploymentStatus::Looking);
        assert_eq!(seeds[1].profile.phone_number.as_deref(), Some("+1 555 0100"));
        assert!(seeds.iter().all(|seed| seed.owner.is_none()));
    }

    #[test]
    fn reports_the_offending_row() {
        let csv = format!(
            "{HEADER}Ada Lovelace,Analytical Engines,employed,First programmer,,,,\n\
Grace Hopper,Compilers,retired,COBOL pioneer,,,,\n"
        );
        match StudentSeedImporter::from_reader(Cursor::new(csv)) {
            Err(SeedImportError::InvalidStatus { row: 2, value }) => assert_eq!(value, "retired"),
            other => panic!("expected invalid status, got {other:?}"),
        }

        let csv = format!("{HEADER}Ada Lovelace,Analytical Engines,employed,First programmer,not a url,,,\n");
        match StudentSeedImporter::from_reader(Cursor::new(csv)) {
            Err(SeedImportError::Invalid {
                row: 1,
                source: ValidationError::InvalidUrl { field },
            }) => assert_eq!(field, "portfolio_link"),
            other => panic!("expected invalid url, got {other:?}"),
        }
    }

    #[test]
    fn load_into_stores_every_seed() {
        let csv = format!("{HEADER}Ada Lovelace,Analytical Engines,looking,First programmer,,,,\n");
        let seeds = StudentSeedImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        let students = InMemoryStudents::default();

        let stored = StudentSeedImporter::load_into(&students, seeds).expect("load");

        assert_eq!(stored, 1);
        assert_eq!(students.list().expect("list")[0].profile.name, "Ada Lovelace");
    }

    #[test]
    fn from_path_propagates_io_errors() {
        match StudentSeedImporter::from_path("./does-not-exist.csv") {
            Err(SeedImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
