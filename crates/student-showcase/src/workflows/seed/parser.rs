use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV row, positioned by its 1-based data line.
#[derive(Debug)]
pub(crate) struct SeedRecord {
    pub(crate) row: usize,
    pub(crate) name: String,
    pub(crate) specialization: String,
    pub(crate) status: Option<String>,
    pub(crate) description: String,
    pub(crate) portfolio_link: Option<String>,
    pub(crate) profile_photo_url: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone_number: Option<String>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<SeedRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<StudentRow>().enumerate() {
        let row = record?;
        records.push(SeedRecord {
            row: index + 1,
            name: row.name,
            specialization: row.specialization,
            status: row.status,
            description: row.description,
            portfolio_link: row.portfolio_link,
            profile_photo_url: row.profile_photo_url,
            email: row.email,
            phone_number: row.phone_number,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    name: String,
    specialization: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    portfolio_link: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    profile_photo_url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone_number: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
