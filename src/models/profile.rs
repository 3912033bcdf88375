//! Profile table model.
//!
//! The profile table is owned outside this server; these types only name its
//! columns and describe them for callers and for the LLM prompt.

use serde::Serialize;

/// Default name of the profile table.
pub const DEFAULT_PROFILE_TABLE: &str = "hs_linkedin_network";

/// Columns of the profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileColumn {
    Id,
    Urn,
    Username,
    FirstName,
    LastName,
    IsCreator,
    IsOpenToWork,
    IsHiring,
    ProfilePicture,
    Summary,
    Headline,
    City,
    Country,
    FulltimeCount,
    InternshipCount,
    IsHeadstarterAffiliated,
    MostRecentCompanyName,
    MostRecentCompanyUsername,
    MostRecentCompanyTitle,
    MostRecentCompanyLogo,
    MostRecentCompanyYear,
    MostRecentSchool,
    MostRecentSchoolDegree,
    MostRecentSchoolMonth,
    MostRecentSchoolYear,
}

/// Logical group a column belongs to, used when describing the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGroup {
    Identity,
    Status,
    Location,
    Experience,
    Education,
}

impl ColumnGroup {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Identity => "Basic Profile",
            Self::Status => "Professional Status",
            Self::Location => "Location",
            Self::Experience => "Experience",
            Self::Education => "Education",
        }
    }

    pub const ALL: [ColumnGroup; 5] = [
        Self::Identity,
        Self::Status,
        Self::Location,
        Self::Experience,
        Self::Education,
    ];
}

impl ProfileColumn {
    /// Every column in table order.
    pub const ALL: [ProfileColumn; 25] = [
        Self::Id,
        Self::Urn,
        Self::Username,
        Self::FirstName,
        Self::LastName,
        Self::IsCreator,
        Self::IsOpenToWork,
        Self::IsHiring,
        Self::ProfilePicture,
        Self::Summary,
        Self::Headline,
        Self::City,
        Self::Country,
        Self::FulltimeCount,
        Self::InternshipCount,
        Self::IsHeadstarterAffiliated,
        Self::MostRecentCompanyName,
        Self::MostRecentCompanyUsername,
        Self::MostRecentCompanyTitle,
        Self::MostRecentCompanyLogo,
        Self::MostRecentCompanyYear,
        Self::MostRecentSchool,
        Self::MostRecentSchoolDegree,
        Self::MostRecentSchoolMonth,
        Self::MostRecentSchoolYear,
    ];

    /// Column name as it appears in SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Urn => "urn",
            Self::Username => "username",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::IsCreator => "is_creator",
            Self::IsOpenToWork => "is_open_to_work",
            Self::IsHiring => "is_hiring",
            Self::ProfilePicture => "profile_picture",
            Self::Summary => "summary",
            Self::Headline => "headline",
            Self::City => "city",
            Self::Country => "country",
            Self::FulltimeCount => "fulltime_count",
            Self::InternshipCount => "internship_count",
            Self::IsHeadstarterAffiliated => "is_headstarter_affiliated",
            Self::MostRecentCompanyName => "most_recent_company_name",
            Self::MostRecentCompanyUsername => "most_recent_company_username",
            Self::MostRecentCompanyTitle => "most_recent_company_title",
            Self::MostRecentCompanyLogo => "most_recent_company_logo",
            Self::MostRecentCompanyYear => "most_recent_company_year",
            Self::MostRecentSchool => "most_recent_school",
            Self::MostRecentSchoolDegree => "most_recent_school_degree",
            Self::MostRecentSchoolMonth => "most_recent_school_month",
            Self::MostRecentSchoolYear => "most_recent_school_year",
        }
    }

    /// Declared SQL type and a short description.
    pub fn describe(&self) -> (&'static str, &'static str) {
        match self {
            Self::Id => ("serial, primary key", "Row identifier"),
            Self::Urn => ("varchar", "External profile URN"),
            Self::Username => ("varchar, unique", "Profile username"),
            Self::FirstName => ("varchar", "First name"),
            Self::LastName => ("varchar", "Last name"),
            Self::IsCreator => ("boolean", "Whether this person is a creator"),
            Self::IsOpenToWork => ("boolean", "Whether this person is open to work"),
            Self::IsHiring => ("boolean", "Whether this person is hiring"),
            Self::ProfilePicture => ("text", "Profile picture URL"),
            Self::Summary => ("text", "Profile summary"),
            Self::Headline => ("text", "Profile headline"),
            Self::City => ("varchar", "City location"),
            Self::Country => ("varchar", "Country location"),
            Self::FulltimeCount => ("integer", "Number of full-time jobs"),
            Self::InternshipCount => ("integer", "Number of internships"),
            Self::IsHeadstarterAffiliated => (
                "boolean",
                "Whether the profile lists Headstarter as an experience",
            ),
            Self::MostRecentCompanyName => ("varchar", "Most recent company name"),
            Self::MostRecentCompanyUsername => ("varchar", "Company's profile username"),
            Self::MostRecentCompanyTitle => ("text", "Current job title"),
            Self::MostRecentCompanyLogo => ("text", "Company logo URL"),
            Self::MostRecentCompanyYear => ("varchar", "Job start year"),
            Self::MostRecentSchool => ("varchar", "Most recent school name"),
            Self::MostRecentSchoolDegree => ("text", "Degree type"),
            Self::MostRecentSchoolMonth => ("integer", "Graduation month"),
            Self::MostRecentSchoolYear => ("integer", "Graduation year"),
        }
    }

    pub fn group(&self) -> ColumnGroup {
        match self {
            Self::Id
            | Self::Urn
            | Self::Username
            | Self::FirstName
            | Self::LastName
            | Self::ProfilePicture
            | Self::Summary
            | Self::Headline => ColumnGroup::Identity,
            Self::IsCreator
            | Self::IsOpenToWork
            | Self::IsHiring
            | Self::IsHeadstarterAffiliated => ColumnGroup::Status,
            Self::City | Self::Country => ColumnGroup::Location,
            Self::FulltimeCount
            | Self::InternshipCount
            | Self::MostRecentCompanyName
            | Self::MostRecentCompanyUsername
            | Self::MostRecentCompanyTitle
            | Self::MostRecentCompanyLogo
            | Self::MostRecentCompanyYear => ColumnGroup::Experience,
            Self::MostRecentSchool
            | Self::MostRecentSchoolDegree
            | Self::MostRecentSchoolMonth
            | Self::MostRecentSchoolYear => ColumnGroup::Education,
        }
    }
}

impl std::fmt::Display for ProfileColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, optionally schema-qualified table name.
///
/// The name is spliced into SQL text, so only plain identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: Option<String>,
    table: String,
}

impl TableName {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let (schema, table) = match s.split_once('.') {
            Some((schema, table)) => (Some(schema), table),
            None => (None, s),
        };
        if let Some(schema) = schema {
            validate_identifier(schema)?;
        }
        validate_identifier(table)?;
        Ok(Self {
            schema: schema.map(String::from),
            table: table.to_string(),
        })
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Name as it appears in a FROM clause.
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self {
            schema: None,
            table: DEFAULT_PROFILE_TABLE.to_string(),
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified())
    }
}

fn validate_identifier(ident: &str) -> Result<(), String> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!(
            "Invalid table identifier '{}': use letters, digits and underscores only",
            ident
        ));
    }
    if ident.len() > 63 {
        return Err(format!("Table identifier '{}' is too long", ident));
    }
    Ok(())
}
