//! Per-operation query construction.
//!
//! Each function maps one tool's criteria onto a `QueryDescriptor`: fixed base
//! predicates first, then one predicate per present filter in a fixed order,
//! then the operation's ordering with `id` as the final tiebreaker.

use crate::error::{DbError, DbResult};
use crate::models::{ProfileColumn, effective_limit};
use crate::query::criteria::*;
use crate::query::descriptor::{
    Condition, DescriptorBuilder, Expr, OrderTerm, Predicate, QueryDescriptor,
};
use ProfileColumn::*;

pub const SEARCH_COLUMNS: &[ProfileColumn] = &[
    Id,
    Username,
    FirstName,
    LastName,
    IsOpenToWork,
    IsHiring,
    IsCreator,
    IsHeadstarterAffiliated,
    City,
    Country,
    Headline,
    MostRecentCompanyName,
    MostRecentCompanyTitle,
    MostRecentSchool,
    FulltimeCount,
    InternshipCount,
];

pub const LOCATION_COLUMNS: &[ProfileColumn] = &[
    Id,
    Username,
    FirstName,
    LastName,
    City,
    Country,
    Headline,
    MostRecentCompanyName,
    MostRecentCompanyTitle,
    IsOpenToWork,
    IsHiring,
    IsCreator,
    IsHeadstarterAffiliated,
];

pub const OPEN_TO_WORK_COLUMNS: &[ProfileColumn] = &[
    Id,
    Username,
    FirstName,
    LastName,
    City,
    Country,
    Headline,
    Summary,
    MostRecentCompanyName,
    MostRecentCompanyTitle,
    MostRecentSchool,
    FulltimeCount,
    InternshipCount,
    IsCreator,
    IsHeadstarterAffiliated,
];

pub const HIRING_COLUMNS: &[ProfileColumn] = &[
    Id,
    Username,
    FirstName,
    LastName,
    City,
    Country,
    Headline,
    Summary,
    MostRecentCompanyName,
    MostRecentCompanyTitle,
    IsCreator,
    IsHeadstarterAffiliated,
];

pub const CREATOR_COLUMNS: &[ProfileColumn] = &[
    Id,
    Username,
    FirstName,
    LastName,
    City,
    Country,
    Headline,
    Summary,
    MostRecentCompanyName,
    MostRecentCompanyTitle,
    MostRecentSchool,
    IsOpenToWork,
    IsHiring,
    IsHeadstarterAffiliated,
    FulltimeCount,
    InternshipCount,
];

pub const AFFILIATED_COLUMNS: &[ProfileColumn] = &[
    Id,
    Username,
    FirstName,
    LastName,
    City,
    Country,
    Headline,
    Summary,
    MostRecentCompanyName,
    MostRecentCompanyTitle,
    MostRecentSchool,
    IsOpenToWork,
    IsHiring,
    IsCreator,
    FulltimeCount,
    InternshipCount,
];

/// Shared `city`/`country`/`company` substring filters.
fn place_and_company(
    builder: DescriptorBuilder,
    city: &Option<String>,
    country: &Option<String>,
    company: Option<&Option<String>>,
) -> DescriptorBuilder {
    let builder = builder
        .filter_if(present(city), |v| Condition::contains(City, v))
        .filter_if(present(country), |v| Condition::contains(Country, v));
    match company {
        Some(company) => builder.filter_if(present(company), |v| {
            Condition::contains(MostRecentCompanyName, v)
        }),
        None => builder,
    }
}

/// Look up one profile by username or URN. The identifier is bound as given.
pub fn get_profile(input: &GetProfileInput) -> QueryDescriptor {
    let identifier = input.identifier.as_str();
    QueryDescriptor::select(&[])
        .filter(Predicate::AnyOf(vec![
            Condition::eq(Username, identifier),
            Condition::eq(Urn, identifier),
        ]))
        .order(OrderTerm::asc(Id))
        .limit(1)
}

pub fn search_profiles(input: &SearchProfilesInput, max_rows: u32) -> QueryDescriptor {
    let builder = QueryDescriptor::select(SEARCH_COLUMNS)
        .filter_if(input.is_open_to_work, |v| Condition::eq(IsOpenToWork, v))
        .filter_if(input.is_hiring, |v| Condition::eq(IsHiring, v))
        .filter_if(input.is_creator, |v| Condition::eq(IsCreator, v))
        .filter_if(input.is_affiliated, |v| {
            Condition::eq(IsHeadstarterAffiliated, v)
        });
    place_and_company(builder, &input.city, &input.country, Some(&input.company))
        .filter_if(present(&input.school), |v| {
            Condition::contains(MostRecentSchool, v)
        })
        .filter_if(input.min_fulltime_experience, |v| {
            Condition::gte(FulltimeCount, v)
        })
        .filter_if(input.min_internship_experience, |v| {
            Condition::gte(InternshipCount, v)
        })
        .order(OrderTerm::desc(Expr::TotalExperience))
        .order(OrderTerm::asc(LastName))
        .order(OrderTerm::asc(Id))
        .limit(effective_limit(input.limit, SEARCH_DEFAULT_LIMIT, max_rows))
}

/// Fails when neither city nor country is given.
pub fn profiles_by_location(input: &LocationInput, max_rows: u32) -> DbResult<QueryDescriptor> {
    let city = present(&input.city);
    let country = present(&input.country);
    if city.is_none() && country.is_none() {
        return Err(DbError::invalid_input(
            "Please provide at least one location parameter (city or country)",
        ));
    }

    let matcher = |col: ProfileColumn, value: &str| {
        if input.exact_match {
            Condition::eq(col, value)
        } else {
            Condition::contains(col, value)
        }
    };

    Ok(QueryDescriptor::select(LOCATION_COLUMNS)
        .filter_if(city, |v| matcher(City, v))
        .filter_if(country, |v| matcher(Country, v))
        .order(OrderTerm::asc(Country))
        .order(OrderTerm::asc(City))
        .order(OrderTerm::asc(LastName))
        .order(OrderTerm::asc(Id))
        .limit(effective_limit(input.limit, LOCATION_DEFAULT_LIMIT, max_rows)))
}

pub fn open_to_work_profiles(input: &OpenToWorkInput, max_rows: u32) -> QueryDescriptor {
    let builder =
        QueryDescriptor::select(OPEN_TO_WORK_COLUMNS).filter(Condition::eq(IsOpenToWork, true));
    place_and_company(builder, &input.city, &input.country, Some(&input.company))
        .filter_if(input.min_experience, |v| {
            Condition::gte(Expr::TotalExperience, v)
        })
        .order(OrderTerm::desc(Expr::TotalExperience))
        .order(OrderTerm::asc(LastName))
        .order(OrderTerm::asc(Id))
        .limit(effective_limit(
            input.limit,
            OPEN_TO_WORK_DEFAULT_LIMIT,
            max_rows,
        ))
}

pub fn hiring_profiles(input: &HiringInput, max_rows: u32) -> QueryDescriptor {
    let builder = QueryDescriptor::select(HIRING_COLUMNS).filter(Condition::eq(IsHiring, true));
    place_and_company(builder, &input.city, &input.country, Some(&input.company))
        .order(OrderTerm::asc(MostRecentCompanyName))
        .order(OrderTerm::asc(LastName))
        .order(OrderTerm::asc(Id))
        .limit(effective_limit(input.limit, HIRING_DEFAULT_LIMIT, max_rows))
}

pub fn creator_profiles(input: &CreatorInput, max_rows: u32) -> QueryDescriptor {
    let builder = QueryDescriptor::select(CREATOR_COLUMNS).filter(Condition::eq(IsCreator, true));
    place_and_company(builder, &input.city, &input.country, Some(&input.company))
        .filter_if(input.is_affiliated, |v| {
            Condition::eq(IsHeadstarterAffiliated, v)
        })
        .order(OrderTerm::asc(LastName))
        .order(OrderTerm::asc(Id))
        .limit(effective_limit(input.limit, CREATOR_DEFAULT_LIMIT, max_rows))
}

pub fn affiliated_profiles(input: &AffiliatedInput, max_rows: u32) -> QueryDescriptor {
    let builder = QueryDescriptor::select(AFFILIATED_COLUMNS)
        .filter(Condition::eq(IsHeadstarterAffiliated, true))
        .filter_if(input.is_open_to_work, |v| Condition::eq(IsOpenToWork, v))
        .filter_if(input.is_hiring, |v| Condition::eq(IsHiring, v))
        .filter_if(input.is_creator, |v| Condition::eq(IsCreator, v));
    place_and_company(builder, &input.city, &input.country, None)
        .order(OrderTerm::asc(LastName))
        .order(OrderTerm::asc(Id))
        .limit(effective_limit(
            input.limit,
            AFFILIATED_DEFAULT_LIMIT,
            max_rows,
        ))
}
