//! Randomized tests for the raw-SQL guard and the query builder.
//!
//! Random non-SELECT statements must never reach the database, and random
//! filter combinations must always render to well-formed, fully bound SQL.

use profile_network_mcp::context::ServerContext;
use profile_network_mcp::db::{ProfileExecutor, RowSet};
use profile_network_mcp::error::DbResult;
use profile_network_mcp::models::{
    MAX_ROW_LIMIT, ProfileColumn, SqlDialect, Statement, TableName,
};
use profile_network_mcp::query::builder;
use profile_network_mcp::query::{
    AffiliatedInput, Condition, CreatorInput, OpenToWorkInput, OrderTerm, Predicate, RawQueryInput,
    SearchProfilesInput,
};
use profile_network_mcp::tools::ProfileToolHandler;
use profile_network_mcp::tools::guard::guard_raw_query;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const ITERATIONS: usize = 500;

/// Executor that only counts round trips.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ProfileExecutor for Counting {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    async fn fetch(&self, _statement: &Statement) -> DbResult<RowSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RowSet::empty())
    }
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Strings that must only ever travel as bind values.
fn hostile_string() -> String {
    let pieces = [
        "'",
        "\"",
        ";",
        "--",
        "%",
        "_",
        "\\",
        " OR 1=1",
        "DROP TABLE x",
        "é",
        "\u{0}",
    ];
    let mut rng = rand::thread_rng();
    let mut s = random_string(rng.gen_range(0..6));
    for _ in 0..rng.gen_range(1..5) {
        s.push_str(pieces.choose(&mut rng).copied().unwrap_or("'"));
        s.push_str(&random_string(rng.gen_range(0..4)));
    }
    s
}

fn maybe<T>(rng: &mut impl Rng, value: impl FnOnce() -> T) -> Option<T> {
    if rng.gen_bool(0.5) { Some(value()) } else { None }
}

fn randomize_case(s: &str) -> String {
    let mut rng = rand::thread_rng();
    s.chars()
        .map(|c| {
            if rng.gen_bool(0.5) {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

fn count_placeholders(sql: &str, dialect: SqlDialect) -> usize {
    match dialect {
        SqlDialect::Sqlite => sql.matches('?').count(),
        SqlDialect::Postgres => {
            let bytes = sql.as_bytes();
            (0..bytes.len())
                .filter(|&i| {
                    bytes[i] == b'$' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
                })
                .count()
        }
    }
}

#[tokio::test]
async fn fuzz_non_select_never_reaches_database() {
    let exec = Arc::new(Counting::default());
    let ctx = Arc::new(ServerContext::new(exec.clone(), TableName::default()));
    let handler = ProfileToolHandler::new(ctx);

    let verbs = [
        "DELETE", "UPDATE", "INSERT", "DROP", "ALTER", "TRUNCATE", "CREATE", "GRANT", "WITH",
        "EXPLAIN", "PRAGMA", "VACUUM", "COPY", "CALL", "(", "--", "/*", "",
    ];
    let mut rng = rand::thread_rng();

    for _ in 0..ITERATIONS {
        let verb = randomize_case(verbs.choose(&mut rng).copied().unwrap_or("DELETE"));
        let padding = " ".repeat(rng.gen_range(0..3));
        let query = format!("{}{} {} select", padding, verb, hostile_string());
        let result = handler
            .raw_query(RawQueryInput {
                query: query.clone(),
                limit: maybe(&mut rng, || rng_limit()),
            })
            .await;
        assert_eq!(result.is_error, Some(true), "accepted {query:?}");
    }

    assert_eq!(exec.calls.load(Ordering::SeqCst), 0);
}

fn rng_limit() -> u32 {
    rand::thread_rng().gen_range(0..5000)
}

#[test]
fn fuzz_select_prefix_accepted_in_any_case() {
    for _ in 0..ITERATIONS {
        let query = format!(
            "  {} id FROM t WHERE city = '{}'  ",
            randomize_case("select"),
            random_string(8)
        );
        let guarded = guard_raw_query(&query, 100, None).unwrap();
        assert!(guarded.sql.ends_with(" LIMIT 100"));
        assert_eq!(guarded.sql.trim(), guarded.sql);
    }
}

#[test]
fn fuzz_search_filters_render_consistently() {
    let mut rng = rand::thread_rng();
    let table = TableName::default();

    for _ in 0..ITERATIONS {
        let input = SearchProfilesInput {
            is_open_to_work: maybe(&mut rng, || rand::random()),
            is_hiring: maybe(&mut rng, || rand::random()),
            is_creator: maybe(&mut rng, || rand::random()),
            is_affiliated: maybe(&mut rng, || rand::random()),
            city: maybe(&mut rng, hostile_string),
            country: maybe(&mut rng, hostile_string),
            company: maybe(&mut rng, hostile_string),
            school: maybe(&mut rng, hostile_string),
            min_fulltime_experience: maybe(&mut rng, || rand::random::<u32>() % 20),
            min_internship_experience: maybe(&mut rng, || rand::random::<u32>() % 20),
            limit: maybe(&mut rng, rng_limit),
        };

        let expected_filters = [
            input.is_open_to_work.is_some(),
            input.is_hiring.is_some(),
            input.is_creator.is_some(),
            input.is_affiliated.is_some(),
            present(&input.city),
            present(&input.country),
            present(&input.company),
            present(&input.school),
            input.min_fulltime_experience.is_some(),
            input.min_internship_experience.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count();

        let descriptor = builder::search_profiles(&input, MAX_ROW_LIMIT);
        assert_eq!(descriptor.predicates().len(), expected_filters);
        assert!((1..=MAX_ROW_LIMIT).contains(&descriptor.limit()));

        for dialect in [SqlDialect::Postgres, SqlDialect::Sqlite] {
            let stmt = descriptor.render(&table, dialect);
            assert_eq!(count_placeholders(&stmt.sql, dialect), stmt.params.len());
            assert_eq!(stmt.params.len(), expected_filters);
            assert!(stmt.sql.ends_with(&format!("LIMIT {}", descriptor.limit())));
            assert!(!stmt.sql.contains("DROP"), "value leaked into SQL: {}", stmt.sql);
            assert!(!stmt.sql.contains("1=1"), "value leaked into SQL: {}", stmt.sql);
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

#[test]
fn fuzz_fixed_base_predicates_always_first() {
    let mut rng = rand::thread_rng();

    for _ in 0..ITERATIONS {
        let open = builder::open_to_work_profiles(
            &OpenToWorkInput {
                city: maybe(&mut rng, hostile_string),
                country: maybe(&mut rng, hostile_string),
                company: maybe(&mut rng, hostile_string),
                min_experience: maybe(&mut rng, || rand::random::<u32>() % 10),
                limit: maybe(&mut rng, rng_limit),
            },
            MAX_ROW_LIMIT,
        );
        let creator = builder::creator_profiles(
            &CreatorInput {
                city: maybe(&mut rng, hostile_string),
                is_affiliated: maybe(&mut rng, || rand::random()),
                limit: maybe(&mut rng, rng_limit),
                ..Default::default()
            },
            MAX_ROW_LIMIT,
        );
        let affiliated = builder::affiliated_profiles(
            &AffiliatedInput {
                is_open_to_work: maybe(&mut rng, || rand::random()),
                country: maybe(&mut rng, hostile_string),
                limit: maybe(&mut rng, rng_limit),
                ..Default::default()
            },
            MAX_ROW_LIMIT,
        );

        for (descriptor, column) in [
            (&open, ProfileColumn::IsOpenToWork),
            (&creator, ProfileColumn::IsCreator),
            (&affiliated, ProfileColumn::IsHeadstarterAffiliated),
        ] {
            assert_eq!(
                descriptor.predicates().first(),
                Some(&Predicate::Match(Condition::eq(column, true)))
            );
            assert_eq!(
                descriptor.order_by().last(),
                Some(&OrderTerm::asc(ProfileColumn::Id))
            );
        }
    }
}
