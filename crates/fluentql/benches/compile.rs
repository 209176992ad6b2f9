use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fluentql::{
    BuildMode, Bindings, Connection, ExecutionResult, QbResult, QueryBuilder, Row, SubqueryOp,
    Value,
};

/// Connection that never runs anything; compilation is all that is measured.
struct NullConnection;

impl Connection for NullConnection {
    fn query(&self, _: &str) -> QbResult<Vec<Row>> {
        Ok(Vec::new())
    }
    fn exec(&self, _: &str) -> QbResult<u64> {
        Ok(0)
    }
    fn execute(&self, _: &str, _: &Bindings) -> QbResult<ExecutionResult> {
        Ok(ExecutionResult::default())
    }
    fn last_insert_id(&self) -> QbResult<Value> {
        Ok(Value::Null)
    }
}

/// SELECT with `n` AND-ed comparisons.
fn flat_where(qb: &mut QueryBuilder<'_, NullConnection>, n: usize) {
    qb.table("t");
    for i in 0..n {
        qb.and_where(&format!("col{i}"), i as i64);
    }
}

fn bench_flat_where(c: &mut Criterion) {
    let conn = NullConnection;
    let mut group = c.benchmark_group("compile/flat_where");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut qb = QueryBuilder::new(&conn);
                flat_where(&mut qb, n);
                black_box(qb.build(BuildMode::SelectAll).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_where_in(c: &mut Criterion) {
    let conn = NullConnection;
    let mut group = c.benchmark_group("compile/where_in");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut qb = QueryBuilder::new(&conn);
                qb.table("t").where_in("id", values.iter().copied());
                black_box(qb.build(BuildMode::SelectAll).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_nested_subqueries(c: &mut Criterion) {
    let conn = NullConnection;
    let mut group = c.benchmark_group("compile/nested");

    group.bench_function("group_and_subquery", |b| {
        b.iter(|| {
            let mut qb = QueryBuilder::new(&conn);
            qb.table("users")
                .and_where("status", "active")
                .where_group(|g| {
                    g.and_where_op("age", ">=", 18).or_where("role", "admin");
                })
                .where_sub("id", SubqueryOp::In, |s| {
                    s.table("orders")
                        .select("user_id")
                        .where_between("total", 10, 500)
                        .where_sub("region_id", SubqueryOp::NotIn, |r| {
                            r.table("regions").select("id").is_null("closed_at");
                        });
                })
                .order_by_desc("created_at")
                .limit(20);
            black_box(qb.build(BuildMode::SelectAll).unwrap());
        });
    });

    group.bench_function("to_raw_sql", |b| {
        b.iter(|| {
            let mut qb = QueryBuilder::new(&conn);
            flat_where(&mut qb, 20);
            black_box(qb.to_raw_sql().unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_flat_where,
    bench_where_in,
    bench_nested_subqueries
);
criterion_main!(benches);
