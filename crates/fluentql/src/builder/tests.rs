use super::*;
use crate::error::QbError;
use crate::row::Row;
use crate::testing::RecordingConnection;
use crate::value::Value;

fn keys(builder_bindings: &crate::value::Bindings) -> Vec<String> {
    let mut keys: Vec<String> = builder_bindings.keys().map(str::to_string).collect();
    keys.sort();
    keys
}

#[test]
fn test_simple_select() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users");
    assert_eq!(qb.to_sql(), "SELECT * FROM `users`");
}

#[test]
fn test_select_columns() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users").select("id, u.name as n").select(["email"]);
    assert_eq!(
        qb.to_sql(),
        "SELECT `id`, `u`.`name` AS `n`, `email` FROM `users`"
    );
}

#[test]
fn test_aggregate_projection() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("orders")
        .select("status")
        .select_count("id", Some("n"))
        .select_sum("total", None)
        .select_distinct("customer_id", Some("c"))
        .group_by("status");
    assert_eq!(
        qb.to_sql(),
        "SELECT `status`, COUNT(`id`) AS `n`, SUM(`total`), DISTINCT(`customer_id`) AS `c` \
         FROM `orders` GROUP BY `status`"
    );
}

#[test]
fn test_where_and_order() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users").and_where("id", 5).order_by("name");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `users` WHERE `id` = :wa1_id ORDER BY `name` ASC"
    );
    assert_eq!(qb.bindings().get(":wa1_id"), Some(&Value::Int(5)));
}

#[test]
fn test_raw_sql_substitutes_literals() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users").and_where("id", 5).order_by("name");
    assert_eq!(
        qb.to_raw_sql().unwrap(),
        "SELECT * FROM `users` WHERE `id` = 5 ORDER BY `name` ASC"
    );
    // rendering is a terminal operation but never reaches the connection
    assert!(conn.calls().is_empty());
    assert!(qb.bindings().is_empty());
}

#[test]
fn test_raw_sql_quotes_text_and_renders_null() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users")
        .and_where("name", "ada")
        .where_in("id", [1, 2])
        .or_where("deleted_at", Value::Null)
        .and_where("active", true);
    assert_eq!(
        qb.to_raw_sql().unwrap(),
        "SELECT * FROM `users` WHERE `name` = 'ada' AND `id` IN (1, 2) \
         OR `deleted_at` = NULL AND `active` = 1"
    );
}

#[test]
fn test_first_connector_is_dropped() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").or_where("a", 1);
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` WHERE `a` = :wo1_a");
}

#[test]
fn test_mixed_connectors_keep_call_order() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").and_where("a", 1).or_where("b", 2).and_where("c", 3);
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE `a` = :wa1_a OR `b` = :wo2_b AND `c` = :wa3_c"
    );
}

#[test]
fn test_operators() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t")
        .and_where_op("age", ">=", 18)
        .or_where_op("name", "like", "a%");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE `age` >= :wa1_age OR `name` LIKE :wo2_name"
    );
}

#[test]
fn test_unknown_operator_is_rejected_at_build() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").and_where_op("a", "= 1 OR 1 =", 1);
    assert!(matches!(qb.build(BuildMode::SelectAll), Err(QbError::Validation(_))));

    let err = qb.get().unwrap_err();
    assert!(matches!(err, QbError::Validation(_)));
    assert!(conn.calls().is_empty());
    // rejected statements still reset the builder
    assert_eq!(qb.to_sql(), "SELECT * FROM ");
}

#[test]
fn test_grouped_where() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users")
        .and_where("status", "active")
        .where_group(|g| {
            g.and_where_op("age", ">=", 18).or_where("role", "admin");
        });
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `users` WHERE `status` = :wa1_status \
         AND (`age` >= :wa2_age OR `role` = :wo3_role)"
    );
    assert_eq!(qb.bindings().len(), 3);
    assert_eq!(qb.counter().current(), 3);
}

#[test]
fn test_or_group_and_nesting() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").and_where("a", 1).or_where_group(|g| {
        g.and_where("b", 2).where_group(|inner| {
            inner.and_where("c", 3).or_where("d", 4);
        });
    });
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE `a` = :wa1_a \
         OR (`b` = :wa2_b AND (`c` = :wa3_c OR `d` = :wo4_d))"
    );
}

#[test]
fn test_empty_group_adds_nothing() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").and_where("a", 1).where_group(|_| {});
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` WHERE `a` = :wa1_a");
}

#[test]
fn test_where_in_and_not_in() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t")
        .where_in("id", [1, 2, 3])
        .or_where_not_in("status", ["x"]);
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE `id` IN (:wi1_id, :wi2_id, :wi3_id) \
         OR `status` NOT IN (:wni4_status)"
    );
    assert_eq!(qb.bindings().len(), 4);
}

#[test]
fn test_empty_in_binds_nothing() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").where_in("id", Vec::<i64>::new());
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` WHERE `id` IN ()");
    assert!(qb.bindings().is_empty());
}

#[test]
fn test_between() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t")
        .where_between("age", 18, 30)
        .or_where_between("score", 1.5, 2.5);
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE `age` BETWEEN :wbs1_age AND :wbe2_age \
         OR `score` BETWEEN :wbs3_score AND :wbe4_score"
    );
    let bindings = qb.bindings();
    assert_eq!(bindings.len(), 4);
    assert_eq!(bindings.get(":wbs1_age"), Some(&Value::Int(18)));
    assert_eq!(bindings.get(":wbe2_age"), Some(&Value::Int(30)));
    assert_eq!(bindings.get(":wbs3_score"), Some(&Value::Float(1.5)));
    assert_eq!(bindings.get(":wbe4_score"), Some(&Value::Float(2.5)));
}

#[test]
fn test_null_checks() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t")
        .is_null("deleted_at")
        .or_is_not_null("archived_at")
        .is_not_null("email")
        .or_is_null("phone");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE `deleted_at` IS NULL OR `archived_at` IS NOT NULL \
         AND `email` IS NOT NULL OR `phone` IS NULL"
    );
    assert!(qb.bindings().is_empty());
}

#[test]
fn test_raw_predicates() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t")
        .where_raw("score > 10")
        .or_where_raw("vip = 1")
        .where_raw_bind("age > ? AND age < ?", [18, 65]);
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` WHERE score > 10 OR vip = 1 \
         AND age > :wr1_raw AND age < :wr2_raw"
    );
    assert_eq!(qb.bindings().get(":wr2_raw"), Some(&Value::Int(65)));
}

#[test]
fn test_raw_bind_mismatch() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").or_where_raw_bind("a = ? OR b = ?", [1]);
    assert_eq!(qb.to_sql(), "SELECT * FROM `t`");
    assert!(matches!(qb.get(), Err(QbError::Validation(_))));
}

#[test]
fn test_raw_bind_renders_literals() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    let values: Vec<i64> = (1..=12).collect();
    let template = vec!["n = ?"; 12].join(" OR ");
    qb.table("t").where_raw_bind(&template, values);
    let expected = (1..=12)
        .map(|n| format!("n = {n}"))
        .collect::<Vec<_>>()
        .join(" OR ");
    assert_eq!(
        qb.to_raw_sql().unwrap(),
        format!("SELECT * FROM `t` WHERE {expected}")
    );
}

#[test]
fn test_subquery_shares_counter() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users")
        .and_where("active", true)
        .where_sub("id", SubqueryOp::In, |s| {
            s.table("orders").select("user_id").and_where_op("total", ">", 100);
        })
        .and_where("name", "x");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `users` WHERE `active` = :wa1_active \
         AND `id` IN (SELECT `user_id` FROM `orders` WHERE `total` > :wa2_total) \
         AND `name` = :wa3_name"
    );
    assert_eq!(
        keys(qb.bindings()),
        vec![":wa1_active", ":wa2_total", ":wa3_name"]
    );
}

#[test]
fn test_subquery_same_column_never_collides() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("a")
        .and_where("id", 1)
        .or_where_sub("id", SubqueryOp::Eq, |s| {
            s.table("b").select("id").and_where("id", 2).where_sub(
                "id",
                SubqueryOp::NotIn,
                |inner| {
                    inner.table("c").select("id").and_where("id", 3);
                },
            );
        })
        .and_where("id", 4);
    let built = qb.build(BuildMode::SelectAll).unwrap();
    assert_eq!(
        built.sql(),
        "SELECT * FROM `a` WHERE `id` = :wa1_id \
         OR `id` = (SELECT `id` FROM `b` WHERE `id` = :wa2_id \
         AND `id` NOT IN (SELECT `id` FROM `c` WHERE `id` = :wa3_id)) \
         AND `id` = :wa4_id"
    );
    assert_eq!(built.bindings().len(), 4);
}

#[test]
fn test_subquery_literals() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users").where_sub("id", SubqueryOp::Ne, |s| {
        s.table("bans").select("user_id").and_where("reason", "spam").limit(1);
    });
    assert_eq!(
        qb.to_raw_sql().unwrap(),
        "SELECT * FROM `users` WHERE `id` != \
         (SELECT `user_id` FROM `bans` WHERE `reason` = 'spam' LIMIT 1)"
    );
}

#[test]
fn test_raw_subquery() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users")
        .where_sub_raw("id", SubqueryOp::In, "SELECT user_id FROM admins")
        .or_where_sub_raw("id", SubqueryOp::NotIn, "SELECT user_id FROM bans");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `users` WHERE `id` IN (SELECT user_id FROM admins) \
         OR `id` NOT IN (SELECT user_id FROM bans)"
    );
}

#[test]
fn test_subquery_without_table() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users").where_sub("id", SubqueryOp::In, |s| {
        s.select("id");
    });
    assert!(matches!(qb.get(), Err(QbError::MissingTable)));
    assert!(conn.calls().is_empty());
}

#[test]
fn test_joins() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users")
        .left_join("roles", "id", "role_id")
        .inner_join("teams", "id", "team_id");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `users` LEFT JOIN `roles` ON `users`.`role_id` = `roles`.`id` \
         INNER JOIN `teams` ON `users`.`team_id` = `teams`.`id`"
    );
}

#[test]
fn test_join_kinds_and_aliases() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users as u")
        .join("roles as r", "id", "role_id")
        .right_join("a", "x", "y")
        .cross_join("b", "x", "y")
        .outer_join("c", "x", "y");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `users` AS `u` JOIN `roles` AS `r` ON `u`.`role_id` = `r`.`id` \
         RIGHT JOIN `a` ON `u`.`y` = `a`.`x` \
         CROSS JOIN `b` ON `u`.`y` = `b`.`x` \
         OUTER JOIN `c` ON `u`.`y` = `c`.`x`"
    );
}

#[test]
fn test_join_before_table() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.join("roles", "id", "role_id").table("users");
    assert!(matches!(qb.build(BuildMode::SelectAll), Err(QbError::Validation(_))));
}

#[test]
fn test_order_directions() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t")
        .order_by("a")
        .order_by_desc("b")
        .order_by_dir("c", "desc");
    assert_eq!(
        qb.to_sql(),
        "SELECT * FROM `t` ORDER BY `a` ASC, `b` DESC, `c` DESC"
    );

    qb.order_by_dir("d", "sideways");
    assert!(matches!(qb.build(BuildMode::SelectAll), Err(QbError::Validation(_))));
}

#[test]
fn test_limit_forms() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").limit(10);
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` LIMIT 10");
    qb.offset(20);
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` LIMIT 20, 10");
    qb.limit_range(5, 15);
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` LIMIT 5, 15");
}

#[test]
fn test_offset_without_limit() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").offset(5);
    assert_eq!(qb.to_sql(), "SELECT * FROM `t` LIMIT 5, 9223372036854775807");
}

#[test]
fn test_build_modes() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").and_where("a", 1).order_by("a").limit(10);

    let sql = |mode| qb.build(mode).unwrap().sql().to_string();
    assert_eq!(
        sql(BuildMode::SelectAll),
        "SELECT * FROM `t` WHERE `a` = :wa1_a ORDER BY `a` ASC LIMIT 10"
    );
    assert_eq!(
        sql(BuildMode::SelectSingle),
        "SELECT * FROM `t` WHERE `a` = :wa1_a ORDER BY `a` ASC LIMIT 1"
    );
    assert_eq!(
        sql(BuildMode::Count),
        "SELECT COUNT(*) as aggregate FROM `t` WHERE `a` = :wa1_a ORDER BY `a` ASC"
    );
    assert_eq!(
        sql(BuildMode::Delete),
        "DELETE FROM `t` WHERE `a` = :wa1_a ORDER BY `a` ASC LIMIT 10"
    );
    assert!(matches!(qb.build(BuildMode::Update), Err(QbError::Validation(_))));
}

#[test]
fn test_build_is_pure() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("t").and_where("a", 1);
    let first = qb.build(BuildMode::SelectAll).unwrap();
    let second = qb.build(BuildMode::SelectAll).unwrap();
    assert_eq!(first, second);
    assert_eq!(qb.counter().current(), 1);
}

#[test]
fn test_missing_table() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.and_where("a", 1);
    assert!(matches!(qb.get(), Err(QbError::MissingTable)));
    assert!(matches!(qb.to_raw_sql(), Err(QbError::MissingTable)));
    assert!(matches!(qb.all("*"), Err(QbError::MissingTable)));
    assert!(conn.calls().is_empty());
}

#[test]
fn test_get_executes_and_resets() {
    let rows = vec![Row::from_pairs([("id", 1)]), Row::from_pairs([("id", 2)])];
    let conn = RecordingConnection::with_rows(rows.clone());
    let mut qb = QueryBuilder::new(&conn);

    let got = qb.table("a").and_where("x", 1).limit(5).get().unwrap();
    assert_eq!(got, rows);
    assert_eq!(conn.last_sql(), "SELECT * FROM `a` WHERE `x` = :wa1_x LIMIT 5");
    assert_eq!(keys(&conn.last_bindings()), vec![":wa1_x"]);

    // no clause, binding or counter value survives into the next statement
    assert!(qb.bindings().is_empty());
    assert_eq!(qb.counter().current(), 0);
    qb.table("b").and_where("y", 2).get().unwrap();
    assert_eq!(conn.last_sql(), "SELECT * FROM `b` WHERE `y` = :wa1_y");
    assert_eq!(keys(&conn.last_bindings()), vec![":wa1_y"]);
}

#[test]
fn test_reset_after_failure() {
    let conn = RecordingConnection::failing("server gone");
    let mut qb = QueryBuilder::new(&conn);
    let err = qb.table("a").and_where("x", 1).get().unwrap_err();
    assert!(matches!(err, QbError::Connection(ref m) if m == "server gone"));
    assert!(qb.bindings().is_empty());
    assert_eq!(qb.to_sql(), "SELECT * FROM ");
}

#[test]
fn test_first_and_scalar() {
    let rows = vec![Row::from_pairs([("name", "ada"), ("role", "admin")])];
    let conn = RecordingConnection::with_rows(rows.clone());
    let mut qb = QueryBuilder::new(&conn);

    let row = qb.table("users").limit(10).first().unwrap();
    assert_eq!(row, Some(rows[0].clone()));
    assert_eq!(conn.last_sql(), "SELECT * FROM `users` LIMIT 1");

    let value = qb.table("users").select("name").scalar().unwrap();
    assert_eq!(value, Some(Value::from("ada")));
    assert_eq!(conn.last_sql(), "SELECT `name` FROM `users`");
}

#[test]
fn test_count() {
    let conn = RecordingConnection::with_rows(vec![Row::from_pairs([("aggregate", 42)])]);
    let mut qb = QueryBuilder::new(&conn);
    let n = qb.table("users").and_where("active", 1).limit(3).count().unwrap();
    assert_eq!(n, 42);
    assert_eq!(
        conn.last_sql(),
        "SELECT COUNT(*) as aggregate FROM `users` WHERE `active` = :wa1_active"
    );
}

#[test]
fn test_insert() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    let id = qb
        .table("users")
        .insert([("name", Value::from("ada")), ("age", Value::from(36))])
        .unwrap();
    assert_eq!(id, Value::Int(1));
    assert_eq!(
        conn.last_sql(),
        "INSERT INTO `users` (`name`, `age`) VALUES (:ins1_name, :ins2_age)"
    );
    assert_eq!(conn.last_bindings().get(":ins2_age"), Some(&Value::Int(36)));
}

#[test]
fn test_insert_discards_where_bindings() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users")
        .and_where("id", 1)
        .where_in("role", ["a", "b"])
        .insert([("name", "x")])
        .unwrap();
    assert_eq!(
        conn.last_sql(),
        "INSERT INTO `users` (`name`) VALUES (:ins1_name)"
    );
    let bindings = conn.last_bindings();
    assert_eq!(bindings.keys().collect::<Vec<_>>(), [":ins1_name"]);
}

#[test]
fn test_insert_reports_pending_misuse() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    let err = qb
        .table("users")
        .and_where_op("id", "~~", 1)
        .insert([("name", "x")])
        .unwrap_err();
    assert!(matches!(err, QbError::Validation(_)));
    assert!(conn.calls().is_empty());
}

#[test]
fn test_insert_requires_values() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    let err = qb
        .table("users")
        .insert(Vec::<(&str, Value)>::new())
        .unwrap_err();
    assert!(matches!(err, QbError::Validation(_)));
    assert!(conn.calls().is_empty());
}

#[test]
fn test_update() {
    let conn = RecordingConnection::with_affected(1);
    let mut qb = QueryBuilder::new(&conn);
    let ok = qb
        .table("users")
        .and_where("id", 5)
        .update([("name", Value::from("bob")), ("age", Value::from(30))])
        .unwrap();
    assert!(ok);
    assert_eq!(
        conn.last_sql(),
        "UPDATE `users` SET `name` = :upt2_name, `age` = :upt3_age WHERE `id` = :wa1_id"
    );
    assert_eq!(
        keys(&conn.last_bindings()),
        vec![":upt2_name", ":upt3_age", ":wa1_id"]
    );
}

#[test]
fn test_update_requires_values() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    let err = qb
        .table("users")
        .and_where("id", 5)
        .update(Vec::<(&str, Value)>::new())
        .unwrap_err();
    assert!(matches!(err, QbError::Validation(_)));
    assert!(qb.bindings().is_empty());
}

#[test]
fn test_delete() {
    let conn = RecordingConnection::with_affected(3);
    let mut qb = QueryBuilder::new(&conn);
    let n = qb.table("users").where_in("id", [1, 2, 3]).delete().unwrap();
    assert_eq!(n, 3);
    assert_eq!(
        conn.last_sql(),
        "DELETE FROM `users` WHERE `id` IN (:wi1_id, :wi2_id, :wi3_id)"
    );
}

#[test]
fn test_all_ignores_clauses() {
    let conn = RecordingConnection::new();
    let mut qb = QueryBuilder::new(&conn);
    qb.table("users").and_where("id", 5).limit(1);
    qb.all(["id", "name"]).unwrap();
    assert_eq!(conn.last_sql(), "SELECT `id`, `name` FROM `users`");
    assert!(conn.last_bindings().is_empty());

    qb.table("users").all("").unwrap();
    assert_eq!(conn.last_sql(), "SELECT * FROM `users`");
}

#[test]
fn test_pass_through() {
    let conn = RecordingConnection::with_affected(2);
    let qb = QueryBuilder::new(&conn);
    assert_eq!(qb.exec_raw("DELETE FROM logs").unwrap(), 2);
    qb.raw_query("SELECT 1").unwrap();
    assert_eq!(conn.last_sql(), "SELECT 1");

    let mut bindings = crate::value::Bindings::new();
    bindings.bind(":id", 7).unwrap();
    let result = qb.raw_execute("DELETE FROM t WHERE id = :id", &bindings).unwrap();
    assert_eq!(result.affected_row_count(), 2);
    assert_eq!(conn.last_bindings(), bindings);
}

#[test]
fn test_builder_over_trait_object() {
    let conn = RecordingConnection::new();
    let dyn_conn: &dyn crate::client::Connection = &conn;
    let mut qb = QueryBuilder::new(dyn_conn);
    qb.table("t").and_where("a", 1).get().unwrap();
    assert_eq!(conn.last_sql(), "SELECT * FROM `t` WHERE `a` = :wa1_a");
}
