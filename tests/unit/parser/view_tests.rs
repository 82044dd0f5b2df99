//! CREATE VIEW extraction tests

use rust_sqlgraph::parser::canonicalize;
use rust_sqlgraph::{SqlObject, SqlObjectKind};

use super::{callees, parse, sorted_callees};

#[test]
fn test_union_branches_deduplicated() {
    let result = parse("CREATE VIEW V AS SELECT * FROM A UNION SELECT * FROM A");

    assert_eq!(result.definition, SqlObject::new("V", SqlObjectKind::View));
    assert_eq!(result.edges.len(), 1);
    assert_eq!(
        result.edges[0].callee,
        SqlObject::new("A", SqlObjectKind::Table)
    );
}

#[test]
fn test_referenced_view_reported_as_table() {
    let result = parse("CREATE VIEW dbo.V2 AS SELECT * FROM dbo.V1");
    assert_eq!(callees(&result, SqlObjectKind::Table), vec!["dbo.V1"]);
    assert!(result.callees_of_kind(SqlObjectKind::View).is_empty());
}

#[test]
fn test_cte_chain_names_are_not_tables() {
    let sql = r#"
CREATE VIEW dbo.RecentOrders
AS
WITH recent AS (
    SELECT * FROM dbo.Orders WHERE CreatedAt > DATEADD(day, -7, GETDATE())
), totals (OrderId, Total) AS (
    SELECT r.Id, SUM(l.Amount)
    FROM recent r
    JOIN dbo.OrderLines l ON l.OrderId = r.Id
    GROUP BY r.Id
)
SELECT * FROM totals
"#;
    let result = parse(sql);
    assert_eq!(sorted_callees(&result), vec!["dbo.OrderLines", "dbo.Orders"]);
    assert!(result.callees_of_kind(SqlObjectKind::UserFunction).is_empty());
}

#[test]
fn test_derived_table_alias_is_not_a_table() {
    let sql = r#"
CREATE VIEW dbo.TopCustomers
AS
SELECT x.CustomerId
FROM (
    SELECT CustomerId, COUNT(*) AS N
    FROM dbo.Orders
    GROUP BY CustomerId
) AS x
WHERE x.N > 10
"#;
    let result = parse(sql);
    assert_eq!(result.callee_names(), vec!["dbo.Orders"]);
}

#[test]
fn test_quoted_names_keep_their_spelling() {
    let sql = r#"
CREATE VIEW [Sales].[Order Details]
AS
SELECT *
FROM "Sales"."Orders"
JOIN [Sales].[Line Items] li ON li.OrderId = 1
"#;
    let result = parse(sql);

    assert_eq!(result.definition.name, "[Sales].[Order Details]");
    assert_eq!(
        canonicalize(&result.definition.name),
        "Sales.Order Details"
    );
    assert_eq!(
        callees(&result, SqlObjectKind::Table),
        vec!["\"Sales\".\"Orders\"", "[Sales].[Line Items]"]
    );
}

#[test]
fn test_table_qualifying_its_own_columns() {
    let result = parse("CREATE VIEW dbo.Names AS SELECT Customers.Name FROM Customers");
    assert_eq!(callees(&result, SqlObjectKind::Table), vec!["Customers"]);
}

#[test]
fn test_type_parameters_are_not_calls() {
    let sql = r#"
CREATE VIEW dbo.Casted
AS
SELECT CAST(Code AS NVARCHAR(10)) AS Code,
       CONVERT(DECIMAL(18, 2), Amount) AS Amount
FROM dbo.Prices
"#;
    let result = parse(sql);
    assert_eq!(result.callee_names(), vec!["dbo.Prices"]);
}

#[test]
fn test_table_hint_is_not_a_cte() {
    let sql = "CREATE VIEW dbo.Dirty AS SELECT * FROM dbo.Orders WITH (NOLOCK)";
    let result = parse(sql);
    assert_eq!(result.callee_names(), vec!["dbo.Orders"]);
}

#[test]
fn test_within_group_is_not_a_call() {
    let sql = r#"
CREATE VIEW dbo.TagList
AS
SELECT STRING_AGG(Name, ',') WITHIN GROUP (ORDER BY Name) AS Names
FROM dbo.Tag
"#;
    let result = parse(sql);
    assert_eq!(result.callee_names(), vec!["dbo.Tag"]);
}

#[test]
fn test_pivot_and_unpivot_are_not_calls() {
    let sql = r#"
CREATE VIEW dbo.Pivoted
AS
SELECT p.[a], p.[b]
FROM (SELECT k, v FROM dbo.Src) AS s
PIVOT (SUM(v) FOR k IN ([a], [b])) AS p
UNION ALL
SELECT u.k, u.v
FROM dbo.Wide
UNPIVOT (v FOR k IN ([a], [b])) AS u
"#;
    let result = parse(sql);
    assert_eq!(sorted_callees(&result), vec!["dbo.Src", "dbo.Wide"]);
}
