//! Integration tests for the scan workflow

use std::fs;

use pretty_assertions::assert_eq;
use rust_sqlgraph::{OutputFormat, SqlObject, SqlObjectKind};

use crate::common::TestContext;

// ============================================================================
// Fixture scans
// ============================================================================

#[test]
fn test_scan_sales_db() {
    let ctx = TestContext::with_fixture("sales_db");
    let report = ctx.scan_successfully(&ctx.options(OutputFormat::Text));

    let files: Vec<String> = report.scripts.iter().map(|s| ctx.relative(&s.path)).collect();
    assert_eq!(
        files,
        vec![
            "Functions/FormatMoney.sql",
            "Procedures/NotifyCustomer.sql",
            "Procedures/ProcessOrders.sql",
            "Scripts/PostDeploy.sql",
            "Tables/Customers.sql",
            "Tables/OrderAudit.sql",
            "Tables/Orders.sql",
            "Triggers/OrdersAudit.sql",
            "Views/CustomerTotals.sql",
        ],
        "bin/ output must be skipped and files sorted"
    );

    assert_eq!(report.definitions().count(), 8);
    assert_eq!(report.edges().count(), 7);

    let unresolved: Vec<String> = report.unresolved().map(|s| ctx.relative(&s.path)).collect();
    assert_eq!(unresolved, vec!["Scripts/PostDeploy.sql"]);
}

#[test]
fn test_scan_sales_db_edges() {
    let ctx = TestContext::with_fixture("sales_db");
    let report = ctx.scan_successfully(&ctx.options(OutputFormat::Text));

    let edges: Vec<String> = report
        .edges()
        .map(|e| format!("{} -> {}", e.caller, e.callee))
        .collect();
    assert_eq!(
        edges,
        vec![
            "dbo.NotifyCustomer [StoredProcedure] -> dbo.Customers [Table]",
            "[dbo].[ProcessOrders] [StoredProcedure] -> dbo.NotifyCustomer [StoredProcedure]",
            "[dbo].[ProcessOrders] [StoredProcedure] -> dbo.Orders [Table]",
            "dbo.trg_Orders_Audit [Trigger] -> dbo.OrderAudit [Table]",
            "[dbo].[CustomerTotals] [View] -> dbo.FormatMoney [UserFunction]",
            "[dbo].[CustomerTotals] [View] -> [dbo].[Customers] [Table]",
            "[dbo].[CustomerTotals] [View] -> [dbo].[Orders] [Table]",
        ]
    );
}

#[test]
fn test_scan_writes_text_report() {
    let ctx = TestContext::with_fixture("sales_db");
    let options = ctx.options(OutputFormat::Text);
    ctx.scan_successfully(&options);

    let output_path = options.output_path.as_ref().unwrap();
    let text = fs::read_to_string(output_path).expect("Report should be written");

    assert!(text.contains("dbo.trg_Orders_Audit [Trigger] -> dbo.OrderAudit [Table]"));
    assert!(text.contains("[dbo].[Customers] [Table]\n"));
    assert!(text.contains("PostDeploy.sql: no definition"));
    assert!(!text.contains("ShouldNotBeScanned"));
}

#[test]
fn test_scan_writes_json_report() {
    let ctx = TestContext::with_fixture("sales_db");
    let options = ctx.options(OutputFormat::Json);
    ctx.scan_successfully(&options);

    let output_path = options.output_path.as_ref().unwrap();
    let json = fs::read_to_string(output_path).expect("Report should be written");
    let value: serde_json::Value = serde_json::from_str(&json).expect("Report should be JSON");

    let entries = value.as_array().expect("Report should be an array");
    assert_eq!(entries.len(), 9);

    let post_deploy = entries
        .iter()
        .find(|e| e["file"].as_str().unwrap().ends_with("PostDeploy.sql"))
        .unwrap();
    assert!(post_deploy["definition"].is_null());

    let process_orders = entries
        .iter()
        .find(|e| e["definition"]["name"] == "[dbo].[ProcessOrders]")
        .unwrap();
    assert_eq!(process_orders["definition"]["kind"], "StoredProcedure");
    assert_eq!(process_orders["edges"].as_array().unwrap().len(), 2);
    assert_eq!(
        process_orders["edges"][0]["callee"]["name"],
        "dbo.NotifyCustomer"
    );
}

#[test]
fn test_scan_with_exclusions() {
    let ctx = TestContext::with_fixture("sales_db");
    let mut options = ctx.options(OutputFormat::Text);
    options.exclude = vec!["Scripts/*".to_string(), "Tables/*".to_string()];

    let report = ctx.scan_successfully(&options);
    assert_eq!(report.scripts.len(), 5);
    assert_eq!(report.unresolved().count(), 0);
}

#[test]
fn test_scan_single_file() {
    let ctx = TestContext::with_fixture("sales_db");
    let mut options = ctx.options(OutputFormat::Text);
    options.input_path = ctx.project_dir.join("Procedures").join("ProcessOrders.sql");

    let report = ctx.scan_successfully(&options);
    assert_eq!(report.scripts.len(), 1);
    assert_eq!(
        report.definitions().next(),
        Some(&SqlObject::new(
            "[dbo].[ProcessOrders]",
            SqlObjectKind::StoredProcedure
        ))
    );
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_scan_missing_input_fails() {
    let ctx = TestContext::empty();
    let mut options = ctx.options(OutputFormat::Text);
    options.input_path = ctx.project_dir.join("does_not_exist");

    let err = rust_sqlgraph::scan(&options).unwrap_err();
    assert!(
        err.to_string().contains("does_not_exist"),
        "Error should name the missing path: {}",
        err
    );
}

#[test]
fn test_scan_invalid_exclude_pattern_fails() {
    let ctx = TestContext::with_fixture("sales_db");
    let mut options = ctx.options(OutputFormat::Text);
    options.exclude = vec!["[".to_string()];

    assert!(rust_sqlgraph::scan(&options).is_err());
}

#[test]
fn test_scan_unwritable_output_fails() {
    let ctx = TestContext::with_fixture("sales_db");
    let mut options = ctx.options(OutputFormat::Text);
    options.output_path = Some(ctx.project_dir.join("missing_dir").join("report.txt"));

    let err = rust_sqlgraph::scan(&options).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<rust_sqlgraph::SqlGraphError>(),
            Some(rust_sqlgraph::SqlGraphError::OutputWriteError { .. })
        ),
        "Expected OutputWriteError, got: {}",
        err
    );
}

// ============================================================================
// Larger projects
// ============================================================================

#[test]
fn test_scan_many_files_preserves_order() {
    let ctx = TestContext::empty();
    for i in 0..24 {
        ctx.write_script(
            &format!("Procedures/Proc{:02}.sql", i),
            &format!(
                "CREATE PROCEDURE dbo.Proc{:02} AS BEGIN EXEC dbo.Proc{:02}; SELECT * FROM dbo.Table{:02}; END",
                i,
                (i + 1) % 24,
                i
            ),
        );
    }

    let report = ctx.scan_successfully(&ctx.options(OutputFormat::Json));
    assert_eq!(report.scripts.len(), 24);

    for (i, script) in report.scripts.iter().enumerate() {
        let result = script.result.as_ref().expect("Every script defines a procedure");
        assert_eq!(result.definition.name, format!("dbo.Proc{:02}", i));
        assert_eq!(
            result.callee_names(),
            vec![
                format!("dbo.Proc{:02}", (i + 1) % 24),
                format!("dbo.Table{:02}", i)
            ]
        );
    }
}

#[test]
fn test_scan_windows_1252_script() {
    let ctx = TestContext::empty();
    let path = ctx.project_dir.join("Legacy.sql");
    fs::write(
        &path,
        b"-- Caf\xE9 report\r\nCREATE VIEW dbo.Legacy AS SELECT * FROM dbo.Caf\xE9",
    )
    .unwrap();

    let report = ctx.scan_successfully(&ctx.options(OutputFormat::Text));
    let result = report.scripts[0].result.as_ref().unwrap();
    assert_eq!(result.callee_names(), vec!["dbo.Café"]);
}
