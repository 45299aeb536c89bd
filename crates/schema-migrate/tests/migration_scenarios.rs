//! End-to-end scenarios through the public converter API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use schema_migrate::{
    DatabaseConnectionConfig, MigrateError, MigrationPlan, Result, SchemaAnalysisResult,
    SchemaConverter, TextGenerator,
};

/// Returns the same response for every prompt and counts calls.
struct ScriptedGenerator {
    response: String,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Fails like an external command that crashed with a traceback.
struct CrashingGenerator;

#[async_trait]
impl TextGenerator for CrashingGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String> {
        Err(MigrateError::generation(
            "llm exited with 1: Traceback (most recent call last):\nDROP TABLE customers",
        ))
    }
}

const SALES_SCHEMA: &str = r#"{
    "databaseType": "mssql",
    "tables": [
        {
            "name": "customers",
            "schema": "dbo",
            "columns": [
                {"name": "id", "dataType": "int", "isNullable": false, "isIdentity": true},
                {"name": "email", "dataType": "nvarchar(200)", "isNullable": false}
            ],
            "primaryKey": ["id"],
            "indexes": [{"name": "ux_customers_email", "columns": ["email"], "isUnique": true}]
        },
        {
            "name": "orders",
            "schema": "dbo",
            "columns": [
                {"name": "id", "dataType": "int", "isNullable": false, "isIdentity": true},
                {"name": "customer_id", "dataType": "int", "isNullable": false},
                {"name": "total", "dataType": "decimal"},
                {"name": "created", "dataType": "datetime", "defaultValue": "(getdate())"}
            ],
            "primaryKey": ["id"],
            "foreignKeys": [{
                "name": "FK_orders_customers",
                "columns": ["customer_id"],
                "referencedTable": "customers",
                "referencedSchema": "dbo",
                "referencedColumns": ["id"],
                "onDelete": "CASCADE"
            }]
        }
    ],
    "procedures": [{
        "name": "usp_order_total",
        "schema": "dbo",
        "parameters": [{"name": "@order_id", "dataType": "int"}],
        "definition": "CREATE PROCEDURE dbo.usp_order_total @order_id int AS SELECT total FROM dbo.orders WHERE id = @order_id"
    }],
    "triggers": [{
        "name": "trg_orders_audit",
        "schema": "dbo",
        "table": "orders",
        "events": ["INSERT"],
        "timing": "AFTER",
        "definition": "CREATE TRIGGER dbo.trg_orders_audit ON dbo.orders AFTER INSERT AS BEGIN SET NOCOUNT ON; END"
    }]
}"#;

fn sales_schema() -> SchemaAnalysisResult {
    serde_json::from_str(SALES_SCHEMA).unwrap()
}

fn postgres() -> DatabaseConnectionConfig {
    DatabaseConnectionConfig::new("postgres")
}

fn converter(generator: Arc<ScriptedGenerator>) -> SchemaConverter {
    SchemaConverter::for_target(&postgres())
        .unwrap()
        .with_generator(generator)
}

#[tokio::test]
async fn test_orders_sql_server_to_postgres() {
    let analysis = sales_schema();
    let converter = converter(ScriptedGenerator::new("unused"));
    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;

    let orders = plan.find_table("dbo.orders").unwrap();
    assert_eq!(orders.target_table, "orders");
    let created = orders
        .column_mappings
        .iter()
        .find(|c| c.source_column == "created")
        .unwrap();
    assert_eq!(created.transformation.as_deref(), Some("CAST(created AS timestamp)"));
    assert!(orders
        .column_mappings
        .iter()
        .filter(|c| c.source_column != "created")
        .all(|c| c.transformation.is_none()));

    let ddl = converter.generate_tables_ddl(&plan, &analysis).await;
    assert!(ddl.contains("id integer GENERATED ALWAYS AS IDENTITY NOT NULL"));
    assert!(ddl.contains("total numeric"));
    assert!(ddl.contains("created timestamp DEFAULT CURRENT_TIMESTAMP"));
    assert!(ddl.contains("PRIMARY KEY (id)"));
    assert!(ddl.contains("COMMENT ON TABLE orders IS 'Migrated from dbo.orders'"));

    let dml = converter.generate_data_migration_dml(&plan, &analysis).await;
    assert!(dml.contains(
        "INSERT INTO orders (id, customer_id, total, created)\n\
         SELECT id, customer_id, total, CAST(created AS timestamp) AS created\n\
         FROM dbo.orders;"
    ));
}

#[tokio::test]
async fn test_skipped_table_is_invisible() {
    let analysis = sales_schema();
    let converter = converter(ScriptedGenerator::new("unused"));
    let mut plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;
    plan.table_mappings
        .iter_mut()
        .find(|m| m.source_table == "dbo.customers")
        .unwrap()
        .skip = true;

    let ddl = converter.generate_tables_ddl(&plan, &analysis).await;
    assert!(!ddl.contains("CREATE TABLE customers"));
    assert!(ddl.contains("CREATE TABLE orders"));

    let indexes = converter.generate_indexes_ddl(&plan, &analysis).await;
    assert!(indexes.is_empty());

    let dml = converter.generate_data_migration_dml(&plan, &analysis).await;
    assert!(!dml.contains("customers"));

    let fks = converter.generate_foreign_keys_ddl(&plan, &analysis).await;
    assert!(!fks.contains("ADD CONSTRAINT"));
    assert!(fks.contains("-- Foreign key FK_orders_customers on orders omitted"));
}

#[tokio::test]
async fn test_foreign_keys_follow_referenced_tables() {
    let analysis = sales_schema();
    let converter = converter(ScriptedGenerator::new(
        "```sql\nCREATE OR REPLACE FUNCTION usp_order_total(order_id integer) RETURNS numeric AS $$ SELECT 1 $$ LANGUAGE sql;\n```",
    ));
    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;
    let script = converter.generate_migration_script(&plan, &analysis).await;

    let create_customers = script.find("CREATE TABLE customers").unwrap();
    let create_orders = script.find("CREATE TABLE orders").unwrap();
    let fk = script
        .find("ALTER TABLE orders ADD CONSTRAINT fk_orders_customers FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE CASCADE;")
        .unwrap();
    let unique_index = script
        .find("CREATE UNIQUE INDEX idx_customers_email ON customers (email);")
        .unwrap();
    let insert = script.find("INSERT INTO orders").unwrap();
    let procedure = script.find("CREATE OR REPLACE FUNCTION usp_order_total").unwrap();

    assert!(create_customers < fk && create_orders < fk);
    assert!(unique_index < fk);
    assert!(fk < insert);
    assert!(insert < procedure);
    assert!(!script.contains("```"));
}

#[tokio::test]
async fn test_rejected_trigger_conversion_needs_manual_work() {
    let analysis = sales_schema();
    let generator = ScriptedGenerator::new("I am not able to translate this object.");
    let converter = converter(generator.clone());
    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;

    let triggers = converter.convert_triggers(&plan, &analysis).await;
    assert!(triggers.starts_with("-- MANUAL CONVERSION REQUIRED: trigger dbo.trg_orders_audit"));
    assert!(!triggers.contains("I am not able"));
    assert!(triggers.lines().all(|line| line.starts_with("--")));

    let procedures = converter.convert_stored_procedures(&plan, &analysis).await;
    assert!(procedures.starts_with("-- MANUAL CONVERSION REQUIRED: procedure dbo.usp_order_total"));
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_generator_crash_output_never_reaches_sql() {
    let analysis = sales_schema();
    let converter = SchemaConverter::for_target(&postgres())
        .unwrap()
        .with_generator(Arc::new(CrashingGenerator));
    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;

    let procedures = converter.convert_stored_procedures(&plan, &analysis).await;
    let triggers = converter.convert_triggers(&plan, &analysis).await;
    for sql in [&procedures, &triggers] {
        let live: Vec<&str> = sql.lines().filter(|l| !l.starts_with("--")).collect();
        assert!(live.is_empty(), "uncommented lines: {:?}", live);
    }
    assert!(procedures.contains("Traceback (most recent call last): DROP TABLE customers"));

    let script = converter.generate_migration_script(&plan, &analysis).await;
    assert!(!script.lines().any(|l| l.starts_with("DROP TABLE")));
}

#[tokio::test]
async fn test_trigger_ending_in_comment_is_terminated() {
    let analysis = sales_schema();
    let converter = converter(ScriptedGenerator::new(
        "CREATE OR REPLACE FUNCTION trg_orders_audit() RETURNS trigger AS $$ BEGIN RETURN NEW; END $$ LANGUAGE plpgsql;\n\
         CREATE TRIGGER trg_orders_audit AFTER INSERT ON orders EXECUTE FUNCTION trg_orders_audit()\n\
         -- converted from T-SQL",
    ));
    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;

    let script = converter.generate_migration_script(&plan, &analysis).await;
    assert!(script.contains(
        "EXECUTE FUNCTION trg_orders_audit();\n-- converted from T-SQL"
    ));
    assert!(!script.contains("-- converted from T-SQL;"));
}

#[tokio::test]
async fn test_refinement_without_json_keeps_plan() {
    let analysis = sales_schema();
    let generator = ScriptedGenerator::new("I would rename the orders table, but here is no JSON.");
    let converter = converter(generator.clone());

    let baseline = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;
    let refined = converter
        .generate_migration_plan(&analysis, &postgres(), Some("rename orders to sales_orders"))
        .await;

    assert_eq!(generator.calls(), 1);
    assert!(refined.modified_at.is_none());
    assert!(refined.notes.is_none());
    assert_eq!(refined.table_mappings, baseline.table_mappings);
}

#[tokio::test]
async fn test_refinement_with_valid_plan_replaces_it() {
    let analysis = sales_schema();
    let generator = ScriptedGenerator::new(
        r#"Here is the refined plan:
        {"tableMappings": [
            {"sourceTable": "dbo.orders", "targetTable": "sales.sales_orders",
             "columnMappings": [{"sourceColumn": "id", "targetColumn": "order_id"}]},
            {"sourceTable": "dbo.customers", "targetTable": "customers", "skip": true}
        ]}"#,
    );
    let converter = converter(generator);

    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), Some("move orders to the sales schema"))
        .await;
    assert!(plan.modified_at.is_some());
    assert_eq!(
        plan.notes.as_deref(),
        Some("Refined with instructions: move orders to the sales schema")
    );
    assert_eq!(plan.active_tables().count(), 1);

    let ddl = converter.generate_tables_ddl(&plan, &analysis).await;
    assert!(ddl.starts_with("CREATE SCHEMA IF NOT EXISTS sales;"));
    assert!(ddl.contains("CREATE TABLE sales.sales_orders (\n    order_id integer GENERATED ALWAYS AS IDENTITY NOT NULL,\n    PRIMARY KEY (order_id)\n);"));
}

#[tokio::test]
async fn test_same_dialect_is_identity() {
    let analysis: SchemaAnalysisResult = serde_json::from_str(
        r#"{
            "databaseType": "postgresql",
            "tables": [{
                "name": "events",
                "schema": "public",
                "columns": [
                    {"name": "id", "dataType": "bigint", "isNullable": false},
                    {"name": "payload", "dataType": "jsonb"},
                    {"name": "at", "dataType": "timestamp with time zone"}
                ]
            }],
            "procedures": [{
                "name": "purge_events",
                "schema": "public",
                "definition": "CREATE FUNCTION purge_events() RETURNS void AS $$ DELETE FROM events $$ LANGUAGE sql"
            }]
        }"#,
    )
    .unwrap();
    let generator = ScriptedGenerator::new("unused");
    let converter = converter(generator.clone());

    for ty in ["bigint", "jsonb", "timestamp with time zone", "varchar(12)"] {
        assert_eq!(converter.map_type(ty, "postgres").await.target_type, ty);
    }

    let plan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;
    assert!(plan.table_mappings[0]
        .column_mappings
        .iter()
        .all(|c| c.transformation.is_none()));

    let ddl = converter.generate_tables_ddl(&plan, &analysis).await;
    assert!(ddl.contains("at timestamp with time zone"));

    let procedures = converter.convert_stored_procedures(&plan, &analysis).await;
    assert_eq!(
        procedures,
        "CREATE FUNCTION purge_events() RETURNS void AS $$ DELETE FROM events $$ LANGUAGE sql;"
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_explanation_falls_back_without_generator() {
    let analysis = sales_schema();
    let converter = SchemaConverter::for_target(&postgres()).unwrap();
    let plan: MigrationPlan = converter
        .generate_migration_plan(&analysis, &postgres(), None)
        .await;

    let explanation = converter.explain_plan(&plan).await;
    assert!(explanation.starts_with(
        "This plan migrates 2 table(s), 0 view(s), 1 stored procedure(s) and 1 trigger(s)."
    ));
}
