//! Full runs: mapping sources on disk, a schema document, hand-off output.

use std::path::Path;

use serde_json::Value as JsonValue;
use tempfile::TempDir;
use typeweaver_core::{
    generate, Config, Error, GenerateTarget, GenerationSession, OpenApiContext, Result,
};

const SCHEMA: &str = r##"
swagger: "2.0"
info:
  title: Billing
  version: "1.0"
basePath: /billing
securityDefinitions:
  tenant:
    type: apiKey
    in: header
    name: X-Tenant
  key:
    type: apiKey
    in: header
    name: X-Api-Key
security:
  - tenant: []
    key: []
definitions:
  Invoice:
    type: object
    x-superClass: [Entity]
    x-superClassTemplateArgs: [Long]
    properties:
      total:
        type: string
        x-type: Money
      tip:
        type: string
        format: x-Cash
      issued:
        type: string
        format: date-time
      lines:
        type: array
        items:
          type: string
          x-type: Money
paths:
  /invoices/{id}:
    x-interfaceName: Invoices
    get:
      operationId: getInvoice
      parameters:
        - name: id
          in: path
          type: string
      responses:
        "200":
          description: ok
          schema:
            $ref: "#/definitions/Invoice"
  /payments:
    post:
      operationId: pay
      parameters:
        - name: amount
          in: body
          required: true
          schema:
            type: string
            x-type: Money
      responses:
        "204":
          description: paid
"##;

async fn write(dir: &Path, name: &str, content: &str) -> std::io::Result<String> {
    let path = dir.join(name);
    tokio::fs::write(&path, content).await?;
    Ok(path.to_string_lossy().into_owned())
}

/// Config with a direct map, a package scan and a nested external resource
async fn fixture() -> Result<(TempDir, Config)> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    write(root, "types.yaml", "types:\n  - com.acme.base.Entity\n  - com.acme.base.audit.Audited\n").await?;
    write(root, "nested.yaml", "directMap:\n  Cash: com.acme.types.Money\n").await?;
    write(
        root,
        "shared.yaml",
        "directMap:\n  Money: com.acme.types.Money\nexternalResources: nested.yaml\n",
    )
    .await?;
    let source = write(root, "billing.yaml", SCHEMA).await?;

    let shared_url = url::Url::from_file_path(root.join("shared.yaml"))
        .map_err(|_| Error::config("temp path is not absolute"))?;
    let config_text = format!(
        r#"
sourceFiles: ["{source}"]
outputDir: "{out}"
modelPackage: com.acme.billing.model
apiSuffix: Api
typeManifests: ["{manifest}"]
dataTypeMapping:
  directMap:
    Money: com.legacy.Money
  packages: com.acme.base.**
  externalResources: ["{shared_url}"]
"#,
        out = root.join("out").to_string_lossy(),
        manifest = root.join("types.yaml").to_string_lossy(),
    );
    let config_path = write(root, "typeweaver.yaml", &config_text).await?;
    let config = Config::from_file(&config_path).await?;
    Ok((dir, config))
}

#[tokio::test]
async fn test_registry_precedence_and_scan() -> Result<()> {
    let (_dir, config) = fixture().await?;
    let session = GenerationSession::new(config).await?;
    let registry = session.registry().await?;

    // the external resource overrides the direct map
    assert_eq!(
        registry.get("Money").map(|d| d.fully_qualified_name.as_str()),
        Some("com.acme.types.Money")
    );
    assert_eq!(
        registry.get("Cash").map(|d| d.fully_qualified_name.as_str()),
        Some("com.acme.types.Money")
    );
    assert!(registry.contains("Entity"));
    assert!(registry.contains("Audited"));
    for descriptor in registry.descriptors() {
        assert!(descriptor.fully_qualified_name.ends_with(&format!(".{}", descriptor.simple_name)));
    }
    Ok(())
}

#[tokio::test]
async fn test_generate_end_to_end() -> Result<()> {
    let (dir, config) = fixture().await?;
    let written = generate(&config, GenerateTarget::All).await?;
    assert_eq!(written, vec![dir.path().join("out").join("billing.json")]);

    let content = tokio::fs::read_to_string(&written[0]).await?;
    let output: JsonValue = serde_json::from_str(&content)?;

    let invoice = &output["models"][0];
    assert_eq!(invoice["parent"], "Entity<Long>");
    let imports: Vec<&str> = invoice["imports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(JsonValue::as_str)
        .collect();
    // Money and Cash share one fully-qualified name
    assert_eq!(
        imports.iter().filter(|i| **i == "com.acme.types.Money").count(),
        1
    );
    assert!(imports.contains(&"com.acme.base.Entity"));
    assert!(imports.contains(&"java.time.LocalDateTime"));
    assert!(imports.contains(&"java.util.List"));

    let properties = invoice["properties"].as_array().unwrap();
    let types: Vec<&str> = properties
        .iter()
        .filter_map(|p| p["resolvedType"].as_str())
        .collect();
    assert_eq!(types, vec!["Money", "Money", "LocalDateTime", "List<Money>"]);

    let apis = output["apis"].as_array().unwrap();
    let names: Vec<&str> = apis.iter().filter_map(|a| a["name"].as_str()).collect();
    assert_eq!(names, vec!["InvoicesApi", "BillingApi"]);

    let pay = &apis[1]["operations"][0];
    let params = pay["parameters"].as_array().unwrap();
    let param_names: Vec<&str> = params.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(param_names, vec!["amount", "X-Tenant", "X-Api-Key"]);
    let flags: Vec<bool> = params.iter().filter_map(|p| p["hasMore"].as_bool()).collect();
    assert_eq!(flags, vec![true, true, false]);
    assert_eq!(params[0]["resolvedType"], "Money");
    assert_eq!(params[0]["isPrimitiveType"], true);
    assert_eq!(pay["returnType"], JsonValue::Null);

    assert_eq!(output["additionalProperties"]["modelPackage"], "com.acme.billing.model");
    Ok(())
}

#[tokio::test]
async fn test_unknown_alias_aborts_run() -> Result<()> {
    let (dir, mut config) = fixture().await?;
    config.data_type_mapping.external_resources.clear();
    config.data_type_mapping.direct_map.clear();

    let result = generate(&config, GenerateTarget::Models).await;
    match result {
        Err(Error::UnresolvedAlias { alias, entity }) => {
            assert_eq!(alias, "Money");
            assert_eq!(entity, "Invoice.total");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(!dir.path().join("out").join("billing.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_cyclic_resources_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "a.yaml", "externalResources: b.yaml\n").await?;
    write(dir.path(), "b.yaml", "externalResources: a.yaml\n").await?;
    let a_url = url::Url::from_file_path(dir.path().join("a.yaml"))
        .map_err(|_| Error::config("temp path is not absolute"))?;

    let mut config = Config::new(Vec::<String>::new(), "out");
    config.data_type_mapping.external_resources = vec![a_url.to_string()];
    let session = GenerationSession::new(config).await?;
    match session.registry().await {
        Err(Error::Configuration(message)) => assert!(message.contains("Cyclic")),
        other => panic!("unexpected: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_schema_loaded_from_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = write(dir.path(), "billing.yaml", SCHEMA).await?;
    let context = OpenApiContext::from_file_or_url(&source).await?;
    assert_eq!(context.title(), Some("Billing"));
    assert_eq!(context.base_path().as_deref(), Some("/billing"));
    Ok(())
}

#[tokio::test]
async fn test_symbolic_response_and_array_param_types() -> Result<()> {
    let mut config = Config::new(Vec::<String>::new(), "out");
    config
        .data_type_mapping
        .direct_map
        .insert("Money".into(), "com.acme.types.Money".into());
    let session = GenerationSession::new(config).await?;
    let context = OpenApiContext::new(serde_json::json!({
        "swagger": "2.0",
        "info": {"title": "Accounts", "version": "1"},
        "paths": {
            "/balance": {"get": {
                "operationId": "balance",
                "responses": {"200": {"description": "ok", "schema": {"type": "string", "x-type": "Money"}}}
            }},
            "/amounts": {"get": {
                "operationId": "amounts",
                "parameters": [{
                    "name": "limits", "in": "query", "type": "array",
                    "items": {"type": "string", "format": "x-Money"}
                }],
                "responses": {"200": {"description": "ok", "schema": {
                    "type": "array", "items": {"type": "string", "x-type": "Money"}
                }}}
            }}
        }
    }));

    let processed = session.process(&context, GenerateTarget::Apis).await?;
    let output = serde_json::to_value(&processed)?;
    let operations = &output["apis"];
    let balance = &operations[0]["operations"][0];
    assert_eq!(balance["returnType"], "Money");
    assert_eq!(balance["responses"][0]["baseType"], "Money");
    assert_eq!(balance["imports"], serde_json::json!(["com.acme.types.Money"]));

    let amounts = &operations[1]["operations"][0];
    assert_eq!(amounts["returnType"], "List<Money>");
    assert_eq!(amounts["responses"][0]["baseType"], "Money");
    assert_eq!(amounts["parameters"][0]["resolvedType"], "List<Money>");
    let imports = amounts["imports"].as_array().unwrap();
    assert!(imports.contains(&JsonValue::from("com.acme.types.Money")));
    assert!(imports.contains(&JsonValue::from("java.util.List")));
    Ok(())
}
