use odoo_support_mcp::{McpServer, OdooMcpTools, MCP_TOOL_NAMES, SERVER_NAME};
use odoo_support_rpc::mock::MockTransport;
use odoo_support_rpc::{OdooConnection, OdooSettings};
use odoo_support_types::SEARCHABLE_MODELS;
use rmcp::ServiceExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};

fn tools_with(transport: Arc<MockTransport>) -> OdooMcpTools {
    let settings = OdooSettings {
        host: Some("odoo.internal".to_string()),
        database: "prod".to_string(),
        ..OdooSettings::default()
    };
    OdooMcpTools::new(Arc::new(OdooConnection::with_transport(settings, transport)))
}

/// Modules `sale` (depends on `base` and `product`) and `crm`, one company.
fn small_odoo() -> Arc<MockTransport> {
    Arc::new(MockTransport::odoo(|model, method, args, kwargs| {
        match (model, method) {
            ("ir.module.module", "search") => {
                if args[0] == json!([["name", "=", "sale"]]) {
                    Ok(json!([10]))
                } else if args[0] == json!([]) {
                    Ok(json!([10, 11]))
                } else {
                    Ok(json!([]))
                }
            }
            ("ir.module.module", "read") => {
                if args[0] == json!([10]) {
                    Ok(json!([{
                        "id": 10, "name": "sale", "shortdesc": "Sales", "description": false,
                        "state": "installed", "installed_version": "17.0.1.2",
                        "author": "Odoo S.A.", "website": false, "license": "LGPL-3"
                    }]))
                } else {
                    Ok(json!([
                        {"id": 10, "name": "sale", "shortdesc": "Sales", "state": "installed", "installed_version": "17.0.1.2"},
                        {"id": 11, "name": "crm", "shortdesc": "CRM", "state": "uninstalled", "installed_version": false}
                    ]))
                }
            }
            ("ir.module.module.dependency", "search") => {
                assert_eq!(args[0], json!([["module_id", "=", 10]]));
                Ok(json!([100, 101]))
            }
            ("ir.module.module.dependency", "read") => Ok(json!([
                {"id": 100, "name": "base", "state": "installed"},
                {"id": 101, "name": "product", "state": "installed"}
            ])),
            ("res.users", "search") => Ok(json!([2])),
            ("res.users", "read") => {
                if args[0] == json!([99]) {
                    Ok(json!([]))
                } else {
                    Ok(json!([{
                        "id": 2, "name": "Administrator", "login": "admin",
                        "email": "admin@example.com", "active": true,
                        "groups_id": [1, 2], "company_id": [1, "YourCompany"],
                        "partner_id": [3, "Administrator"], "lang": "en_US", "tz": "Africa/Cairo"
                    }]))
                }
            }
            ("res.company", "search") => Ok(json!([1])),
            ("res.company", "read") => Ok(json!([{
                "id": 1, "name": "YourCompany", "email": "info@example.com",
                "phone": false, "website": "https://example.com", "currency_id": [74, "EGP"]
            }])),
            ("res.partner", "search") => Ok(json!([3, 4])),
            ("res.partner", "read") => Ok(json!([
                {"id": 3, "name": "Administrator", "fields_seen": kwargs["fields"].clone()},
                {"id": 4, "name": "Azure Interior", "fields_seen": kwargs["fields"].clone()}
            ])),
            _ => Ok(Value::Null),
        }
    }))
}

/// Runs a tool and returns the decoded text payload and the `isError` flag
/// as they appear on the wire.
async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> (Value, bool) {
    let arguments = match arguments {
        Value::Object(map) => Some(map),
        _ => None,
    };
    let result = serde_json::to_value(server.run_tool(name, arguments).await).unwrap();
    assert_eq!(result["content"][0]["type"], "text");
    let text = result["content"][0]["text"].as_str().unwrap();
    (
        serde_json::from_str(text).unwrap(),
        result["isError"].as_bool().unwrap_or(false),
    )
}

/// Client end of an MCP session served over an in-memory pipe.
struct Session {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
    server: tokio::task::JoinHandle<()>,
}

impl Session {
    fn open(server: McpServer) -> Self {
        let (client, server_end) = tokio::io::duplex(64 * 1024);
        let handle = tokio::spawn(async move {
            if let Ok(running) = server.serve(tokio::io::split(server_end)).await {
                let _ = running.waiting().await;
            }
        });
        let (read, writer) = tokio::io::split(client);
        Self {
            lines: BufReader::new(read).lines(),
            writer,
            server: handle,
        }
    }

    async fn send(&mut self, msg: Value) {
        let mut line = msg.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Sends a request and waits for the response carrying the same id.
    async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        loop {
            let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
                .await
                .expect("no response from the server")
                .unwrap()
                .expect("server closed the stream");
            let msg: Value = serde_json::from_str(&line).unwrap();
            if msg["id"] == id {
                return msg;
            }
        }
    }

    async fn initialize(&mut self, protocol_version: &str) -> Value {
        let init = self
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": protocol_version,
                    "capabilities": {},
                    "clientInfo": {"name": "support-console", "version": "1.0.0"}
                }),
            )
            .await;
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        init
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[tokio::test]
async fn search_outside_allow_list_is_refused_without_remote_call() {
    let transport = small_odoo();
    let tools = tools_with(transport.clone());

    let result = tools
        .search_records("ir.config_parameter", vec![], None)
        .await;

    assert!(result["error"].as_str().unwrap().contains("ir.config_parameter"));
    assert!(transport.calls().is_empty(), "no remote call expected");
}

#[tokio::test]
async fn search_allowed_model_passes_domain_and_fields() {
    let transport = small_odoo();
    let server = McpServer::new(tools_with(transport.clone()));

    let (payload, is_error) = call_tool(
        &server,
        "search_records",
        json!({"model": "res.partner", "domain": [["is_company", "=", true]], "fields": ["name"]}),
    )
    .await;

    assert!(!is_error);
    assert_eq!(payload.as_array().unwrap().len(), 2);
    assert_eq!(payload[1]["name"], "Azure Interior");
    assert_eq!(payload[0]["fields_seen"], json!(["name"]));

    let searched = transport
        .calls()
        .into_iter()
        .find(|c| c.args.get(4) == Some(&json!("search")))
        .unwrap();
    assert_eq!(searched.args[5][0], json!([["is_company", "=", true]]));
}

#[tokio::test]
async fn search_rejects_non_array_domain() {
    let transport = small_odoo();
    let server = McpServer::new(tools_with(transport.clone()));

    let (payload, is_error) = call_tool(
        &server,
        "search_records",
        json!({"model": "res.partner", "domain": "all"}),
    )
    .await;

    assert!(is_error);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid arguments for search_records"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn module_tools() {
    let tools = tools_with(small_odoo());

    let modules = tools.list_modules().await;
    assert_eq!(modules.as_array().unwrap().len(), 2);
    assert_eq!(modules[1]["installed_version"], Value::Null);

    let info = tools.get_module_info("sale").await;
    assert_eq!(info["author"], "Odoo S.A.");
    assert_eq!(info["license"], "LGPL-3");

    let missing = tools.get_module_info("ghost").await;
    assert_eq!(missing, json!({"error": "Module ghost not found"}));

    let deps = tools.check_module_dependencies("sale").await;
    assert_eq!(deps["module"], "sale");
    assert_eq!(deps["dependencies"][1]["name"], "product");

    let missing = tools.check_module_dependencies("ghost").await;
    assert_eq!(missing, json!({"error": "Module ghost not found"}));
}

#[tokio::test]
async fn user_tools() {
    let tools = tools_with(small_odoo());

    let users = tools.list_users().await;
    assert_eq!(users[0]["login"], "admin");

    let details = tools.get_user_details(2).await;
    assert_eq!(details["company_id"], json!([1, "YourCompany"]));
    assert_eq!(details["groups_id"], json!([1, 2]));

    let missing = tools.get_user_details(99).await;
    assert_eq!(missing, json!({"error": "User 99 not found"}));
}

#[tokio::test]
async fn database_and_company_info() {
    let tools = tools_with(small_odoo());

    let db = tools.get_database_info().await;
    assert_eq!(
        db,
        json!({"version": MockTransport::VERSION, "database": "prod", "host": "odoo.internal", "port": 8069})
    );

    let companies = tools.get_company_info().await;
    assert_eq!(companies[0]["currency_id"], json!([74, "EGP"]));
    assert_eq!(companies[0]["phone"], Value::Null);
}

#[tokio::test]
async fn no_company_is_an_error_payload() {
    let transport = Arc::new(MockTransport::odoo(|_, _, _, _| Ok(json!([]))));
    let tools = tools_with(transport);

    assert_eq!(
        tools.get_company_info().await,
        json!({"error": "No company found"})
    );
}

#[tokio::test]
async fn remote_failures_become_error_payloads() {
    let tools = tools_with(Arc::new(MockTransport::failing("Access Denied")));

    for value in [
        tools.list_modules().await,
        tools.list_users().await,
        tools.get_database_info().await,
        tools.get_company_info().await,
        tools.get_module_info("sale").await,
    ] {
        assert!(
            value["error"].as_str().unwrap().contains("Access Denied"),
            "unexpected payload {value}"
        );
    }
}

#[tokio::test]
async fn unknown_tool_is_reported() {
    let server = McpServer::new(tools_with(small_odoo()));
    let (payload, is_error) = call_tool(&server, "drop_database", json!({})).await;
    assert!(is_error);
    assert_eq!(payload, json!({"error": "Unknown tool: drop_database"}));
}

#[tokio::test]
async fn stdio_session_lists_and_calls_tools() {
    let mut session = Session::open(McpServer::new(tools_with(small_odoo())));

    let init = session.initialize("2024-11-05").await;
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["serverInfo"]["name"], SERVER_NAME);
    assert!(init["result"]["capabilities"]["tools"].is_object());

    let list = session.request(1, "tools/list", json!({})).await;
    let tools = list["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, MCP_TOOL_NAMES);
    let search = tools.iter().find(|t| t["name"] == "search_records").unwrap();
    assert_eq!(
        search["inputSchema"]["properties"]["model"]["enum"]
            .as_array()
            .unwrap()
            .len(),
        SEARCHABLE_MODELS.len()
    );

    let call = session
        .request(
            2,
            "tools/call",
            json!({"name": "get_module_info", "arguments": {"module_name": "sale"}}),
        )
        .await;
    assert_eq!(call["result"]["isError"], false);
    let payload: Value =
        serde_json::from_str(call["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(payload["author"], "Odoo S.A.");

    let refused = session
        .request(
            3,
            "tools/call",
            json!({"name": "search_records", "arguments": {"model": "ir.config_parameter", "domain": []}}),
        )
        .await;
    assert_eq!(refused["result"]["isError"], true);
}

#[tokio::test]
async fn unsupported_protocol_revision_gets_the_server_revision() {
    let mut session = Session::open(McpServer::new(tools_with(small_odoo())));

    let init = session.initialize("1999-01-01").await;
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
}

#[test]
fn tool_list_mirrors_catalog() {
    let server = McpServer::new(tools_with(small_odoo()));
    let tools = server.tool_list();
    assert_eq!(tools.len(), MCP_TOOL_NAMES.len());
    for (tool, name) in tools.iter().zip(MCP_TOOL_NAMES) {
        assert_eq!(tool.name, *name);
        assert_eq!(tool.input_schema["type"], "object");
    }
}
