//! Reckon MCP Server
//!
//! Newline-delimited JSON-RPC 2.0 over stdio. Logs go to stderr so stdout
//! carries protocol messages only.
//!
//! Tools:
//! - list_calculators: Catalog, optionally filtered by category
//! - get_calculator: Full definition of one calculator
//! - search_calculators: Free-text catalog search
//! - calculate: Run a calculator against inputs
//! - evaluate_formula: Evaluate an ad-hoc expression
//! - validate_formula: Dry-run an expression and report problems
//! - convert_units: Convert a value between units
//! - list_functions: List available functions
//! - help: Documentation for a function or constant

use reckon::{
    CalculatorConfig, Engine, EngineConfig, FormulaDefinition, Inputs, ResultType, UnitConverter,
    DEFAULT_RELATED_LIMIT,
};
use reckon_core::Value;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "reckon";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: INVALID_PARAMS, message: message.into(), data: None }
    }
}

fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reckon=info,reckon_mcp=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(false)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    init_logger();

    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let engine = match Engine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("failed to start engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Reckon MCP server started");
    info!(
        locale = %config.locale,
        currency = %config.currency,
        calculators = engine.registry().len(),
        "engine ready"
    );

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "received request");

                let request: McpRequest = match serde_json::from_str(line) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("error parsing request: {}", e);
                        let response = McpResponse {
                            jsonrpc: "2.0".to_string(),
                            id: None,
                            result: None,
                            error: Some(McpError { code: PARSE_ERROR, message: format!("Parse error: {}", e), data: None }),
                        };
                        if write_response(&response).is_err() {
                            break;
                        }
                        continue;
                    }
                };

                debug!(method = %request.method, "processing");
                let response = handle_request(&engine, &request);

                // Notifications (no id) get no response
                if request.id.is_none() {
                    continue;
                }
                if let Err(e) = write_response(&response) {
                    error!("error writing response: {}", e);
                    break;
                }
            }
            Err(e) => {
                error!("error reading input: {}", e);
                break;
            }
        }
    }

    info!("server shutting down");
    ExitCode::SUCCESS
}

fn write_response(response: &McpResponse) -> io::Result<()> {
    let text = serde_json::to_string(response).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    stdout.flush()
}

fn handle_request(engine: &Engine, request: &McpRequest) -> McpResponse {
    let result = match request.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(&request.params),
        "initialized" | "notifications/initialized" => Ok(json!({})),
        "ping" => Ok(json!({})),

        // Tools
        "tools/list" => handle_tools_list(),
        "tools/call" => handle_tool_call(engine, &request.params),

        _ => Err(McpError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {}", request.method),
            data: None,
        }),
    };

    match result {
        Ok(r) => McpResponse { jsonrpc: "2.0".to_string(), id: request.id.clone(), result: Some(r), error: None },
        Err(e) => McpResponse { jsonrpc: "2.0".to_string(), id: request.id.clone(), result: None, error: Some(e) },
    }
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Calculator catalog with validated formula evaluation"
        },
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "instructions": "Reckon runs calculators (loan, mortgage, compound interest, BMI...). Use 'list_calculators' or 'search_calculators' to find one, 'get_calculator' to see its inputs, then 'calculate'. Ad-hoc expressions go to 'evaluate_formula'."
    }))
}

fn handle_tools_list() -> Result<JsonValue, McpError> {
    Ok(json!({
        "tools": [
            {
                "name": "list_calculators",
                "description": "List calculators in the catalog, optionally for one category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string", "description": "Category such as 'finance' or 'health'" }
                    }
                }
            },
            {
                "name": "get_calculator",
                "description": "Get the full definition of a calculator: variables, formulas and related calculators.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Calculator id" }
                    },
                    "required": ["id"]
                }
            },
            {
                "name": "search_calculators",
                "description": "Case-insensitive search over titles, descriptions, tags, keywords and categories.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string" }
                    },
                    "required": ["query"]
                }
            },
            {
                "name": "calculate",
                "description": "Validate inputs and evaluate every formula of a calculator. Missing inputs take their defaults.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Calculator id" },
                        "inputs": { "type": "object", "description": "Values keyed by variable id" }
                    },
                    "required": ["id"]
                }
            },
            {
                "name": "evaluate_formula",
                "description": "Evaluate an expression such as 'principal * (1 + rate/100)^years'.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "expression": { "type": "string" },
                        "variables": { "type": "object", "description": "Values keyed by variable name" },
                        "result_type": {
                            "type": "string",
                            "enum": ["number", "currency", "percentage", "decimal", "integer", "text"],
                            "default": "number"
                        },
                        "precision": { "type": "integer", "description": "Decimal places for decimal, percentage and currency" },
                        "steps": { "type": "boolean", "description": "Include a calculation breakdown", "default": false }
                    },
                    "required": ["expression"]
                }
            },
            {
                "name": "validate_formula",
                "description": "Check an expression for syntax errors and missing variables without failing.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "expression": { "type": "string" },
                        "variables": { "type": "object" }
                    },
                    "required": ["expression"]
                }
            },
            {
                "name": "convert_units",
                "description": "Convert a value between units of length, weight, temperature or currency.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "number" },
                        "from": { "type": "string", "description": "Unit name or symbol, e.g. 'km' or 'celsius'" },
                        "to": { "type": "string" }
                    },
                    "required": ["value", "from", "to"]
                }
            },
            {
                "name": "list_functions",
                "description": "List functions usable in formulas, optionally for one category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string" }
                    }
                }
            },
            {
                "name": "help",
                "description": "Documentation for a function or constant. Omit name for general help.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" }
                    }
                }
            }
        ]
    }))
}

fn handle_tool_call(engine: &Engine, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    match name {
        "list_calculators" => tool_list_calculators(engine, &args),
        "get_calculator" => tool_get_calculator(engine, &args),
        "search_calculators" => tool_search_calculators(engine, &args),
        "calculate" => tool_calculate(engine, &args),
        "evaluate_formula" => tool_evaluate_formula(engine, &args),
        "validate_formula" => tool_validate_formula(engine, &args),
        "convert_units" => tool_convert_units(&args),
        "list_functions" => tool_list_functions(engine, &args),
        "help" => tool_help(engine, &args),
        _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

fn str_arg<'a>(args: &'a JsonValue, key: &str) -> Result<&'a str, McpError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params(format!("Missing {} argument", key)))
}

fn inputs_arg(args: &JsonValue, key: &str) -> Inputs {
    args.get(key)
        .and_then(|v| v.as_object())
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), Value::from(v.clone()))).collect())
        .unwrap_or_default()
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, McpError> {
    serde_json::to_value(value).map_err(|e| McpError { code: -32603, message: format!("Internal error: {}", e), data: None })
}

fn summary(config: &CalculatorConfig) -> JsonValue {
    json!({
        "id": config.id,
        "title": config.title,
        "description": config.description,
        "category": config.category,
        "featured": config.featured,
        "trending": config.trending,
    })
}

fn tool_list_calculators(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let registry = engine.registry();
    let list: Vec<JsonValue> = match args.get("category").and_then(|v| v.as_str()) {
        Some(category) => registry.get_calculators_by_category(category).into_iter().map(summary).collect(),
        None => registry.get_all_calculators().iter().map(summary).collect(),
    };
    let text = list
        .iter()
        .map(|c| format!("- {} ({}): {}", c["id"].as_str().unwrap_or(""), c["category"].as_str().unwrap_or(""), c["title"].as_str().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "calculators": list,
        "categories": registry.get_categories()
    }))
}

fn tool_get_calculator(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let id = str_arg(args, "id")?;
    let registry = engine.registry();
    let config = registry.get_calculator_config(id).ok_or_else(|| McpError {
        code: INVALID_PARAMS,
        message: format!("Calculator not found: {}", id),
        data: Some(json!({ "available": registry.get_all_calculators().iter().map(|c| &c.id).collect::<Vec<_>>() })),
    })?;
    let related: Vec<&str> = registry
        .get_related_calculators(id, DEFAULT_RELATED_LIMIT)
        .into_iter()
        .map(|c| c.id.as_str())
        .collect();

    Ok(json!({
        "content": [{ "type": "text", "text": format!("{}: {}", config.title, config.description) }],
        "calculator": to_json(config)?,
        "related": related
    }))
}

fn tool_search_calculators(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let query = str_arg(args, "query")?;
    let hits: Vec<JsonValue> = engine.registry().search_calculators(query).into_iter().map(summary).collect();
    Ok(json!({
        "content": [{ "type": "text", "text": format!("{} calculator(s) match '{}'", hits.len(), query) }],
        "calculators": hits
    }))
}

fn tool_calculate(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let id = str_arg(args, "id")?;
    let inputs = inputs_arg(args, "inputs");
    let calculation = engine.calculate(id, &inputs).map_err(|e| McpError::invalid_params(e.to_string()))?;

    let mut lines = Vec::new();
    for (field, messages) in &calculation.validation.errors {
        lines.push(format!("error {}: {}", field, messages.join("; ")));
    }
    for (field, messages) in &calculation.validation.warnings {
        lines.push(format!("warning {}: {}", field, messages.join("; ")));
    }
    for result in &calculation.results {
        let shown = result.value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        lines.push(format!("{}: {}", result.label, shown));
    }

    Ok(json!({
        "content": [{ "type": "text", "text": lines.join("\n") }],
        "calculation": to_json(&calculation)?,
        "isError": !calculation.is_complete()
    }))
}

fn tool_evaluate_formula(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let expression = str_arg(args, "expression")?;
    let result_type: ResultType = match args.get("result_type") {
        Some(rt) => serde_json::from_value(rt.clone()).map_err(|e| McpError::invalid_params(format!("Invalid result_type: {}", e)))?,
        None => ResultType::default(),
    };
    let mut formula = FormulaDefinition::new("expression", expression, result_type);
    if let Some(p) = args.get("precision").and_then(|v| v.as_u64()) {
        formula = formula.with_precision(p.min(15) as u32);
    }
    let variables = inputs_arg(args, "variables");
    let evaluator = engine.evaluator();

    match evaluator.try_evaluate(&formula, &variables) {
        Ok(out) => {
            let mut response = json!({
                "content": [{ "type": "text", "text": out.to_string() }],
                "result": to_json(&out)?
            });
            if args.get("steps").and_then(|v| v.as_bool()).unwrap_or(false) {
                response["steps"] = to_json(&evaluator.get_steps(&formula, &variables))?;
            }
            Ok(response)
        }
        Err(err) => {
            let diagnostic = err.to_diagnostic();
            Ok(json!({
                "content": [{ "type": "text", "text": diagnostic.to_string() }],
                "error": to_json(&diagnostic)?,
                "isError": true
            }))
        }
    }
}

fn tool_validate_formula(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let expression = str_arg(args, "expression")?;
    let formula = FormulaDefinition::new("expression", expression, ResultType::Number);
    let report = engine.evaluator().validate(&formula, &inputs_arg(args, "variables"));
    let text = if report.is_valid { "Formula is valid".to_string() } else { report.errors.join("\n") };

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "validation": to_json(&report)?
    }))
}

fn tool_convert_units(args: &JsonValue) -> Result<JsonValue, McpError> {
    let value = args
        .get("value")
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(reckon_core::parse_number)))
        .ok_or_else(|| McpError::invalid_params("Missing value argument"))?;
    let from = str_arg(args, "from")?;
    let to = str_arg(args, "to")?;

    match UnitConverter::new().convert_checked(value, from, to) {
        Ok(converted) => Ok(json!({
            "content": [{ "type": "text", "text": format!("{} {} = {} {}", reckon_core::display_number(value), from, reckon_core::display_number(converted), to) }],
            "value": converted
        })),
        Err(e) => Ok(json!({
            "content": [{ "type": "text", "text": e.to_string() }],
            "isError": true
        })),
    }
}

fn tool_list_functions(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let category = args.get("category").and_then(|v| v.as_str());
    let functions = engine.evaluator().registry().list_functions(category);
    let text = functions
        .iter()
        .map(|f| format!("- {}: {}", f.usage, f.description))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(json!({ "content": [{ "type": "text", "text": text }], "data": to_json(&functions)? }))
}

fn tool_help(engine: &Engine, args: &JsonValue) -> Result<JsonValue, McpError> {
    let name = args.get("name").and_then(|v| v.as_str());
    match engine.evaluator().registry().help(name) {
        Some(help) => Ok(json!({ "content": [{ "type": "text", "text": format_help(&help) }], "data": help })),
        None => Ok(json!({
            "content": [{ "type": "text", "text": format!("No function or constant named '{}'", name.unwrap_or_default()) }],
            "isError": true
        })),
    }
}

fn format_help(help: &JsonValue) -> String {
    let mut out = String::new();
    if let Some(n) = help.get("name").and_then(|v| v.as_str()) {
        out.push_str(&format!("# {}\n\n", n));
    }
    if let Some(d) = help.get("description").and_then(|v| v.as_str()) {
        out.push_str(&format!("{}\n\n", d));
    }
    if let Some(u) = help.get("usage").and_then(|v| v.as_str()) {
        out.push_str(&format!("**Usage:** `{}`\n\n", u));
    }
    out
}
