/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Processes tool calls against the habit quest server
/// 3. Sends JSON-RPC responses to stdout

use chrono::{Local, NaiveDateTime};
use schemars::{schema_for, JsonSchema};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::storage::StorageError;
use crate::tools;
use crate::{HabitQuestServer, ServerError};

/// A failed tool call, already mapped to its JSON-RPC code
struct ToolFailure {
    code: i32,
    message: String,
}

impl From<StorageError> for ToolFailure {
    fn from(error: StorageError) -> Self {
        Self {
            code: storage_error_to_json_rpc_code(&error),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ToolFailure {
    fn from(error: serde_json::Error) -> Self {
        Self {
            code: error_codes::INVALID_PARAMS,
            message: format!("Invalid arguments: {}", error),
        }
    }
}

type ToolOutcome = Result<ToolCallResult, ToolFailure>;

/// MCP server that handles communication with the client
pub struct McpServer {
    quest: HabitQuestServer,
    /// Whether the client finished the initialize handshake
    initialized: bool,
}

/// Deserialize tool arguments into a typed parameter struct
fn parse_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(args))
}

/// Build a tool definition whose input schema is derived from its parameter type
fn tool_definition<T: JsonSchema>(name: &str, description: &str) -> Result<ToolDefinition, serde_json::Error> {
    Ok(ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema_for!(T))?,
    })
}

/// Current local wall-clock time; streak windows follow the user's calendar
fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(quest: HabitQuestServer) -> Self {
        Self {
            quest,
            initialized: false,
        }
    }

    /// Whether the client completed the initialize handshake
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" | "notifications/initialized" => {
                self.handle_notification(&request.method);
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        match &params.client_info {
            Some(client) => info!(
                "MCP client connected: {} {} (protocol {})",
                client.name,
                client.version.as_deref().unwrap_or("?"),
                params.protocol_version.as_deref().unwrap_or("?")
            ),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Quest MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Self::respond(id, &result)
    }

    /// All tools this server provides
    fn tool_definitions() -> Result<Vec<ToolDefinition>, serde_json::Error> {
        Ok(vec![
            tool_definition::<tools::CreateHabitParams>(
                "habit_create",
                "Create a new daily or weekly habit with an easy, medium or hard difficulty",
            )?,
            tool_definition::<tools::CompleteHabitParams>(
                "habit_complete",
                "Mark a habit complete, updating its streak and awarding XP, levels and achievements",
            )?,
            tool_definition::<tools::ListHabitsParams>(
                "habit_list",
                "List habits with their streaks, completions and XP earned",
            )?,
            tool_definition::<tools::StatusParams>(
                "habit_status",
                "Check which habits are done, due or broken for the current day or week",
            )?,
            tool_definition::<tools::UpdateHabitParams>(
                "habit_update",
                "Rename, re-describe, change the difficulty of, pause or resume a habit",
            )?,
            tool_definition::<tools::ProfileParams>(
                "player_profile",
                "Show the player's level, XP progress and achievement badges",
            )?,
        ])
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        match Self::tool_definitions() {
            Ok(tools) => JsonRpcResponse::success(id, json!({ "tools": tools })),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to build tool schemas: {}", e),
                None,
            ),
        }
    }

    /// Handle tools/call request
    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let name = tool_params.name;
        let args = tool_params.arguments;
        let outcome = match name.as_str() {
            "habit_create" => self.call_habit_create(args),
            "habit_complete" => self.call_habit_complete(args),
            "habit_list" => self.call_habit_list(args),
            "habit_status" => self.call_habit_status(args),
            "habit_update" => self.call_habit_update(args),
            "player_profile" => self.call_player_profile(args),
            _ => Ok(ToolCallResult::error(format!("Unknown tool: {}", name))),
        };

        match outcome {
            Ok(result) => Self::respond(id, &result),
            Err(failure) => {
                warn!("Tool '{}' failed: {}", name, failure.message);
                JsonRpcResponse::error(id, failure.code, failure.message, Some(json!({ "tool": name })))
            }
        }
    }

    fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize result: {}", e),
                None,
            ),
        }
    }

    /// Call the habit_create tool
    fn call_habit_create(&self, args: Map<String, Value>) -> ToolOutcome {
        let response = tools::create_habit(self.quest.storage(), parse_args(args)?)?;
        let message = match &response.habit_id {
            Some(habit_id) => format!("{}\nHabit ID: {}", response.message, habit_id),
            None => response.message,
        };
        Ok(ToolCallResult::success(message))
    }

    /// Call the habit_complete tool
    fn call_habit_complete(&self, args: Map<String, Value>) -> ToolOutcome {
        let response = tools::complete_habit(
            self.quest.storage(),
            self.quest.engine(),
            parse_args(args)?,
            local_now(),
        )?;
        Ok(ToolCallResult::success(response.message))
    }

    /// Call the habit_status tool
    fn call_habit_status(&self, args: Map<String, Value>) -> ToolOutcome {
        let response = tools::get_habit_status(
            self.quest.storage(),
            self.quest.engine(),
            parse_args(args)?,
            local_now(),
        )?;
        Ok(ToolCallResult::success(response.message))
    }

    /// Call the habit_update tool
    fn call_habit_update(&self, args: Map<String, Value>) -> ToolOutcome {
        let response = tools::update_habit(self.quest.storage(), parse_args(args)?)?;
        Ok(ToolCallResult::success(response.message))
    }

    /// Call the player_profile tool
    fn call_player_profile(&self, args: Map<String, Value>) -> ToolOutcome {
        let response = tools::get_player_profile(self.quest.storage(), self.quest.engine(), parse_args(args)?)?;
        Ok(ToolCallResult::success(response.message))
    }

    /// Call the habit_list tool
    fn call_habit_list(&self, args: Map<String, Value>) -> ToolOutcome {
        let response = tools::list_habits(self.quest.storage(), parse_args(args)?)?;

        if response.habits.is_empty() {
            return Ok(ToolCallResult::success(
                "No habits found. Create your first habit to get started!".to_string(),
            ));
        }

        let header = format!("📋 **Habit Summary** ({} habits)\n\n", response.summary.total_habits);

        let detailed_list = response
            .habits
            .iter()
            .map(|h| {
                format!(
                    "🎯 **{}** ({} · {})\n   🔥 Streak: {} (best {}) | ✅ Total: {} | ✨ XP: {}{}\n   ID: {}",
                    h.name,
                    h.cadence,
                    h.difficulty,
                    h.current_streak,
                    h.longest_streak,
                    h.total_completions,
                    h.total_xp_earned,
                    if h.is_active { "" } else { " ⏸️ (paused)" },
                    h.habit_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let overall_stats = format!(
            "\n\n📊 **Overall Stats**\n- Active habits: {}\n- Completions: {}\n- Best current streak: {}",
            response.summary.active_habits,
            response.summary.total_completions,
            response.summary.best_current_streak
        );

        Ok(ToolCallResult::success(format!("{}{}{}", header, detailed_list, overall_stats)))
    }
}
