/// JSON-RPC round trips through the MCP server
use habit_quest_mcp::mcp::protocol::{error_codes, JsonRpcResponse};
use habit_quest_mcp::mcp::McpServer;
use habit_quest_mcp::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

async fn new_server(temp_file: &NamedTempFile) -> McpServer {
    let quest = HabitQuestServer::new(temp_file.path().to_path_buf(), RewardConfig::default())
        .await
        .expect("Failed to create server");
    McpServer::new(quest)
}

async fn send(server: &mut McpServer, request: Value) -> JsonRpcResponse {
    server
        .handle_line(&request.to_string())
        .await
        .expect("Expected a response")
}

async fn call_tool(server: &mut McpServer, id: u64, name: &str, arguments: Value) -> JsonRpcResponse {
    send(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }),
    )
    .await
}

fn result_text(response: &JsonRpcResponse) -> String {
    let result = response.result.as_ref().expect("Expected a result");
    result["content"][0]["text"].as_str().unwrap_or_default().to_string()
}

#[cfg(test)]
mod mcp_protocol_tests {
    use super::*;

    #[tokio::test]
    async fn test_handshake_and_tool_listing() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = new_server(&temp_file).await;

        let init = send(
            &mut server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "test-client", "version": "1.0" }
                }
            }),
        )
        .await;
        let result = init.result.expect("Expected initialize result");
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "Habit Quest MCP");

        let ack = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(ack.is_none());
        assert!(server.is_initialized());

        let listed = send(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = listed.result.expect("Expected tools")["tools"].as_array().cloned().unwrap();
        let names: Vec<_> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        assert_eq!(
            names,
            vec!["habit_create", "habit_complete", "habit_list", "habit_status", "habit_update", "player_profile"]
        );
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_create_and_complete_over_json_rpc() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = new_server(&temp_file).await;

        let created = call_tool(
            &mut server,
            1,
            "habit_create",
            json!({ "name": "Meditate", "cadence": "daily", "difficulty": "medium" }),
        )
        .await;
        let text = result_text(&created);
        let habit_id = text
            .lines()
            .find_map(|line| line.strip_prefix("Habit ID: "))
            .expect("Habit ID in response")
            .to_string();

        let completed = call_tool(&mut server, 2, "habit_complete", json!({ "habit_id": habit_id })).await;
        assert!(completed.error.is_none());
        let text = result_text(&completed);
        assert!(text.contains("Completed 'Meditate'"));
        assert!(text.contains("First Steps"));

        let again = call_tool(&mut server, 3, "habit_complete", json!({ "habit_id": habit_id })).await;
        let error = again.error.expect("Expected an error");
        assert_eq!(error.code, error_codes::ALREADY_COMPLETED);

        let profile = call_tool(&mut server, 4, "player_profile", json!({})).await;
        assert!(result_text(&profile).contains("45 lifetime XP"));
    }

    #[tokio::test]
    async fn test_error_responses() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut server = new_server(&temp_file).await;

        let missing = call_tool(
            &mut server,
            1,
            "habit_complete",
            json!({ "habit_id": "00000000-0000-0000-0000-000000000000" }),
        )
        .await;
        assert_eq!(missing.error.unwrap().code, error_codes::HABIT_NOT_FOUND);

        let bad_args = call_tool(&mut server, 2, "habit_create", json!({ "name": 42 })).await;
        assert_eq!(bad_args.error.unwrap().code, error_codes::INVALID_PARAMS);

        let bad_cadence = call_tool(&mut server, 3, "habit_create", json!({ "name": "Nap", "cadence": "hourly" })).await;
        assert_eq!(bad_cadence.error.unwrap().code, error_codes::VALIDATION_ERROR);

        let unknown = send(&mut server, json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"})).await;
        assert_eq!(unknown.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let garbage = server.handle_line("{not json").await.unwrap();
        assert_eq!(garbage.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        tokio_test::block_on(async {
            let mut server = new_server(&temp_file).await;
            assert!(server.handle_line("   \n").await.is_none());
        });
    }
}
