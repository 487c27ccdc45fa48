/// Integration tests against a real SQLite database
mod completion_flow;
mod mcp_protocol;
