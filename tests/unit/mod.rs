/// Unit tests for the reward rules and configuration through the public API
mod config_tests;
mod reward_rules;
