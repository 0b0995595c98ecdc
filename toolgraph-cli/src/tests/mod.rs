//! Unit tests for toolgraph-cli, organized by module.
//!
//! Each submodule documents the behaviour under test. Workflow runs use `MockLlm` and local
//! tools, so no test needs network access or API keys.
