use anyhow::Context as _;
use std::process::{Child, Command};
use std::time::Duration;

pub use swagger_mcp_test_support::{EchoUpstream, KillOnDrop};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    swagger_mcp_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    swagger_mcp_test_support::wait_http_ok(url, timeout_dur).await
}

/// Spawn `swagger-mcp` on the HTTP transport. `extra` is appended to the base arguments.
pub fn spawn_server(
    spec_path: &std::path::Path,
    port: u16,
    extra: &[&str],
) -> anyhow::Result<Child> {
    let bin = env!("CARGO_BIN_EXE_swagger-mcp");
    Command::new(bin)
        .arg("--spec")
        .arg(spec_path)
        .arg("--transport")
        .arg("http")
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info")
        .args(extra)
        .env_remove("RUST_LOG")
        .spawn()
        .context("spawn swagger-mcp")
}
