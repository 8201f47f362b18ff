use clap::Args;

use santa_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:   {}", state.santa_dir.display()));
                lines.push("  config.toml: OK".to_string());
                let key = match state.load_key() {
                    Ok(_) => "OK".to_string(),
                    Err(e) => format!("error ({})", e),
                };
                lines.push(format!("  pii key:     {}", key));
                lines.push(format!("  status_port: {}", state.config.status_port));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", ctx.remote));

        for (label, path) in [("livez", "/_status/livez"), ("readyz", "/_status/readyz")] {
            let status = match ctx.client.get(ctx.remote_url(path)).send().await {
                Ok(resp) if resp.status().is_success() => "OK".to_string(),
                Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
                Err(_) => "NOT REACHABLE".to_string(),
            };
            lines.push(format!("  {:<7} {}", format!("{}:", label), status));
        }

        Ok(lines.join("\n"))
    }
}
