//! Subcommand dispatch and execution.
//!
//! [`dispatch`] hands the parsed CLI to [`run`], [`init`], [`validate`] or
//! [`health`]. With no subcommand it prints the built-in route table and
//! the variables that override it.

pub mod health;
pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::config::model::DEFAULT_ROUTES;
use crate::error::GatewayError;

pub async fn dispatch(cli: Cli) -> Result<(), GatewayError> {
    let Some(command) = cli.command else {
        print!("{}", welcome());
        return Ok(());
    };

    match command {
        Commands::Run(args) => run::execute(*args).await,
        Commands::Init(args) => init::execute(&args),
        Commands::Validate(args) => validate::execute(&args),
        Commands::Health(args) => health::execute(args).await,
    }
}

fn welcome() -> String {
    use std::fmt::Write;

    let mut out = format!(
        "\n  platform-gateway v{}: API gateway for the service platform\n\n  \
         Built-in routes (override with the variable shown):\n\n",
        env!("CARGO_PKG_VERSION")
    );
    let width = DEFAULT_ROUTES.iter().map(|(p, _, _)| p.len()).max().unwrap_or(0);
    for (prefix, var, url) in DEFAULT_ROUTES {
        // write! to String is infallible
        let _ = writeln!(out, "    {prefix:<width$}  {url}  ${var}");
    }
    out.push_str(
        "\n  platform-gateway run                   Start on 0.0.0.0:5000\n  \
         platform-gateway init                  Write gateway.yaml with these defaults\n  \
         platform-gateway validate --env        Check gateway.yaml with overrides applied\n  \
         platform-gateway --help                See all commands and options\n\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_lists_every_default_route() {
        let text = welcome();
        for (prefix, var, url) in DEFAULT_ROUTES {
            let line = text
                .lines()
                .find(|l| l.trim_start().starts_with(&format!("{prefix} ")))
                .unwrap_or_else(|| panic!("{prefix} missing"));
            assert!(line.contains(url) && line.contains(var), "{line}");
        }
    }
}
