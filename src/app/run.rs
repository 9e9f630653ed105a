use super::cli::{Command, GetCommand, InitCommand};
use super::AppError;
use crate::config::GuardConfig;
use crate::installer::{run_installer, InstallerOptions};
use crate::kubeconfig::webhook_config;
use crate::pki::{init_ca, init_server, issue_client_certificate};
use crate::token::{dispatch, BrowserProviders, TokenOptions};
use crate::utils::{logging::Logger, prompt::TerminalConfirm};
use std::io::{self, Write};

fn emit(output: &str) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).map_err(AppError::Output)?;
    stdout.flush().map_err(AppError::Output)
}

pub fn run(command: Command, config: GuardConfig, logger: &mut dyn Logger) -> Result<(), AppError> {
    match command {
        Command::Init(InitCommand::Ca(args)) => {
            let config = config.with_pki_dir(args.pki_dir.as_deref());
            init_ca(&config, &mut TerminalConfirm::stdin(), logger)?;
        }
        Command::Init(InitCommand::Server(args)) => {
            let config = config.with_pki_dir(args.pki.pki_dir.as_deref());
            init_server(
                &config,
                &args.domains,
                &args.ips,
                &mut TerminalConfirm::stdin(),
                logger,
            )?;
        }
        Command::Init(InitCommand::Client(args)) => {
            let config = config.with_pki_dir(args.pki.pki_dir.as_deref());
            issue_client_certificate(
                &config,
                &args.names,
                &args.org,
                &mut TerminalConfirm::stdin(),
                logger,
            )?;
        }
        Command::Get(GetCommand::Token(args)) => {
            let options = TokenOptions {
                org: args.org,
                ldap: args.ldap,
            };
            dispatch(&options, &mut BrowserProviders, logger)?;
        }
        Command::Get(GetCommand::Installer(args)) => {
            let config = config.with_pki_dir(args.pki.pki_dir.as_deref());
            let mut options = InstallerOptions::from_config(&config);
            if let Some(namespace) = args.namespace {
                options.namespace = namespace;
            }
            if let Some(addr) = args.addr {
                options.addr = addr;
            }
            options.enable_rbac = args.rbac;
            options.token_auth_file = args.token_auth_file;

            let output = run_installer(&config, &options, logger)?;
            emit(&output)?;
        }
        Command::Get(GetCommand::WebhookConfig(args)) => {
            let config = config.with_pki_dir(args.pki.pki_dir.as_deref());
            let addr = args.addr.unwrap_or_else(|| config.addr.clone());
            let output = webhook_config(&config, &args.names, &args.org, &addr, logger)?;
            emit(&output)?;
        }
    }
    Ok(())
}
