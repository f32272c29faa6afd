use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use campus_auth::{AuthContext, PrincipalPatch, SessionState};
use campus_shared::types::{AuthError, LoginRequest, LoginResponse, SessionResponse};

use crate::Command;

pub async fn run(ctx: &AuthContext, command: Command) -> Result<ExitCode> {
    match command {
        Command::Login {
            email,
            password,
            json,
        } => {
            let request = if json {
                read_request().context("Failed to read login request from stdin")?
            } else {
                let secret = match password {
                    Some(p) => p,
                    None => read_secret().context("Failed to read password from stdin")?,
                };
                LoginRequest {
                    identifier: email.unwrap_or_default(),
                    secret,
                }
            };
            login(ctx, request).await
        }
        Command::Logout => {
            ctx.end_session().await;
            print_json(&SessionResponse::Success {
                message: "Logged out successfully".to_string(),
                principal: None,
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            let snapshot = ctx.snapshot().await;
            print_json(&snapshot)?;
            Ok(exit_code(snapshot.state == SessionState::Authenticated))
        }
        Command::SwitchRole { role } => match ctx.try_switch_role(role).await {
            Ok(principal) => {
                print_json(&SessionResponse::Success {
                    message: format!("Now viewing as {}", role),
                    principal: Some(principal),
                })?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => fail(&e),
        },
        Command::Can { capability } => {
            let allowed = ctx.has_permission(&capability).await;
            info!("Capability '{}' allowed: {}", capability, allowed);
            print_json(&serde_json::json!({
                "capability": capability,
                "allowed": allowed,
            }))?;
            Ok(exit_code(allowed))
        }
        Command::Update {
            name,
            email,
            department,
            title,
            year,
            student_id,
        } => {
            let patch = PrincipalPatch {
                name,
                email,
                department,
                student_id,
                year,
                title,
            };
            if patch.is_empty() {
                warn!("Update called without any fields");
            }

            match ctx.update_principal(patch).await {
                Ok(principal) => {
                    print_json(&SessionResponse::Success {
                        message: "Profile updated".to_string(),
                        principal: Some(principal),
                    })?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => fail(&e),
            }
        }
        Command::Principals => {
            print_json(&ctx.provider().principals())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn login(ctx: &AuthContext, request: LoginRequest) -> Result<ExitCode> {
    let delay = ctx.settings().login_delay();
    if !delay.is_zero() {
        debug!("Login delay: {}ms", delay.as_millis());
    }

    match ctx.authenticate(&request.identifier, &request.secret).await {
        Ok(principal) => {
            let expires_in = ctx.expires_in().await.unwrap_or(0);
            print_json(&LoginResponse::Success {
                principal,
                expires_in,
                message: "Login successful".to_string(),
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            warn!("Login failed: {}", e.to_code());
            print_json(&e.to_response())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn fail(e: &AuthError) -> Result<ExitCode> {
    warn!("Command failed: {}", e);
    print_json(&e.to_session_response())?;
    Ok(ExitCode::FAILURE)
}

fn read_request() -> Result<LoginRequest> {
    let request = serde_json::from_reader(io::stdin().lock())?;
    Ok(request)
}

fn read_secret() -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    println!("{}", json);
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
