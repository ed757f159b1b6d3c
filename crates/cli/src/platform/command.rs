// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Platform adapter that shells out to configurable command templates.
//!
//! Templates may reference `{app}`, `{dir}`, `{stack}`, `{buildpacks}`,
//! `{command}` and `{message}`. Values are shell-quoted on substitution;
//! `{buildpacks}` expands to each buildpack quoted and space separated.
//! Unknown `{...}` sequences (e.g. `${HOME}`) are left untouched.

use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use super::{AppHandle, Platform, PlatformError, PlatformOutcome};
use crate::env;

const GIT_IDENTITY: &str = "git -c user.name=deploycheck -c user.email=deploycheck@localhost";

/// Command templates for each platform operation, read from `[platform]`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformCommands {
    /// Shell used to interpret every template
    pub shell: String,
    /// Prepares the working copy before provisioning
    pub init: String,
    pub provision: String,
    pub set_buildpacks: String,
    pub commit: String,
    pub push: String,
    pub run: String,
    pub teardown: String,
    /// Extra attempts for a failing `provision`
    pub retries: u32,
}

impl Default for PlatformCommands {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            init: format!(
                "git init -q && git add -A && {} commit -q --allow-empty -m 'Initial commit'",
                GIT_IDENTITY
            ),
            provision: "heroku create {app} --stack {stack}".to_string(),
            set_buildpacks: "heroku buildpacks:clear --app {app} && \
                 for bp in {buildpacks}; do heroku buildpacks:add --app {app} \"$bp\" || exit 1; done"
                .to_string(),
            commit: format!(
                "git add -A && {} commit -q --allow-empty -m {{message}}",
                GIT_IDENTITY
            ),
            push: "git push -q heroku HEAD:main".to_string(),
            run: "heroku run --app {app} --exit-code --no-tty -- {command}".to_string(),
            teardown: "heroku apps:destroy {app} --confirm {app}".to_string(),
            retries: 0,
        }
    }
}

/// [`Platform`] implementation running [`PlatformCommands`] through a shell.
#[derive(Clone, Debug, Default)]
pub struct CommandPlatform {
    commands: PlatformCommands,
}

impl CommandPlatform {
    pub fn new(commands: PlatformCommands) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &PlatformCommands {
        &self.commands
    }

    /// Run one expanded template in the app's working copy, stderr folded into stdout.
    fn exec(
        &self,
        step: &'static str,
        template: &str,
        app: &AppHandle,
        extra: &[(&str, String)],
    ) -> Result<PlatformOutcome, PlatformError> {
        let mut values: Vec<(&str, String)> = vec![
            ("app", shell_quote(&app.name)),
            ("dir", shell_quote(&app.work_dir.to_string_lossy())),
            ("stack", shell_quote(&app.stack)),
        ];
        values.extend(extra.iter().cloned());
        let script = expand(template, &values);
        tracing::debug!(step, app = %app.name, script = %script, "running platform command");

        let output = Command::new(&self.commands.shell)
            .arg("-c")
            .arg(format!("{{ {}\n}} 2>&1", script))
            .current_dir(&app.work_dir)
            .env(env::DEPLOYCHECK_APP, &app.name)
            .env(env::DEPLOYCHECK_STACK, &app.stack)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PlatformError::Spawn { step, source })?;

        // Killed by a signal: report like a shell would.
        let exit_code = output.status.code().unwrap_or(-1);
        Ok(PlatformOutcome::new(
            exit_code,
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }

    fn exec_checked(
        &self,
        step: &'static str,
        template: &str,
        app: &AppHandle,
        extra: &[(&str, String)],
    ) -> Result<PlatformOutcome, PlatformError> {
        let outcome = self.exec(step, template, app, extra)?;
        if outcome.success() {
            Ok(outcome)
        } else {
            Err(PlatformError::CommandFailed {
                step,
                exit_code: outcome.exit_code,
                output: outcome.output,
            })
        }
    }
}

impl Platform for CommandPlatform {
    fn provision(&self, app: &AppHandle) -> Result<(), PlatformError> {
        if !self.commands.init.trim().is_empty() {
            self.exec_checked("init", &self.commands.init, app, &[])?;
        }

        let mut attempt = 0;
        loop {
            match self.exec_checked("provision", &self.commands.provision, app, &[]) {
                Ok(_) => return Ok(()),
                Err(err) if attempt < self.commands.retries => {
                    attempt += 1;
                    tracing::warn!(app = %app.name, attempt, error = %err, "retrying provision");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn set_buildpacks(&self, app: &AppHandle, buildpacks: &[String]) -> Result<(), PlatformError> {
        let quoted: Vec<String> = buildpacks.iter().map(|bp| shell_quote(bp)).collect();
        self.exec_checked(
            "set_buildpacks",
            &self.commands.set_buildpacks,
            app,
            &[("buildpacks", quoted.join(" "))],
        )?;
        Ok(())
    }

    fn commit(&self, app: &AppHandle, message: &str) -> Result<PlatformOutcome, PlatformError> {
        self.exec_checked(
            "commit",
            &self.commands.commit,
            app,
            &[("message", shell_quote(message))],
        )
    }

    fn push(&self, app: &AppHandle) -> Result<PlatformOutcome, PlatformError> {
        self.exec("push", &self.commands.push, app, &[])
    }

    fn run(&self, app: &AppHandle, command: &str) -> Result<PlatformOutcome, PlatformError> {
        self.exec(
            "run",
            &self.commands.run,
            app,
            &[("command", shell_quote(command))],
        )
    }

    fn teardown(&self, app: &AppHandle) -> Result<(), PlatformError> {
        if self.commands.teardown.trim().is_empty() {
            return Ok(());
        }
        self.exec_checked("teardown", &self.commands.teardown, app, &[])?;
        Ok(())
    }
}

/// Substitute `{name}` placeholders in a single pass.
pub(crate) fn expand(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Quote a value for POSIX `sh`.
pub(crate) fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
