//! Human-readable renderers for command results.
//!
//! Every renderer takes a `color` flag; ANSI styling is applied only when the
//! caller has established that stdout is a terminal.

use crate::api::types::{Agent, ChallengeStatus, CreatedAgent, VerificationResult};
use crate::display::mask_id;
use crate::init::InitOutcome;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

const PANEL_WIDTH: usize = 48;

/// Configuration report for `tether status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub credential_id: String,
    pub key_path: String,
    pub key_exists: bool,
    pub api_url: String,
    pub api_key_configured: bool,
    pub config_path: String,
}

enum Tone {
    Green,
    Red,
    Yellow,
    Cyan,
    Dim,
    Bold,
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Green => text.green().to_string(),
        Tone::Red => text.red().to_string(),
        Tone::Yellow => text.yellow().to_string(),
        Tone::Cyan => text.cyan().to_string(),
        Tone::Dim => text.dimmed().to_string(),
        Tone::Bold => text.bold().to_string(),
    }
}

fn rule(width: usize, color: bool) -> String {
    paint(&format!("  {}", "─".repeat(width)), Tone::Dim, color)
}

fn panel_line(text: &str) -> String {
    let pad = PANEL_WIDTH.saturating_sub(text.chars().count());
    format!("{}{}", text, " ".repeat(pad))
}

fn panel_title(text: &str) -> String {
    let visible = text.chars().count();
    let left = PANEL_WIDTH.saturating_sub(visible) / 2;
    let right = PANEL_WIDTH.saturating_sub(visible + left);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Boxed verify panel.
pub fn format_verify_result(result: &VerificationResult, color: bool) -> String {
    let hr = "─".repeat(PANEL_WIDTH);
    let title = if result.verified {
        "✓ Identity Verified"
    } else {
        "✗ Verification Failed"
    };
    let border = |s: &str| {
        if result.verified {
            paint(s, Tone::Green, color)
        } else {
            paint(s, Tone::Red, color)
        }
    };

    let mut rows = Vec::new();
    if result.verified {
        if let Some(name) = &result.agent_name {
            rows.push(format!("  Agent:  {name}"));
        }
        if let Some(url) = &result.verify_url {
            rows.push(format!("  URL:    {url}"));
        }
        if let Some(since) = result.registered_since.as_ref().and_then(|t| t.display()) {
            rows.push(format!("  Since:  {since}"));
        }
    } else if let Some(error) = &result.error {
        rows.push(format!("  {error}"));
    }

    let mut out = String::from("\n");
    out.push_str(&border(&format!("┌{hr}┐")));
    out.push('\n');
    out.push_str(&border("│"));
    out.push_str(&paint(&panel_title(title), Tone::Bold, color));
    out.push_str(&border("│"));
    out.push('\n');
    out.push_str(&border(&format!("├{hr}┤")));
    out.push('\n');
    for row in rows {
        out.push_str(&border("│"));
        out.push_str(&panel_line(&row));
        out.push_str(&border("│"));
        out.push('\n');
    }
    out.push_str(&border(&format!("└{hr}┘")));
    out.push('\n');
    out
}

pub fn format_status_report(report: &StatusReport, color: bool) -> String {
    let not_set = || paint("(not set)", Tone::Dim, color);
    let mut out = String::from("\n");
    out.push_str(&format!("  {}\n", paint("Tether Configuration", Tone::Bold, color)));
    out.push_str(&rule(30, color));
    out.push('\n');
    let credential = if report.credential_id.is_empty() {
        not_set()
    } else {
        mask_id(&report.credential_id)
    };
    out.push_str(&format!("  Credential:  {credential}\n"));
    if report.key_path.is_empty() {
        out.push_str(&format!("  Key path:    {}\n", not_set()));
    } else {
        out.push_str(&format!("  Key path:    {}\n", report.key_path));
        let exists = if report.key_exists {
            paint("yes", Tone::Green, color)
        } else {
            paint("no", Tone::Red, color)
        };
        out.push_str(&format!("  Key exists:  {exists}\n"));
    }
    out.push_str(&format!("  API URL:     {}\n", report.api_url));
    let api_key = if report.api_key_configured {
        paint("configured", Tone::Green, color)
    } else {
        not_set()
    };
    out.push_str(&format!("  API key:     {api_key}\n"));
    out.push_str(&format!("  Config file: {}\n", report.config_path));
    out
}

pub fn status_report_json(report: &StatusReport) -> serde_json::Value {
    let or_null = |s: &str| {
        if s.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::Value::String(s.to_string())
        }
    };
    let credential = if report.credential_id.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(mask_id(&report.credential_id))
    };
    serde_json::json!({
        "credentialId": credential,
        "keyPath": or_null(&report.key_path),
        "keyExists": report.key_exists,
        "apiUrl": report.api_url,
        "apiKeyConfigured": report.api_key_configured,
        "configPath": report.config_path,
    })
}

/// Status panel for `tether check`. `requested` is shown when the service omits the code.
pub fn format_challenge_status(status: &ChallengeStatus, requested: &str, color: bool) -> String {
    let mut out = String::from("\n");
    out.push_str(&format!("  {}\n", paint("Challenge Status", Tone::Bold, color)));
    out.push_str(&rule(30, color));
    out.push('\n');
    let code = status
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(requested);
    out.push_str(&format!("  Code:     {code}\n"));
    if let Some(state) = &status.status {
        out.push_str(&format!("  Status:   {state}\n"));
    }
    if let Some(agent) = status.agent_name.as_deref().filter(|a| !a.is_empty()) {
        out.push_str(&format!("  Agent:    {agent}\n"));
    }
    if let Some(created) = status.created_at.as_ref().and_then(|t| t.display()) {
        out.push_str(&format!("  Created:  {created}\n"));
    }
    if let Some(verified) = status.verified_at.as_ref().and_then(|t| t.display()) {
        out.push_str(&format!("  Verified: {verified}\n"));
    }
    out
}

pub fn format_created_agent(created: &CreatedAgent, color: bool) -> String {
    let agent = &created.agent;
    let mut out = String::from("\n");
    out.push_str(&format!("  {}\n", paint("✓ Agent created", Tone::Green, color)));
    out.push_str(&rule(40, color));
    out.push('\n');
    out.push_str(&format!("  ID:                 {}\n", agent.id));
    out.push_str(&format!("  Name:               {}\n", agent.agent_name));
    if let Some(description) = agent.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("  Description:        {description}\n"));
    }
    out.push_str(&format!(
        "  Registration Token: {}\n\n",
        paint(&created.registration_token, Tone::Yellow, color)
    ));
    out.push_str(&format!(
        "  {}\n",
        paint(
            "Save the registration token. It cannot be retrieved later.",
            Tone::Dim,
            color
        )
    ));
    out
}

pub fn format_agent_list(agents: &[Agent], color: bool) -> String {
    if agents.is_empty() {
        return format!("\n  {}\n", paint("No agents found.", Tone::Dim, color));
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "ID", "Description", "Created", "Last verified"]);
    for agent in agents {
        let dash = || "-".to_string();
        table.add_row(vec![
            paint(&agent.agent_name, Tone::Cyan, color),
            agent.id.clone(),
            agent.description.clone().filter(|d| !d.is_empty()).unwrap_or_else(dash),
            agent
                .created_at
                .as_ref()
                .and_then(|t| t.display())
                .unwrap_or_else(dash),
            agent
                .last_verified_at
                .as_ref()
                .and_then(|t| t.display())
                .unwrap_or_else(dash),
        ]);
    }
    format!(
        "\n  {}\n{}\n",
        paint(&format!("Agents ({})", agents.len()), Tone::Bold, color),
        table
    )
}

pub fn format_agent_deleted(id: &str, color: bool) -> String {
    format!(
        "\n  {}\n  {}\n",
        paint("✓ Agent deleted", Tone::Green, color),
        paint(&format!("ID: {id}"), Tone::Dim, color)
    )
}

pub fn format_init_outcome(outcome: &InitOutcome, color: bool) -> String {
    let mut out = String::from("\n");
    out.push_str(&format!("  {}\n", paint("✓ Configuration saved", Tone::Green, color)));
    out.push_str(&rule(40, color));
    out.push('\n');
    out.push_str(&format!("  Config file: {}\n", outcome.config_path.display()));
    out.push_str(&format!("  Credential:  {}\n", mask_id(&outcome.credential_id)));
    out.push_str(&format!("  Key path:    {}\n", outcome.key_path.display()));
    if let Some(generated) = &outcome.generated {
        out.push_str(&format!("  Public key:  {}\n", generated.public_key.display()));
    }
    if !outcome.key_exists {
        out.push_str(&format!(
            "  {}\n",
            paint("Private key file not found yet.", Tone::Yellow, color)
        ));
    }
    out.push_str(&format!(
        "\n  Run {} to test your setup.\n",
        paint("tether verify", Tone::Cyan, color)
    ));
    out
}

pub fn init_outcome_json(outcome: &InitOutcome) -> serde_json::Value {
    let generated = outcome.generated.as_ref().map(|g| {
        serde_json::json!({
            "privateKey": g.private_key.display().to_string(),
            "publicKey": g.public_key.display().to_string(),
        })
    });
    serde_json::json!({
        "configPath": outcome.config_path.display().to_string(),
        "credentialId": mask_id(&outcome.credential_id),
        "keyPath": outcome.key_path.display().to_string(),
        "keyExists": outcome.key_exists,
        "generated": generated,
        "apiKeyUpdated": outcome.api_key_updated,
    })
}

pub fn format_error(message: &str, color: bool) -> String {
    paint(&format!("Error: {message}"), Tone::Red, color)
}
