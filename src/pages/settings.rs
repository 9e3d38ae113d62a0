use taskflow::application::Application;
use taskflow::sync::{ConnectionStatus, SyncStatus};

/// Show enough of a token to recognise it.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn settings_view(app: &Application) -> String {
    let mut out = String::from("GitHub connection\n");

    match app.tracker() {
        Some(config) => {
            if app.connection_status() == ConnectionStatus::Connected {
                out.push_str("  Connected Successfully!\n");
            }
            out.push_str(&format!("  Repository: {}\n", config.slug()));
            out.push_str(&format!("  Token:      {}\n", mask_token(&config.token)));
        }
        None => {
            out.push_str("  Not connected.\n");
            out.push_str(
                "  Connect a repository to sync tasks as issues. You need a Personal Access \
                 Token (Classic) with `repo` scope:\n  taskflow connect --token <TOKEN> --owner <OWNER> --repo <REPO>\n",
            );
        }
    }

    match app.sync_status() {
        SyncStatus::Idle => {}
        SyncStatus::Error(e) => out.push_str(&format!("  Last sync failed: {}\n", e)),
        SyncStatus::LastSynced(at) => out.push_str(&format!("  Last synced at {}\n", at)),
    }

    out.push_str("\nAI suggestions\n");
    if app.has_ai_credential() {
        out.push_str("  API key configured.\n");
    } else {
        out.push_str("  No API key; `generate` adds placeholder subtasks.\n");
        out.push_str("  Set ANTHROPIC_API_KEY or run `taskflow ai-key set <KEY>`.\n");
    }

    out
}
