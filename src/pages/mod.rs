pub mod settings;
pub mod task_list;

/// Boxed message for failures the user has to act on.
pub fn alert(message: &str) -> String {
    let width = message.chars().count() + 4;
    let border = "-".repeat(width);
    format!("{}\n| {} |\n{}\n", border, message, border)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_frames_message() {
        assert_eq!(alert("Oops"), "--------\n| Oops |\n--------\n");
    }
}
