//! Keep the console window open until the user acknowledges the result.

use std::io::{BufRead, Write};

const PROMPT: &str = "\nPress Enter to exit...";

/// Whether to wait for Enter before exiting.
///
/// Interrupted runs and non-interactive stdin never wait.
pub(crate) const fn should_pause(no_pause: bool, interrupted: bool, interactive: bool) -> bool {
    !no_pause && !interrupted && interactive
}

pub(crate) fn pause_before_exit(input: &mut impl BufRead, out: &mut impl Write) {
    let _ = write!(out, "{PROMPT}");
    let _ = out.flush();
    let mut line = String::new();
    let _ = input.read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn pauses_only_for_interactive_uninterrupted_runs() {
        assert!(should_pause(false, false, true));
        assert!(!should_pause(true, false, true));
        assert!(!should_pause(false, true, true));
        assert!(!should_pause(false, false, false));
    }

    #[test]
    fn prompt_waits_for_one_line() {
        let mut input = Cursor::new(b"\nleftover\n".to_vec());
        let mut out = Vec::new();
        pause_before_exit(&mut input, &mut out);
        assert_eq!(String::from_utf8(out).expect("utf-8"), PROMPT);
        assert_eq!(input.position(), 1);
    }
}
