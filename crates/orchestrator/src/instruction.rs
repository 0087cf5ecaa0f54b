//! Instruction template rendering against a state snapshot.

use toneflow_core::SessionState;

/// Render `{key}` placeholders in an instruction template from the
/// current state. Pure function over an explicit snapshot: there is no
/// ambient lookup, and placeholders without a matching key are left
/// intact.
pub fn render_instruction(template: &str, state: &SessionState) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match state.get(key) {
                    Some(value) => rendered.push_str(value),
                    None => {
                        rendered.push('{');
                        rendered.push_str(key);
                        rendered.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                // Unterminated placeholder, keep the rest verbatim.
                rendered.push('{');
                rest = after;
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(key: &str, value: &str) -> SessionState {
        let mut state = SessionState::new();
        state.set(key, value);
        state
    }

    #[test]
    fn test_renders_known_key() {
        let state = state_with("current_number", "4");
        let rendered = render_instruction("severity is {current_number}.", &state);
        assert_eq!(rendered, "severity is 4.");
    }

    #[test]
    fn test_unknown_key_left_intact() {
        let state = SessionState::new();
        let rendered = render_instruction("severity is {current_number}.", &state);
        assert_eq!(rendered, "severity is {current_number}.");
    }

    #[test]
    fn test_multiple_placeholders() {
        let mut state = SessionState::new();
        state.set("a", "1");
        state.set("b", "2");
        assert_eq!(render_instruction("{a}+{b}={a}{b}", &state), "1+2=12");
    }

    #[test]
    fn test_no_placeholders_is_identity() {
        let state = SessionState::new();
        let template = "You are a dice. Return a number between 1 and 6.";
        assert_eq!(render_instruction(template, &state), template);
    }

    #[test]
    fn test_unterminated_brace_kept() {
        let state = state_with("a", "1");
        assert_eq!(render_instruction("{a} and {b", &state), "1 and {b");
    }
}
