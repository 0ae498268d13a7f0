use console::{style, Term};
use orgctlapp::error::Result;
use orgctlapp::query::Chooser;

/// Asks on the terminal which of several matching records to use.
///
/// An empty answer declines, which the caller reports as an ambiguous match.
pub(super) struct TerminalChooser {
    term: Term,
}

impl TerminalChooser {
    pub(super) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Chooser for TerminalChooser {
    fn choose(&self, object: &str, candidates: &[String]) -> Result<Option<usize>> {
        self.term.write_line(&format!(
            "{} {} records match:",
            style(candidates.len()).bold(),
            object
        ))?;
        for (i, candidate) in candidates.iter().enumerate() {
            self.term
                .write_line(&format!("  {} {}", style(format!("{}.", i + 1)).yellow(), candidate))?;
        }

        loop {
            self.term.write_str(&format!(
                "Pick one [1-{}], or press enter to cancel: ",
                candidates.len()
            ))?;
            let line = self.term.read_line()?;
            match parse_choice(&line, candidates.len()) {
                Some(choice) => return Ok(choice),
                None => self
                    .term
                    .write_line(&style("Not a valid choice").red().to_string())?,
            }
        }
    }
}

/// `Some(None)` cancels, `Some(Some(i))` picks a zero-based index, `None` is invalid.
fn parse_choice(input: &str, count: usize) -> Option<Option<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Some(None);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(Some(n - 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_choices() {
        assert_eq!(parse_choice("", 3), Some(None));
        assert_eq!(parse_choice("  \n", 3), Some(None));
        assert_eq!(parse_choice("1", 3), Some(Some(0)));
        assert_eq!(parse_choice(" 3 ", 3), Some(Some(2)));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("two", 3), None);
    }
}
