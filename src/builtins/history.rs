/*!
 * Command History
 */

/// Command lines in the order they were entered
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            self.entries.push(line.to_string());
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Numbered from 1
    pub fn lines(entries: &[String]) -> Vec<String> {
        entries
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>4}  {}", i + 1, line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_lines_are_not_recorded() {
        let mut history = History::new();
        history.record("ls -l\n");
        history.record("   ");
        history.record("jobs");

        assert_eq!(history.len(), 2);
        assert_eq!(
            History::lines(history.entries()),
            vec!["   1  ls -l".to_string(), "   2  jobs".to_string()]
        );
    }
}
