//! Comment and blank-line runs waiting for an owner.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Trivia {
    Comment { text: String, col: usize },
    Blank,
}

/// Trivia consumed between two structural positions, in source order.
#[derive(Debug, Default)]
pub(super) struct Pending {
    entries: Vec<Trivia>,
}

/// A run between two siblings, cut at its last blank line.
pub(super) struct SiblingSplit {
    /// Comments before the last blank: they close the previous sibling.
    pub detached: Vec<String>,
    pub blank: bool,
    /// Comments after the last blank: they open the next sibling.
    pub adjacent: Vec<String>,
}

fn comment_texts(entries: &[Trivia]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|t| match t {
            Trivia::Comment { text, .. } => Some(text.clone()),
            Trivia::Blank => None,
        })
        .collect()
}

impl Pending {
    pub fn from_comments(lines: Vec<String>, col: usize) -> Self {
        Self {
            entries: lines
                .into_iter()
                .map(|text| Trivia::Comment { text, col })
                .collect(),
        }
    }

    pub fn push_comment(&mut self, text: String, col: usize) {
        self.entries.push(Trivia::Comment { text, col });
    }

    pub fn push_blank(&mut self) {
        self.entries.push(Trivia::Blank);
    }

    pub fn append(&mut self, mut other: Self) {
        self.entries.append(&mut other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drop_leading_blanks(&mut self) {
        let blanks = self
            .entries
            .iter()
            .take_while(|t| **t == Trivia::Blank)
            .count();
        self.entries.drain(..blanks);
    }

    pub fn split_siblings(self) -> SiblingSplit {
        match self.entries.iter().rposition(|t| *t == Trivia::Blank) {
            Some(last_blank) => SiblingSplit {
                detached: comment_texts(&self.entries[..last_blank]),
                blank: true,
                adjacent: comment_texts(&self.entries[last_blank + 1..]),
            },
            None => SiblingSplit {
                detached: Vec::new(),
                blank: false,
                adjacent: comment_texts(&self.entries),
            },
        }
    }

    /// Take the comments that close a collection at `indent` which ends
    /// because a token at `next_col` (`None` at end of input) dedents.
    ///
    /// Claiming starts at the first comment and stops at the first blank
    /// line after a claimed comment or at the first comment too shallow to
    /// belong. Returns whether a blank line preceded the claimed run.
    pub fn claim(&mut self, indent: usize, next_col: Option<usize>) -> Option<(bool, Vec<String>)> {
        let belongs = |col: usize| col >= indent && next_col.is_none_or(|t| col > t);
        let blanks = self
            .entries
            .iter()
            .take_while(|t| **t == Trivia::Blank)
            .count();
        let claimed = self.entries[blanks..]
            .iter()
            .take_while(|t| matches!(t, Trivia::Comment { col, .. } if belongs(*col)))
            .count();
        if claimed == 0 {
            return None;
        }
        let lines = comment_texts(&self.entries[blanks..blanks + claimed]);
        self.entries.drain(..blanks + claimed);
        Some((blanks > 0, lines))
    }

    /// Leading comments indented past `indent`, up to the first blank line.
    pub fn take_indented(&mut self, indent: usize) -> Vec<String> {
        let count = self
            .entries
            .iter()
            .take_while(|t| matches!(t, Trivia::Comment { col, .. } if *col > indent))
            .count();
        let lines = comment_texts(&self.entries[..count]);
        self.entries.drain(..count);
        lines
    }

    /// All comments as one leading block, and whether any blank line was seen.
    pub fn into_leading(self) -> (Vec<String>, bool) {
        let blank = self.entries.contains(&Trivia::Blank);
        (comment_texts(&self.entries), blank)
    }

    /// All comments as one trailing block, and whether a blank line came
    /// before the first of them. Blank lines after the last comment vanish.
    pub fn into_trailing(self) -> (Vec<String>, bool) {
        let blank = self
            .entries
            .iter()
            .position(|t| matches!(t, Trivia::Comment { .. }))
            .is_some_and(|first| first > 0);
        (comment_texts(&self.entries), blank)
    }
}

/// Join comment lines into a stored comment block.
pub(super) fn join(lines: Vec<String>) -> Option<String> {
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Append comment lines to an existing comment block.
pub(super) fn append_comment(slot: &mut Option<String>, lines: Vec<String>) {
    let Some(extra) = join(lines) else { return };
    *slot = Some(match slot.take() {
        Some(existing) => format!("{existing}\n{extra}"),
        None => extra,
    });
}

/// Put comment lines in front of an existing comment block.
pub(super) fn prepend_comment(slot: &mut Option<String>, lines: Vec<String>) {
    let Some(first) = join(lines) else { return };
    *slot = Some(match slot.take() {
        Some(existing) => format!("{first}\n{existing}"),
        None => first,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(items: &[(&str, usize)]) -> Pending {
        let mut pending = Pending::default();
        for &(text, col) in items {
            if text.is_empty() {
                pending.push_blank();
            } else {
                pending.push_comment(text.to_string(), col);
            }
        }
        pending
    }

    #[test]
    fn sibling_split_cuts_at_last_blank() {
        let split = run(&[("a", 0), ("", 0), ("b", 0), ("", 0), ("c", 0)]).split_siblings();
        assert_eq!(split.detached, vec!["a", "b"]);
        assert!(split.blank);
        assert_eq!(split.adjacent, vec!["c"]);
    }

    #[test]
    fn sibling_split_without_blank_is_all_adjacent() {
        let split = run(&[("a", 0), ("b", 2)]).split_siblings();
        assert!(split.detached.is_empty());
        assert!(!split.blank);
        assert_eq!(split.adjacent, vec!["a", "b"]);
    }

    #[test]
    fn claim_takes_indented_run() {
        let mut pending = run(&[("", 0), ("a", 2), ("b", 2), ("c", 0)]);
        let (blank, lines) = pending.claim(2, Some(0)).expect("claimed");
        assert!(blank);
        assert_eq!(lines, vec!["a", "b"]);
        let (rest, _) = pending.into_leading();
        assert_eq!(rest, vec!["c"]);
    }

    #[test]
    fn claim_stops_at_blank_after_claimed() {
        let mut pending = run(&[("a", 2), ("", 0), ("b", 2)]);
        let (blank, lines) = pending.claim(2, Some(0)).expect("claimed");
        assert!(!blank);
        assert_eq!(lines, vec!["a"]);
        assert!(pending.split_siblings().blank);
    }

    #[test]
    fn claim_rejects_comment_at_next_column() {
        let mut pending = run(&[("a", 0)]);
        assert!(pending.claim(0, Some(0)).is_none());
        assert!(pending.claim(0, None).is_some());
    }

    #[test]
    fn trailing_drops_blanks_but_reports_leading_gap() {
        let (lines, blank) = run(&[("", 0), ("a", 0), ("", 0)]).into_trailing();
        assert_eq!(lines, vec!["a"]);
        assert!(blank);
    }

    #[test]
    fn comment_slots() {
        let mut slot = None;
        append_comment(&mut slot, vec!["b".into()]);
        prepend_comment(&mut slot, vec!["a".into()]);
        append_comment(&mut slot, Vec::new());
        assert_eq!(slot.as_deref(), Some("a\nb"));
    }
}
