// src/session/render.rs - Side-by-side display of a candidate set
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::matching::CandidateSet;
use crate::table::{RecordId, Table};

const MIN_PROPERTY_WIDTH: usize = 12;
const MAX_PROPERTY_WIDTH: usize = 36;
const MIN_RECORD_WIDTH: usize = 8;
const HIGHLIGHT_MARK: &str = "» ";
const DIFFERS_MARK: &str = "≠";

pub const HELP_TEXT: &str = "\
Dedupe help

  N, Enter      Skip to the next set of duplicate records.
  P             Go back to the previous set.
  D 2           Delete record 2. Several at once: D 2 3
  M 8 2,1       Move (copy) property 8 from record 2 to record 1.
                The property may also be given by name: M url 2,1
  U             Undo the last delete or move in this set.
  S             Save the dataset now and keep reviewing.
  Q             Quit without saving changes made since the last save.
  H, ?          Show this help.

Rows marked ≠ differ between the records; » marks the last moved value.
Press ENTER to return to editing.";

/// What is needed to draw one set.
pub struct SetView<'a> {
    /// 0-based index of the set in the session
    pub position: usize,
    pub total: usize,
    pub set: &'a CandidateSet,
    pub table: &'a Table,
    pub highlight: Option<(RecordId, usize)>,
}

impl SetView<'_> {
    /// (1-based member number, id) of members still in the table.
    pub fn present_members(&self) -> Vec<(usize, RecordId)> {
        present_members(self.set, self.table)
    }
}

pub fn present_members(set: &CandidateSet, table: &Table) -> Vec<(usize, RecordId)> {
    set.members
        .iter()
        .enumerate()
        .filter(|(_, id)| table.contains(**id))
        .map(|(i, id)| (i + 1, *id))
        .collect()
}

pub fn render_set<W: Write>(out: &mut W, view: &SetView<'_>, width: usize) -> io::Result<()> {
    let members = view.present_members();
    writeln!(
        out,
        "[{}/{}] {}",
        view.position + 1,
        view.total,
        view.set.key
    )?;
    if members.is_empty() {
        return writeln!(out, "(every record in this set has been deleted)");
    }

    let columns = view.table.columns();
    let longest_column = columns.iter().map(|c| display_width(c)).max().unwrap_or(0);
    let property_width = (longest_column + 4).clamp(MIN_PROPERTY_WIDTH, MAX_PROPERTY_WIDTH);
    let n = members.len();
    let record_width = (width.saturating_sub(property_width + 4 + 3 * n) / n).max(MIN_RECORD_WIDTH);

    let rule = |left: &str, mid: &str, right: &str| {
        let mut line = String::from(left);
        line.push_str(&"─".repeat(property_width + 2));
        for _ in 0..n {
            line.push_str(mid);
            line.push_str(&"─".repeat(record_width + 2));
        }
        line.push_str(right);
        line
    };

    writeln!(out, "{}", rule("╭", "┬", "╮"))?;
    let mut header = format!("│ {} ", pad_right("Property", property_width));
    for (number, id) in &members {
        let label = format!("Record {} ({})", number, id);
        header.push_str(&format!("│ {} ", pad_right(&label, record_width)));
    }
    header.push('│');
    writeln!(out, "{}", header)?;
    writeln!(out, "{}", rule("├", "┼", "┤"))?;

    for (col_idx, column) in columns.iter().enumerate() {
        let values: Vec<&str> = members
            .iter()
            .map(|(_, id)| view.table.value(*id, col_idx).unwrap_or(""))
            .collect();
        let differs = values.iter().any(|v| v.trim() != values[0].trim());
        let marker = if differs { DIFFERS_MARK } else { " " };
        let property = format!("{}{:2} {}", marker, col_idx + 1, column);

        let mut line = format!("│ {} ", pad_right(&property, property_width));
        for ((_, id), value) in members.iter().zip(values) {
            let cell = if view.highlight == Some((*id, col_idx)) {
                format!("{}{}", HIGHLIGHT_MARK, value)
            } else {
                value.to_string()
            };
            line.push_str(&format!("│ {} ", pad_right(&cell, record_width)));
        }
        line.push('│');
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "{}", rule("╰", "┴", "╯"))
}

pub fn render_prompt<W: Write>(
    out: &mut W,
    position: usize,
    total: usize,
    can_undo: bool,
) -> io::Result<()> {
    let mut text = format!("[{}/{}]  N)ext  P)revious  D)elete  ", position + 1, total);
    if can_undo {
        text.push_str("U)ndo  ");
    }
    text.push_str("M)ove prop from,to  S)ave  Q)uit  H)elp: ");
    write!(out, "{}", text)
}

pub fn render_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", HELP_TEXT)
}

/// Display width of a string, accounting for CJK double-width, emoji, etc.
fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to `width` display columns, ending in ".." when something was cut.
fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        return s
            .chars()
            .take_while(|ch| UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .take(1)
            .collect();
    }
    if display_width(s) <= width {
        return s.to_string();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }
    format!("{}..", &s[..end_byte])
}

/// Pad or truncate to exactly `width` display columns. Line breaks inside a
/// value are shown as spaces so one cell stays on one line.
fn pad_right(s: &str, width: usize) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let cut = truncate_display(&flat, width);
    let w = display_width(&cut);
    format!("{}{}", cut, " ".repeat(width.saturating_sub(w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::IdentityKey;
    use crate::table::tests::sample_table;

    fn smith_set() -> CandidateSet {
        CandidateSet {
            key: IdentityKey::new("Smith Archive", "Akron", "OH"),
            members: vec![RecordId(0), RecordId(2)],
        }
    }

    fn render(table: &Table, set: &CandidateSet, highlight: Option<(RecordId, usize)>) -> String {
        let view = SetView {
            position: 0,
            total: 3,
            set,
            table,
            highlight,
        };
        let mut out = Vec::new();
        render_set(&mut out, &view, 100).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_shows_members_and_properties() {
        let table = sample_table();
        let out = render(&table, &smith_set(), None);
        assert!(out.starts_with("[1/3] smith archive / akron / oh"));
        assert!(out.contains("Record 1 (row 1)"));
        assert!(out.contains("Record 2 (row 3)"));
        assert!(out.contains(" 4 address"));
        assert!(out.contains("PO Box 9"));
        // name differs only in case, address differs outright
        assert!(out.contains("≠ 1 name"));
        assert!(out.contains("≠ 4 address"));
        assert!(out.contains("  2 city"));
    }

    #[test]
    fn test_render_hides_deleted_members_and_keeps_numbers() {
        let mut table = sample_table();
        table.remove(RecordId(0));
        let out = render(&table, &smith_set(), None);
        assert!(!out.contains("Record 1"));
        assert!(out.contains("Record 2 (row 3)"));
    }

    #[test]
    fn test_render_marks_highlight() {
        let table = sample_table();
        let out = render(&table, &smith_set(), Some((RecordId(2), 3)));
        assert!(out.contains("» PO Box 9"));
    }

    #[test]
    fn test_rows_have_equal_width() {
        let table = sample_table();
        let out = render(&table, &smith_set(), None);
        let widths: Vec<usize> = out.lines().skip(1).map(display_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
    }

    #[test]
    fn test_prompt_shows_undo_only_when_possible() {
        let mut out = Vec::new();
        render_prompt(&mut out, 1, 4, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[2/4]"));
        assert!(!text.contains("U)ndo"));

        let mut out = Vec::new();
        render_prompt(&mut out, 1, 4, true).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("U)ndo"));
    }

    #[test]
    fn test_pad_and_truncate() {
        assert_eq!(pad_right("abc", 5), "abc  ");
        assert_eq!(pad_right("abcdefgh", 5), "abc..");
        assert_eq!(pad_right("a\nb", 4), "a b ");
        assert_eq!(truncate_display("日本語テキスト", 6), "日本..");
    }
}
