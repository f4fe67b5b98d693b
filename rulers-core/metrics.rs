//! Whitespace measurement for raw lines.
//!
//! All columns here are tab-expanded: a tab advances to the next multiple of
//! the tab size, everything else counts one column. Only spaces and tabs are
//! treated as indentation; any other character (including exotic Unicode
//! whitespace) starts the text of the line.

use ropey::RopeSlice;

/// Tab-expanded column of the first non-whitespace character, plus whether
/// the line holds nothing but whitespace.
///
/// The line terminator does not count as text, so `""`, `"\n"` and `"   \n"`
/// are all reported as all-whitespace.
pub fn leading_whitespace(line: RopeSlice, tab_size: u32) -> (u32, bool) {
  let mut column = 0u32;
  for ch in line.chars() {
    match ch {
      '\t' => column += tab_size - column % tab_size,
      ' ' => column += 1,
      '\r' | '\n' => break,
      _ => return (column, false),
    }
  }
  (column, true)
}

/// Tab-expanded length of the whole line, excluding the terminator.
pub fn actual_length(line: RopeSlice, tab_size: u32) -> u32 {
  let mut column = 0u32;
  for ch in line.chars() {
    match ch {
      '\t' => column += tab_size - column % tab_size,
      '\r' | '\n' => break,
      _ => column += 1,
    }
  }
  column
}

/// Virtual column of a caret sitting before `char_offset` on `line`, with
/// `virtual_spaces` columns of virtual space past the end of line.
pub fn virtual_column(
  line: RopeSlice,
  char_offset: usize,
  virtual_spaces: usize,
  tab_size: u32,
) -> u32 {
  let mut column = 0u32;
  for ch in line.chars().take(char_offset) {
    match ch {
      '\t' => column += tab_size - column % tab_size,
      '\r' | '\n' => break,
      _ => column += 1,
    }
  }
  column + virtual_spaces as u32
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;

  fn line(text: &str) -> Rope {
    Rope::from_str(text)
  }

  #[test]
  fn leading_whitespace_expands_tabs_to_stops() {
    let doc = line("\tx");
    assert_eq!(leading_whitespace(doc.line(0), 4), (4, false));

    // a tab after two spaces lands on the next stop, not +4
    let doc = line("  \tx");
    assert_eq!(leading_whitespace(doc.line(0), 4), (4, false));

    let doc = line(" \t\tx");
    assert_eq!(leading_whitespace(doc.line(0), 8), (16, false));
  }

  #[test]
  fn leading_whitespace_reports_blank_lines() {
    assert_eq!(leading_whitespace(line("").line(0), 4), (0, true));
    assert_eq!(leading_whitespace(line("   \n").line(0), 4), (3, true));
    assert_eq!(leading_whitespace(line("\t\n").line(0), 4), (4, true));
    assert_eq!(leading_whitespace(line("    x\n").line(0), 4), (4, false));
  }

  #[test]
  fn nonbreaking_space_is_text() {
    let doc = line("\u{00A0}x");
    assert_eq!(leading_whitespace(doc.line(0), 4), (0, false));
  }

  #[test]
  fn actual_length_counts_expanded_columns() {
    assert_eq!(actual_length(line("abc").line(0), 4), 3);
    assert_eq!(actual_length(line("\tabc\n").line(0), 4), 7);
    assert_eq!(actual_length(line("a\tb").line(0), 4), 5);
    assert_eq!(actual_length(line("").line(0), 4), 0);
  }

  #[test]
  fn virtual_column_includes_virtual_space() {
    let doc = line("\tif x:");
    assert_eq!(virtual_column(doc.line(0), 0, 0, 4), 0);
    assert_eq!(virtual_column(doc.line(0), 1, 0, 4), 4);
    assert_eq!(virtual_column(doc.line(0), 3, 0, 4), 6);
    // caret past end of line in virtual space
    assert_eq!(virtual_column(doc.line(0), 7, 5, 4), 14);
  }
}
